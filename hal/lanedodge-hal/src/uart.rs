//! UART receive-side abstractions
//!
//! The controller receives its configuration frames from a byte-oriented
//! serial link. Bytes are pulled out of the receive data register from the
//! receive interrupt, one byte per event.

/// Status of the receiver when a receive event fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiveStatus {
    /// A byte is waiting in the data register
    Ready,
    /// Nothing to read (spurious event)
    Empty,
    /// Hardware overrun: the receiver stopped accepting bytes
    Overrun,
    /// The next byte was received with a framing error
    FramingError,
}

/// Serial receive data/status register
///
/// Implemented by chip HALs on top of the raw UART peripheral. All methods
/// must complete in short, bounded time because they run in interrupt
/// context.
pub trait ReceiveRegister {
    /// Inspect the receiver status without consuming data
    fn status(&self) -> ReceiveStatus;

    /// Read (and consume) the byte in the data register
    fn read_data(&mut self) -> u8;

    /// Clear an overrun by toggling receive-enable off and on again
    ///
    /// Without this the receiver stays stalled forever after an overrun.
    fn restart_receiver(&mut self);
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl UartConfig {
    /// 8N1 at the given baud rate
    pub const fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }

    /// Worst-case number of bytes the link can deliver per second
    ///
    /// One start bit, the data bits, an optional parity bit and the stop bits.
    pub const fn bytes_per_second(&self) -> u32 {
        let data = match self.data_bits {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        };
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        self.baudrate / (1 + data + parity + stop)
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::with_baudrate(9600)
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

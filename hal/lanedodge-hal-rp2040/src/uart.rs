//! UART0 host link
//!
//! Receive is interrupt driven straight off the PL011 registers, so the
//! handler can run the overrun-recovery sequence itself. Transmit uses the
//! blocking driver; messages are short and only sent between rounds.

use core::cell::Cell;

use embassy_rp::pac;
use embassy_rp::uart::{self, Blocking, UartTx};
use lanedodge_hal::uart::{DataBits, Parity, StopBits};
use lanedodge_hal::{ReceiveRegister, ReceiveStatus, UartConfig};

/// Convert a HAL UART configuration to the embassy driver configuration
pub fn driver_config(config: &UartConfig) -> uart::Config {
    let mut out = uart::Config::default();
    out.baudrate = config.baudrate;
    out.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    out.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    out.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    out
}

/// A data register word: the byte and its framing flag
#[derive(Clone, Copy)]
struct RxWord {
    byte: u8,
    framing_error: bool,
}

/// PL011 UART0 receive side
///
/// Holds no peripheral singleton; construct one inside the interrupt
/// handler. The PL011 reports framing errors together with the byte, so a
/// word is fetched into `pending` when the status is inspected.
pub struct Uart0Receiver {
    pending: Cell<Option<RxWord>>,
}

impl Uart0Receiver {
    pub const fn new() -> Self {
        Self {
            pending: Cell::new(None),
        }
    }

    fn fetch(&self) -> Option<RxWord> {
        if let Some(word) = self.pending.get() {
            return Some(word);
        }
        if pac::UART0.uartfr().read().rxfe() {
            return None;
        }
        let dr = pac::UART0.uartdr().read();
        let word = RxWord {
            byte: dr.data(),
            framing_error: dr.fe() || dr.pe() || dr.be(),
        };
        self.pending.set(Some(word));
        Some(word)
    }
}

impl Default for Uart0Receiver {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiveRegister for Uart0Receiver {
    fn status(&self) -> ReceiveStatus {
        if pac::UART0.uartrsr().read().oe() {
            return ReceiveStatus::Overrun;
        }
        match self.fetch() {
            None => ReceiveStatus::Empty,
            Some(word) if word.framing_error => ReceiveStatus::FramingError,
            Some(_) => ReceiveStatus::Ready,
        }
    }

    fn read_data(&mut self) -> u8 {
        let word = self.fetch();
        self.pending.set(None);
        word.map(|w| w.byte).unwrap_or(0)
    }

    fn restart_receiver(&mut self) {
        // Any write to the error clear register clears all error flags
        pac::UART0.uartrsr().write(|w| {
            w.set_oe(true);
            w.set_fe(true);
            w.set_pe(true);
            w.set_be(true);
        });
        pac::UART0.uartcr().modify(|w| w.set_rxe(false));
        pac::UART0.uartcr().modify(|w| w.set_rxe(true));
    }
}

/// Unmask the UART0 receive and receive-timeout interrupts
///
/// The NVIC line itself is enabled by the caller.
pub fn enable_receive_interrupt() {
    pac::UART0.uartimsc().modify(|w| {
        w.set_rxim(true);
        w.set_rtim(true);
    });
}

/// Blocking transmit half as an `embedded_io` byte sink
pub struct HostTx<'d> {
    tx: UartTx<'d, Blocking>,
}

impl<'d> HostTx<'d> {
    pub fn new(tx: UartTx<'d, Blocking>) -> Self {
        Self { tx }
    }
}

impl embedded_io::ErrorType for HostTx<'_> {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io::Write for HostTx<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.tx
            .blocking_write(buf)
            .map_err(|_| embedded_io::ErrorKind::Other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.tx
            .blocking_flush()
            .map_err(|_| embedded_io::ErrorKind::Other)
    }
}

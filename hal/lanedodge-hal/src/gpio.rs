//! GPIO pin abstractions
//!
//! Only digital inputs are needed by the controller core: the two
//! lane-select buttons are sampled once per main-loop iteration.

/// Digital input pin
///
/// Implementations should handle the actual hardware register reading
/// for the specific chip.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Adapter for buttons wired to ground with a pull-up
///
/// `is_high()` on the adapter reports "pressed", which is the
/// electrical low level of the wrapped pin.
#[derive(Debug)]
pub struct ActiveLow<P>(pub P);

impl<P: InputPin> ActiveLow<P> {
    /// Whether the button is currently pressed
    pub fn is_pressed(&self) -> bool {
        self.0.is_low()
    }
}

impl<P: InputPin> InputPin for ActiveLow<P> {
    fn is_high(&self) -> bool {
        self.is_pressed()
    }
}

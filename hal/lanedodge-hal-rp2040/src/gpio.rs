//! GPIO inputs

use embassy_rp::gpio::Input;
use lanedodge_hal::InputPin;

/// Push button input
///
/// Configure the pull-up when creating the `Input`; wrap in
/// [`lanedodge_hal::ActiveLow`] for buttons wired to ground.
pub struct ButtonPin<'d> {
    input: Input<'d>,
}

impl<'d> ButtonPin<'d> {
    pub fn new(input: Input<'d>) -> Self {
        Self { input }
    }
}

impl InputPin for ButtonPin<'_> {
    fn is_high(&self) -> bool {
        self.input.is_high()
    }
}

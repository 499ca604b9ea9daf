//! Lane button sampling
//!
//! Presses are latched between main-loop iterations so a tap shorter than
//! one frame still counts. Holding both buttons for a second raises the
//! cancel flag, which abandons a frame scan stuck on a silent host.

use defmt::*;
use embassy_time::{Duration, Ticker};
use portable_atomic::{AtomicU8, Ordering};

use lanedodge_core::game::LaneInputs;
use lanedodge_hal::ActiveLow;
use lanedodge_hal_rp2040::ButtonPin;

use crate::CANCEL;

const TOP: u8 = 0x01;
const BOTTOM: u8 = 0x02;

const SAMPLE_INTERVAL_MS: u64 = 10;

/// Consecutive samples with both buttons held before a scan is cancelled
const CANCEL_HOLD_SAMPLES: u16 = 100;

/// Buttons seen pressed since the last [`latched_inputs`]
static PRESSED: AtomicU8 = AtomicU8::new(0);

/// The two lane-select buttons
pub struct LaneButtons {
    pub top: ActiveLow<ButtonPin<'static>>,
    pub bottom: ActiveLow<ButtonPin<'static>>,
}

impl LaneButtons {
    fn sample(&self) -> u8 {
        let mut bits = 0;
        if self.top.is_pressed() {
            bits |= TOP;
        }
        if self.bottom.is_pressed() {
            bits |= BOTTOM;
        }
        bits
    }
}

/// Take the presses latched since the previous call
pub fn latched_inputs() -> LaneInputs {
    let bits = PRESSED.swap(0, Ordering::AcqRel);
    LaneInputs {
        top: bits & TOP != 0,
        bottom: bits & BOTTOM != 0,
    }
}

#[embassy_executor::task]
pub async fn input_task(buttons: LaneButtons) {
    info!("Input task started");

    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));
    let mut both_held: u16 = 0;

    loop {
        ticker.next().await;

        let bits = buttons.sample();
        if bits != 0 {
            PRESSED.fetch_or(bits, Ordering::AcqRel);
        }

        if bits == TOP | BOTTOM {
            both_held = both_held.saturating_add(1);
            if both_held == CANCEL_HOLD_SAMPLES {
                warn!("Both lane buttons held, cancelling frame scan");
                CANCEL.raise();
            }
        } else {
            both_held = 0;
        }
    }
}

//! Main loop task
//!
//! One [`Controller::poll`] per frame. Every outcome is logged here; the
//! controller itself never logs.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::{Delay, Duration, Instant, Ticker};

use lanedodge_core::{Controller, Poll, Transport};
use lanedodge_drivers::display::Hd44780;
use lanedodge_hal_rp2040::HostTx;

use super::input::latched_inputs;
use crate::deadline::InstantDeadline;
use crate::{CANCEL, RX_CAPACITY, TRANSPORT};

pub type GameController =
    Controller<'static, RX_CAPACITY, HostTx<'static>, Hd44780<Output<'static>, Delay>>;

/// Link counters as last logged
#[derive(Default)]
struct LinkCounters {
    overruns: u32,
    framing_errors: u32,
    resyncs: u32,
}

impl LinkCounters {
    fn log_changes(&mut self, transport: &Transport<RX_CAPACITY>, resyncs: u32) {
        let dropped = transport.take_overflows();
        if dropped > 0 {
            warn!("Receive buffer full, dropped {} bytes", dropped);
        }

        let overruns = transport.overruns();
        if overruns != self.overruns {
            warn!("UART overrun, receiver restarted (total {})", overruns);
            self.overruns = overruns;
        }

        let framing_errors = transport.framing_errors();
        if framing_errors != self.framing_errors {
            warn!("UART framing errors: {}", framing_errors);
            self.framing_errors = framing_errors;
        }

        if resyncs != self.resyncs {
            debug!("Frame scan resynchronized (total {})", resyncs);
            self.resyncs = resyncs;
        }
    }
}

#[embassy_executor::task]
pub async fn game_task(mut controller: GameController) {
    let config = *controller.config();
    info!("Game task started, frame period {} ms", config.clock.frame_ms);

    if let Err(e) = controller.announce() {
        error!("Failed to announce: {:?}", e);
    }

    let mut ticker = Ticker::every(Duration::from_millis(config.clock.frame_ms as u64));
    let mut counters = LinkCounters::default();

    loop {
        ticker.next().await;

        let deadline = InstantDeadline::after_millis(config.link.scan_timeout_ms);
        let seed = Instant::now().as_ticks() as u32;
        let result = controller.poll(latched_inputs(), seed, deadline, &CANCEL);
        CANCEL.clear();

        match result {
            Ok(Poll::Idle) | Ok(Poll::Ticked) => {}
            Ok(Poll::Loaded(summary)) => {
                info!(
                    "Level loaded, goal {} {}",
                    summary.level.goal_type.as_str(),
                    summary.level.goal_value
                );
                if summary.character_blank || summary.obstacle_blank {
                    warn!(
                        "Blank glyph (character={}, obstacle={})",
                        summary.character_blank, summary.obstacle_blank
                    );
                }
                if !summary.glyphs_distinct() {
                    warn!(
                        "Glyphs differ in only {}% of pixels",
                        summary.difference_percent
                    );
                }
            }
            Ok(Poll::Rejected(e)) => warn!("Frame rejected: {:?}", e),
            Ok(Poll::RoundOver(telemetry)) => info!(
                "Round over: {:?}, {} dodged in {} s",
                telemetry.outcome, telemetry.obstacles_dodged, telemetry.elapsed_seconds
            ),
            Err(e) => error!("Round aborted: {:?}", e),
        }

        counters.log_changes(&TRANSPORT, controller.resyncs());
    }
}

//! Clock tick task
//!
//! Drives the round clock at the configured hardware tick rate. The clock
//! only counts while a round is active.

use defmt::*;
use embassy_time::{Duration, Ticker};

use lanedodge_core::Clock;

#[embassy_executor::task]
pub async fn clock_tick_task(clock: &'static Clock, tick_hz: u32) {
    info!("Clock tick task started at {} Hz", tick_hz);

    let mut ticker = Ticker::every(Duration::from_hz(tick_hz.max(1) as u64));

    loop {
        ticker.next().await;
        clock.on_tick();
    }
}

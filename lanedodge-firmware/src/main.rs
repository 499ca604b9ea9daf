//! Lanedodge - Two-Lane Arcade Controller Firmware
//!
//! Receives a level (player glyph, obstacle glyph, goal) from the host over
//! UART0, plays one round on a 16x2 character LCD and reports the result.
//!
//! Interrupt layout:
//! - `UART0_IRQ` (raw handler) drains the receiver into [`TRANSPORT`]
//! - `SWI_IRQ_1` runs the high-priority executor: clock ticks and buttons
//! - Thread mode runs the main loop, which may busy-wait on a frame scan

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::uart::Uart;
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use lanedodge_core::{CancelFlag, Clock, Controller, Transport};
use lanedodge_drivers::display::Hd44780;
use lanedodge_hal::{ActiveLow, UartConfig};
use lanedodge_hal_rp2040::{
    driver_config, enable_receive_interrupt, ButtonPin, HostTx, Uart0Receiver,
};
use lanedodge_protocol::MAX_FRAME_LEN;

mod config;
mod deadline;
mod tasks;

/// Receive ring capacity
pub const RX_CAPACITY: usize = 256;

// A whole canonical frame must fit without draining
const _: () = assert!(RX_CAPACITY > MAX_FRAME_LEN);

/// Bytes from the host, filled by `UART0_IRQ`
pub static TRANSPORT: Transport<RX_CAPACITY> = Transport::new();

/// Round clock, ticked by `clock_tick_task`
pub static CLOCK: Clock = Clock::new();

/// Raised to abandon a frame scan in progress
pub static CANCEL: CancelFlag = CancelFlag::new();

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[interrupt]
fn UART0_IRQ() {
    TRANSPORT.service_receive(&mut Uart0Receiver::new());
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Lanedodge firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let game_config = config::load_game_config();

    // Host link: UART0 on GPIO0 (TX) / GPIO1 (RX)
    let link_config = UartConfig::with_baudrate(game_config.link.baudrate);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, driver_config(&link_config));
    // The receive half stays alive for the lifetime of main; its
    // registers are serviced by the raw interrupt handler
    let (tx, _rx) = uart.split();
    enable_receive_interrupt();
    interrupt::UART0_IRQ.set_priority(Priority::P1);
    interrupt::UART0_IRQ.unpend();
    unsafe { interrupt::UART0_IRQ.enable() };
    info!(
        "UART0 initialized at {} baud (~{} bytes/s)",
        link_config.baudrate,
        link_config.bytes_per_second()
    );

    // HD44780 in 4-bit mode: RS=GPIO2, E=GPIO3, D4..D7=GPIO4..7
    let lcd = unwrap!(Hd44780::new(
        Output::new(p.PIN_2, Level::Low),
        Output::new(p.PIN_3, Level::Low),
        [
            Output::new(p.PIN_4, Level::Low),
            Output::new(p.PIN_5, Level::Low),
            Output::new(p.PIN_6, Level::Low),
            Output::new(p.PIN_7, Level::Low),
        ],
        Delay,
        game_config.display.columns,
    ));
    info!("LCD initialized");

    // Lane buttons to ground on GPIO14 (top) / GPIO15 (bottom)
    let buttons = tasks::LaneButtons {
        top: ActiveLow(ButtonPin::new(Input::new(p.PIN_14, Pull::Up))),
        bottom: ActiveLow(ButtonPin::new(Input::new(p.PIN_15, Pull::Up))),
    };

    // High-priority executor for work that must run during a frame scan
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high_spawner
        .spawn(tasks::clock_tick_task(&CLOCK, game_config.clock.tick_hz))
        .unwrap();
    high_spawner.spawn(tasks::input_task(buttons)).unwrap();

    let controller = Controller::new(&TRANSPORT, &CLOCK, game_config, HostTx::new(tx), lcd);
    spawner.spawn(tasks::game_task(controller)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

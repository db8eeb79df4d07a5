//! keypanel firmware for nRF52840.
//!
//! Everything on the OLED side hangs off one TWIM bus shared through a
//! `RefCell`: the SSD1306 panel, the 24C512 EEPROM, the AHT21 sensor and
//! the lighting co-processor. The co-processor's busy line is a plain input.
//!
//! The UI loop runs on a 20 Hz ticker and consumes knob events from two
//! input tasks in between ticks.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{Input, Pull};
use embassy_nrf::qdec::{self, Qdec};
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Delay, Duration, Instant, Ticker};
use embedded_hal_bus::i2c::RefCellDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use keypanel::clock::Clock;
use keypanel::config::{ACTIVATE_KEY, FRAME_RATE_HZ};
use keypanel::drivers::{Aht21, Eeprom24c512, I2cLink};
use keypanel::ui::buttons::{self, KnobEvent, KnobSender};
use keypanel::ui::display::Panel;
use keypanel::{App, Platform};

bind_interrupts!(struct Irqs {
    TWISPI0 => twim::InterruptHandler<peripherals::TWISPI0>;
    QDEC => qdec::InterruptHandler<peripherals::QDEC>;
});

type Bus = Twim<'static, peripherals::TWISPI0>;
type SharedI2c = RefCellDevice<'static, Bus>;

static I2C_BUS: StaticCell<RefCell<Bus>> = StaticCell::new();
static KNOB_EVENTS: Channel<CriticalSectionRawMutex, KnobEvent, 8> = Channel::new();

/// Milliseconds since boot, wrapping after ~49 days.
struct UptimeClock;

impl Clock for UptimeClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}

struct Board;

impl Platform for Board {
    type Display = Panel<SharedI2c>;
    type Link = I2cLink<SharedI2c, Input<'static>>;
    type Store = Eeprom24c512<SharedI2c, Delay>;
    type Sensor = Aht21<SharedI2c>;
    type Clock = UptimeClock;
}

#[embassy_executor::task]
async fn encoder_task(qdec: Qdec<'static, peripherals::QDEC>, tx: KnobSender) -> ! {
    buttons::encoder_task(qdec, tx).await
}

#[embassy_executor::task]
async fn switch_task(btn: Input<'static>, tx: KnobSender) -> ! {
    buttons::switch_task(btn, tx).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("keypanel starting");

    // ── Shared I²C bus ──────────────────────────────────────────────
    let mut twim_config = twim::Config::default();
    twim_config.frequency = twim::Frequency::K400;
    let twim = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim_config);
    let bus = I2C_BUS.init(RefCell::new(twim));

    let display = Panel::new(RefCellDevice::new(bus));
    let link = I2cLink::new(RefCellDevice::new(bus), Input::new(p.P0_06, Pull::Down));
    let store = Eeprom24c512::new(RefCellDevice::new(bus), Delay);
    let sensor = Aht21::new(RefCellDevice::new(bus));

    // ── Encoder ─────────────────────────────────────────────────────
    let qdec = Qdec::new(p.QDEC, Irqs, p.P0_31, p.P0_30, qdec::Config::default());
    let push = Input::new(p.P0_29, Pull::Up);
    unwrap!(spawner.spawn(encoder_task(qdec, KNOB_EVENTS.sender())));
    unwrap!(spawner.spawn(switch_task(push, KNOB_EVENTS.sender())));

    let mut app: App<Board> = App::new(display, link, store, sensor, UptimeClock);
    let mut ticker = Ticker::every(Duration::from_hz(u64::from(FRAME_RATE_HZ)));
    let (row, col) = ACTIVATE_KEY;

    loop {
        match select(ticker.next(), KNOB_EVENTS.receive()).await {
            Either::First(()) => {
                app.poll();
                app.tick();
            }
            Either::Second(KnobEvent::Rotate { clockwise }) => {
                app.handle_rotate(clockwise);
            }
            Either::Second(KnobEvent::Switch { pressed }) => {
                app.handle_key(0, row, col, pressed);
            }
        }
    }
}

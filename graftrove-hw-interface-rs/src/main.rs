//! graftrove-hw-interface
//!
//! Demo-board firmware for the RP235x. Five buttons each start one
//! peripheral demo (ADC, PWM, GPIO, I2C scan, UART); the running demo draws
//! to the SSD1306 and a USB CDC-ACM terminal carries the UART dialogue.
//!
//! 1. A button edge, animation tick or Ctrl-C wakes a task on the
//!    high-priority interrupt executor.
//! 2. The task calls the shared `InterruptContext`, which debounces and
//!    queues plain `Work` items. No hardware is touched there.
//! 3. The main loop wakes on the queue or the controller's next deadline,
//!    drains the work in order, steps the active demo and presents the
//!    resulting frame on the display.

#![no_std]
#![no_main]

mod board;
mod terminal;

use defmt::*;
use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_futures::select::select;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::interrupt::{self, InterruptExt, Priority};
use embassy_rp::peripherals::{I2C0, I2C1, USB};
use embassy_rp::usb;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Instant, Ticker, Timer};
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use bus_scan::{display_address, BusScanner, DEFAULT_DISPLAY_ADDRESS};
use graftrove::{
    Animation, Button, Controller, DemoConfig, InterruptContext, Render, SchedulerConfig,
    SharedState, Surface, QUEUE_DEPTH,
};
use graftrove_oled_display_rs::{DisplayConfig, OledDriver, OledSurface};

use board::{Board, BoardParts};
use terminal::MAX_PACKET;

// ---------------------------------------------------------------------------
// Boot block and interrupt binding
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
    I2C1_IRQ => i2c::InterruptHandler<I2C1>;
    ADC_IRQ_FIFO => adc::InterruptHandler;
    USBCTRL_IRQ => usb::InterruptHandler<USB>;
});

/// Runs every producer of deferred work above the main loop's priority.
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// Queue, debounce guards and flags shared by the interrupt side and the
/// main loop.
static SHARED: SharedState<CriticalSectionRawMutex, QUEUE_DEPTH> = SharedState::new();

/// I2C0, shared by the boot scan and the OLED through I2cDevice wrappers.
static I2C_BUS: StaticCell<Mutex<CriticalSectionRawMutex, I2c<'static, I2C0, i2c::Async>>> =
    StaticCell::new();

static USB_CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static CDC_STATE: StaticCell<State<'static>> = StaticCell::new();

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

type Ctx = InterruptContext<'static, CriticalSectionRawMutex, QUEUE_DEPTH>;

type OledI2c = I2cDevice<'static, CriticalSectionRawMutex, I2c<'static, I2C0, i2c::Async>>;

/// Power-on settle time before the first bus access.
const STARTUP_DELAY_MS: u64 = 100;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// One per button. Active-low with pull-up, so a press is a falling edge.
#[embassy_executor::task(pool_size = 5)]
async fn button_task(mut pin: Input<'static>, button: Button, ctx: Ctx) {
    loop {
        pin.wait_for_falling_edge().await;
        ctx.on_button(button);
    }
}

/// Periodic source for the boot animation. Ends for good once the
/// controller disables it.
#[embassy_executor::task]
async fn animation_tick_task(ctx: Ctx, period: Duration) {
    let mut ticker = Ticker::every(period);
    loop {
        ticker.next().await;
        if !ctx.animation_ticks_enabled() {
            break;
        }
        ctx.on_animation_tick();
    }
    info!("animation source stopped");
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    Timer::after_millis(STARTUP_DELAY_MS).await;
    info!("graftrove-hw-interface starting");

    // -- Pin assignments ---------------------------------------------------
    // UART0 TX   -> GP0    UART0 RX -> GP1
    // I2C1 SDA   -> GP2    I2C1 SCL -> GP3     (scan demo, 100 kHz)
    // I2C0 SDA   -> GP4    I2C0 SCL -> GP5     (OLED, 400 kHz)
    // GPIO demo  -> GP7    pull-up input
    // PWM demo   -> GP9    slice 4 channel B
    // Buttons    -> GP11 AIN0, GP12 DIO1, GP13 DIO0, GP14 I2C1, GP15 UART
    //              active-low, pull-up
    // ADC        -> GP26..GP29
    // -----------------------------------------------------------------------

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    let ctx = SHARED.interrupt_context();

    // -- USB terminal ------------------------------------------------------

    let driver = usb::Driver::new(p.USB, Irqs);
    let mut usb_config = embassy_usb::Config::new(0xc0de, 0xcafe);
    usb_config.manufacturer = Some("FreakStudio");
    usb_config.product = Some("Graftrove terminal");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let mut builder = embassy_usb::Builder::new(
        driver,
        usb_config,
        USB_CONFIG_DESCRIPTOR.init([0; 256]),
        USB_BOS_DESCRIPTOR.init([0; 256]),
        &mut [],
        USB_CONTROL_BUF.init([0; 64]),
    );
    let class = CdcAcmClass::new(&mut builder, CDC_STATE.init(State::new()), MAX_PACKET as u16);
    let (sender, receiver) = class.split();
    let usb = builder.build();

    spawner.spawn(unwrap!(terminal::usb_task(usb)));
    spawner.spawn(unwrap!(terminal::terminal_tx_task(sender)));
    high.spawn(unwrap!(terminal::terminal_rx_task(receiver, ctx)));

    // -- Display -----------------------------------------------------------

    let mut i2c0_config = i2c::Config::default();
    i2c0_config.frequency = 400_000;
    let i2c0 = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c0_config);
    let i2c_bus = I2C_BUS.init(Mutex::new(i2c0));

    let mut scanner = BusScanner::new(I2cDevice::new(i2c_bus));
    let address = match scanner.scan().await {
        Ok(devices) => {
            info!("I2C0 devices: {=[u8]:#x}", devices.as_slice());
            display_address(&devices).unwrap_or_else(|| {
                warn!("No OLED found; trying {=u8:#x}", DEFAULT_DISPLAY_ADDRESS);
                DEFAULT_DISPLAY_ADDRESS
            })
        }
        Err(e) => {
            warn!("I2C0 scan failed: {}", e);
            DEFAULT_DISPLAY_ADDRESS
        }
    };

    let display_config = DisplayConfig::default();
    let mut oled: OledDriver<OledI2c> = OledDriver::new(I2cDevice::new(i2c_bus), address);
    // Demos keep running without a panel; every draw becomes a no-op.
    if let Err(e) = oled.init().await {
        error!("OLED init failed: {}", e);
    }
    let mut surface = OledSurface::new(oled, display_config);

    let scheduler = SchedulerConfig::default();
    surface
        .present(&Render::Full(display_config.banner_screen()))
        .await;
    Timer::after(scheduler.banner_hold).await;
    surface.present(&Render::Clear).await;

    // -- Demo peripherals --------------------------------------------------

    let mut i2c1_config = i2c::Config::default();
    i2c1_config.frequency = 100_000;

    let mut board = Board::new(BoardParts {
        adc: Adc::new(p.ADC, Irqs, adc::Config::default()),
        analog: [
            Channel::new_pin(p.PIN_26, Pull::None),
            Channel::new_pin(p.PIN_27, Pull::None),
            Channel::new_pin(p.PIN_28, Pull::None),
            Channel::new_pin(p.PIN_29, Pull::None),
        ],
        level: Input::new(p.PIN_7, Pull::Up),
        pwm_slice: p.PWM_SLICE4,
        pwm_pin: p.PIN_9,
        uart: p.UART0,
        uart_tx: p.PIN_0,
        uart_rx: p.PIN_1,
        scan_bus: I2c::new_async(p.I2C1, p.PIN_3, p.PIN_2, Irqs, i2c1_config),
    });

    // -- Animation and buttons ---------------------------------------------

    let animation = Animation::new(
        display_config.animation_text,
        display_config.animation_geometry(),
    );
    let mut controller = Controller::new(&SHARED, scheduler, DemoConfig::default(), animation);
    controller.start_animation(Instant::now());
    high.spawn(unwrap!(animation_tick_task(ctx, scheduler.animation_period)));

    let buttons = [
        Input::new(p.PIN_11, Pull::Up),
        Input::new(p.PIN_12, Pull::Up),
        Input::new(p.PIN_13, Pull::Up),
        Input::new(p.PIN_14, Pull::Up),
        Input::new(p.PIN_15, Pull::Up),
    ];
    for (pin, button) in buttons.into_iter().zip(Button::ALL) {
        high.spawn(unwrap!(button_task(pin, button, ctx)));
    }

    info!("All tasks spawned");

    // -- Main loop ---------------------------------------------------------

    loop {
        controller
            .service(&mut board, &mut surface, Instant::now())
            .await;

        if controller.is_halted() {
            info!("halted; queue dropped {} items", SHARED.queue().dropped());
            core::future::pending::<()>().await;
        }

        let deadline = controller.next_deadline().unwrap_or(Instant::MAX);
        select(SHARED.queue().ready(), Timer::at(deadline)).await;
    }
}

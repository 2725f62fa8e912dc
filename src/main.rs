#![no_std]
#![no_main]

// https://github.com/embassy-rs/embassy/blob/main/examples/stm32f4/src/bin/multiprio.rs

use cortex_m_rt::entry;
use defmt::{info, unwrap};
use defmt_rtt as _;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_stm32::{
    exti::ExtiInput,
    gpio::{Input, Level, Output, Pull, Speed},
    interrupt,
    interrupt::{InterruptExt, Priority},
    spi::{self, Spi},
    time::Hertz,
    usart::{self, UartTx},
};
use panic_halt as _;
use static_cell::StaticCell;

use despi_m02_occupancy::admission::Admission;
use despi_m02_occupancy::display::DisplayChannel;
use despi_m02_occupancy::egress::Egress;
use despi_m02_occupancy::io::{OutputChannel, drive_outputs, now_ms};
use despi_m02_occupancy::occupancy::Occupancy;
use despi_m02_occupancy::presenter::{run_matrix, run_status_light};
use despi_m02_occupancy::reset::{ResetController, ResetLine};

mod board;
use board::{Panel, PanelButton, SerialDisplay, SpiMatrix};

type Display = DisplayChannel<SerialDisplay>;

static OCCUPANCY: Occupancy = Occupancy::new();
static RESET_LINE: ResetLine = ResetLine::new();
static OUTPUTS: OutputChannel = OutputChannel::new();
static DISPLAY: StaticCell<Display> = StaticCell::new();

// Reset runs above everything else: its tasks live on an interrupt executor
// driven by an otherwise unused interrupt.
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn UART4() {
    unsafe { EXECUTOR_HIGH.on_interrupt() }
}

#[embassy_executor::task]
async fn io_task(mut panel: Panel) -> ! {
    drive_outputs(OUTPUTS.receiver(), &mut panel).await
}

#[embassy_executor::task]
async fn admission_task(entry: PanelButton, display: &'static Display) -> ! {
    Admission::new(&OCCUPANCY, entry)
        .run(OUTPUTS.sender(), display)
        .await
}

#[embassy_executor::task]
async fn egress_task(exit: PanelButton, display: &'static Display) -> ! {
    Egress::new(&OCCUPANCY, exit)
        .run(OUTPUTS.sender(), display)
        .await
}

#[embassy_executor::task]
async fn status_light_task() -> ! {
    run_status_light(&OCCUPANCY, OUTPUTS.sender()).await
}

#[embassy_executor::task]
async fn matrix_task(mut matrix: SpiMatrix) -> ! {
    run_matrix(&OCCUPANCY, &mut matrix).await
}

// Stands in for the GPIO interrupt handler: wakes on the EXTI edge and hands
// it to the reset line, which only debounces and signals.
#[embassy_executor::task]
async fn reset_edge_task(mut button: ExtiInput<'static>) -> ! {
    loop {
        button.wait_for_falling_edge().await;
        RESET_LINE.on_edge(button.is_low(), now_ms());
    }
}

#[embassy_executor::task]
async fn reset_task(display: &'static Display) -> ! {
    ResetController::new(&OCCUPANCY, &RESET_LINE)
        .run(OUTPUTS.sender(), display)
        .await
}

#[entry]
fn main() -> ! {
    let peripherals = embassy_stm32::init(Default::default());
    info!("occupancy counter starting, capacity {}", OCCUPANCY.capacity());

    let panel = Panel::new(
        [
            Output::new(peripherals.PB10, Level::Low, Speed::Low),
            Output::new(peripherals.PB14, Level::Low, Speed::Low),
            Output::new(peripherals.PB12, Level::Low, Speed::Low),
        ],
        Output::new(peripherals.PE1, Level::Low, Speed::Low),
    );
    let entry = PanelButton(Input::new(peripherals.PA0, Pull::Up));
    let exit = PanelButton(Input::new(peripherals.PA1, Pull::Up));
    let reset_button = ExtiInput::new(peripherals.PE11, peripherals.EXTI11, Pull::Up);

    let serial = unwrap!(UartTx::new_blocking(
        peripherals.USART1,
        peripherals.PA9,
        usart::Config::default(), // 115200 baud
    ));
    let display: &'static Display = DISPLAY.init(DisplayChannel::new(SerialDisplay::new(serial)));

    let mut spi_config = spi::Config::default();
    spi_config.frequency = Hertz(3_200_000);
    let matrix = SpiMatrix::new(Spi::new_blocking_txonly(
        peripherals.SPI1,
        peripherals.PA5,
        peripherals.PA7,
        spi_config,
    ));

    interrupt::UART4.set_priority(Priority::P6);
    let high = EXECUTOR_HIGH.start(interrupt::UART4);
    high.must_spawn(reset_edge_task(reset_button));
    high.must_spawn(reset_task(display));

    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        spawner.must_spawn(io_task(panel));
        spawner.must_spawn(splash_then_controllers(spawner, display, entry, exit));
        spawner.must_spawn(status_light_task());
        spawner.must_spawn(matrix_task(matrix));
    })
}

#[embassy_executor::task]
async fn splash_then_controllers(
    spawner: embassy_executor::Spawner,
    display: &'static Display,
    entry: PanelButton,
    exit: PanelButton,
) {
    display.welcome().await;
    spawner.must_spawn(admission_task(entry, display));
    spawner.must_spawn(egress_task(exit, display));
}

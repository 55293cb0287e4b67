// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

extern crate alloc;

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use static_cell::StaticCell;

use {esp_backtrace as _, esp_println as _};

use cover_firmware::board::{restart_after_init_failure, start_network};
use cover_firmware::config::{EXTRA_HEAP_SIZE, WIFI_HEAP_SIZE};
use cover_firmware::tasks::{air_quality_task, telemetry_mqtt_task};
use cover_firmware::{CoverError, TelemetryChannel};

esp_bootloader_esp_idf::esp_app_desc!();

/// Luftqualitäts-Sensor: SCD4x an I2C0 (SDA GPIO6, SCL GPIO7), CO2-LED an GPIO8
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    let stack = start_network(&spawner, peripherals.WIFI);

    static TELEMETRY_CHANNEL: StaticCell<TelemetryChannel> = StaticCell::new();
    let telemetry_channel = &*TELEMETRY_CHANNEL.init(TelemetryChannel::new());
    let (Ok(telemetry_publisher), Ok(telemetry_subscriber)) =
        (telemetry_channel.publisher(), telemetry_channel.subscriber())
    else {
        restart_after_init_failure(CoverError::InitFailure)
    };

    spawner
        .spawn(air_quality_task(
            peripherals.I2C0,
            peripherals.GPIO6,
            peripherals.GPIO7,
            peripherals.GPIO8,
            peripherals.RMT,
            telemetry_publisher,
        ))
        .unwrap_or_else(|_| restart_after_init_failure(CoverError::InitFailure));

    spawner
        .spawn(telemetry_mqtt_task(stack, telemetry_subscriber))
        .unwrap_or_else(|_| restart_after_init_failure(CoverError::InitFailure));

    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}

// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi benötigt dynamischen Speicher)
extern crate alloc;

use core::cell::RefCell;

use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Pull};
use esp_hal::timer::timg::TimerGroup;
use static_cell::StaticCell;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

use cover_firmware::board::{restart_after_init_failure, start_network};
use cover_firmware::config::{EXTRA_HEAP_SIZE, WIFI_HEAP_SIZE};
use cover_firmware::tasks::{CoverButtons, cover_mqtt_task, cover_task};
use cover_firmware::{CommandMailbox, CoverError, LatestCommands, MotionFlags, ReportChannel};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
esp_bootloader_esp_idf::esp_app_desc!();

/// Bewegungs-Flags: geteilt zwischen Control-Loop (Fahrt) und MQTT (Stop)
static MOTION_FLAGS: MotionFlags = MotionFlags::new();

/// Jalousie: Lift 0..=9, Tilt 0..=5, Start in Max-Position
///
/// Taster: GPIO2 Lift +1, GPIO3 Lift -1, GPIO9 (BOOT) lang = Werksreset.
/// Positions-LED (WS2812) an GPIO8.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Zwei Heap-Bereiche: reclaimed RAM (64 KB) + extra (36 KB)
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    let stack = start_network(&spawner, peripherals.WIFI);

    // Positions-Meldungen: Control-Loop → MQTT
    static REPORT_CHANNEL: StaticCell<ReportChannel> = StaticCell::new();
    let report_channel = &*REPORT_CHANNEL.init(ReportChannel::new());
    let (Ok(report_publisher), Ok(report_subscriber)) =
        (report_channel.publisher(), report_channel.subscriber())
    else {
        restart_after_init_failure(CoverError::InitFailure)
    };

    // Fern-Kommandos: MQTT → Control-Loop, je Achse das jüngste
    static COMMAND_MAILBOX: StaticCell<CommandMailbox> = StaticCell::new();
    let command_mailbox = &*COMMAND_MAILBOX.init(Mutex::new(RefCell::new(LatestCommands::new())));

    // Taster gegen GND, daher Pull-Up
    let input_config = InputConfig::default().with_pull(Pull::Up);
    let buttons = CoverButtons {
        lift_inc: Input::new(peripherals.GPIO2, input_config),
        lift_dec: Input::new(peripherals.GPIO3, input_config),
        reset: Input::new(peripherals.GPIO9, input_config),
    };

    spawner
        .spawn(cover_task(
            peripherals.GPIO8,
            peripherals.RMT,
            buttons,
            report_publisher,
            command_mailbox,
            &MOTION_FLAGS,
        ))
        .unwrap_or_else(|_| restart_after_init_failure(CoverError::InitFailure));

    spawner
        .spawn(cover_mqtt_task(
            stack,
            report_subscriber,
            command_mailbox,
            &MOTION_FLAGS,
        ))
        .unwrap_or_else(|_| restart_after_init_failure(CoverError::InitFailure));

    // Main-Loop: schläft (alle Arbeit läuft in Tasks)
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}

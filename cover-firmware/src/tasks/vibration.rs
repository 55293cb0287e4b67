// Vibrations-Task - Schalter abtasten, Beginn/Ende melden
use cover_core::{SmartLedWriter, VibrationEvent, VibrationMonitor};
use defmt::{info, warn};
use embassy_time::{Duration, Instant, Ticker};
use esp_hal::gpio::Input;
use esp_hal_smartled::smart_led_buffer;
use rgb::RGB8;

use crate::board::restart_after_init_failure;
use crate::config::{LED_BRIGHTNESS, RMT_CLOCK_MHZ, VIBRATION_HOLD_OFF_MS, VIBRATION_SAMPLE_MS};
use crate::hal::RmtLedWriter;
use crate::{Telemetry, TelemetryPublisher};

/// Abtast-Loop ohne Task-Attribut
///
/// Der Schalter zieht bei Erschütterung gegen GND (aktiv low). Nur
/// Zustandswechsel werden gemeldet; LED rot solange Vibration aktiv.
pub async fn vibration_logic<L: SmartLedWriter>(
    switch: Input<'static>,
    mut led: L,
    telemetry_publisher: TelemetryPublisher,
) -> ! {
    let mut monitor = VibrationMonitor::new(VIBRATION_HOLD_OFF_MS);
    let mut ticker = Ticker::every(Duration::from_millis(VIBRATION_SAMPLE_MS));

    info!("Vibration: sampling every {}ms", VIBRATION_SAMPLE_MS);

    loop {
        ticker.next().await;

        let Some(event) = monitor.update(switch.is_low(), Instant::now().as_millis()) else {
            continue;
        };

        info!("Vibration: {}", event);
        telemetry_publisher.publish_immediate(Telemetry::Vibration(event));

        let color = match event {
            VibrationEvent::Started => RGB8 {
                r: LED_BRIGHTNESS,
                g: 0,
                b: 0,
            },
            VibrationEvent::Stopped => RGB8::default(),
        };
        if led.write(color).is_err() {
            warn!("Vibration: failed to write LED");
        }
    }
}

/// Vibrations Task - LED initialisieren, danach `vibration_logic()`
#[embassy_executor::task]
pub async fn vibration_task(
    switch: Input<'static>,
    gpio8: esp_hal::peripherals::GPIO8<'static>,
    rmt_peripheral: esp_hal::peripherals::RMT<'static>,
    telemetry_publisher: TelemetryPublisher,
) {
    let mut rmt_buffer = smart_led_buffer!(1);
    let led = match RmtLedWriter::new(gpio8, rmt_peripheral, RMT_CLOCK_MHZ, &mut rmt_buffer) {
        Ok(led) => led,
        Err(e) => restart_after_init_failure(e),
    };

    vibration_logic(switch, led, telemetry_publisher).await
}

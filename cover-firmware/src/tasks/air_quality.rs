// Luftqualitäts-Task - SCD4x alle paar Sekunden auslesen
use cover_core::{
    AirQuality, AirQualitySensor, MeasurementCycle, MeasurementSink, SmartLedWriter, co2_color,
    co2_level,
};
use defmt::{info, warn};
use embassy_time::{Duration, Ticker};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::time::Rate;
use esp_hal_smartled::smart_led_buffer;

use crate::board::restart_after_init_failure;
use crate::config::{I2C_FREQUENCY_KHZ, LED_BRIGHTNESS, MEASUREMENT_INTERVAL_SECS, RMT_CLOCK_MHZ};
use crate::hal::{RmtLedWriter, Scd4x};
use crate::{CoverError, Telemetry, TelemetryPublisher};

/// Messwert → MQTT + Ampel-Farbe auf der Status-LED
struct TelemetrySink<L: SmartLedWriter> {
    publisher: TelemetryPublisher,
    led: L,
}

impl<L: SmartLedWriter> MeasurementSink for TelemetrySink<L> {
    fn publish(&mut self, measurement: AirQuality) {
        self.publisher
            .publish_immediate(Telemetry::AirQuality(measurement));

        let level = co2_level(measurement.co2_ppm);
        if self.led.write(co2_color(level, LED_BRIGHTNESS)).is_err() {
            warn!("Air: failed to write LED");
        }
        info!("Air: {} ({})", measurement, level);
    }
}

/// Mess-Loop ohne Task-Attribut (generisch über Sensor und LED)
///
/// Ein fehlgeschlagener Zyklus wird übersprungen; kein Retry, der nächste
/// Zyklus läuft planmäßig.
pub async fn air_quality_logic<S, L>(
    mut sensor: S,
    led: L,
    telemetry_publisher: TelemetryPublisher,
) -> !
where
    S: AirQualitySensor,
    L: SmartLedWriter,
{
    if sensor.start().await.is_err() {
        restart_after_init_failure(CoverError::InitFailure);
    }
    info!("Air: measuring every {}s", MEASUREMENT_INTERVAL_SECS);

    let mut sink = TelemetrySink {
        publisher: telemetry_publisher,
        led,
    };
    let mut cycle = MeasurementCycle::new();
    let mut ticker = Ticker::every(Duration::from_secs(MEASUREMENT_INTERVAL_SECS));

    loop {
        ticker.next().await;

        if let Err(e) = cycle.run_once(&mut sensor, &mut sink).await {
            warn!(
                "Air: {} ({}), skipped {} of {}",
                e,
                cycle.last_failure(),
                cycle.skipped(),
                cycle.skipped() + cycle.completed()
            );
        }
    }
}

/// Luftqualitäts Task - I2C + LED initialisieren, danach `air_quality_logic()`
#[embassy_executor::task]
pub async fn air_quality_task(
    i2c0: esp_hal::peripherals::I2C0<'static>,
    sda: esp_hal::peripherals::GPIO6<'static>,
    scl: esp_hal::peripherals::GPIO7<'static>,
    gpio8: esp_hal::peripherals::GPIO8<'static>,
    rmt_peripheral: esp_hal::peripherals::RMT<'static>,
    telemetry_publisher: TelemetryPublisher,
) {
    let config = I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQUENCY_KHZ));
    let i2c = match I2c::new(i2c0, config) {
        Ok(i2c) => i2c.with_sda(sda).with_scl(scl).into_async(),
        Err(_) => restart_after_init_failure(CoverError::InitFailure),
    };

    let mut rmt_buffer = smart_led_buffer!(1);
    let led = match RmtLedWriter::new(gpio8, rmt_peripheral, RMT_CLOCK_MHZ, &mut rmt_buffer) {
        Ok(led) => led,
        Err(e) => restart_after_init_failure(e),
    };

    air_quality_logic(Scd4x::new(i2c), led, telemetry_publisher).await
}

// SCD4x CO2/Temperatur/Feuchte-Sensor über I2C
//
// Nur die Bus-Transaktionen liegen hier; Rahmen-Dekodierung und CRC
// sind in cover-core (`decode_scd4x_measurement`) und dort getestet.

use cover_core::{AirQuality, AirQualitySensor, SensorError, decode_scd4x_measurement};
use defmt::{Debug2Format, debug, warn};
use embassy_time::{Duration, Timer};
use esp_hal::Async;
use esp_hal::i2c::master::I2c;

/// Feste I2C-Adresse aller SCD4x
const ADDRESS: u8 = 0x62;

const CMD_START_PERIODIC_MEASUREMENT: u16 = 0x21B1;
const CMD_STOP_PERIODIC_MEASUREMENT: u16 = 0x3F86;
const CMD_READ_MEASUREMENT: u16 = 0xEC05;

/// Sensor braucht nach "stop" bis zu 500 ms, bevor er neue Kommandos annimmt
const STOP_SETTLE_MS: u64 = 500;
/// Ausführungszeit von "read_measurement"
const READ_DELAY_MS: u64 = 1;

pub struct Scd4x<'d> {
    i2c: I2c<'d, Async>,
}

impl<'d> Scd4x<'d> {
    pub fn new(i2c: I2c<'d, Async>) -> Self {
        Self { i2c }
    }

    async fn command(&mut self, command: u16) -> Result<(), SensorError> {
        self.i2c
            .write_async(ADDRESS, &command.to_be_bytes())
            .await
            .map_err(|e| {
                warn!("SCD4x: write {:04x} failed: {}", command, Debug2Format(&e));
                SensorError::Bus
            })
    }
}

impl AirQualitySensor for Scd4x<'_> {
    async fn start(&mut self) -> Result<(), SensorError> {
        // Eine evtl. noch laufende Messung (Warmstart) zuerst beenden
        self.command(CMD_STOP_PERIODIC_MEASUREMENT).await?;
        Timer::after(Duration::from_millis(STOP_SETTLE_MS)).await;

        self.command(CMD_START_PERIODIC_MEASUREMENT).await?;
        debug!("SCD4x: periodic measurement started");
        Ok(())
    }

    async fn read(&mut self) -> Result<AirQuality, SensorError> {
        self.command(CMD_READ_MEASUREMENT).await?;
        Timer::after(Duration::from_millis(READ_DELAY_MS)).await;

        let mut frame = [0u8; 9];
        self.i2c
            .read_async(ADDRESS, &mut frame)
            .await
            .map_err(|e| {
                warn!("SCD4x: read failed: {}", Debug2Format(&e));
                SensorError::Bus
            })?;

        decode_scd4x_measurement(&frame)
    }
}

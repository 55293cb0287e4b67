//! Sensor-Endpunkte: Mess-Zyklus, SCD4x-Rahmen, Vibrations-Erkennung
//!
//! Die I2C-Transaktion selbst gehört zur Firmware, hier liegt nur das,
//! was ohne Hardware testbar ist.

use crate::error::CoverError;
use crate::traits::{AirQualitySensor, MeasurementSink, SensorError};
use crate::types::{AirQuality, VibrationEvent};

/// Standard-Abklingzeit bis "Vibration vorbei" gemeldet wird
pub const DEFAULT_VIBRATION_HOLD_OFF_MS: u64 = 2000;

/// Ein Mess-Zyklus: lesen, bei Erfolg weitergeben, bei Fehler überspringen
///
/// Kein Retry innerhalb des Zyklus; der nächste Zyklus versucht es unabhängig neu.
/// Die Ursache des letzten Fehlschlags bleibt bis zum nächsten Erfolg abrufbar.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeasurementCycle {
    completed: u32,
    skipped: u32,
    last_failure: Option<SensorError>,
}

impl MeasurementCycle {
    pub const fn new() -> Self {
        Self {
            completed: 0,
            skipped: 0,
            last_failure: None,
        }
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    /// Ursache des letzten übersprungenen Zyklus (`None` nach einem Erfolg)
    pub fn last_failure(&self) -> Option<SensorError> {
        self.last_failure
    }

    pub async fn run_once<S, K>(
        &mut self,
        sensor: &mut S,
        sink: &mut K,
    ) -> Result<AirQuality, CoverError>
    where
        S: AirQualitySensor,
        K: MeasurementSink,
    {
        match sensor.read().await {
            Ok(measurement) => {
                sink.publish(measurement);
                self.completed = self.completed.wrapping_add(1);
                self.last_failure = None;
                Ok(measurement)
            }
            Err(cause) => {
                self.skipped = self.skipped.wrapping_add(1);
                self.last_failure = Some(cause);
                Err(CoverError::SensorReadFailure)
            }
        }
    }
}

/// Sensirion CRC-8 (Polynom 0x31, Startwert 0xFF) über ein Datenwort
pub fn sensirion_crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Dekodiert die 9 Bytes von `read_measurement` (3 Worte + je 1 CRC-Byte)
///
/// CO2 in ppm, Temperatur `-45 + 175 × raw / 65535`, Feuchte `100 × raw / 65535`.
/// Ein CO2-Wert von 0 bedeutet: noch keine gültige Messung.
pub fn decode_scd4x_measurement(frame: &[u8; 9]) -> Result<AirQuality, SensorError> {
    let mut words = [0u16; 3];
    for (word, chunk) in words.iter_mut().zip(frame.chunks_exact(3)) {
        if sensirion_crc8(&chunk[..2]) != chunk[2] {
            return Err(SensorError::Crc);
        }
        *word = u16::from_be_bytes([chunk[0], chunk[1]]);
    }

    let [co2_ppm, raw_temperature, raw_humidity] = words;
    if co2_ppm == 0 {
        return Err(SensorError::NotReady);
    }

    Ok(AirQuality {
        co2_ppm,
        temperature_c: -45.0 + 175.0 * raw_temperature as f32 / 65535.0,
        humidity_pct: 100.0 * raw_humidity as f32 / 65535.0,
    })
}

/// Entprellt einen Vibrations-Schalter zu Start/Stop-Ereignissen
///
/// Jeder aktive Abtastwert verlängert die Aktivität; erst nach
/// `hold_off_ms` ohne Aktivität wird `Stopped` gemeldet.
#[derive(Debug, Clone, Copy)]
pub struct VibrationMonitor {
    hold_off_ms: u64,
    active: bool,
    last_activity_ms: u64,
}

impl VibrationMonitor {
    pub const fn new(hold_off_ms: u64) -> Self {
        Self {
            hold_off_ms,
            active: false,
            last_activity_ms: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn update(&mut self, raw_active: bool, now_ms: u64) -> Option<VibrationEvent> {
        if raw_active {
            self.last_activity_ms = now_ms;
            if !self.active {
                self.active = true;
                return Some(VibrationEvent::Started);
            }
            return None;
        }

        if self.active && now_ms.saturating_sub(self.last_activity_ms) >= self.hold_off_ms {
            self.active = false;
            return Some(VibrationEvent::Stopped);
        }
        None
    }
}

impl Default for VibrationMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_VIBRATION_HOLD_OFF_MS)
    }
}

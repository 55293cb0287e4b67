//! Hardware Abstraction Traits
//!
//! Diese Traits definieren die Schnittstellen zu den externen Kollaborateuren
//! (Netzwerk, Anzeige, Zeitgeber, Sensor, LED) ohne konkrete Implementierung.
//!
//! # Implementierungen
//! - **Production:** in `cover-firmware` (embassy Timer, MQTT PubSub, RMT LED, I2C Sensor)
//! - **Testing:** In-Memory Mocks in `cover-tests`

use rgb::RGB8;

use crate::types::{AirQuality, Axis, Position};

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedError {
    WriteFailed,
}

/// Fehler-Typ für Sensor-Zugriffe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// I2C-Transaktion fehlgeschlagen
    Bus,
    /// Prüfsumme eines Datenworts stimmt nicht
    Crc,
    /// Sensor hat noch keinen gültigen Messwert
    NotReady,
}

/// Senke für Positions-Meldungen (Controller → Netzwerk)
///
/// Wird nach **jedem** Schritt aufgerufen. Muss aus Sicht des Controllers
/// nicht-blockierend sein; Übertragungsfehler werden nicht zurückgemeldet.
pub trait PositionReporter {
    fn report(&mut self, axis: Axis, percent: u8);
}

/// Senke für die Anzeige der aktuellen Position (fire-and-forget)
pub trait PositionDisplay {
    fn show(&mut self, position: Position);
}

/// Kooperative Wartezeit zwischen zwei Schritten
///
/// Auf dem Gerät ein `embassy_time::Timer`, in Tests ein Mock ohne echte Zeit.
/// Während des Wartens dürfen andere Tasks laufen (z.B. einen Stop auslösen).
#[allow(async_fn_in_trait)]
pub trait StepTimer {
    async fn wait_ms(&mut self, ms: u32);
}

/// CO2/Temperatur/Feuchte-Sensor
#[allow(async_fn_in_trait)]
pub trait AirQualitySensor {
    /// Startet die periodische Messung
    async fn start(&mut self) -> Result<(), SensorError>;

    /// Liest den letzten Messwert
    async fn read(&mut self) -> Result<AirQuality, SensorError>;
}

/// Senke für erfolgreiche Messwerte (Sensor → Netzwerk)
pub trait MeasurementSink {
    fn publish(&mut self, measurement: AirQuality);
}

/// Trait für SmartLED Hardware-Zugriff
///
/// Die Status-LED dient als minimale "Anzeige" der Geräte.
pub trait SmartLedWriter: Send {
    /// Schreibt eine RGB-Farbe auf die LED
    ///
    /// # Fehlerbehandlung
    /// Gibt `LedError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn write(&mut self, color: RGB8) -> Result<(), LedError>;
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            SensorError::Bus => defmt::write!(fmt, "I2C bus error"),
            SensorError::Crc => defmt::write!(fmt, "CRC mismatch"),
            SensorError::NotReady => defmt::write!(fmt, "no data"),
        }
    }
}

//! Fehler-Arten der Geräte-Logik
//!
//! Kleine, geschlossene Aufzählung statt Freitext-Meldungen.
//! Alle Fehler entstehen an den Rändern (Init, Sensor, Kommando-Parser),
//! der Positions-Controller selbst kennt keine Fehlerpfade.

use core::fmt;

/// Fehler-Typ für Geräte-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverError {
    /// Funk, Netzwerk oder Sensor konnte nicht gestartet werden → Neustart
    InitFailure,
    /// Sensor-Messung fehlgeschlagen → Mess-Zyklus wird übersprungen
    SensorReadFailure,
    /// Prozentwert außerhalb 0..=100
    CommandOutOfRange,
    /// Kommando-Text nicht erkannt
    UnknownCommand,
    /// Achsen-Grenzen mit min >= max
    InvalidBounds,
}

impl CoverError {
    pub fn as_str(self) -> &'static str {
        match self {
            CoverError::InitFailure => "initialization failed",
            CoverError::SensorReadFailure => "sensor read failed",
            CoverError::CommandOutOfRange => "command out of range",
            CoverError::UnknownCommand => "unknown command",
            CoverError::InvalidBounds => "invalid axis bounds",
        }
    }
}

impl fmt::Display for CoverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CoverError {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.as_str())
    }
}

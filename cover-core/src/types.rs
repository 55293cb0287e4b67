//! Core Types für Jalousie-Steuerung und Sensor-Endpunkte
//!
//! Datenstrukturen ohne Hardware-Dependencies

use crate::error::CoverError;

/// Bewegungsachse der Jalousie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Axis {
    /// Hub (hoch/runter)
    Lift,
    /// Lamellen-Neigung
    Tilt,
}

impl Axis {
    /// Verarbeitungs-Reihenfolge innerhalb eines Ticks: erst Lift, dann Tilt
    pub const ALL: [Axis; 2] = [Axis::Lift, Axis::Tilt];

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::Lift => "lift",
            Axis::Tilt => "tilt",
        }
    }
}

/// Geschlossener Wertebereich `[min, max]` einer Achse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisBounds {
    min: u8,
    max: u8,
}

impl AxisBounds {
    /// Erstellt einen Wertebereich
    ///
    /// # Fehlerbehandlung
    /// Gibt `CoverError::InvalidBounds` zurück wenn `min >= max`
    /// (Prozent-Umrechnung bräuchte sonst eine Division durch 0).
    pub const fn new(min: u8, max: u8) -> Result<Self, CoverError> {
        if min >= max {
            return Err(CoverError::InvalidBounds);
        }
        Ok(Self { min, max })
    }

    pub const fn min(&self) -> u8 {
        self.min
    }

    pub const fn max(&self) -> u8 {
        self.max
    }

    /// Anzahl Schritte von min bis max
    pub const fn span(&self) -> u8 {
        self.max - self.min
    }

    pub fn contains(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Klemmt einen (auch negativen) Wert in den Bereich
    pub fn clamp(&self, value: i16) -> u8 {
        value.clamp(self.min as i16, self.max as i16) as u8
    }
}

/// Aktuelle Position beider Achsen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub lift: u8,
    pub tilt: u8,
}

impl Position {
    pub fn get(&self, axis: Axis) -> u8 {
        match axis {
            Axis::Lift => self.lift,
            Axis::Tilt => self.tilt,
        }
    }
}

/// Bewegungs-Zustand des Controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Idle,
    Moving,
}

/// Positions-Meldung nach jedem Schritt (Controller → Netzwerk)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionReport {
    pub axis: Axis,
    pub percent: u8,
}

/// Fern-Kommando für die Jalousie
///
/// Entspricht den Callbacks des Netzwerk-Endpunkts
/// (`onOpen`, `onClose`, `onStop`, `onGoToLiftPercentage`, `onGoToTiltPercentage`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverCommand {
    Open,
    Close,
    Stop,
    GoToLiftPercentage(u8),
    GoToTiltPercentage(u8),
}

impl CoverCommand {
    /// Achse, deren Ziel das Kommando setzt (Stop setzt kein Ziel)
    pub fn axis(self) -> Option<Axis> {
        match self {
            CoverCommand::Open | CoverCommand::Close | CoverCommand::GoToLiftPercentage(_) => {
                Some(Axis::Lift)
            }
            CoverCommand::GoToTiltPercentage(_) => Some(Axis::Tilt),
            CoverCommand::Stop => None,
        }
    }
}

impl core::convert::TryFrom<&str> for CoverCommand {
    type Error = CoverError;

    /// Parst Text-Kommandos wie `OPEN`, `STOP` oder `LIFT 50`
    ///
    /// Groß-/Kleinschreibung egal, Whitespace am Rand wird ignoriert.
    /// Prozentwerte > 100 ergeben `CommandOutOfRange`.
    fn try_from(text: &str) -> Result<Self, Self::Error> {
        let mut words = text.split_whitespace();
        let verb = words.next().ok_or(CoverError::UnknownCommand)?;
        let argument = words.next();
        if words.next().is_some() {
            return Err(CoverError::UnknownCommand);
        }

        let keyword = |name: &str| verb.eq_ignore_ascii_case(name);

        match argument {
            None if keyword("open") => Ok(Self::Open),
            None if keyword("close") => Ok(Self::Close),
            None if keyword("stop") => Ok(Self::Stop),
            Some(arg) if keyword("lift") => Ok(Self::GoToLiftPercentage(parse_percent(arg)?)),
            Some(arg) if keyword("tilt") => Ok(Self::GoToTiltPercentage(parse_percent(arg)?)),
            _ => Err(CoverError::UnknownCommand),
        }
    }
}

fn parse_percent(arg: &str) -> Result<u8, CoverError> {
    let value: u32 = arg.parse().map_err(|_| CoverError::UnknownCommand)?;
    if value > 100 {
        return Err(CoverError::CommandOutOfRange);
    }
    Ok(value as u8)
}

/// Messwert des CO2/Temperatur/Feuchte-Sensors
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AirQuality {
    pub co2_ppm: u16,
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Luftqualitäts-Stufe für die Status-LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Co2Level {
    Good,
    Moderate,
    Poor,
}

/// Zustandswechsel des Vibrations-Sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VibrationEvent {
    Started,
    Stopped,
}

impl VibrationEvent {
    /// Payload für das Netzwerk
    pub fn as_str(self) -> &'static str {
        match self {
            VibrationEvent::Started => "ON",
            VibrationEvent::Stopped => "OFF",
        }
    }
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for Axis {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Position {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Position {{ lift: {}, tilt: {} }}", self.lift, self.tilt)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MotionState {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MotionState::Idle => defmt::write!(fmt, "Idle"),
            MotionState::Moving => defmt::write!(fmt, "Moving"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PositionReport {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{} = {}%", self.axis, self.percent)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CoverCommand {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            CoverCommand::Open => defmt::write!(fmt, "Open"),
            CoverCommand::Close => defmt::write!(fmt, "Close"),
            CoverCommand::Stop => defmt::write!(fmt, "Stop"),
            CoverCommand::GoToLiftPercentage(p) => defmt::write!(fmt, "GoToLift({}%)", p),
            CoverCommand::GoToTiltPercentage(p) => defmt::write!(fmt, "GoToTilt({}%)", p),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AirQuality {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "AirQuality {{ co2: {} ppm, temp: {} C, rh: {} % }}",
            self.co2_ppm,
            self.temperature_c,
            self.humidity_pct
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Co2Level {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Co2Level::Good => defmt::write!(fmt, "Good"),
            Co2Level::Moderate => defmt::write!(fmt, "Moderate"),
            Co2Level::Poor => defmt::write!(fmt, "Poor"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for VibrationEvent {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_reject_empty_range() {
        assert_eq!(AxisBounds::new(5, 5), Err(CoverError::InvalidBounds));
        assert_eq!(AxisBounds::new(9, 0), Err(CoverError::InvalidBounds));
    }

    #[test]
    fn test_bounds_clamp() {
        let bounds = AxisBounds::new(0, 9).unwrap();
        assert_eq!(bounds.clamp(-3), 0);
        assert_eq!(bounds.clamp(4), 4);
        assert_eq!(bounds.clamp(42), 9);
    }

    #[test]
    fn test_command_keywords() {
        assert_eq!(CoverCommand::try_from("OPEN"), Ok(CoverCommand::Open));
        assert_eq!(CoverCommand::try_from(" close\n"), Ok(CoverCommand::Close));
        assert_eq!(CoverCommand::try_from("Stop"), Ok(CoverCommand::Stop));
    }

    #[test]
    fn test_command_percentages() {
        assert_eq!(
            CoverCommand::try_from("LIFT 50"),
            Ok(CoverCommand::GoToLiftPercentage(50))
        );
        assert_eq!(
            CoverCommand::try_from("tilt 100"),
            Ok(CoverCommand::GoToTiltPercentage(100))
        );
        assert_eq!(
            CoverCommand::try_from("LIFT 101"),
            Err(CoverError::CommandOutOfRange)
        );
    }

    #[test]
    fn test_command_garbage() {
        assert_eq!(CoverCommand::try_from(""), Err(CoverError::UnknownCommand));
        assert_eq!(CoverCommand::try_from("LIFT"), Err(CoverError::UnknownCommand));
        assert_eq!(CoverCommand::try_from("LIFT -1"), Err(CoverError::UnknownCommand));
        assert_eq!(CoverCommand::try_from("OPEN 3"), Err(CoverError::UnknownCommand));
        assert_eq!(
            CoverCommand::try_from("LIFT 10 20"),
            Err(CoverError::UnknownCommand)
        );
    }
}

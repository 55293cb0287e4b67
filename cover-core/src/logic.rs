//! Pure Business Logic Functions
//!
//! Funktionen ohne Hardware-Dependencies (testbar!)
//!
//! Rundungsregel überall: kaufmännisch (halbe Schritte aufrunden), in
//! Ganzzahl-Arithmetik. Jede Achse rechnet mit ihren eigenen Grenzen.

use rgb::RGB8;

use crate::error::CoverError;
use crate::types::{AxisBounds, Co2Level, Position};

/// CO2-Grenze zwischen "gut" und "mittel" in ppm
pub const CO2_MODERATE_PPM: u16 = 1000;

/// CO2-Grenze zwischen "mittel" und "schlecht" in ppm
pub const CO2_POOR_PPM: u16 = 1500;

/// Rechnet einen Achsen-Wert in Prozent um
///
/// `round(100 × (value − min) / (max − min))`, Werte außerhalb werden geklemmt.
///
/// # Beispiele
///
/// ```
/// # use cover_core::{AxisBounds, value_to_percent};
/// let lift = AxisBounds::new(0, 9).unwrap();
/// assert_eq!(value_to_percent(8, lift), 89);
/// assert_eq!(value_to_percent(9, lift), 100);
/// ```
pub fn value_to_percent(value: u8, bounds: AxisBounds) -> u8 {
    let span = bounds.span() as u32;
    let offset = (bounds.clamp(value as i16) - bounds.min()) as u32;
    ((100 * offset + span / 2) / span) as u8
}

/// Rechnet einen Prozentwert (0..=100) in einen Achsen-Wert um
///
/// `round(percent × (max − min) / 100) + min`
///
/// # Fehlerbehandlung
/// Gibt `CoverError::CommandOutOfRange` zurück wenn `percent > 100`
///
/// # Beispiele
///
/// ```
/// # use cover_core::{AxisBounds, percent_to_value};
/// let lift = AxisBounds::new(0, 9).unwrap();
/// assert_eq!(percent_to_value(50, lift), Ok(5));
/// ```
pub fn percent_to_value(percent: u8, bounds: AxisBounds) -> Result<u8, CoverError> {
    if percent > 100 {
        return Err(CoverError::CommandOutOfRange);
    }
    let span = bounds.span() as u32;
    let offset = (percent as u32 * span + 50) / 100;
    Ok(bounds.min() + offset as u8)
}

/// Ein Schritt um genau 1 in Richtung Ziel (oder stehen bleiben)
pub fn step_toward(current: u8, target: u8) -> u8 {
    match current.cmp(&target) {
        core::cmp::Ordering::Less => current + 1,
        core::cmp::Ordering::Greater => current - 1,
        core::cmp::Ordering::Equal => current,
    }
}

/// Farbe der Status-LED für eine Position
///
/// Lift → Blau-Anteil, Tilt → Grün-Anteil, jeweils skaliert auf `brightness`.
pub fn position_color(
    position: Position,
    lift: AxisBounds,
    tilt: AxisBounds,
    brightness: u8,
) -> RGB8 {
    let scale = |percent: u8| ((brightness as u16 * percent as u16 + 50) / 100) as u8;
    RGB8 {
        r: 0,
        g: scale(value_to_percent(position.tilt, tilt)),
        b: scale(value_to_percent(position.lift, lift)),
    }
}

/// Ordnet einen CO2-Wert einer Luftqualitäts-Stufe zu
pub fn co2_level(co2_ppm: u16) -> Co2Level {
    if co2_ppm < CO2_MODERATE_PPM {
        Co2Level::Good
    } else if co2_ppm < CO2_POOR_PPM {
        Co2Level::Moderate
    } else {
        Co2Level::Poor
    }
}

/// Ampel-Farbe für eine Luftqualitäts-Stufe: Grün → Gelb → Rot
pub fn co2_color(level: Co2Level, brightness: u8) -> RGB8 {
    match level {
        Co2Level::Good => RGB8 {
            r: 0,
            g: brightness,
            b: 0,
        },
        Co2Level::Moderate => RGB8 {
            r: brightness,
            g: brightness,
            b: 0,
        },
        Co2Level::Poor => RGB8 {
            r: brightness,
            g: 0,
            b: 0,
        },
    }
}

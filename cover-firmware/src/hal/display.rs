// Positions-Anzeige über die Status-LED
use cover_core::{AxisBounds, Position, PositionDisplay, SmartLedWriter, position_color};
use defmt::{debug, warn};

/// Zeigt die aktuelle Position als Farbe an (Lift → Blau, Tilt → Grün)
///
/// Fire-and-forget: ein Schreibfehler wird geloggt, die Fahrt läuft weiter.
pub struct LedPositionDisplay<L: SmartLedWriter> {
    led: L,
    lift: AxisBounds,
    tilt: AxisBounds,
    brightness: u8,
}

impl<L: SmartLedWriter> LedPositionDisplay<L> {
    pub fn new(led: L, lift: AxisBounds, tilt: AxisBounds, brightness: u8) -> Self {
        Self {
            led,
            lift,
            tilt,
            brightness,
        }
    }
}

impl<L: SmartLedWriter> PositionDisplay for LedPositionDisplay<L> {
    fn show(&mut self, position: Position) {
        debug!("Display: lift={} tilt={}", position.lift, position.tilt);

        let color = position_color(position, self.lift, self.tilt, self.brightness);
        if self.led.write(color).is_err() {
            warn!("Display: failed to write LED");
        }
    }
}

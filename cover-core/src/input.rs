//! Taster-Gesten: Drück-Flanke und langer Druck
//!
//! Zeit kommt immer von außen (`now_ms`), damit die Logik ohne echte
//! Uhr testbar bleibt.

/// Haltedauer für den Werksreset
pub const FACTORY_RESET_HOLD_MS: u64 = 3000;

/// Erkennt den Übergang losgelassen → gedrückt
#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeDetector {
    was_pressed: bool,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        Self { was_pressed: false }
    }

    /// Gibt genau beim Drücken einmal `true` zurück
    pub fn update(&mut self, pressed: bool) -> bool {
        let edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        edge
    }
}

/// Erkennt einen langen Druck (z.B. 3 s für Werksreset)
///
/// Feuert genau einmal pro Halten, sobald die Schwelle erreicht ist.
/// Erst nach dem Loslassen wieder scharf.
#[derive(Debug, Clone, Copy)]
pub struct LongPress {
    threshold_ms: u64,
    pressed_since: Option<u64>,
    fired: bool,
}

impl LongPress {
    pub const fn new(threshold_ms: u64) -> Self {
        Self {
            threshold_ms,
            pressed_since: None,
            fired: false,
        }
    }

    /// Wie lange der Taster schon gehalten wird
    pub fn held_ms(&self, now_ms: u64) -> u64 {
        self.pressed_since
            .map_or(0, |since| now_ms.saturating_sub(since))
    }

    pub fn update(&mut self, pressed: bool, now_ms: u64) -> bool {
        if !pressed {
            self.pressed_since = None;
            self.fired = false;
            return false;
        }

        self.pressed_since.get_or_insert(now_ms);
        if !self.fired && self.held_ms(now_ms) >= self.threshold_ms {
            self.fired = true;
            return true;
        }
        false
    }
}

impl Default for LongPress {
    fn default() -> Self {
        Self::new(FACTORY_RESET_HOLD_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_only_once_per_press() {
        let mut edge = EdgeDetector::new();
        assert!(!edge.update(false));
        assert!(edge.update(true));
        assert!(!edge.update(true));
        assert!(!edge.update(false));
        assert!(edge.update(true));
    }

    #[test]
    fn test_long_press_fires_at_threshold() {
        let mut press = LongPress::default();
        assert!(!press.update(true, 1_000));
        assert!(!press.update(true, 3_999));
        assert!(press.update(true, 4_000));
        assert!(!press.update(true, 9_000));
    }

    #[test]
    fn test_short_press_is_ignored() {
        let mut press = LongPress::new(3_000);
        assert!(!press.update(true, 0));
        assert!(!press.update(true, 2_500));
        assert!(!press.update(false, 2_600));
        assert!(!press.update(true, 2_700));
        assert!(!press.update(true, 5_600));
        assert!(press.update(true, 5_700));
    }
}

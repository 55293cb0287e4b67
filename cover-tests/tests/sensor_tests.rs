//! Integration Tests für Sensor-Endpunkte, Prozent-Umrechnung und Taster-Gesten
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen einen Mock-Sensor

use cover_core::{
    AirQuality, AirQualitySensor, AxisBounds, Co2Level, CoverError, EdgeDetector, LedError,
    LongPress, MeasurementCycle, MeasurementSink, SensorError, SmartLedWriter, VibrationEvent,
    VibrationMonitor, co2_color, co2_level, percent_to_value, value_to_percent,
};
use embassy_futures::block_on;
use proptest::prelude::*;
use rgb::RGB8;

// ============================================================================
// Mocks
// ============================================================================

/// Mock-Sensor: liefert der Reihe nach die vorbereiteten Ergebnisse
pub struct MockSensor {
    pub results: Vec<Result<AirQuality, SensorError>>,
    pub started: bool,
}

impl AirQualitySensor for MockSensor {
    async fn start(&mut self) -> Result<(), SensorError> {
        self.started = true;
        Ok(())
    }

    async fn read(&mut self) -> Result<AirQuality, SensorError> {
        if self.results.is_empty() {
            return Err(SensorError::NotReady);
        }
        self.results.remove(0)
    }
}

#[derive(Default)]
pub struct MockSink {
    pub published: Vec<AirQuality>,
}

impl MeasurementSink for MockSink {
    fn publish(&mut self, measurement: AirQuality) {
        self.published.push(measurement);
    }
}

#[derive(Default)]
pub struct MockLedWriter {
    pub last_color: Option<RGB8>,
    pub write_count: usize,
}

impl SmartLedWriter for MockLedWriter {
    fn write(&mut self, color: RGB8) -> Result<(), LedError> {
        self.last_color = Some(color);
        self.write_count += 1;
        Ok(())
    }
}

fn sample(co2_ppm: u16) -> AirQuality {
    AirQuality {
        co2_ppm,
        temperature_c: 21.5,
        humidity_pct: 40.0,
    }
}

// ============================================================================
// Tests: MeasurementCycle
// ============================================================================

#[test]
fn test_cycle_publishes_successful_reads() {
    let mut sensor = MockSensor {
        results: vec![Ok(sample(650))],
        started: false,
    };
    let mut sink = MockSink::default();
    let mut cycle = MeasurementCycle::new();

    let result = block_on(cycle.run_once(&mut sensor, &mut sink));

    assert_eq!(result, Ok(sample(650)));
    assert_eq!(sink.published, vec![sample(650)]);
    assert_eq!(cycle.completed(), 1);
}

#[test]
fn test_cycle_skips_failed_read_and_recovers() {
    let mut sensor = MockSensor {
        results: vec![Err(SensorError::Crc), Ok(sample(1200))],
        started: false,
    };
    let mut sink = MockSink::default();
    let mut cycle = MeasurementCycle::new();

    // Erster Zyklus schlägt fehl: nichts wird publiziert, kein Retry
    let first = block_on(cycle.run_once(&mut sensor, &mut sink));
    assert_eq!(first, Err(CoverError::SensorReadFailure));
    assert_eq!(cycle.last_failure(), Some(SensorError::Crc));
    assert!(sink.published.is_empty());

    // Nächster Zyklus versucht es unabhängig neu
    let second = block_on(cycle.run_once(&mut sensor, &mut sink));
    assert!(second.is_ok());
    assert_eq!(sink.published.len(), 1);
    assert_eq!(cycle.skipped(), 1);
    assert_eq!(cycle.completed(), 1);
    assert_eq!(cycle.last_failure(), None);
}

#[test]
fn test_cycle_keeps_cause_of_latest_failure() {
    let mut sensor = MockSensor {
        results: vec![Err(SensorError::Bus), Err(SensorError::NotReady)],
        started: false,
    };
    let mut sink = MockSink::default();
    let mut cycle = MeasurementCycle::new();

    let _ = block_on(cycle.run_once(&mut sensor, &mut sink));
    assert_eq!(cycle.last_failure(), Some(SensorError::Bus));

    let _ = block_on(cycle.run_once(&mut sensor, &mut sink));
    assert_eq!(cycle.last_failure(), Some(SensorError::NotReady));
    assert_eq!(cycle.skipped(), 2);
}

// ============================================================================
// Tests: CO2-Ampel und Status-LED
// ============================================================================

#[test]
fn test_co2_indicator_on_led() {
    let mut led = MockLedWriter::default();

    led.write(co2_color(co2_level(1800), 10)).unwrap();
    assert_eq!(led.last_color, Some(RGB8 { r: 10, g: 0, b: 0 }));

    led.write(co2_color(Co2Level::Moderate, 10)).unwrap();
    assert_eq!(led.last_color, Some(RGB8 { r: 10, g: 10, b: 0 }));
    assert_eq!(led.write_count, 2);
}

// ============================================================================
// Tests: Vibration und Taster
// ============================================================================

#[test]
fn test_vibration_burst_is_one_event_pair() {
    let mut monitor = VibrationMonitor::new(2_000);
    let mut events = Vec::new();

    // Schalter prellt: an/aus/an innerhalb der Abklingzeit
    for (now, raw) in [(0, true), (50, false), (100, true), (150, false), (2_200, false)] {
        if let Some(event) = monitor.update(raw, now) {
            events.push(event);
        }
    }

    assert_eq!(events, vec![VibrationEvent::Started, VibrationEvent::Stopped]);
    assert!(!monitor.is_active());
}

#[test]
fn test_factory_reset_needs_three_seconds() {
    let mut press = LongPress::default();
    let mut fired_at = None;

    for now in (0..5_000).step_by(50) {
        if press.update(true, now) {
            fired_at = Some(now);
            break;
        }
    }

    assert_eq!(fired_at, Some(3_000));
}

#[test]
fn test_button_edge_counts_presses() {
    let mut edge = EdgeDetector::new();
    let samples = [false, true, true, false, true, false, false, true];
    let presses = samples.iter().filter(|pressed| edge.update(**pressed)).count();
    assert_eq!(presses, 3);
}

// ============================================================================
// Property Tests: Prozent-Umrechnung
// ============================================================================

proptest! {
    #[test]
    fn prop_percentage_end_points_and_monotonic(max in 1u8..=255) {
        let bounds = AxisBounds::new(0, max).unwrap();
        prop_assert_eq!(value_to_percent(0, bounds), 0);
        prop_assert_eq!(value_to_percent(max, bounds), 100);

        for value in 0..max {
            prop_assert!(value_to_percent(value, bounds) <= value_to_percent(value + 1, bounds));
        }
    }

    #[test]
    fn prop_percent_to_value_stays_in_bounds(min in 0u8..100, span in 1u8..100, percent in 0u8..=100) {
        let bounds = AxisBounds::new(min, min + span).unwrap();
        let value = percent_to_value(percent, bounds).unwrap();
        prop_assert!(bounds.contains(value));
    }
}

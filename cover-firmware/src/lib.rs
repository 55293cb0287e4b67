// Library-Root: Gemeinsame Module der drei Geräte-Programme
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod board;
pub mod config;
pub mod hal;
pub mod tasks;

// Re-exports von cover-core
pub use cover_core::{
    AirQuality, Axis, CoverCommand, CoverError, LatestCommands, MotionFlags, PositionReport,
    RemoteDispatch, VibrationEvent,
};

use core::cell::RefCell;

// Embassy Channel-Typen
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::pubsub::{PubSubChannel, Publisher, Subscriber};

/// Telemetrie der Sensor-Geräte (Sensor-Task → MQTT)
#[derive(Clone, Copy, Debug)]
pub enum Telemetry {
    AirQuality(AirQuality),
    Vibration(VibrationEvent),
}

impl defmt::Format for Telemetry {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Telemetry::AirQuality(measurement) => defmt::write!(fmt, "{}", measurement),
            Telemetry::Vibration(event) => defmt::write!(fmt, "Vibration {}", event),
        }
    }
}

// ============================================================================
// Type-Aliase für Channel-Typen
// ============================================================================
//
// Statt:  Publisher<'static, NoopRawMutex, PositionReport, 8, 1, 1>
// Nutze:  ReportPublisher

/// PubSubChannel für Positions-Meldungen (Control-Loop → MQTT)
/// - 8: Kapazität, reicht für eine volle Fahrt ohne Verbindung
/// - 1: ein Subscriber (MQTT)
/// - 1: ein Publisher (Control-Loop)
pub type ReportChannel = PubSubChannel<NoopRawMutex, PositionReport, 8, 1, 1>;

/// Publisher für Positions-Meldungen
/// `publish_immediate` blockiert nie, bei voller Queue fällt die älteste Meldung weg
pub type ReportPublisher = Publisher<'static, NoopRawMutex, PositionReport, 8, 1, 1>;

/// Subscriber für Positions-Meldungen
pub type ReportSubscriber = Subscriber<'static, NoopRawMutex, PositionReport, 8, 1, 1>;

/// Ablage für Fern-Kommandos (MQTT → Control-Loop)
/// Pro Achse nur das jüngste Kommando; Stop läuft NICHT hierüber,
/// sondern direkt über `MotionFlags`
pub type CommandMailbox = Mutex<NoopRawMutex, RefCell<LatestCommands>>;

/// PubSubChannel für Sensor-Telemetrie (Sensor-Task → MQTT)
pub type TelemetryChannel = PubSubChannel<NoopRawMutex, Telemetry, 4, 1, 1>;

/// Publisher für Sensor-Telemetrie
pub type TelemetryPublisher = Publisher<'static, NoopRawMutex, Telemetry, 4, 1, 1>;

/// Subscriber für Sensor-Telemetrie
pub type TelemetrySubscriber = Subscriber<'static, NoopRawMutex, Telemetry, 4, 1, 1>;

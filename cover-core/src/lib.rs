//! Cover Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert nur Traits und Pure Logic für die drei Geräte:
//! Jalousie (Positions-Controller), CO2-Sensor und Vibrations-Sensor.

#![no_std]

pub mod controller;
pub mod error;
pub mod input;
pub mod logic;
pub mod sensor;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use controller::{
    AxisMotion, ControllerConfig, DEFAULT_STEP_DELAY_MS, LatestCommands, MotionFlags,
    PositionController, RemoteDispatch, TickSummary,
};
pub use error::CoverError;
pub use input::{EdgeDetector, FACTORY_RESET_HOLD_MS, LongPress};
pub use logic::{co2_color, co2_level, percent_to_value, position_color, step_toward, value_to_percent};
pub use sensor::{
    DEFAULT_VIBRATION_HOLD_OFF_MS, MeasurementCycle, VibrationMonitor, decode_scd4x_measurement,
    sensirion_crc8,
};
pub use traits::{
    AirQualitySensor, LedError, MeasurementSink, PositionDisplay, PositionReporter, SensorError,
    SmartLedWriter, StepTimer,
};
pub use types::{
    AirQuality, Axis, AxisBounds, Co2Level, CoverCommand, MotionState, Position, PositionReport,
    VibrationEvent,
};

// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Tasks kommunizieren über Embassy Channels (Control-Loop ↔ MQTT, Sensor → MQTT).

pub mod air_quality;
pub mod cover;
pub mod mqtt;
pub mod vibration;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use air_quality::air_quality_task;
pub use cover::{CoverButtons, cover_task};
pub use mqtt::{cover_mqtt_task, telemetry_mqtt_task};
pub use vibration::vibration_task;
pub use wifi::{connection_task, dhcp_task, net_task};

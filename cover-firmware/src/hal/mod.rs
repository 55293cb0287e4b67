// Hardware Abstraction Layer (HAL) Module
//
// Konkrete Implementierungen der Traits aus cover-core für den ESP32-C6.
// Die Logik dahinter ist in cover-tests ohne Hardware getestet.

pub mod display;
pub mod led_writer;
pub mod scd4x;

pub use display::LedPositionDisplay;
pub use led_writer::RmtLedWriter;
pub use scd4x::Scd4x;

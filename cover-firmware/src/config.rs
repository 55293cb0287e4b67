// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen

use cover_core::{AxisBounds, ControllerConfig, FACTORY_RESET_HOLD_MS};

// ============================================================================
// Jalousie Konfiguration
// ============================================================================

/// Hub-Bereich der simulierten Jalousie (Schritte)
pub const LIFT_BOUNDS: AxisBounds = match AxisBounds::new(0, 9) {
    Ok(bounds) => bounds,
    Err(_) => panic!("invalid lift bounds"),
};

/// Neigungs-Bereich der Lamellen (Schritte)
pub const TILT_BOUNDS: AxisBounds = match AxisBounds::new(0, 5) {
    Ok(bounds) => bounds,
    Err(_) => panic!("invalid tilt bounds"),
};

/// Wartezeit zwischen zwei Schritten in Millisekunden
pub const STEP_DELAY_MS: u32 = 250;

/// Controller-Konfiguration (Startposition = Maximum beider Achsen)
pub const COVER_CONFIG: ControllerConfig =
    ControllerConfig::new(LIFT_BOUNDS, TILT_BOUNDS).with_step_delay_ms(STEP_DELAY_MS);

/// Abtast-Intervall des Control-Loops (Taster, Kommandos) in Millisekunden
pub const POLL_INTERVAL_MS: u64 = 20;

// ============================================================================
// Taster und Sensoren (Pin-Zuordnung steht in den Programmen unter src/bin)
// ============================================================================

/// Haltedauer für Werksreset in Millisekunden
pub const RESET_HOLD_MS: u64 = FACTORY_RESET_HOLD_MS;

/// I2C Taktfrequenz in kHz
pub const I2C_FREQUENCY_KHZ: u32 = 100;

/// Mess-Intervall des CO2-Sensors in Sekunden
/// SCD4x liefert im Periodic-Modus alle 5 s einen neuen Wert
pub const MEASUREMENT_INTERVAL_SECS: u64 = 5;

/// Abtast-Intervall des Vibrations-Schalters in Millisekunden
pub const VIBRATION_SAMPLE_MS: u64 = 50;

/// Abklingzeit bis "Vibration vorbei" gemeldet wird
pub const VIBRATION_HOLD_OFF_MS: u64 = 2000;

// ============================================================================
// LED Konfiguration
// ============================================================================

/// Helligkeits-Level für die LED (0-255)
/// Wert ist gedimmt für Augenschonung
pub const LED_BRIGHTNESS: u8 = 10;

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Heap-Größe für WiFi (Bytes)
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

/// Wartezeit nach WiFi-Fehlern in Sekunden
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Anzahl Sockets im embassy-net Stack (DNS + MQTT)
pub const NET_SOCKETS: usize = 3;

// ============================================================================
// MQTT Konfiguration
// ============================================================================

/// MQTT Broker Hostname oder IP-Adresse
/// Wird zur Build-Zeit aus der Environment Variable MQTT_BROKER geladen
pub const MQTT_BROKER: &str = env!(
    "MQTT_BROKER",
    "MQTT Broker nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Broker Port
/// Standard: 1883 (unverschlüsselt), 8883 (TLS)
pub const MQTT_PORT: u16 = 1883;

/// MQTT Client ID
/// Eindeutige Kennung für dieses Gerät
pub const MQTT_CLIENT_ID: &str = env!(
    "MQTT_CLIENT_ID",
    "MQTT Client ID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Kommando-Topic der Jalousie (OPEN, CLOSE, STOP, LIFT <n>, TILT <n>)
pub const MQTT_TOPIC_COMMAND: &str = concat!(env!("MQTT_TOPIC_PREFIX"), "/set");

/// Positions-Topics (Prozent, nach jedem Schritt)
pub const MQTT_TOPIC_LIFT: &str = concat!(env!("MQTT_TOPIC_PREFIX"), "/lift");
pub const MQTT_TOPIC_TILT: &str = concat!(env!("MQTT_TOPIC_PREFIX"), "/tilt");

/// Messwerte des CO2-Sensors (JSON)
pub const MQTT_TOPIC_AIR: &str = concat!(env!("MQTT_TOPIC_PREFIX"), "/air");

/// Zustand des Vibrations-Sensors (ON / OFF)
pub const MQTT_TOPIC_VIBRATION: &str = concat!(env!("MQTT_TOPIC_PREFIX"), "/vibration");

/// MQTT Keep-Alive in Sekunden
/// 0 = aus: kein PINGREQ, dessen PINGRESP sonst mit eingehenden Kommandos konkurriert.
/// Tote Verbindungen erkennt stattdessen TCP Keep-Alive.
pub const MQTT_KEEP_ALIVE_SECS: u16 = 0;

/// TCP Keep-Alive Intervall der Broker-Verbindung in Sekunden
pub const TCP_KEEP_ALIVE_SECS: u64 = 15;

/// Ohne jedes Paket vom Broker (auch Keep-Alive ACKs) wird die Verbindung
/// nach dieser Zeit abgebrochen
pub const TCP_TIMEOUT_SECS: u64 = 45;

/// MQTT Reconnect Delay in Sekunden
/// Wartezeit nach Verbindungsfehler vor erneutem Versuch
pub const MQTT_RECONNECT_DELAY_SECS: u64 = 5;

/// MQTT Buffer-Größe in Bytes
pub const MQTT_BUFFER_SIZE: usize = 1024;

/// TCP Buffer-Größe für die MQTT-Verbindung in Bytes
pub const MQTT_TCP_BUFFER_SIZE: usize = 4096;

/// DNS Query Timeout in Sekunden
pub const DNS_TIMEOUT_SECS: u64 = 10;

/// JSON Serialisierungs-Buffer für Messwerte
/// Für {"co2_ppm":1234,"temperature_c":21.53,"humidity_pct":40.12}
pub const JSON_TELEMETRY_BUFFER_SIZE: usize = 128;

// Build-Script: Wird vor dem Kompilieren ausgeführt
// Backt Konfiguration aus .env ein und konfiguriert den Linker für ESP32-C6

/// Variablen die aus .env / Environment an den Compiler weitergereicht werden
const FORWARDED_VARS: [&str; 5] = [
    "WIFI_SSID",
    "WIFI_PASSWORD",
    "MQTT_BROKER",
    "MQTT_CLIENT_ID",
    "MQTT_TOPIC_PREFIX",
];

/// Topic-Präfix wenn MQTT_TOPIC_PREFIX nicht gesetzt ist
const DEFAULT_TOPIC_PREFIX: &str = "cover";

fn main() {
    // Lade .env file für WiFi- und MQTT-Konfiguration
    // Fehler ignorieren wenn .env nicht existiert (dann müssen ENV vars gesetzt sein)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  .env file nicht gefunden: {}", e);
        eprintln!("   Setze WIFI_SSID, WIFI_PASSWORD, MQTT_BROKER und MQTT_CLIENT_ID als Environment-Variablen");
    }

    // Die Werte werden zur Compile-Zeit in den Code eingebacken (env! in config.rs)
    for name in FORWARDED_VARS {
        println!("cargo:rerun-if-env-changed={}", name);
        if let Ok(value) = std::env::var(name) {
            println!("cargo:rustc-env={}={}", name, value);
        }
    }
    if std::env::var("MQTT_TOPIC_PREFIX").is_err() {
        println!("cargo:rustc-env=MQTT_TOPIC_PREFIX={}", DEFAULT_TOPIC_PREFIX);
    }

    // Linker-Skripte:
    // 1. defmt.x - Symbole für defmt's binäres Log-Format
    println!("cargo:rustc-link-arg=-Tdefmt.x");

    // 2. linkall.x - ESP32 Memory-Layout
    //    WICHTIG: Muss als LETZTES kommen
    println!("cargo:rustc-link-arg=-Tlinkall.x");
}

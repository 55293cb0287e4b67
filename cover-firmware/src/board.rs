// Board-Initialisierung: Funk + Netzwerk-Stack und Neustart-Pfade
//
// Gemeinsam für alle drei Geräte-Programme. Init-Fehler werden einmal
// geloggt, danach startet das Gerät bedingungslos neu (kein Backoff).

use defmt::{Debug2Format, error, warn};
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Stack, StackResources};
use esp_hal::delay::Delay;
use esp_hal::rng::Rng;
use static_cell::StaticCell;

use crate::CoverError;
use crate::config::NET_SOCKETS;
use crate::tasks::{connection_task, dhcp_task, net_task};

/// Zeit für defmt, die letzte Meldung vor dem Reset auszugeben
const LOG_FLUSH_MS: u32 = 100;

/// Meldet einen Init-Fehler und startet das Gerät neu
pub fn restart_after_init_failure(err: CoverError) -> ! {
    error!("Init: {} - restarting device", err);
    Delay::new().delay_millis(LOG_FLUSH_MS);
    esp_hal::system::software_reset()
}

/// Werksreset nach langem Tastendruck
///
/// Die Firmware hält keine persistenten Kopplungs-Daten (Zugangsdaten sind
/// eingebacken); der Reset verwirft den kompletten RAM-Zustand.
pub fn factory_reset() -> ! {
    warn!("Reset: button held, performing factory reset");
    Delay::new().delay_millis(LOG_FLUSH_MS);
    esp_hal::system::software_reset()
}

/// Initialisiert Funk + embassy-net und spawnt die WiFi-Tasks
///
/// Gibt den `'static` Netzwerk-Stack für MQTT zurück.
pub fn start_network(
    spawner: &Spawner,
    wifi: esp_hal::peripherals::WIFI<'static>,
) -> &'static Stack<'static> {
    // WiFi Hardware initialisieren
    static RADIO_INIT: StaticCell<esp_radio::Controller> = StaticCell::new();
    let radio_init = match esp_radio::init() {
        Ok(controller) => RADIO_INIT.init(controller),
        Err(e) => {
            error!("Init: radio failed: {}", Debug2Format(&e));
            restart_after_init_failure(CoverError::InitFailure)
        }
    };

    let (wifi_controller, wifi_interface) =
        match esp_radio::wifi::new(radio_init, wifi, Default::default()) {
            Ok(parts) => parts,
            Err(e) => {
                error!("Init: Wi-Fi failed: {}", Debug2Format(&e));
                restart_after_init_failure(CoverError::InitFailure)
            }
        };

    // Random seed für TCP/IP Stack (von Hardware RNG)
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    // Sockets: DNS + MQTT (+ Reserve)
    static RESOURCES: StaticCell<StackResources<NET_SOCKETS>> = StaticCell::new();
    let resources = RESOURCES.init(StackResources::new());

    // embassy-net erstellt Stack + Runner (STA interface für Client-Modus)
    let (stack, runner) = embassy_net::new(
        wifi_interface.sta,
        NetConfig::dhcpv4(Default::default()),
        resources,
        seed,
    );

    static STACK: StaticCell<Stack<'static>> = StaticCell::new();
    let stack = &*STACK.init(stack);

    spawner
        .spawn(connection_task(wifi_controller))
        .unwrap_or_else(|_| restart_after_init_failure(CoverError::InitFailure));
    spawner
        .spawn(net_task(runner))
        .unwrap_or_else(|_| restart_after_init_failure(CoverError::InitFailure));
    spawner
        .spawn(dhcp_task(stack))
        .unwrap_or_else(|_| restart_after_init_failure(CoverError::InitFailure));

    stack
}

// WiFi Tasks - Verbindung zum Access Point, Netzwerk-Stack, DHCP
use defmt::{Debug2Format, error, info, warn};
use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent};

use crate::config::{WIFI_PASSWORD, WIFI_RETRY_DELAY_SECS, WIFI_SSID};

/// WiFi Connection Task
///
/// Startet den Station-Modus, verbindet und reconnected nach jedem
/// Disconnect. Fehler hier sind keine Init-Fehler: der Funk läuft,
/// nur der Access Point fehlt, also wird einfach erneut versucht.
#[embassy_executor::task]
pub async fn connection_task(mut controller: WifiController<'static>) {
    info!("WiFi: Starting connection task");

    loop {
        if matches!(controller.is_started(), Ok(false)) {
            let client_config = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(WIFI_SSID.into())
                    .with_password(WIFI_PASSWORD.into()),
            );

            if let Err(e) = controller.set_config(&client_config) {
                error!("WiFi: Invalid configuration: {}", Debug2Format(&e));
                retry_delay().await;
                continue;
            }

            if let Err(e) = controller.start_async().await {
                error!("WiFi: Failed to start: {}", Debug2Format(&e));
                retry_delay().await;
                continue;
            }
        }

        info!("WiFi: Connecting to '{}'...", WIFI_SSID);
        if let Err(e) = controller.connect_async().await {
            warn!("WiFi: Connection failed: {}", Debug2Format(&e));
            retry_delay().await;
            continue;
        }
        info!("WiFi: Connected");

        controller.wait_for_event(WifiEvent::StaDisconnected).await;
        warn!("WiFi: Disconnected from AP, will retry...");
        retry_delay().await;
    }
}

async fn retry_delay() {
    Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
}

/// Network Task - treibt den embassy-net Stack
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// DHCP Monitor Task - loggt die erhaltene IP-Konfiguration einmalig
#[embassy_executor::task]
pub async fn dhcp_task(stack: &'static Stack<'static>) {
    wait_for_network(stack).await;

    if let Some(config) = stack.config_v4() {
        info!("WiFi: Got IP address!");
        info!("  IP:      {}", Debug2Format(&config.address.address()));
        info!("  Gateway: {}", Debug2Format(&config.gateway));
    }
}

/// Wartet bis Link steht und DHCP eine Adresse geliefert hat
pub async fn wait_for_network(stack: &'static Stack<'static>) {
    while !(stack.is_link_up() && stack.config_v4().is_some()) {
        Timer::after(Duration::from_millis(500)).await;
    }
}

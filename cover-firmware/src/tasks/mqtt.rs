// MQTT Tasks - Netzwerk-Endpunkt der Geräte
//
// Jalousie: empfängt Kommandos auf `<prefix>/set`, meldet Positionen
// auf `<prefix>/lift` und `<prefix>/tilt`.
// Sensoren: publishen Messwerte (`<prefix>/air`) bzw. ON/OFF (`<prefix>/vibration`).
use core::fmt::Write as _;

use defmt::{Debug2Format, error, info, warn};
use embassy_futures::select::{Either, select};
use embassy_net::{IpAddress, Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_time::{Duration, Timer, with_timeout};

use rust_mqtt::client::client::MqttClient;
use rust_mqtt::client::client_config::{ClientConfig, MqttVersion};
use rust_mqtt::packet::v5::publish_packet::QualityOfService;
use rust_mqtt::utils::rng_generator::CountingRng;
use rust_mqtt::utils::types::EncodedString;

use crate::config::*;
use crate::tasks::wifi::wait_for_network;
use crate::{
    Axis, CommandMailbox, CoverCommand, CoverError, MotionFlags, RemoteDispatch, ReportSubscriber,
    Telemetry, TelemetrySubscriber,
};

/// Max. Anzahl MQTT v5 Properties pro Paket
const MAX_PROPERTIES: usize = 5;

type Session<'a> = MqttClient<'a, TcpSocket<'a>, MAX_PROPERTIES, CountingRng>;

/// Speicher einer MQTT-Verbindung (TCP + MQTT Puffer)
///
/// Gehört dem Task, die Session leiht ihn nur für die Dauer einer Verbindung.
struct SessionBuffers {
    tcp_rx: [u8; MQTT_TCP_BUFFER_SIZE],
    tcp_tx: [u8; MQTT_TCP_BUFFER_SIZE],
    mqtt_send: [u8; MQTT_BUFFER_SIZE],
    mqtt_recv: [u8; MQTT_BUFFER_SIZE],
}

impl SessionBuffers {
    const fn new() -> Self {
        Self {
            tcp_rx: [0; MQTT_TCP_BUFFER_SIZE],
            tcp_tx: [0; MQTT_TCP_BUFFER_SIZE],
            mqtt_send: [0; MQTT_BUFFER_SIZE],
            mqtt_recv: [0; MQTT_BUFFER_SIZE],
        }
    }
}

// ============================================================================
// Jalousie-Endpunkt
// ============================================================================

/// MQTT Task der Jalousie
///
/// - Stop wird sofort über `flags` signalisiert (auch während einer Fahrt)
/// - alle anderen Kommandos landen pro Achse in der Mailbox (jüngstes gewinnt)
/// - jede Positions-Meldung wird auf das Topic der Achse gepublished
#[embassy_executor::task]
pub async fn cover_mqtt_task(
    stack: &'static Stack<'static>,
    mut report_subscriber: ReportSubscriber,
    command_mailbox: &'static CommandMailbox,
    flags: &'static MotionFlags,
) {
    info!("MQTT: Task started, waiting for network...");
    wait_for_network(stack).await;
    info!("MQTT: Network ready");

    let mut buffers = SessionBuffers::new();

    loop {
        match cover_session(
            stack,
            &mut buffers,
            &mut report_subscriber,
            command_mailbox,
            flags,
        )
        .await
        {
            Ok(()) => warn!("MQTT: Connection closed normally"),
            Err(e) => error!("MQTT: Error: {}", e),
        }
        info!("MQTT: Reconnecting in {}s...", MQTT_RECONNECT_DELAY_SECS);
        Timer::after(Duration::from_secs(MQTT_RECONNECT_DELAY_SECS)).await;
    }
}

/// Ereignis einer Runde im Session-Loop
enum CoverEvent {
    Command(Result<CoverCommand, CoverError>),
    Foreign,
    Report(crate::PositionReport),
}

async fn cover_session(
    stack: &'static Stack<'static>,
    buffers: &mut SessionBuffers,
    report_subscriber: &mut ReportSubscriber,
    command_mailbox: &'static CommandMailbox,
    flags: &'static MotionFlags,
) -> Result<(), MqttError> {
    let mut client = open_session(stack, buffers).await?;

    client
        .subscribe_to_topic(MQTT_TOPIC_COMMAND)
        .await
        .map_err(|_| MqttError::SubscribeFailed)?;
    info!("MQTT: Subscribed to '{}'", MQTT_TOPIC_COMMAND);

    loop {
        // Kein PINGREQ (Keep-Alive 0), der Empfangspfad sieht also nur
        // PUBLISH-Pakete. receive_message() wird nur abgebrochen, solange es
        // auf das erste Byte eines Pakets wartet: Kommandos passen in ein
        // TCP-Segment und liegen komplett im Socket-Puffer.
        //
        // Ergebnis sofort in eigenen Typ überführen, damit der Borrow
        // auf den Empfangspuffer des Clients hier endet
        let event = match select(
            client.receive_message(),
            report_subscriber.next_message_pure(),
        )
        .await
        {
            Either::First(Ok((topic, payload))) if topic == MQTT_TOPIC_COMMAND => {
                CoverEvent::Command(parse_command(payload))
            }
            Either::First(Ok(_)) => CoverEvent::Foreign,
            Either::First(Err(_)) => return Err(MqttError::ReceiveFailed),
            Either::Second(report) => CoverEvent::Report(report),
        };

        match event {
            CoverEvent::Command(Ok(command)) => {
                let dispatch =
                    command_mailbox.lock(|slots| slots.borrow_mut().dispatch(command, flags));
                match dispatch {
                    RemoteDispatch::Cancelled => info!("MQTT: Stop requested"),
                    RemoteDispatch::IgnoredIdle => info!("MQTT: Stop ignored, cover is idle"),
                    RemoteDispatch::Stored { replaced: None } => {
                        info!("MQTT: Command {}", command)
                    }
                    RemoteDispatch::Stored {
                        replaced: Some(old),
                    } => info!("MQTT: Command {} replaces {}", command, old),
                }
            }
            CoverEvent::Command(Err(e)) => warn!("MQTT: Rejected command: {}", e),
            CoverEvent::Foreign => warn!("MQTT: Message on unexpected topic"),
            CoverEvent::Report(report) => publish_report(&mut client, report).await?,
        }
    }
}

async fn publish_report(
    client: &mut Session<'_>,
    report: crate::PositionReport,
) -> Result<(), MqttError> {
    let topic = match report.axis {
        Axis::Lift => MQTT_TOPIC_LIFT,
        Axis::Tilt => MQTT_TOPIC_TILT,
    };

    let mut payload: heapless::String<4> = heapless::String::new();
    // "100" passt immer in 4 Bytes
    let _ = write!(payload, "{}", report.percent);

    client
        .send_message(topic, payload.as_bytes(), QualityOfService::QoS0, true)
        .await
        .map_err(|_| MqttError::PublishFailed)?;
    info!("MQTT: Published {}={}%", report.axis, report.percent);
    Ok(())
}

fn parse_command(payload: &[u8]) -> Result<CoverCommand, CoverError> {
    let text = core::str::from_utf8(payload).map_err(|_| CoverError::UnknownCommand)?;
    CoverCommand::try_from(text)
}

// ============================================================================
// Sensor-Endpunkte
// ============================================================================

/// MQTT Task der Sensor-Geräte
///
/// Event-basiert: jede Telemetrie-Nachricht wird sofort gepublished.
/// Messwerte als JSON, Vibration als ON/OFF.
#[embassy_executor::task]
pub async fn telemetry_mqtt_task(
    stack: &'static Stack<'static>,
    mut telemetry_subscriber: TelemetrySubscriber,
) {
    info!("MQTT: Task started, waiting for network...");
    wait_for_network(stack).await;
    info!("MQTT: Network ready");

    let mut buffers = SessionBuffers::new();

    loop {
        match telemetry_session(stack, &mut buffers, &mut telemetry_subscriber).await {
            Ok(()) => warn!("MQTT: Connection closed normally"),
            Err(e) => error!("MQTT: Error: {}", e),
        }
        info!("MQTT: Reconnecting in {}s...", MQTT_RECONNECT_DELAY_SECS);
        Timer::after(Duration::from_secs(MQTT_RECONNECT_DELAY_SECS)).await;
    }
}

async fn telemetry_session(
    stack: &'static Stack<'static>,
    buffers: &mut SessionBuffers,
    telemetry_subscriber: &mut TelemetrySubscriber,
) -> Result<(), MqttError> {
    let mut client = open_session(stack, buffers).await?;

    loop {
        let telemetry = telemetry_subscriber.next_message_pure().await;

        let mut json = [0u8; JSON_TELEMETRY_BUFFER_SIZE];
        let (topic, payload): (&str, &[u8]) = match telemetry {
            Telemetry::AirQuality(measurement) => {
                let len = serde_json_core::to_slice(&measurement, &mut json)
                    .map_err(|_| MqttError::EncodingFailed)?;
                (MQTT_TOPIC_AIR, &json[..len])
            }
            Telemetry::Vibration(event) => (MQTT_TOPIC_VIBRATION, event.as_str().as_bytes()),
        };

        client
            .send_message(topic, payload, QualityOfService::QoS0, false)
            .await
            .map_err(|_| MqttError::PublishFailed)?;
        info!("MQTT: Published {}", telemetry);
    }
}

// ============================================================================
// Verbindungsaufbau
// ============================================================================

/// DNS → TCP → MQTT CONNECT
///
/// Bei jedem Fehler endet die Session und der Task-Loop startet
/// nach `MQTT_RECONNECT_DELAY_SECS` einen neuen Versuch.
async fn open_session<'a>(
    stack: &'static Stack<'static>,
    buffers: &'a mut SessionBuffers,
) -> Result<Session<'a>, MqttError> {
    info!("MQTT: Resolving '{}'...", MQTT_BROKER);
    let broker_ip = resolve_hostname(stack, MQTT_BROKER).await?;
    info!("MQTT: Resolved to {}", Debug2Format(&broker_ip));

    let SessionBuffers {
        tcp_rx,
        tcp_tx,
        mqtt_send,
        mqtt_recv,
    } = buffers;

    let mut socket = TcpSocket::new(*stack, tcp_rx, tcp_tx);
    // Toter Broker: TCP Keep-Alive + Timeout statt MQTT PINGREQ
    socket.set_keep_alive(Some(Duration::from_secs(TCP_KEEP_ALIVE_SECS)));
    socket.set_timeout(Some(Duration::from_secs(TCP_TIMEOUT_SECS)));
    socket
        .connect((broker_ip, MQTT_PORT))
        .await
        .map_err(|_| MqttError::ConnectionFailed)?;
    info!("MQTT: TCP connected");

    let mut config = ClientConfig::<MAX_PROPERTIES, _>::new(MqttVersion::MQTTv5, CountingRng(20000));
    config.client_id = EncodedString {
        string: MQTT_CLIENT_ID,
        len: MQTT_CLIENT_ID.len() as u16,
    };
    config.keep_alive = MQTT_KEEP_ALIVE_SECS;
    config.max_packet_size = MQTT_BUFFER_SIZE as u32;

    let mut client = MqttClient::<_, MAX_PROPERTIES, _>::new(
        socket,
        mqtt_send,
        MQTT_BUFFER_SIZE,
        mqtt_recv,
        MQTT_BUFFER_SIZE,
        config,
    );

    client
        .connect_to_broker()
        .await
        .map_err(|_| MqttError::ProtocolError)?;
    info!("MQTT: Connected to broker as '{}'", MQTT_CLIENT_ID);

    Ok(client)
}

/// Löst Hostname zu IPv4-Adresse auf
async fn resolve_hostname(
    stack: &'static Stack<'static>,
    hostname: &str,
) -> Result<embassy_net::Ipv4Address, MqttError> {
    let result = with_timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        stack.dns_query(hostname, DnsQueryType::A),
    )
    .await;

    match result {
        Ok(Ok(addrs)) => addrs
            .iter()
            .find_map(|addr| match addr {
                IpAddress::Ipv4(ipv4) => Some(*ipv4),
                #[allow(unreachable_patterns)]
                _ => None,
            })
            .ok_or(MqttError::DnsResolutionFailed),
        Ok(Err(_)) => Err(MqttError::DnsResolutionFailed),
        Err(_) => Err(MqttError::DnsTimeout),
    }
}

/// MQTT Fehler-Typen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MqttError {
    DnsResolutionFailed,
    DnsTimeout,
    ConnectionFailed,
    ProtocolError,
    SubscribeFailed,
    ReceiveFailed,
    PublishFailed,
    EncodingFailed,
}

impl defmt::Format for MqttError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MqttError::DnsResolutionFailed => defmt::write!(fmt, "DNS failed"),
            MqttError::DnsTimeout => defmt::write!(fmt, "DNS timeout"),
            MqttError::ConnectionFailed => defmt::write!(fmt, "Connection failed"),
            MqttError::ProtocolError => defmt::write!(fmt, "Protocol error"),
            MqttError::SubscribeFailed => defmt::write!(fmt, "Subscribe failed"),
            MqttError::ReceiveFailed => defmt::write!(fmt, "Receive failed"),
            MqttError::PublishFailed => defmt::write!(fmt, "Publish failed"),
            MqttError::EncodingFailed => defmt::write!(fmt, "Payload encoding failed"),
        }
    }
}

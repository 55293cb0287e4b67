// Jalousie Control-Loop - Tasten, Fern-Kommandos und Fahrten
use cover_core::{
    Axis, EdgeDetector, LongPress, PositionController, PositionDisplay, PositionReport,
    PositionReporter, SmartLedWriter, StepTimer, TickSummary,
};
use defmt::{info, warn};
use embassy_time::{Duration, Instant, Timer};
use esp_hal::gpio::Input;
use esp_hal_smartled::smart_led_buffer;

use crate::board::{factory_reset, restart_after_init_failure};
use crate::config::{
    COVER_CONFIG, LED_BRIGHTNESS, LIFT_BOUNDS, POLL_INTERVAL_MS, RESET_HOLD_MS, RMT_CLOCK_MHZ,
    TILT_BOUNDS,
};
use crate::hal::{LedPositionDisplay, RmtLedWriter};
use crate::{CommandMailbox, MotionFlags, ReportPublisher};

/// Lokale Tasten der Jalousie (aktiv low, interner Pull-up)
pub struct CoverButtons {
    /// Lift +1 Schritt (Richtung geschlossen)
    pub lift_inc: Input<'static>,
    /// Lift -1 Schritt (Richtung offen)
    pub lift_dec: Input<'static>,
    /// Lang drücken = Werksreset
    pub reset: Input<'static>,
}

/// Wartezeit zwischen zwei Schritten über den embassy Timer
struct EmbassyStepTimer;

impl StepTimer for EmbassyStepTimer {
    async fn wait_ms(&mut self, ms: u32) {
        Timer::after(Duration::from_millis(u64::from(ms))).await;
    }
}

/// Reicht Positions-Meldungen an den MQTT Task weiter
///
/// `publish_immediate` blockiert nie; ist die Queue voll, geht die älteste
/// Meldung verloren und die Fahrt läuft ungebremst weiter.
struct PubSubReporter {
    publisher: ReportPublisher,
}

impl PositionReporter for PubSubReporter {
    fn report(&mut self, axis: Axis, percent: u8) {
        self.publisher.publish_immediate(PositionReport { axis, percent });
    }
}

/// Control-Loop ohne Task-Attribut (generisch über den LED Writer)
///
/// Pro Runde:
/// 1. Tasten auswerten (Flanke → Lift ±1)
/// 2. Fern-Kommandos aus der Mailbox übernehmen (je Achse das jüngste)
/// 3. offene Ziele anfahren (`tick`)
/// 4. Reset-Taste prüfen
pub async fn cover_control_logic<L: SmartLedWriter>(
    led: L,
    buttons: CoverButtons,
    report_publisher: ReportPublisher,
    command_mailbox: &'static CommandMailbox,
    flags: &'static MotionFlags,
) -> ! {
    let mut controller = PositionController::new(COVER_CONFIG, flags);
    let mut reporter = PubSubReporter {
        publisher: report_publisher,
    };
    let mut display = LedPositionDisplay::new(led, LIFT_BOUNDS, TILT_BOUNDS, LED_BRIGHTNESS);
    let mut timer = EmbassyStepTimer;

    let mut lift_inc = EdgeDetector::new();
    let mut lift_dec = EdgeDetector::new();
    let mut reset = LongPress::new(RESET_HOLD_MS);

    info!("Cover: started at {}", controller.position());
    display.show(controller.position());

    loop {
        if lift_inc.update(buttons.lift_inc.is_low()) {
            controller.nudge(Axis::Lift, 1);
        }
        if lift_dec.update(buttons.lift_dec.is_low()) {
            controller.nudge(Axis::Lift, -1);
        }

        let commands = command_mailbox.lock(|slots| slots.borrow_mut().take());
        for command in commands.into_iter().flatten() {
            if let Err(e) = controller.apply(command) {
                warn!("Cover: {} rejected: {}", command, e);
            }
        }

        let summary = controller.tick(&mut reporter, &mut display, &mut timer).await;
        if !summary.is_empty() {
            log_summary(&summary);
        }

        if reset.update(buttons.reset.is_low(), Instant::now().as_millis()) {
            factory_reset();
        }

        Timer::after(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}

fn log_summary(summary: &TickSummary) {
    for (axis, motion) in [(Axis::Lift, summary.lift), (Axis::Tilt, summary.tilt)] {
        if let Some(motion) = motion {
            if motion.cancelled {
                info!(
                    "Cover: {} stopped at {} after {} steps",
                    axis, motion.final_value, motion.steps
                );
            } else {
                info!(
                    "Cover: {} reached {} in {} steps",
                    axis, motion.final_value, motion.steps
                );
            }
        }
    }
}

/// Jalousie Task - Hardware-Initialisierung, danach `cover_control_logic()`
#[embassy_executor::task]
pub async fn cover_task(
    gpio8: esp_hal::peripherals::GPIO8<'static>,
    rmt_peripheral: esp_hal::peripherals::RMT<'static>,
    buttons: CoverButtons,
    report_publisher: ReportPublisher,
    command_mailbox: &'static CommandMailbox,
    flags: &'static MotionFlags,
) {
    // Buffer für SmartLED Daten (1 LED), muss den Writer überleben
    let mut rmt_buffer = smart_led_buffer!(1);

    let led = match RmtLedWriter::new(gpio8, rmt_peripheral, RMT_CLOCK_MHZ, &mut rmt_buffer) {
        Ok(led) => led,
        Err(e) => restart_after_init_failure(e),
    };

    cover_control_logic(led, buttons, report_publisher, command_mailbox, flags).await
}

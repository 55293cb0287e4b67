//! Positions-Controller für die Jalousie (Lift + Tilt)
//!
//! Der Controller besitzt die aktuelle Position beider Achsen und je Achse
//! höchstens ein offenes Ziel (last-write-wins). `tick()` fährt offene Ziele
//! schrittweise an: ±1 pro Schritt, nach jedem Schritt Meldung an Netzwerk und
//! Anzeige, dann feste Wartezeit. Vor jedem Schritt wird das Abbruch-Flag geprüft.
//!
//! Typisches Nutzungsmuster (Control-Loop):
//!
//! ```ignore
//! controller.request_absolute(Axis::Lift, 3);
//!
//! loop {
//!     controller.tick(&mut reporter, &mut display, &mut timer).await;
//!     Timer::after(POLL_INTERVAL).await;
//! }
//! ```
//!
//! Ein Stop aus einem anderen Task läuft über [`MotionFlags::request_cancel`],
//! da der Controller während `tick()` exklusiv geliehen ist.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::CoverError;
use crate::logic::{percent_to_value, step_toward, value_to_percent};
use crate::traits::{PositionDisplay, PositionReporter, StepTimer};
use crate::types::{Axis, AxisBounds, CoverCommand, MotionState, Position};

/// Standard-Wartezeit zwischen zwei Schritten
pub const DEFAULT_STEP_DELAY_MS: u32 = 250;

/// Bewegungs- und Abbruch-Flag, zwischen Tasks teilbar
///
/// Auf dem Gerät als `static` angelegt: der Control-Loop fährt, der MQTT-Task
/// darf jederzeit `request_cancel()` aufrufen.
#[derive(Debug, Default)]
pub struct MotionFlags {
    moving: AtomicBool,
    cancel: AtomicBool,
}

impl MotionFlags {
    pub const fn new() -> Self {
        Self {
            moving: AtomicBool::new(false),
            cancel: AtomicBool::new(false),
        }
    }

    pub fn is_moving(&self) -> bool {
        self.moving.load(Ordering::Acquire)
    }

    /// Fordert den Abbruch der laufenden Bewegung an
    ///
    /// Wirkt an der nächsten Schritt-Grenze. Gibt `false` zurück (und tut
    /// nichts) wenn gerade keine Bewegung läuft.
    pub fn request_cancel(&self) -> bool {
        if !self.is_moving() {
            return false;
        }
        self.cancel.store(true, Ordering::Release);
        true
    }

    fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    fn begin(&self) {
        // Veralteten Abbruch aus einer vorherigen Bewegung verwerfen
        self.cancel.store(false, Ordering::Release);
        self.moving.store(true, Ordering::Release);
    }

    fn finish(&self) {
        self.moving.store(false, Ordering::Release);
        self.cancel.store(false, Ordering::Release);
    }
}

/// Ergebnis von [`LatestCommands::dispatch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteDispatch {
    /// Stop während einer Fahrt: Abbruch angefordert
    Cancelled,
    /// Stop im Idle-Zustand: ohne Wirkung
    IgnoredIdle,
    /// Ziel gemerkt; `replaced` ist das verdrängte ältere Kommando der Achse
    Stored { replaced: Option<CoverCommand> },
}

/// Letztes Fern-Kommando je Achse, bis der Control-Loop es übernimmt
///
/// Während einer Fahrt können beliebig viele Kommandos eintreffen (z.B. ein
/// Schieberegler); pro Achse bleibt nur das jüngste. Stop wird nicht
/// gespeichert, er läuft über [`MotionFlags::request_cancel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatestCommands {
    lift: Option<CoverCommand>,
    tilt: Option<CoverCommand>,
}

impl LatestCommands {
    pub const fn new() -> Self {
        Self {
            lift: None,
            tilt: None,
        }
    }

    /// Merkt sich `command` und gibt das verdrängte Kommando derselben Achse zurück
    pub fn record(&mut self, command: CoverCommand) -> Option<CoverCommand> {
        let slot = match command.axis()? {
            Axis::Lift => &mut self.lift,
            Axis::Tilt => &mut self.tilt,
        };
        slot.replace(command)
    }

    pub fn is_empty(&self) -> bool {
        self.lift.is_none() && self.tilt.is_none()
    }

    /// Verteilt ein Fern-Kommando: Stop sofort an `flags`, alles andere hierher
    pub fn dispatch(&mut self, command: CoverCommand, flags: &MotionFlags) -> RemoteDispatch {
        if command == CoverCommand::Stop {
            return if flags.request_cancel() {
                RemoteDispatch::Cancelled
            } else {
                RemoteDispatch::IgnoredIdle
            };
        }
        RemoteDispatch::Stored {
            replaced: self.record(command),
        }
    }

    /// Entnimmt alle gemerkten Kommandos (Lift vor Tilt)
    pub fn take(&mut self) -> [Option<CoverCommand>; 2] {
        [self.lift.take(), self.tilt.take()]
    }
}

/// Konfiguration des Controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    pub lift: AxisBounds,
    pub tilt: AxisBounds,
    pub step_delay_ms: u32,
}

impl ControllerConfig {
    pub const fn new(lift: AxisBounds, tilt: AxisBounds) -> Self {
        Self {
            lift,
            tilt,
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
        }
    }

    pub const fn with_step_delay_ms(mut self, step_delay_ms: u32) -> Self {
        self.step_delay_ms = step_delay_ms;
        self
    }
}

/// Ergebnis einer einzelnen Achsen-Bewegung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMotion {
    pub steps: u8,
    pub cancelled: bool,
    pub final_value: u8,
}

/// Was ein `tick()` getan hat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub lift: Option<AxisMotion>,
    pub tilt: Option<AxisMotion>,
}

impl TickSummary {
    pub fn is_empty(&self) -> bool {
        self.lift.is_none() && self.tilt.is_none()
    }

    pub fn was_cancelled(&self) -> bool {
        [self.lift, self.tilt]
            .iter()
            .flatten()
            .any(|motion| motion.cancelled)
    }

    fn record(&mut self, axis: Axis, motion: AxisMotion) {
        match axis {
            Axis::Lift => self.lift = Some(motion),
            Axis::Tilt => self.tilt = Some(motion),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisState {
    bounds: AxisBounds,
    value: u8,
    pending: Option<u8>,
}

impl AxisState {
    /// Startwert: Maximum der Achse
    fn at_max(bounds: AxisBounds) -> Self {
        Self {
            bounds,
            value: bounds.max(),
            pending: None,
        }
    }
}

/// Positions-Controller: besitzt Position, offene Ziele und Schritt-Takt
pub struct PositionController<'a> {
    lift: AxisState,
    tilt: AxisState,
    step_delay_ms: u32,
    flags: &'a MotionFlags,
}

impl<'a> PositionController<'a> {
    /// Erstellt einen Controller, beide Achsen stehen auf ihrem Maximum
    pub fn new(config: ControllerConfig, flags: &'a MotionFlags) -> Self {
        Self {
            lift: AxisState::at_max(config.lift),
            tilt: AxisState::at_max(config.tilt),
            step_delay_ms: config.step_delay_ms,
            flags,
        }
    }

    /// Setzt eine Startposition (geklemmt), z.B. nach manueller Kalibrierung
    pub fn with_position(mut self, position: Position) -> Self {
        self.lift.value = self.lift.bounds.clamp(position.lift as i16);
        self.tilt.value = self.tilt.bounds.clamp(position.tilt as i16);
        self
    }

    #[inline]
    fn axis(&self, axis: Axis) -> &AxisState {
        match axis {
            Axis::Lift => &self.lift,
            Axis::Tilt => &self.tilt,
        }
    }

    #[inline]
    fn axis_mut(&mut self, axis: Axis) -> &mut AxisState {
        match axis {
            Axis::Lift => &mut self.lift,
            Axis::Tilt => &mut self.tilt,
        }
    }

    pub fn position(&self) -> Position {
        Position {
            lift: self.lift.value,
            tilt: self.tilt.value,
        }
    }

    pub fn bounds(&self, axis: Axis) -> AxisBounds {
        self.axis(axis).bounds
    }

    /// Aktueller Prozentwert einer Achse (mit den Grenzen dieser Achse)
    pub fn percentage(&self, axis: Axis) -> u8 {
        let state = self.axis(axis);
        value_to_percent(state.value, state.bounds)
    }

    /// Offenes, noch nicht angefahrenes Ziel einer Achse
    pub fn pending(&self, axis: Axis) -> Option<u8> {
        self.axis(axis).pending
    }

    pub fn motion_state(&self) -> MotionState {
        if self.flags.is_moving() {
            MotionState::Moving
        } else {
            MotionState::Idle
        }
    }

    pub fn step_delay_ms(&self) -> u32 {
        self.step_delay_ms
    }

    /// Setzt das offene Ziel einer Achse (ersetzt ein vorheriges)
    ///
    /// Der Aufrufer liefert bereits geklemmte Werte; Ausreißer werden
    /// trotzdem auf die Achsen-Grenzen geklemmt.
    pub fn request_absolute(&mut self, axis: Axis, target: u8) {
        let state = self.axis_mut(axis);
        state.pending = Some(state.bounds.clamp(target as i16));
    }

    /// Ziel = Minimum der Achse
    pub fn request_open(&mut self, axis: Axis) {
        let min = self.bounds(axis).min();
        self.request_absolute(axis, min);
    }

    /// Ziel = Maximum der Achse
    pub fn request_close(&mut self, axis: Axis) {
        let max = self.bounds(axis).max();
        self.request_absolute(axis, max);
    }

    /// Ziel in Prozent (Umrechnung an der Grenze zum Netzwerk)
    pub fn request_percentage(&mut self, axis: Axis, percent: u8) -> Result<(), CoverError> {
        let target = percent_to_value(percent, self.bounds(axis))?;
        self.request_absolute(axis, target);
        Ok(())
    }

    /// Verschiebt das offene Ziel um `delta` (lokale Taster)
    ///
    /// Ohne offenes Ziel wird von der aktuellen Position aus gerechnet.
    pub fn nudge(&mut self, axis: Axis, delta: i8) {
        let state = self.axis(axis);
        let base = state.pending.unwrap_or(state.value) as i16;
        let target = state.bounds.clamp(base + delta as i16);
        self.axis_mut(axis).pending = Some(target);
    }

    /// Abbruch der laufenden Bewegung (ohne Wirkung im Idle-Zustand)
    pub fn cancel(&self) -> bool {
        self.flags.request_cancel()
    }

    /// Verteilt ein Fern-Kommando auf die Controller-Operationen
    pub fn apply(&mut self, command: CoverCommand) -> Result<(), CoverError> {
        match command {
            CoverCommand::Open => self.request_open(Axis::Lift),
            CoverCommand::Close => self.request_close(Axis::Lift),
            CoverCommand::Stop => {
                self.cancel();
            }
            CoverCommand::GoToLiftPercentage(percent) => {
                self.request_percentage(Axis::Lift, percent)?
            }
            CoverCommand::GoToTiltPercentage(percent) => {
                self.request_percentage(Axis::Tilt, percent)?
            }
        }
        Ok(())
    }

    /// Fährt alle offenen Ziele an: erst Lift komplett, dann Tilt
    ///
    /// Ein Abbruch beendet nur die laufende Achse an der nächsten Schritt-Grenze;
    /// das offene Ziel der anderen Achse wird danach normal angefahren.
    pub async fn tick<R, D, T>(
        &mut self,
        reporter: &mut R,
        display: &mut D,
        timer: &mut T,
    ) -> TickSummary
    where
        R: PositionReporter,
        D: PositionDisplay,
        T: StepTimer,
    {
        let mut summary = TickSummary::default();

        for axis in Axis::ALL {
            let Some(target) = self.axis_mut(axis).pending.take() else {
                continue;
            };

            let motion = self.run_axis(axis, target, reporter, display, timer).await;
            summary.record(axis, motion);
        }

        summary
    }

    async fn run_axis<R, D, T>(
        &mut self,
        axis: Axis,
        target: u8,
        reporter: &mut R,
        display: &mut D,
        timer: &mut T,
    ) -> AxisMotion
    where
        R: PositionReporter,
        D: PositionDisplay,
        T: StepTimer,
    {
        let mut steps: u8 = 0;
        let mut cancelled = false;

        self.flags.begin();

        loop {
            let current = self.axis(axis).value;
            if current == target {
                break;
            }
            if self.flags.cancel_requested() {
                cancelled = true;
                break;
            }

            self.axis_mut(axis).value = step_toward(current, target);
            steps += 1;

            reporter.report(axis, self.percentage(axis));
            display.show(self.position());

            timer.wait_ms(self.step_delay_ms).await;
        }

        self.flags.finish();

        AxisMotion {
            steps,
            cancelled,
            final_value: self.axis(axis).value,
        }
    }
}

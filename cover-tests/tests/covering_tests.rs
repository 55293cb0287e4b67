//! Integration Tests für den Positions-Controller
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen Mock-Reporter,
//! Mock-Anzeige und einen Mock-Timer ohne echte Zeit.

use cover_core::{
    Axis, AxisBounds, ControllerConfig, CoverCommand, LatestCommands, MotionFlags, MotionState,
    Position, PositionController, PositionDisplay, PositionReporter, RemoteDispatch, StepTimer,
};
use std::cell::RefCell;

use embassy_futures::block_on;
use proptest::prelude::*;

// ============================================================================
// Mocks
// ============================================================================

#[derive(Default)]
pub struct MockReporter {
    pub reports: Vec<(Axis, u8)>,
}

impl MockReporter {
    fn percents(&self, axis: Axis) -> Vec<u8> {
        self.reports
            .iter()
            .filter(|(a, _)| *a == axis)
            .map(|(_, p)| *p)
            .collect()
    }
}

impl PositionReporter for MockReporter {
    fn report(&mut self, axis: Axis, percent: u8) {
        self.reports.push((axis, percent));
    }
}

#[derive(Default)]
pub struct MockDisplay {
    pub frames: Vec<Position>,
}

impl MockDisplay {
    fn visited(&self, axis: Axis) -> Vec<u8> {
        self.frames.iter().map(|p| p.get(axis)).collect()
    }
}

impl PositionDisplay for MockDisplay {
    fn show(&mut self, position: Position) {
        self.frames.push(position);
    }
}

/// Timer ohne echte Zeit; kann nach N Wartezeiten einen Stop auslösen
/// (simuliert den MQTT-Task, der während der Bewegung läuft)
pub struct MockTimer<'a> {
    pub waits: Vec<u32>,
    pub moving_during_wait: Vec<bool>,
    flags: &'a MotionFlags,
    cancel_after: Option<usize>,
}

impl<'a> MockTimer<'a> {
    fn new(flags: &'a MotionFlags) -> Self {
        Self {
            waits: Vec::new(),
            moving_during_wait: Vec::new(),
            flags,
            cancel_after: None,
        }
    }

    fn cancelling_after(flags: &'a MotionFlags, waits: usize) -> Self {
        Self {
            cancel_after: Some(waits),
            ..Self::new(flags)
        }
    }
}

impl StepTimer for MockTimer<'_> {
    async fn wait_ms(&mut self, ms: u32) {
        self.waits.push(ms);
        self.moving_during_wait.push(self.flags.is_moving());
        if self.cancel_after == Some(self.waits.len()) {
            assert!(self.flags.request_cancel());
        }
    }
}

fn lift_0_9_tilt_0_5() -> ControllerConfig {
    ControllerConfig::new(
        AxisBounds::new(0, 9).unwrap(),
        AxisBounds::new(0, 5).unwrap(),
    )
}

// ============================================================================
// Tests: Szenarien
// ============================================================================

#[test]
fn test_lift_from_9_to_3() {
    let flags = MotionFlags::new();
    let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags);
    let mut reporter = MockReporter::default();
    let mut display = MockDisplay::default();
    let mut timer = MockTimer::new(&flags);

    controller.request_absolute(Axis::Lift, 3);
    let summary = block_on(controller.tick(&mut reporter, &mut display, &mut timer));

    assert_eq!(display.visited(Axis::Lift), vec![8, 7, 6, 5, 4, 3]);
    assert_eq!(reporter.percents(Axis::Lift), vec![89, 78, 67, 56, 44, 33]);
    assert_eq!(summary.lift.unwrap().steps, 6);
    assert_eq!(controller.motion_state(), MotionState::Idle);
    assert_eq!(controller.pending(Axis::Lift), None);
}

#[test]
fn test_cancel_after_two_steps() {
    let flags = MotionFlags::new();
    let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags)
        .with_position(Position { lift: 5, tilt: 5 });
    let mut reporter = MockReporter::default();
    let mut display = MockDisplay::default();
    let mut timer = MockTimer::cancelling_after(&flags, 2);

    controller.request_absolute(Axis::Lift, 0);
    let summary = block_on(controller.tick(&mut reporter, &mut display, &mut timer));

    assert_eq!(display.visited(Axis::Lift), vec![4, 3]);
    assert_eq!(controller.position().lift, 3);
    assert!(summary.was_cancelled());
    assert_eq!(controller.motion_state(), MotionState::Idle);
    assert!(!flags.is_moving());
}

#[test]
fn test_step_delay_between_every_step() {
    let flags = MotionFlags::new();
    let config = lift_0_9_tilt_0_5().with_step_delay_ms(250);
    let mut controller = PositionController::new(config, &flags);
    let mut timer = MockTimer::new(&flags);

    controller.request_absolute(Axis::Lift, 6);
    block_on(controller.tick(
        &mut MockReporter::default(),
        &mut MockDisplay::default(),
        &mut timer,
    ));

    assert_eq!(timer.waits, vec![250, 250, 250]);
    assert!(timer.moving_during_wait.iter().all(|moving| *moving));
}

#[test]
fn test_lift_completes_before_tilt() {
    let flags = MotionFlags::new();
    let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags);
    let mut reporter = MockReporter::default();
    let mut display = MockDisplay::default();
    let mut timer = MockTimer::new(&flags);

    controller.request_absolute(Axis::Tilt, 3);
    controller.request_absolute(Axis::Lift, 7);
    block_on(controller.tick(&mut reporter, &mut display, &mut timer));

    let axes: Vec<Axis> = reporter.reports.iter().map(|(axis, _)| *axis).collect();
    assert_eq!(axes, vec![Axis::Lift, Axis::Lift, Axis::Tilt, Axis::Tilt]);
    assert_eq!(controller.position(), Position { lift: 7, tilt: 3 });
}

#[test]
fn test_tilt_percentage_uses_tilt_bounds() {
    let flags = MotionFlags::new();
    let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags);
    let mut reporter = MockReporter::default();

    controller.request_absolute(Axis::Tilt, 3);
    block_on(controller.tick(
        &mut reporter,
        &mut MockDisplay::default(),
        &mut MockTimer::new(&flags),
    ));

    assert_eq!(reporter.percents(Axis::Tilt), vec![80, 60]);
}

#[test]
fn test_cancel_keeps_tilt_request_issued_before_stop() {
    let flags = MotionFlags::new();
    let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags);
    let mut reporter = MockReporter::default();
    let mut timer = MockTimer::cancelling_after(&flags, 1);

    controller.request_absolute(Axis::Tilt, 0);
    controller.request_absolute(Axis::Lift, 0);
    let summary = block_on(controller.tick(
        &mut reporter,
        &mut MockDisplay::default(),
        &mut timer,
    ));

    // Lift hält nach dem ersten Schritt, Tilt fährt trotzdem sein Ziel an
    assert_eq!(controller.position(), Position { lift: 8, tilt: 0 });
    assert!(summary.lift.unwrap().cancelled);
    let tilt = summary.tilt.unwrap();
    assert!(!tilt.cancelled);
    assert_eq!(tilt.steps, 5);
    assert_eq!(controller.pending(Axis::Tilt), None);
    assert_eq!(reporter.percents(Axis::Tilt), vec![80, 60, 40, 20, 0]);
    assert_eq!(controller.motion_state(), MotionState::Idle);
}

#[test]
fn test_stale_cancel_does_not_stop_next_motion() {
    let flags = MotionFlags::new();
    let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags);

    // Stop im Idle-Zustand: ohne Wirkung
    assert!(!flags.request_cancel());
    controller.apply(CoverCommand::Stop).unwrap();

    controller.request_absolute(Axis::Lift, 4);
    let summary = block_on(controller.tick(
        &mut MockReporter::default(),
        &mut MockDisplay::default(),
        &mut MockTimer::new(&flags),
    ));

    assert!(!summary.was_cancelled());
    assert_eq!(controller.position().lift, 4);
}

#[test]
fn test_request_after_cancel_runs_on_next_tick() {
    let flags = MotionFlags::new();
    let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags);

    controller.request_absolute(Axis::Lift, 0);
    block_on(controller.tick(
        &mut MockReporter::default(),
        &mut MockDisplay::default(),
        &mut MockTimer::cancelling_after(&flags, 3),
    ));
    assert_eq!(controller.position().lift, 6);

    controller.request_absolute(Axis::Lift, 8);
    block_on(controller.tick(
        &mut MockReporter::default(),
        &mut MockDisplay::default(),
        &mut MockTimer::new(&flags),
    ));
    assert_eq!(controller.position().lift, 8);
}

#[test]
fn test_go_to_lift_percentage_50_rounds_to_5() {
    let flags = MotionFlags::new();
    let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags);

    let command = CoverCommand::try_from("LIFT 50").unwrap();
    controller.apply(command).unwrap();

    assert_eq!(controller.pending(Axis::Lift), Some(5));
}

#[test]
fn test_local_buttons_nudge_pending_target() {
    let flags = MotionFlags::new();
    let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags);

    controller.nudge(Axis::Lift, -1);
    controller.nudge(Axis::Lift, -1);
    controller.nudge(Axis::Lift, 1);
    block_on(controller.tick(
        &mut MockReporter::default(),
        &mut MockDisplay::default(),
        &mut MockTimer::new(&flags),
    ));

    assert_eq!(controller.position().lift, 8);
}

#[test]
fn test_request_at_current_value_takes_no_steps() {
    let flags = MotionFlags::new();
    let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags);
    let mut reporter = MockReporter::default();

    controller.request_close(Axis::Lift);
    let summary = block_on(controller.tick(
        &mut reporter,
        &mut MockDisplay::default(),
        &mut MockTimer::new(&flags),
    ));

    assert_eq!(summary.lift.unwrap().steps, 0);
    assert!(reporter.reports.is_empty());
}

// ============================================================================
// Tests: Kommandos während einer Fahrt
// ============================================================================

/// Übernimmt gemerkte Kommandos wie der Control-Loop zwischen zwei Ticks
fn apply_latest(controller: &mut PositionController<'_>, latest: &mut LatestCommands) {
    for command in latest.take().into_iter().flatten() {
        controller.apply(command).unwrap();
    }
}

#[test]
fn test_slider_drag_during_motion_ends_at_last_target() {
    let flags = MotionFlags::new();
    let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags);
    let mut latest = LatestCommands::new();

    for text in ["LIFT 90", "LIFT 70", "LIFT 50", "LIFT 30", "LIFT 10"] {
        latest.record(CoverCommand::try_from(text).unwrap());
    }
    apply_latest(&mut controller, &mut latest);
    assert!(latest.is_empty());

    block_on(controller.tick(
        &mut MockReporter::default(),
        &mut MockDisplay::default(),
        &mut MockTimer::new(&flags),
    ));

    // 10 % von 0..=9 → 0.9 → 1
    assert_eq!(controller.position().lift, 1);
}

#[test]
fn test_latest_commands_keep_one_per_axis() {
    let mut latest = LatestCommands::new();

    assert_eq!(latest.record(CoverCommand::GoToTiltPercentage(40)), None);
    assert_eq!(latest.record(CoverCommand::Close), None);
    assert_eq!(
        latest.record(CoverCommand::Open),
        Some(CoverCommand::Close)
    );
    assert_eq!(latest.record(CoverCommand::Stop), None);

    assert_eq!(
        latest.take(),
        [
            Some(CoverCommand::Open),
            Some(CoverCommand::GoToTiltPercentage(40))
        ]
    );
    assert_eq!(latest.take(), [None, None]);
}

/// Timer, der während der Fahrt Fern-Kommandos verteilt (wie der MQTT-Task)
struct DispatchingTimer<'a> {
    flags: &'a MotionFlags,
    latest: &'a RefCell<LatestCommands>,
    incoming: Vec<(usize, CoverCommand)>,
    waits: usize,
    results: Vec<RemoteDispatch>,
}

impl StepTimer for DispatchingTimer<'_> {
    async fn wait_ms(&mut self, _ms: u32) {
        self.waits += 1;
        for (_, command) in self.incoming.iter().filter(|(at, _)| *at == self.waits) {
            let result = self.latest.borrow_mut().dispatch(*command, self.flags);
            self.results.push(result);
        }
    }
}

#[test]
fn test_commands_during_motion_last_per_axis_wins_and_stop_cancels() {
    let flags = MotionFlags::new();
    let latest = RefCell::new(LatestCommands::new());
    let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags);
    let mut timer = DispatchingTimer {
        flags: &flags,
        latest: &latest,
        incoming: vec![
            (1, CoverCommand::GoToLiftPercentage(80)),
            (1, CoverCommand::GoToLiftPercentage(60)),
            (2, CoverCommand::GoToTiltPercentage(40)),
            (2, CoverCommand::GoToLiftPercentage(40)),
            (3, CoverCommand::Stop),
        ],
        waits: 0,
        results: Vec::new(),
    };

    controller.request_absolute(Axis::Lift, 0);
    let summary = block_on(controller.tick(
        &mut MockReporter::default(),
        &mut MockDisplay::default(),
        &mut timer,
    ));

    assert!(summary.was_cancelled());
    assert_eq!(controller.position().lift, 6);
    assert_eq!(
        timer.results,
        vec![
            RemoteDispatch::Stored { replaced: None },
            RemoteDispatch::Stored {
                replaced: Some(CoverCommand::GoToLiftPercentage(80))
            },
            RemoteDispatch::Stored { replaced: None },
            RemoteDispatch::Stored {
                replaced: Some(CoverCommand::GoToLiftPercentage(60))
            },
            RemoteDispatch::Cancelled,
        ]
    );

    // Nächste Runde des Control-Loops: gemerkte Ziele übernehmen
    apply_latest(&mut controller, &mut latest.borrow_mut());
    block_on(controller.tick(
        &mut MockReporter::default(),
        &mut MockDisplay::default(),
        &mut MockTimer::new(&flags),
    ));

    // 40 % von 0..=9 → 3.6 → 4, 40 % von 0..=5 → 2
    assert_eq!(controller.position(), Position { lift: 4, tilt: 2 });
    assert_eq!(
        latest.borrow_mut().dispatch(CoverCommand::Stop, &flags),
        RemoteDispatch::IgnoredIdle
    );
}

#[test]
fn test_open_then_tilt_during_motion_both_run() {
    let flags = MotionFlags::new();
    let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags);
    let mut latest = LatestCommands::new();

    latest.record(CoverCommand::Open);
    latest.record(CoverCommand::GoToTiltPercentage(20));
    apply_latest(&mut controller, &mut latest);

    block_on(controller.tick(
        &mut MockReporter::default(),
        &mut MockDisplay::default(),
        &mut MockTimer::new(&flags),
    ));

    assert_eq!(controller.position(), Position { lift: 0, tilt: 1 });
}

// ============================================================================
// Property Tests
// ============================================================================

fn run_to_completion(start: u8, target: u8) -> (Vec<u8>, u8, u8) {
    let flags = MotionFlags::new();
    let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags)
        .with_position(Position { lift: start, tilt: 5 });
    let mut display = MockDisplay::default();

    controller.request_absolute(Axis::Lift, target);
    let summary = block_on(controller.tick(
        &mut MockReporter::default(),
        &mut display,
        &mut MockTimer::new(&flags),
    ));

    let steps = summary.lift.map_or(0, |motion| motion.steps);
    (display.visited(Axis::Lift), controller.position().lift, steps)
}

proptest! {
    #[test]
    fn prop_motion_reaches_target_in_unit_steps(start in 0u8..=9, target in 0u8..=9) {
        let (visited, end, steps) = run_to_completion(start, target);

        prop_assert_eq!(end, target);
        prop_assert_eq!(steps, start.abs_diff(target));
        prop_assert_eq!(visited.len(), start.abs_diff(target) as usize);

        let mut previous = start;
        for value in visited {
            prop_assert_eq!(previous.abs_diff(value), 1);
            previous = value;
        }
    }

    #[test]
    fn prop_cancel_leaves_last_step_value(
        start in 0u8..=9,
        target in 0u8..=9,
        after in 1usize..=9,
    ) {
        prop_assume!(start != target);
        let after = after.min(start.abs_diff(target) as usize);

        let flags = MotionFlags::new();
        let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags)
            .with_position(Position { lift: start, tilt: 5 });
        let mut display = MockDisplay::default();

        controller.request_absolute(Axis::Lift, target);
        block_on(controller.tick(
            &mut MockReporter::default(),
            &mut display,
            &mut MockTimer::cancelling_after(&flags, after),
        ));

        let visited = display.visited(Axis::Lift);
        prop_assert_eq!(visited.len(), after);
        prop_assert_eq!(visited.last().copied(), Some(controller.position().lift));
        prop_assert!(controller.position().lift <= 9);
        prop_assert_eq!(controller.motion_state(), MotionState::Idle);
    }

    #[test]
    fn prop_last_write_wins(start in 0u8..=9, targets in prop::collection::vec(0u8..=9, 1..6)) {
        let flags = MotionFlags::new();
        let mut controller = PositionController::new(lift_0_9_tilt_0_5(), &flags)
            .with_position(Position { lift: start, tilt: 5 });

        for target in &targets {
            controller.request_absolute(Axis::Lift, *target);
        }
        let expected = *targets.last().unwrap();
        let (reference, _, _) = run_to_completion(start, expected);

        let mut display = MockDisplay::default();
        block_on(controller.tick(
            &mut MockReporter::default(),
            &mut display,
            &mut MockTimer::new(&flags),
        ));

        prop_assert_eq!(controller.position().lift, expected);
        prop_assert_eq!(display.visited(Axis::Lift), reference);
    }
}

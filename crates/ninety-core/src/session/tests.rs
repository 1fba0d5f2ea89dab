use std::sync::{Arc, Mutex};

use super::*;
use crate::error::{CoreError, EnvironmentError, ValidationError};
use crate::texts::FirstSelector;

type CallLog = Arc<Mutex<Vec<&'static str>>>;

struct RecordingCue {
    calls: CallLog,
    fail_init: bool,
}

impl AmbientCue for RecordingCue {
    fn init(&mut self) -> Result<(), EnvironmentError> {
        self.calls.lock().unwrap().push("init");
        if self.fail_init {
            return Err(EnvironmentError::AudioUnavailable("test host".into()));
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), EnvironmentError> {
        self.calls.lock().unwrap().push("start");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EnvironmentError> {
        self.calls.lock().unwrap().push("stop");
        Ok(())
    }
}

/// Hands out good indices for `budget` picks, then out-of-range ones.
struct ExhaustingSelector {
    budget: usize,
}

impl TextSelector for ExhaustingSelector {
    fn pick_index(&mut self, len: usize) -> usize {
        if self.budget == 0 {
            return len;
        }
        self.budget -= 1;
        0
    }
}

struct BrokenProbe;

impl VisibilityProbe for BrokenProbe {
    fn is_foreground(&mut self) -> Result<bool, EnvironmentError> {
        Err(EnvironmentError::VisibilityUnavailable("headless".into()))
    }
}

fn abc_catalog() -> TextCatalog {
    TextCatalog {
        waiting_cycles: vec![vec!["a".into(), "b".into(), "c".into()]],
        ..TextCatalog::default()
    }
}

fn session_with(fail_init: bool) -> (Session, CallLog) {
    let calls: CallLog = Arc::default();
    let cue = RecordingCue {
        calls: Arc::clone(&calls),
        fail_init,
    };
    let session = Session::new(abc_catalog(), Box::new(FirstSelector), Box::new(cue)).unwrap();
    (session, calls)
}

fn session() -> Session {
    session_with(false).0
}

fn started() -> Session {
    let mut s = session();
    s.start_session().unwrap();
    s.drain_events();
    s
}

fn phase_changes(events: &[Event]) -> Vec<(Phase, Phase)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::PhaseChanged { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

#[test]
fn new_session_is_idle() {
    let s = session();
    assert_eq!(s.phase(), Phase::Start);
    assert_eq!(s.elapsed_secs(), 0);
    assert!(!s.is_interrupted());
    assert_eq!(s.next_due_ms(), None);
}

#[test]
fn idle_session_does_not_tick() {
    let mut s = session();
    s.advance_by(30_000);
    assert_eq!(s.phase(), Phase::Start);
    assert_eq!(s.elapsed_secs(), 0);
    assert!(s.drain_events().is_empty());
}

#[test]
fn start_enters_acknowledge_synchronously() {
    let mut s = session();
    s.start_session().unwrap();

    assert_eq!(s.phase(), Phase::Acknowledge);
    assert_eq!(s.elapsed_secs(), 0);
    assert_eq!(s.pending_timers(TimerScope::Session), 1);

    let events = s.drain_events();
    assert!(matches!(events[0], Event::SessionStarted { restart: false, .. }));
    assert_eq!(phase_changes(&events), vec![(Phase::Start, Phase::Acknowledge)]);
}

#[test]
fn first_tick_stays_in_acknowledge() {
    let mut s = started();
    s.advance_by(1_000);
    assert_eq!(s.elapsed_secs(), 1);
    assert_eq!(s.phase(), Phase::Acknowledge);
    assert!(phase_changes(&s.drain_events()).is_empty());
}

#[test]
fn phase_follows_elapsed_thresholds() {
    let mut s = started();
    for t in 1..=120u64 {
        s.advance_to(t * 1_000);
        let expected = match t {
            0..=9 => Phase::Acknowledge,
            10..=59 => Phase::Breathing,
            60..=89 => Phase::Waiting,
            _ => Phase::Complete,
        };
        assert_eq!(s.phase(), expected, "t = {t}");
        assert_eq!(s.elapsed_secs(), t.min(SESSION_SECS), "t = {t}");
    }
}

#[test]
fn phases_progress_in_order() {
    let mut s = session();
    s.start_session().unwrap();
    s.advance_to(200_000);
    assert_eq!(
        phase_changes(&s.drain_events()),
        vec![
            (Phase::Start, Phase::Acknowledge),
            (Phase::Acknowledge, Phase::Breathing),
            (Phase::Breathing, Phase::Waiting),
            (Phase::Waiting, Phase::Complete),
        ]
    );
}

#[test]
fn breath_cue_follows_four_six_rhythm() {
    let mut s = started();
    let checks = [
        (10_000, BreathCue::Inhale),
        (13_999, BreathCue::Inhale),
        (14_000, BreathCue::Exhale),
        (19_999, BreathCue::Exhale),
        (20_000, BreathCue::Inhale),
        (24_000, BreathCue::Exhale),
        (30_000, BreathCue::Inhale),
        (54_000, BreathCue::Exhale),
        (59_999, BreathCue::Exhale),
        (60_000, BreathCue::Inhale),
    ];
    for (at, cue) in checks {
        s.advance_to(at);
        assert_eq!(s.breath_cue(), cue, "at {at} ms");
    }
    assert_eq!(s.phase(), Phase::Waiting);
    assert_eq!(s.pending_timers(TimerScope::Breathing), 0);
}

#[test]
fn breath_cue_events_alternate() {
    let mut s = started();
    s.advance_to(59_999);
    let cues: Vec<BreathCue> = s
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            Event::BreathCueChanged { cue, .. } => Some(cue),
            _ => None,
        })
        .collect();
    // Exhale at 14, 24, 34, 44, 54; inhale at 20, 30, 40, 50.
    assert_eq!(cues.len(), 9);
    assert!(cues.windows(2).all(|w| w[0] != w[1]));
    assert_eq!(cues.first(), Some(&BreathCue::Exhale));
}

#[test]
fn waiting_messages_rotate_every_eight_seconds() {
    let mut s = started();
    s.advance_to(59_000);
    assert_eq!(s.waiting_index(), 0);

    let checks = [
        (60_000, "a"),
        (67_999, "a"),
        (68_000, "b"),
        (76_000, "c"),
        (84_000, "a"),
        (89_999, "a"),
    ];
    for (at, text) in checks {
        s.advance_to(at);
        assert_eq!(s.phase(), Phase::Waiting);
        assert_eq!(s.waiting_text(), text, "at {at} ms");
    }
}

#[test]
fn waiting_index_resets_after_leaving() {
    let mut s = started();
    s.advance_to(70_000);
    assert_eq!(s.waiting_index(), 1);
    s.advance_to(90_000);
    assert_eq!(s.phase(), Phase::Complete);
    assert_eq!(s.waiting_index(), 0);
    assert_eq!(s.waiting_text(), "a");
}

#[test]
fn completes_at_ninety_and_stops_cue_once() {
    let (mut s, calls) = session_with(false);
    s.start_session().unwrap();
    s.advance_to(90_000);
    assert_eq!(s.phase(), Phase::Complete);
    assert_eq!(s.elapsed_secs(), 90);

    let completed = s
        .drain_events()
        .iter()
        .filter(|e| matches!(e, Event::SessionCompleted { .. }))
        .count();
    assert_eq!(completed, 1);

    s.advance_to(500_000);
    assert_eq!(s.phase(), Phase::Complete);
    assert_eq!(s.elapsed_secs(), 90);
    assert!(s.drain_events().is_empty());
    assert_eq!(s.next_due_ms(), None);
    assert_eq!(*calls.lock().unwrap(), vec!["init", "start", "stop"]);
}

#[test]
fn reset_mid_breathing_cancels_pending_exhale() {
    let mut s = started();
    s.advance_to(11_000);
    assert_eq!(s.phase(), Phase::Breathing);
    assert_eq!(s.pending_timers(TimerScope::Breathing), 2);

    s.reset_session();
    assert_eq!(s.phase(), Phase::Start);
    assert_eq!(s.elapsed_secs(), 0);
    assert_eq!(s.next_due_ms(), None);

    s.advance_to(40_000);
    assert_eq!(s.breath_cue(), BreathCue::Inhale);
    let events = s.drain_events();
    assert!(!events
        .iter()
        .any(|e| matches!(e, Event::BreathCueChanged { .. })));
}

#[test]
fn reset_stops_ambient_cue() {
    let (mut s, calls) = session_with(false);
    s.start_session().unwrap();
    s.advance_to(15_000);
    assert!(s.is_cue_playing());
    s.reset_session();
    assert!(!s.is_cue_playing());
    assert_eq!(calls.lock().unwrap().last(), Some(&"stop"));
}

#[test]
fn hidden_during_breathing_flags_interruption() {
    let mut s = started();
    s.advance_to(20_000);
    assert!(s.set_visibility(Visibility::Hidden));
    assert!(s.is_interrupted());
    // Clock keeps running; only the flag latches.
    s.advance_to(30_000);
    assert!(s.is_interrupted());
    assert!(s
        .drain_events()
        .iter()
        .any(|e| matches!(e, Event::InterruptionFlagged { phase: Phase::Breathing, .. })));
}

#[test]
fn hidden_while_idle_leaves_flag_clear() {
    let mut s = session();
    assert!(!s.set_visibility(Visibility::Hidden));
    assert!(!s.is_interrupted());

    s.start_session().unwrap();
    s.advance_to(90_000);
    assert!(!s.set_visibility(Visibility::Hidden));
    assert!(!s.is_interrupted());
}

#[test]
fn start_clears_interruption() {
    let mut s = started();
    s.advance_to(5_000);
    s.set_visibility(Visibility::Hidden);
    s.set_visibility(Visibility::Visible);
    assert!(s.is_interrupted());
    s.start_session().unwrap();
    assert!(!s.is_interrupted());
}

// reset_session keeps the flag while restart_session clears it.
#[test]
fn reset_keeps_flag_but_restart_clears_it() {
    let mut s = started();
    s.advance_to(30_000);
    s.set_visibility(Visibility::Hidden);

    s.reset_session();
    assert_eq!(s.phase(), Phase::Start);
    assert!(s.is_interrupted());
    assert!(s
        .drain_events()
        .iter()
        .any(|e| matches!(e, Event::SessionReset { interrupted: true, .. })));

    s.restart_session().unwrap();
    assert_eq!(s.phase(), Phase::Acknowledge);
    assert!(!s.is_interrupted());
    assert!(matches!(
        s.drain_events()[0],
        Event::SessionStarted { restart: true, .. }
    ));
}

#[test]
fn start_twice_is_idempotent() {
    let mut s = started();
    s.advance_to(45_000);
    s.set_visibility(Visibility::Hidden);

    s.start_session().unwrap();
    s.start_session().unwrap();
    assert_eq!(s.phase(), Phase::Acknowledge);
    assert_eq!(s.elapsed_secs(), 0);
    assert!(!s.is_interrupted());
    assert_eq!(s.pending_timers(TimerScope::Session), 1);
    assert_eq!(s.pending_timers(TimerScope::Breathing), 0);

    // Only one clock drives the new session.
    s.advance_by(1_000);
    assert_eq!(s.elapsed_secs(), 1);
}

#[test]
fn each_start_gets_a_fresh_session_id() {
    let mut s = session();
    s.start_session().unwrap();
    let first = s.id();
    s.start_session().unwrap();
    assert_ne!(first, s.id());
}

#[test]
fn restart_from_breathing_stops_previous_cue() {
    let (mut s, calls) = session_with(false);
    s.start_session().unwrap();
    s.advance_to(12_000);
    s.restart_session().unwrap();
    assert!(!s.is_cue_playing());
    assert_eq!(*calls.lock().unwrap(), vec!["init", "start", "stop"]);
}

#[test]
fn empty_waiting_list_is_rejected_up_front() {
    let catalog = TextCatalog {
        waiting_cycles: vec![Vec::new()],
        ..TextCatalog::default()
    };
    let err = Session::new(catalog, Box::new(FirstSelector), Box::new(SilentCue))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::EmptyCycle { index: 0, .. })
    ));
}

#[test]
fn failed_draw_leaves_session_untouched() {
    // Enough picks for the initial draw only.
    let selector = ExhaustingSelector { budget: 13 };
    let mut s = Session::new(abc_catalog(), Box::new(selector), Box::new(SilentCue)).unwrap();

    assert!(s.start_session().is_err());
    assert_eq!(s.phase(), Phase::Start);
    assert_eq!(s.next_due_ms(), None);
    assert!(s.drain_events().is_empty());
}

#[test]
fn audio_failure_does_not_stop_the_clock() {
    let (mut s, calls) = session_with(true);
    s.start_session().unwrap();
    s.advance_to(90_000);
    assert_eq!(s.phase(), Phase::Complete);
    assert!(!s.is_cue_playing());
    assert_eq!(*calls.lock().unwrap(), vec!["init"]);
}

#[test]
fn broken_visibility_probe_is_ignored() {
    let mut s = started();
    s.advance_to(20_000);
    assert!(!s.poll_visibility(&mut BrokenProbe));
    assert!(!s.is_interrupted());
    assert_eq!(s.phase(), Phase::Breathing);
}

#[test]
fn snapshot_reflects_current_state() {
    let mut s = started();
    s.advance_to(68_000);
    let snap = s.snapshot();
    assert_eq!(snap.phase, Phase::Waiting);
    assert_eq!(snap.elapsed_secs, 68);
    assert_eq!(snap.waiting_index, 1);
    assert_eq!(snap.waiting_text, "b");
    assert_eq!(snap.breath_text, "Inhale");
    assert_eq!(snap.session_id, s.id());
    assert_eq!(snap.clock_ms, 68_000);
}

#[test]
fn clock_never_moves_backwards() {
    let mut s = started();
    s.advance_to(20_000);
    s.advance_to(5_000);
    assert_eq!(s.clock_ms(), 20_000);
    assert_eq!(s.elapsed_secs(), 20);
}

#[test]
fn events_are_stamped_in_clock_order() {
    let mut s = started();
    s.advance_to(95_000);
    let events = s.drain_events();
    assert!(events.len() > 10);
    assert_eq!(events.first().map(Event::clock_ms), Some(0));
    assert_eq!(events.last().map(Event::clock_ms), Some(90_000));
    assert!(events.windows(2).all(|w| w[0].clock_ms() <= w[1].clock_ms()));
    assert_eq!(s.snapshot_event().clock_ms(), 95_000);
}

#[test]
fn starting_at_the_end_of_the_clock_does_not_overflow() {
    let mut s = session();
    s.advance_to(u64::MAX);
    s.start_session().unwrap();
    assert_eq!(s.phase(), Phase::Acknowledge);
    assert_eq!(s.next_due_ms(), Some(u64::MAX));

    s.advance_to(u64::MAX);
    assert_eq!(s.clock_ms(), u64::MAX);
    assert_eq!(s.elapsed_secs(), 1);
    assert_eq!(s.next_due_ms(), None);

    s.restart_session().unwrap();
    assert_eq!(s.phase(), Phase::Acknowledge);
    assert_eq!(s.elapsed_secs(), 0);
}

#[test]
fn events_serialize_with_type_tag() {
    let mut s = session();
    s.start_session().unwrap();
    let json = serde_json::to_value(&s.drain_events()[1]).unwrap();
    assert_eq!(json["type"], "phase_changed");
    assert_eq!(json["to"], "acknowledge");
}

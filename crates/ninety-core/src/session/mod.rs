//! Session controller and phase clock.
//!
//! A [`Session`] owns every piece of mutable state for one exercise: the
//! phase, elapsed seconds, the interruption flag, both rotation timers and
//! the selected texts. Like the rest of the core it has no thread of its
//! own; the caller moves its clock forward with [`Session::advance_to`] and
//! due timers fire in order against `&mut self`.
//!
//! ## Phase flow
//!
//! ```text
//! Start -> Acknowledge -> Breathing -> Waiting -> Complete
//!   ^           (start_session)                     |
//!   +--------------- reset_session -----------------+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = Session::with_defaults()?;
//! session.start_session()?;
//! session.advance_by(10_000);
//! assert_eq!(session.phase(), Phase::Breathing);
//! ```

mod interruption;
mod rotation;
#[cfg(test)]
mod tests;

pub use interruption::{InterruptionMonitor, InterruptionState, Visibility, VisibilityProbe};
pub use rotation::{BreathingRotation, WaitingRotation};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audio::{AmbientCue, CueGuard, SilentCue};
use crate::error::Result;
use crate::events::Event;
use crate::texts::{RandomSelector, SelectedTextSet, TextCatalog, TextSelector};
use crate::timer::{
    BreathCue, Fired, Phase, TimerKind, TimerQueue, TimerScope, SESSION_SECS, TICK_MS,
};

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub phase: Phase,
    pub elapsed_secs: u64,
    pub interrupted: bool,
    pub breath_cue: BreathCue,
    pub breath_text: String,
    pub waiting_index: usize,
    pub waiting_text: String,
    pub texts: SelectedTextSet,
    pub clock_ms: u64,
}

pub struct Session {
    id: Uuid,
    catalog: TextCatalog,
    selector: Box<dyn TextSelector + Send>,
    cue: CueGuard,
    timers: TimerQueue,
    /// Session clock in milliseconds. Never moves backwards.
    clock_ms: u64,
    phase: Phase,
    elapsed_secs: u64,
    interruption: InterruptionMonitor,
    breathing: BreathingRotation,
    waiting: WaitingRotation,
    texts: SelectedTextSet,
    events: Vec<Event>,
}

impl Session {
    /// Create an idle session in `Start`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any text category is empty.
    pub fn new(
        catalog: TextCatalog,
        mut selector: Box<dyn TextSelector + Send>,
        cue: Box<dyn AmbientCue + Send>,
    ) -> Result<Self> {
        let texts = catalog.draw(selector.as_mut())?;
        Ok(Self {
            id: Uuid::new_v4(),
            catalog,
            selector,
            cue: CueGuard::new(cue),
            timers: TimerQueue::new(),
            clock_ms: 0,
            phase: Phase::Start,
            elapsed_secs: 0,
            interruption: InterruptionMonitor::new(),
            breathing: BreathingRotation::default(),
            waiting: WaitingRotation::default(),
            texts,
            events: Vec::new(),
        })
    }

    /// Built-in texts, random selection, no sound.
    pub fn with_defaults() -> Result<Self> {
        Self::new(
            TextCatalog::default(),
            Box::new(RandomSelector::new()),
            Box::new(SilentCue),
        )
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn is_interrupted(&self) -> bool {
        self.interruption.is_flagged()
    }

    pub fn breath_cue(&self) -> BreathCue {
        self.breathing.cue()
    }

    pub fn waiting_index(&self) -> usize {
        self.waiting.index()
    }

    pub fn waiting_text(&self) -> &str {
        self.texts.waiting_text(self.waiting.index())
    }

    pub fn texts(&self) -> &SelectedTextSet {
        &self.texts
    }

    pub fn is_cue_playing(&self) -> bool {
        self.cue.is_playing()
    }

    /// Pending timers owned by `scope`.
    pub fn pending_timers(&self, scope: TimerScope) -> usize {
        self.timers.pending(scope)
    }

    /// Clock time of the next timer, if any is pending.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.timers.next_due()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            phase: self.phase,
            elapsed_secs: self.elapsed_secs,
            interrupted: self.is_interrupted(),
            breath_cue: self.breath_cue(),
            breath_text: self.texts.breath_labels.label(self.breath_cue()).to_string(),
            waiting_index: self.waiting.index(),
            waiting_text: self.waiting_text().to_string(),
            texts: self.texts.clone(),
            clock_ms: self.clock_ms,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot_event(&self) -> Event {
        Event::StateSnapshot {
            snapshot: self.snapshot(),
            at: Utc::now(),
        }
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a new 90 s exercise from any state.
    ///
    /// # Errors
    ///
    /// Fails before touching any state if a fresh text set cannot be drawn.
    pub fn start_session(&mut self) -> Result<()> {
        self.begin(false)
    }

    /// Clear the interruption flag, then start a new session.
    pub fn restart_session(&mut self) -> Result<()> {
        self.interruption.clear();
        self.begin(true)
    }

    /// Back to `Start` with the clock stopped.
    ///
    /// The interruption flag is kept so the start screen can show the notice.
    pub fn reset_session(&mut self) {
        self.elapsed_secs = 0;
        self.transition(Phase::Start);
        self.timers.clear();
        tracing::info!(session_id = %self.id, interrupted = self.is_interrupted(), "session reset");
        self.events.push(Event::SessionReset {
            interrupted: self.is_interrupted(),
            clock_ms: self.clock_ms,
            at: Utc::now(),
        });
    }

    /// Feed a host visibility change. Returns true if this flagged an
    /// interruption.
    pub fn set_visibility(&mut self, visibility: Visibility) -> bool {
        if !self.interruption.observe(visibility, self.phase) {
            return false;
        }
        tracing::info!(
            session_id = %self.id,
            phase = %self.phase,
            elapsed_secs = self.elapsed_secs,
            "session interrupted"
        );
        self.events.push(Event::InterruptionFlagged {
            phase: self.phase,
            elapsed_secs: self.elapsed_secs,
            clock_ms: self.clock_ms,
            at: Utc::now(),
        });
        true
    }

    /// Query a probe and feed the result. Probe failures are logged and
    /// otherwise ignored.
    pub fn poll_visibility<P>(&mut self, probe: &mut P) -> bool
    where
        P: VisibilityProbe + ?Sized,
    {
        match probe.is_foreground() {
            Ok(foreground) => self.set_visibility(Visibility::from(foreground)),
            Err(e) => {
                tracing::warn!(error = %e, "visibility probe failed");
                false
            }
        }
    }

    /// Move the session clock to `now_ms`, firing every timer due on the way.
    /// Earlier values are ignored.
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some(fired) = self.timers.pop_due(now_ms) {
            self.clock_ms = self.clock_ms.max(fired.due_ms);
            self.dispatch(fired);
        }
        self.clock_ms = self.clock_ms.max(now_ms);
    }

    pub fn advance_by(&mut self, delta_ms: u64) {
        self.advance_to(self.clock_ms.saturating_add(delta_ms));
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn begin(&mut self, restart: bool) -> Result<()> {
        let texts = self.catalog.draw(self.selector.as_mut())?;

        self.interruption.clear();
        self.teardown();
        self.id = Uuid::new_v4();
        self.texts = texts;
        self.elapsed_secs = 0;
        self.cue.init();
        self.timers.every(
            TimerScope::Session,
            TimerKind::ClockTick,
            self.clock_ms.saturating_add(TICK_MS),
            TICK_MS,
        );

        tracing::info!(session_id = %self.id, restart, "session started");
        self.events.push(Event::SessionStarted {
            session_id: self.id,
            restart,
            texts: self.texts.clone(),
            clock_ms: self.clock_ms,
            at: Utc::now(),
        });

        let from = std::mem::replace(&mut self.phase, Phase::Acknowledge);
        if from != Phase::Acknowledge {
            self.push_phase_changed(from, Phase::Acknowledge);
        }
        Ok(())
    }

    /// Release everything the previous session left behind.
    fn teardown(&mut self) {
        self.breathing.leave(&mut self.timers);
        self.waiting.leave(&mut self.timers);
        self.timers.clear();
        if self.cue.is_playing() {
            self.cue.stop();
        }
    }

    fn dispatch(&mut self, fired: Fired) {
        tracing::trace!(kind = ?fired.kind, due_ms = fired.due_ms, "timer fired");
        match fired.kind {
            TimerKind::ClockTick => self.on_clock_tick(),
            TimerKind::BreathCycle => {
                if self.phase == Phase::Breathing
                    && self.breathing.on_cycle(&mut self.timers, self.clock_ms)
                {
                    self.push_breath_cue();
                }
            }
            TimerKind::Exhale => {
                if self.breathing.on_exhale(self.phase) {
                    self.push_breath_cue();
                }
            }
            TimerKind::WaitingRotate => {
                let len = self.texts.waiting_cycle.len();
                if let Some(index) = self.waiting.advance(self.phase, len) {
                    tracing::debug!(index, "waiting cue advanced");
                    self.events.push(Event::WaitingCueAdvanced {
                        index,
                        text: self.texts.waiting_text(index).to_string(),
                        clock_ms: self.clock_ms,
                        at: Utc::now(),
                    });
                }
            }
        }
    }

    fn on_clock_tick(&mut self) {
        if self.phase.is_idle() {
            return;
        }
        self.elapsed_secs += 1;
        let next = Phase::for_elapsed(self.elapsed_secs);
        if next == Phase::Complete {
            self.elapsed_secs = SESSION_SECS;
        }
        self.transition(next);
    }

    /// The one place phases change after a session starts. Outgoing timers
    /// are released before incoming ones are scheduled.
    fn transition(&mut self, to: Phase) {
        let from = self.phase;
        if from == to {
            return;
        }

        match from {
            Phase::Breathing => self.breathing.leave(&mut self.timers),
            Phase::Waiting => self.waiting.leave(&mut self.timers),
            _ => {}
        }

        self.phase = to;
        self.push_phase_changed(from, to);

        match to {
            Phase::Breathing => {
                self.breathing.enter(&mut self.timers, self.clock_ms);
                self.cue.start();
            }
            Phase::Waiting => self.waiting.enter(&mut self.timers, self.clock_ms),
            Phase::Start | Phase::Complete => {
                self.timers.cancel_scope(TimerScope::Session);
                self.cue.stop();
            }
            Phase::Acknowledge => {}
        }

        if to == Phase::Complete {
            tracing::info!(session_id = %self.id, "session complete");
            self.events.push(Event::SessionCompleted {
                session_id: self.id,
                clock_ms: self.clock_ms,
                at: Utc::now(),
            });
        }
    }

    fn push_phase_changed(&mut self, from: Phase, to: Phase) {
        tracing::info!(
            session_id = %self.id,
            %from,
            %to,
            elapsed_secs = self.elapsed_secs,
            "phase changed"
        );
        self.events.push(Event::PhaseChanged {
            from,
            to,
            elapsed_secs: self.elapsed_secs,
            clock_ms: self.clock_ms,
            at: Utc::now(),
        });
    }

    fn push_breath_cue(&mut self) {
        let cue = self.breathing.cue();
        tracing::debug!(%cue, "breath cue changed");
        self.events.push(Event::BreathCueChanged {
            cue,
            label: self.texts.breath_labels.label(cue).to_string(),
            clock_ms: self.clock_ms,
            at: Utc::now(),
        });
    }
}

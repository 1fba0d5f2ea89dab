//! Text rotation timers owned by the breathing and waiting phases.
//!
//! Both rotations schedule into the session's [`TimerQueue`] under their own
//! scope and release that scope on `leave`, so nothing they scheduled can
//! fire after their phase ends.

use crate::timer::{
    BreathCue, Phase, TimerKind, TimerQueue, TimerScope, BREATH_CYCLE_MS, INHALE_MS,
    WAITING_ROTATE_MS,
};

/// Inhale for 4 s, exhale for the remaining 6 s of every 10 s cycle.
#[derive(Debug, Clone, Default)]
pub struct BreathingRotation {
    cue: BreathCue,
}

impl BreathingRotation {
    pub fn cue(&self) -> BreathCue {
        self.cue
    }

    pub fn enter(&mut self, timers: &mut TimerQueue, now_ms: u64) {
        timers.every(
            TimerScope::Breathing,
            TimerKind::BreathCycle,
            now_ms.saturating_add(BREATH_CYCLE_MS),
            BREATH_CYCLE_MS,
        );
        self.begin_inhale(timers, now_ms);
    }

    /// Start of every cycle after the first. Returns true if the cue changed.
    pub fn on_cycle(&mut self, timers: &mut TimerQueue, now_ms: u64) -> bool {
        let changed = self.cue != BreathCue::Inhale;
        self.begin_inhale(timers, now_ms);
        changed
    }

    /// Single-shot end of the inhale. Ignored if the phase moved on.
    pub fn on_exhale(&mut self, phase: Phase) -> bool {
        if phase != Phase::Breathing || self.cue == BreathCue::Exhale {
            return false;
        }
        self.cue = BreathCue::Exhale;
        true
    }

    pub fn leave(&mut self, timers: &mut TimerQueue) {
        timers.cancel_scope(TimerScope::Breathing);
        self.cue = BreathCue::Inhale;
    }

    fn begin_inhale(&mut self, timers: &mut TimerQueue, now_ms: u64) {
        self.cue = BreathCue::Inhale;
        timers.once(
            TimerScope::Breathing,
            TimerKind::Exhale,
            now_ms.saturating_add(INHALE_MS),
        );
    }
}

/// Steps through the session's comfort messages every 8 s.
#[derive(Debug, Clone, Default)]
pub struct WaitingRotation {
    index: usize,
}

impl WaitingRotation {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn enter(&mut self, timers: &mut TimerQueue, now_ms: u64) {
        self.index = 0;
        timers.every(
            TimerScope::Waiting,
            TimerKind::WaitingRotate,
            now_ms.saturating_add(WAITING_ROTATE_MS),
            WAITING_ROTATE_MS,
        );
    }

    /// Advance with wraparound. `None` outside the waiting phase or for an
    /// empty list.
    pub fn advance(&mut self, phase: Phase, len: usize) -> Option<usize> {
        if phase != Phase::Waiting {
            return None;
        }
        self.index = (self.index + 1).checked_rem(len)?;
        Some(self.index)
    }

    pub fn leave(&mut self, timers: &mut TimerQueue) {
        timers.cancel_scope(TimerScope::Waiting);
        self.index = 0;
    }
}

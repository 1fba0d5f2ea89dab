//! Virtual-time timer queue.
//!
//! Every interval and timeout a session uses lives here, tagged with the
//! scope that owns it. Nothing fires on its own: the session pops due
//! entries in `(due_ms, id)` order while advancing its clock, so the
//! earliest-scheduled timer wins ties.

use serde::{Deserialize, Serialize};

/// Handle returned when a timer is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

/// Owner of a timer. Cancelling a scope releases all of its timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerScope {
    /// Lives as long as the running session (the phase clock).
    Session,
    /// Lives while the breathing phase is active.
    Breathing,
    /// Lives while the waiting phase is active.
    Waiting,
}

/// What the session should do when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    ClockTick,
    BreathCycle,
    Exhale,
    WaitingRotate,
}

/// A timer that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub scope: TimerScope,
    pub kind: TimerKind,
    /// Scheduled fire time; the session clock is moved here before dispatch.
    pub due_ms: u64,
}

#[derive(Debug, Clone)]
struct Entry {
    id: TimerId,
    scope: TimerScope,
    kind: TimerKind,
    due_ms: u64,
    period_ms: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    next_id: u64,
    entries: Vec<Entry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a single-shot timer.
    pub fn once(&mut self, scope: TimerScope, kind: TimerKind, due_ms: u64) -> TimerId {
        self.push(scope, kind, due_ms, None)
    }

    /// Schedule a repeating timer. A zero period is treated as 1 ms.
    pub fn every(
        &mut self,
        scope: TimerScope,
        kind: TimerKind,
        first_due_ms: u64,
        period_ms: u64,
    ) -> TimerId {
        self.push(scope, kind, first_due_ms, Some(period_ms.max(1)))
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Cancel every timer owned by `scope`. Returns how many were released.
    pub fn cancel_scope(&mut self, scope: TimerScope) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.scope != scope);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of pending timers owned by `scope`.
    pub fn pending(&self, scope: TimerScope) -> usize {
        self.entries.iter().filter(|e| e.scope == scope).count()
    }

    /// Earliest due time across all pending timers.
    pub fn next_due(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.due_ms).min()
    }

    /// Remove (or reschedule, if periodic) the earliest timer due at or
    /// before `now_ms`. A periodic timer whose next due time would pass
    /// `u64::MAX` is removed after this fire.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Fired> {
        let pos = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= now_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.id))
            .map(|(i, _)| i)?;

        let entry = &mut self.entries[pos];
        let fired = Fired {
            id: entry.id,
            scope: entry.scope,
            kind: entry.kind,
            due_ms: entry.due_ms,
        };

        match entry.period_ms.and_then(|period| entry.due_ms.checked_add(period)) {
            Some(next_due_ms) => entry.due_ms = next_due_ms,
            None => {
                self.entries.swap_remove(pos);
            }
        }
        Some(fired)
    }

    fn push(
        &mut self,
        scope: TimerScope,
        kind: TimerKind,
        due_ms: u64,
        period_ms: Option<u64>,
    ) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            scope,
            kind,
            due_ms,
            period_ms,
        });
        id
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::SessionSnapshot;
use crate::texts::SelectedTextSet;
use crate::timer::{BreathCue, Phase};

/// Every state change in a session produces an Event.
/// The presentation layer drains them after each clock advance.
///
/// `clock_ms` is the session's own clock (milliseconds since it was
/// created); `at` is wall-clock time for logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        /// True when the start came from `restart_session`.
        restart: bool,
        /// Captions drawn for this session.
        texts: SelectedTextSet,
        clock_ms: u64,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
        elapsed_secs: u64,
        clock_ms: u64,
        at: DateTime<Utc>,
    },
    BreathCueChanged {
        cue: BreathCue,
        label: String,
        clock_ms: u64,
        at: DateTime<Utc>,
    },
    WaitingCueAdvanced {
        index: usize,
        text: String,
        clock_ms: u64,
        at: DateTime<Utc>,
    },
    /// Host went to the background mid-session.
    InterruptionFlagged {
        phase: Phase,
        elapsed_secs: u64,
        clock_ms: u64,
        at: DateTime<Utc>,
    },
    SessionReset {
        /// Interruption flag survives a reset.
        interrupted: bool,
        clock_ms: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        session_id: Uuid,
        clock_ms: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        snapshot: SessionSnapshot,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn clock_ms(&self) -> u64 {
        match self {
            Event::SessionStarted { clock_ms, .. }
            | Event::PhaseChanged { clock_ms, .. }
            | Event::BreathCueChanged { clock_ms, .. }
            | Event::WaitingCueAdvanced { clock_ms, .. }
            | Event::InterruptionFlagged { clock_ms, .. }
            | Event::SessionReset { clock_ms, .. }
            | Event::SessionCompleted { clock_ms, .. } => *clock_ms,
            Event::StateSnapshot { snapshot, .. } => snapshot.clock_ms,
        }
    }
}

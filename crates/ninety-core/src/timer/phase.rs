use std::fmt;

use serde::{Deserialize, Serialize};

/// Total length of one exercise in seconds.
pub const SESSION_SECS: u64 = 90;
/// Elapsed second at which breathing guidance begins.
pub const BREATHING_FROM_SECS: u64 = 10;
/// Elapsed second at which the waiting phase begins.
pub const WAITING_FROM_SECS: u64 = 60;

/// Period of the phase clock.
pub const TICK_MS: u64 = 1_000;
/// One full inhale + exhale cycle.
pub const BREATH_CYCLE_MS: u64 = 10_000;
/// Inhale portion of a breath cycle; the rest is exhale.
pub const INHALE_MS: u64 = 4_000;
/// How long each comfort message stays on screen while waiting.
pub const WAITING_ROTATE_MS: u64 = 8_000;

/// Stage of the guided exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Start,
    Acknowledge,
    Breathing,
    Waiting,
    Complete,
}

impl Phase {
    /// Phase for a running session at `elapsed_secs`.
    ///
    /// `Start` is never returned: it is only entered through an explicit reset.
    pub fn for_elapsed(elapsed_secs: u64) -> Self {
        match elapsed_secs {
            t if t < BREATHING_FROM_SECS => Phase::Acknowledge,
            t if t < WAITING_FROM_SECS => Phase::Breathing,
            t if t < SESSION_SECS => Phase::Waiting,
            _ => Phase::Complete,
        }
    }

    /// `Start` and `Complete` have no running clock.
    pub fn is_idle(self) -> bool {
        matches!(self, Phase::Start | Phase::Complete)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::Acknowledge => "acknowledge",
            Phase::Breathing => "breathing",
            Phase::Waiting => "waiting",
            Phase::Complete => "complete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Breathing instruction shown during the breathing phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathCue {
    #[default]
    Inhale,
    Exhale,
}

impl fmt::Display for BreathCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreathCue::Inhale => f.write_str("inhale"),
            BreathCue::Exhale => f.write_str("exhale"),
        }
    }
}

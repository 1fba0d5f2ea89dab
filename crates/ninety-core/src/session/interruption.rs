use serde::{Deserialize, Serialize};

use crate::error::EnvironmentError;
use crate::timer::Phase;

/// Host foreground state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

impl From<bool> for Visibility {
    /// `true` means foregrounded.
    fn from(foreground: bool) -> Self {
        if foreground {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }
}

/// Queryable source of the host's foreground state.
pub trait VisibilityProbe {
    fn is_foreground(&mut self) -> Result<bool, EnvironmentError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterruptionState {
    #[default]
    Clear,
    Flagged,
}

/// Latches once the host is hidden mid-session.
///
/// There is no way back to `Clear` except [`InterruptionMonitor::clear`],
/// which only the session controller calls when a new session starts.
#[derive(Debug, Clone, Default)]
pub struct InterruptionMonitor {
    state: InterruptionState,
}

impl InterruptionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InterruptionState {
        self.state
    }

    pub fn is_flagged(&self) -> bool {
        self.state == InterruptionState::Flagged
    }

    /// Returns true only on the `Clear -> Flagged` edge.
    pub fn observe(&mut self, visibility: Visibility, phase: Phase) -> bool {
        if visibility == Visibility::Visible || phase.is_idle() || self.is_flagged() {
            return false;
        }
        self.state = InterruptionState::Flagged;
        true
    }

    pub(crate) fn clear(&mut self) {
        self.state = InterruptionState::Clear;
    }
}

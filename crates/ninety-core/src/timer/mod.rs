mod phase;
mod queue;

pub use phase::{
    BreathCue, Phase, BREATHING_FROM_SECS, BREATH_CYCLE_MS, INHALE_MS, SESSION_SECS, TICK_MS,
    WAITING_FROM_SECS, WAITING_ROTATE_MS,
};
pub use queue::{Fired, TimerId, TimerKind, TimerQueue, TimerScope};

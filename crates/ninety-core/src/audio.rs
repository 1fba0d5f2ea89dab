//! Ambient cue boundary.
//!
//! The session only knows three effects: `init`, `start`, `stop`. Drivers
//! may fail (no audio device, autoplay blocked); [`CueGuard`] logs and
//! swallows those failures so the phase clock always keeps running.

use serde::{Deserialize, Serialize};

use crate::error::EnvironmentError;

/// Background audio played while the breathing phase is active.
pub trait AmbientCue {
    /// Acquire the audio facility. Called once per session start; the guard
    /// skips it after the first success.
    fn init(&mut self) -> Result<(), EnvironmentError>;
    fn start(&mut self) -> Result<(), EnvironmentError>;
    fn stop(&mut self) -> Result<(), EnvironmentError>;
}

/// Parameters of the soft two-tone hum a driver should synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientTone {
    pub base_hz: f64,
    pub overtone_hz: f64,
    /// Peak gain after fading in (0.0 ..= 1.0).
    pub gain: f64,
    pub fade_secs: u64,
}

impl Default for AmbientTone {
    fn default() -> Self {
        Self {
            base_hz: 80.0,
            overtone_hz: 120.0,
            gain: 0.02,
            fade_secs: 1,
        }
    }
}

/// Driver for hosts without sound, or with ambient audio switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCue;

impl AmbientCue for SilentCue {
    fn init(&mut self) -> Result<(), EnvironmentError> {
        Ok(())
    }

    fn start(&mut self) -> Result<(), EnvironmentError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EnvironmentError> {
        Ok(())
    }
}

/// Wraps a driver so that its failures never escape into the session.
pub struct CueGuard {
    driver: Box<dyn AmbientCue + Send>,
    initialized: bool,
    playing: bool,
}

impl CueGuard {
    pub fn new(driver: Box<dyn AmbientCue + Send>) -> Self {
        Self {
            driver,
            initialized: false,
            playing: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Idempotent. A failed init leaves the guard uninitialized, so later
    /// `start`/`stop` calls become no-ops until an init succeeds.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        match self.driver.init() {
            Ok(()) => self.initialized = true,
            Err(e) => tracing::warn!(error = %e, "ambient cue unavailable, continuing without sound"),
        }
    }

    pub fn start(&mut self) {
        if !self.initialized {
            tracing::debug!("ambient cue not initialized, skipping start");
            return;
        }
        if self.playing {
            return;
        }
        match self.driver.start() {
            Ok(()) => self.playing = true,
            Err(e) => tracing::warn!(error = %e, "failed to start ambient cue"),
        }
    }

    pub fn stop(&mut self) {
        if !self.initialized {
            return;
        }
        if let Err(e) = self.driver.stop() {
            tracing::warn!(error = %e, "failed to stop ambient cue");
        }
        self.playing = false;
    }
}

impl std::fmt::Debug for CueGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueGuard")
            .field("initialized", &self.initialized)
            .field("playing", &self.playing)
            .finish_non_exhaustive()
    }
}

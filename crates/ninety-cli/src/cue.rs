use ninety_core::{AmbientCue, AmbientTone, EnvironmentError};

/// Announces the ambient hum on stderr instead of synthesizing it.
pub struct ConsoleCue {
    tone: AmbientTone,
}

impl ConsoleCue {
    pub fn new(tone: AmbientTone) -> Self {
        Self { tone }
    }
}

impl AmbientCue for ConsoleCue {
    fn init(&mut self) -> Result<(), EnvironmentError> {
        Ok(())
    }

    fn start(&mut self) -> Result<(), EnvironmentError> {
        eprintln!(
            "~ ambient hum {:.0} Hz + {:.0} Hz, gain {:.2}, fading in over {}s ~",
            self.tone.base_hz, self.tone.overtone_hz, self.tone.gain, self.tone.fade_secs
        );
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EnvironmentError> {
        eprintln!("~ ambient hum fading out over {}s ~", self.tone.fade_secs);
        Ok(())
    }
}

//! Terminal rendering of session events.

use ninety_core::{Event, Phase, SelectedTextSet, SessionSnapshot};

pub struct Printer {
    json: bool,
    texts: SelectedTextSet,
    /// Session clock at the last start, for cue timestamps.
    started_at_ms: u64,
}

impl Printer {
    pub fn new(json: bool, texts: SelectedTextSet) -> Self {
        Self {
            json,
            texts,
            started_at_ms: 0,
        }
    }

    pub fn start_screen(&self, interrupted: bool) {
        if self.json {
            return;
        }
        if interrupted {
            println!("  ({})", self.texts.interruption_notice);
        }
        println!("{}", self.texts.start_title);
        println!("  {}", self.texts.start_subtitle);
        println!("  {}", self.texts.start_description);
        println!("  [{}]  type 'start'", self.texts.start_button);
    }

    pub fn print(&mut self, event: &Event) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string(event)?);
            return Ok(());
        }

        match event {
            Event::SessionStarted {
                texts, clock_ms, ..
            } => {
                self.texts = texts.clone();
                self.started_at_ms = *clock_ms;
            }
            Event::PhaseChanged {
                to, elapsed_secs, ..
            } => self.phase_screen(*to, *elapsed_secs),
            Event::BreathCueChanged { label, .. } => line(self.secs(event.clock_ms()), label),
            Event::WaitingCueAdvanced { text, .. } => line(self.secs(event.clock_ms()), text),
            Event::InterruptionFlagged { elapsed_secs, .. } => {
                line(*elapsed_secs, "(interrupted)")
            }
            Event::SessionReset { interrupted, .. } => self.start_screen(*interrupted),
            Event::SessionCompleted { .. } => {}
            Event::StateSnapshot { snapshot, .. } => status(snapshot),
        }
        Ok(())
    }

    fn phase_screen(&self, phase: Phase, elapsed_secs: u64) {
        let t = &self.texts;
        match phase {
            Phase::Acknowledge => {
                line(elapsed_secs, &t.acknowledge_main);
                line(elapsed_secs, &t.acknowledge_sub);
            }
            Phase::Breathing => {
                line(elapsed_secs, &t.breathing_guide);
                line(elapsed_secs, &t.breath_labels.inhale);
            }
            Phase::Waiting => line(elapsed_secs, t.waiting_text(0)),
            Phase::Complete => {
                println!("{}", t.complete_main);
                println!("  {}", t.complete_sub);
                println!("  [{}]  type 'restart'", t.complete_restart);
            }
            // Covered by the SessionReset that follows.
            Phase::Start => {}
        }
    }

    fn secs(&self, clock_ms: u64) -> u64 {
        clock_ms.saturating_sub(self.started_at_ms) / 1_000
    }
}

fn line(secs: u64, text: &str) {
    println!("[{secs:>2}] {text}");
}

fn status(snapshot: &SessionSnapshot) {
    println!(
        "phase={} elapsed={}s interrupted={} breath={} waiting=\"{}\"",
        snapshot.phase,
        snapshot.elapsed_secs,
        snapshot.interrupted,
        snapshot.breath_cue,
        snapshot.waiting_text
    );
}

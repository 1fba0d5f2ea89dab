//! Guidance text pools and the per-session text snapshot.
//!
//! A [`TextCatalog`] holds every candidate string, grouped by category.
//! At session start one entry per category is drawn into an immutable
//! [`SelectedTextSet`]; categories are drawn independently.

mod selector;

pub use selector::{FirstSelector, RandomSelector, TextSelector};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timer::BreathCue;

/// Labels shown for each breath cue. Not randomized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathLabels {
    #[serde(default = "default_inhale")]
    pub inhale: String,
    #[serde(default = "default_exhale")]
    pub exhale: String,
}

fn default_inhale() -> String {
    "Inhale".into()
}
fn default_exhale() -> String {
    "Exhale".into()
}

impl Default for BreathLabels {
    fn default() -> Self {
        Self {
            inhale: default_inhale(),
            exhale: default_exhale(),
        }
    }
}

impl BreathLabels {
    pub fn label(&self, cue: BreathCue) -> &str {
        match cue {
            BreathCue::Inhale => &self.inhale,
            BreathCue::Exhale => &self.exhale,
        }
    }
}

/// Every candidate text, by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCatalog {
    pub start_titles: Vec<String>,
    pub start_subtitles: Vec<String>,
    pub start_descriptions: Vec<String>,
    pub start_buttons: Vec<String>,
    pub interruption_notices: Vec<String>,
    pub acknowledge_main: Vec<String>,
    pub acknowledge_sub: Vec<String>,
    pub breathing_guides: Vec<String>,
    /// Each entry is a whole rotation shown during the waiting phase.
    pub waiting_cycles: Vec<Vec<String>>,
    pub complete_main: Vec<String>,
    pub complete_sub: Vec<String>,
    pub complete_continue: Vec<String>,
    pub complete_restart: Vec<String>,
    #[serde(default)]
    pub breath_labels: BreathLabels,
}

/// One session's worth of text. Never mutated after it is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedTextSet {
    pub start_title: String,
    pub start_subtitle: String,
    pub start_description: String,
    pub start_button: String,
    pub interruption_notice: String,
    pub acknowledge_main: String,
    pub acknowledge_sub: String,
    pub breathing_guide: String,
    pub waiting_cycle: Vec<String>,
    pub complete_main: String,
    pub complete_sub: String,
    pub complete_continue: String,
    pub complete_restart: String,
    pub breath_labels: BreathLabels,
}

impl SelectedTextSet {
    /// Comfort message at `index`, wrapping around the rotation.
    pub fn waiting_text(&self, index: usize) -> &str {
        match self.waiting_cycle.len() {
            0 => "",
            len => &self.waiting_cycle[index % len],
        }
    }
}

impl TextCatalog {
    fn pools(&self) -> [(&'static str, &[String]); 12] {
        [
            ("start_titles", self.start_titles.as_slice()),
            ("start_subtitles", self.start_subtitles.as_slice()),
            ("start_descriptions", self.start_descriptions.as_slice()),
            ("start_buttons", self.start_buttons.as_slice()),
            ("interruption_notices", self.interruption_notices.as_slice()),
            ("acknowledge_main", self.acknowledge_main.as_slice()),
            ("acknowledge_sub", self.acknowledge_sub.as_slice()),
            ("breathing_guides", self.breathing_guides.as_slice()),
            ("complete_main", self.complete_main.as_slice()),
            ("complete_sub", self.complete_sub.as_slice()),
            ("complete_continue", self.complete_continue.as_slice()),
            ("complete_restart", self.complete_restart.as_slice()),
        ]
    }

    /// Reject any category a session could not draw from.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (category, pool) in self.pools() {
            if pool.is_empty() {
                return Err(ValidationError::EmptyPool { category });
            }
        }
        if self.waiting_cycles.is_empty() {
            return Err(ValidationError::EmptyPool {
                category: "waiting_cycles",
            });
        }
        if let Some(index) = self.waiting_cycles.iter().position(|c| c.is_empty()) {
            return Err(ValidationError::EmptyCycle {
                category: "waiting_cycles",
                index,
            });
        }
        Ok(())
    }

    /// Draw a fresh text set, one independent pick per category.
    pub fn draw<S>(&self, selector: &mut S) -> Result<SelectedTextSet, ValidationError>
    where
        S: TextSelector + ?Sized,
    {
        self.validate()?;
        Ok(SelectedTextSet {
            start_title: draw_one(selector, &self.start_titles, "start_titles")?,
            start_subtitle: draw_one(selector, &self.start_subtitles, "start_subtitles")?,
            start_description: draw_one(selector, &self.start_descriptions, "start_descriptions")?,
            start_button: draw_one(selector, &self.start_buttons, "start_buttons")?,
            interruption_notice: draw_one(
                selector,
                &self.interruption_notices,
                "interruption_notices",
            )?,
            acknowledge_main: draw_one(selector, &self.acknowledge_main, "acknowledge_main")?,
            acknowledge_sub: draw_one(selector, &self.acknowledge_sub, "acknowledge_sub")?,
            breathing_guide: draw_one(selector, &self.breathing_guides, "breathing_guides")?,
            waiting_cycle: draw_one(selector, &self.waiting_cycles, "waiting_cycles")?,
            complete_main: draw_one(selector, &self.complete_main, "complete_main")?,
            complete_sub: draw_one(selector, &self.complete_sub, "complete_sub")?,
            complete_continue: draw_one(selector, &self.complete_continue, "complete_continue")?,
            complete_restart: draw_one(selector, &self.complete_restart, "complete_restart")?,
            breath_labels: self.breath_labels.clone(),
        })
    }
}

fn draw_one<T, S>(selector: &mut S, pool: &[T], category: &'static str) -> Result<T, ValidationError>
where
    T: Clone,
    S: TextSelector + ?Sized,
{
    let index = selector.pick_index(pool.len());
    pool.get(index)
        .cloned()
        .ok_or(ValidationError::OutOfBounds {
            category,
            index,
            len: pool.len(),
        })
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for TextCatalog {
    fn default() -> Self {
        Self {
            start_titles: strings(&[
                "Ninety seconds",
                "Let the wave pass",
                "A short pause",
            ]),
            start_subtitles: strings(&[
                "A strong feeling rises and falls within about ninety seconds.",
                "You do not have to act on it right now.",
            ]),
            start_descriptions: strings(&[
                "Stay with this screen until the timer ends. Nothing else is needed.",
                "Follow the prompts. Breathe, notice, and wait for it to settle.",
            ]),
            start_buttons: strings(&["Begin", "Start", "I'm ready"]),
            interruption_notices: strings(&[
                "The last round was interrupted. Start again whenever you like.",
                "You left partway through. That's fine, begin a fresh round.",
            ]),
            acknowledge_main: strings(&[
                "Something strong is here right now.",
                "Notice what you are feeling.",
                "This feeling is allowed.",
            ]),
            acknowledge_sub: strings(&[
                "You don't need to fix it. Just let it be here.",
                "Name it quietly to yourself, if you can.",
            ]),
            breathing_guides: strings(&[
                "Follow the circle. Breathe in for four, out for six.",
                "Let the out-breath be longer than the in-breath.",
            ]),
            waiting_cycles: vec![
                strings(&[
                    "The feeling is already starting to ease.",
                    "Let it move through you.",
                    "You are still here, and you are okay.",
                    "Nothing needs to happen right now.",
                ]),
                strings(&[
                    "Waves rise, and waves fall.",
                    "Your body knows how to settle.",
                    "Stay with the next breath.",
                ]),
            ],
            complete_main: strings(&["Ninety seconds have passed.", "You stayed with it."]),
            complete_sub: strings(&[
                "Check in: is the feeling a little softer now?",
                "Whatever is left, you can meet it more calmly.",
            ]),
            complete_continue: strings(&["Continue", "Carry on"]),
            complete_restart: strings(&["One more round", "Again"]),
            breath_labels: BreathLabels::default(),
        }
    }
}

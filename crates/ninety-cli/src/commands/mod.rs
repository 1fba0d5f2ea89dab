pub mod config;
pub mod run;
pub mod simulate;
pub mod texts;

use ninety_core::{AmbientCue, Config, RandomSelector, Session, SilentCue, TextSelector};

use crate::cue::ConsoleCue;

fn selector(seed: Option<u64>) -> RandomSelector {
    match seed {
        Some(seed) => RandomSelector::seeded(seed),
        None => RandomSelector::new(),
    }
}

/// Build an idle session from configuration.
fn build_session(
    config: &Config,
    seed: Option<u64>,
    force_audio: bool,
) -> Result<Session, Box<dyn std::error::Error>> {
    let cue: Box<dyn AmbientCue + Send> = if force_audio || config.audio.enabled {
        Box::new(ConsoleCue::new(config.tone()))
    } else {
        Box::new(SilentCue)
    };
    let selector: Box<dyn TextSelector + Send> = Box::new(selector(seed));
    Ok(Session::new(config.catalog(), selector, cue)?)
}

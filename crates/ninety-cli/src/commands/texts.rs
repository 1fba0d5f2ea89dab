use clap::Subcommand;
use ninety_core::Config;

use super::selector;

#[derive(Subcommand)]
pub enum TextsAction {
    /// Check that every text category can be drawn from
    Validate,
    /// Draw one text set and print it as JSON
    Draw {
        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
    },
}

pub fn run(action: TextsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let catalog = config.catalog();
    match action {
        TextsAction::Validate => {
            catalog.validate()?;
            let source = if config.texts.is_some() {
                "config"
            } else {
                "built-in"
            };
            println!("ok ({source} catalog)");
        }
        TextsAction::Draw { seed } => {
            let set = catalog.draw(&mut selector(seed))?;
            println!("{}", serde_json::to_string_pretty(&set)?);
        }
    }
    Ok(())
}

mod config;

pub use config::{AudioConfig, Config, RuntimeConfig};

use std::path::PathBuf;

/// Returns `~/.config/ninety[-dev]/` based on NINETY_ENV.
///
/// Set NINETY_ENV=dev to use the development data directory, or
/// NINETY_CONFIG_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("NINETY_CONFIG_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("NINETY_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("ninety-dev")
            } else {
                base_dir.join("ninety")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

//! # Ninety Core Library
//!
//! This library provides the core logic for Ninety, a guided 90-second
//! self-regulation exercise. It follows a CLI-first philosophy: the
//! standalone `ninety` binary is a thin layer over the same core.
//!
//! ## Architecture
//!
//! - **Phase Clock**: a virtual-time state machine; the caller advances the
//!   session clock and due timers fire in order
//! - **Rotation Timers**: breathing cue (4 s in / 6 s out) and waiting-phase
//!   comfort messages, scoped to their phase
//! - **Interruption Monitor**: latches when the host is hidden mid-session
//! - **Storage**: TOML-based configuration and text catalog overrides
//!
//! ## Key Components
//!
//! - [`Session`]: session controller and phase clock
//! - [`TextCatalog`]: text pools, drawn into a [`SelectedTextSet`]
//! - [`AmbientCue`]: trait for the ambient audio driver
//! - [`Runner`]: tokio driver mapping wall-clock time onto a session
//! - [`Config`]: application configuration management

pub mod audio;
pub mod error;
pub mod events;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod texts;
pub mod timer;

pub use audio::{AmbientCue, AmbientTone, CueGuard, SilentCue};
pub use error::{ConfigError, CoreError, EnvironmentError, ValidationError};
pub use events::Event;
pub use runtime::{dispatch, Command, Runner};
pub use session::{Session, SessionSnapshot, Visibility, VisibilityProbe};
pub use storage::Config;
pub use texts::{RandomSelector, SelectedTextSet, TextCatalog, TextSelector};
pub use timer::{BreathCue, Phase};

//! Voice orchestration for ambient soundscapes
//!
//! This crate is the effectful half of the soundscape engine. Given the
//! layer registry from `soundscape-core` and an [`AudioVoice`] capability
//! supplied by the embedding application, it:
//! - keeps exactly one voice alive per registered layer (`pool`)
//! - re-triggers clips at jittered offsets inside a repeating master window
//!   (`scheduler`)
//! - pushes volume/mute changes to voices without disturbing timing
//!   (`levels`)
//! - exposes the global play/pause lifecycle and a threaded driver
//!   (`player`)

pub mod levels;
pub mod player;
pub mod pool;
pub mod scheduler;
pub mod voice;

#[cfg(test)]
mod player_tests;
#[cfg(test)]
pub(crate) mod testing;

pub use player::{Player, PlayerConfig, Soundscape};
pub use pool::VoicePool;
pub use scheduler::{Action, Scheduler};
pub use voice::{AudioVoice, VoiceFactory};

/// Re-export common types from soundscape-core.
pub use soundscape_core::{Layer, SoundscapeState, StateError, WindowParams};

/// Orchestration errors.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// A layer's source could not be fetched or decoded. The layer stays
    /// registered but silent; never fatal to the scheduler.
    #[error("failed to load source {url}: {reason}")]
    Load { url: String, reason: String },

    /// A registry operation referenced a bad layer id.
    #[error(transparent)]
    State(#[from] StateError),
}

pub type Result<T> = std::result::Result<T, AudioError>;

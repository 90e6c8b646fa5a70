//! Core types and scheduling math for the soundscape engine
//!
//! This crate holds the pure half of the engine: the layer data model, the
//! registry/transport state, and the master-cycle window math. Everything
//! here is deterministic given an RNG and has no side effects; the effectful
//! voice orchestration lives in `soundscape-audio`.
//!
//! # Examples
//!
//! ```
//! use soundscape_core::{firing_offsets, Layer, WindowParams};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let layer = Layer::new("rain", "https://cdn.example/rain.mp3")
//!     .with_volume(0.4)
//!     .with_duration_secs(5.0);
//!
//! let params = WindowParams::default();
//! let mut rng = StdRng::seed_from_u64(1);
//! let offsets = firing_offsets(layer.duration_ms(params.default_clip_ms), &params, &mut rng);
//! assert_eq!(offsets.len(), 6);
//! ```

pub mod layer;
pub mod state;
pub mod window;

pub use layer::{clamp_volume, Layer};
pub use state::{SoundscapeState, StateError};
pub use window::{firing_offsets, needs_envelope, repeat_count, WindowParams};

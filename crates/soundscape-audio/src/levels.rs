//! Volume/mute reconciler
//!
//! Pushes level changes to live voices the instant the registry changes,
//! without restarting the window or touching the firing plan. Scheduler
//! transitions fade; a dragged volume control must not.

use crate::pool::VoicePool;
use soundscape_core::SoundscapeState;

/// Apply every layer's effective volume, scaled by the master stage, to its
/// live voice. Master volume is applied per-voice: the net audible volume of
/// a layer is always `layer_effective * master_effective`.
pub fn apply(pool: &mut VoicePool, state: &SoundscapeState) {
    let master = state.master_effective_volume();
    for layer in state.layers() {
        pool.set_level(&layer.id, layer.effective_volume() * master);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFactory;
    use soundscape_core::Layer;
    use std::time::{Duration, Instant};

    #[test]
    fn test_levels_multiply_layer_and_master() {
        let factory = FakeFactory::new();
        let mut pool = VoicePool::new();
        let mut state = SoundscapeState::new();
        state
            .add_layer(Layer::new("a", "https://cdn.example/a.mp3").with_volume(0.4))
            .unwrap();
        pool.reconcile(
            state.layers(),
            &factory,
            state.master_effective_volume(),
            Duration::from_millis(500),
            Instant::now(),
        );

        state.set_master_volume(0.5);
        apply(&mut pool, &state);
        assert_eq!(factory.voice("a").unwrap().lock().volume, 0.2);

        state.toggle_layer_mute("a").unwrap();
        apply(&mut pool, &state);
        assert_eq!(factory.voice("a").unwrap().lock().volume, 0.0);

        state.toggle_layer_mute("a").unwrap();
        state.toggle_master_mute();
        apply(&mut pool, &state);
        assert_eq!(factory.voice("a").unwrap().lock().volume, 0.0);
    }
}

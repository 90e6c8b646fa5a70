//! Voice pool: exactly one live voice per registered layer id

use crate::voice::{AudioVoice, VoiceFactory};
use log::{debug, warn};
use soundscape_core::Layer;
use std::collections::HashMap;
use std::time::{Duration, Instant};

enum Slot {
    Ready(Box<dyn AudioVoice>),
    /// The source failed to load; the layer stays registered but silent.
    Failed,
}

/// A voice whose layer was removed while audible: it fades to zero and is
/// stopped and unloaded once the fade deadline passes.
struct FadingOut {
    voice: Box<dyn AudioVoice>,
    done_at: Instant,
}

/// Maps layer ids to live voices and owns their teardown.
#[derive(Default)]
pub struct VoicePool {
    slots: HashMap<String, Slot>,
    fading_out: Vec<FadingOut>,
}

impl VoicePool {
    pub fn new() -> Self {
        VoicePool {
            slots: HashMap::new(),
            fading_out: Vec::new(),
        }
    }

    /// Number of registered slots (including silent failed loads).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    /// True if the layer's source failed to load and the slot is silent.
    pub fn is_silent(&self, id: &str) -> bool {
        matches!(self.slots.get(id), Some(Slot::Failed))
    }

    /// Voices currently fading towards teardown.
    pub fn fading_count(&self) -> usize {
        self.fading_out.len()
    }

    /// Bring the pool in line with the registry: tear down voices whose id
    /// disappeared, create voices for ids seen for the first time.
    ///
    /// New voices are initialized at their effective volume with no fade;
    /// they become audible only when the scheduler fires them. Departing
    /// voices that are audible fade out over `fade` before being unloaded;
    /// idle ones unload immediately.
    pub fn reconcile(
        &mut self,
        layers: &[Layer],
        factory: &dyn VoiceFactory,
        master_volume: f32,
        fade: Duration,
        now: Instant,
    ) {
        let departed: Vec<String> = self
            .slots
            .keys()
            .filter(|id| !layers.iter().any(|l| &l.id == *id))
            .cloned()
            .collect();

        for id in departed {
            if let Some(Slot::Ready(mut voice)) = self.slots.remove(&id) {
                if voice.is_playing() {
                    voice.fade(voice.volume(), 0.0, fade);
                    self.fading_out.push(FadingOut {
                        voice,
                        done_at: now + fade,
                    });
                } else {
                    voice.unload();
                }
            }
        }

        for layer in layers {
            if self.slots.contains_key(&layer.id) {
                continue;
            }
            let slot = match factory.create(&layer.source_url, layer.loop_hint) {
                Ok(mut voice) => {
                    voice.set_volume(layer.effective_volume() * master_volume);
                    Slot::Ready(voice)
                }
                Err(err) => {
                    warn!("layer {} stays silent: {err}", layer.id);
                    Slot::Failed
                }
            };
            self.slots.insert(layer.id.clone(), slot);
        }
    }

    /// Stop and unload voices whose teardown fade has completed.
    pub fn reap(&mut self, now: Instant) {
        self.fading_out.retain_mut(|fading| {
            if fading.done_at <= now {
                fading.voice.stop();
                fading.voice.unload();
                false
            } else {
                true
            }
        });
    }

    /// Trigger a layer's voice at `target_volume`.
    ///
    /// A missing or failed slot is a no-op: a timer firing after its layer
    /// was torn down must never panic. Seamless sources that are already
    /// sounding are left alone; enveloped firings restart from silence and
    /// ramp up so clipped edges never click.
    pub fn trigger(
        &mut self,
        layer_id: &str,
        target_volume: f32,
        envelope: bool,
        fade: Duration,
    ) -> bool {
        match self.slots.get_mut(layer_id) {
            Some(Slot::Ready(voice)) => {
                if envelope {
                    voice.set_volume(0.0);
                    voice.play();
                    voice.fade(0.0, target_volume, fade);
                } else {
                    if voice.is_playing() {
                        return false;
                    }
                    voice.set_volume(target_volume);
                    voice.play();
                }
                true
            }
            Some(Slot::Failed) => false,
            None => {
                debug!("stale trigger for departed layer {layer_id}");
                false
            }
        }
    }

    /// Begin the end-of-clip fade so an enveloped firing ends exactly at the
    /// clip's natural end instead of clipping.
    pub fn release(&mut self, layer_id: &str, fade: Duration) {
        if let Some(Slot::Ready(voice)) = self.slots.get_mut(layer_id) {
            if voice.is_playing() {
                voice.fade(voice.volume(), 0.0, fade);
            }
        }
    }

    /// Instantly set a voice's volume. Used by the volume/mute reconciler,
    /// which must never lag behind a dragged control.
    pub fn set_level(&mut self, layer_id: &str, level: f32) {
        if let Some(Slot::Ready(voice)) = self.slots.get_mut(layer_id) {
            if voice.volume() != level {
                voice.set_volume(level);
            }
        }
    }

    /// Pause every audible voice, preserving buffers for instant resume.
    pub fn pause_all(&mut self) {
        for slot in self.slots.values_mut() {
            if let Slot::Ready(voice) = slot {
                if voice.is_playing() {
                    voice.pause();
                }
            }
        }
    }
}

//! Shared test doubles for the AudioVoice capability

use crate::voice::{AudioVoice, VoiceFactory};
use crate::{AudioError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Observable state of a [`FakeVoice`], shared with the test body.
#[derive(Debug, Default)]
pub(crate) struct FakeVoiceState {
    pub volume: f32,
    pub playing: bool,
    pub unloaded: bool,
    pub looped: bool,
    pub plays: u32,
    pub pauses: u32,
    pub stops: u32,
    /// Recorded `(from, to, duration)` fade calls.
    pub fades: Vec<(f32, f32, Duration)>,
}

/// An [`AudioVoice`] that records every call instead of producing sound.
/// Fades complete instantly: the volume jumps to the target.
pub(crate) struct FakeVoice {
    state: Arc<Mutex<FakeVoiceState>>,
}

impl FakeVoice {
    pub fn new() -> Self {
        FakeVoice {
            state: Arc::new(Mutex::new(FakeVoiceState::default())),
        }
    }

    pub fn state(&self) -> Arc<Mutex<FakeVoiceState>> {
        Arc::clone(&self.state)
    }
}

impl AudioVoice for FakeVoice {
    fn play(&mut self) {
        let mut state = self.state.lock();
        state.playing = true;
        state.plays += 1;
    }

    fn pause(&mut self) {
        let mut state = self.state.lock();
        state.playing = false;
        state.pauses += 1;
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        state.playing = false;
        state.stops += 1;
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().volume = volume;
    }

    fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    fn fade(&mut self, from: f32, to: f32, duration: Duration) {
        let mut state = self.state.lock();
        state.volume = to;
        state.fades.push((from, to, duration));
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    fn unload(&mut self) {
        let mut state = self.state.lock();
        state.playing = false;
        state.unloaded = true;
    }
}

/// A [`VoiceFactory`] handing out [`FakeVoice`]s and keeping handles to
/// their state for later assertions. Source URLs starting with `fail:`
/// simulate a load failure. Clones share the created-voice log.
#[derive(Clone, Default)]
pub(crate) struct FakeFactory {
    created: Arc<Mutex<Vec<(String, Arc<Mutex<FakeVoiceState>>)>>>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }

    /// Look up a created voice by the `…/{id}.mp3` URL convention the tests
    /// use.
    pub fn voice(&self, id: &str) -> Option<Arc<Mutex<FakeVoiceState>>> {
        let suffix = format!("/{id}.mp3");
        self.created
            .lock()
            .iter()
            .find(|(url, _)| url.ends_with(&suffix) || url == id)
            .map(|(_, state)| Arc::clone(state))
    }
}

impl VoiceFactory for FakeFactory {
    fn create(&self, source_url: &str, looped: bool) -> Result<Box<dyn AudioVoice>> {
        if source_url.starts_with("fail:") {
            return Err(AudioError::Load {
                url: source_url.to_string(),
                reason: "unreachable test source".to_string(),
            });
        }

        let voice = FakeVoice::new();
        voice.state.lock().looped = looped;
        self.created
            .lock()
            .push((source_url.to_string(), voice.state()));
        Ok(Box::new(voice))
    }
}

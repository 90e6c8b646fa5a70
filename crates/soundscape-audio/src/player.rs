//! Playback lifecycle: the soundscape context and the threaded driver

use crate::levels;
use crate::pool::VoicePool;
use crate::scheduler::{Action, Scheduler};
use crate::voice::VoiceFactory;
use crate::Result;
use parking_lot::Mutex;
use soundscape_core::{Layer, SoundscapeState, WindowParams};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for the soundscape player.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Master-cycle window parameters (length, jitter, fades).
    pub window: WindowParams,
    /// How often the driver thread advances the scheduler.
    pub poll_interval: Duration,
    /// Fixed jitter seed for reproducible mixes; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            window: WindowParams::default(),
            poll_interval: Duration::from_millis(100),
            seed: None,
        }
    }
}

/// The complete soundscape context: registry, voice pool, scheduler and the
/// voice factory, owned by the application's composition point.
///
/// Every mutation runs to completion while holding `&mut self`, so each
/// reconciliation pass observes one coherent snapshot of the registry —
/// there is nothing a concurrent writer could tear.
pub struct Soundscape {
    state: SoundscapeState,
    pool: VoicePool,
    scheduler: Scheduler,
    factory: Box<dyn VoiceFactory>,
    config: PlayerConfig,
}

impl Soundscape {
    pub fn new(factory: Box<dyn VoiceFactory>, config: PlayerConfig) -> Self {
        let scheduler = match config.seed {
            Some(seed) => Scheduler::with_seed(config.window, seed),
            None => Scheduler::new(config.window),
        };
        Soundscape {
            state: SoundscapeState::new(),
            pool: VoicePool::new(),
            scheduler,
            factory,
            config,
        }
    }

    pub fn state(&self) -> &SoundscapeState {
        &self.state
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Number of voices currently held by the pool.
    pub fn voice_count(&self) -> usize {
        self.pool.len()
    }

    fn fade(&self) -> Duration {
        Duration::from_millis(self.config.window.fade_ms)
    }

    fn reconcile_pool(&mut self, now: Instant) {
        self.pool.reconcile(
            self.state.layers(),
            self.factory.as_ref(),
            self.state.master_effective_volume(),
            self.fade(),
            now,
        );
    }

    /// Register a layer and create its voice. While playing, the id-set
    /// change restarts the master window at the moment of the change.
    pub fn add_layer(&mut self, layer: Layer) -> Result<()> {
        self.state.add_layer(layer)?;
        let now = Instant::now();
        self.reconcile_pool(now);
        if self.state.is_playing() {
            self.scheduler.restart(self.state.layers(), now);
        }
        Ok(())
    }

    /// Remove a layer: its voice fades out, its pending firings are
    /// cancelled in this same call, and the window restarts for the
    /// remaining layers. Removing the last layer while playing leaves the
    /// scheduler stopped, exactly as toggling play off would.
    pub fn remove_layer(&mut self, id: &str) -> Result<()> {
        self.state.remove_layer(id)?;
        let now = Instant::now();
        self.reconcile_pool(now);
        if self.state.is_playing() {
            self.scheduler.restart(self.state.layers(), now);
        }
        Ok(())
    }

    /// Volume-only change: applied to the voice instantly, firing plan
    /// untouched.
    pub fn set_layer_volume(&mut self, id: &str, volume: f32) -> Result<()> {
        self.state.set_layer_volume(id, volume)?;
        levels::apply(&mut self.pool, &self.state);
        Ok(())
    }

    pub fn toggle_layer_mute(&mut self, id: &str) -> Result<bool> {
        let muted = self.state.toggle_layer_mute(id)?;
        levels::apply(&mut self.pool, &self.state);
        Ok(muted)
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.state.set_master_volume(volume);
        levels::apply(&mut self.pool, &self.state);
    }

    pub fn toggle_master_mute(&mut self) -> bool {
        let muted = self.state.toggle_master_mute();
        levels::apply(&mut self.pool, &self.state);
        muted
    }

    /// Flip global play/pause. Pausing stops the scheduler and pauses every
    /// voice in place; buffers stay loaded for instant resume.
    pub fn toggle_playback(&mut self) -> bool {
        let playing = self.state.toggle_playback();
        if playing {
            self.scheduler.restart(self.state.layers(), Instant::now());
        } else {
            self.scheduler.stop();
            self.pool.pause_all();
        }
        playing
    }

    /// Clear all layers and stop: every voice is torn down and no pending
    /// action survives.
    pub fn reset(&mut self) {
        self.state.reset();
        self.scheduler.stop();
        self.reconcile_pool(Instant::now());
    }

    /// Advance the engine to `now`: reap finished teardowns, roll the
    /// window when due, and apply every due firing/release to the pool.
    pub fn tick_at(&mut self, now: Instant) {
        self.pool.reap(now);

        let actions = self.scheduler.tick(self.state.layers(), now);
        if actions.is_empty() {
            return;
        }

        let master = self.state.master_effective_volume();
        let fade = self.fade();
        for action in actions {
            match action {
                Action::Fire { layer_id, envelope } => {
                    if let Some(layer) = self.state.layer(&layer_id) {
                        let target = layer.effective_volume() * master;
                        self.pool.trigger(&layer_id, target, envelope, fade);
                    }
                }
                Action::Release { layer_id } => {
                    self.pool.release(&layer_id, fade);
                }
            }
        }
    }

    /// Advance the engine to the present moment.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }
}

/// Threaded driver around [`Soundscape`]: owns the context behind a mutex
/// and ticks it on a fixed poll interval.
pub struct Player {
    soundscape: Arc<Mutex<Soundscape>>,
    running: Arc<AtomicBool>,
    driver: Option<JoinHandle<()>>,
}

impl Player {
    pub fn new(factory: Box<dyn VoiceFactory>, config: PlayerConfig) -> Self {
        let poll_interval = config.poll_interval;
        let soundscape = Arc::new(Mutex::new(Soundscape::new(factory, config)));
        let running = Arc::new(AtomicBool::new(true));

        let driver = {
            let soundscape = Arc::clone(&soundscape);
            let running = Arc::clone(&running);
            thread::spawn(move || {
                while running.load(Ordering::Relaxed) {
                    soundscape.lock().tick();
                    thread::sleep(poll_interval);
                }
            })
        };

        Player {
            soundscape,
            running,
            driver: Some(driver),
        }
    }

    /// Create a player with default configuration.
    pub fn with_defaults(factory: Box<dyn VoiceFactory>) -> Self {
        Self::new(factory, PlayerConfig::default())
    }

    pub fn add_layer(&self, layer: Layer) -> Result<()> {
        self.soundscape.lock().add_layer(layer)
    }

    pub fn remove_layer(&self, id: &str) -> Result<()> {
        self.soundscape.lock().remove_layer(id)
    }

    pub fn set_layer_volume(&self, id: &str, volume: f32) -> Result<()> {
        self.soundscape.lock().set_layer_volume(id, volume)
    }

    pub fn toggle_layer_mute(&self, id: &str) -> Result<bool> {
        self.soundscape.lock().toggle_layer_mute(id)
    }

    pub fn set_master_volume(&self, volume: f32) {
        self.soundscape.lock().set_master_volume(volume)
    }

    pub fn toggle_master_mute(&self) -> bool {
        self.soundscape.lock().toggle_master_mute()
    }

    pub fn toggle_playback(&self) -> bool {
        self.soundscape.lock().toggle_playback()
    }

    pub fn reset(&self) {
        self.soundscape.lock().reset()
    }

    pub fn is_playing(&self) -> bool {
        self.soundscape.lock().is_playing()
    }

    /// Snapshot of the current registry and transport state.
    pub fn state(&self) -> SoundscapeState {
        self.soundscape.lock().state().clone()
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(driver) = self.driver.take() {
            let _ = driver.join();
        }
    }
}

//! Master cycle scheduler: per-window firing plans driven by a tick loop
//!
//! The pure offset math lives in `soundscape_core::window`; this module owns
//! the effectful half as an explicit task list. Pending actions are tracked
//! in plain vectors, so cancellation is clearing them — there are no OS
//! timers to leak and nothing a stale callback could reference.

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use soundscape_core::{firing_offsets, needs_envelope, Layer, WindowParams};
use std::time::{Duration, Instant};

/// A due scheduling decision, applied to the voice pool by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start (or re-trigger) a layer's voice.
    Fire { layer_id: String, envelope: bool },
    /// Begin the end-of-clip fade so an enveloped firing ends without a
    /// click.
    Release { layer_id: String },
}

struct PendingFire {
    layer_id: String,
    offset_ms: u64,
    envelope: bool,
    clip_ms: u64,
    generation: u64,
}

struct PendingRelease {
    layer_id: String,
    due_at: Instant,
}

/// Schedules per-layer firings inside a repeating fixed-length window,
/// re-drawing jitter every window so the mix never settles into a loop.
///
/// Stopped whenever playback is off or no layers exist; scheduling
/// otherwise. Any layer-set or play-state change restarts the window from
/// the moment of the change.
pub struct Scheduler {
    params: WindowParams,
    rng: StdRng,
    /// `None` while stopped.
    window_start: Option<Instant>,
    /// Bumped on every restart and rollover; pending fires from superseded
    /// windows are inert even if a cleanup was missed.
    generation: u64,
    fires: Vec<PendingFire>,
    releases: Vec<PendingRelease>,
}

impl Scheduler {
    pub fn new(params: WindowParams) -> Self {
        Self::with_rng(params, StdRng::from_entropy())
    }

    /// Deterministic scheduler for tests and reproducible mixes.
    pub fn with_seed(params: WindowParams, seed: u64) -> Self {
        Self::with_rng(params, StdRng::seed_from_u64(seed))
    }

    fn with_rng(params: WindowParams, rng: StdRng) -> Self {
        Scheduler {
            params,
            rng,
            window_start: None,
            generation: 0,
            fires: Vec::new(),
            releases: Vec::new(),
        }
    }

    pub fn params(&self) -> &WindowParams {
        &self.params
    }

    pub fn is_scheduling(&self) -> bool {
        self.window_start.is_some()
    }

    /// The current window generation; unchanged by volume-only edits.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending_fires(&self) -> usize {
        self.fires.len()
    }

    pub fn pending_releases(&self) -> usize {
        self.releases.len()
    }

    /// All tracked actions; zero after a stop or reset.
    pub fn pending_actions(&self) -> usize {
        self.fires.len() + self.releases.len()
    }

    /// Cancel everything tracked and, if layers remain, begin a fresh window
    /// at `now`. Called on every layer-set or play-state change.
    pub fn restart(&mut self, layers: &[Layer], now: Instant) {
        self.fires.clear();
        self.releases.clear();
        self.generation += 1;

        if layers.is_empty() {
            self.window_start = None;
            debug!("scheduler stopped: layer set is empty");
        } else {
            self.window_start = Some(now);
            self.plan_window(layers);
        }
    }

    /// Cancel everything tracked and stop scheduling.
    pub fn stop(&mut self) {
        self.fires.clear();
        self.releases.clear();
        self.window_start = None;
    }

    fn plan_window(&mut self, layers: &[Layer]) {
        for layer in layers {
            let clip_ms = layer.duration_ms(self.params.default_clip_ms);
            let envelope = needs_envelope(clip_ms, layer.loop_hint, &self.params);
            for offset_ms in firing_offsets(clip_ms, &self.params, &mut self.rng) {
                self.fires.push(PendingFire {
                    layer_id: layer.id.clone(),
                    offset_ms,
                    envelope,
                    clip_ms,
                    generation: self.generation,
                });
            }
        }
        debug!(
            "planned window generation {} with {} firings across {} layers",
            self.generation,
            self.fires.len(),
            layers.len()
        );
    }

    /// Advance the scheduler to `now`, returning every action that became
    /// due. Rolls the window over (with a single fresh plan, regardless of
    /// how late the tick arrives) and keeps end-of-clip releases alive
    /// across rollovers until a newer firing of the same layer supersedes
    /// them.
    pub fn tick(&mut self, layers: &[Layer], now: Instant) -> Vec<Action> {
        let Some(mut start) = self.window_start else {
            return Vec::new();
        };

        let window = Duration::from_millis(self.params.window_ms);
        if now >= start + window {
            // Rollover. Unconditionally discard unfired entries before
            // re-arming; a starved tick catches up in one recompute instead
            // of bursting through every missed window.
            let windows_passed = (now.duration_since(start).as_millis()
                / window.as_millis().max(1)) as u32;
            start += window * windows_passed;
            self.window_start = Some(start);
            self.generation += 1;
            self.fires.clear();
            self.plan_window(layers);
        }

        let elapsed_ms = now.duration_since(start).as_millis() as u64;
        let generation = self.generation;
        let mut actions = Vec::new();

        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.fires)
            .into_iter()
            .partition(|fire| fire.offset_ms <= elapsed_ms);
        self.fires = pending;

        for fire in due {
            if fire.generation != generation {
                continue;
            }
            if !layers.iter().any(|l| l.id == fire.layer_id) {
                continue;
            }
            // a fresh firing supersedes any pending end-of-clip fade
            self.releases.retain(|r| r.layer_id != fire.layer_id);
            if fire.envelope && fire.clip_ms > self.params.fade_ms {
                self.releases.push(PendingRelease {
                    layer_id: fire.layer_id.clone(),
                    due_at: now + Duration::from_millis(fire.clip_ms - self.params.fade_ms),
                });
            }
            actions.push(Action::Fire {
                layer_id: fire.layer_id,
                envelope: fire.envelope,
            });
        }

        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.releases)
            .into_iter()
            .partition(|release| release.due_at <= now);
        self.releases = pending;

        for release in due {
            actions.push(Action::Release {
                layer_id: release.layer_id,
            });
        }

        actions
    }
}

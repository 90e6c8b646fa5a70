//! Example: drive a small ambient mix against a logging voice backend

use anyhow::Result;
use soundscape_audio::{AudioVoice, Layer, Player, PlayerConfig, VoiceFactory};
use std::thread;
use std::time::Duration;

/// A stand-in voice that logs what a real audio backend would do.
struct LoggingVoice {
    url: String,
    volume: f32,
    playing: bool,
}

impl AudioVoice for LoggingVoice {
    fn play(&mut self) {
        self.playing = true;
        log::info!("play {} at {:.2}", self.url, self.volume);
    }

    fn pause(&mut self) {
        self.playing = false;
        log::info!("pause {}", self.url);
    }

    fn stop(&mut self) {
        self.playing = false;
        log::info!("stop {}", self.url);
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn fade(&mut self, from: f32, to: f32, duration: Duration) {
        self.volume = to;
        log::info!("fade {} {from:.2} -> {to:.2} over {duration:?}", self.url);
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn unload(&mut self) {
        self.playing = false;
        log::info!("unload {}", self.url);
    }
}

struct LoggingFactory;

impl VoiceFactory for LoggingFactory {
    fn create(&self, source_url: &str, looped: bool) -> soundscape_audio::Result<Box<dyn AudioVoice>> {
        log::info!("preload {source_url} (looped: {looped})");
        Ok(Box::new(LoggingVoice {
            url: source_url.to_string(),
            volume: 0.0,
            playing: false,
        }))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    println!("Soundscape scheduling example");
    println!("=============================\n");

    let player = Player::new(Box::new(LoggingFactory), PlayerConfig::default());

    player.add_layer(
        Layer::new("rain", "https://cdn.example/sounds/rain.mp3")
            .with_name("Steady rain")
            .with_volume(0.5)
            .with_duration_secs(42.0)
            .with_loop_hint(true),
    )?;
    player.add_layer(
        Layer::new("birds", "https://cdn.example/sounds/birds.mp3")
            .with_name("Morning birds")
            .with_volume(0.3)
            .with_duration_secs(4.0),
    )?;
    player.add_layer(
        Layer::new("thunder", "https://cdn.example/sounds/thunder.mp3")
            .with_name("Distant thunder")
            .with_volume(0.6)
            .with_duration_secs(12.0),
    )?;

    println!("Playing three layers for 10 seconds (RUST_LOG=info to see voice calls)...");
    player.toggle_playback();
    thread::sleep(Duration::from_secs(5));

    println!("Turning the birds down...");
    player.set_layer_volume("birds", 0.1)?;
    thread::sleep(Duration::from_secs(5));

    println!("Done, tearing down.");
    player.reset();
    Ok(())
}

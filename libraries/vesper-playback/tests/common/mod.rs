//! Shared test helpers
//!
//! A scripted stand-in for the platform backend plus track builders.
//! Tests drive the controller (or the thread-backed player) and feed
//! backend reports in by hand, so every asynchronous ordering the engine
//! must survive can be produced deterministically.

#![allow(dead_code)]

use crossbeam_channel::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vesper_core::{Track, TrackSource};
use vesper_playback::{
    AudioBackend, BackendEvent, BackendState, LoadId, LoadRequest, PlaybackController,
    PlayerConfig,
};

/// Everything the engine asked the backend to do
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(LoadId, LoadRequest),
    Play,
    Pause,
    Stop,
    Seek(Duration),
    SetRate(f32),
    SetVolume(f32),
}

/// Call-recording backend
///
/// Emits nothing on its own when built for a bare controller; when built
/// with an event sender (service tests) it can auto-acknowledge loads
/// with a `Ready` report.
pub struct ScriptedBackend {
    calls: Arc<Mutex<Vec<Call>>>,
    events: Option<Sender<BackendEvent>>,
    auto_ready: bool,
    rate: f32,
    volume: f32,
}

impl ScriptedBackend {
    /// Backend for direct controller tests; reports are injected by hand
    pub fn manual() -> (Self, Arc<Mutex<Vec<Call>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                calls: calls.clone(),
                events: None,
                auto_ready: false,
                rate: 1.0,
                volume: 1.0,
            },
            calls,
        )
    }

    /// Backend for service tests: every load is acknowledged with
    /// `Ready`, and with `Playing` when the load asked to play
    pub fn auto_ready(events: Sender<BackendEvent>, calls: Arc<Mutex<Vec<Call>>>) -> Self {
        Self {
            calls,
            events: Some(events),
            auto_ready: true,
            rate: 1.0,
            volume: 1.0,
        }
    }
}

impl AudioBackend for ScriptedBackend {
    fn load(&mut self, load: LoadId, request: LoadRequest) {
        let play_when_ready = request.play_when_ready;
        self.calls.lock().unwrap().push(Call::Load(load, request));
        if self.auto_ready {
            if let Some(events) = &self.events {
                let _ = events.send(BackendEvent::StateChanged {
                    load,
                    state: BackendState::Ready,
                });
                if play_when_ready {
                    let _ = events.send(BackendEvent::StateChanged {
                        load,
                        state: BackendState::Playing,
                    });
                }
            }
        }
    }

    fn play(&mut self) {
        self.calls.lock().unwrap().push(Call::Play);
    }

    fn pause(&mut self) {
        self.calls.lock().unwrap().push(Call::Pause);
    }

    fn stop(&mut self) {
        self.calls.lock().unwrap().push(Call::Stop);
    }

    fn seek(&mut self, position: Duration) {
        self.calls.lock().unwrap().push(Call::Seek(position));
    }

    fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
        self.calls.lock().unwrap().push(Call::SetRate(rate));
    }

    fn rate(&self) -> f32 {
        self.rate
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.calls.lock().unwrap().push(Call::SetVolume(volume));
    }

    fn volume(&self) -> f32 {
        self.volume
    }
}

/// A named test track with a three-minute duration hint
pub fn track(name: &str) -> Track {
    let mut track = Track::new(TrackSource::file(format!("/music/{name}.mp3")));
    track.title = Some(name.to_string());
    track.artist = Some("Test Artist".to_string());
    track.duration = Some(Duration::from_secs(180));
    track
}

/// Controller over a manual scripted backend
pub fn controller() -> (PlaybackController, Arc<Mutex<Vec<Call>>>) {
    let (backend, calls) = ScriptedBackend::manual();
    (
        PlaybackController::new(Box::new(backend), PlayerConfig::default()),
        calls,
    )
}

/// The loads the backend has been asked to perform, in order
pub fn loads(calls: &Arc<Mutex<Vec<Call>>>) -> Vec<(LoadId, LoadRequest)> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter_map(|call| match call {
            Call::Load(load, request) => Some((*load, request.clone())),
            _ => None,
        })
        .collect()
}

/// Best-effort tracing init for debugging test runs
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

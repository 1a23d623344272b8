//! Player service
//!
//! [`Player`] is the owning handle around a [`PlaybackController`]: it
//! serializes every mutation through one lock, pumps backend events and
//! the progress tick on a background thread, and fans notifications out
//! through a bounded channel.
//!
//! Commands run on the caller's thread under the lock, so structural
//! errors come back synchronously; backend reports are applied by the
//! pump thread under the same lock. Either way each interaction drains
//! the controller's notification buffer into the event channel.

use crossbeam_channel::{bounded, select, tick, Receiver, Sender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::warn;
use vesper_core::{Track, TrackMetadata};

use crate::backend::{AudioBackend, BackendEvent};
use crate::controller::PlaybackController;
use crate::error::Result;
use crate::events::PlayerEvent;
use crate::queue::{ItemId, QueueItem};
use crate::remote::{NowPlayingInfo, RemoteCommand};
use crate::types::{PlaybackState, PlayerConfig, RepeatMode};

/// Backend report channel depth
const BACKEND_CHANNEL_CAPACITY: usize = 64;

/// Notification channel depth; beyond this the oldest is dropped
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Owning handle around the playback engine
///
/// Construct one per player instance and pass it (or clones of its event
/// receiver) to the layers that need it; there is no global shared
/// instance. Dropping the player shuts the pump thread down and releases
/// the backend source exactly once.
pub struct Player {
    controller: Arc<Mutex<PlaybackController>>,
    events_tx: Sender<PlayerEvent>,
    events_rx: Receiver<PlayerEvent>,
    shutdown_tx: Sender<()>,
    pump: Option<JoinHandle<()>>,
}

impl Player {
    /// Create a player
    ///
    /// `make_backend` receives the sender the backend must push its
    /// [`BackendEvent`]s into.
    pub fn new<B, F>(config: PlayerConfig, make_backend: F) -> Self
    where
        B: AudioBackend + 'static,
        F: FnOnce(Sender<BackendEvent>) -> B,
    {
        let (backend_tx, backend_rx) = bounded(BACKEND_CHANNEL_CAPACITY);
        let backend = make_backend(backend_tx);

        let progress_interval = config.progress_interval;
        let controller = Arc::new(Mutex::new(PlaybackController::new(
            Box::new(backend),
            config,
        )));

        let (events_tx, events_rx) = bounded(EVENT_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = bounded(1);

        let pump = std::thread::spawn({
            let controller = controller.clone();
            let events_tx = events_tx.clone();
            let events_rx = events_rx.clone();
            move || {
                pump_loop(
                    &controller,
                    &backend_rx,
                    &shutdown_rx,
                    &events_tx,
                    &events_rx,
                    progress_interval,
                );
            }
        });

        Self {
            controller,
            events_tx,
            events_rx,
            shutdown_tx,
            pump: Some(pump),
        }
    }

    /// Notification stream
    ///
    /// One logical consumer: cloned receivers share the queue rather
    /// than each seeing every event.
    pub fn events(&self) -> Receiver<PlayerEvent> {
        self.events_rx.clone()
    }

    // ===== Queue Commands =====

    /// Insert tracks, returning their assigned ids
    pub fn add(&self, tracks: Vec<Track>, before: Option<ItemId>) -> Vec<ItemId> {
        self.with_controller(|controller| controller.add(tracks, before))
    }

    /// Remove entries by id
    pub fn remove(&self, ids: &[ItemId]) {
        self.with_controller(|controller| controller.remove(ids));
    }

    /// Drop every entry after the current one
    pub fn remove_upcoming(&self) {
        self.with_controller(PlaybackController::remove_upcoming);
    }

    /// Drop every entry before the current one
    pub fn remove_previous(&self) {
        self.with_controller(PlaybackController::remove_previous);
    }

    /// Relocate an entry
    pub fn move_item(&self, from: usize, to: usize) -> Result<()> {
        self.with_controller(|controller| controller.move_item(from, to))
    }

    // ===== Transport =====

    /// Start or resume playback
    pub fn play(&self) -> Result<()> {
        self.with_controller(PlaybackController::play)
    }

    /// Pause playback
    pub fn pause(&self) {
        self.with_controller(PlaybackController::pause);
    }

    /// Stop playback, keeping the queue
    pub fn stop(&self) {
        self.with_controller(PlaybackController::stop);
    }

    /// Stop and clear everything
    pub fn reset(&self) {
        self.with_controller(PlaybackController::reset);
    }

    /// Skip to the next entry
    pub fn next(&self) -> Result<()> {
        self.with_controller(PlaybackController::next)
    }

    /// Skip to the previous entry
    pub fn previous(&self) -> Result<()> {
        self.with_controller(PlaybackController::previous)
    }

    /// Skip straight to an index
    pub fn skip_to_index(&self, index: usize) -> Result<()> {
        self.with_controller(|controller| controller.skip_to_index(index))
    }

    /// Skip straight to an entry by id
    pub fn skip_to_item(&self, id: ItemId) -> Result<()> {
        self.with_controller(|controller| controller.skip_to_item(id))
    }

    /// Seek to an absolute position
    pub fn seek_to(&self, position: Duration) -> Result<()> {
        self.with_controller(|controller| controller.seek_to(position))
    }

    /// Seek forward by a delta
    pub fn seek_forward(&self, delta: Duration) -> Result<()> {
        self.with_controller(|controller| controller.seek_forward(delta))
    }

    /// Seek backward by a delta
    pub fn seek_backward(&self, delta: Duration) -> Result<()> {
        self.with_controller(|controller| controller.seek_backward(delta))
    }

    /// Set the playback rate
    pub fn set_rate(&self, rate: f32) {
        self.with_controller(|controller| controller.set_rate(rate));
    }

    /// Set the volume, `0.0..=1.0`
    pub fn set_volume(&self, volume: f32) {
        self.with_controller(|controller| controller.set_volume(volume));
    }

    /// Set the repeat mode
    pub fn set_repeat_mode(&self, mode: RepeatMode) {
        self.with_controller(|controller| controller.set_repeat_mode(mode));
    }

    /// Merge a partial metadata update into an entry
    pub fn update_metadata(&self, id: ItemId, patch: &TrackMetadata) -> Result<()> {
        self.with_controller(|controller| controller.update_metadata(id, patch))
    }

    /// Apply a remote transport command
    pub fn handle_remote(&self, command: RemoteCommand) -> Result<()> {
        self.with_controller(|controller| controller.handle_remote(command))
    }

    // ===== Queries =====

    /// All queue entries in playback order
    pub fn queue(&self) -> Vec<QueueItem> {
        self.controller.lock().unwrap().queue_items().to_vec()
    }

    /// The current index, if any entry is current
    pub fn current_index(&self) -> Option<usize> {
        self.controller.lock().unwrap().current_index()
    }

    /// The current track
    pub fn current_track(&self) -> Option<Track> {
        self.controller.lock().unwrap().current_track().cloned()
    }

    /// Projected playback state
    pub fn state(&self) -> PlaybackState {
        self.controller.lock().unwrap().state()
    }

    /// Total duration of the loaded source, once known
    pub fn duration(&self) -> Option<Duration> {
        self.controller.lock().unwrap().duration()
    }

    /// Last known playhead position
    pub fn position(&self) -> Duration {
        self.controller.lock().unwrap().position()
    }

    /// Last known buffered-up-to position
    pub fn buffered_position(&self) -> Duration {
        self.controller.lock().unwrap().buffered_position()
    }

    /// Current playback rate
    pub fn rate(&self) -> f32 {
        self.controller.lock().unwrap().rate()
    }

    /// Current user-facing volume
    pub fn volume(&self) -> f32 {
        self.controller.lock().unwrap().volume()
    }

    /// Current repeat mode
    pub fn repeat_mode(&self) -> RepeatMode {
        self.controller.lock().unwrap().repeat_mode()
    }

    /// Whether playback starts as soon as a source is ready
    pub fn play_when_ready(&self) -> bool {
        self.controller.lock().unwrap().play_when_ready()
    }

    /// Project the current entry for the OS now-playing surface
    pub fn now_playing(&self) -> Option<NowPlayingInfo> {
        self.controller.lock().unwrap().now_playing_info()
    }

    // ===== Internals =====

    fn with_controller<T>(&self, f: impl FnOnce(&mut PlaybackController) -> T) -> T {
        let mut controller = self.controller.lock().unwrap();
        let out = f(&mut controller);
        let events = controller.drain_events();
        drop(controller);
        forward_events(&self.events_tx, &self.events_rx, events);
        out
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.try_send(());
        if let Some(pump) = self.pump.take() {
            let _ = pump.join();
        }
        // Release the backend source exactly once, even if the caller
        // never issued stop()
        if let Ok(mut controller) = self.controller.lock() {
            controller.stop();
        }
    }
}

/// Background loop: backend reports and the progress tick, serialized
/// through the controller lock.
fn pump_loop(
    controller: &Arc<Mutex<PlaybackController>>,
    backend_rx: &Receiver<BackendEvent>,
    shutdown_rx: &Receiver<()>,
    events_tx: &Sender<PlayerEvent>,
    events_rx: &Receiver<PlayerEvent>,
    progress_interval: Duration,
) {
    let progress = tick(progress_interval);

    loop {
        select! {
            recv(shutdown_rx) -> _ => break,
            recv(backend_rx) -> event => {
                let Ok(event) = event else { break };
                let mut controller = controller.lock().unwrap();
                controller.handle_backend_event(event);
                let events = controller.drain_events();
                drop(controller);
                forward_events(events_tx, events_rx, events);
            }
            recv(progress) -> _ => {
                let mut controller = controller.lock().unwrap();
                controller.emit_progress();
                let events = controller.drain_events();
                drop(controller);
                forward_events(events_tx, events_rx, events);
            }
        }
    }
}

/// Push notifications into the bounded channel, dropping the oldest when
/// the consumer falls behind.
fn forward_events(
    events_tx: &Sender<PlayerEvent>,
    events_rx: &Receiver<PlayerEvent>,
    events: Vec<PlayerEvent>,
) {
    for event in events {
        if let Err(TrySendError::Full(event)) = events_tx.try_send(event) {
            warn!("notification channel full, dropping oldest event");
            let _ = events_rx.try_recv();
            let _ = events_tx.try_send(event);
        }
    }
}

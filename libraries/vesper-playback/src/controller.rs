//! Playback controller - core orchestration
//!
//! Composes the queue with a single-item platform player. Queue-level
//! commands (play/pause/skip/seek) become backend calls here, backend
//! reports become projected-state transitions and notifications, and the
//! end of one entry becomes the load of the next.
//!
//! The controller is synchronous and single-owner: it expects every
//! command and every backend event to reach it through one serialized
//! context (see [`Player`](crate::Player)). Notifications accumulate in
//! an internal buffer and are collected with
//! [`drain_events`](PlaybackController::drain_events) after each
//! interaction.

use std::time::Duration;
use tracing::{debug, warn};
use vesper_core::{Track, TrackMetadata};

use crate::backend::{AudioBackend, BackendEvent, BackendState, Failure, LoadId, LoadRequest};
use crate::error::{PlaybackError, Result};
use crate::events::PlayerEvent;
use crate::queue::{ItemId, Queue, QueueItem};
use crate::types::{PlaybackState, PlayerConfig, RepeatMode};

/// What was current before a mutation, for change notifications
struct ActiveSnapshot {
    index: Option<usize>,
    track: Option<Track>,
    position: Duration,
}

/// Queue-driven playback controller
///
/// Owns the queue, the projected [`PlaybackState`], and the repeat
/// policy; holds the platform backend and drives it one loaded source at
/// a time.
pub struct PlaybackController {
    // Structure
    queue: Queue,
    backend: Box<dyn AudioBackend>,
    config: PlayerConfig,

    // Projection
    state: PlaybackState,
    repeat: RepeatMode,
    play_when_ready: bool,
    position: Duration,
    duration: Option<Duration>,
    buffered: Duration,
    last_failure: Option<Failure>,

    // Load bookkeeping
    current_load: Option<LoadId>,
    next_load: u64,
    pending_seek: Option<Duration>,

    // Scalar controls
    volume: f32,
    rate: f32,

    // Duck bookkeeping (remote interruptions)
    duck_restore_volume: Option<f32>,
    duck_paused: bool,

    // Notifications since the last drain
    pending_events: Vec<PlayerEvent>,
}

impl PlaybackController {
    /// Create a controller around a backend
    pub fn new(backend: Box<dyn AudioBackend>, config: PlayerConfig) -> Self {
        let mut backend = backend;
        let volume = config.volume.clamp(0.0, 1.0);
        let rate = config.rate.max(0.0);
        backend.set_volume(volume);
        backend.set_rate(rate);

        Self {
            queue: Queue::new(),
            backend,
            state: PlaybackState::Idle,
            repeat: config.repeat,
            play_when_ready: false,
            position: Duration::ZERO,
            duration: None,
            buffered: Duration::ZERO,
            last_failure: None,
            current_load: None,
            next_load: 0,
            pending_seek: None,
            volume,
            rate,
            duck_restore_volume: None,
            duck_paused: false,
            pending_events: Vec::new(),
            config,
        }
    }

    // ===== Queue Commands =====

    /// Insert tracks, returning their assigned ids
    ///
    /// Purely structural; nothing starts playing.
    pub fn add(&mut self, tracks: Vec<Track>, before: Option<ItemId>) -> Vec<ItemId> {
        let ids = self.queue.add(tracks, before);
        if !ids.is_empty() {
            self.emit_queue_changed();
        }
        ids
    }

    /// Remove entries by id
    ///
    /// When the current entry is among them the replacement (its
    /// successor) is loaded and the prior play-when-ready intent is
    /// preserved; with no replacement the engine stops.
    pub fn remove(&mut self, ids: &[ItemId]) {
        let last = self.active_snapshot();
        let outcome = self.queue.remove(ids);
        if outcome.removed.is_empty() {
            return;
        }
        self.emit_queue_changed();

        if !outcome.current_removed {
            return;
        }

        let had_load = self.current_load.is_some();
        self.emit_active_track_changed(last);

        if self.queue.current().is_some() {
            if had_load {
                let play = self.play_when_ready;
                let _ = self.load_current(play, None);
            }
        } else if had_load {
            self.release_backend();
            self.set_state(PlaybackState::Stopped);
        }
    }

    /// Drop every entry after the current one
    pub fn remove_upcoming(&mut self) {
        let before = self.queue.len();
        self.queue.remove_upcoming();
        if self.queue.len() != before {
            self.emit_queue_changed();
        }
    }

    /// Drop every entry before the current one
    pub fn remove_previous(&mut self) {
        let before = self.queue.len();
        self.queue.remove_previous();
        if self.queue.len() != before {
            self.emit_queue_changed();
        }
    }

    /// Relocate an entry
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        self.queue.move_item(from, to)?;
        if from != to {
            self.emit_queue_changed();
        }
        Ok(())
    }

    // ===== Transport =====

    /// Start or resume playback
    ///
    /// With no current entry the first entry becomes current. A paused
    /// current entry resumes in place; anything else (re)loads it.
    pub fn play(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }

        if self.queue.current().is_none() {
            let last = self.active_snapshot();
            self.queue.jump(0)?;
            self.emit_active_track_changed(last);
            return self.load_current(true, None);
        }

        self.set_play_when_ready(true);
        match self.state {
            PlaybackState::Paused | PlaybackState::Ready => {
                // Same entry still loaded: resume, don't reload
                self.backend.play();
            }
            PlaybackState::Loading | PlaybackState::Buffering => {
                // Intent recorded; acted on when the source is ready
            }
            PlaybackState::Playing => {}
            PlaybackState::Idle
            | PlaybackState::Stopped
            | PlaybackState::Ended
            | PlaybackState::Error => {
                self.load_current(true, None)?;
            }
        }
        Ok(())
    }

    /// Pause playback, retaining the source
    pub fn pause(&mut self) {
        self.set_play_when_ready(false);
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Buffering) {
            self.backend.pause();
        }
    }

    /// Stop playback and release the source
    ///
    /// The queue and current index survive; `play` starts the same entry
    /// over.
    pub fn stop(&mut self) {
        self.set_play_when_ready(false);
        self.release_backend();
        self.position = Duration::ZERO;
        self.duration = None;
        self.buffered = Duration::ZERO;
        self.set_state(PlaybackState::Stopped);
    }

    /// Stop and clear everything
    pub fn reset(&mut self) {
        let last = self.active_snapshot();
        self.set_play_when_ready(false);
        self.release_backend();
        self.position = Duration::ZERO;
        self.duration = None;
        self.buffered = Duration::ZERO;

        let had_items = !self.queue.is_empty();
        self.queue.clear();
        if had_items {
            self.emit_queue_changed();
        }
        if last.index.is_some() {
            self.emit_active_track_changed(last);
        }
        self.set_state(PlaybackState::Idle);
    }

    /// Skip to the next entry
    pub fn next(&mut self) -> Result<()> {
        let last = self.active_snapshot();
        // Flag the outgoing entry first so a racing natural-end for it
        // cannot advance a second time.
        self.queue.mark_current_skipped();
        match self.queue.next() {
            Ok(_) => {
                self.emit_active_track_changed(last);
                let play = self.play_when_ready;
                self.load_current(play, None)
            }
            Err(err) => {
                self.queue.take_current_skipped();
                Err(err)
            }
        }
    }

    /// Skip to the previous entry
    pub fn previous(&mut self) -> Result<()> {
        let last = self.active_snapshot();
        self.queue.mark_current_skipped();
        match self.queue.previous() {
            Ok(_) => {
                self.emit_active_track_changed(last);
                let play = self.play_when_ready;
                self.load_current(play, None)
            }
            Err(err) => {
                self.queue.take_current_skipped();
                Err(err)
            }
        }
    }

    /// Skip straight to an index
    ///
    /// Skipping to the current index restarts the entry.
    pub fn skip_to_index(&mut self, index: usize) -> Result<()> {
        let last = self.active_snapshot();
        self.queue.mark_current_skipped();
        match self.queue.jump(index) {
            Ok(_) => {
                self.emit_active_track_changed(last);
                let play = self.play_when_ready;
                self.load_current(play, None)
            }
            Err(err) => {
                self.queue.take_current_skipped();
                Err(err)
            }
        }
    }

    /// Skip straight to an entry by id
    pub fn skip_to_item(&mut self, id: ItemId) -> Result<()> {
        let index = self
            .queue
            .position_of(id)
            .ok_or(PlaybackError::UnknownItem(id))?;
        self.skip_to_index(index)
    }

    // ===== Seek =====

    /// Seek to an absolute position
    ///
    /// Issued while the source is still loading, the position is held
    /// and applied the moment the source is ready instead of being
    /// dropped. Resume-at-saved-position flows depend on this.
    pub fn seek_to(&mut self, position: Duration) -> Result<()> {
        if self.current_load.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        if self.state == PlaybackState::Loading {
            self.pending_seek = Some(position);
        } else {
            self.backend.seek(position);
            self.position = position;
        }
        Ok(())
    }

    /// Seek forward by a delta, clamped to the known duration
    pub fn seek_forward(&mut self, delta: Duration) -> Result<()> {
        let mut target = self.position + delta;
        if let Some(duration) = self.duration {
            target = target.min(duration);
        }
        self.seek_to(target)
    }

    /// Seek backward by a delta, clamped to zero
    pub fn seek_backward(&mut self, delta: Duration) -> Result<()> {
        self.seek_to(self.position.saturating_sub(delta))
    }

    // ===== Scalar Controls =====

    /// Set the playback rate
    pub fn set_rate(&mut self, rate: f32) {
        let rate = rate.max(0.0);
        self.rate = rate;
        self.backend.set_rate(rate);
    }

    /// Current playback rate
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Set the volume, `0.0..=1.0`
    ///
    /// While ducked, the new value becomes the restore target and the
    /// duck attenuation stays applied.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.volume = volume;
        if self.duck_restore_volume.is_some() {
            self.duck_restore_volume = Some(volume);
            self.backend.set_volume(volume * self.config.duck_volume);
        } else {
            self.backend.set_volume(volume);
        }
    }

    /// Current user-facing volume
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set the repeat mode
    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    /// Current repeat mode
    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    // ===== Metadata =====

    /// Merge a partial metadata update into an entry
    ///
    /// Identity and position never change. Updating the current entry
    /// notifies the now-playing bridge.
    pub fn update_metadata(&mut self, id: ItemId, patch: &TrackMetadata) -> Result<()> {
        let is_current = self.queue.current().is_some_and(|item| item.id == id);
        let item = self
            .queue
            .get_by_id_mut(id)
            .ok_or(PlaybackError::UnknownItem(id))?;
        item.track.apply(patch);
        if is_current {
            let track = item.track.clone();
            self.emit(PlayerEvent::MetadataUpdated { id, track });
        }
        Ok(())
    }

    // ===== Backend Events =====

    /// Apply a backend report
    ///
    /// Reports from superseded loads are discarded here; only the most
    /// recent load may affect state.
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        let Some(current_load) = self.current_load else {
            debug!(load = %event.load(), "discarding backend event, nothing loaded");
            return;
        };
        if event.load() != current_load {
            debug!(
                load = %event.load(),
                current = %current_load,
                "discarding stale backend event"
            );
            return;
        }

        match event {
            BackendEvent::StateChanged { state, .. } => self.apply_backend_state(state),
            BackendEvent::DurationChanged { duration, .. } => {
                self.duration = Some(duration);
            }
            BackendEvent::Progress {
                position, buffered, ..
            } => {
                self.position = position;
                self.buffered = buffered;
            }
            BackendEvent::PlaybackEnded { .. } => self.handle_ended(),
            BackendEvent::Failed { failure, .. } => self.handle_failure(failure),
        }
    }

    fn apply_backend_state(&mut self, state: BackendState) {
        match state {
            BackendState::Buffering => self.set_state(PlaybackState::Buffering),
            BackendState::Ready => {
                if let Some(position) = self.pending_seek.take() {
                    self.backend.seek(position);
                    self.position = position;
                }
                if self.play_when_ready {
                    // Projection moves to Playing when the backend says so
                    self.backend.play();
                } else {
                    self.backend.pause();
                    self.set_state(PlaybackState::Ready);
                }
            }
            BackendState::Playing => {
                self.last_failure = None;
                self.set_state(PlaybackState::Playing);
            }
            BackendState::Paused => self.set_state(PlaybackState::Paused),
        }
    }

    /// Natural end of the current source
    fn handle_ended(&mut self) {
        if self.queue.take_current_skipped() {
            // The entry was left via an explicit skip; this end is an
            // echo and must not advance again.
            debug!("ignoring natural end for explicitly skipped entry");
            return;
        }

        if let Some(duration) = self.duration {
            self.position = duration;
        }

        match self.repeat {
            RepeatMode::Track => {
                let _ = self.load_current(true, None);
            }
            RepeatMode::Queue => {
                let last = self.active_snapshot();
                if self.queue.next().is_err() {
                    // Wrap around; the queue cannot be empty here
                    let _ = self.queue.jump(0);
                }
                self.emit_active_track_changed(last);
                let _ = self.load_current(true, None);
            }
            RepeatMode::Off => {
                let last = self.active_snapshot();
                if self.queue.next().is_ok() {
                    self.emit_active_track_changed(last);
                    let _ = self.load_current(true, None);
                } else {
                    self.finish_queue();
                }
            }
        }
    }

    /// The queue ran out after a natural end. A terminal notification,
    /// not an error; the queue is untouched.
    fn finish_queue(&mut self) {
        let last_index = self.queue.current_index().unwrap_or(0);
        self.emit(PlayerEvent::QueueEnded {
            last_index,
            last_position: self.position,
        });
        self.set_play_when_ready(false);
        self.release_backend();
        self.set_state(PlaybackState::Ended);
    }

    fn handle_failure(&mut self, failure: Failure) {
        warn!(kind = failure.kind.code(), message = %failure.message, "playback failed");
        self.emit(PlayerEvent::PlaybackError {
            code: failure.kind.code().to_string(),
            message: failure.message.clone(),
        });
        self.last_failure = Some(failure);
        // The failed entry stays in the queue; callers retry or skip
        self.current_load = None;
        self.set_state(PlaybackState::Error);
    }

    // ===== Remote Duck =====

    /// React to an OS audio-focus duck
    ///
    /// Permanent interruptions pause regardless of policy. Transient
    /// ones follow [`DuckPolicy`](crate::types::DuckPolicy): pause, or
    /// keep playing attenuated. An un-duck (`paused == false`) restores
    /// whatever the duck changed.
    pub fn duck(&mut self, paused: bool, permanent: bool) {
        use crate::types::DuckPolicy;

        if paused {
            if permanent || self.config.duck_policy == DuckPolicy::Pause {
                if self.state == PlaybackState::Playing {
                    self.duck_paused = true;
                    self.pause();
                }
            } else if self.duck_restore_volume.is_none() {
                self.duck_restore_volume = Some(self.volume);
                self.backend.set_volume(self.volume * self.config.duck_volume);
            }
        } else {
            if let Some(volume) = self.duck_restore_volume.take() {
                self.backend.set_volume(volume);
            }
            if std::mem::take(&mut self.duck_paused) {
                let _ = self.play();
            }
        }
    }

    // ===== Queries =====

    /// All queue entries in playback order
    pub fn queue_items(&self) -> &[QueueItem] {
        self.queue.items()
    }

    /// The current index, if any entry is current
    pub fn current_index(&self) -> Option<usize> {
        self.queue.current_index()
    }

    /// The current entry
    pub fn current_item(&self) -> Option<&QueueItem> {
        self.queue.current()
    }

    /// The current track
    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current().map(|item| &item.track)
    }

    /// Projected playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Total duration of the loaded source, once known
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Last known playhead position
    pub fn position(&self) -> Duration {
        self.position
    }

    /// Last known buffered-up-to position
    pub fn buffered_position(&self) -> Duration {
        self.buffered
    }

    /// Whether playback starts as soon as a source is ready
    pub fn play_when_ready(&self) -> bool {
        self.play_when_ready
    }

    /// Details of the last playback failure, if any
    pub fn last_failure(&self) -> Option<&Failure> {
        self.last_failure.as_ref()
    }

    /// Whether a next entry exists under the current repeat mode
    pub fn has_next(&self) -> bool {
        match self.repeat {
            RepeatMode::Track => self.queue.current().is_some(),
            RepeatMode::Queue => !self.queue.is_empty(),
            RepeatMode::Off => match self.queue.current_index() {
                Some(index) => index + 1 < self.queue.len(),
                None => !self.queue.is_empty(),
            },
        }
    }

    /// Whether a previous entry exists under the current repeat mode
    pub fn has_previous(&self) -> bool {
        match self.repeat {
            RepeatMode::Track => self.queue.current().is_some(),
            RepeatMode::Queue => !self.queue.is_empty(),
            RepeatMode::Off => self.queue.current_index().is_some_and(|index| index > 0),
        }
    }

    /// The configuration this controller was built with
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    // ===== Notifications =====

    /// Collect all notifications emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if any notifications are waiting
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    /// Push a progress notification if audio is advancing
    ///
    /// Called on a fixed interval by the owning service.
    pub fn emit_progress(&mut self) {
        if self.state == PlaybackState::Playing {
            self.emit(PlayerEvent::Progress {
                position: self.position,
                duration: self.duration,
                buffered: self.buffered,
            });
        }
    }

    // ===== Internals =====

    /// Load the current entry into the backend
    fn load_current(&mut self, play_when_ready: bool, initial_position: Option<Duration>) -> Result<()> {
        let Some(item) = self.queue.current() else {
            return Err(PlaybackError::NoTrackLoaded);
        };
        let request = LoadRequest::for_track(&item.track, play_when_ready, initial_position);
        let duration_hint = item.track.duration;

        let load = LoadId(self.next_load);
        self.next_load += 1;
        self.current_load = Some(load);

        // A fresh load resets the skip marker and any stale failure
        self.queue.take_current_skipped();
        self.last_failure = None;
        self.position = initial_position.unwrap_or(Duration::ZERO);
        self.duration = duration_hint;
        self.buffered = Duration::ZERO;
        self.pending_seek = None;

        self.set_play_when_ready(play_when_ready);
        self.backend.load(load, request);
        self.set_state(PlaybackState::Loading);
        Ok(())
    }

    /// Release the backend source and invalidate the load
    fn release_backend(&mut self) {
        if self.current_load.take().is_some() {
            self.backend.stop();
        }
        self.pending_seek = None;
    }

    fn set_play_when_ready(&mut self, play_when_ready: bool) {
        if self.play_when_ready != play_when_ready {
            self.play_when_ready = play_when_ready;
            self.emit(PlayerEvent::PlayWhenReadyChanged { play_when_ready });
        }
    }

    /// Record a state transition, suppressing no-ops
    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "playback state");
            self.state = state;
            self.emit(PlayerEvent::StateChanged { state });
        }
    }

    fn active_snapshot(&self) -> ActiveSnapshot {
        ActiveSnapshot {
            index: self.queue.current_index(),
            track: self.queue.current().map(|item| item.track.clone()),
            position: self.position,
        }
    }

    fn emit_active_track_changed(&mut self, last: ActiveSnapshot) {
        let new_index = self.queue.current_index();
        let new_track = self.queue.current().map(|item| item.track.clone());
        self.emit(PlayerEvent::ActiveTrackChanged {
            last_index: last.index,
            last_track: last.track,
            last_position: last.position,
            new_index,
            new_track,
        });
    }

    fn emit_queue_changed(&mut self) {
        self.emit(PlayerEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.pending_events.push(event);
    }
}

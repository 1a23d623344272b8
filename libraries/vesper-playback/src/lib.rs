//! Vesper - Playback Engine
//!
//! Queue-driven playback on top of a single-item platform player.
//!
//! This crate provides:
//! - An ordered queue with a current index and deterministic index
//!   bookkeeping across inserts, removals, and moves
//! - A playback controller that turns queue commands into player calls
//!   and player reports into a projected state machine
//! - Auto-advance on natural track end with repeat modes (Off, Track,
//!   Queue) and first-class queue-exhaustion reporting
//! - A remote-command bridge surface for OS media controls and
//!   now-playing metadata
//! - A thread-backed [`Player`] handle that serializes every command and
//!   player report through one context
//!
//! # Architecture
//!
//! `vesper-playback` is completely platform-agnostic. Decoding and
//! rendering live behind the [`AudioBackend`] trait; the platform layer
//! wraps its media primitive (ExoPlayer, AVPlayer, a GStreamer
//! pipeline) and reports what happened through a channel of
//! [`BackendEvent`]s. Each event carries the [`LoadId`] of the load it
//! belongs to, so reports from a superseded load can never touch state.
//!
//! # Example: Queue and Transport
//!
//! ```rust,no_run
//! use vesper_core::{Track, TrackSource};
//! use vesper_playback::{AudioBackend, LoadId, LoadRequest, Player, PlayerConfig};
//! # struct NullBackend;
//! # impl AudioBackend for NullBackend {
//! #     fn load(&mut self, _: LoadId, _: LoadRequest) {}
//! #     fn play(&mut self) {}
//! #     fn pause(&mut self) {}
//! #     fn stop(&mut self) {}
//! #     fn seek(&mut self, _: std::time::Duration) {}
//! #     fn set_rate(&mut self, _: f32) {}
//! #     fn rate(&self) -> f32 { 1.0 }
//! #     fn set_volume(&mut self, _: f32) {}
//! #     fn volume(&self) -> f32 { 1.0 }
//! # }
//!
//! // The closure receives the channel the platform backend reports into
//! let player = Player::new(PlayerConfig::default(), |_events| NullBackend);
//!
//! let mut track = Track::new(TrackSource::url("https://cdn.example.com/song.m4a"));
//! track.title = Some("My Favorite Song".to_string());
//! player.add(vec![track], None);
//!
//! player.play().unwrap();
//! player.pause();
//! ```
//!
//! # Example: Listening for Notifications
//!
//! ```rust,no_run
//! # use vesper_playback::{Player, PlayerConfig, PlayerEvent};
//! # fn listen(player: &Player) {
//! let events = player.events();
//! std::thread::spawn(move || {
//!     for event in events {
//!         match event {
//!             PlayerEvent::ActiveTrackChanged { .. } => {
//!                 // refresh the now-playing surface
//!             }
//!             PlayerEvent::QueueEnded { .. } => {
//!                 // the playlist finished; not an error
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//! # }
//! ```

#![forbid(unsafe_code)]

mod backend;
mod controller;
mod error;
mod events;
mod queue;
mod remote;
mod service;
pub mod types;

// Public exports
pub use backend::{
    AudioBackend, BackendEvent, BackendState, Failure, FailureKind, LoadId, LoadRequest,
};
pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use queue::{ItemId, Queue, QueueItem, RemovalOutcome};
pub use remote::{NowPlayingInfo, RemoteCommand};
pub use service::Player;
pub use types::{DuckPolicy, PlaybackState, PlayerConfig, RepeatMode};

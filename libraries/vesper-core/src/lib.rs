//! Vesper Core
//!
//! Domain types shared across the Vesper playback engine.
//!
//! This crate defines what a playable track *is*: where its audio comes
//! from, what the application knows about it for display, and the hints a
//! platform player needs to load it (content type, headers, pitch
//! algorithm). It deliberately knows nothing about queues or playback
//! state; those live in `vesper-playback`.
//!
//! # Example
//!
//! ```rust
//! use vesper_core::{Track, TrackMetadata, TrackSource};
//!
//! let mut track = Track::new(TrackSource::url("https://cdn.example.com/song.m4a"));
//! track.title = Some("My Favorite Song".to_string());
//!
//! // Later, merge a partial metadata update without touching identity
//! let patch = TrackMetadata {
//!     artist: Some("Some Artist".to_string()),
//!     ..TrackMetadata::default()
//! };
//! track.apply(&patch);
//! assert_eq!(track.artist.as_deref(), Some("Some Artist"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod types;

// Re-export commonly used types
pub use types::{MediaType, PitchAlgorithm, Track, TrackMetadata, TrackSource};

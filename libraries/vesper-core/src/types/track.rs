//! Track domain type
//!
//! A `Track` bundles the audio source locator with display metadata and
//! the load hints a platform player needs. Queue identity is *not* part
//! of the track; the queue assigns its own ids at insertion so the same
//! `Track` value can be enqueued twice without ambiguity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Where the audio for a track comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackSource {
    /// Local file on disk
    File(PathBuf),

    /// Remote stream or download
    Url(String),
}

impl TrackSource {
    /// Create a file source
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Create a URL source
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// Whether this source is remote
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

/// Content-type hint for the platform player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MediaType {
    /// Progressive file or plain stream
    #[default]
    Default,

    /// MPEG-DASH manifest
    Dash,

    /// HTTP Live Streaming playlist
    Hls,

    /// Microsoft Smooth Streaming manifest
    SmoothStreaming,
}

/// Pitch-correction algorithm hint for rate changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PitchAlgorithm {
    /// Platform default
    #[default]
    Default,

    /// No pitch correction, pitch follows rate
    Linear,

    /// Tuned for music content
    Music,

    /// Tuned for spoken word
    Voice,
}

/// A playable track
///
/// All display fields are optional; the source locator is the only thing
/// a track cannot exist without. `duration` is a hint for display before
/// loading; the authoritative duration comes from the player once the
/// source is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Audio source locator
    pub source: TrackSource,

    /// Content-type hint
    pub media_type: MediaType,

    /// Track title
    pub title: Option<String>,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Artwork locator (URL or path)
    pub artwork: Option<String>,

    /// Duration hint
    pub duration: Option<Duration>,

    /// Genre
    pub genre: Option<String>,

    /// Free-form description
    pub description: Option<String>,

    /// Release date
    pub release_date: Option<DateTime<Utc>>,

    /// Normalized rating in `0.0..=1.0`
    pub rating: Option<f32>,

    /// User agent for remote sources
    pub user_agent: Option<String>,

    /// Extra HTTP headers for remote sources
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Pitch-correction hint
    pub pitch_algorithm: PitchAlgorithm,

    /// Whether this is a live stream (seeking and duration are meaningless)
    pub live: bool,
}

impl Track {
    /// Create a track with only a source; everything else defaulted
    pub fn new(source: TrackSource) -> Self {
        Self {
            source,
            media_type: MediaType::default(),
            title: None,
            artist: None,
            album: None,
            artwork: None,
            duration: None,
            genre: None,
            description: None,
            release_date: None,
            rating: None,
            user_agent: None,
            headers: HashMap::new(),
            pitch_algorithm: PitchAlgorithm::default(),
            live: false,
        }
    }

    /// Merge a partial metadata update into this track
    ///
    /// Only `Some` fields of the patch are applied. Identity and source
    /// are never touched by a metadata update.
    pub fn apply(&mut self, patch: &TrackMetadata) {
        if let Some(title) = &patch.title {
            self.title = Some(title.clone());
        }
        if let Some(artist) = &patch.artist {
            self.artist = Some(artist.clone());
        }
        if let Some(album) = &patch.album {
            self.album = Some(album.clone());
        }
        if let Some(artwork) = &patch.artwork {
            self.artwork = Some(artwork.clone());
        }
        if let Some(duration) = patch.duration {
            self.duration = Some(duration);
        }
        if let Some(genre) = &patch.genre {
            self.genre = Some(genre.clone());
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(release_date) = patch.release_date {
            self.release_date = Some(release_date);
        }
        if let Some(rating) = patch.rating {
            self.rating = Some(rating.clamp(0.0, 1.0));
        }
    }
}

/// Partial metadata update for a track
///
/// Used by metadata-update operations: fields left as `None` keep their
/// current value on the target track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Track title
    pub title: Option<String>,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Artwork locator
    pub artwork: Option<String>,

    /// Duration hint
    pub duration: Option<Duration>,

    /// Genre
    pub genre: Option<String>,

    /// Free-form description
    pub description: Option<String>,

    /// Release date
    pub release_date: Option<DateTime<Utc>>,

    /// Normalized rating in `0.0..=1.0`
    pub rating: Option<f32>,
}

impl TrackMetadata {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the patch carries any information
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.artwork.is_none()
            && self.duration.is_none()
            && self.genre.is_none()
            && self.description.is_none()
            && self.release_date.is_none()
            && self.rating.is_none()
    }
}

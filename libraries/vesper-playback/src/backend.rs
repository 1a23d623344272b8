//! Platform player seam
//!
//! The engine drives exactly one loaded media source at a time through
//! this trait. The real implementation wraps whatever the platform
//! provides (ExoPlayer, AVPlayer, a GStreamer pipeline); the engine only
//! sees the narrow surface below plus the [`BackendEvent`] stream the
//! implementation feeds into the channel it was constructed with.
//!
//! Every event carries the [`LoadId`] of the load it belongs to. The
//! controller allocates a fresh id per `load` call and discards events
//! from superseded loads, so a slow backend can never apply a stale
//! "ready" or "ended" to the wrong track.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use vesper_core::{MediaType, PitchAlgorithm, Track, TrackSource};

/// Load generation token
///
/// Allocated by the controller, monotonically increasing. Events tagged
/// with an id older than the latest `load` call are stale and must be
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadId(pub(crate) u64);

impl fmt::Display for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything a backend needs to load one source
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    /// Audio source locator
    pub source: TrackSource,

    /// Content-type hint
    pub media_type: MediaType,

    /// Extra HTTP headers for remote sources
    pub headers: HashMap<String, String>,

    /// User agent for remote sources
    pub user_agent: Option<String>,

    /// Pitch-correction hint
    pub pitch_algorithm: PitchAlgorithm,

    /// Live-stream flag
    pub live: bool,

    /// Start playing as soon as the source is ready
    pub play_when_ready: bool,

    /// Position to seek to before playback starts
    pub initial_position: Option<Duration>,
}

impl LoadRequest {
    /// Build a request from a track plus the controller's intent
    pub fn for_track(
        track: &Track,
        play_when_ready: bool,
        initial_position: Option<Duration>,
    ) -> Self {
        Self {
            source: track.source.clone(),
            media_type: track.media_type,
            headers: track.headers.clone(),
            user_agent: track.user_agent.clone(),
            pitch_algorithm: track.pitch_algorithm,
            live: track.live,
            play_when_ready,
            initial_position,
        }
    }
}

/// Backend-reported state of the loaded source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendState {
    /// Waiting on data before playback can continue
    Buffering,

    /// Loaded and playable
    Ready,

    /// Audio is advancing
    Playing,

    /// Paused, source retained
    Paused,
}

/// Why a load or playback attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The locator itself is invalid
    BadSource,

    /// The source could not be reached
    Network,

    /// The data could not be decoded
    Decode,

    /// The format is not supported by this backend
    Unsupported,

    /// Anything else
    Other,
}

impl FailureKind {
    /// Stable string code for bridge layers
    pub fn code(self) -> &'static str {
        match self {
            Self::BadSource => "bad-source",
            Self::Network => "network",
            Self::Decode => "decode",
            Self::Unsupported => "unsupported",
            Self::Other => "other",
        }
    }
}

/// A playback failure report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    /// Failure category
    pub kind: FailureKind,

    /// Human-readable detail
    pub message: String,
}

impl Failure {
    /// Create a failure report
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Asynchronous reports from the backend
///
/// For one load, events arrive in occurrence order: state before
/// duration, duration before end. Transient rebuffering that the backend
/// recovers from on its own shows up as `Buffering` state changes, not
/// as failures.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// The source changed state
    StateChanged {
        /// Load this event belongs to
        load: LoadId,
        /// New state
        state: BackendState,
    },

    /// The source's duration became known or changed
    DurationChanged {
        /// Load this event belongs to
        load: LoadId,
        /// Total duration
        duration: Duration,
    },

    /// Periodic position report
    Progress {
        /// Load this event belongs to
        load: LoadId,
        /// Playhead position
        position: Duration,
        /// Buffered-up-to position
        buffered: Duration,
    },

    /// Playback reached the end of the source without intervention
    PlaybackEnded {
        /// Load this event belongs to
        load: LoadId,
    },

    /// The load or playback failed
    Failed {
        /// Load this event belongs to
        load: LoadId,
        /// What went wrong
        failure: Failure,
    },
}

impl BackendEvent {
    /// The load this event belongs to
    pub fn load(&self) -> LoadId {
        match self {
            Self::StateChanged { load, .. }
            | Self::DurationChanged { load, .. }
            | Self::Progress { load, .. }
            | Self::PlaybackEnded { load }
            | Self::Failed { load, .. } => *load,
        }
    }
}

/// Single-item platform player
///
/// Implementations receive a `crossbeam_channel::Sender<BackendEvent>`
/// at construction (see `Player::new`) and push their reports into it,
/// tagging each with the `LoadId` of the `load` call it belongs to.
///
/// Contract:
/// - `load` discards any previously loaded source; events from the old
///   load may still be in flight and are filtered out by id upstream,
///   but a backend should stop emitting them as soon as it can.
/// - `stop` releases the source entirely; `pause` retains it for instant
///   resume.
/// - No events may be emitted after the backend is dropped.
pub trait AudioBackend: Send {
    /// Begin loading a new source, superseding any previous one
    fn load(&mut self, load: LoadId, request: LoadRequest);

    /// Start or resume playback of the loaded source
    fn play(&mut self);

    /// Pause playback, retaining the source
    fn pause(&mut self);

    /// Release the loaded source
    fn stop(&mut self);

    /// Move the playhead
    fn seek(&mut self, position: Duration);

    /// Set the playback rate
    fn set_rate(&mut self, rate: f32);

    /// Current playback rate
    fn rate(&self) -> f32;

    /// Set the output volume, `0.0..=1.0`
    fn set_volume(&mut self, volume: f32);

    /// Current output volume
    fn volume(&self) -> f32;
}

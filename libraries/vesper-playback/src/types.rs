//! Core types for the playback engine

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Projected playback state
///
/// This is the externally visible state, derived from player reports and
/// transport commands. Transitions are only emitted when the visible
/// value actually changes; repeated commands against the same state are
/// no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing loaded, nothing requested
    Idle,

    /// A source is being loaded
    Loading,

    /// The loaded source is rebuffering
    Buffering,

    /// Loaded and ready, not playing
    Ready,

    /// Audio is advancing
    Playing,

    /// Paused mid-track, source retained for instant resume
    Paused,

    /// Stopped by request, source released, queue intact
    Stopped,

    /// The queue finished naturally
    Ended,

    /// The current source failed to load or play
    ///
    /// Details travel in the `PlaybackError` notification and stay
    /// readable via `last_failure()` on the controller.
    Error,
}

/// What happens when a track reaches its natural end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Advance until the queue runs out
    #[default]
    Off,

    /// Replay the current entry
    Track,

    /// Advance, wrapping from the last entry back to the first
    Queue,
}

/// How to react when the OS asks playback to duck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuckPolicy {
    /// Keep playing at reduced volume; pause only for permanent ducks
    #[default]
    LowerVolume,

    /// Pause for any duck
    Pause,
}

/// Configuration for a player instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Interval between progress notifications while playing (default: 1s)
    pub progress_interval: Duration,

    /// Default jump distance for remote jump-forward (default: 15s)
    pub forward_jump_interval: Duration,

    /// Default jump distance for remote jump-backward (default: 15s)
    pub backward_jump_interval: Duration,

    /// Duck reaction (default: lower volume)
    pub duck_policy: DuckPolicy,

    /// Volume factor applied while ducked (default: 0.2)
    pub duck_volume: f32,

    /// Initial volume, `0.0..=1.0` (default: 1.0)
    pub volume: f32,

    /// Initial playback rate (default: 1.0)
    pub rate: f32,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_secs(1),
            forward_jump_interval: Duration::from_secs(15),
            backward_jump_interval: Duration::from_secs(15),
            duck_policy: DuckPolicy::default(),
            duck_volume: 0.2,
            volume: 1.0,
            rate: 1.0,
            repeat: RepeatMode::Off,
        }
    }
}

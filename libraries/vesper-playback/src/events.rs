//! Player notifications
//!
//! One-way reports emitted by the engine and consumed by application
//! code and the remote/now-playing bridge. Notifications are emitted
//! only when the externally visible value actually changed; issuing
//! `pause` twice produces a single `StateChanged`.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use vesper_core::Track;

use crate::queue::ItemId;
use crate::types::PlaybackState;

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// The projected playback state changed
    StateChanged {
        /// The new state
        state: PlaybackState,
    },

    /// A different entry became current
    ActiveTrackChanged {
        /// Index of the outgoing entry, if there was one
        last_index: Option<usize>,
        /// The outgoing track
        last_track: Option<Track>,
        /// Playhead position in the outgoing track when it was left
        last_position: Duration,
        /// Index of the incoming entry, if there is one
        new_index: Option<usize>,
        /// The incoming track
        new_track: Option<Track>,
    },

    /// The queue finished naturally
    ///
    /// This is a terminal notification, not an error: the last entry
    /// reached its natural end with repeat off and nothing left to play.
    /// The queue itself is untouched.
    QueueEnded {
        /// Index of the entry that finished
        last_index: usize,
        /// Playhead position when it finished
        last_position: Duration,
    },

    /// The current source failed to load or play
    PlaybackError {
        /// Stable failure code (see `FailureKind::code`)
        code: String,
        /// Human-readable detail
        message: String,
    },

    /// The play-when-ready intent flipped
    PlayWhenReadyChanged {
        /// New intent
        play_when_ready: bool,
    },

    /// Periodic progress report while playing
    Progress {
        /// Playhead position
        position: Duration,
        /// Total duration, once known
        duration: Option<Duration>,
        /// Buffered-up-to position
        buffered: Duration,
    },

    /// The queue's structure changed (entries added/removed/moved)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// An entry's display metadata changed
    MetadataUpdated {
        /// The entry that changed
        id: ItemId,
        /// Its track after the merge
        track: Track,
    },
}

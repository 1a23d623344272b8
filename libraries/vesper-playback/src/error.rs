//! Error types for queue and transport commands
//!
//! These are the synchronous rejections: a command that cannot be carried
//! out structurally fails immediately and leaves playback state untouched.
//! Failures of the media itself (network, decode) are asynchronous and
//! arrive as [`PlayerEvent::PlaybackError`](crate::PlayerEvent) instead.

use crate::queue::ItemId;
use thiserror::Error;

/// Playback command errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Already at the last entry
    #[error("No next track")]
    NoNextTrack,

    /// Already at the first entry
    #[error("No previous track")]
    NoPreviousTrack,

    /// Moving the entry that is currently playing is not allowed
    #[error("Cannot move the current entry (index {index})")]
    CannotMoveCurrent {
        /// Index of the current entry
        index: usize,
    },

    /// No entry is loaded in the player
    #[error("No track loaded")]
    NoTrackLoaded,

    /// No entry with this id exists in the queue
    #[error("Unknown queue item: {0}")]
    UnknownItem(ItemId),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

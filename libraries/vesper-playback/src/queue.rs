//! Playback queue
//!
//! An ordered list of entries plus the current index. The current index
//! is the single source of truth for "what is playing"; every structural
//! operation here keeps it denoting the same logical entry, or degrades
//! it to `None` when that entry is gone.
//!
//! The queue has no playback side effects. Deciding what a structural
//! change means for the running player is the controller's job.

use serde::{Deserialize, Serialize};
use std::fmt;
use vesper_core::Track;

use crate::error::{PlaybackError, Result};

/// Stable identity of a queue entry
///
/// Assigned when the entry is inserted and never reused for the lifetime
/// of the queue, so enqueueing the same track twice yields two distinct
/// entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry in the queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Stable entry identity
    pub id: ItemId,

    /// The track payload (copied at insertion)
    pub track: Track,

    /// Set when the entry was left via an explicit skip rather than a
    /// natural end; consumed by the end-of-track handler to suppress a
    /// duplicate advance.
    #[serde(skip)]
    pub(crate) skipped: bool,
}

impl QueueItem {
    /// Whether this entry was left via an explicit skip
    pub fn skipped(&self) -> bool {
        self.skipped
    }
}

/// Result of a batch removal
#[derive(Debug, Clone, Default)]
pub struct RemovalOutcome {
    /// Entries that were actually removed, in removal order
    pub removed: Vec<QueueItem>,

    /// Whether the current entry was among them
    pub current_removed: bool,
}

/// Ordered playback queue with a current index
#[derive(Debug, Clone, Default)]
pub struct Queue {
    items: Vec<QueueItem>,
    current: Option<usize>,
    next_id: u64,
}

impl Queue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Structural Operations =====

    /// Insert tracks, returning their assigned ids
    ///
    /// Appends to the end unless `before` names an existing entry, in
    /// which case the tracks are spliced in ahead of it. An insert at or
    /// before the current position shifts the current index so it keeps
    /// denoting the same entry.
    pub fn add(&mut self, tracks: Vec<Track>, before: Option<ItemId>) -> Vec<ItemId> {
        let position = before
            .and_then(|id| self.position_of(id))
            .unwrap_or(self.items.len());

        let mut ids = Vec::with_capacity(tracks.len());
        for (offset, track) in tracks.into_iter().enumerate() {
            let id = ItemId(self.next_id);
            self.next_id += 1;
            self.items.insert(
                position + offset,
                QueueItem {
                    id,
                    track,
                    skipped: false,
                },
            );
            ids.push(id);
        }

        if let Some(current) = self.current {
            if position <= current {
                self.current = Some(current + ids.len());
            }
        }

        ids
    }

    /// Remove entries by id
    ///
    /// Each id is resolved against the list as it stands at that moment,
    /// so a batch given in any positional order keeps the index math
    /// correct. Unknown ids are skipped. Removing the current entry
    /// leaves the index pointing at its successor (or `None` when there
    /// is none) and reports `current_removed` so the caller can decide
    /// between playing the replacement and stopping.
    pub fn remove(&mut self, ids: &[ItemId]) -> RemovalOutcome {
        let mut outcome = RemovalOutcome::default();

        for &id in ids {
            let Some(position) = self.position_of(id) else {
                continue;
            };
            outcome.removed.push(self.items.remove(position));

            if let Some(current) = self.current {
                if position < current {
                    self.current = Some(current - 1);
                } else if position == current {
                    outcome.current_removed = true;
                    // index now denotes the successor, if any
                }
            }
        }

        if let Some(current) = self.current {
            if current >= self.items.len() {
                self.current = None;
            }
        }

        outcome
    }

    /// Drop every entry after the current one
    ///
    /// With no current entry the whole queue is upcoming, so everything
    /// goes.
    pub fn remove_upcoming(&mut self) {
        match self.current {
            Some(current) => self.items.truncate(current + 1),
            None => self.items.clear(),
        }
    }

    /// Drop every entry before the current one and re-base it to index 0
    pub fn remove_previous(&mut self) {
        if let Some(current) = self.current {
            self.items.drain(..current);
            self.current = Some(0);
        }
    }

    /// Set the current index directly
    pub fn jump(&mut self, index: usize) -> Result<&QueueItem> {
        if index >= self.items.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }
        self.current = Some(index);
        Ok(&self.items[index])
    }

    /// Advance to the next entry
    ///
    /// With no current entry, "next" is the first entry.
    pub fn next(&mut self) -> Result<&QueueItem> {
        if self.items.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        let next = self.current.map_or(0, |current| current + 1);
        if next >= self.items.len() {
            return Err(PlaybackError::NoNextTrack);
        }
        self.current = Some(next);
        Ok(&self.items[next])
    }

    /// Step back to the previous entry
    pub fn previous(&mut self) -> Result<&QueueItem> {
        if self.items.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        match self.current {
            Some(current) if current > 0 => {
                self.current = Some(current - 1);
                Ok(&self.items[current - 1])
            }
            _ => Err(PlaybackError::NoPreviousTrack),
        }
    }

    /// Relocate an entry
    ///
    /// Moving the current entry (or displacing another entry into its
    /// slot) would desynchronize playback, so both are rejected.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        if from >= self.items.len() {
            return Err(PlaybackError::IndexOutOfBounds(from));
        }
        if to >= self.items.len() {
            return Err(PlaybackError::IndexOutOfBounds(to));
        }
        if let Some(current) = self.current {
            if from == current || to == current {
                return Err(PlaybackError::CannotMoveCurrent { index: current });
            }
        }
        if from == to {
            return Ok(());
        }

        let item = self.items.remove(from);
        if let Some(current) = self.current {
            let mut shifted = current;
            if from < shifted {
                shifted -= 1;
            }
            if to <= shifted {
                shifted += 1;
            }
            self.current = Some(shifted);
        }
        self.items.insert(to, item);
        Ok(())
    }

    /// Empty the queue
    pub fn clear(&mut self) {
        self.items.clear();
        self.current = None;
    }

    // ===== Skip Bookkeeping =====

    /// Flag the current entry as explicitly skipped
    pub fn mark_current_skipped(&mut self) {
        if let Some(item) = self.current_mut() {
            item.skipped = true;
        }
    }

    /// Clear the skip flag on the current entry, returning its prior value
    pub fn take_current_skipped(&mut self) -> bool {
        match self.current_mut() {
            Some(item) => std::mem::replace(&mut item.skipped, false),
            None => false,
        }
    }

    // ===== Queries =====

    /// Number of entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All entries in playback order
    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    /// Entry at an index
    pub fn get(&self, index: usize) -> Option<&QueueItem> {
        self.items.get(index)
    }

    /// Entry by id
    pub fn get_by_id(&self, id: ItemId) -> Option<&QueueItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Mutable entry by id
    pub(crate) fn get_by_id_mut(&mut self, id: ItemId) -> Option<&mut QueueItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Position of an id in the sequence
    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// The current entry
    pub fn current(&self) -> Option<&QueueItem> {
        self.current.and_then(|index| self.items.get(index))
    }

    /// Mutable current entry
    pub(crate) fn current_mut(&mut self) -> Option<&mut QueueItem> {
        self.current.and_then(|index| self.items.get_mut(index))
    }

    /// The current index, if any entry is current
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }
}

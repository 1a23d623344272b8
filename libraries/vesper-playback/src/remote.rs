//! Remote command bridge
//!
//! Adapter surface between the engine and the OS remote-control /
//! now-playing layer. Incoming transport commands map onto controller
//! commands; outgoing metadata is projected into [`NowPlayingInfo`] for
//! whatever now-playing sink the platform provides.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use vesper_core::TrackMetadata;

use crate::controller::PlaybackController;
use crate::error::{PlaybackError, Result};

/// Transport commands arriving from the OS remote-control surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RemoteCommand {
    /// Start or resume playback
    Play,

    /// Pause playback
    Pause,

    /// Stop playback
    Stop,

    /// Skip to the next entry
    Next,

    /// Skip to the previous entry
    Previous,

    /// Seek to an absolute position
    Seek(Duration),

    /// Jump forward; `None` uses the configured interval
    JumpForward(Option<Duration>),

    /// Jump backward; `None` uses the configured interval
    JumpBackward(Option<Duration>),

    /// Rate the current entry, normalized `0.0..=1.0`
    SetRating(f32),

    /// Audio-focus duck began (`paused`) or ended
    Duck {
        /// Whether the OS wants playback silenced
        paused: bool,
        /// Whether the interruption will not end on its own
        permanent: bool,
    },
}

/// Now-playing projection for the OS media surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlayingInfo {
    /// Track title
    pub title: Option<String>,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Artwork locator
    pub artwork: Option<String>,

    /// Total duration, once known
    pub duration: Option<Duration>,

    /// Playhead position
    pub position: Duration,

    /// Playback rate
    pub rate: f32,
}

impl PlaybackController {
    /// Apply a remote transport command
    pub fn handle_remote(&mut self, command: RemoteCommand) -> Result<()> {
        match command {
            RemoteCommand::Play => self.play(),
            RemoteCommand::Pause => {
                self.pause();
                Ok(())
            }
            RemoteCommand::Stop => {
                self.stop();
                Ok(())
            }
            RemoteCommand::Next => self.next(),
            RemoteCommand::Previous => self.previous(),
            RemoteCommand::Seek(position) => self.seek_to(position),
            RemoteCommand::JumpForward(interval) => {
                let interval = interval.unwrap_or(self.config().forward_jump_interval);
                self.seek_forward(interval)
            }
            RemoteCommand::JumpBackward(interval) => {
                let interval = interval.unwrap_or(self.config().backward_jump_interval);
                self.seek_backward(interval)
            }
            RemoteCommand::SetRating(rating) => {
                let id = self
                    .current_item()
                    .map(|item| item.id)
                    .ok_or(PlaybackError::NoTrackLoaded)?;
                let patch = TrackMetadata {
                    rating: Some(rating),
                    ..TrackMetadata::default()
                };
                self.update_metadata(id, &patch)
            }
            RemoteCommand::Duck { paused, permanent } => {
                self.duck(paused, permanent);
                Ok(())
            }
        }
    }

    /// Project the current entry for the OS now-playing surface
    ///
    /// `None` when nothing is current; the platform should clear its
    /// now-playing slate in that case.
    pub fn now_playing_info(&self) -> Option<NowPlayingInfo> {
        let track = self.current_track()?;
        Some(NowPlayingInfo {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            artwork: track.artwork.clone(),
            duration: self.duration().or(track.duration),
            position: self.position(),
            rate: self.rate(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::RecordingBackend;
    use crate::events::PlayerEvent;
    use crate::types::PlayerConfig;
    use vesper_core::{Track, TrackSource};

    fn controller_with_track() -> PlaybackController {
        let (backend, _) = RecordingBackend::new();
        let mut controller = PlaybackController::new(Box::new(backend), PlayerConfig::default());
        let mut track = Track::new(TrackSource::file("/music/a.mp3"));
        track.title = Some("a".to_string());
        controller.add(vec![track], None);
        controller
    }

    #[test]
    fn remote_play_maps_to_play() {
        let mut controller = controller_with_track();
        controller.handle_remote(RemoteCommand::Play).unwrap();
        assert_eq!(controller.current_index(), Some(0));
        assert!(controller.play_when_ready());
    }

    #[test]
    fn set_rating_updates_current_and_notifies() {
        let mut controller = controller_with_track();
        controller.play().unwrap();
        controller.drain_events();

        controller
            .handle_remote(RemoteCommand::SetRating(0.8))
            .unwrap();
        assert_eq!(controller.current_track().unwrap().rating, Some(0.8));
        assert!(controller
            .drain_events()
            .iter()
            .any(|event| matches!(event, PlayerEvent::MetadataUpdated { .. })));
    }

    #[test]
    fn set_rating_without_current_fails() {
        let mut controller = controller_with_track();
        assert_eq!(
            controller.handle_remote(RemoteCommand::SetRating(0.5)),
            Err(PlaybackError::NoTrackLoaded)
        );
    }

    #[test]
    fn now_playing_projects_current_track() {
        let mut controller = controller_with_track();
        assert!(controller.now_playing_info().is_none());

        controller.play().unwrap();
        let info = controller.now_playing_info().unwrap();
        assert_eq!(info.title.as_deref(), Some("a"));
        assert_eq!(info.rate, 1.0);
    }
}

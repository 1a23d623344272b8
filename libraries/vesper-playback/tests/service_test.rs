//! Player service tests
//!
//! Drive the thread-backed handle end to end: commands from the caller
//! thread, backend reports through the pump thread, notifications out
//! the bounded channel.

mod common;

use common::{Call, ScriptedBackend, track};
use crossbeam_channel::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use vesper_playback::{
    BackendEvent, BackendState, LoadId, PlaybackError, PlaybackState, Player, PlayerConfig,
    PlayerEvent, RemoteCommand,
};

struct Harness {
    player: Player,
    events: Receiver<PlayerEvent>,
    backend_tx: Sender<BackendEvent>,
    calls: Arc<Mutex<Vec<Call>>>,
}

fn harness(config: PlayerConfig) -> Harness {
    common::init_tracing();

    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut tap = None;
    let player = Player::new(config, |events| {
        tap = Some(events.clone());
        ScriptedBackend::auto_ready(events, calls.clone())
    });
    let events = player.events();
    Harness {
        player,
        events,
        backend_tx: tap.unwrap(),
        calls,
    }
}

fn wait_for(
    events: &Receiver<PlayerEvent>,
    mut matches: impl FnMut(&PlayerEvent) -> bool,
) -> PlayerEvent {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if let Ok(event) = events.recv_timeout(Duration::from_millis(50)) {
            if matches(&event) {
                return event;
            }
        }
    }
    panic!("timed out waiting for event");
}

fn first_load(calls: &Arc<Mutex<Vec<Call>>>) -> LoadId {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        let recorded = calls.lock().unwrap();
        if let Some(load) = recorded.iter().find_map(|call| match call {
            Call::Load(load, _) => Some(*load),
            _ => None,
        }) {
            return load;
        }
        drop(recorded);
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("backend never saw a load");
}

#[test]
fn play_reports_states_through_the_channel() {
    let harness = harness(PlayerConfig::default());
    harness.player.add(vec![track("a")], None);
    harness.player.play().unwrap();

    wait_for(&harness.events, |event| {
        matches!(
            event,
            PlayerEvent::StateChanged {
                state: PlaybackState::Loading
            }
        )
    });
    wait_for(&harness.events, |event| {
        matches!(
            event,
            PlayerEvent::StateChanged {
                state: PlaybackState::Playing
            }
        )
    });
    assert_eq!(harness.player.state(), PlaybackState::Playing);
}

#[test]
fn structural_errors_come_back_synchronously() {
    let harness = harness(PlayerConfig::default());
    assert_eq!(harness.player.play(), Err(PlaybackError::QueueEmpty));
    assert_eq!(harness.player.state(), PlaybackState::Idle);
}

#[test]
fn progress_ticks_while_playing() {
    let config = PlayerConfig {
        progress_interval: Duration::from_millis(20),
        ..PlayerConfig::default()
    };
    let harness = harness(config);
    harness.player.add(vec![track("a")], None);
    harness.player.play().unwrap();

    wait_for(&harness.events, |event| {
        matches!(event, PlayerEvent::Progress { .. })
    });
}

#[test]
fn natural_end_advances_through_the_service() {
    let harness = harness(PlayerConfig::default());
    harness.player.add(vec![track("a"), track("b")], None);
    harness.player.play().unwrap();

    wait_for(&harness.events, |event| {
        matches!(
            event,
            PlayerEvent::StateChanged {
                state: PlaybackState::Playing
            }
        )
    });

    let load = first_load(&harness.calls);
    harness
        .backend_tx
        .send(BackendEvent::PlaybackEnded { load })
        .unwrap();

    wait_for(&harness.events, |event| {
        matches!(
            event,
            PlayerEvent::ActiveTrackChanged {
                last_index: Some(0),
                new_index: Some(1),
                ..
            }
        )
    });
    assert_eq!(harness.player.current_index(), Some(1));
}

#[test]
fn queue_exhaustion_reaches_subscribers() {
    let harness = harness(PlayerConfig::default());
    harness.player.add(vec![track("a")], None);
    harness.player.play().unwrap();

    let load = first_load(&harness.calls);
    harness
        .backend_tx
        .send(BackendEvent::PlaybackEnded { load })
        .unwrap();

    wait_for(&harness.events, |event| {
        matches!(event, PlayerEvent::QueueEnded { last_index: 0, .. })
    });
    assert_eq!(harness.player.state(), PlaybackState::Ended);
    assert_eq!(harness.player.queue().len(), 1);
}

#[test]
fn remote_commands_drive_transport() {
    let harness = harness(PlayerConfig::default());
    harness.player.add(vec![track("a"), track("b")], None);

    harness.player.handle_remote(RemoteCommand::Play).unwrap();
    wait_for(&harness.events, |event| {
        matches!(
            event,
            PlayerEvent::StateChanged {
                state: PlaybackState::Playing
            }
        )
    });

    harness.player.handle_remote(RemoteCommand::Pause).unwrap();
    assert!(!harness.player.play_when_ready());
    assert!(harness.calls.lock().unwrap().contains(&Call::Pause));

    // The backend acknowledges the pause; the projection follows
    let load = first_load(&harness.calls);
    harness
        .backend_tx
        .send(BackendEvent::StateChanged {
            load,
            state: BackendState::Paused,
        })
        .unwrap();
    wait_for(&harness.events, |event| {
        matches!(
            event,
            PlayerEvent::StateChanged {
                state: PlaybackState::Paused
            }
        )
    });

    harness.player.handle_remote(RemoteCommand::Next).unwrap();
    assert_eq!(harness.player.current_index(), Some(1));
}

#[test]
fn now_playing_follows_the_current_track() {
    let harness = harness(PlayerConfig::default());
    assert!(harness.player.now_playing().is_none());

    harness.player.add(vec![track("a")], None);
    harness.player.play().unwrap();

    let info = harness.player.now_playing().unwrap();
    assert_eq!(info.title.as_deref(), Some("a"));
    assert_eq!(info.artist.as_deref(), Some("Test Artist"));
}

#[test]
fn dropping_the_player_stops_the_backend() {
    let harness = harness(PlayerConfig::default());
    harness.player.add(vec![track("a")], None);
    harness.player.play().unwrap();
    wait_for(&harness.events, |event| {
        matches!(
            event,
            PlayerEvent::StateChanged {
                state: PlaybackState::Playing
            }
        )
    });

    let calls = harness.calls.clone();
    drop(harness.player);
    assert!(calls.lock().unwrap().contains(&Call::Stop));
}

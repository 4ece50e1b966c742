
use test_helpers::*;

use numble_server::room_manager::ActionError;
use numble_types::{FeedbackColor, GameStatus, ServerMessage};

#[tokio::test]
async fn test_room_code_is_shareable() {
    let setup = TestServerSetup::new();
    let room_id = setup.rooms.create_room(HOST).await;

    assert_eq!(room_id.len(), 6);
    assert!(room_id.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(room_id, room_id.to_uppercase());
}

#[tokio::test]
async fn test_room_codes_are_distinct() {
    let setup = TestServerSetup::new();

    let mut codes = std::collections::HashSet::new();
    for _ in 0..50 {
        assert!(codes.insert(setup.rooms.create_room(HOST).await));
    }
    assert_eq!(setup.rooms.registry().room_count().await, 50);
}

#[tokio::test]
async fn test_join_broadcasts_to_both_players() {
    let setup = TestServerSetup::new();
    let mut host_rx = setup.connect(HOST);
    let mut guest_rx = setup.connect(GUEST);

    let room_id = setup.rooms.create_room(HOST).await;
    setup.rooms.join_room(GUEST, &room_id).await.unwrap();

    for rx in [&mut host_rx, &mut guest_rx] {
        let events = drain(rx);
        match &events[0] {
            ServerMessage::PlayerJoined {
                room_id: id,
                game_state,
                players,
            } => {
                assert_eq!(id, &room_id);
                assert_eq!(game_state.status, GameStatus::Setup);
                assert_eq!(players.len(), 2);
                assert!(players[0].is_host);
            }
            other => panic!("expected player_joined, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_join_unknown_room_rejected() {
    let setup = TestServerSetup::new();
    let result = setup.rooms.join_room(GUEST, "ZZZZZZ").await;
    assert_eq!(
        result,
        Err(ActionError::Rejected("Room full or invalid".to_string()))
    );
}

#[tokio::test]
async fn test_join_full_room_rejected() {
    let setup = TestServerSetup::new();
    let room_id = setup.rooms.create_room(HOST).await;
    setup.rooms.join_room(GUEST, &room_id).await.unwrap();

    let result = setup.rooms.join_room("client-third", &room_id).await;
    assert!(matches!(result, Err(ActionError::Rejected(_))));
}

#[tokio::test]
async fn test_rejoining_own_room_is_ack_only() {
    let setup = TestServerSetup::new();
    let mut host_rx = setup.connect(HOST);

    let room_id = setup.rooms.create_room(HOST).await;
    setup.rooms.join_room(HOST, &room_id).await.unwrap();

    // No player_joined broadcast and no second seat taken
    assert!(drain(&mut host_rx).is_empty());
    let room = setup.rooms.registry().get(&room_id).await.unwrap();
    assert!(room.player2.is_none());
}

#[tokio::test]
async fn test_player_setup_broadcasts_roster() {
    let setup = TestServerSetup::new();
    let mut guest_rx = setup.connect(GUEST);

    let room_id = setup.rooms.create_room(HOST).await;
    setup.rooms.join_room(GUEST, &room_id).await.unwrap();
    drain(&mut guest_rx);

    setup
        .rooms
        .set_player_setup(HOST, &room_id, "Alice", "1234")
        .await
        .unwrap();

    let events = drain(&mut guest_rx);
    match &events[0] {
        ServerMessage::PlayerReady {
            player_id,
            name,
            players,
            ..
        } => {
            assert_eq!(player_id, HOST);
            assert_eq!(name, "Alice");
            assert!(players[0].is_ready);
            assert!(!players[1].is_ready);
        }
        other => panic!("expected player_ready, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_secret_rejected_and_not_broadcast() {
    let setup = TestServerSetup::new();
    let mut guest_rx = setup.connect(GUEST);

    let room_id = setup.rooms.create_room(HOST).await;
    setup.rooms.join_room(GUEST, &room_id).await.unwrap();
    drain(&mut guest_rx);

    let result = setup
        .rooms
        .set_player_setup(HOST, &room_id, "Alice", "1122")
        .await;
    assert!(matches!(result, Err(ActionError::Rejected(_))));

    // The opponent sees nothing and the host is still not ready
    assert!(drain(&mut guest_rx).is_empty());
    let room = setup.rooms.registry().get(&room_id).await.unwrap();
    assert!(!room.player1.is_ready);
}

#[tokio::test]
async fn test_only_host_starts_game() {
    let setup = TestServerSetup::new();
    let room_id = setup.rooms.create_room(HOST).await;
    setup.rooms.join_room(GUEST, &room_id).await.unwrap();
    setup
        .rooms
        .set_player_setup(HOST, &room_id, "Alice", "1234")
        .await
        .unwrap();
    setup
        .rooms
        .set_player_setup(GUEST, &room_id, "Bob", "5678")
        .await
        .unwrap();

    let result = setup.rooms.start_game(GUEST, &room_id).await;
    assert!(matches!(result, Err(ActionError::Rejected(_))));

    let room = setup.rooms.registry().get(&room_id).await.unwrap();
    assert_eq!(room.game_state.status, GameStatus::Setup);
}

#[tokio::test]
async fn test_winning_guess_broadcasts_guess_and_game_over() {
    let setup = TestServerSetup::new();
    let mut host_rx = setup.connect(HOST);
    let mut guest_rx = setup.connect(GUEST);

    let room_id = setup.playing_room().await;
    drain(&mut host_rx);
    drain(&mut guest_rx);

    // Host probes with a disjoint guess, then hits the guest's secret
    setup.rooms.submit_guess(HOST, &room_id, "1234").await.unwrap();
    let events = drain(&mut guest_rx);
    match &events[0] {
        ServerMessage::GuessMade {
            player_id,
            feedback,
            attempt,
            ..
        } => {
            assert_eq!(player_id, HOST);
            assert_eq!(*attempt, 1);
            assert_eq!(feedback, &vec![FeedbackColor::Grey; 4]);
        }
        other => panic!("expected guess_made, got {:?}", other),
    }

    setup.rooms.submit_guess(HOST, &room_id, "5678").await.unwrap();

    for rx in [&mut host_rx, &mut guest_rx] {
        let events = drain(rx);
        match find_game_over(&events) {
            Some(ServerMessage::GameOver {
                winner_id,
                winner_name,
                p1_secret,
                p2_secret,
                ..
            }) => {
                assert_eq!(winner_id.as_deref(), Some(HOST));
                assert_eq!(winner_name.as_deref(), Some("Alice"));
                assert_eq!(p1_secret.as_deref(), Some("1234"));
                assert_eq!(p2_secret.as_deref(), Some("5678"));
            }
            other => panic!("expected game_over, got {:?}", other),
        }
    }

    let room = setup.rooms.registry().get(&room_id).await.unwrap();
    assert_eq!(room.game_state.status, GameStatus::Finished);
}

#[tokio::test]
async fn test_guess_on_finished_room_is_silent() {
    let setup = TestServerSetup::new();
    let mut guest_rx = setup.connect(GUEST);

    let room_id = setup.playing_room().await;
    setup.rooms.submit_guess(HOST, &room_id, "5678").await.unwrap();
    drain(&mut guest_rx);

    let result = setup.rooms.submit_guess(GUEST, &room_id, "1234").await;
    assert_eq!(result, Err(ActionError::Ignored));
    assert!(drain(&mut guest_rx).is_empty());
}

#[tokio::test]
async fn test_guess_against_unknown_room_is_silent() {
    let setup = TestServerSetup::new();
    let result = setup.rooms.submit_guess(HOST, "ZZZZZZ", "1234").await;
    assert_eq!(result, Err(ActionError::Ignored));
}

#[tokio::test]
async fn test_draw_by_exhaustion_reveals_secrets() {
    let setup = TestServerSetup::new();
    let mut host_rx = setup.connect(HOST);

    let room_id = setup.playing_room().await;
    drain(&mut host_rx);

    let non_winning = ["0123", "0124", "0125", "0126", "0127", "0129"];
    for guess in non_winning {
        setup.rooms.submit_guess(HOST, &room_id, guess).await.unwrap();
        setup.rooms.submit_guess(GUEST, &room_id, guess).await.unwrap();
    }

    let events = drain(&mut host_rx);
    match find_game_over(&events) {
        Some(ServerMessage::GameOver {
            winner_id, message, ..
        }) => {
            assert!(winner_id.is_none());
            assert!(message.is_some());
        }
        other => panic!("expected game_over, got {:?}", other),
    }
}

#[tokio::test]
async fn test_disconnect_during_play_forfeits_to_opponent() {
    let setup = TestServerSetup::new();
    let mut host_rx = setup.connect(HOST);
    let _guest_rx = setup.connect(GUEST);

    let room_id = setup.playing_room().await;
    drain(&mut host_rx);

    setup.connections.unregister(GUEST);
    setup.rooms.handle_disconnect(GUEST).await;

    let events = drain(&mut host_rx);
    match find_game_over(&events) {
        Some(ServerMessage::GameOver {
            winner_id,
            reason,
            p1_secret,
            p2_secret,
            ..
        }) => {
            assert_eq!(winner_id.as_deref(), Some(HOST));
            assert_eq!(reason.as_deref(), Some("opponent disconnected"));
            assert!(p1_secret.is_some());
            assert!(p2_secret.is_some());
        }
        other => panic!("expected game_over, got {:?}", other),
    }

    let room = setup.rooms.registry().get(&room_id).await.unwrap();
    assert_eq!(room.game_state.status, GameStatus::Finished);
    assert!(!room.player2.as_ref().unwrap().connected);
}

#[tokio::test]
async fn test_disconnect_outside_play_is_notice() {
    let setup = TestServerSetup::new();
    let mut host_rx = setup.connect(HOST);
    let _guest_rx = setup.connect(GUEST);

    let room_id = setup.rooms.create_room(HOST).await;
    setup.rooms.join_room(GUEST, &room_id).await.unwrap();
    drain(&mut host_rx);

    setup.connections.unregister(GUEST);
    setup.rooms.handle_disconnect(GUEST).await;

    let events = drain(&mut host_rx);
    match &events[0] {
        ServerMessage::PlayerDisconnected { player_id } => assert_eq!(player_id, GUEST),
        other => panic!("expected player_disconnected, got {:?}", other),
    }

    let room = setup.rooms.registry().get(&room_id).await.unwrap();
    assert_eq!(room.game_state.status, GameStatus::Setup);
}

#[tokio::test]
async fn test_rematch_broadcasts_fresh_state() {
    let setup = TestServerSetup::new();
    let mut guest_rx = setup.connect(GUEST);

    let room_id = setup.playing_room().await;
    setup.rooms.submit_guess(HOST, &room_id, "5678").await.unwrap();
    drain(&mut guest_rx);

    setup.rooms.rematch(GUEST, &room_id).await.unwrap();

    let events = drain(&mut guest_rx);
    match &events[0] {
        ServerMessage::RematchStarted { game_state } => {
            assert_eq!(game_state.status, GameStatus::Setup);
            assert!(game_state.winner_id.is_none());
        }
        other => panic!("expected rematch_started, got {:?}", other),
    }

    let room = setup.rooms.registry().get(&room_id).await.unwrap();
    assert!(room.player1.secret.is_none());
    assert!(!room.player2.as_ref().unwrap().has_won);
}

#[tokio::test]
async fn test_rematch_before_finish_is_silent() {
    let setup = TestServerSetup::new();
    let room_id = setup.playing_room().await;

    let result = setup.rooms.rematch(HOST, &room_id).await;
    assert_eq!(result, Err(ActionError::Ignored));

    let room = setup.rooms.registry().get(&room_id).await.unwrap();
    assert_eq!(room.game_state.status, GameStatus::Playing);
}

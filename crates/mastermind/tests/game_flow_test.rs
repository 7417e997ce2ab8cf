//! Tests for game creation, guessing and display through the service.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use mastermind::{
    FixedClock, FixedSecret, GameError, GameParams, GameStatus, GameStore, InMemoryStore,
    Mastermind, Winner,
};

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 18)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid timestamp")
}

/// Service over a fresh in-memory store whose games all use `secret`.
fn setup(secret: Vec<i32>) -> (Arc<InMemoryStore>, Mastermind) {
    let store = Arc::new(InMemoryStore::new());
    let service = Mastermind::new(store.clone())
        .with_clock(FixedClock(noon()))
        .with_secret_source(FixedSecret::new(secret));
    (store, service)
}

#[test]
fn test_create_game_starts_unfinished() {
    let (store, service) = setup(vec![1, 2, 3, 4]);
    let game = service
        .create_game(GameParams::default())
        .expect("Create failed");

    assert!(*game.id() > 0);
    assert_eq!(*game.status(), GameStatus::Started);
    assert_eq!(*game.winner(), None);
    assert_eq!(*game.started_at(), noon());
    assert_eq!(*game.finished_at(), None);
    assert!(game.guesses().is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_create_game_random_secret_in_range() {
    let store = Arc::new(InMemoryStore::new());
    let service = Mastermind::new(store);
    let game = service
        .create_game(GameParams::new(10, 3, 5))
        .expect("Create failed");

    assert_eq!(game.secret().len(), 10);
    assert!(game.secret().iter().all(|c| (0..3).contains(c)));
}

#[test]
fn test_create_game_invalid_params_persists_nothing() {
    let (store, service) = setup(vec![0]);
    for params in [GameParams::new(0, 0, 0), GameParams::new(-1, 1, 1)] {
        let result = service.create_game(params);
        assert!(matches!(result, Err(GameError::InvalidGameParameter(_))));
    }
    assert!(store.is_empty());
}

#[test]
fn test_get_game_missing_returns_none() {
    let (_store, service) = setup(vec![1, 2, 3, 4]);
    let found = service.get_game(-1).expect("Lookup failed");
    assert!(found.is_none());
}

#[test]
fn test_get_game_round_trip() {
    let (_store, service) = setup(vec![1, 2, 3, 4]);
    let game = service
        .create_game(GameParams::default())
        .expect("Create failed");
    let found = service.get_game(*game.id()).expect("Lookup failed");
    assert_eq!(found, Some(game));
}

#[test]
fn test_guess_scores_and_keeps_playing() {
    let (_store, service) = setup(vec![1, 3, 5, 3]);
    let mut game = service
        .create_game(GameParams::default())
        .expect("Create failed");

    let guess = service
        .submit_guess(&mut game, &[3, 1, 5, 0])
        .expect("Guess failed");

    assert_eq!(*guess.score().correct_position(), 1);
    assert_eq!(*guess.score().correct_color(), 2);
    assert_eq!(*guess.game_id(), *game.id());
    assert_eq!(*game.status(), GameStatus::Started);
    assert_eq!(game.guesses().len(), 1);
    assert_eq!(game.guesses()[0], guess);
}

#[test]
fn test_first_guess_can_win() {
    let (_store, service) = setup(vec![1, 2, 3, 4]);
    let mut game = service
        .create_game(GameParams::default())
        .expect("Create failed");

    service
        .submit_guess(&mut game, &[1, 2, 3, 4])
        .expect("Guess failed");

    assert_eq!(*game.status(), GameStatus::Finished);
    assert_eq!(*game.winner(), Some(Winner::Codebreaker));
    assert_eq!(*game.finished_at(), Some(noon()));
}

#[test]
fn test_running_out_of_guesses_loses() {
    let (_store, service) = setup(vec![1, 2, 3, 4]);
    let mut game = service
        .create_game(GameParams::new(4, 6, 3))
        .expect("Create failed");

    for i in 0..3 {
        assert_eq!(*game.status(), GameStatus::Started, "finished early at {i}");
        service
            .submit_guess(&mut game, &[0, 0, 0, 0])
            .expect("Guess failed");
    }

    assert_eq!(*game.status(), GameStatus::Finished);
    assert_eq!(*game.winner(), Some(Winner::Codemaker));
    assert_eq!(game.guesses().len(), 3);
}

#[test]
fn test_winning_on_last_guess_favors_codebreaker() {
    let (_store, service) = setup(vec![1, 2, 3, 4]);
    let mut game = service
        .create_game(GameParams::new(4, 6, 2))
        .expect("Create failed");

    service
        .submit_guess(&mut game, &[0, 0, 0, 0])
        .expect("Guess failed");
    service
        .submit_guess(&mut game, &[1, 2, 3, 4])
        .expect("Guess failed");

    assert_eq!(*game.winner(), Some(Winner::Codebreaker));
}

#[test]
fn test_guess_on_finished_game_rejected() {
    let (store, service) = setup(vec![1, 2, 3, 4]);
    let mut game = service
        .create_game(GameParams::default())
        .expect("Create failed");
    service
        .submit_guess(&mut game, &[1, 2, 3, 4])
        .expect("Guess failed");

    let result = service.submit_guess(&mut game, &[1, 2, 3, 4]);
    assert_eq!(result, Err(GameError::GameFinished(*game.id())));

    let stored = store
        .find_game(*game.id())
        .expect("Lookup failed")
        .expect("Game missing");
    assert_eq!(stored.guesses().len(), 1);
}

#[test]
fn test_stale_copy_cannot_guess_after_finish() {
    let (_store, service) = setup(vec![1, 2, 3, 4]);
    let mut game = service
        .create_game(GameParams::default())
        .expect("Create failed");
    let mut stale = game.clone();

    service
        .submit_guess(&mut game, &[1, 2, 3, 4])
        .expect("Guess failed");

    let result = service.submit_guess(&mut stale, &[0, 0, 0, 0]);
    assert!(matches!(result, Err(GameError::GameFinished(_))));
}

#[test]
fn test_invalid_guesses_leave_game_unchanged() {
    let (store, service) = setup(vec![1, 2, 3, 4]);
    let mut game = service
        .create_game(GameParams::default())
        .expect("Create failed");
    let before = game.clone();

    let candidates: [&[i32]; 5] = [&[], &[2, 3], &[7, 7, 7, 7], &[-1, 0, 0, 0], &[1, 2, 3, 4, 5]];
    for candidate in candidates {
        let result = service.submit_guess(&mut game, candidate);
        assert!(
            matches!(result, Err(GameError::InvalidGuess(_))),
            "{candidate:?} should be rejected"
        );
    }

    assert_eq!(game, before);
    let stored = store
        .find_game(*game.id())
        .expect("Lookup failed")
        .expect("Game missing");
    assert_eq!(stored, before);
}

#[test]
fn test_view_hides_secret_until_finished() {
    let (_store, service) = setup(vec![1, 2, 3, 4]);
    let mut game = service
        .create_game(GameParams::default())
        .expect("Create failed");
    service
        .submit_guess(&mut game, &[4, 3, 2, 1])
        .expect("Guess failed");

    let json = serde_json::to_value(game.view()).expect("Serialize failed");
    assert!(json.get("secret").is_none());
    assert_eq!(json["status"], "STARTED");
    assert!(json["winner"].is_null());
    assert_eq!(json["guesses"][0]["correct_color"], 4);

    service
        .submit_guess(&mut game, &[1, 2, 3, 4])
        .expect("Guess failed");

    let json = serde_json::to_value(game.view()).expect("Serialize failed");
    assert_eq!(json["secret"], serde_json::json!([1, 2, 3, 4]));
    assert_eq!(json["status"], "FINISHED");
    assert_eq!(json["winner"], "CODEBREAKER");
    assert_eq!(json["guesses"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_delete_game_removes_guesses() {
    let (store, service) = setup(vec![1, 2, 3, 4]);
    let mut game = service
        .create_game(GameParams::default())
        .expect("Create failed");
    service
        .submit_guess(&mut game, &[0, 0, 0, 0])
        .expect("Guess failed");

    assert!(service.delete_game(*game.id()).expect("Delete failed"));
    assert!(!service.delete_game(*game.id()).expect("Delete failed"));
    assert!(store.is_empty());
}

#[test]
fn test_concurrent_guesses_respect_limit() {
    let (store, service) = setup(vec![1, 2, 3, 4]);
    let game = service
        .create_game(GameParams::new(4, 6, 3))
        .expect("Create failed");

    let accepted: usize = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let service = &service;
                let mut copy = game.clone();
                scope.spawn(move || service.submit_guess(&mut copy, &[0, 0, 0, 0]).is_ok())
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("Thread panicked"))
            .filter(|ok| *ok)
            .count()
    });

    assert_eq!(accepted, 3);
    let stored = store
        .find_game(*game.id())
        .expect("Lookup failed")
        .expect("Game missing");
    assert_eq!(stored.guesses().len(), 3);
    assert_eq!(*stored.winner(), Some(Winner::Codemaker));
}

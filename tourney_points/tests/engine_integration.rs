//! Integration tests for the points engine over the in-memory store.
//!
//! Covers the full fund → announce → join → settle lifecycle, the
//! all-or-nothing join check, exactly-once settlement, seeded random
//! selection, concurrent compound operations, and the documented behavior
//! when the store fails mid-commit.

use std::sync::Arc;

use tourney_points::db::MemoryStore;
use tourney_points::{
    Entry, ErrorKind, PointsEngine, PointsError, RandomSelector, TournamentStatus,
};

fn engine_with_store(seed: u64) -> (PointsEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = PointsEngine::with_selector(store.clone(), RandomSelector::seeded(seed));
    (engine, store)
}

fn backers(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

async fn balance(engine: &PointsEngine, player: &str) -> i64 {
    engine.balance(player).await.unwrap().balance
}

#[tokio::test]
async fn test_leader_and_backer_round_trip() {
    let (engine, store) = engine_with_store(1);

    engine.fund("A", 1000).await.unwrap();
    engine.fund("B", 1000).await.unwrap();
    engine.announce("T1", 200).await.unwrap();

    let records = engine.join("T1", "A", &backers(&["B"])).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(balance(&engine, "A").await, 900);
    assert_eq!(balance(&engine, "B").await, 900);

    let joinings = store.joinings();
    assert_eq!(joinings.len(), 2);
    assert!(joinings.iter().all(|r| r.leader_id() == "A" && r.contributed == 100));
    assert_eq!(joinings[0].entry, Entry::Leader);
    assert_eq!(
        joinings[1].entry,
        Entry::Backer {
            leader_id: "A".to_string()
        }
    );

    let report = engine.result(Some("T1"), Some("A")).await.unwrap();
    assert_eq!(report.tournament_id, "T1");
    assert_eq!(report.winner_id, "A");
    assert_eq!(report.prize, 200);
    assert_eq!(report.profit, 100);

    assert_eq!(balance(&engine, "A").await, 1000);
    assert_eq!(balance(&engine, "B").await, 1000);
    assert!(store.joinings().is_empty());

    let tournament = engine.tournament("T1").await.unwrap();
    assert_eq!(tournament.status(), TournamentStatus::Finished);
    assert_eq!(tournament.winner_id.as_deref(), Some("A"));

    let err = engine.result(Some("T1"), Some("A")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_insufficient_leader_aborts_whole_group() {
    let (engine, store) = engine_with_store(1);

    engine.fund("L", 50).await.unwrap();
    engine.fund("B1", 500).await.unwrap();
    engine.fund("B2", 500).await.unwrap();
    engine.announce("T1", 300).await.unwrap();

    let err = engine
        .join("T1", "L", &backers(&["B1", "B2"]))
        .await
        .unwrap_err();
    match err {
        PointsError::InsufficientFunds {
            player_id,
            available,
            required,
        } => {
            assert_eq!(player_id, "L");
            assert_eq!(available, 50);
            assert_eq!(required, 100);
        }
        other => panic!("expected insufficient funds, got {other:?}"),
    }

    assert_eq!(balance(&engine, "L").await, 50);
    assert_eq!(balance(&engine, "B1").await, 500);
    assert_eq!(balance(&engine, "B2").await, 500);
    assert!(store.joinings().is_empty());
}

#[tokio::test]
async fn test_losing_groups_fund_the_winner() {
    let (engine, store) = engine_with_store(5);

    for player in ["A", "B", "C", "D", "E"] {
        engine.fund(player, 1000).await.unwrap();
    }
    engine.announce("T1", 400).await.unwrap();
    engine.join("T1", "A", &backers(&["B"])).await.unwrap();
    engine.join("T1", "C", &backers(&["D", "E"])).await.unwrap();
    engine.fund("F", 400).await.unwrap();
    engine.join("T1", "F", &[]).await.unwrap();

    let report = engine.result(Some("T1"), Some("C")).await.unwrap();
    assert_eq!(report.prize, 1200);
    assert_eq!(report.profit, 400);
    assert_eq!(report.acquirers, vec!["C", "D", "E"]);

    assert_eq!(balance(&engine, "A").await, 800);
    assert_eq!(balance(&engine, "B").await, 800);
    for player in ["C", "D", "E"] {
        assert_eq!(balance(&engine, player).await, 1000 - 133 + 400);
    }
    assert_eq!(balance(&engine, "F").await, 0);
    assert!(store.joinings().is_empty());
}

#[tokio::test]
async fn test_random_settlement_is_reproducible() {
    async fn run(seed: u64) -> (String, String) {
        let (engine, _) = engine_with_store(seed);
        for player in ["A", "B", "C", "D"] {
            engine.fund(player, 10_000).await.unwrap();
        }
        for tournament in ["T1", "T2", "T3"] {
            engine.announce(tournament, 100).await.unwrap();
            for player in ["A", "B", "C", "D"] {
                engine.join(tournament, player, &[]).await.unwrap();
            }
        }
        let report = engine.result(None, None).await.unwrap();
        (report.tournament_id, report.winner_id)
    }

    for seed in [3, 11, 2024] {
        assert_eq!(run(seed).await, run(seed).await);
    }
}

#[tokio::test]
async fn test_random_settlement_only_picks_open_candidates() {
    let (engine, _) = engine_with_store(8);

    engine.fund("A", 1000).await.unwrap();
    engine.announce("T1", 100).await.unwrap();
    engine.announce("T2", 100).await.unwrap();
    engine.join("T1", "A", &[]).await.unwrap();

    // T2 has no entrants, so only T1 qualifies
    let report = engine.result(None, None).await.unwrap();
    assert_eq!(report.tournament_id, "T1");
    assert_eq!(report.winner_id, "A");

    let err = engine.result(None, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyCandidateSet);
}

#[tokio::test]
async fn test_concurrent_settlements_pay_once() {
    let (engine, _) = engine_with_store(1);

    engine.fund("A", 100).await.unwrap();
    engine.fund("B", 100).await.unwrap();
    engine.announce("T1", 100).await.unwrap();
    engine.join("T1", "A", &[]).await.unwrap();
    engine.join("T1", "B", &[]).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine.result(Some("T1"), Some("A")).await
        }));
    }

    let mut paid = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => paid += 1,
            Err(err) => assert_eq!(err.kind(), ErrorKind::Conflict),
        }
    }

    assert_eq!(paid, 1);
    assert_eq!(balance(&engine, "A").await, 200);
    assert_eq!(balance(&engine, "B").await, 0);
}

#[tokio::test]
async fn test_concurrent_joins_never_overdraw() {
    let (engine, store) = engine_with_store(1);

    engine.fund("shared", 250).await.unwrap();
    for i in 0..10 {
        engine.fund(&format!("L{i}"), 1000).await.unwrap();
        engine.announce(&format!("T{i}"), 200).await.unwrap();
    }

    let mut handles = Vec::new();
    for i in 0..10 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .join(&format!("T{i}"), &format!("L{i}"), &["shared".to_string()])
                .await
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(err) => assert_eq!(err.kind(), ErrorKind::InsufficientFunds),
        }
    }

    assert_eq!(admitted, 2);
    assert_eq!(balance(&engine, "shared").await, 50);
    assert_eq!(store.joinings().len(), 4);
}

#[tokio::test]
async fn test_concurrent_double_join_admits_one() {
    let (engine, store) = engine_with_store(1);

    engine.fund("A", 10_000).await.unwrap();
    engine.announce("T1", 100).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move { engine.join("T1", "A", &[]).await }));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(balance(&engine, "A").await, 9_900);
    assert_eq!(store.joinings().len(), 1);
}

#[tokio::test]
async fn test_store_failure_mid_join_is_not_rolled_back() {
    let (engine, store) = engine_with_store(1);

    engine.fund("A", 1000).await.unwrap();
    engine.fund("B", 1000).await.unwrap();
    engine.fund("C", 1000).await.unwrap();
    engine.announce("T1", 300).await.unwrap();

    // A: debit + insert, B: debit + insert, C: debit fails
    store.fail_writes_after(4);
    let err = engine
        .join("T1", "A", &backers(&["B", "C"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    assert_eq!(err.client_message(), "Storage temporarily unavailable");

    store.heal();
    assert_eq!(balance(&engine, "A").await, 900);
    assert_eq!(balance(&engine, "B").await, 900);
    assert_eq!(balance(&engine, "C").await, 1000);
    assert_eq!(store.joinings().len(), 2);
}

#[tokio::test]
async fn test_validation_precedes_mutation() {
    let (engine, store) = engine_with_store(1);

    engine.fund("A", 100).await.unwrap();
    engine.announce("T1", 100).await.unwrap();

    assert_eq!(
        engine.fund("A", -1).await.unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        engine.announce("T2", -5).await.unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        engine.announce("T1", 5).await.unwrap_err().kind(),
        ErrorKind::Conflict
    );
    assert_eq!(
        engine.join("", "A", &[]).await.unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        engine.result(Some("missing"), None).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );

    assert_eq!(balance(&engine, "A").await, 100);
    assert!(store.joinings().is_empty());
}

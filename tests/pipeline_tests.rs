mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use polywatch::db::TradeStore;
use polywatch::models::{Alert, AlertKind, Position};

use common::{
    build_pipeline, make_trade, memory_store, test_detection_config, FailingStore,
    RecordingChannel, ScriptedFeed,
};

#[tokio::test]
async fn test_first_large_trade_creates_wallet_and_alerts_once() {
    let store = memory_store();
    let feed = ScriptedFeed::new();
    let channel = RecordingChannel::ok("recorder");
    let pipeline = build_pipeline(store.clone(), feed, channel.clone(), test_detection_config());

    let first = make_trade("0xA", 1_000, Decimal::new(9, 1), Utc::now());
    let alerts = pipeline.process_trade(&first).await;

    assert_eq!(alerts.len(), 1);
    match &alerts[0] {
        Alert::NewWalletLargeBet { wallet, amount, .. } => {
            assert_eq!(wallet, "0xA");
            assert_eq!(*amount, Decimal::from(900));
        }
        other => panic!("expected new wallet alert, got {other:?}"),
    }

    let wallet = store
        .find_wallet("0xA")
        .await
        .expect("store should succeed")
        .expect("wallet should exist");
    assert_eq!(wallet.first_seen, first.timestamp);
    assert_eq!(store.wallet_count().await, 1);
    assert_eq!(store.trade_count().await, 1);

    // A second trade, large or small, never re-triggers the new-wallet alert.
    let second = make_trade("0xA", 5_000, Decimal::new(9, 1), Utc::now());
    let third = make_trade("0xA", 1, Decimal::new(1, 1), Utc::now());
    let mut later = pipeline.process_trade(&second).await;
    later.extend(pipeline.process_trade(&third).await);

    assert!(later.iter().all(|a| a.kind() != AlertKind::NewWalletLargeBet));
    assert!(later.iter().any(|a| a.kind() == AlertKind::YoungWalletLargeBet));
    assert_eq!(store.wallet_count().await, 1);

    let delivered = channel.alerts();
    assert_eq!(
        delivered
            .iter()
            .filter(|a| a.kind() == AlertKind::NewWalletLargeBet)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_small_trade_is_recorded_but_creates_no_wallet() {
    let store = memory_store();
    let pipeline = build_pipeline(
        store.clone(),
        ScriptedFeed::new(),
        RecordingChannel::ok("recorder"),
        test_detection_config(),
    );

    let trade = make_trade("0xSMALL", 100, Decimal::new(5, 1), Utc::now());
    let alerts = pipeline.process_trade(&trade).await;

    assert!(alerts.is_empty());
    assert_eq!(store.trade_count().await, 1);
    assert!(store.find_wallet("0xSMALL").await.unwrap().is_none());
}

#[tokio::test]
async fn test_rapid_accumulation_fires_per_qualifying_trade() {
    let store = memory_store();
    let channel = RecordingChannel::ok("recorder");
    let pipeline = build_pipeline(
        store.clone(),
        ScriptedFeed::new(),
        channel.clone(),
        test_detection_config(),
    );

    // Older trade outside the 24h window does not count.
    let stale = make_trade("0xR", 40_000, Decimal::new(5, 1), Utc::now() - Duration::hours(30));
    store.insert_trade(&stale).await.unwrap();

    // 4 × 12_500 = 50_000 reaches the threshold on the fourth trade, and the
    // fifth trade re-triggers independently.
    let mut rapid_counts = Vec::new();
    for i in 0..5 {
        let trade = make_trade(
            "0xR",
            25_000,
            Decimal::new(5, 1),
            Utc::now() - Duration::minutes(10 - i),
        );
        let alerts = pipeline.process_trade(&trade).await;
        rapid_counts.push(
            alerts
                .iter()
                .filter(|a| a.kind() == AlertKind::RapidAccumulation)
                .count(),
        );
    }

    assert_eq!(rapid_counts, vec![0, 0, 0, 1, 1]);

    let last_rapid = channel
        .alerts()
        .into_iter()
        .filter(|a| a.kind() == AlertKind::RapidAccumulation)
        .last()
        .expect("rapid alert delivered");
    match last_rapid {
        Alert::RapidAccumulation { amount, trade_count, timeframe, .. } => {
            assert_eq!(amount, Decimal::from(62_500));
            assert_eq!(trade_count, 5);
            assert_eq!(timeframe, "24 hours");
        }
        other => panic!("expected rapid accumulation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_concentrated_position_alert() {
    let feed = ScriptedFeed::new();
    feed.set_positions(
        "0xC",
        vec![
            Position { market_title: "Main bet".into(), current_value: Decimal::from(60) },
            Position { market_title: "Hedge".into(), current_value: Decimal::from(30) },
            Position { market_title: "Lottery".into(), current_value: Decimal::from(10) },
        ],
    );
    let pipeline = build_pipeline(
        memory_store(),
        feed,
        RecordingChannel::ok("recorder"),
        test_detection_config(),
    );

    let trade = make_trade("0xC", 10, Decimal::new(5, 1), Utc::now());
    let alerts = pipeline.process_trade(&trade).await;

    assert_eq!(alerts.len(), 1);
    match &alerts[0] {
        Alert::ConcentratedBet { market, concentration, amount, .. } => {
            assert_eq!(market, "Main bet");
            assert_eq!(concentration, "60.0%");
            assert_eq!(*amount, Decimal::from(60));
        }
        other => panic!("expected concentrated bet, got {other:?}"),
    }
}

#[tokio::test]
async fn test_one_trade_can_raise_several_kinds() {
    let feed = ScriptedFeed::new();
    feed.set_positions(
        "0xM",
        vec![Position { market_title: "Only market".into(), current_value: Decimal::from(60_000) }],
    );
    let pipeline = build_pipeline(
        memory_store(),
        feed,
        RecordingChannel::ok("recorder"),
        test_detection_config(),
    );

    let trade = make_trade("0xM", 100_000, Decimal::new(6, 1), Utc::now());
    let kinds: Vec<AlertKind> = pipeline
        .process_trade(&trade)
        .await
        .iter()
        .map(Alert::kind)
        .collect();

    assert_eq!(
        kinds,
        vec![
            AlertKind::NewWalletLargeBet,
            AlertKind::RapidAccumulation,
            AlertKind::ConcentratedBet,
        ]
    );
}

#[tokio::test]
async fn test_store_failures_do_not_abort_other_rules() {
    let feed = ScriptedFeed::new();
    feed.set_positions(
        "0xF",
        vec![Position { market_title: "All in".into(), current_value: Decimal::from(100) }],
    );
    let pipeline = build_pipeline(
        Arc::new(FailingStore),
        feed,
        RecordingChannel::ok("recorder"),
        test_detection_config(),
    );

    let trade = make_trade("0xF", 10_000, Decimal::new(9, 1), Utc::now());
    let alerts = pipeline.process_trade(&trade).await;

    // Wallet status is unknown and the window is empty, but the
    // concentration rule still runs.
    let kinds: Vec<AlertKind> = alerts.iter().map(Alert::kind).collect();
    assert_eq!(kinds, vec![AlertKind::ConcentratedBet]);
}

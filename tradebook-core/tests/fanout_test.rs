use chrono::{Duration, TimeZone, Utc};
use tradebook::{Trade, TradeId, TradeType};
use tradebook_core::catalog::{bootstrap, POSITIONS_BY_ACCOUNT};
use tradebook_core::config::{GeneratorConfig, PositionUpdateMode};
use tradebook_core::fanout::{TradeProjection, TradeWriter};
use tradebook_core::generator::RecordGenerator;
use tradebook_core::pager::QueryWalker;
use tradebook_core::queries::{positions_for_account, TradeFilter};
use tradebook_core::records::{position_from_row, trade_from_row};
use tradebook_core::store::testing::FaultySession;
use tradebook_core::store::{MemorySession, Select, Session, Value};
use tradebook_core::WriteError;

fn store() -> MemorySession {
    let session = MemorySession::new("tradebook");
    bootstrap(&session, 1).unwrap();
    session
}

fn generator() -> RecordGenerator<tradebook_core::generator::MarketFaker> {
    RecordGenerator::from_config(GeneratorConfig {
        seed: Some(2024),
        ..GeneratorConfig::default()
    })
}

#[test]
fn test_generated_trades_are_identical_in_every_projection() {
    let session = store();
    let writer = TradeWriter::new(&session, PositionUpdateMode::ReadModifyWrite);
    let mut generator = generator();
    let account = generator.generate_account("alice");

    let trades: Vec<Trade> = (0..25)
        .map(|_| generator.generate_trade(account.account_number()))
        .collect();
    for trade in &trades {
        writer.record_trade(trade).unwrap();
        assert_eq!(trade.amount(), trade.shares() as f64 * trade.price());
    }

    let walker = QueryWalker::new(&session);
    for projection in TradeProjection::ALL {
        let select = Select::new(projection.table())
            .where_eq("account", Value::text(account.account_number()));
        let mut stored: Vec<Trade> = walker
            .collect(select, 7)
            .unwrap()
            .iter()
            .map(|row| trade_from_row(row).unwrap())
            .collect();
        stored.sort_by_key(|t| t.trade_id());
        assert_eq!(stored, trades, "{}", projection);
    }
}

#[test]
fn test_position_quantity_counts_trades() {
    let session = store();
    let writer = TradeWriter::new(&session, PositionUpdateMode::ReadModifyWrite);
    let mut generator = generator();
    let account = generator.generate_account("bob");

    let mut expected = std::collections::HashMap::new();
    for _ in 0..60 {
        let trade = generator.generate_trade(account.account_number());
        writer.record_trade(&trade).unwrap();
        *expected.entry(trade.symbol().to_string()).or_insert(0i64) += 1;
    }

    let walker = QueryWalker::new(&session);
    let positions = walker
        .collect(positions_for_account(account.account_number()), 10)
        .unwrap();
    assert_eq!(positions.len(), expected.len());
    for row in &positions {
        let position = position_from_row(row).unwrap();
        assert_eq!(Some(&position.quantity()), expected.get(position.symbol()));
    }
}

#[test]
fn test_round_trip_through_date_projection() {
    let session = store();
    let writer = TradeWriter::new(&session, PositionUpdateMode::ReadModifyWrite);
    let at = Utc.with_ymd_and_hms(2024, 3, 14, 15, 9, 26).unwrap();
    let trade = Trade::new("acc-9", TradeId::from_datetime(at), TradeType::Sell, "GE", 12, 101.25);
    writer.record_trade(&trade).unwrap();
    writer
        .record_trade(&Trade::new(
            "acc-9",
            TradeId::from_datetime(at + Duration::days(3)),
            TradeType::Sell,
            "GE",
            1,
            1.0,
        ))
        .unwrap();

    let filter = TradeFilter::for_account("acc-9").between(
        TradeId::from_datetime(at - Duration::hours(1)),
        TradeId::from_datetime(at + Duration::hours(1)),
    );
    assert_eq!(filter.projection(), TradeProjection::ByDate);
    let rows = QueryWalker::new(&session).collect(filter.to_select(), 10).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(trade_from_row(&rows[0]).unwrap(), trade);
}

#[test]
fn test_partial_fan_out_is_left_in_place() {
    let faulty = FaultySession::new(store());
    faulty.fail_writes_to("trades_by_a_td");
    let writer = TradeWriter::new(&faulty, PositionUpdateMode::ReadModifyWrite);
    let trade = Trade::new("acc", TradeId::from_micros(5), TradeType::Buy, "KO", 3, 60.0);

    match writer.record_trade(&trade) {
        Err(WriteError::Store { table, .. }) => assert_eq!(table, "trades_by_a_td"),
        other => panic!("expected a write error, got {:?}", other),
    }
    let written: Vec<u64> = TradeProjection::ALL
        .iter()
        .map(|p| faulty.count(p.table()).unwrap())
        .collect();
    assert_eq!(written, vec![1, 1, 1, 0]);
    assert_eq!(faulty.count(POSITIONS_BY_ACCOUNT).unwrap(), 0);
}

#[test]
fn test_typed_and_symbol_filters_read_their_projection() {
    let session = store();
    let writer = TradeWriter::new(&session, PositionUpdateMode::CompareAndSet);
    let rows = [
        (1, TradeType::Buy, "IBM"),
        (2, TradeType::Sell, "IBM"),
        (3, TradeType::Buy, "KO"),
        (4, TradeType::Buy, "IBM"),
    ];
    for (id, side, symbol) in rows {
        writer
            .record_trade(&Trade::new("acc", TradeId::from_micros(id), side, symbol, 1, 2.0))
            .unwrap();
    }

    let walker = QueryWalker::new(&session);
    let ids = |filter: TradeFilter| -> Vec<i64> {
        walker
            .collect(filter.to_select(), 10)
            .unwrap()
            .iter()
            .map(|r| trade_from_row(r).unwrap().trade_id().as_micros())
            .collect()
    };
    let range = TradeFilter::for_account("acc").between(TradeId::from_micros(0), TradeId::from_micros(4));

    assert_eq!(ids(range.clone()), vec![3, 2, 1]);
    assert_eq!(ids(range.clone().of_type(TradeType::Buy)), vec![3, 1]);
    assert_eq!(ids(range.clone().on_symbol("IBM")), vec![2, 1]);
    assert_eq!(ids(range.of_type(TradeType::Buy).on_symbol("IBM")), vec![1]);
    assert_eq!(ids(TradeFilter::for_account("acc")), vec![4, 3, 2, 1]);
}

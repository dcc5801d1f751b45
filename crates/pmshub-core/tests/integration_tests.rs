//! Dataset behavior through the crate-root API.

use pmshub_core::{
    BenchmarkSeries, CashflowEvent, ClientId, ClientRecord, Dataset, Date, FlowDirection, MergeMode,
    PortfolioSnapshot, Reconciliation, RmId, SnapshotSeries,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

#[test]
fn test_root_exports_cover_the_model() {
    let id = ClientId::new("C1");
    let mut record = ClientRecord::new(id.clone(), "Asha Rao");
    record.rm_id = Some(RmId::new("RM01"));

    let mut ds = Dataset::new();
    ds.upsert_client(record, MergeMode::Merge);
    ds.upsert_snapshot(PortfolioSnapshot::new(id.clone(), date(2024, 1, 31), dec!(100)), MergeMode::Merge);
    ds.upsert_cashflow(CashflowEvent::new(id.clone(), date(2024, 1, 10), dec!(-5)), MergeMode::Merge);

    let series = SnapshotSeries::from_snapshots(ds.snapshots(&id).to_vec()).unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(ds.cashflows(&id)[0].direction(), FlowDirection::Withdrawal);
    assert_eq!(ds.client(&id).unwrap().rm_id, Some(RmId::new("RM01")));

    let bench = BenchmarkSeries::new("NIFTY 50", vec![(date(2024, 1, 31), 21_000.0)]).unwrap();
    assert_eq!(bench.len(), 1);
}

#[test]
fn test_field_merge_after_derivation_is_not_flagged() {
    let id = ClientId::new("C1");
    let d = date(2024, 3, 31);
    let tolerance = Decimal::new(1, 2);

    let mut ds = Dataset::new();
    ds.upsert_snapshot(
        PortfolioSnapshot::new(id.clone(), d, dec!(150)).with_corpus(Some(dec!(100)), Some(dec!(0)), None, None),
        MergeMode::Merge,
    );
    ds.snapshot_mut(&id, d).unwrap().reconcile(tolerance).unwrap();

    ds.upsert_snapshot(
        PortfolioSnapshot::new(id.clone(), d, dec!(150)).with_corpus(None, Some(dec!(50)), None, None),
        MergeMode::Merge,
    );
    let snapshot = ds.snapshot_mut(&id, d).unwrap();
    snapshot.reconcile(tolerance).unwrap();
    assert_eq!(snapshot.net_corpus, Some(dec!(150)));
    assert_eq!(snapshot.reconciliation, Reconciliation::Derived);
    assert_eq!(ds.flagged_snapshots().count(), 0);
}

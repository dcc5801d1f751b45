//! Property-based tests for amount parsing and row accounting.

use proptest::prelude::*;
use rust_decimal::Decimal;

use pmshub_core::MergeMode;
use pmshub_loader::coerce::parse_amount;
use pmshub_loader::prelude::*;

/// Indian-style digit grouping: last three digits, then pairs.
fn group_indian(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<String> = head
        .as_bytes()
        .rchunks(2)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect();
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("n/a".to_string()),
        "[0-9]{1,7}",
        "-?[0-9]{1,5}\\.[0-9]{2}",
        "20[0-9]{2}-[01][0-9]-[0-3][0-9]",
        "[A-Za-z ]{0,12}",
    ]
}

proptest! {
    #[test]
    fn prop_formatted_amounts_parse(whole in 0u64..10_000_000_000, paise in 0u32..100, negative in any::<bool>()) {
        let expected = Decimal::new((whole * 100 + u64::from(paise)) as i64, 2);
        let body = format!("{}.{paise:02}", group_indian(whole));

        prop_assert_eq!(parse_amount(&format!("₹{body}")), Some(expected));
        prop_assert_eq!(parse_amount(&format!("Rs. {body}")), Some(expected));
        if negative {
            prop_assert_eq!(parse_amount(&format!("({body})")), Some(-expected));
            prop_assert_eq!(parse_amount(&format!("-{body}")), Some(-expected));
        }
    }

    #[test]
    fn prop_every_row_is_accounted_for(
        cells in prop::collection::vec((cell(), cell(), cell(), cell()), 0..40),
        mode in prop_oneof![Just(MergeMode::Overwrite), Just(MergeMode::Merge), Just(MergeMode::SkipDuplicates)],
    ) {
        let rows: Vec<RawRow> = cells
            .iter()
            .enumerate()
            .map(|(i, (id, date, aum, corpus))| {
                RawRow::new(format!("r{i}"))
                    .with("CLIENT ID", RawValue::from_field(id))
                    .with("AS OF DATE", RawValue::from_field(date))
                    .with("CURRENT AUM", RawValue::from_field(aum))
                    .with("INITIAL CORPUS", RawValue::from_field(corpus))
            })
            .collect();

        let sink = MemoryAuditSink::new();
        let config = MappingConfig::new(SourceKind::Upload).with_merge_mode(mode);
        let report = load_with_audit(&rows, &config, &sink).unwrap();

        prop_assert_eq!(report.rows(), rows.len());
        prop_assert_eq!(sink.len(), rows.len());
        prop_assert_eq!(sink.count(AuditOutcome::Rejected), report.rejected.len());
        prop_assert!(report.dataset.snapshot_count() <= report.accepted);
    }
}

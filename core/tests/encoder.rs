use campaign_core::{
    encoder::{encode_batch, encode_for_schema, RawRecord, Schema},
    types::CandidateCampaign,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn schema(names: &[&str]) -> Schema {
    Schema::new(names.iter().map(|s| s.to_string()).collect())
}

fn candidate(campaign_type: &str, offer_type: &str, target: &str) -> CandidateCampaign {
    CandidateCampaign {
        campaign_type:  campaign_type.into(),
        offer_type:     offer_type.into(),
        target_segment: target.into(),
        discount_pct:   15.0,
        budget:         5000.0,
        target_size:    200,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

/// Features missing from the record are zero-filled, in schema order.
#[test]
fn missing_features_are_zero_filled() {
    let s = schema(&["campaign_type_Email", "campaign_type_SMS", "budget"]);
    let record = RawRecord::new().numeric("budget", 500.0);
    assert_eq!(encode_for_schema(&record, &s), vec![0.0, 0.0, 500.0]);
}

/// A category never seen in training produces all-zero indicators, no error.
#[test]
fn unknown_category_encodes_to_zeros() {
    let s = schema(&["campaign_type_Email", "campaign_type_SMS", "budget"]);
    let record = RawRecord::new()
        .categorical("campaign_type", "Carrier Pigeon")
        .numeric("budget", 10.0);
    assert_eq!(encode_for_schema(&record, &s), vec![0.0, 0.0, 10.0]);
}

/// Record features the schema does not name are dropped; width never changes.
#[test]
fn extra_features_are_dropped() {
    let s = schema(&["budget"]);
    let record = RawRecord::new()
        .numeric("budget", 3.0)
        .numeric("duration_days", 14.0)
        .categorical("offer_type", "Gift");
    let row = encode_for_schema(&record, &s);
    assert_eq!(row, vec![3.0]);
}

#[test]
fn output_width_always_matches_schema() {
    let s = Schema::from_records(&[
        RawRecord::from(&candidate("Email", "Gift", "All")),
        RawRecord::from(&candidate("SMS", "Bundle", "Young")),
    ]);
    for c in [
        candidate("Email", "Gift", "All"),
        candidate("Push", "Cashback", "Frequent"),
    ] {
        assert_eq!(encode_for_schema(&RawRecord::from(&c), &s).len(), s.len());
    }
    assert_eq!(encode_for_schema(&RawRecord::new(), &s), vec![0.0; s.len()]);
}

/// Schema order is first-seen order over the expanded keys.
#[test]
fn schema_preserves_first_seen_order() {
    let s = Schema::from_records(&[
        RawRecord::new().categorical("campaign_type", "SMS").numeric("budget", 1.0),
        RawRecord::new().categorical("campaign_type", "Email").numeric("budget", 2.0),
    ]);
    assert_eq!(
        s.features(),
        &["campaign_type_SMS", "budget", "campaign_type_Email"]
    );
}

#[test]
fn candidate_expands_into_indicators_and_numerics() {
    let s = Schema::from_records(&[RawRecord::from(&candidate("Email", "Gift", "All"))]);
    assert_eq!(
        s.features(),
        &[
            "campaign_type_Email",
            "offer_type_Gift",
            "target_segment_All",
            "discount_pct",
            "budget",
            "target_size",
        ]
    );
    let row = encode_for_schema(&RawRecord::from(&candidate("Email", "Gift", "All")), &s);
    assert_eq!(row, vec![1.0, 1.0, 1.0, 15.0, 5000.0, 200.0]);
}

#[test]
fn batch_encoding_matches_single_record_encoding() {
    let records = vec![
        RawRecord::from(&candidate("Email", "Gift", "All")),
        RawRecord::from(&candidate("Social", "Bundle", "Frequent")),
        RawRecord::from(&candidate("Direct Mail", "Discount", "HighIncome")),
    ];
    let s = Schema::from_records(&records[..2]);
    let batch = encode_batch(&records, &s);
    assert_eq!(batch.len(), records.len());
    for (record, row) in records.iter().zip(&batch) {
        assert_eq!(&encode_for_schema(record, &s), row);
    }
}

#[test]
fn schema_round_trips_through_json_as_a_plain_list() {
    let s = schema(&["a", "b"]);
    let json = serde_json::to_string(&s).unwrap();
    assert_eq!(json, r#"["a","b"]"#);
    let back: Schema = serde_json::from_str(&json).unwrap();
    assert_eq!(back.fingerprint(), s.fingerprint());
}

use serde_json::json;

use fido_sync::sheets::{
    column_letter, quote_tab, records_from_values, row_range, values_to_text,
};
use fido_sync_core::record::StoredDog;

#[test]
fn column_letters_roll_over_after_z() {
    assert_eq!(column_letter(1), "A");
    assert_eq!(column_letter(10), "J");
    assert_eq!(column_letter(26), "Z");
    assert_eq!(column_letter(27), "AA");
    assert_eq!(column_letter(52), "AZ");
}

#[test]
fn update_range_covers_position_plus_header() {
    assert_eq!(row_range("Current", 2, 10), "'Current'!A2:J2");
    assert_eq!(quote_tab("Bob's Dogs"), "'Bob''s Dogs'");
}

#[test]
fn unformatted_values_coerce_to_text() {
    let values = json!([
        ["Name", "Weight", "Manually_Edited"],
        ["Rex", 40, false],
        ["Ada", 12.5]
    ]);

    let rows = values_to_text(&values);

    assert_eq!(rows[1], vec!["Rex", "40", "false"]);
    assert_eq!(rows[2], vec!["Ada", "12.5"]);
    assert!(values_to_text(&json!(null)).is_empty());
}

#[test]
fn records_keep_positions_and_pad_short_rows() {
    let values = vec![
        vec!["Name".to_string(), "Their_Id".to_string(), "Manually_Edited".to_string()],
        vec!["Rex".to_string(), "1".to_string(), "false".to_string()],
        vec![],
        vec!["Ada".to_string()],
    ];

    let records = records_from_values(&values);

    assert_eq!(records.len(), 3);
    let rex = StoredDog::from_fields(&records[0]);
    assert_eq!(rex.record.name, "Rex");
    assert!(!rex.manually_edited);
    assert!(StoredDog::from_fields(&records[1]).record.key().is_none());
    assert_eq!(records[2]["Their_Id"], "");
    assert!(records_from_values(&[]).is_empty());
}

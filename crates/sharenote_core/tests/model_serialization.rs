use serde_json::json;
use sharenote_core::{ChangeKind, HistoryEntry, Note};
use uuid::Uuid;

#[test]
fn history_entry_serializes_operation_as_lowercase_id() {
    let entry = HistoryEntry {
        id: Uuid::nil(),
        note_id: Uuid::nil(),
        line_position: 2,
        old_text: Some("line2".to_string()),
        new_text: Some("line2 modified".to_string()),
        operation: ChangeKind::Update,
        updated_by: Uuid::nil(),
        updated_by_name: "ada".to_string(),
        created_at: 1_700_000_000_000,
    };

    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value["operation"], json!("update"));
    assert_eq!(value["line_position"], json!(2));
    assert_eq!(value["updated_by_name"], json!("ada"));

    let decoded: HistoryEntry = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, entry);
}

#[test]
fn change_kind_and_note_use_plain_wire_shapes() {
    let value = serde_json::to_value(ChangeKind::Add).unwrap();
    assert_eq!(value, json!("add"));

    let note = Note::new(Uuid::nil(), "Title", "body");
    let value = serde_json::to_value(&note).unwrap();
    assert_eq!(value["title"], json!("Title"));
    assert_eq!(value["shared_with"], json!([]));
}

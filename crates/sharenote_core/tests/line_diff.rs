use sharenote_core::diff::{apply_changes, compute_diff, split_lines, ChangeKind, ChangeRecord};

const SAMPLES: &[&str] = &[
    "",
    "single line",
    "a\nb\nc",
    "c\nb\na",
    "title\n\nbody one\nbody two\n",
    "shopping\n- milk\n- eggs",
    "shopping\n- oat milk\n- eggs\n- bread",
    "one\ntwo\nthree\nfour",
    "one\n2\nthree\nfour\nfive",
];

#[test]
fn identical_texts_produce_no_changes() {
    for text in SAMPLES {
        assert!(compute_diff(text, text).is_empty(), "text: {text:?}");
    }
}

#[test]
fn modified_last_line_is_one_update() {
    let changes = compute_diff("line1\nline2", "line1\nline2 modified");
    assert_eq!(
        changes,
        vec![ChangeRecord {
            position: 2,
            kind: ChangeKind::Update,
            old_text: Some("line2".to_string()),
            new_text: Some("line2 modified".to_string()),
        }]
    );
}

#[test]
fn appended_line_is_one_add_after_equal_positions() {
    let changes = compute_diff("a\nb", "a\nb\nc");
    assert_eq!(
        changes,
        vec![ChangeRecord {
            position: 3,
            kind: ChangeKind::Add,
            old_text: None,
            new_text: Some("c".to_string()),
        }]
    );
}

#[test]
fn removed_middle_line_keeps_alignment_position() {
    let changes = compute_diff("a\nb\nc", "a\nc");
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].position, 2);
    assert_eq!(changes[0].kind, ChangeKind::Delete);
    assert_eq!(changes[0].old_text.as_deref(), Some("b"));
    assert_eq!(changes[0].new_text, None);
}

#[test]
fn content_from_empty_is_all_adds_in_order() {
    let text = "first\nsecond\n\nfourth";
    let changes = compute_diff("", text);

    assert!(changes.iter().all(|change| change.kind == ChangeKind::Add));
    assert!(changes.iter().all(|change| change.old_text.is_none()));
    let added: Vec<&str> = changes
        .iter()
        .map(|change| change.new_text.as_deref().unwrap())
        .collect();
    assert_eq!(added, split_lines(text));
    let positions: Vec<u32> = changes.iter().map(|change| change.position).collect();
    assert_eq!(positions, vec![1, 2, 3, 4]);
}

#[test]
fn cleared_content_is_all_deletes_in_order() {
    let text = "alpha\nbeta\ngamma";
    let changes = compute_diff(text, "");

    assert!(changes.iter().all(|change| change.kind == ChangeKind::Delete));
    assert!(changes.iter().all(|change| change.new_text.is_none()));
    let removed: Vec<&str> = changes
        .iter()
        .map(|change| change.old_text.as_deref().unwrap())
        .collect();
    assert_eq!(removed, split_lines(text));
}

#[test]
fn replaying_changes_reconstructs_new_text() {
    for old_text in SAMPLES {
        for new_text in SAMPLES {
            let changes = compute_diff(old_text, new_text);
            assert_eq!(
                apply_changes(old_text, &changes),
                *new_text,
                "old: {old_text:?} new: {new_text:?}"
            );
        }
    }
}

#[test]
fn text_fields_match_operation_kind() {
    for old_text in SAMPLES {
        for new_text in SAMPLES {
            for change in compute_diff(old_text, new_text) {
                match change.kind {
                    ChangeKind::Add => {
                        assert!(change.old_text.is_none() && change.new_text.is_some())
                    }
                    ChangeKind::Delete => {
                        assert!(change.old_text.is_some() && change.new_text.is_none())
                    }
                    ChangeKind::Update => {
                        assert!(change.old_text.is_some() && change.new_text.is_some())
                    }
                }
            }
        }
    }
}

#[test]
fn positions_strictly_increase() {
    let changes = compute_diff(
        "intro\nkeep\nold detail\nkeep too\nobsolete",
        "intro\nkeep\nnew detail\nkeep too\nappendix",
    );
    assert!(!changes.is_empty());
    assert!(changes
        .windows(2)
        .all(|pair| pair[0].position < pair[1].position));
}

#[test]
fn diff_is_deterministic() {
    let old_text = "one\ntwo\nthree\nfour";
    let new_text = "one\n2\nthree\nfour\nfive";
    assert_eq!(
        compute_diff(old_text, new_text),
        compute_diff(old_text, new_text)
    );
}

#[test]
fn edited_list_item_is_paired_and_new_item_added() {
    let changes = compute_diff(
        "shopping\n- milk\n- eggs",
        "shopping\n- oat milk\n- eggs\n- bread",
    );
    assert_eq!(
        changes,
        vec![
            ChangeRecord {
                position: 2,
                kind: ChangeKind::Update,
                old_text: Some("- milk".to_string()),
                new_text: Some("- oat milk".to_string()),
            },
            ChangeRecord {
                position: 4,
                kind: ChangeKind::Add,
                old_text: None,
                new_text: Some("- bread".to_string()),
            },
        ]
    );
}

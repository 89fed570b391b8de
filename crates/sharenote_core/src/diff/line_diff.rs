//! Line diff engine used by note edit history.
//!
//! # Responsibility
//! - Align old/new line sequences with a Myers line diff.
//! - Pair similar deleted/inserted lines into `changed` guidance tokens.
//! - Classify the token stream into `Add`/`Delete`/`Update` records.
//!
//! # Invariants
//! - Positions are 1-based over every token, `Equal` tokens included.
//! - A changed pair is one token and yields exactly one `Update` record.
//! - Emitted line text is trimmed; unchanged lines are never emitted.
//! - An entirely empty text contributes no lines to the alignment.

use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices, Algorithm, DiffOp, TextDiff};

/// Minimum character similarity for a deleted/inserted pair to be treated
/// as one updated line.
const PAIR_SIMILARITY_CUTOFF: f32 = 0.5;
/// Replace blocks with more candidate pairs than this are dumped without
/// pairing.
const MAX_PAIRING_CANDIDATES: usize = 10_000;

/// Classification of one recorded line change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Line exists only in the new text.
    Add,
    /// Line exists only in the old text.
    Delete,
    /// Old line was edited into a new line.
    Update,
}

impl ChangeKind {
    /// Stable string id used in storage and wire payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Update => "update",
        }
    }

    /// Parses the stable string id produced by [`ChangeKind::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "add" => Some(Self::Add),
            "delete" => Some(Self::Delete),
            "update" => Some(Self::Update),
            _ => None,
        }
    }
}

/// One classified line edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// 1-based position in the diff alignment at edit time.
    ///
    /// Not a stable line number across edits.
    pub position: u32,
    pub kind: ChangeKind,
    /// `None` for `Add`.
    pub old_text: Option<String>,
    /// `None` for `Delete`.
    pub new_text: Option<String>,
}

impl ChangeRecord {
    fn added(position: u32, line: &str) -> Self {
        Self {
            position,
            kind: ChangeKind::Add,
            old_text: None,
            new_text: Some(line.trim().to_string()),
        }
    }

    fn deleted(position: u32, line: &str) -> Self {
        Self {
            position,
            kind: ChangeKind::Delete,
            old_text: Some(line.trim().to_string()),
            new_text: None,
        }
    }

    fn updated(position: u32, old_line: &str, new_line: &str) -> Self {
        Self {
            position,
            kind: ChangeKind::Update,
            old_text: Some(old_line.trim().to_string()),
            new_text: Some(new_line.trim().to_string()),
        }
    }
}

/// One token of the line alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffToken<'a> {
    /// Line present in both texts.
    Equal(&'a str),
    /// Line present only in the new text.
    Insert(&'a str),
    /// Line present only in the old text.
    Delete(&'a str),
    /// Guidance marker pairing a removed line with its replacement.
    ///
    /// A marker without a new side still classifies as `Update`, with an
    /// empty new line.
    Changed { old: &'a str, new: Option<&'a str> },
}

/// Splits text on `\n` with standard semantics: `""` yields `[""]`.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Computes the ordered change records turning `old_text` into `new_text`.
///
/// Never fails; any pair of strings is valid input.
pub fn compute_diff(old_text: &str, new_text: &str) -> Vec<ChangeRecord> {
    if old_text == new_text {
        return Vec::new();
    }
    classify(&tokenize(old_text, new_text))
}

/// Produces the raw alignment token stream for two texts.
pub fn tokenize<'a>(old_text: &'a str, new_text: &'a str) -> Vec<DiffToken<'a>> {
    let old_lines = alignment_lines(old_text);
    let new_lines = alignment_lines(new_text);
    let mut tokens = Vec::with_capacity(old_lines.len().max(new_lines.len()));

    for op in capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines) {
        match op {
            DiffOp::Equal { old_index, len, .. } => tokens.extend(
                old_lines[old_index..old_index + len]
                    .iter()
                    .copied()
                    .map(DiffToken::Equal),
            ),
            DiffOp::Delete {
                old_index, old_len, ..
            } => tokens.extend(
                old_lines[old_index..old_index + old_len]
                    .iter()
                    .copied()
                    .map(DiffToken::Delete),
            ),
            DiffOp::Insert {
                new_index, new_len, ..
            } => tokens.extend(
                new_lines[new_index..new_index + new_len]
                    .iter()
                    .copied()
                    .map(DiffToken::Insert),
            ),
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => pair_block(
                &old_lines[old_index..old_index + old_len],
                &new_lines[new_index..new_index + new_len],
                &mut tokens,
            ),
        }
    }

    tokens
}

/// Classifies an alignment token stream into change records.
///
/// Every token consumes one position, so `Equal` tokens leave gaps in the
/// emitted numbering.
pub fn classify(tokens: &[DiffToken<'_>]) -> Vec<ChangeRecord> {
    tokens
        .iter()
        .enumerate()
        .filter_map(|(index, token)| {
            let position = u32::try_from(index + 1).unwrap_or(u32::MAX);
            match *token {
                DiffToken::Equal(_) => None,
                DiffToken::Insert(line) => Some(ChangeRecord::added(position, line)),
                DiffToken::Delete(line) => Some(ChangeRecord::deleted(position, line)),
                DiffToken::Changed { old, new } => {
                    Some(ChangeRecord::updated(position, old, new.unwrap_or("")))
                }
            }
        })
        .collect()
}

/// Replays change records against `old_text`.
///
/// Positions not covered by a record are unchanged lines and copy the next
/// old line through.
pub fn apply_changes(old_text: &str, changes: &[ChangeRecord]) -> String {
    let mut ordered: Vec<&ChangeRecord> = changes.iter().collect();
    ordered.sort_by_key(|change| change.position);

    let mut old_lines = alignment_lines(old_text).into_iter();
    let mut output: Vec<&str> = Vec::new();
    let mut next_position = 1_u32;

    for change in ordered {
        while next_position < change.position {
            if let Some(line) = old_lines.next() {
                output.push(line);
            }
            next_position += 1;
        }

        match change.kind {
            ChangeKind::Add => output.push(change.new_text.as_deref().unwrap_or("")),
            ChangeKind::Delete => {
                old_lines.next();
            }
            ChangeKind::Update => {
                old_lines.next();
                output.push(change.new_text.as_deref().unwrap_or(""));
            }
        }
        next_position = change.position.saturating_add(1);
    }

    output.extend(old_lines);
    output.join("\n")
}

fn alignment_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        Vec::new()
    } else {
        split_lines(text)
    }
}

fn pair_block<'a>(old: &[&'a str], new: &[&'a str], tokens: &mut Vec<DiffToken<'a>>) {
    if old.is_empty() {
        tokens.extend(new.iter().copied().map(DiffToken::Insert));
        return;
    }
    if new.is_empty() {
        tokens.extend(old.iter().copied().map(DiffToken::Delete));
        return;
    }

    let best = if old.len().saturating_mul(new.len()) > MAX_PAIRING_CANDIDATES {
        None
    } else {
        most_similar_pair(old, new)
    };

    let Some((old_at, new_at)) = best else {
        dump_unpaired(old, new, tokens);
        return;
    };

    pair_block(&old[..old_at], &new[..new_at], tokens);
    if old[old_at] == new[new_at] {
        tokens.push(DiffToken::Equal(old[old_at]));
    } else {
        tokens.push(DiffToken::Changed {
            old: old[old_at],
            new: Some(new[new_at]),
        });
    }
    pair_block(&old[old_at + 1..], &new[new_at + 1..], tokens);
}

// First best pair wins ties, scanning new lines in the outer loop.
fn most_similar_pair(old: &[&str], new: &[&str]) -> Option<(usize, usize)> {
    let old_chars: Vec<usize> = old.iter().map(|line| line.chars().count()).collect();
    let mut best: Option<(usize, usize)> = None;
    let mut best_ratio = 0.0_f32;

    for (new_at, new_line) in new.iter().enumerate() {
        let new_chars = new_line.chars().count();
        for (old_at, old_line) in old.iter().enumerate() {
            if ratio_upper_bound(old_chars[old_at], new_chars) <= best_ratio {
                continue;
            }
            let ratio = TextDiff::from_chars(*old_line, *new_line).ratio();
            if ratio > best_ratio {
                best_ratio = ratio;
                best = Some((old_at, new_at));
            }
        }
    }

    best.filter(|_| best_ratio >= PAIR_SIMILARITY_CUTOFF)
}

fn ratio_upper_bound(old_chars: usize, new_chars: usize) -> f32 {
    let total = old_chars + new_chars;
    if total == 0 {
        return 1.0;
    }
    (2 * old_chars.min(new_chars)) as f32 / total as f32
}

// Shorter side first; deletes first on ties.
fn dump_unpaired<'a>(old: &[&'a str], new: &[&'a str], tokens: &mut Vec<DiffToken<'a>>) {
    if new.len() < old.len() {
        tokens.extend(new.iter().copied().map(DiffToken::Insert));
        tokens.extend(old.iter().copied().map(DiffToken::Delete));
    } else {
        tokens.extend(old.iter().copied().map(DiffToken::Delete));
        tokens.extend(new.iter().copied().map(DiffToken::Insert));
    }
}

#[cfg(test)]
mod tests {
    use super::{
        apply_changes, classify, compute_diff, ratio_upper_bound, split_lines, tokenize,
        ChangeKind, ChangeRecord, DiffToken, MAX_PAIRING_CANDIDATES,
    };

    #[test]
    fn split_lines_keeps_standard_semantics() {
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
    }

    #[test]
    fn equal_tokens_consume_positions() {
        let tokens = vec![
            DiffToken::Equal("keep"),
            DiffToken::Equal("keep too"),
            DiffToken::Delete("gone"),
            DiffToken::Equal("tail"),
            DiffToken::Insert("new"),
        ];
        let records = classify(&tokens);
        let positions: Vec<u32> = records.iter().map(|record| record.position).collect();
        assert_eq!(positions, vec![3, 5]);
    }

    #[test]
    fn changed_marker_without_new_side_falls_back_to_empty_new_line() {
        let records = classify(&[DiffToken::Changed {
            old: "  orphan marker ",
            new: None,
        }]);
        assert_eq!(
            records,
            vec![ChangeRecord {
                position: 1,
                kind: ChangeKind::Update,
                old_text: Some("orphan marker".to_string()),
                new_text: Some(String::new()),
            }]
        );
    }

    #[test]
    fn dissimilar_replacement_dumps_shorter_side_first() {
        let tokens = tokenize("qqq\nzzz\nwww", "x");
        assert_eq!(
            tokens,
            vec![
                DiffToken::Insert("x"),
                DiffToken::Delete("qqq"),
                DiffToken::Delete("zzz"),
                DiffToken::Delete("www"),
            ]
        );

        let tokens = tokenize("x", "qqq\nzzz");
        assert_eq!(
            tokens,
            vec![
                DiffToken::Delete("x"),
                DiffToken::Insert("qqq"),
                DiffToken::Insert("zzz"),
            ]
        );
    }

    #[test]
    fn similar_pair_inside_replace_block_is_paired() {
        let tokens = tokenize("intro\nold heading\nfooter", "intro\nnew heading\nfooter");
        assert_eq!(
            tokens,
            vec![
                DiffToken::Equal("intro"),
                DiffToken::Changed {
                    old: "old heading",
                    new: Some("new heading"),
                },
                DiffToken::Equal("footer"),
            ]
        );
    }

    #[test]
    fn emitted_lines_are_trimmed() {
        let records = compute_diff("a", "a\n   padded line\t");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].new_text.as_deref(), Some("padded line"));
    }

    #[test]
    fn oversized_replace_block_skips_pairing() {
        let old_rows: Vec<String> = (0..101).map(|i| format!("entry {i} alpha")).collect();
        let new_rows: Vec<String> = (0..100).map(|i| format!("entry {i} beta")).collect();
        assert!(old_rows.len() * new_rows.len() > MAX_PAIRING_CANDIDATES);
        let old_text = format!("start\n{}\nend", old_rows.join("\n"));
        let new_text = format!("start\n{}\nend", new_rows.join("\n"));

        let records = compute_diff(&old_text, &new_text);
        assert!(records.iter().all(|record| record.kind != ChangeKind::Update));
        let adds = records
            .iter()
            .filter(|record| record.kind == ChangeKind::Add)
            .count();
        assert_eq!(adds, 100);
        assert_eq!(records.len(), 201);
        // Shorter side first.
        assert_eq!(records[0].kind, ChangeKind::Add);
        assert_eq!(records[0].position, 2);
        assert_eq!(apply_changes(&old_text, &records), new_text);
    }

    #[test]
    fn ratio_upper_bound_handles_empty_lines() {
        assert_eq!(ratio_upper_bound(0, 0), 1.0);
        assert_eq!(ratio_upper_bound(0, 4), 0.0);
        assert_eq!(ratio_upper_bound(2, 2), 1.0);
    }

    #[test]
    fn change_kind_string_ids_are_stable() {
        for kind in [ChangeKind::Add, ChangeKind::Delete, ChangeKind::Update] {
            assert_eq!(ChangeKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ChangeKind::parse("rename"), None);
    }
}

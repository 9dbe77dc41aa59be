//! Record types for collected feed items
//!
//! This module normalizes raw feed nodes into [`Record`] values and handles
//! their flat-row serialization, including:
//! - Per-item parsing with malformed items rejected individually
//! - Tag extraction from caption text
//! - Reversible row escaping for persistence

mod escape;

pub use escape::{escape, unescape};

use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

/// Header row naming the fields of a serialized [`Record`]
pub const ROW_HEADER: &str = "id,code,timestamp,owner_id,like_count,comment_count,media_url,caption";

/// Errors producing a [`Record`] from one raw feed item
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Malformed item: {0}")]
    MalformedItem(String),

    #[error("Malformed row: {0}")]
    MalformedRow(String),
}

/// One collected item, normalized from a raw feed node
///
/// Records are immutable once constructed; a later crawl of the same item
/// produces a fresh `Record` that replaces this one on merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Opaque unique identifier; primary key within a dataset
    pub id: String,

    /// Short human-facing identifier
    pub code: String,

    /// Provenance time of the item, seconds since epoch (not crawl time)
    pub timestamp: i64,

    /// Identifier of the item's originator
    pub owner_id: String,

    /// Like count at time of fetch
    pub like_count: u64,

    /// Comment count at time of fetch
    pub comment_count: u64,

    /// Locator for associated media; may be empty
    pub media_url: String,

    /// Free-text caption; may contain control characters
    pub caption: String,
}

impl Record {
    /// Builds a `Record` from one raw item of a feed page
    ///
    /// Each item wraps its payload in a `node` object. The `id` and the
    /// caption edge container are required; a missing or empty `id`, or an
    /// absent first caption edge, fails with [`RecordError::MalformedItem`].
    /// Counts, shortcode, owner, and media URL default when absent.
    pub fn from_raw(item: &Value) -> Result<Self, RecordError> {
        let node = item
            .get("node")
            .ok_or_else(|| RecordError::MalformedItem("missing node object".to_string()))?;

        let id = string_field(node.get("id"))
            .ok_or_else(|| RecordError::MalformedItem("missing id".to_string()))?;
        if id.is_empty() {
            return Err(RecordError::MalformedItem("empty id".to_string()));
        }

        // First caption edge only; an item with no caption edge is malformed
        let caption = node
            .get("edge_media_to_caption")
            .and_then(|c| c.get("edges"))
            .and_then(|e| e.get(0))
            .and_then(|edge| edge.get("node"))
            .and_then(|n| n.get("text"))
            .and_then(Value::as_str)
            .ok_or_else(|| RecordError::MalformedItem("missing caption edge".to_string()))?
            .to_string();

        Ok(Self {
            id,
            code: string_field(node.get("shortcode")).unwrap_or_default(),
            timestamp: node
                .get("taken_at_timestamp")
                .and_then(Value::as_i64)
                .unwrap_or(0),
            owner_id: string_field(node.get("owner").and_then(|o| o.get("id")))
                .unwrap_or_default(),
            like_count: count_field(node.get("edge_liked_by")),
            comment_count: count_field(node.get("edge_media_to_comment")),
            media_url: string_field(node.get("display_url")).unwrap_or_default(),
            caption,
        })
    }

    /// Extracts the tag set from the caption
    ///
    /// The caption is split on whitespace; tokens beginning with `#` yield
    /// a tag with the marker stripped. Duplicates collapse, bare markers
    /// are dropped, and an empty caption yields an empty set.
    pub fn tags(&self) -> BTreeSet<String> {
        self.caption
            .split_whitespace()
            .filter(|token| token.starts_with('#'))
            .map(|token| token.trim_start_matches('#'))
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Serializes the record as one flat row
    ///
    /// Bare fields for identifiers and counts; `media_url` and `caption`
    /// are double-quoted with their contents escaped so the row stays a
    /// single line. [`Record::from_row`] inverts this.
    pub fn to_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},\"{}\",\"{}\"",
            self.id,
            self.code,
            self.timestamp,
            self.owner_id,
            self.like_count,
            self.comment_count,
            escape(&self.media_url),
            escape(&self.caption)
        )
    }

    /// Reconstructs a record from one serialized row
    pub fn from_row(row: &str) -> Result<Self, RecordError> {
        let fields = split_row(row).map_err(RecordError::MalformedRow)?;
        if fields.len() != 8 {
            return Err(RecordError::MalformedRow(format!(
                "expected 8 fields, found {}",
                fields.len()
            )));
        }

        let timestamp = fields[2]
            .parse::<i64>()
            .map_err(|_| RecordError::MalformedRow(format!("bad timestamp '{}'", fields[2])))?;
        let like_count = fields[4]
            .parse::<u64>()
            .map_err(|_| RecordError::MalformedRow(format!("bad like count '{}'", fields[4])))?;
        let comment_count = fields[5]
            .parse::<u64>()
            .map_err(|_| RecordError::MalformedRow(format!("bad comment count '{}'", fields[5])))?;

        Ok(Self {
            id: fields[0].clone(),
            code: fields[1].clone(),
            timestamp,
            owner_id: fields[3].clone(),
            like_count,
            comment_count,
            media_url: unescape(&fields[6]).map_err(RecordError::MalformedRow)?,
            caption: unescape(&fields[7]).map_err(RecordError::MalformedRow)?,
        })
    }
}

/// Reads a field that the remote may encode as a string or a number
fn string_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a `{ "count": N }` edge-count object, defaulting to 0
fn count_field(value: Option<&Value>) -> u64 {
    value
        .and_then(|v| v.get("count"))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

/// Splits a serialized row into raw (still-escaped) fields
///
/// Quote-aware: a quoted field may contain commas, and `\"` inside it does
/// not close the field.
fn split_row(row: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut chars = row.chars().peekable();

    loop {
        let mut field = String::new();

        if chars.peek() == Some(&'"') {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                if c == '\\' {
                    field.push(c);
                    match chars.next() {
                        Some(next) => field.push(next),
                        None => return Err("dangling backslash in quoted field".to_string()),
                    }
                } else if c == '"' {
                    closed = true;
                    break;
                } else {
                    field.push(c);
                }
            }
            if !closed {
                return Err("unterminated quoted field".to_string());
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c == ',' {
                    break;
                }
                field.push(c);
                chars.next();
            }
        }

        fields.push(field);

        match chars.next() {
            Some(',') => continue,
            None => break,
            Some(c) => return Err(format!("unexpected character '{}' after quoted field", c)),
        }
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_item(id: &str, caption: &str) -> Value {
        json!({
            "node": {
                "id": id,
                "shortcode": "AbCd123",
                "taken_at_timestamp": 1_700_000_000,
                "display_url": "https://media.example.com/1.jpg",
                "edge_liked_by": { "count": 42 },
                "edge_media_to_comment": { "count": 7 },
                "owner": { "id": "owner-9" },
                "edge_media_to_caption": {
                    "edges": [ { "node": { "text": caption } } ]
                }
            }
        })
    }

    #[test]
    fn test_from_raw_full_item() {
        let record = Record::from_raw(&raw_item("post-1", "hello #rust")).unwrap();
        assert_eq!(record.id, "post-1");
        assert_eq!(record.code, "AbCd123");
        assert_eq!(record.timestamp, 1_700_000_000);
        assert_eq!(record.owner_id, "owner-9");
        assert_eq!(record.like_count, 42);
        assert_eq!(record.comment_count, 7);
        assert_eq!(record.media_url, "https://media.example.com/1.jpg");
        assert_eq!(record.caption, "hello #rust");
    }

    #[test]
    fn test_from_raw_numeric_id() {
        let mut item = raw_item("x", "caption");
        item["node"]["id"] = json!(1234567890u64);
        let record = Record::from_raw(&item).unwrap();
        assert_eq!(record.id, "1234567890");
    }

    #[test]
    fn test_from_raw_missing_node() {
        let err = Record::from_raw(&json!({ "id": "post-1" })).unwrap_err();
        assert!(matches!(err, RecordError::MalformedItem(_)));
    }

    #[test]
    fn test_from_raw_missing_id() {
        let mut item = raw_item("x", "caption");
        item["node"].as_object_mut().unwrap().remove("id");
        assert!(Record::from_raw(&item).is_err());
    }

    #[test]
    fn test_from_raw_empty_id() {
        assert!(Record::from_raw(&raw_item("", "caption")).is_err());
    }

    #[test]
    fn test_from_raw_missing_caption_container() {
        let mut item = raw_item("post-1", "caption");
        item["node"]
            .as_object_mut()
            .unwrap()
            .remove("edge_media_to_caption");
        assert!(Record::from_raw(&item).is_err());
    }

    #[test]
    fn test_from_raw_empty_caption_edges() {
        let mut item = raw_item("post-1", "caption");
        item["node"]["edge_media_to_caption"]["edges"] = json!([]);
        assert!(Record::from_raw(&item).is_err());
    }

    #[test]
    fn test_from_raw_defaults_for_optional_fields() {
        let item = json!({
            "node": {
                "id": "post-2",
                "edge_media_to_caption": {
                    "edges": [ { "node": { "text": "" } } ]
                }
            }
        });
        let record = Record::from_raw(&item).unwrap();
        assert_eq!(record.code, "");
        assert_eq!(record.timestamp, 0);
        assert_eq!(record.owner_id, "");
        assert_eq!(record.like_count, 0);
        assert_eq!(record.comment_count, 0);
        assert_eq!(record.media_url, "");
    }

    #[test]
    fn test_tags_duplicates_collapse() {
        let record = Record::from_raw(&raw_item("p", "hello #Paris #food #Paris")).unwrap();
        let tags = record.tags();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("Paris"));
        assert!(tags.contains("food"));
    }

    #[test]
    fn test_tags_empty_caption() {
        let record = Record::from_raw(&raw_item("p", "")).unwrap();
        assert!(record.tags().is_empty());
    }

    #[test]
    fn test_tags_no_markers() {
        let record = Record::from_raw(&raw_item("p", "just plain words")).unwrap();
        assert!(record.tags().is_empty());
    }

    #[test]
    fn test_tags_bare_marker_dropped() {
        let record = Record::from_raw(&raw_item("p", "a # b #real")).unwrap();
        let tags = record.tags();
        assert_eq!(tags.len(), 1);
        assert!(tags.contains("real"));
    }

    #[test]
    fn test_row_round_trip_with_control_and_non_ascii() {
        let record = Record {
            id: "post-3".to_string(),
            code: "Zz9".to_string(),
            timestamp: 1_700_000_123,
            owner_id: "owner-1".to_string(),
            like_count: 5,
            comment_count: 0,
            media_url: "https://media.example.com/3.jpg".to_string(),
            caption: "first line\nsecond café".to_string(),
        };

        let row = record.to_row();
        assert!(!row.contains('\n'));

        let parsed = Record::from_row(&row).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_row_round_trip_with_comma_and_quote() {
        let record = Record {
            id: "post-4".to_string(),
            code: "q".to_string(),
            timestamp: 0,
            owner_id: "o".to_string(),
            like_count: 0,
            comment_count: 0,
            media_url: String::new(),
            caption: "tricky, \"quoted\", field".to_string(),
        };

        let parsed = Record::from_row(&record.to_row()).unwrap();
        assert_eq!(parsed.caption, record.caption);
    }

    #[test]
    fn test_from_row_wrong_field_count() {
        assert!(Record::from_row("a,b,c").is_err());
    }

    #[test]
    fn test_from_row_bad_timestamp() {
        assert!(Record::from_row("id,code,notanumber,owner,0,0,\"\",\"\"").is_err());
    }

    #[test]
    fn test_from_row_unterminated_quote() {
        assert!(Record::from_row("id,code,0,owner,0,0,\"\",\"open").is_err());
    }
}

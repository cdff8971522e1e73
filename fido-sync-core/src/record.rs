//! # record: the canonical Dog Record and its persisted row shape
//!
//! Every producer yields [`DogRecord`]s; the store holds [`StoredDog`] rows,
//! which add the two bookkeeping columns owned by the reconciliation engine
//! and the human curator respectively.
//!
//! ## Store format
//! - Current and Archive share the ordered column set in [`COLUMNS`].
//! - Logs rows are `Timestamp`, `Message`, `Payload`.
//! - `Manually_Edited` is stored as text. Only a case-insensitive `"false"`
//!   means "not edited"; any other value (including an empty cell) marks the
//!   row as curated. The engine writes `"false"` on new rows and carries the
//!   curator's text unchanged when a row moves to Archive.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered columns of the Current and Archive tables.
pub const COLUMNS: [&str; 11] = [
    "Name",
    "Breed",
    "Age",
    "Gender",
    "Weight",
    "Description",
    "Image_URL",
    "Rescue_Name",
    "Their_Id",
    "Last_Updated",
    "Manually_Edited",
];

/// Number of leading columns rewritten by an in-place update (Name..Last_Updated).
pub const UPDATE_WIDTH: usize = 10;

/// Format used for `Last_Updated` and log timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The tables of the persisted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Current,
    Archive,
    Logs,
}

/// One foster-dog listing in canonical shape. Absent source fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DogRecord {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Breed", default)]
    pub breed: String,
    #[serde(rename = "Age", default)]
    pub age: String,
    #[serde(rename = "Gender", default)]
    pub gender: String,
    #[serde(rename = "Weight", default)]
    pub weight: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Image_URL", default)]
    pub image_url: String,
    #[serde(rename = "Rescue_Name", default)]
    pub rescue_name: String,
    #[serde(rename = "Their_Id", default)]
    pub their_id: String,
}

/// Composite identity of a listing: the source's own id scoped by rescue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DogKey {
    pub their_id: String,
    pub rescue_name: String,
}

impl DogRecord {
    /// The composite key, or `None` when either part is blank (unidentifiable record).
    pub fn key(&self) -> Option<DogKey> {
        if self.their_id.trim().is_empty() || self.rescue_name.trim().is_empty() {
            return None;
        }
        Some(DogKey {
            their_id: self.their_id.clone(),
            rescue_name: self.rescue_name.clone(),
        })
    }

    /// True when any synced, non-key field differs by exact string comparison.
    pub fn differs_from(&self, other: &DogRecord) -> bool {
        self.name != other.name
            || self.breed != other.breed
            || self.age != other.age
            || self.gender != other.gender
            || self.weight != other.weight
            || self.description != other.description
            || self.image_url != other.image_url
    }

    /// JSON rendering used as the Logs payload for rejected records.
    pub fn to_payload(&self) -> String {
        // Plain strings only; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Parse the store's textual manual-edit flag.
pub fn parse_manual_flag(raw: &str) -> bool {
    !raw.eq_ignore_ascii_case("false")
}

/// Serialize the manual-edit flag for the store.
pub fn format_manual_flag(edited: bool) -> &'static str {
    if edited {
        "true"
    } else {
        "false"
    }
}

/// A row of the Current or Archive table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDog {
    pub record: DogRecord,
    pub last_updated: String,
    pub manually_edited: bool,
    /// `Manually_Edited` cell text as read from the store; `None` for rows the engine builds.
    pub manual_cell: Option<String>,
}

impl StoredDog {
    /// A freshly scraped record stamped for insertion.
    pub fn fresh(record: DogRecord, now: &str) -> Self {
        Self {
            record,
            last_updated: now.to_string(),
            manually_edited: false,
            manual_cell: None,
        }
    }

    /// Build from a header-keyed row. Missing columns read as empty.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let get = |column: &str| fields.get(column).cloned().unwrap_or_default();
        Self {
            record: DogRecord {
                name: get("Name"),
                breed: get("Breed"),
                age: get("Age"),
                gender: get("Gender"),
                weight: get("Weight"),
                description: get("Description"),
                image_url: get("Image_URL"),
                rescue_name: get("Rescue_Name"),
                their_id: get("Their_Id"),
            },
            last_updated: get("Last_Updated"),
            manually_edited: parse_manual_flag(&get("Manually_Edited")),
            manual_cell: Some(get("Manually_Edited")),
        }
    }

    /// All columns in [`COLUMNS`] order.
    pub fn to_row(&self) -> Vec<String> {
        let r = &self.record;
        vec![
            r.name.clone(),
            r.breed.clone(),
            r.age.clone(),
            r.gender.clone(),
            r.weight.clone(),
            r.description.clone(),
            r.image_url.clone(),
            r.rescue_name.clone(),
            r.their_id.clone(),
            self.last_updated.clone(),
            self.manual_cell
                .clone()
                .unwrap_or_else(|| format_manual_flag(self.manually_edited).to_string()),
        ]
    }

    /// The leading [`UPDATE_WIDTH`] columns; the manual flag cell is left alone on update.
    pub fn to_update_row(&self) -> Vec<String> {
        let mut row = self.to_row();
        row.truncate(UPDATE_WIDTH);
        row
    }
}

/// A diagnostic row for the Logs table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
    pub payload: String,
}

impl LogEntry {
    pub fn new(timestamp: &str, message: &str, payload: String) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            message: message.to_string(),
            payload,
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.message.clone(),
            self.payload.clone(),
        ]
    }
}

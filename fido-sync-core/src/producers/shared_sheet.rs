//! Producers for rescues that share a spreadsheet of their foster dogs.
//!
//! Each rescue keeps its own column layout; [`SheetLayout`] selects the mapping.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use super::ProducerError;
use crate::contract::{Producer, SheetRows};
use crate::normalize::{clean_text, flatten_paragraphs, PARAGRAPH_SEPARATOR};
use crate::record::DogRecord;

/// Row that ends the Cantu Foundation listing; rows below are a different program.
pub const CANTU_STOP_MARKER: &str = "DOGS IN SAN DIEGO";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetLayout {
    /// One dog per row; id is `{Name}_{Breed}`.
    MotherOfDragons,
    /// Imported range without a name header; only dogs with a website note and no foster.
    CantuFoundation,
}

pub struct SharedSheetProducer {
    sheets: Arc<dyn SheetRows>,
    rescue_name: String,
    spreadsheet: String,
    layout: SheetLayout,
}

impl SharedSheetProducer {
    pub fn new(
        sheets: Arc<dyn SheetRows>,
        rescue_name: String,
        spreadsheet: String,
        layout: SheetLayout,
    ) -> Self {
        Self {
            sheets,
            rescue_name,
            spreadsheet,
            layout,
        }
    }

    async fn fetch(&self) -> Result<Vec<DogRecord>, ProducerError> {
        let rows = self
            .sheets
            .fetch_records(&self.spreadsheet)
            .await
            .map_err(ProducerError::Sheet)?;
        info!(spreadsheet = %self.spreadsheet, rows = rows.len(), "Accessed shared spreadsheet");
        Ok(map_rows(self.layout, &rows, &self.rescue_name))
    }
}

#[async_trait]
impl Producer for SharedSheetProducer {
    fn name(&self) -> String {
        self.rescue_name.clone()
    }

    async fn produce(&self) -> Vec<DogRecord> {
        match self.fetch().await {
            Ok(dogs) => {
                info!(rescue = %self.rescue_name, count = dogs.len(), "Scraped dogs");
                dogs
            }
            Err(e) => {
                error!(rescue = %self.rescue_name, spreadsheet = %self.spreadsheet, error = %e, "Error accessing spreadsheet");
                Vec::new()
            }
        }
    }
}

/// Map header-keyed rows to records according to `layout`.
pub fn map_rows(
    layout: SheetLayout,
    rows: &[HashMap<String, String>],
    rescue_name: &str,
) -> Vec<DogRecord> {
    match layout {
        SheetLayout::MotherOfDragons => rows
            .iter()
            .filter(|row| row.values().any(|v| !v.trim().is_empty()))
            .map(|row| mother_of_dragons(row, rescue_name))
            .collect(),
        SheetLayout::CantuFoundation => rows
            .iter()
            .take_while(|row| cell(row, "") != CANTU_STOP_MARKER)
            .filter_map(|row| cantu_foundation(row, rescue_name))
            .collect(),
    }
}

fn cell(row: &HashMap<String, String>, column: &str) -> String {
    row.get(column).cloned().unwrap_or_default()
}

fn mother_of_dragons(row: &HashMap<String, String>, rescue_name: &str) -> DogRecord {
    let name = cell(row, "Name");
    let breed = cell(row, "Breed");
    DogRecord {
        their_id: format!("{name}_{breed}"),
        age: cell(row, "Age"),
        gender: cell(row, "Gender"),
        weight: cell(row, "Weight"),
        description: flatten_paragraphs(
            &clean_text(&cell(row, "Description / Bio")),
            PARAGRAPH_SEPARATOR,
        ),
        image_url: cell(row, "Image"),
        rescue_name: rescue_name.to_string(),
        name,
        breed,
    }
}

fn cantu_foundation(row: &HashMap<String, String>, rescue_name: &str) -> Option<DogRecord> {
    // Header cells in this sheet carry trailing spaces.
    let has_foster = cell(row, "Foster lined up");
    let note = cell(row, "Notes for website ");
    if !has_foster.trim().is_empty() || note.trim().is_empty() {
        return None;
    }
    let name = cell(row, "");
    Some(DogRecord {
        their_id: format!("{name}_{}", cell(row, "Fur Color")),
        breed: cell(row, "Breed"),
        age: cell(row, "Age "),
        gender: cell(row, "Gender"),
        weight: cell(row, "Weight"),
        description: flatten_paragraphs(&clean_text(&note), PARAGRAPH_SEPARATOR),
        image_url: cell(row, "Image"),
        rescue_name: rescue_name.to_string(),
        name,
    })
}

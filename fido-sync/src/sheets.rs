#![doc = "Google Sheets integration: implements the core store and sheet-reader contracts over the Sheets and Drive REST APIs."]
//
//! # Google Sheets adapter
//!
//! - [`GoogleSheetsClient`] holds the HTTP client and bearer token. It resolves
//!   spreadsheets by name and implements [`SheetRows`] for partner sheets.
//! - [`SheetStore`] binds the client to the store spreadsheet and its three
//!   worksheets and implements [`DogStore`].
//!
//! Reads request unformatted values and coerce every cell to text, so a
//! numeric weight and its string form compare equal. Writes use raw input so
//! the sheet never reinterprets a value. Sheet row numbers are 1-based with a
//! header row, so store position `p` lives on row `p + 2`.
//!
//! Obtaining the access token is outside this module: set
//! `GOOGLE_ACCESS_TOKEN` to an OAuth token with Sheets and Drive scopes.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::env;

use fido_sync_core::config::StoreTarget;
use fido_sync_core::contract::{DogStore, SheetRows, StoreError};
use fido_sync_core::normalize::json_to_text;
use fido_sync_core::record::{StoredDog, Table};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Clone)]
pub struct GoogleSheetsClient {
    http: Client,
    token: String,
}

impl GoogleSheetsClient {
    pub fn new(token: String) -> Self {
        Self {
            http: Client::new(),
            token,
        }
    }

    pub fn new_from_env() -> Result<Self, StoreError> {
        dotenvy::dotenv().ok();
        match env::var("GOOGLE_ACCESS_TOKEN") {
            Ok(token) if !token.trim().is_empty() => {
                tracing::info!("Initialized GoogleSheetsClient from environment");
                Ok(Self::new(token))
            }
            Ok(_) | Err(_) => {
                tracing::error!("GOOGLE_ACCESS_TOKEN missing in environment");
                Err("GOOGLE_ACCESS_TOKEN environment variable not set".into())
            }
        }
    }

    /// Id of the spreadsheet called `name`, via a Drive search.
    pub async fn find_spreadsheet(&self, name: &str) -> Result<String, StoreError> {
        let query = format!(
            "name = '{}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false",
            escape_query(name)
        );
        let body: Value = self
            .http
            .get(DRIVE_FILES_API)
            .bearer_auth(&self.token)
            .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let id = body["files"]
            .as_array()
            .and_then(|files| files.first())
            .and_then(|file| file["id"].as_str())
            .ok_or_else(|| format!("spreadsheet '{name}' not found or not shared"))?;
        tracing::info!(spreadsheet = name, id, "Resolved spreadsheet");
        Ok(id.to_string())
    }

    /// Worksheet titles mapped to their numeric sheet ids, in tab order.
    pub async fn worksheets(&self, spreadsheet_id: &str) -> Result<Vec<(String, i64)>, StoreError> {
        let body: Value = self
            .http
            .get(format!("{SHEETS_API}/{spreadsheet_id}"))
            .bearer_auth(&self.token)
            .query(&[("fields", "sheets.properties(sheetId,title)")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let sheets = body["sheets"].as_array().cloned().unwrap_or_default();
        Ok(sheets
            .iter()
            .filter_map(|sheet| {
                let props = &sheet["properties"];
                Some((props["title"].as_str()?.to_string(), props["sheetId"].as_i64()?))
            })
            .collect())
    }

    /// All values of `range` with unformatted cells coerced to text.
    pub async fn read_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, StoreError> {
        let url = values_url(spreadsheet_id, range)?;
        let body: Value = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("valueRenderOption", "UNFORMATTED_VALUE")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(values_to_text(&body["values"]))
    }

    pub async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<String>,
    ) -> Result<(), StoreError> {
        let url = values_url(spreadsheet_id, &format!("{range}:append"))?;
        self.http
            .post(url)
            .bearer_auth(&self.token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "OVERWRITE")])
            .json(&json!({ "values": [row] }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<String>,
    ) -> Result<(), StoreError> {
        let url = values_url(spreadsheet_id, range)?;
        self.http
            .put(url)
            .bearer_auth(&self.token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "majorDimension": "ROWS", "values": [row] }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Delete the 1-based sheet row `row_number` of worksheet `sheet_id`.
    pub async fn delete_sheet_row(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        row_number: usize,
    ) -> Result<(), StoreError> {
        let request = json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": row_number - 1,
                        "endIndex": row_number
                    }
                }
            }]
        });
        self.http
            .post(format!("{SHEETS_API}/{spreadsheet_id}:batchUpdate"))
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl SheetRows for GoogleSheetsClient {
    async fn fetch_records(
        &self,
        spreadsheet: &str,
    ) -> Result<Vec<HashMap<String, String>>, StoreError> {
        let id = self.find_spreadsheet(spreadsheet).await?;
        let first = self
            .worksheets(&id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| format!("spreadsheet '{spreadsheet}' has no worksheets"))?;
        let values = self.read_values(&id, &quote_tab(&first.0)).await?;
        Ok(records_from_values(&values))
    }
}

/// The store spreadsheet with its Current, Archive and Logs worksheets.
pub struct SheetStore {
    client: GoogleSheetsClient,
    spreadsheet_id: String,
    current_tab: String,
    archive_tab: String,
    logs_tab: String,
    current_sheet_id: i64,
}

impl SheetStore {
    /// Open spreadsheet `name` and check that the three worksheets exist.
    pub async fn open(
        client: GoogleSheetsClient,
        name: &str,
        target: &StoreTarget,
    ) -> Result<Self, StoreError> {
        let spreadsheet_id = client.find_spreadsheet(name).await?;
        let worksheets = client.worksheets(&spreadsheet_id).await?;
        let sheet_id = |title: &str| -> Result<i64, StoreError> {
            worksheets
                .iter()
                .find(|(t, _)| t == title)
                .map(|(_, id)| *id)
                .ok_or_else(|| format!("worksheet '{title}' missing from '{name}'").into())
        };
        let current_sheet_id = sheet_id(&target.current_tab)?;
        sheet_id(&target.archive_tab)?;
        sheet_id(&target.logs_tab)?;
        tracing::info!(spreadsheet = name, "Opened store spreadsheet");
        Ok(Self {
            client,
            spreadsheet_id,
            current_tab: target.current_tab.clone(),
            archive_tab: target.archive_tab.clone(),
            logs_tab: target.logs_tab.clone(),
            current_sheet_id,
        })
    }

    fn tab(&self, table: Table) -> &str {
        match table {
            Table::Current => &self.current_tab,
            Table::Archive => &self.archive_tab,
            Table::Logs => &self.logs_tab,
        }
    }
}

#[async_trait]
impl DogStore for SheetStore {
    async fn read_current(&self) -> Result<Vec<StoredDog>, StoreError> {
        let values = self
            .client
            .read_values(&self.spreadsheet_id, &quote_tab(&self.current_tab))
            .await?;
        let rows: Vec<StoredDog> = records_from_values(&values)
            .iter()
            .map(StoredDog::from_fields)
            .collect();
        tracing::info!(rows = rows.len(), "Read Current table");
        Ok(rows)
    }

    async fn append_row(&self, table: Table, row: Vec<String>) -> Result<(), StoreError> {
        let range = format!("{}!A1", quote_tab(self.tab(table)));
        tracing::debug!(?table, "Appending row");
        self.client
            .append_values(&self.spreadsheet_id, &range, row)
            .await
    }

    async fn update_row(&self, position: usize, row: Vec<String>) -> Result<(), StoreError> {
        let range = row_range(&self.current_tab, position + 2, row.len());
        tracing::debug!(position, %range, "Updating row");
        self.client
            .update_values(&self.spreadsheet_id, &range, row)
            .await
    }

    async fn delete_row(&self, position: usize) -> Result<(), StoreError> {
        tracing::debug!(position, "Deleting row");
        self.client
            .delete_sheet_row(&self.spreadsheet_id, self.current_sheet_id, position + 2)
            .await
    }
}

fn values_url(spreadsheet_id: &str, range: &str) -> Result<Url, StoreError> {
    let mut url = Url::parse(SHEETS_API)?;
    url.path_segments_mut()
        .map_err(|_| "sheets API base URL cannot take path segments")?
        .push(spreadsheet_id)
        .push("values")
        .push(range);
    Ok(url)
}

fn escape_query(name: &str) -> String {
    name.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Worksheet title quoted for A1 notation.
pub fn quote_tab(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Column letters for a 1-based column index (1 → A, 27 → AA).
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push(b'A' + rem as u8);
        index = (index - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// A1 range covering the first `width` cells of sheet row `row_number`.
pub fn row_range(tab: &str, row_number: usize, width: usize) -> String {
    format!(
        "{}!A{row_number}:{}{row_number}",
        quote_tab(tab),
        column_letter(width.max(1))
    )
}

/// Coerce a `values` array from the Sheets API into rows of text.
pub fn values_to_text(values: &Value) -> Vec<Vec<String>> {
    values
        .as_array()
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| cells.iter().map(json_to_text).collect())
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Header-keyed records from raw rows; the first row is the header and short rows are padded.
///
/// Every data row yields a record, blank ones included, so record index equals store position.
pub fn records_from_values(values: &[Vec<String>]) -> Vec<HashMap<String, String>> {
    let Some((header, rows)) = values.split_first() else {
        return Vec::new();
    };
    rows.iter()
        .map(|row| {
            header
                .iter()
                .enumerate()
                .map(|(i, column)| (column.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}


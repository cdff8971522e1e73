#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use fido_sync_core::contract::{DogStore, StoreError};
use fido_sync_core::record::{DogRecord, StoredDog, Table, COLUMNS};

/// In-memory store that behaves like the spreadsheet: positional rows, deletes shift later rows.
#[derive(Default)]
pub struct MemoryStore {
    /// Current appends go in at the first blank row, shifting later rows down,
    /// the way a sheet append treats a blank row as the end of the table.
    pub append_at_first_blank: bool,
    pub current: Mutex<Vec<Vec<String>>>,
    pub archive: Mutex<Vec<Vec<String>>>,
    pub logs: Mutex<Vec<Vec<String>>>,
    pub writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn with_current(rows: Vec<Vec<String>>) -> Self {
        let store = Self::default();
        *store.current.lock().unwrap() = rows;
        store
    }

    pub fn with_blank_row_table(rows: Vec<Vec<String>>) -> Self {
        let mut store = Self::with_current(rows);
        store.append_at_first_blank = true;
        store
    }

    pub fn current(&self) -> Vec<Vec<String>> {
        self.current.lock().unwrap().clone()
    }

    pub fn archive(&self) -> Vec<Vec<String>> {
        self.archive.lock().unwrap().clone()
    }

    pub fn logs(&self) -> Vec<Vec<String>> {
        self.logs.lock().unwrap().clone()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    fn count_write(&self) {
        *self.writes.lock().unwrap() += 1;
    }
}

#[async_trait]
impl DogStore for MemoryStore {
    async fn read_current(&self) -> Result<Vec<StoredDog>, StoreError> {
        Ok(self
            .current
            .lock()
            .unwrap()
            .iter()
            .map(|row| {
                let fields: HashMap<String, String> = COLUMNS
                    .iter()
                    .zip(row.iter())
                    .map(|(c, v)| (c.to_string(), v.clone()))
                    .collect();
                StoredDog::from_fields(&fields)
            })
            .collect())
    }

    async fn append_row(&self, table: Table, row: Vec<String>) -> Result<(), StoreError> {
        self.count_write();
        let target = match table {
            Table::Current => &self.current,
            Table::Archive => &self.archive,
            Table::Logs => &self.logs,
        };
        let mut rows = target.lock().unwrap();
        let gap = rows.iter().position(|r| r.iter().all(|c| c.is_empty()));
        match gap {
            Some(at) if table == Table::Current && self.append_at_first_blank => {
                rows.insert(at, row)
            }
            _ => rows.push(row),
        }
        Ok(())
    }

    async fn update_row(&self, position: usize, row: Vec<String>) -> Result<(), StoreError> {
        self.count_write();
        let mut current = self.current.lock().unwrap();
        let existing = current.get_mut(position).ok_or("update past end of table")?;
        if existing.len() < row.len() {
            existing.resize(row.len(), String::new());
        }
        existing[..row.len()].clone_from_slice(&row);
        Ok(())
    }

    async fn delete_row(&self, position: usize) -> Result<(), StoreError> {
        self.count_write();
        let mut current = self.current.lock().unwrap();
        if position >= current.len() {
            return Err("delete past end of table".into());
        }
        current.remove(position);
        Ok(())
    }
}

pub fn dog(their_id: &str, rescue: &str, name: &str, description: &str) -> DogRecord {
    DogRecord {
        name: name.to_string(),
        breed: "Mixed".to_string(),
        age: "2".to_string(),
        gender: "Male".to_string(),
        weight: "40".to_string(),
        description: description.to_string(),
        image_url: format!("https://img.example/{their_id}.jpg"),
        rescue_name: rescue.to_string(),
        their_id: their_id.to_string(),
    }
}

/// A stored row for `record` with the given bookkeeping cells.
pub fn row(record: &DogRecord, last_updated: &str, manually_edited: &str) -> Vec<String> {
    let mut row = StoredDog::fresh(record.clone(), last_updated).to_row();
    row[10] = manually_edited.to_string();
    row
}

pub fn blank_row() -> Vec<String> {
    vec![String::new(); COLUMNS.len()]
}

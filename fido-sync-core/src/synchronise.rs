//! Reconciliation engine: diffs a scraped batch against the Current table and applies the result.
//!
//! A run is two-phase:
//!   - [`plan`] is pure. It matches incoming records to Current rows by
//!     [`DogKey`], classifies each record (reject, new, manually edited,
//!     changed, unchanged) and collects the rows whose keys vanished.
//!   - [`apply`] performs the writes in an order that keeps row positions
//!     valid: in-place updates first, then archive-and-delete from the
//!     highest position down, then appends, then Logs rows. Every positional
//!     write lands before an append can move rows.
//!
//! # Guarantees
//! - Current never gains a second row for a key it already holds.
//! - A row is archived if and only if its key was in Current before the run
//!   and is absent from the batch. Manually edited rows are protected from
//!   field updates only, not from archival.
//! - Running twice with the same batch yields no writes the second time.
//! - A record without both key parts produces one Logs row and nothing else.
//!
//! # Error Handling
//! Any store error aborts the run with a [`SyncError`]. A failed read happens
//! before any mutation. A producer outage is not an error here: its dogs are
//! archived, and the summary warns when removals look like an outage.

use chrono::{Local, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, error, info, warn};

use crate::contract::{DogStore, StoreError};
use crate::record::{DogKey, DogRecord, LogEntry, StoredDog, Table, TIMESTAMP_FORMAT};

/// Logs message for records lacking `Their_Id` or `Rescue_Name`.
pub const MISSING_KEY_MESSAGE: &str = "Missing dog_id or rescue_name";

/// Logs message for a key repeated within one batch.
pub const DUPLICATE_KEY_MESSAGE: &str = "Duplicate dog_id and rescue_name in batch";

/// Fraction of pre-existing keys whose removal in one run is reported as a probable outage.
const OUTAGE_REMOVAL_RATIO: f64 = 0.5;

/// Counts produced by one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub manual_skipped: usize,
    pub rejected: usize,
}

/// A changed Current row to overwrite in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowUpdate {
    pub position: usize,
    pub dog: StoredDog,
}

/// A Current row to copy into Archive and then delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub position: usize,
    pub dog: StoredDog,
}

/// Every write a run will perform, computed before touching the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub updates: Vec<RowUpdate>,
    /// New rows in batch order.
    pub appends: Vec<StoredDog>,
    pub logs: Vec<LogEntry>,
    /// Sorted by descending position.
    pub removals: Vec<Removal>,
    pub unchanged: usize,
    pub manual_skipped: usize,
    /// Number of keyed rows in Current before the run.
    pub existing_keys: usize,
}

impl SyncPlan {
    pub fn report(&self) -> SyncReport {
        SyncReport {
            added: self.appends.len(),
            updated: self.updates.len(),
            removed: self.removals.len(),
            unchanged: self.unchanged,
            manual_skipped: self.manual_skipped,
            rejected: self.logs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
            && self.appends.is_empty()
            && self.logs.is_empty()
            && self.removals.is_empty()
    }
}

/// Fatal store failure during a run.
#[derive(Debug)]
pub enum SyncError {
    /// Current could not be read; nothing was written.
    Read(StoreError),
    /// A write failed part-way through applying the plan.
    Write { step: &'static str, source: StoreError },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Read(e) => write!(f, "failed to read Current table: {e}"),
            SyncError::Write { step, source } => write!(f, "store write failed during {step}: {source}"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Read(e) => Some(e.as_ref()),
            SyncError::Write { source, .. } => Some(source.as_ref()),
        }
    }
}

/// Compute the writes that reconcile `existing` Current rows with the `incoming` batch.
///
/// `now` is the timestamp stamped on new and updated rows and on Logs rows.
pub fn plan(existing: &[StoredDog], incoming: &[DogRecord], now: &str) -> SyncPlan {
    let mut lookup: HashMap<DogKey, (usize, &StoredDog)> = HashMap::new();
    let mut shadowed: Vec<(DogKey, usize, &StoredDog)> = Vec::new();
    for (position, dog) in existing.iter().enumerate() {
        let Some(key) = dog.record.key() else {
            debug!(position, "Current row has no key, ignoring for matching");
            continue;
        };
        if lookup.contains_key(&key) {
            warn!(
                position,
                their_id = %key.their_id,
                rescue = %key.rescue_name,
                "Duplicate key already in Current, later row not matched"
            );
            shadowed.push((key, position, dog));
            continue;
        }
        lookup.insert(key, (position, dog));
    }

    let mut plan = SyncPlan {
        existing_keys: lookup.len(),
        ..SyncPlan::default()
    };
    let mut incoming_keys: HashSet<DogKey> = HashSet::new();

    for record in incoming {
        let Some(key) = record.key() else {
            warn!(name = %record.name, rescue = %record.rescue_name, "Rejected record without key");
            plan.logs
                .push(LogEntry::new(now, MISSING_KEY_MESSAGE, record.to_payload()));
            continue;
        };
        if !incoming_keys.insert(key.clone()) {
            warn!(their_id = %key.their_id, rescue = %key.rescue_name, "Rejected duplicate key in batch");
            plan.logs
                .push(LogEntry::new(now, DUPLICATE_KEY_MESSAGE, record.to_payload()));
            continue;
        }

        match lookup.get(&key) {
            None => {
                debug!(their_id = %key.their_id, rescue = %key.rescue_name, "New dog");
                plan.appends.push(StoredDog::fresh(record.clone(), now));
            }
            Some((_, existing)) if existing.manually_edited => {
                debug!(their_id = %key.their_id, rescue = %key.rescue_name, "Manually edited, skipping field sync");
                plan.manual_skipped += 1;
            }
            Some((position, existing)) if existing.record.differs_from(record) => {
                debug!(position, their_id = %key.their_id, rescue = %key.rescue_name, "Dog changed");
                plan.updates.push(RowUpdate {
                    position: *position,
                    dog: StoredDog::fresh(record.clone(), now),
                });
            }
            Some(_) => plan.unchanged += 1,
        }
    }

    plan.removals = lookup
        .into_iter()
        .map(|(key, (position, dog))| (key, position, dog))
        .chain(shadowed)
        .filter(|(key, _, _)| !incoming_keys.contains(key))
        .map(|(_, position, dog)| Removal {
            position,
            dog: dog.clone(),
        })
        .collect();
    plan.removals.sort_by(|a, b| b.position.cmp(&a.position));

    plan
}

/// Write `plan` to the store in position-safe order.
pub async fn apply<S>(store: &S, plan: &SyncPlan) -> Result<(), SyncError>
where
    S: DogStore + ?Sized,
{
    for update in &plan.updates {
        store
            .update_row(update.position, update.dog.to_update_row())
            .await
            .map_err(|e| write_failed("update", e))?;
    }

    for removal in &plan.removals {
        store
            .append_row(Table::Archive, removal.dog.to_row())
            .await
            .map_err(|e| write_failed("archive", e))?;
        store
            .delete_row(removal.position)
            .await
            .map_err(|e| write_failed("delete", e))?;
        info!(
            position = removal.position,
            name = %removal.dog.record.name,
            rescue = %removal.dog.record.rescue_name,
            "[SYNC] Archived dog"
        );
    }

    for dog in &plan.appends {
        store
            .append_row(Table::Current, dog.to_row())
            .await
            .map_err(|e| write_failed("append", e))?;
    }

    for entry in &plan.logs {
        store
            .append_row(Table::Logs, entry.to_row())
            .await
            .map_err(|e| write_failed("log", e))?;
    }

    Ok(())
}

fn write_failed(step: &'static str, source: StoreError) -> SyncError {
    error!(step, error = %source, "[SYNC][ERROR] Store write failed");
    SyncError::Write { step, source }
}

/// Read Current, plan against `incoming`, apply, and report. Stamps rows with the local time.
pub async fn synchronise<S>(store: &S, incoming: &[DogRecord]) -> Result<SyncReport, SyncError>
where
    S: DogStore + ?Sized,
{
    synchronise_at(store, incoming, Local::now().naive_local()).await
}

/// [`synchronise`] with an explicit timestamp.
pub async fn synchronise_at<S>(
    store: &S,
    incoming: &[DogRecord],
    now: NaiveDateTime,
) -> Result<SyncReport, SyncError>
where
    S: DogStore + ?Sized,
{
    info!(incoming = incoming.len(), "[SYNC] Starting reconciliation");

    let existing = store.read_current().await.map_err(|e| {
        error!(error = %e, "[SYNC][ERROR] Failed to read Current table");
        SyncError::Read(e)
    })?;

    let now = now.format(TIMESTAMP_FORMAT).to_string();
    let plan = plan(&existing, incoming, &now);
    apply(store, &plan).await?;

    let report = plan.report();
    log_summary(&report, plan.existing_keys);
    Ok(report)
}

/// Emit the run summary, flagging removal spikes that usually mean a source outage.
pub fn log_summary(report: &SyncReport, existing_keys: usize) {
    info!(
        added = report.added,
        updated = report.updated,
        removed = report.removed,
        unchanged = report.unchanged,
        manual_skipped = report.manual_skipped,
        rejected = report.rejected,
        "[SYNC] Reconciliation complete"
    );
    if existing_keys > 0 && report.removed as f64 > existing_keys as f64 * OUTAGE_REMOVAL_RATIO {
        warn!(
            removed = report.removed,
            existing = existing_keys,
            "[SYNC] More than half of listed dogs were archived; check for a source outage"
        );
    }
}

/// Read Current and plan against `incoming` without writing anything.
pub async fn preview<S>(store: &S, incoming: &[DogRecord]) -> Result<SyncPlan, SyncError>
where
    S: DogStore + ?Sized,
{
    let existing = store.read_current().await.map_err(SyncError::Read)?;
    let now = Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string();
    let plan = plan(&existing, incoming, &now);
    info!(
        updates = plan.updates.len(),
        appends = plan.appends.len(),
        removals = plan.removals.len(),
        "[SYNC] Dry run planned"
    );
    Ok(plan)
}

/// # fido-sync CLI
///
/// Command parsing and orchestration. Listing, reconciliation and the record
/// model live in [`fido_sync_core`]; this module wires configuration, the
/// Google Sheets store and the producers together.
///
/// - `sync` reconciles the store against every configured producer.
/// - `sync --dry-run` plans the same run and prints it without writing.
/// - `scrape` runs the producers and prints the batch as JSON.
///
/// [`run`] is the async entrypoint used by `main` and the integration tests.
use crate::load_config::load_config;
use crate::sheets::{GoogleSheetsClient, SheetStore};
use anyhow::Result;
use clap::{Parser, Subcommand};
use fido_sync_core::aggregate::aggregate;
use fido_sync_core::contract::SheetRows;
use fido_sync_core::producers::build_producers;
use fido_sync_core::synchronise::{preview, synchronise, SyncPlan, SyncReport};
use std::path::PathBuf;
use std::sync::Arc;

/// CLI for fido-sync: gather foster-dog listings and reconcile the shared spreadsheet.
#[derive(Parser)]
#[clap(
    name = "fido-sync",
    version,
    about = "Aggregate rescue foster-dog listings into the Fido spreadsheet"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile the store with all configured producers
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Plan the run and print it without writing to the store
        #[clap(long)]
        dry_run: bool,
    },
    /// Run the producers and print the aggregated batch as JSON
    Scrape {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync { config, dry_run } => {
            let config = load_config(config)?;
            tracing::info!(
                command = "sync",
                dry_run,
                spreadsheet = %config.spreadsheet,
                "Starting synchronisation process"
            );
            let client = GoogleSheetsClient::new_from_env().map_err(anyhow::Error::msg)?;
            let store = SheetStore::open(client.clone(), &config.spreadsheet, &config.store)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to open store '{}': {e}", config.spreadsheet))?;

            let sheets: Arc<dyn SheetRows> = Arc::new(client);
            let producers = build_producers(&config.producers, sheets);
            let batch = aggregate(&producers).await;

            if dry_run {
                let plan = preview(&store, &batch.records)
                    .await
                    .map_err(|e| anyhow::anyhow!("Dry run failed: {e}"))?;
                print_plan(&plan);
                return Ok(());
            }

            match synchronise(&store, &batch.records).await {
                Ok(report) => {
                    tracing::info!(command = "sync", ?report, "Synchronisation complete");
                    print_report(&report);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "sync", error = %e, "Synchronisation failed");
                    Err(anyhow::Error::msg(e))
                }
            }
        }
        Commands::Scrape { config } => {
            let config = load_config(config)?;
            tracing::info!(command = "scrape", "Running producers");
            let sheets: Arc<dyn SheetRows> = match GoogleSheetsClient::new_from_env() {
                Ok(client) => Arc::new(client),
                Err(e) => {
                    tracing::warn!(error = %e, "Sheet-backed producers will yield nothing");
                    Arc::new(GoogleSheetsClient::new(String::new()))
                }
            };
            let producers = build_producers(&config.producers, sheets);
            let batch = aggregate(&producers).await;
            for count in &batch.per_producer {
                tracing::info!(producer = %count.producer, records = count.records, "Producer finished");
            }
            println!("{}", serde_json::to_string_pretty(&batch.records)?);
            Ok(())
        }
    }
}

fn print_report(report: &SyncReport) {
    println!(
        "Synchronise complete: {} added, {} updated, {} removed, {} unchanged, {} skipped (manual), {} rejected",
        report.added,
        report.updated,
        report.removed,
        report.unchanged,
        report.manual_skipped,
        report.rejected
    );
}

fn print_plan(plan: &SyncPlan) {
    if plan.is_empty() {
        println!("Dry run: store already up to date ({} unchanged)", plan.unchanged);
        return;
    }
    for update in &plan.updates {
        println!(
            "update  row {}: {} ({})",
            update.position + 2,
            update.dog.record.name,
            update.dog.record.rescue_name
        );
    }
    for dog in &plan.appends {
        println!("add     {} ({})", dog.record.name, dog.record.rescue_name);
    }
    for removal in &plan.removals {
        println!(
            "archive row {}: {} ({})",
            removal.position + 2,
            removal.dog.record.name,
            removal.dog.record.rescue_name
        );
    }
    for entry in &plan.logs {
        println!("log     {}: {}", entry.message, entry.payload);
    }
    let report = plan.report();
    println!(
        "Dry run: {} to add, {} to update, {} to remove, {} unchanged, {} skipped (manual), {} rejected",
        report.added,
        report.updated,
        report.removed,
        report.unchanged,
        report.manual_skipped,
        report.rejected
    );
}

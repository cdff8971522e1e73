//! Aggregator: runs every registered producer in order and concatenates their output.

use tracing::{info, warn};

use crate::contract::Producer;
use crate::record::DogRecord;

/// How many records one producer contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerCount {
    pub producer: String,
    pub records: usize,
}

/// The incoming batch for a reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub records: Vec<DogRecord>,
    pub per_producer: Vec<ProducerCount>,
}

/// Run `producers` sequentially in registration order; output order is preserved.
///
/// A producer returning nothing is reported with a warning, since its dogs will
/// be archived by the following reconciliation.
pub async fn aggregate(producers: &[Box<dyn Producer>]) -> Batch {
    let mut batch = Batch::default();
    for producer in producers {
        let name = producer.name();
        info!(producer = %name, "Pulling from producer");
        let records = producer.produce().await;
        if records.is_empty() {
            warn!(producer = %name, "Producer returned no dogs");
        } else {
            info!(producer = %name, count = records.len(), "Producer returned dogs");
        }
        batch.per_producer.push(ProducerCount {
            producer: name,
            records: records.len(),
        });
        batch.records.extend(records);
    }
    info!(total = batch.records.len(), "Total dogs info grabbed");
    batch
}

use super::lookup::lookup;
use crate::ports::{DnsClient, DnsClientFactory};
use dnsclient_domain::ClientError;
use hickory_proto::op::Message;
use hickory_proto::rr::RecordType;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

pub const DEFAULT_SCAN_WORKERS: usize = 8;

/// Outcome of one name in a bulk scan.
#[derive(Debug)]
pub struct ScanRecord {
    pub name: String,
    pub record_type: RecordType,
    pub result: Result<Message, ClientError>,
}

/// Resolves many names with a fixed pool of workers, each owning its own
/// client.
pub struct ScanUseCase {
    factory: Arc<dyn DnsClientFactory>,
    record_type: RecordType,
    workers: usize,
}

impl ScanUseCase {
    pub fn new(factory: Arc<dyn DnsClientFactory>, record_type: RecordType) -> Self {
        Self {
            factory,
            record_type,
            workers: DEFAULT_SCAN_WORKERS,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Starts the pool and returns the result stream. The stream ends once
    /// every worker has finished and closed its client; it yields exactly
    /// one record per input name.
    pub fn execute(&self, names: Vec<String>) -> mpsc::Receiver<ScanRecord> {
        let capacity = self.workers * 2;
        let (work_tx, work_rx) = mpsc::channel::<String>(capacity);
        let work_rx = Arc::new(Mutex::new(work_rx));
        let (result_tx, result_rx) = mpsc::channel(capacity);

        info!(
            names = names.len(),
            workers = self.workers,
            qtype = %self.record_type,
            "Starting scan"
        );

        for worker in 0..self.workers {
            let factory = Arc::clone(&self.factory);
            let work_rx = Arc::clone(&work_rx);
            let result_tx = result_tx.clone();
            let record_type = self.record_type;
            tokio::spawn(async move {
                run_worker(worker, factory, work_rx, result_tx, record_type).await;
            });
        }
        drop(result_tx);

        tokio::spawn(async move {
            for name in names {
                if work_tx.send(name).await.is_err() {
                    break;
                }
            }
        });

        result_rx
    }
}

async fn run_worker(
    worker: usize,
    factory: Arc<dyn DnsClientFactory>,
    work_rx: Arc<Mutex<mpsc::Receiver<String>>>,
    result_tx: mpsc::Sender<ScanRecord>,
    record_type: RecordType,
) {
    let mut client: Option<Box<dyn DnsClient>> = None;
    let mut processed = 0usize;

    loop {
        let next = work_rx.lock().await.recv().await;
        let Some(name) = next else { break };
        processed += 1;

        if client.is_none() {
            match factory.create() {
                Ok(created) => client = Some(created),
                Err(e) => {
                    warn!(worker, error = %e, "Failed to create client");
                    let record = ScanRecord {
                        name,
                        record_type,
                        result: Err(e),
                    };
                    if result_tx.send(record).await.is_err() {
                        break;
                    }
                    continue;
                }
            }
        }

        let Some(active) = client.as_mut() else {
            continue;
        };
        let result = lookup(active.as_mut(), &name, record_type).await;
        let record = ScanRecord {
            name,
            record_type,
            result,
        };
        if result_tx.send(record).await.is_err() {
            break;
        }
    }

    if let Some(mut active) = client {
        if let Err(e) = active.close().await {
            warn!(worker, error = %e, "Failed to close client");
        }
    }
    debug!(worker, processed, "Scan worker finished");
}

use crate::{RequestId, Selection};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub const DEFAULT_SELECTION_TTL: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

struct SelectionRecord {
    selection: Selection,
    created_at: Instant,
}

// Records expire a fixed time after they were put, regardless of reads.
pub struct SelectionStore {
    records: RwLock<HashMap<RequestId, SelectionRecord>>,
    ttl: Duration,
}

impl SelectionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn put(&self, request_id: RequestId, selection: Selection) {
        debug!(%request_id, entities = selection.len(), "Storing selection");

        let record = SelectionRecord {
            selection,
            created_at: Instant::now(),
        };

        self.records.write().insert(request_id, record);
    }

    pub fn get(&self, request_id: &RequestId) -> Option<Selection> {
        debug!(%request_id, "Looking up selection");

        self.records
            .read()
            .get(request_id)
            .map(|record| record.selection.clone())
    }

    pub fn delete(&self, request_id: &RequestId) {
        debug!(%request_id, "Deleting selection");

        self.records.write().remove(request_id);
    }

    pub fn purge_expired(&self, now: Instant) -> usize {
        let mut records = self.records.write();
        let before = records.len();

        records.retain(|request_id, record| {
            let age = now.saturating_duration_since(record.created_at);
            if age > self.ttl {
                info!(%request_id, ?age, "Removing expired selection");
                false
            } else {
                true
            }
        });

        before - records.len()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> Sweeper {
        let stop = CancellationToken::new();
        let interval = interval.max(Duration::from_millis(1));

        let handle = tokio::spawn({
            let store = Arc::clone(self);
            let stop = stop.clone();

            async move {
                let mut ticker = tokio::time::interval(interval);
                // The first tick completes immediately.
                ticker.tick().await;

                loop {
                    tokio::select! {
                        _ = stop.cancelled() => break,
                        _ = ticker.tick() => {
                            let removed = store.purge_expired(Instant::now());
                            debug!(removed, "Selection sweep complete");
                        }
                    }
                }

                debug!("Selection sweeper stopped");
            }
        });

        Sweeper { stop, handle }
    }
}

pub struct Sweeper {
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

impl Sweeper {
    pub async fn shutdown(self) {
        self.stop.cancel();

        if let Err(error) = self.handle.await {
            error!(?error, "Selection sweeper terminated abnormally");
        }
    }
}

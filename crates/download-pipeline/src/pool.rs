use crate::{DownloadJob, DownloadQueue, JobHandler, QueueError};
use async_lock::Mutex;
use async_trait::async_trait;
use futures_lite::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const DEFAULT_WORKER_POOL_SIZE: usize = 5;
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Running,
    Draining,
    Stopped,
}

pub struct DownloadWorkerPool {
    sender: parking_lot::Mutex<Option<mpsc::Sender<DownloadJob>>>,
    receiver: Arc<Mutex<mpsc::Receiver<DownloadJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    stop: CancellationToken,
    state: parking_lot::Mutex<PoolState>,
}

impl DownloadWorkerPool {
    pub fn start(size: usize, capacity: usize, handler: Arc<dyn JobHandler>) -> Self {
        let size = size.max(1);
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let stop = CancellationToken::new();

        let workers = (0..size)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    Arc::clone(&receiver),
                    stop.clone(),
                    Arc::clone(&handler),
                ))
            })
            .collect();

        info!(size, capacity, "Download worker pool started");

        Self {
            sender: parking_lot::Mutex::new(Some(sender)),
            receiver,
            workers: Mutex::new(workers),
            stop,
            state: parking_lot::Mutex::new(PoolState::Running),
        }
    }

    pub fn state(&self) -> PoolState {
        *self.state.lock()
    }

    // Jobs still waiting in the queue are discarded. Producers blocked in
    // `enqueue` are released with `QueueError::Closed`.
    pub async fn shutdown(&self) -> Result<(), QueueError> {
        {
            let mut state = self.state.lock();
            if *state != PoolState::Running {
                return Err(QueueError::Closed);
            }
            *state = PoolState::Draining;
        }

        info!("Shutting down download worker pool...");

        self.stop.cancel();
        self.sender.lock().take();

        let workers = std::mem::take(&mut *self.workers.lock().await);
        for (worker_id, handle) in workers.into_iter().enumerate() {
            if let Err(error) = handle.await {
                error!(worker_id, ?error, "Download worker terminated abnormally");
            }
        }

        let mut receiver = self.receiver.lock().await;
        receiver.close();

        let mut discarded = 0usize;
        while let Ok(job) = receiver.try_recv() {
            warn!(
                request_id = %job.request_id,
                track_id = %job.track_id,
                "Discarding queued download job"
            );
            discarded += 1;
        }

        *self.state.lock() = PoolState::Stopped;

        info!(discarded, "Download worker pool stopped");

        Ok(())
    }
}

#[async_trait]
impl DownloadQueue for DownloadWorkerPool {
    async fn enqueue(
        &self,
        job: DownloadJob,
        cancellation: &CancellationToken,
    ) -> Result<(), QueueError> {
        let sender = self.sender.lock().clone();
        let Some(sender) = sender else {
            return Err(QueueError::Closed);
        };

        tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(QueueError::Cancelled),
            result = sender.send(job) => result.map_err(|_| QueueError::Closed),
        }
    }
}

async fn next_job(receiver: &Mutex<mpsc::Receiver<DownloadJob>>) -> Option<DownloadJob> {
    receiver.lock().await.recv().await
}

async fn run_worker(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<DownloadJob>>>,
    stop: CancellationToken,
    handler: Arc<dyn JobHandler>,
) {
    debug!(worker_id, "Download worker started");

    loop {
        let job = tokio::select! {
            biased;
            _ = stop.cancelled() => {
                info!(worker_id, "Received stop signal, worker exiting");
                break;
            }
            job = next_job(&receiver) => match job {
                Some(job) => job,
                None => {
                    info!(worker_id, "Jobs queue closed, worker exiting");
                    break;
                }
            },
        };

        info!(
            worker_id,
            request_id = %job.request_id,
            track_id = %job.track_id,
            "Processing download job"
        );

        match AssertUnwindSafe(handler.handle(&job)).catch_unwind().await {
            Ok(Ok(())) => {
                info!(
                    worker_id,
                    request_id = %job.request_id,
                    track_id = %job.track_id,
                    "Download job finished"
                );
            }
            Ok(Err(error)) => {
                error!(
                    worker_id,
                    request_id = %job.request_id,
                    track_id = %job.track_id,
                    %error,
                    "Download job failed"
                );
            }
            Err(_) => {
                error!(
                    worker_id,
                    request_id = %job.request_id,
                    track_id = %job.track_id,
                    "Download job panicked"
                );
            }
        }
    }
}

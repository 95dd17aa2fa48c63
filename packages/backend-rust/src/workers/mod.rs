mod pending_cleanup;

pub use pending_cleanup::purge_expired_pending;

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{info, warn};

use crate::personalizer::Personalizer;

pub struct WorkerManager {
    scheduler: Mutex<JobScheduler>,
    shutdown_tx: broadcast::Sender<()>,
    personalizers: Vec<Arc<Personalizer>>,
}

impl WorkerManager {
    pub async fn new(personalizers: Vec<Arc<Personalizer>>) -> Result<Self, WorkerError> {
        let scheduler = JobScheduler::new().await.map_err(WorkerError::Scheduler)?;
        let (shutdown_tx, _) = broadcast::channel(1);
        Ok(Self {
            scheduler: Mutex::new(scheduler),
            shutdown_tx,
            personalizers,
        })
    }

    pub async fn start(&self, cleanup_schedule: &str) -> Result<(), WorkerError> {
        info!("Starting workers");

        let scheduler = self.scheduler.lock().await;

        {
            let personalizers = self.personalizers.clone();
            let shutdown_rx = self.shutdown_tx.subscribe();
            let job = Job::new_async(cleanup_schedule, move |_uuid, _lock| {
                let personalizers = personalizers.clone();
                let mut rx = shutdown_rx.resubscribe();
                Box::pin(async move {
                    tokio::select! {
                        _ = rx.recv() => {},
                        _ = purge_expired_pending(&personalizers) => {}
                    }
                })
            })
            .map_err(WorkerError::Scheduler)?;
            scheduler.add(job).await.map_err(WorkerError::Scheduler)?;
            info!(schedule = %cleanup_schedule, "Pending cleanup worker scheduled");
        }

        scheduler.start().await.map_err(WorkerError::Scheduler)?;
        info!("Workers started");
        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping workers...");
        let _ = self.shutdown_tx.send(());

        let mut scheduler = self.scheduler.lock().await;
        if let Err(e) = scheduler.shutdown().await {
            warn!(error = %e, "Error shutting down scheduler");
        }

        info!("Workers stopped");
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
}

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use crate::personalizer::Personalizer;

#[derive(Debug, Default)]
struct CleanupStats {
    expired_pending: usize,
    duration_secs: f64,
}

/// Drop pending experiences whose feedback never arrived
pub async fn purge_expired_pending(personalizers: &[Arc<Personalizer>]) -> usize {
    let start = Instant::now();
    debug!("Starting pending cleanup cycle");

    let now = Utc::now();
    let mut stats = CleanupStats::default();
    for personalizer in personalizers {
        stats.expired_pending += personalizer.purge_expired(now).await;
    }

    stats.duration_secs = start.elapsed().as_secs_f64();

    if stats.expired_pending > 0 {
        info!(
            expired_pending = stats.expired_pending,
            duration_secs = format!("{:.3}", stats.duration_secs),
            "Pending cleanup completed"
        );
    }

    stats.expired_pending
}

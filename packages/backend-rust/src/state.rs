use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ServiceError;
use crate::experience::{ExperienceSink, JsonlSink, LogSink};
use crate::personalizer::{
    Personalizer, PersonalizerOptions, EXERCISE_PERSONALIZER, INTERVENTION_PERSONALIZER,
};
use crate::workers::WorkerManager;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizerStatus {
    pub name: String,
    pub degraded: bool,
    pub catalog_size: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStatus {
    pub uptime_secs: u64,
    pub sink: &'static str,
    pub workers: bool,
    pub personalizers: Vec<PersonalizerStatus>,
}

/// Both personalizers, the shared experience sink and the maintenance
/// workers. Built once at startup and torn down with [`AppState::shutdown`].
#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    exercise: Arc<Personalizer>,
    intervention: Arc<Personalizer>,
    sink: Arc<dyn ExperienceSink>,
    workers: Option<Arc<WorkerManager>>,
}

impl AppState {
    pub fn new(
        exercise: Arc<Personalizer>,
        intervention: Arc<Personalizer>,
        sink: Arc<dyn ExperienceSink>,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            exercise,
            intervention,
            sink,
            workers: None,
        }
    }

    pub async fn start(config: &Config) -> Result<Self, ServiceError> {
        let sink = build_sink(config).await?;
        let options = PersonalizerOptions {
            pending_ttl: config.pending_ttl,
            max_pending: config.pending_max_entries,
            fallback_seed: config.fallback_seed,
        };

        let exercise = Arc::new(Personalizer::exercise(
            &config.exercise_policy_path,
            Arc::clone(&sink),
            options.clone(),
        )?);
        let intervention = Arc::new(Personalizer::intervention(
            &config.intervention_policy_path,
            Arc::clone(&sink),
            options,
        )?);

        let mut state = Self::new(exercise, intervention, sink);

        if config.cleanup_enabled {
            let manager = WorkerManager::new(state.personalizers()).await?;
            manager.start(&config.cleanup_schedule).await?;
            state.workers = Some(Arc::new(manager));
        } else {
            info!("Pending cleanup worker disabled");
        }

        info!(
            exercise_degraded = state.exercise.is_degraded(),
            intervention_degraded = state.intervention.is_degraded(),
            sink = state.sink.kind(),
            "Personalizers ready"
        );
        Ok(state)
    }

    pub fn exercise(&self) -> &Arc<Personalizer> {
        &self.exercise
    }

    pub fn intervention(&self) -> &Arc<Personalizer> {
        &self.intervention
    }

    pub fn personalizer(&self, name: &str) -> Option<&Arc<Personalizer>> {
        match name {
            EXERCISE_PERSONALIZER => Some(&self.exercise),
            INTERVENTION_PERSONALIZER => Some(&self.intervention),
            _ => None,
        }
    }

    pub fn personalizers(&self) -> Vec<Arc<Personalizer>> {
        vec![Arc::clone(&self.exercise), Arc::clone(&self.intervention)]
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub async fn status(&self) -> RuntimeStatus {
        let mut personalizers = Vec::with_capacity(2);
        for personalizer in [&self.exercise, &self.intervention] {
            personalizers.push(PersonalizerStatus {
                name: personalizer.name().to_string(),
                degraded: personalizer.is_degraded(),
                catalog_size: personalizer.catalog().len(),
                pending: personalizer.pending_count().await,
            });
        }
        RuntimeStatus {
            uptime_secs: self.uptime_seconds(),
            sink: self.sink.kind(),
            workers: self.workers.is_some(),
            personalizers,
        }
    }

    pub async fn shutdown(&self) {
        if let Some(workers) = &self.workers {
            workers.stop().await;
        }
        if let Err(e) = self.sink.flush().await {
            warn!(error = %e, "Failed to flush experience sink");
        }
        info!("Personalizers shut down");
    }
}

async fn build_sink(config: &Config) -> Result<Arc<dyn ExperienceSink>, ServiceError> {
    match &config.experience_log_path {
        Some(path) => Ok(Arc::new(JsonlSink::open(path).await?)),
        None => Ok(Arc::new(LogSink)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config(dir: &std::path::Path) -> Config {
        Config {
            exercise_policy_path: dir.join("missing_exercise.json"),
            intervention_policy_path: dir.join("missing_intervention.json"),
            cleanup_enabled: false,
            fallback_seed: Some(3),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn starts_degraded_without_policies() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::start(&offline_config(dir.path())).await.unwrap();
        let status = state.status().await;
        assert_eq!(status.sink, "log");
        assert!(!status.workers);
        assert!(status.personalizers.iter().all(|p| p.degraded));
        assert_eq!(status.personalizers[0].catalog_size, 10);
        assert_eq!(status.personalizers[1].catalog_size, 5);
        state.shutdown().await;
    }

    #[tokio::test]
    async fn jsonl_sink_when_log_path_set() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            experience_log_path: Some(dir.path().join("experiences.jsonl")),
            ..offline_config(dir.path())
        };
        let state = AppState::start(&config).await.unwrap();
        assert_eq!(state.status().await.sink, "jsonl");
        assert!(state.personalizer("exercise").is_some());
        assert!(state.personalizer("unknown").is_none());
        state.shutdown().await;
    }
}

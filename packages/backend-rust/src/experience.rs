use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::info;

use reframe_algo::{SelectionMode, StateVector};

use crate::error::ServiceError;

/// (state, action, reward) with enough context for offline retraining
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub session_id: String,
    pub personalizer: String,
    pub state: StateVector,
    pub action_index: usize,
    pub action: String,
    pub reward: f64,
    pub mode: SelectionMode,
    pub propensity: f64,
    pub selected_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

#[async_trait]
pub trait ExperienceSink: Send + Sync {
    async fn record(&self, experience: &Experience) -> Result<(), ServiceError>;

    async fn flush(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    fn kind(&self) -> &'static str;
}

/// Structured log line per experience, nothing persisted
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl ExperienceSink for LogSink {
    async fn record(&self, experience: &Experience) -> Result<(), ServiceError> {
        info!(
            personalizer = %experience.personalizer,
            session_id = %experience.session_id,
            action = %experience.action,
            action_index = experience.action_index,
            reward = experience.reward,
            mode = experience.mode.as_str(),
            "Received feedback"
        );
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "log"
    }
}

/// Appends one JSON document per line
pub struct JsonlSink {
    path: PathBuf,
    file: tokio::sync::Mutex<tokio::fs::File>,
}

impl JsonlSink {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        info!(path = %path.display(), "Experience log opened");
        Ok(Self {
            path,
            file: tokio::sync::Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ExperienceSink for JsonlSink {
    async fn record(&self, experience: &Experience) -> Result<(), ServiceError> {
        let mut line = serde_json::to_vec(experience)?;
        line.push(b'\n');
        let mut file = self.file.lock().await;
        file.write_all(&line).await?;
        file.flush().await?;
        LogSink.record(experience).await
    }

    async fn flush(&self) -> Result<(), ServiceError> {
        let mut file = self.file.lock().await;
        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "jsonl"
    }
}

/// Keeps experiences in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    experiences: Mutex<Vec<Experience>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn experiences(&self) -> Vec<Experience> {
        self.experiences.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.experiences.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiences.lock().is_empty()
    }
}

#[async_trait]
impl ExperienceSink for MemorySink {
    async fn record(&self, experience: &Experience) -> Result<(), ServiceError> {
        self.experiences.lock().push(experience.clone());
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

/// Read back a JSONL experience log, skipping lines that do not parse
pub async fn read_jsonl(path: impl AsRef<Path>) -> Result<Vec<Experience>, ServiceError> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect())
}

use reframe_algo::AlgoError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("policy for {personalizer} does not fit its catalog: {detail}")]
    CatalogMismatch { personalizer: String, detail: String },

    #[error("policy returned an unusable action: {0}")]
    Policy(#[from] AlgoError),

    #[error("experience sink error: {0}")]
    Sink(#[from] std::io::Error),

    #[error("experience serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("worker error: {0}")]
    Worker(#[from] crate::workers::WorkerError),
}

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AlgoError {
    #[error("category value for {label:?} must be in [0, 1], got {value}")]
    InvalidCategoryValue { label: String, value: f64 },

    #[error("duplicate {kind} entry {label:?}")]
    Duplicate { kind: &'static str, label: String },

    #[error("action catalog must not be empty")]
    EmptyCatalog,

    #[error("action index {index} out of range for catalog of {len}")]
    ActionOutOfRange { index: usize, len: usize },

    #[error("state has {actual} dimensions, expected {expected}")]
    StateDimension { expected: usize, actual: usize },

    #[error("policy shape error: {0}")]
    PolicyShape(String),

    #[error("failed to read policy {path}: {source}")]
    PolicyIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse policy {path}: {source}")]
    PolicyParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

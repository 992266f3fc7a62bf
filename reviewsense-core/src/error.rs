use {
    std::{io, path::PathBuf},
    thiserror::Error,
    crate::entity::SentimentLabel,
};

pub type Result<T> = std::result::Result<T, ReviewSenseError>;

#[derive(Error, Debug)]
pub enum ReviewSenseError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("row {row}: unrecognized sentiment label {value:?}")]
    UnrecognizedLabel { row: usize, value: String },

    #[error("corpus is empty after cleaning")]
    EmptyCorpus,

    #[error("class {label} has {count} examples, oversampling needs at least {required}")]
    InsufficientMinority { label: SentimentLabel, count: usize, required: usize },

    #[error("cannot stratify split: class {label} has {count} examples, at least 2 are required")]
    UnstratifiableSplit { label: SentimentLabel, count: usize },

    #[error("model artifact not found at {}", path.display())]
    ArtifactNotFound { path: PathBuf },

    #[error("model artifact at {} is corrupt: {reason}", path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl ReviewSenseError {
    pub fn validation(message: impl Into<String>) -> Self {
        ReviewSenseError::Validation(message.into())
    }
}

use crate::types::HierarchyLevel;
use thiserror::Error;

/// Caller contract violations. Data problems never surface here; they
/// degrade to empty or zero results instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown hierarchy level: {0}")]
    UnknownLevel(String),

    #[error("unknown filter key: {0}")]
    UnknownFilterKey(String),

    #[error("unknown value field: {0}")]
    UnknownValueField(String),

    #[error("{0} has no parent level to section by")]
    NoParentLevel(HierarchyLevel),
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected payload shape: {0}")]
    Shape(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("no unit price for item: {0}")]
    UnknownItem(String),

    #[error("volume must be a positive number, got {0}")]
    InvalidVolume(f64),

    #[error("year {year} outside projection range {min}..={max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },
}

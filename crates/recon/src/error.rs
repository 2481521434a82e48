use std::fmt;

use crate::model::DatasetKind;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad tolerance, zero pack size, etc.).
    ConfigValidation(String),
    /// Not enough data for a meaningful comparison.
    Precondition(String),
    /// A dataset exceeds the configured row limit.
    InputTooLarge { dataset: DatasetKind, rows: usize, limit: usize },
    /// Report could not be rendered.
    Serialize(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Precondition(msg) => write!(f, "precondition failed: {msg}"),
            Self::InputTooLarge { dataset, rows, limit } => {
                write!(f, "{dataset} dataset has {rows} rows, limit is {limit}")
            }
            Self::Serialize(msg) => write!(f, "serialization error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Unknown sector code '{code}'")]
    UnknownSector { code: String },

    #[error("Unknown product '{name}'")]
    UnknownProduct { name: String },

    #[error("No historical record for sector '{code}'")]
    MissingHistory { code: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A sector, product or history reference does not resolve.
    Configuration,
    /// A caller-supplied value was rejected before computation.
    InvalidInput,
    /// Journal or serialization failure.
    Internal,
}

impl DashError {
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput { field, reason: reason.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownSector { .. }
            | Self::UnknownProduct { .. }
            | Self::MissingHistory { .. }
            | Self::InvalidConfig { .. } => ErrorKind::Configuration,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Database(_) | Self::Serialization(_) | Self::Other(_) => ErrorKind::Internal,
        }
    }
}

pub type DashResult<T> = Result<T, DashError>;

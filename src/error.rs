use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Why a data file could not be turned into a table
#[derive(Error, Debug)]
pub enum LoadErrorKind {
    #[error("file not found")]
    MissingFile,

    #[error("unreadable: {0}")]
    Unreadable(String),

    #[error("missing expected column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: invalid {column} value '{value}'")]
    InvalidValue {
        row: u64,
        column: &'static str,
        value: String,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load {}: {kind}", path.display())]
    DataLoad { path: PathBuf, kind: LoadErrorKind },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_ARGUMENTS: i32 = 2;
    pub const DATA_LOAD_ERROR: i32 = 3;
    pub const DATABASE_ERROR: i32 = 6;
}

impl Error {
    pub fn data_load(path: impl Into<PathBuf>, kind: LoadErrorKind) -> Self {
        Error::DataLoad {
            path: path.into(),
            kind,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Error::DataLoad { .. } => exit_code::DATA_LOAD_ERROR,
            Error::InvalidRange { .. } | Error::InvalidArgument(_) => exit_code::INVALID_ARGUMENTS,
            Error::Database(_) => exit_code::DATABASE_ERROR,
            _ => exit_code::GENERAL_ERROR,
        }
    }
}

use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const TRANSACTIONS_FILE: &str = "full_df.csv";
pub const RFM_FILE: &str = "rfm.csv";

/// Environment variable holding the tracing filter directive
pub const LOG_ENV: &str = "SHOPDASH_LOG";

/// Locations of the two input tables.
///
/// Also the memoization key of [`crate::data::DataCache`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DataPaths {
    pub transactions: PathBuf,
    pub rfm: PathBuf,
}

impl DataPaths {
    pub fn new(transactions: impl Into<PathBuf>, rfm: impl Into<PathBuf>) -> Self {
        DataPaths {
            transactions: transactions.into(),
            rfm: rfm.into(),
        }
    }

    /// Default file names inside a data directory
    pub fn in_dir(dir: &Path) -> Self {
        DataPaths::new(dir.join(TRANSACTIONS_FILE), dir.join(RFM_FILE))
    }

    /// Resolve explicit overrides against a data directory
    pub fn resolve(dir: &Path, transactions: Option<PathBuf>, rfm: Option<PathBuf>) -> Self {
        let defaults = DataPaths::in_dir(dir);
        DataPaths {
            transactions: transactions.unwrap_or(defaults.transactions),
            rfm: rfm.unwrap_or(defaults.rfm),
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        DataPaths::in_dir(Path::new(DEFAULT_DATA_DIR))
    }
}

pub mod aggregate;
pub mod cli;
pub mod commands;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod format;
pub mod logging;
pub mod pipeline;
pub mod storage;
pub mod tui;

pub use error::{Error, Result};

mod app;
mod ui;

pub use app::{App, Page};

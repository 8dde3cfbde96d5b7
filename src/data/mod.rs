mod cache;
pub mod loader;
mod model;

pub use cache::DataCache;
pub use loader::{Dataset, load_rfm, load_transactions, parse_rfm, parse_transactions};
pub use model::{CustomerRfm, DateBounds, Transaction};

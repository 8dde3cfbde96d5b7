pub mod query;
pub mod report;
pub mod segments;
pub mod view;

pub mod config;
pub mod db;
pub mod errors;
pub mod ingest;
pub mod lambda;
pub mod metrics;
pub mod model;
pub mod mqtt;
pub mod query;
pub mod range;
pub mod response;
pub mod rest;
pub mod store;
pub mod validate;

pub use errors::{Error, Result};
pub use store::{MemoryStore, ReadingStore, SharedStore};

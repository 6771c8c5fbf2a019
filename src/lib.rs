//! REST backend for property listings and user ratings over a document store.

pub mod api;
pub mod config;
pub mod lifecycle;
pub mod storage;

pub use api::{AppState, app};
pub use config::AppConfig;
pub use storage::StorageContext;

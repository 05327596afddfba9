//! A directory tree served as a flat text store over HTTP.
//!
//! `GET`/`POST`/`PUT`/`DELETE` on `<prefix>/<path>` retrieve, create, modify
//! and remove `<root>/<path>.txt`. A `GET` on a directory path (empty or
//! ending in `/`) returns word statistics for that directory's files.

pub mod config;
pub mod content;
pub mod errors;
pub mod file_system;
pub mod guards;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod statistics;
pub mod tokenizer;

pub use config::{Config, StoreConfig};
pub use errors::StoreError;
pub use handlers::configure;

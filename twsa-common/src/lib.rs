//! # TWSA Common Library
//!
//! Shared code for the Tweet Sentiment Analyzer crates:
//! - Record model and the record store adapter (SQLite, in-memory)
//! - Configuration loading
//! - Common error types
//! - Timestamp utilities

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use db::{Record, RecordStore, Sentiment};
pub use error::{Error, Result, StoreError};

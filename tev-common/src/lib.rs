//! # TEV Common Library
//!
//! Shared code for the Tumblr Export Viewer:
//! - Database models, schema and queries
//! - Readers and writer for Tumblr export XML
//! - Configuration loading
//! - Error types

pub mod config;
pub mod db;
pub mod error;
pub mod xml;

pub use error::{Error, Result};

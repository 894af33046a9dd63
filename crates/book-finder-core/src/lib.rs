#![deny(missing_docs)]
//! Book finder core library.
//!
//! Query building and Internet Archive access shared by both bot variants.

/// Internet Archive search, metadata and link probing.
pub mod archive;
/// Configuration management.
pub mod config;
/// Turning free-text user input into archive search queries.
pub mod query;
/// Utility functions.
pub mod utils;

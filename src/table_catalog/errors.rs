//! # Table Catalog Error Types
//!
//! Errors raised while loading or querying table metadata.
//!
//! ## Error Categories
//!
//! - **Store Errors**: the metadata store could not answer a lookup
//! - **Catalog File Errors**: I/O and parsing issues while loading a catalog file
//! - **Record Errors**: a metadata record violates the catalog's shape
//!
//! The resolver never surfaces these to its callers: a failed lookup is logged
//! and the reference is treated as unresolved. They matter to code that loads
//! or maintains a catalog.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Metadata store unavailable: {message}")]
    StoreUnavailable { message: String },
    #[error("Failed to read catalog file '{path}': {error}")]
    CatalogReadError { path: String, error: String },
    #[error("Failed to parse catalog: {error}")]
    CatalogParseError { error: String },
    #[error("Invalid metadata record for `{table}`: {message}")]
    InvalidRecord { table: String, message: String },
}

impl CatalogError {
    pub fn invalid_record(table: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::InvalidRecord {
            table: table.into(),
            message: message.into(),
        }
    }
}

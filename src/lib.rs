//! dra-resolver - Cross-source table resolution and query rewriting
//!
//! Queries authored against a data model name tables the way they appeared at
//! their source (a MySQL schema, an Excel sheet, a Google Analytics report).
//! The sync process stores those tables in the warehouse under suffixed
//! physical names. This crate provides:
//! - A table catalog: metadata records, the metadata store capability, and the
//!   per-source physical naming conventions
//! - A resolver mapping logical `(schema, table)` references to physical tables
//! - A rewriter applying that mapping to SQL text

pub mod config;
pub mod query_resolver;
pub mod table_catalog;

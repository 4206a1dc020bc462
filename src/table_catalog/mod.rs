pub mod errors;
pub mod metadata;
pub mod naming;
pub mod store;

// Re-export commonly used types
pub use errors::CatalogError;
pub use metadata::{LogicalTableReference, TableMetadataRecord, TableType};
pub use naming::{
    normalize_identifier, physical_schema_name, NamingConvention, DEFAULT_MAX_IDENTIFIER_LENGTH,
};
pub use store::{CatalogFile, InMemoryMetadataStore, MetadataQuery, MetadataStore};

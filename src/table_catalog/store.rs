//! Metadata store capability and its in-memory implementation.
//!
//! The resolver only needs one operation from whatever persists table metadata:
//! [`MetadataStore::find`], filtered by data source and optionally by schema and
//! by name (physical or recorded original), ordered most recent first.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::errors::CatalogError;
use super::metadata::TableMetadataRecord;

/// Filter for [`MetadataStore::find`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetadataQuery {
    pub data_source_id: i64,
    /// Physical schema; `None` matches any schema
    pub schema: Option<String>,
    /// Physical table name OR recorded original name; `None` matches any table
    pub name: Option<String>,
}

impl MetadataQuery {
    pub fn for_data_source(data_source_id: i64) -> Self {
        Self {
            data_source_id,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn matches(&self, record: &TableMetadataRecord) -> bool {
        record.data_source_id == self.data_source_id
            && self
                .schema
                .as_deref()
                .is_none_or(|schema| record.schema_name == schema)
            && self.name.as_deref().is_none_or(|name| record.is_named(name))
    }
}

/// Read access to synced table metadata.
///
/// Implementations must return matching records ordered by `created_at`,
/// most recent first. Retry and timeout policy belongs to the implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn find(&self, query: &MetadataQuery) -> Result<Vec<TableMetadataRecord>, CatalogError>;
}

#[async_trait]
impl<S: MetadataStore + ?Sized> MetadataStore for Arc<S> {
    async fn find(&self, query: &MetadataQuery) -> Result<Vec<TableMetadataRecord>, CatalogError> {
        (**self).find(query).await
    }
}

/// On-disk catalog format: a list of synced tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub tables: Vec<TableMetadataRecord>,
}

/// Metadata store backed by a vector of records.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    records: RwLock<Vec<TableMetadataRecord>>,
}

impl InMemoryMetadataStore {
    /// Build a store, rejecting records that fail validation.
    pub fn new(records: Vec<TableMetadataRecord>) -> Result<Self, CatalogError> {
        for record in &records {
            record.validate()?;
        }
        Ok(Self {
            records: RwLock::new(records),
        })
    }

    /// Load a catalog from YAML (or JSON) content
    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        let catalog: CatalogFile =
            serde_yaml::from_str(content).map_err(|e| CatalogError::CatalogParseError {
                error: e.to_string(),
            })?;
        Self::new(catalog.tables)
    }

    /// Load a catalog file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| CatalogError::CatalogReadError {
                path: path.display().to_string(),
                error: e.to_string(),
            })?;
        let store = Self::from_yaml_str(&content)?;
        info!("Loaded table catalog from {}", path.display());
        Ok(store)
    }

    pub async fn insert(&self, record: TableMetadataRecord) -> Result<(), CatalogError> {
        record.validate()?;
        debug!(
            "Registering {}.{} for data source {}",
            record.schema_name, record.physical_table_name, record.data_source_id
        );
        self.records.write().await.push(record);
        Ok(())
    }

    /// Point an existing record at a new physical table name.
    ///
    /// Returns `false` when no record of that data source had `old_name`.
    pub async fn rename_physical_table(
        &self,
        data_source_id: i64,
        old_name: &str,
        new_name: &str,
    ) -> Result<bool, CatalogError> {
        if new_name.trim().is_empty() {
            return Err(CatalogError::invalid_record(old_name, "new physical name is empty"));
        }
        let mut records = self.records.write().await;
        let Some(record) = records
            .iter_mut()
            .find(|r| r.data_source_id == data_source_id && r.physical_table_name == old_name)
        else {
            return Ok(false);
        };
        info!(
            "Renaming physical table {}.{} -> {}",
            record.schema_name, old_name, new_name
        );
        record.physical_table_name = new_name.to_string();
        Ok(true)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn find(&self, query: &MetadataQuery) -> Result<Vec<TableMetadataRecord>, CatalogError> {
        let records = self.records.read().await;
        let mut found: Vec<TableMetadataRecord> = records
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

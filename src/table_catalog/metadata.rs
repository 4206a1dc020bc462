//! Table metadata records and logical table references.
//!
//! A [`TableMetadataRecord`] describes one table the sync process created in the
//! warehouse. A [`LogicalTableReference`] is a `(schema, table)` pair as written
//! in a query descriptor, before anything is known about where it lives.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::CatalogError;

/// Source system a synced table came from.
///
/// Determines which physical naming convention applies to the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TableType {
    MySql,
    MariaDb,
    PostgreSql,
    Excel,
    Pdf,
    GoogleAnalytics,
    GoogleAdManager,
    GoogleAds,
    /// Unrecognised tag, kept verbatim
    Other(String),
}

impl TableType {
    pub fn as_str(&self) -> &str {
        match self {
            TableType::MySql => "mysql",
            TableType::MariaDb => "mariadb",
            TableType::PostgreSql => "postgresql",
            TableType::Excel => "excel",
            TableType::Pdf => "pdf",
            TableType::GoogleAnalytics => "google_analytics",
            TableType::GoogleAdManager => "google_ad_manager",
            TableType::GoogleAds => "google_ads",
            TableType::Other(tag) => tag,
        }
    }

    /// True for uploaded file sources
    pub fn is_file(&self) -> bool {
        matches!(self, TableType::Excel | TableType::Pdf)
    }

    /// True for Google ad/analytics platforms
    pub fn is_google_service(&self) -> bool {
        matches!(
            self,
            TableType::GoogleAnalytics | TableType::GoogleAdManager | TableType::GoogleAds
        )
    }
}

impl From<&str> for TableType {
    fn from(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "mysql" => TableType::MySql,
            "mariadb" => TableType::MariaDb,
            "postgresql" | "postgres" => TableType::PostgreSql,
            "excel" => TableType::Excel,
            "pdf" => TableType::Pdf,
            "google_analytics" => TableType::GoogleAnalytics,
            "google_ad_manager" => TableType::GoogleAdManager,
            "google_ads" => TableType::GoogleAds,
            _ => TableType::Other(tag.to_string()),
        }
    }
}

impl From<String> for TableType {
    fn from(tag: String) -> Self {
        TableType::from(tag.as_str())
    }
}

impl From<TableType> for String {
    fn from(table_type: TableType) -> Self {
        table_type.as_str().to_string()
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One physically synced table in the warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadataRecord {
    /// Owning data source connection
    pub data_source_id: i64,
    /// Warehouse-side schema, e.g. `dra_mysql_22`
    pub schema_name: String,
    /// Storage-layer table name, usually suffixed for uniqueness
    pub physical_table_name: String,
    /// Table, sheet or report name at the source, when it was recorded
    #[serde(default)]
    pub original_table_name: Option<String>,
    pub table_type: TableType,
    /// When the sync created this table; the most recent sync wins ties
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl TableMetadataRecord {
    /// Check that the record can be used for resolution.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.physical_table_name.trim().is_empty() {
            return Err(CatalogError::invalid_record(
                &self.physical_table_name,
                "physical table name is empty",
            ));
        }
        if self.schema_name.trim().is_empty() {
            return Err(CatalogError::invalid_record(
                &self.physical_table_name,
                "schema name is empty",
            ));
        }
        if self.data_source_id <= 0 {
            return Err(CatalogError::invalid_record(
                &self.physical_table_name,
                format!("data source id must be positive, got {}", self.data_source_id),
            ));
        }
        Ok(())
    }

    /// Whether `table` names this record either physically or by its recorded original name.
    pub fn is_named(&self, table: &str) -> bool {
        self.physical_table_name == table || self.original_table_name.as_deref() == Some(table)
    }
}

/// A `(schema, table)` pair as it appears in a query descriptor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogicalTableReference {
    pub schema: String,
    pub table: String,
}

impl LogicalTableReference {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Serialized `schema.table` form used as the mapping key and the rewrite token.
    pub fn key(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

impl fmt::Display for LogicalTableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

//! Logical → physical table mapping produced by the resolver.
//!
//! A mapping is built for exactly one query and then dropped. Physical names
//! change on re-sync and rename, so nothing here is ever cached.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::table_catalog::LogicalTableReference;

/// Where a logical table actually lives in the warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalLocation {
    pub physical_schema: String,
    pub physical_table: String,
    pub data_source_id: i64,
}

impl PhysicalLocation {
    pub fn new(
        physical_schema: impl Into<String>,
        physical_table: impl Into<String>,
        data_source_id: i64,
    ) -> Self {
        Self {
            physical_schema: physical_schema.into(),
            physical_table: physical_table.into(),
            data_source_id,
        }
    }

    /// `physical_schema.physical_table`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.physical_schema, self.physical_table)
    }
}

impl fmt::Display for PhysicalLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.physical_schema, self.physical_table)
    }
}

/// Verified mapping keyed by the serialized `schema.table` form.
///
/// Serializes as `{"schema.table": {physical_schema, physical_table, data_source_id}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedTableMapping {
    #[serde(flatten)]
    entries: BTreeMap<String, PhysicalLocation>,
    #[serde(skip)]
    references: BTreeMap<String, LogicalTableReference>,
}

impl ResolvedTableMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolution. A later insert for the same reference replaces the earlier one.
    pub fn insert(&mut self, reference: LogicalTableReference, location: PhysicalLocation) {
        let key = reference.key();
        self.references.insert(key.clone(), reference);
        self.entries.insert(key, location);
    }

    /// Look up by serialized `schema.table` key
    pub fn get(&self, key: &str) -> Option<&PhysicalLocation> {
        self.entries.get(key)
    }

    pub fn get_reference(&self, reference: &LogicalTableReference) -> Option<&PhysicalLocation> {
        self.entries.get(&reference.key())
    }

    pub fn contains(&self, reference: &LogicalTableReference) -> bool {
        self.entries.contains_key(&reference.key())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&LogicalTableReference, &PhysicalLocation)> {
        self.references
            .iter()
            .filter_map(|(key, reference)| self.entries.get(key).map(|loc| (reference, loc)))
    }
}

impl FromIterator<(LogicalTableReference, PhysicalLocation)> for ResolvedTableMapping {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (LogicalTableReference, PhysicalLocation)>,
    {
        let mut mapping = ResolvedTableMapping::new();
        for (reference, location) in iter {
            mapping.insert(reference, location);
        }
        mapping
    }
}

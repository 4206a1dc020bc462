//! Table metadata resolver.
//!
//! Turns logical `(schema, table)` references into verified physical locations
//! for one data source. Each reference is resolved independently:
//!
//! 1. **Exact match**: a record whose physical name or recorded original name
//!    equals the logical table name.
//! 2. **Convention fallback**: among records synced without an original name,
//!    one whose physical name follows its source type's naming convention for
//!    the logical table name. The most recent sync wins.
//!
//! A reference that matches neither way is left out of the mapping. Store
//! failures are treated the same way, so resolution never fails as a whole.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use futures_util::stream::{self, StreamExt};
use log::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::table_catalog::{
    LogicalTableReference, MetadataQuery, MetadataStore, NamingConvention, TableMetadataRecord,
};

use super::mapping::{PhysicalLocation, ResolvedTableMapping};

/// How a reference was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    ExactMatch,
    ConventionMatch,
}

/// Resolves logical table references against a [`MetadataStore`].
pub struct TableResolver<S> {
    store: S,
    max_concurrent_lookups: usize,
    max_identifier_length: usize,
}

impl<S: MetadataStore> TableResolver<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, &ResolverConfig::default())
    }

    pub fn with_config(store: S, config: &ResolverConfig) -> Self {
        Self {
            store,
            max_concurrent_lookups: config.max_concurrent_lookups.max(1),
            max_identifier_length: config.max_identifier_length,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve every distinct reference for `data_source_id`.
    ///
    /// Lookups run concurrently; the mapping is assembled once all have finished.
    /// Unresolved references are simply absent from the result.
    pub async fn resolve<I>(&self, data_source_id: i64, references: I) -> ResolvedTableMapping
    where
        I: IntoIterator<Item = LogicalTableReference>,
    {
        let references: BTreeSet<LogicalTableReference> = references.into_iter().collect();
        if references.is_empty() {
            return ResolvedTableMapping::new();
        }
        let requested = references.len();

        let resolved: Vec<(LogicalTableReference, Option<PhysicalLocation>)> =
            stream::iter(references)
                .map(|reference| async move {
                    let location = self
                        .resolve_reference(data_source_id, &reference)
                        .await
                        .map(|(location, _)| location);
                    (reference, location)
                })
                .buffer_unordered(self.max_concurrent_lookups)
                .collect()
                .await;

        let mut mapping = ResolvedTableMapping::new();
        for (reference, location) in resolved {
            match location {
                Some(location) => mapping.insert(reference, location),
                None => warn!(
                    "No physical table found for {} in data source {}",
                    reference, data_source_id
                ),
            }
        }

        info!(
            "Resolved {}/{} table references for data source {}",
            mapping.len(),
            requested,
            data_source_id
        );
        mapping
    }

    /// Resolve a single reference, reporting which strategy succeeded.
    pub async fn resolve_reference(
        &self,
        data_source_id: i64,
        reference: &LogicalTableReference,
    ) -> Option<(PhysicalLocation, ResolutionStrategy)> {
        if let Some(record) = self.exact_match(data_source_id, reference).await {
            debug!(
                "{} -> {}.{} (exact match)",
                reference, record.schema_name, record.physical_table_name
            );
            return Some((location_of(record), ResolutionStrategy::ExactMatch));
        }

        if let Some(record) = self.convention_match(data_source_id, reference).await {
            debug!(
                "{} -> {}.{} (naming convention)",
                reference, record.schema_name, record.physical_table_name
            );
            return Some((location_of(record), ResolutionStrategy::ConventionMatch));
        }

        None
    }

    async fn exact_match(
        &self,
        data_source_id: i64,
        reference: &LogicalTableReference,
    ) -> Option<TableMetadataRecord> {
        let query = MetadataQuery::for_data_source(data_source_id).with_name(&reference.table);
        let candidates = self.lookup(&query, reference).await?;

        // Physical-name hits before original-name hits, then the logical
        // schema, then the most recent sync.
        candidates
            .into_iter()
            .filter(|r| r.data_source_id == data_source_id && r.is_named(&reference.table))
            .min_by_key(|r| {
                (
                    r.physical_table_name != reference.table,
                    r.schema_name != reference.schema,
                    Reverse(r.created_at),
                )
            })
    }

    async fn convention_match(
        &self,
        data_source_id: i64,
        reference: &LogicalTableReference,
    ) -> Option<TableMetadataRecord> {
        let query = MetadataQuery::for_data_source(data_source_id);
        let candidates = self.lookup(&query, reference).await?;

        candidates
            .into_iter()
            .filter(|r| r.data_source_id == data_source_id && r.original_table_name.is_none())
            .filter(|r| {
                NamingConvention::for_table_type(&r.table_type).matches_convention(
                    &r.physical_table_name,
                    &reference.table,
                    data_source_id,
                    self.max_identifier_length,
                )
            })
            .min_by_key(|r| Reverse(r.created_at))
    }

    async fn lookup(
        &self,
        query: &MetadataQuery,
        reference: &LogicalTableReference,
    ) -> Option<Vec<TableMetadataRecord>> {
        match self.store.find(query).await {
            Ok(records) => Some(records),
            Err(e) => {
                warn!("Metadata lookup for {} failed: {}", reference, e);
                None
            }
        }
    }
}

fn location_of(record: TableMetadataRecord) -> PhysicalLocation {
    PhysicalLocation {
        physical_schema: record.schema_name,
        physical_table: record.physical_table_name,
        data_source_id: record.data_source_id,
    }
}

//! Descriptor → resolver → rewriter.
//!
//! The data-model processor hands over a saved query descriptor and the SQL it
//! generated; what comes back is SQL that targets the physical warehouse
//! tables, together with the mapping used and any references that could not be
//! resolved. Whether an unresolved reference should abort the query is left to
//! the caller.

use std::collections::BTreeSet;

use log::{debug, info};
use serde::Serialize;
use serde_json::Value;

use crate::config::ResolverConfig;
use crate::table_catalog::{LogicalTableReference, MetadataStore};

use super::descriptor::QueryDescriptor;
use super::mapping::ResolvedTableMapping;
use super::resolver::TableResolver;
use super::rewriter::QueryRewriter;

/// Outcome of resolving and rewriting one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedQuery {
    pub sql: String,
    pub mapping: ResolvedTableMapping,
    pub unresolved: Vec<LogicalTableReference>,
}

impl ResolvedQuery {
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }
}

pub struct QueryPipeline<S> {
    resolver: TableResolver<S>,
    rewriter: QueryRewriter,
}

impl<S: MetadataStore> QueryPipeline<S> {
    pub fn new(store: S, config: &ResolverConfig) -> Self {
        Self {
            resolver: TableResolver::with_config(store, config),
            rewriter: QueryRewriter::with_config(config),
        }
    }

    pub fn resolver(&self) -> &TableResolver<S> {
        &self.resolver
    }

    pub fn rewriter(&self) -> &QueryRewriter {
        &self.rewriter
    }

    /// Resolve the tables a descriptor references. Malformed descriptors resolve to nothing.
    pub async fn resolve_descriptor(
        &self,
        data_source_id: i64,
        descriptor: &Value,
    ) -> ResolvedTableMapping {
        let references = QueryDescriptor::from_value(descriptor)
            .map(|d| d.table_references())
            .unwrap_or_default();
        self.resolver.resolve(data_source_id, references).await
    }

    /// Resolve the descriptor's tables and rewrite `sql` with the result.
    pub async fn process(
        &self,
        data_source_id: i64,
        descriptor: &Value,
        sql: &str,
    ) -> ResolvedQuery {
        let references = QueryDescriptor::from_value(descriptor)
            .map(|d| d.table_references())
            .unwrap_or_default();
        self.process_references(data_source_id, references, sql).await
    }

    /// Same as [`QueryPipeline::process`] for descriptor text; invalid JSON leaves `sql` untouched.
    pub async fn process_json(
        &self,
        data_source_id: i64,
        descriptor_json: &str,
        sql: &str,
    ) -> ResolvedQuery {
        let references = QueryDescriptor::from_json_str(descriptor_json)
            .map(|d| d.table_references())
            .unwrap_or_default();
        self.process_references(data_source_id, references, sql).await
    }

    async fn process_references(
        &self,
        data_source_id: i64,
        references: BTreeSet<LogicalTableReference>,
        sql: &str,
    ) -> ResolvedQuery {
        if references.is_empty() {
            debug!("No table references found; leaving query unchanged");
            return ResolvedQuery {
                sql: sql.to_string(),
                mapping: ResolvedTableMapping::new(),
                unresolved: Vec::new(),
            };
        }

        let mapping = self
            .resolver
            .resolve(data_source_id, references.iter().cloned())
            .await;
        let unresolved: Vec<LogicalTableReference> = references
            .into_iter()
            .filter(|r| !mapping.contains(r))
            .collect();

        let sql = self.rewriter.rewrite(sql, &mapping);
        if !unresolved.is_empty() {
            info!(
                "{} table reference(s) left unresolved for data source {}",
                unresolved.len(),
                data_source_id
            );
        }

        ResolvedQuery {
            sql,
            mapping,
            unresolved,
        }
    }
}

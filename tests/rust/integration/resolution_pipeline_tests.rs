//! End-to-end resolution: descriptor in, rewritten SQL out.

#[cfg(test)]
mod resolution_pipeline_tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use dra_resolver::config::ResolverConfig;
    use dra_resolver::query_resolver::{QueryPipeline, ResolutionStrategy, TableResolver};
    use dra_resolver::table_catalog::{
        InMemoryMetadataStore, LogicalTableReference, TableMetadataRecord, TableType,
    };
    use futures_util::future::join_all;
    use serde_json::json;

    fn record(
        ds: i64,
        schema: &str,
        physical: &str,
        original: Option<&str>,
        table_type: TableType,
        day: u32,
    ) -> TableMetadataRecord {
        TableMetadataRecord {
            data_source_id: ds,
            schema_name: schema.to_string(),
            physical_table_name: physical.to_string(),
            original_table_name: original.map(str::to_string),
            table_type,
            created_at: Utc.with_ymd_and_hms(2024, 6, day, 9, 30, 0).unwrap(),
        }
    }

    fn mysql_22(physical: &str, original: Option<&str>, day: u32) -> TableMetadataRecord {
        record(22, "dra_mysql_22", physical, original, TableType::MySql, day)
    }

    fn warehouse() -> Arc<InMemoryMetadataStore> {
        Arc::new(
            InMemoryMetadataStore::new(vec![
                mysql_22("orders_5e6f7a8b_22", Some("orders"), 1),
                mysql_22("order_items_0c0c0c0c_22", Some("order_items"), 1),
                // Older sync that never recorded original names
                mysql_22("customers_xyz999_22", None, 2),
                mysql_22("orders_archive_77777777_22", Some("orders_archive"), 1),
                record(
                    31,
                    "dra_mariadb_31",
                    "orders_aaaaaaaa_31",
                    Some("orders"),
                    TableType::MariaDb,
                    1,
                ),
            ])
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_join_query_is_fully_rewritten() {
        let pipeline = QueryPipeline::new(warehouse(), &ResolverConfig::default());
        let descriptor = json!({
            "columns": [
                {"schema": "mysql_dra_db", "table": "orders", "column": "id"},
                {"schema": "mysql_dra_db", "table": "order_items", "column": "quantity"},
                {"schema": "mysql_dra_db", "table": "customers", "column": "name"}
            ],
            "join_conditions": [
                {
                    "left_table_schema": "mysql_dra_db", "left_table_name": "order_items",
                    "left_column_name": "order_id",
                    "right_table_schema": "mysql_dra_db", "right_table_name": "orders",
                    "right_column_name": "id"
                }
            ]
        });
        let sql = "SELECT mysql_dra_db.orders.id, mysql_dra_db.order_items.quantity, \
                   mysql_dra_db.customers.name \
                   FROM mysql_dra_db.orders \
                   JOIN mysql_dra_db.order_items \
                   ON mysql_dra_db.order_items.order_id = mysql_dra_db.orders.id \
                   JOIN mysql_dra_db.customers \
                   ON mysql_dra_db.customers.id = mysql_dra_db.orders.customer_id";

        let resolved = pipeline.process(22, &descriptor, sql).await;

        assert!(resolved.is_fully_resolved());
        assert_eq!(resolved.mapping.len(), 3);
        assert!(!resolved.sql.contains("mysql_dra_db."));
        assert_eq!(resolved.sql.matches("dra_mysql_22.orders_5e6f7a8b_22").count(), 4);
        assert_eq!(resolved.sql.matches("dra_mysql_22.order_items_0c0c0c0c_22").count(), 3);
        assert_eq!(resolved.sql.matches("dra_mysql_22.customers_xyz999_22").count(), 3);
    }

    #[tokio::test]
    async fn test_convention_fallback_end_to_end() {
        let resolver = TableResolver::new(warehouse());
        let reference = LogicalTableReference::new("mysql_dra_db", "customers");

        let mapping = resolver.resolve(22, vec![reference.clone()]).await;
        let location = mapping.get("mysql_dra_db.customers").unwrap();
        assert_eq!(location.physical_schema, "dra_mysql_22");
        assert_eq!(location.physical_table, "customers_xyz999_22");
        assert_eq!(location.data_source_id, 22);

        let (_, strategy) = resolver.resolve_reference(22, &reference).await.unwrap();
        assert_eq!(strategy, ResolutionStrategy::ConventionMatch);
    }

    #[tokio::test]
    async fn test_unresolved_reference_passthrough() {
        let pipeline = QueryPipeline::new(warehouse(), &ResolverConfig::default());
        let descriptor = json!({
            "columns": [
                {"schema": "mysql_dra_db", "table": "orders", "column": "id"},
                {"schema": "mysql_dra_db", "table": "shipments", "column": "id"}
            ]
        });
        let sql = "SELECT * FROM mysql_dra_db.orders JOIN mysql_dra_db.shipments ON 1 = 1";

        let resolved = pipeline.process(22, &descriptor, sql).await;

        assert!(resolved.mapping.get("mysql_dra_db.shipments").is_none());
        assert!(resolved.sql.contains("mysql_dra_db.shipments"));
        assert_eq!(
            resolved.unresolved,
            vec![LogicalTableReference::new("mysql_dra_db", "shipments")]
        );
    }

    #[tokio::test]
    async fn test_data_sources_are_isolated() {
        let pipeline = QueryPipeline::new(warehouse(), &ResolverConfig::default());
        let descriptor = json!({
            "columns": [{"schema": "shop", "table": "orders", "column": "id"}]
        });

        let for_22 = pipeline.process(22, &descriptor, "SELECT * FROM shop.orders").await;
        let for_31 = pipeline.process(31, &descriptor, "SELECT * FROM shop.orders").await;

        assert_eq!(for_22.sql, "SELECT * FROM dra_mysql_22.orders_5e6f7a8b_22");
        assert_eq!(for_31.sql, "SELECT * FROM dra_mariadb_31.orders_aaaaaaaa_31");
    }

    #[tokio::test]
    async fn test_concurrent_resolutions_share_a_store() {
        let pipeline = QueryPipeline::new(warehouse(), &ResolverConfig::default());
        let descriptor = json!({
            "columns": [{"schema": "shop", "table": "orders", "column": "id"}]
        });

        let results = join_all([22, 31, 22, 31].map(|ds| {
            pipeline.process(ds, &descriptor, "SELECT count(*) FROM shop.orders")
        }))
        .await;

        assert_eq!(results[0].sql, results[2].sql);
        assert_eq!(results[1].sql, results[3].sql);
        assert_ne!(results[0].sql, results[1].sql);
        for resolved in results {
            assert!(resolved.is_fully_resolved());
            assert!(!resolved.sql.contains("shop.orders"));
        }
    }

    #[tokio::test]
    async fn test_rename_is_seen_by_the_next_query() {
        let store = warehouse();
        let pipeline = QueryPipeline::new(Arc::clone(&store), &ResolverConfig::default());
        let descriptor = json!({
            "columns": [{"schema": "shop", "table": "orders", "column": "id"}]
        });

        let before = pipeline.process(22, &descriptor, "SELECT * FROM shop.orders").await;
        assert_eq!(before.sql, "SELECT * FROM dra_mysql_22.orders_5e6f7a8b_22");

        assert!(store
            .rename_physical_table(22, "orders_5e6f7a8b_22", "orders_deadbeef_22")
            .await
            .unwrap());

        let after = pipeline.process(22, &descriptor, "SELECT * FROM shop.orders").await;
        assert_eq!(after.sql, "SELECT * FROM dra_mysql_22.orders_deadbeef_22");
    }

    #[tokio::test]
    async fn test_empty_inputs() {
        let pipeline = QueryPipeline::new(warehouse(), &ResolverConfig::default());
        let sql = "SELECT * FROM mysql_dra_db.orders";

        let resolved = pipeline.process(22, &json!({"columns": []}), sql).await;
        assert!(resolved.mapping.is_empty());
        assert_eq!(resolved.sql, sql);

        let mapping = pipeline.resolver().resolve(22, Vec::new()).await;
        assert!(mapping.is_empty());
    }
}

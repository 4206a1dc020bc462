//! Query descriptor parsing as the data-model builder saves it.

#[cfg(test)]
mod descriptor_tests {
    use dra_resolver::query_resolver::{extract_table_references, QueryDescriptor};
    use dra_resolver::table_catalog::LogicalTableReference;
    use serde_json::json;

    #[test]
    fn test_saved_data_model_descriptor() {
        let descriptor = json!({
            "table_name": "sales_overview",
            "columns": [
                {
                    "schema": "mysql_dra_db", "table": "orders", "column": "id",
                    "data_source_type": "mysql", "alias": null
                },
                {
                    "schema": "mysql_dra_db", "table": "customers", "column": "name",
                    "dataSourceType": "mysql"
                }
            ],
            "join_conditions": [
                {
                    "left": {"schema": "mysql_dra_db", "table": "orders", "column": "customer_id"},
                    "right": {"schema": "mysql_dra_db", "table": "customers", "column": "id"},
                    "join_type": "LEFT"
                }
            ],
            "query_options": {"limit": 100}
        });

        let references: Vec<_> = extract_table_references(&descriptor).into_iter().collect();
        assert_eq!(
            references,
            vec![
                LogicalTableReference::new("mysql_dra_db", "customers"),
                LogicalTableReference::new("mysql_dra_db", "orders"),
            ]
        );
    }

    #[test]
    fn test_descriptor_without_join_conditions() {
        let descriptor =
            QueryDescriptor::from_json_str(r#"{"columns": [{"schema": "s", "table": "t"}]}"#)
                .unwrap();
        assert!(descriptor.join_conditions.is_empty());
        assert_eq!(descriptor.table_references().len(), 1);
    }

    #[test]
    fn test_empty_descriptor() {
        assert!(extract_table_references(&json!({})).is_empty());
    }
}

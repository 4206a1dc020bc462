//! Structured query descriptors and table reference extraction.
//!
//! A descriptor is the JSON the data-model builder saves alongside the SQL it
//! generated. Only two parts matter here: the `columns` list and the optional
//! `join_conditions` list. Every other field is ignored, and any entry that is
//! missing a schema or table is skipped rather than rejected.

use std::collections::BTreeSet;

use log::debug;
use serde_json::Value;

use crate::table_catalog::LogicalTableReference;

/// A selected column as stored in a descriptor.
///
/// Only the string-valued fields are kept; anything else about the entry is
/// ignored so that an oddly shaped `column` never hides its table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnReference {
    pub schema: Option<String>,
    pub table: Option<String>,
    pub column: Option<String>,
    pub data_source_type: Option<String>,
}

impl ColumnReference {
    /// Read a column entry. Returns `None` when `entry` is not an object.
    pub fn from_value(entry: &Value) -> Option<Self> {
        entry.as_object()?;
        Some(Self {
            schema: string_field(entry, &["schema", "schema_name"]),
            table: string_field(entry, &["table", "table_name"]),
            column: string_field(entry, &["column", "column_name"]),
            data_source_type: string_field(entry, &["data_source_type", "dataSourceType"]),
        })
    }
}

/// One side of a join, in the nested `{left: {..}, right: {..}}` shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinSide {
    pub schema: Option<String>,
    pub table: Option<String>,
    pub column: Option<String>,
}

impl JoinSide {
    pub fn from_value(side: &Value) -> Option<Self> {
        side.as_object()?;
        Some(Self {
            schema: string_field(side, &["schema", "schema_name"]),
            table: string_field(side, &["table", "table_name"]),
            column: string_field(side, &["column", "column_name"]),
        })
    }
}

/// A join condition. Both the nested and the flat
/// (`left_table_schema`, `left_table_name`, ...) shapes are accepted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinCondition {
    pub left: Option<JoinSide>,
    pub right: Option<JoinSide>,
    pub left_table_schema: Option<String>,
    pub left_table_name: Option<String>,
    pub left_column_name: Option<String>,
    pub right_table_schema: Option<String>,
    pub right_table_name: Option<String>,
    pub right_column_name: Option<String>,
    pub join_type: Option<String>,
}

impl JoinCondition {
    /// Read a join entry. Returns `None` when `entry` is not an object.
    pub fn from_value(entry: &Value) -> Option<Self> {
        entry.as_object()?;
        Some(Self {
            left: entry.get("left").and_then(JoinSide::from_value),
            right: entry.get("right").and_then(JoinSide::from_value),
            left_table_schema: string_field(entry, &["left_table_schema"]),
            left_table_name: string_field(entry, &["left_table_name", "left_table"]),
            left_column_name: string_field(entry, &["left_column_name"]),
            right_table_schema: string_field(entry, &["right_table_schema"]),
            right_table_name: string_field(entry, &["right_table_name", "right_table"]),
            right_column_name: string_field(entry, &["right_column_name"]),
            join_type: string_field(entry, &["join_type"]),
        })
    }

    /// The two table references this join touches, where present.
    pub fn table_references(&self) -> Vec<LogicalTableReference> {
        let left = self
            .left
            .as_ref()
            .and_then(|side| reference(side.schema.as_deref(), side.table.as_deref()))
            .or_else(|| {
                reference(
                    self.left_table_schema.as_deref(),
                    self.left_table_name.as_deref(),
                )
            });
        let right = self
            .right
            .as_ref()
            .and_then(|side| reference(side.schema.as_deref(), side.table.as_deref()))
            .or_else(|| {
                reference(
                    self.right_table_schema.as_deref(),
                    self.right_table_name.as_deref(),
                )
            });
        left.into_iter().chain(right).collect()
    }
}

/// The parts of a query descriptor the resolver reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDescriptor {
    pub columns: Vec<ColumnReference>,
    pub join_conditions: Vec<JoinCondition>,
}

impl QueryDescriptor {
    /// Read a descriptor from JSON. Returns `None` when `value` is not an object.
    ///
    /// Entries inside `columns` or `join_conditions` that are not objects are dropped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            columns: parse_entries(object.get("columns"), ColumnReference::from_value),
            join_conditions: parse_entries(
                object.get("join_conditions"),
                JoinCondition::from_value,
            ),
        })
    }

    /// Parse descriptor text. Returns `None` for invalid JSON or a non-object.
    pub fn from_json_str(json: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                debug!("Ignoring unparseable query descriptor: {}", e);
                None
            }
        }
    }

    /// Distinct `(schema, table)` pairs referenced by columns and joins.
    pub fn table_references(&self) -> BTreeSet<LogicalTableReference> {
        let from_columns = self
            .columns
            .iter()
            .filter_map(|c| reference(c.schema.as_deref(), c.table.as_deref()));
        let from_joins = self
            .join_conditions
            .iter()
            .flat_map(JoinCondition::table_references);
        from_columns.chain(from_joins).collect()
    }
}

/// Distinct table references in a descriptor value; empty when it is malformed.
pub fn extract_table_references(value: &Value) -> BTreeSet<LogicalTableReference> {
    QueryDescriptor::from_value(value)
        .map(|d| d.table_references())
        .unwrap_or_default()
}

fn parse_entries<T>(value: Option<&Value>, parse: fn(&Value) -> Option<T>) -> Vec<T> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items.iter().filter_map(parse).collect()
}

/// First of `keys` holding a non-empty string.
fn string_field(entry: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| entry.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn reference(schema: Option<&str>, table: Option<&str>) -> Option<LogicalTableReference> {
    let schema = schema.map(str::trim).filter(|s| !s.is_empty())?;
    let table = table.map(str::trim).filter(|t| !t.is_empty())?;
    Some(LogicalTableReference::new(schema, table))
}

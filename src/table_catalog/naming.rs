//! Physical naming conventions used by the sync process.
//!
//! Every source type stores its tables under a suffixed name so that names are
//! unique across the warehouse and stay within the identifier length limit:
//!
//! | Source                  | Physical table name                        |
//! |-------------------------|--------------------------------------------|
//! | MySQL, MariaDB, Postgres| `<logical>_<hash>_<dataSourceId>`          |
//! | Excel, PDF              | `<logical>_data_source_<dataSourceId>_<n>` |
//! | Google services         | `<logical>_<dataSourceId>`                 |
//!
//! The resolver uses [`NamingConvention::matches_convention`] when a record was
//! synced without its original name. The generators exist so that the catalog
//! and its tests speak the same convention the sync process writes.

use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

use super::metadata::TableType;

/// Default warehouse identifier limit (PostgreSQL `NAMEDATALEN - 1`).
pub const DEFAULT_MAX_IDENTIFIER_LENGTH: usize = 63;

/// Hex characters of the name hash in `<logical>_<hash>_<id>`.
pub const HASH_SUFFIX_LEN: usize = 8;

lazy_static! {
    static ref HASH_SUFFIXED: Regex =
        Regex::new(r"^(?P<logical>.+)_(?P<hash>[0-9A-Za-z]+)_(?P<id>\d+)$").unwrap();
    static ref DATA_SOURCE_INDEXED: Regex =
        Regex::new(r"^(?P<logical>.+)_data_source_(?P<id>\d+)_(?P<index>\d+)$").unwrap();
    static ref DATA_SOURCE_SUFFIXED: Regex = Regex::new(r"^(?P<logical>.+)_(?P<id>\d+)$").unwrap();
}

/// Naming strategy, one per family of source types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingConvention {
    /// `<logical>_<hash>_<id>`, used by relational sources
    HashSuffixed,
    /// `<logical>_data_source_<id>_<index>`, used by uploaded files
    DataSourceIndexed,
    /// `<logical>_<id>`, used by Google services
    DataSourceSuffixed,
}

impl NamingConvention {
    /// Strategy for a table type. Unknown types are assumed to be relational.
    pub fn for_table_type(table_type: &TableType) -> Self {
        if table_type.is_file() {
            NamingConvention::DataSourceIndexed
        } else if table_type.is_google_service() {
            NamingConvention::DataSourceSuffixed
        } else {
            NamingConvention::HashSuffixed
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            NamingConvention::HashSuffixed => &HASH_SUFFIXED,
            NamingConvention::DataSourceIndexed => &DATA_SOURCE_INDEXED,
            NamingConvention::DataSourceSuffixed => &DATA_SOURCE_SUFFIXED,
        }
    }

    /// Strip the convention's suffix from `physical`.
    ///
    /// Returns `None` when the name does not follow the convention or when its
    /// embedded data source id is not `data_source_id`.
    pub fn extract_logical_name<'a>(
        &self,
        physical: &'a str,
        data_source_id: i64,
    ) -> Option<&'a str> {
        let caps = self.pattern().captures(physical)?;
        let id: i64 = caps.name("id")?.as_str().parse().ok()?;
        if id != data_source_id {
            return None;
        }
        caps.name("logical").map(|m| m.as_str())
    }

    /// Whether `physical` is the name this convention would give `logical`.
    ///
    /// The logical part may have been normalized (lowercased, punctuation
    /// replaced) and truncated to keep the whole name within
    /// `max_identifier_length`; both forms are accepted.
    pub fn matches_convention(
        &self,
        physical: &str,
        logical: &str,
        data_source_id: i64,
        max_identifier_length: usize,
    ) -> bool {
        let Some(extracted) = self.extract_logical_name(physical, data_source_id) else {
            return false;
        };
        if extracted == logical {
            return true;
        }

        let normalized = normalize_identifier(logical);
        if extracted == normalized {
            return true;
        }

        let suffix_len = physical.len() - extracted.len();
        let budget = max_identifier_length.saturating_sub(suffix_len);
        !extracted.is_empty() && extracted == truncate_to_char_boundary(&normalized, budget)
    }

    /// Physical name this convention gives `logical`.
    ///
    /// `index` is the sheet/page ordinal and is only used by
    /// [`NamingConvention::DataSourceIndexed`].
    pub fn physical_table_name(
        &self,
        logical: &str,
        data_source_id: i64,
        index: usize,
        max_identifier_length: usize,
    ) -> String {
        let normalized = normalize_identifier(logical);
        let suffix = match self {
            NamingConvention::HashSuffixed => {
                format!("_{}_{}", name_hash(&normalized, data_source_id), data_source_id)
            }
            NamingConvention::DataSourceIndexed => {
                format!("_data_source_{}_{}", data_source_id, index)
            }
            NamingConvention::DataSourceSuffixed => format!("_{}", data_source_id),
        };
        let budget = max_identifier_length.saturating_sub(suffix.len()).max(1);
        format!("{}{}", truncate_to_char_boundary(&normalized, budget), suffix)
    }
}

/// Warehouse schema the sync process places a source's tables in.
pub fn physical_schema_name(table_type: &TableType, data_source_id: i64) -> String {
    match table_type {
        TableType::Excel | TableType::Pdf => format!("dra_{}", table_type),
        t if t.is_google_service() => format!("dra_{}", t),
        TableType::Other(tag) => format!("dra_{}_{}", normalize_identifier(tag), data_source_id),
        t => format!("dra_{}_{}", t, data_source_id),
    }
}

/// Lowercase `name` and fold anything outside `[a-z0-9_]` into single underscores.
pub fn normalize_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_sep && !out.ends_with('_') {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else if !out.is_empty() {
            pending_sep = true;
        }
    }
    if out.is_empty() {
        "table".to_string()
    } else {
        out
    }
}

/// First [`HASH_SUFFIX_LEN`] hex characters of the SHA-256 of `<id>:<logical>`.
fn name_hash(logical: &str, data_source_id: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", data_source_id, logical).as_bytes());
    let digest = hasher.finalize();
    let mut encoded = hex::encode(digest);
    encoded.truncate(HASH_SUFFIX_LEN);
    encoded
}

fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

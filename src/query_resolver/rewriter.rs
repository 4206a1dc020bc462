//! Query rewriter.
//!
//! Substitutes every logical `schema.table` identifier in a SQL string with its
//! resolved `physical_schema.physical_table`. The rewriter knows nothing about
//! SQL clauses: it scans the whole text once and, at every position that starts
//! a token, tries the mapped identifiers longest first. A candidate only matches
//! as a whole token, i.e. when it is neither preceded nor followed by a letter,
//! digit or underscore.
//!
//! Longest-first keeps `s.order_items` from being claimed by `s.order`, and the
//! boundary rule keeps `s.orders` out of `s.orders_archive`. Replaced text is
//! never rescanned, so a physical name that happens to contain another logical
//! identifier is left alone.

use log::debug;

use crate::config::ResolverConfig;

use super::mapping::ResolvedTableMapping;

/// One identifier spelling and what it becomes
#[derive(Debug, Clone, PartialEq, Eq)]
struct Substitution {
    pattern: String,
    replacement: String,
}

/// Applies a [`ResolvedTableMapping`] to SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRewriter {
    rewrite_quoted_identifiers: bool,
}

impl Default for QueryRewriter {
    fn default() -> Self {
        Self {
            rewrite_quoted_identifiers: true,
        }
    }
}

impl QueryRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &ResolverConfig) -> Self {
        Self {
            rewrite_quoted_identifiers: config.rewrite_quoted_identifiers,
        }
    }

    /// Rewrite `sql` using `mapping`.
    ///
    /// An empty mapping, or SQL containing none of the mapped identifiers,
    /// returns the input unchanged.
    pub fn rewrite(&self, sql: &str, mapping: &ResolvedTableMapping) -> String {
        if mapping.is_empty() || sql.is_empty() {
            return sql.to_string();
        }

        let substitutions = self.substitutions(mapping);
        if substitutions.is_empty() {
            return sql.to_string();
        }

        let mut result = String::with_capacity(sql.len() + 64);
        let mut replaced = 0usize;
        let mut i = 0;

        while i < sql.len() {
            let rest = &sql[i..];

            if starts_token(sql, i) {
                let hit = substitutions.iter().find(|s| {
                    rest.starts_with(&s.pattern) && ends_token(sql, i + s.pattern.len())
                });
                if let Some(s) = hit {
                    result.push_str(&s.replacement);
                    i += s.pattern.len();
                    replaced += 1;
                    continue;
                }
            }

            match rest.chars().next() {
                Some(ch) => {
                    result.push(ch);
                    i += ch.len_utf8();
                }
                None => break,
            }
        }

        if replaced == 0 {
            return sql.to_string();
        }
        debug!("Rewrote {} table identifier occurrence(s)", replaced);
        result
    }

    /// Every spelling to look for, longest first.
    fn substitutions(&self, mapping: &ResolvedTableMapping) -> Vec<Substitution> {
        let mut substitutions = Vec::with_capacity(mapping.len() * 3);

        for (reference, location) in mapping.iter() {
            substitutions.push(Substitution {
                pattern: reference.key(),
                replacement: location.qualified_name(),
            });

            if self.rewrite_quoted_identifiers {
                for quote in ['"', '`'] {
                    substitutions.push(Substitution {
                        pattern: quoted(quote, &reference.schema, &reference.table),
                        replacement: quoted(
                            quote,
                            &location.physical_schema,
                            &location.physical_table,
                        ),
                    });
                }
            }
        }

        substitutions.retain(|s| s.pattern != s.replacement);
        substitutions.sort_by(|a, b| {
            b.pattern
                .len()
                .cmp(&a.pattern.len())
                .then_with(|| a.pattern.cmp(&b.pattern))
        });
        substitutions
    }
}

/// Rewrite with default settings.
pub fn rewrite_sql(sql: &str, mapping: &ResolvedTableMapping) -> String {
    QueryRewriter::default().rewrite(sql, mapping)
}

fn quoted(quote: char, schema: &str, table: &str) -> String {
    format!("{q}{}{q}.{q}{}{q}", schema, table, q = quote)
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn starts_token(sql: &str, at: usize) -> bool {
    sql[..at].chars().next_back().is_none_or(|c| !is_identifier_char(c))
}

fn ends_token(sql: &str, at: usize) -> bool {
    sql.get(at..)
        .and_then(|rest| rest.chars().next())
        .is_none_or(|c| !is_identifier_char(c))
}

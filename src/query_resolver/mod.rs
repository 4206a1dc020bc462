pub mod descriptor;
pub mod mapping;
pub mod pipeline;
pub mod resolver;
pub mod rewriter;

pub use descriptor::{extract_table_references, QueryDescriptor};
pub use mapping::{PhysicalLocation, ResolvedTableMapping};
pub use pipeline::{QueryPipeline, ResolvedQuery};
pub use resolver::{ResolutionStrategy, TableResolver};
pub use rewriter::{rewrite_sql, QueryRewriter};

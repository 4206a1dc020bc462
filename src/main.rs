use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dra_resolver::config::{CliConfig, ResolverConfig};
use dra_resolver::query_resolver::QueryPipeline;
use dra_resolver::table_catalog::{
    physical_schema_name, InMemoryMetadataStore, NamingConvention, TableType,
};

/// dra-resolver - resolve logical table references to physical warehouse tables
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Table catalog file (YAML or JSON) listing the synced tables
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Resolver configuration file (YAML); environment variables are used otherwise
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum metadata lookups in flight
    #[arg(long, global = true)]
    max_concurrent_lookups: Option<usize>,

    /// Warehouse identifier length limit
    #[arg(long, global = true)]
    max_identifier_length: Option<usize>,

    /// Only rewrite unquoted schema.table identifiers
    #[arg(long, global = true)]
    no_quoted_identifiers: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the logical -> physical mapping for a query descriptor as JSON
    Resolve {
        /// Data source the descriptor belongs to
        #[arg(long)]
        data_source: i64,

        /// Query descriptor file (JSON)
        #[arg(long)]
        descriptor: PathBuf,
    },
    /// Rewrite SQL so it targets the physical tables
    Rewrite {
        #[arg(long)]
        data_source: i64,

        #[arg(long)]
        descriptor: PathBuf,

        /// SQL file; read from stdin when omitted
        #[arg(long)]
        sql: Option<PathBuf>,

        /// Print SQL, mapping and unresolved references as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the physical schema and table name the sync process would use
    PhysicalName {
        /// Source type tag (mysql, excel, google_ads, ...)
        #[arg(long)]
        table_type: String,

        #[arg(long)]
        data_source: i64,

        /// Sheet/page ordinal for file sources
        #[arg(long, default_value_t = 1)]
        index: usize,

        logical: String,
    },
}

impl From<&Cli> for CliConfig {
    fn from(cli: &Cli) -> Self {
        CliConfig {
            max_concurrent_lookups: cli.max_concurrent_lookups,
            max_identifier_length: cli.max_identifier_length,
            no_quoted_identifiers: cli.no_quoted_identifiers,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to WARN so stdout stays clean for piping; override with RUST_LOG
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Resolve {
            data_source,
            descriptor,
        } => {
            let pipeline = QueryPipeline::new(load_catalog(cli.catalog.as_deref())?, &config);
            let descriptor = read_descriptor(descriptor)?;
            let mapping = pipeline.resolve_descriptor(*data_source, &descriptor).await;
            println!("{}", serde_json::to_string_pretty(&mapping)?);
        }
        Command::Rewrite {
            data_source,
            descriptor,
            sql,
            json,
        } => {
            let pipeline = QueryPipeline::new(load_catalog(cli.catalog.as_deref())?, &config);
            let descriptor = read_descriptor(descriptor)?;
            let sql = read_sql(sql.as_deref())?;
            let resolved = pipeline.process(*data_source, &descriptor, &sql).await;
            if *json {
                println!("{}", serde_json::to_string_pretty(&resolved)?);
            } else {
                for reference in &resolved.unresolved {
                    eprintln!("warning: unresolved table {}", reference);
                }
                println!("{}", resolved.sql);
            }
        }
        Command::PhysicalName {
            table_type,
            data_source,
            index,
            logical,
        } => {
            let table_type = TableType::from(table_type.as_str());
            let table = NamingConvention::for_table_type(&table_type).physical_table_name(
                logical,
                *data_source,
                *index,
                config.max_identifier_length,
            );
            println!("{}.{}", physical_schema_name(&table_type, *data_source), table);
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<ResolverConfig> {
    let base = match &cli.config {
        Some(path) => ResolverConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ResolverConfig::from_env().context("reading configuration from environment")?,
    };
    base.apply_cli(&CliConfig::from(cli))
        .context("invalid command line configuration")
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<InMemoryMetadataStore> {
    let Some(path) = path else {
        bail!("--catalog is required for this command");
    };
    Ok(InMemoryMetadataStore::from_yaml_file(path)?)
}

fn read_descriptor(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading descriptor {}", path.display()))?;
    // Unparseable descriptors resolve to nothing rather than failing the command
    Ok(serde_json::from_str(&content).unwrap_or(serde_json::Value::Null))
}

fn read_sql(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading SQL {}", path.display())),
        None => {
            let mut sql = String::new();
            std::io::stdin()
                .read_to_string(&mut sql)
                .context("reading SQL from stdin")?;
            Ok(sql)
        }
    }
}

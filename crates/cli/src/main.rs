use crate::{
    commands::{Commands, DocumentArgs},
    error::CliError,
};
use clap::Parser;
use connectors::sql::executor::{SqlxExecutor, StatementExecutor};
use planner::{config::QueryDocument, query::dialect::DialectKind};
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(name = "joinql", version = "0.0.1", about = "Joining query compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Initialize logger
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { doc } => {
            let doc = load_document(&doc).await?;
            let stmt = doc.compile()?;
            output::print_statement(&stmt)?;
        }
        Commands::Count { doc, conn_str } => {
            let doc = load_document(&doc).await?;
            match conn_str {
                Some(conn_str) => {
                    // The connection decides the dialect the statement is rendered in.
                    let executor = SqlxExecutor::connect(&conn_str).await?;
                    let doc = doc.with_dialect(executor.dialect());
                    let stmt = doc.compile_count()?;
                    let count = executor.fetch_count(&stmt).await?;
                    info!(table = %doc.plan.table, count, "counted root features");
                    println!("{count}");
                }
                None => output::print_statement(&doc.compile_count()?)?,
            }
        }
        Commands::Run {
            doc,
            conn_str,
            output,
        } => {
            let executor = SqlxExecutor::connect(&conn_str).await?;
            let doc = load_document(&doc).await?.with_dialect(executor.dialect());
            let stmt = doc.compile()?;
            let rows = executor.fetch_all(&stmt).await?;
            info!(table = %doc.plan.table, rows = rows.len(), "fetched rows");
            output::write_rows(&rows, output).await?;
        }
    }

    Ok(())
}

async fn load_document(args: &DocumentArgs) -> Result<QueryDocument, CliError> {
    let source = tokio::fs::read_to_string(&args.config).await?;
    let doc = QueryDocument::from_json(&source)?;
    info!(config = %args.config, plan = %doc.plan.hash(), "loaded query document");

    match &args.dialect {
        Some(name) => {
            let kind = DialectKind::from_str(name).map_err(CliError::InvalidDialect)?;
            Ok(doc.with_dialect(kind))
        }
        None => Ok(doc),
    }
}

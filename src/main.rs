use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use catalog_ingest::config::Config;
use catalog_ingest::logging;
use catalog_ingest::pipeline::{IngestUseCase, ReportUseCase};
use catalog_ingest::server::{self, AppState};
use catalog_ingest::storage::{ProductStore, SqliteStore};
use catalog_ingest::validate;

#[derive(Parser)]
#[command(name = "catalog_ingest")]
#[command(about = "Product catalog CSV ingestion and reporting service")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        bind: Option<String>,
    },
    /// Ingest a product CSV into the store
    Upload {
        /// Path to the CSV file
        file: PathBuf,
        /// Merge into existing records instead of replacing them
        #[arg(long)]
        append: bool,
    },
    /// Write the per-category summary report
    Report {
        /// Output path (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load();
    let store: Arc<dyn ProductStore> = Arc::new(SqliteStore::open(&config.database_path)?);

    match cli.command {
        Commands::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| config.bind_addr.clone()).parse()?;
            let state = Arc::new(AppState { store, config });
            server::start_server(state, addr).await?;
        }
        Commands::Upload { file, append } => {
            let filename = file
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string();
            let bytes = fs::read(&file)?;
            validate::check_upload(&filename, bytes.len() as u64, config.max_upload_bytes)?;

            let rows = IngestUseCase::new(store).ingest(&bytes, append).await?;
            println!(
                "✅ Ingested {} rows ({})",
                rows,
                if append { "append" } else { "replace" }
            );
        }
        Commands::Report { out } => {
            let body = ReportUseCase::new(store).summary_csv().await?;
            match out {
                Some(path) => {
                    fs::write(&path, body)?;
                    println!("📄 Report written to {}", path.display());
                }
                None => print!("{body}"),
            }
        }
    }

    Ok(())
}

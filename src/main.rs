//! Shelfdash Book Dashboard
//!
//! Serves a single-page dashboard over a books dataset, or prints dataset statistics.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use shelfdash::layout::Dashboard;
use shelfdash::loader::{load_dataset, DatasetSource, DEFAULT_DATASET_URL};
use shelfdash::models::ChartTheme;
use shelfdash::server::{serve, ServeConfig};

#[derive(Parser)]
#[command(name = "shelfdash")]
#[command(about = "Interactive book dataset dashboard")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard page
    Serve {
        /// Dataset location: CSV/XLSX path or http(s) URL
        #[arg(long, default_value = DEFAULT_DATASET_URL)]
        dataset: String,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(long, default_value = "8050")]
        port: u16,

        /// Directory holding the banner and background images
        #[arg(long, default_value = "assets")]
        assets_dir: PathBuf,

        /// Development mode: debug logging and rejection diagnostics in responses
        #[arg(long)]
        debug: bool,

        /// Suppress the loading spinner
        #[arg(long)]
        quiet: bool,
    },

    /// Show dataset statistics
    Inspect {
        /// Dataset location: CSV/XLSX path or http(s) URL
        #[arg(long, default_value = DEFAULT_DATASET_URL)]
        dataset: String,

        /// Print the first N distinct authors
        #[arg(long)]
        show_authors: Option<usize>,

        /// Log skipped rows
        #[arg(long)]
        debug: bool,
    },
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            dataset,
            host,
            port,
            assets_dir,
            debug,
            quiet,
        } => {
            init_tracing(debug);

            // Load once before the runtime starts; a failure here aborts startup
            let source = DatasetSource::parse(&dataset);
            let (dataset, _report) = load_dataset(&source, !quiet)?;
            let dashboard = Dashboard::new(Arc::new(dataset), ChartTheme::default());

            let config = ServeConfig {
                host,
                port,
                assets_dir,
                debug,
            };

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(serve(&config, dashboard))?;
        }

        Commands::Inspect {
            dataset,
            show_authors,
            debug,
        } => {
            init_tracing(debug);

            let source = DatasetSource::parse(&dataset);
            let (dataset, report) = load_dataset(&source, false)?;

            println!("=== Dataset Statistics ===");
            println!("Source: {}", source);
            println!("Rows read: {}", report.rows_read);
            println!("Rows skipped: {}", report.skipped);
            println!("Books loaded: {}", dataset.len());
            println!("Distinct authors: {}", dataset.authors().len());
            println!("Maximum pages: {}", dataset.max_num_pages());

            if let Some(limit) = show_authors {
                println!("\n=== Authors ===");
                for author in dataset.authors().iter().take(limit) {
                    println!("  {}", author);
                }
            }
        }
    }

    Ok(())
}

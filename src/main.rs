use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lakehouse_loader::loader::{LoadMode, LoadStatus};
use lakehouse_loader::runner::{self, LoadArgs};
use lakehouse_loader::schema::SchemaRegistry;
use lakehouse_loader::store::LocalTableStore;

#[derive(Parser, Clone)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Subcommand)]
enum Command {
    /// Load every TPC-H table from flat files into the table store
    Load {
        /// Directory containing the source .tbl files
        #[arg(short, long)]
        base_path: PathBuf,

        /// Base directory of the destination table store
        #[arg(short, long)]
        destination: PathBuf,

        /// Number of concurrent load workers (defaults to host parallelism)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Load tables one at a time, in registry order
        #[arg(long)]
        sequential: bool,

        /// Quiet mode - no progress bar, warnings only
        #[arg(short, long)]
        quiet: bool,
    },
    /// Report row counts for every table in the store
    Verify {
        /// Base directory of the destination table store
        #[arg(short, long)]
        destination: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Load {
            base_path,
            destination,
            workers,
            sequential,
            quiet,
        } => run_loader(base_path, destination, workers, sequential, quiet).await?,
        Command::Verify { destination } => run_verify(destination).await?,
    }
    Ok(())
}

async fn run_loader(
    base_path: PathBuf,
    destination: PathBuf,
    workers: Option<usize>,
    sequential: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    // Initialize tracing based on quiet mode
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let filter = if quiet {
        EnvFilter::new("lakehouse_loader=warn")
    } else {
        EnvFilter::new("lakehouse_loader=info")
    };
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let mode = if sequential {
        LoadMode::Sequential
    } else {
        LoadMode::Bounded(workers.unwrap_or_else(lakehouse_loader::default_worker_count))
    };

    if !quiet {
        println!("TPC-H Bulk Loader");
        println!("=================");
        println!("Source: {}", base_path.display());
        println!("Destination: {}", destination.display());
        println!("Mode: {:?}", mode);
        println!();
    }

    let summary = runner::run_load(LoadArgs {
        base_path,
        destination,
        mode,
        quiet,
    })
    .await?;

    println!();
    println!("Load Summary");
    println!("============");
    println!("Tables loaded: {}", summary.tables_loaded);
    println!("Tables failed: {}", summary.tables_failed);
    println!("Rows loaded: {}", summary.rows_loaded);
    println!("Duration: {:.2}s", summary.duration.as_secs_f64());

    if summary.tables_failed > 0 {
        println!();
        println!("Failures:");
        for result in &summary.results {
            if let LoadStatus::Failed(err) = &result.status {
                println!("  {}: {}", result.table_name, err);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run_verify(destination: PathBuf) -> anyhow::Result<()> {
    let registry = SchemaRegistry::tpch();
    let store = LocalTableStore::new(destination);

    let counts = runner::verify_counts(&store, &registry).await?;

    println!("{:<10} {:>12}", "source", "records");
    for (table_name, count) in counts {
        match count {
            Some(count) => println!("{:<10} {:>12}", table_name, count),
            None => println!("{:<10} {:>12}", table_name, "<missing>"),
        }
    }

    Ok(())
}

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use reportbook::config::Config;
use reportbook::seed;
use reportbook::store::SqliteStore;

#[derive(Parser)]
#[command(name = "reportbookd")]
#[command(about = "Student record and report card service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve,
    /// Create or upgrade the database schema
    InitDb,
    /// Load the admin account and sample records
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Commands::Serve => {
            let store = Arc::new(SqliteStore::open(&config.data_dir)?);
            reportbook::http::serve(&config, store).await?;
        }
        Commands::InitDb => {
            SqliteStore::open(&config.data_dir)?;
            println!("Schema ready in {}.", config.data_dir.display());
        }
        Commands::Seed => {
            let store = SqliteStore::open(&config.data_dir)?;
            let summary = seed::run(&store)?;
            if summary.admin_created {
                println!(
                    "Seeded {} students and {} reports.",
                    summary.students, summary.reports
                );
                println!("Sign in with {} / {}.", seed::ADMIN_EMAIL, seed::ADMIN_PASSWORD);
            } else {
                println!("Admin user already exists. Skipping.");
            }
        }
    }

    Ok(())
}

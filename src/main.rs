use anyhow::{Context, Result};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use std::fs;
use std::path::Path;

mod models;
mod repositories;
mod rewards;
mod seed;
mod services;
mod settings;

use repositories::{memory::MemoryRepository, postgres::PgRepository, Repository};
use settings::{Backend, Settings};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.toml")]
    config: String,
    /// Overrides `server.listen` from the config file.
    #[arg(short, long)]
    listen: Option<String>,
    #[arg(long, default_value = "log4rs.yaml")]
    log4rs: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    init_logging(&args.log4rs)?;
    let mut settings = Settings::load(&args.config).context("Could not load config file.")?;
    if let Some(listen) = args.listen {
        settings.server.listen = listen;
    }
    log::info!("Starting coin rewards service.");

    match settings.storage.backend {
        Backend::Postgres => {
            let conn = PgPoolOptions::new()
                .max_connections(settings.postgres.max_connections)
                .connect(&settings.postgres.url)
                .await
                .context("Could not connect to database.")?;
            sqlx::migrate!("./migrations")
                .run(&conn)
                .await
                .context("Could not run migrations.")?;

            run(PgRepository::new(conn), settings).await
        }
        Backend::Memory => {
            log::warn!("Using in-memory storage; nothing will survive a restart.");
            run(MemoryRepository::new(), settings).await
        }
    }
}

async fn run<R: Repository>(repository: R, settings: Settings) -> Result<()> {
    if settings.seed.enabled {
        seed::seed_reference_data(&repository).await;
    }

    services::start_services(repository, settings).await
}

fn init_logging(path: &str) -> Result<(), anyhow::Error> {
    if !Path::new("logs").exists() {
        fs::create_dir("logs")?;
    }

    match log4rs::init_file(path, Default::default()) {
        Ok(_) => {
            println!("[*] Logging initialized successfully.");
            Ok(())
        }
        Err(e) => {
            println!("[ERROR] Failed to initialize logging: {}", e);
            Err(anyhow::anyhow!("Could not initialize logging: {}", e))
        }
    }
}

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use newsroom_core::storage::{DatabaseStorage, Storage};
use newsroom_core::{DatabaseManager, Settings};
use newsroom_engine::mail::mailer_from_settings;
use newsroom_engine::tasks::Worker;
use newsroom_engine::{digest, maintenance, observability, seed};

#[derive(Parser)]
#[command(name = "newsroom-engine")]
#[command(about = "Newsroom background engine: task worker, digest, maintenance")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the task-queue worker together with the digest scheduler
    Worker,
    /// Send the weekly digest once, now
    Digest,
    /// Create profiles for users that lack one
    BackfillProfiles,
    /// Recompute every author's aggregate rating
    RefreshRatings,
    /// Load a demo dataset and print the rating walkthrough
    Seed,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    observability::logging::init_logging();

    let settings = Arc::new(Settings::from_env());

    info!("Initializing database storage...");
    let db = DatabaseManager::new(&settings.database).await?;
    db.run_migrations().await?;
    let storage: Arc<dyn Storage> = Arc::new(DatabaseStorage::new(Arc::new(db)));
    info!("Database storage initialized successfully");

    match cli.command {
        Commands::Worker => {
            let mailer = mailer_from_settings(&settings.mail)?;
            let worker = Worker::new(storage.clone(), mailer.clone(), settings.clone());
            tokio::try_join!(
                worker.run(),
                digest::run_scheduler(storage, mailer, settings),
            )?;
        }
        Commands::Digest => {
            let mailer = mailer_from_settings(&settings.mail)?;
            let report = digest::run_digest(storage.as_ref(), mailer.as_ref(), &settings).await?;
            println!(
                "Digest sent: {} categories, {} emails",
                report.categories, report.emails_sent
            );
        }
        Commands::BackfillProfiles => {
            let created = maintenance::backfill_profiles(storage.as_ref()).await?;
            println!("Created {created} missing profiles");
        }
        Commands::RefreshRatings => {
            let updated = maintenance::refresh_ratings(storage.as_ref()).await?;
            println!("Recomputed ratings for {updated} authors");
        }
        Commands::Seed => {
            seed::run(storage).await?;
            println!("Seed data loaded");
        }
        Commands::Migrate => {
            println!("Migrations applied");
        }
    }

    Ok(())
}

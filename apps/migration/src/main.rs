//! Applies or rolls back the blog schema.
//!
//! Reads `DATABASE_URL` from the environment (or `.env`) and accepts the
//! usual sea-orm-migration subcommands: `up`, `down`, `fresh`, `status`.

use sea_orm_migration::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    tracing::info!("Running blog migrations");
    cli::run_cli(migration::Migrator).await;
}

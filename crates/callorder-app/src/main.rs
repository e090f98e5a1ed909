//! Ordering line binary - composition root.
//!
//! 1. Load configuration from TOML (CLI and env overrides applied)
//! 2. Open the configured order backend (SQLite or JSON files)
//! 3. Load the catalog directory and pick the restaurant for the callee
//! 4. Build the dialog engine, with the AI matcher when enabled
//! 5. Simulate one call on the console

mod cli;
mod console;

use std::sync::Arc;

use clap::Parser;

use callorder_core::catalog::CatalogDirectory;
use callorder_core::config::CallOrderConfig;
use callorder_dialog::{CatalogResolver, DialogEngine};
use callorder_matcher::OpenAiItemMatcher;
use callorder_storage::OrderBackend;

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = CallOrderConfig::load_or_default(&config_file);

    // Tracing. Logs go to stderr so the call transcript stays readable.
    let log_level = args.resolve_log_level(&config);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting callorder v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    // Storage.
    let data_dir = args.resolve_data_dir(&config);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    let backend = OrderBackend::open(&config.storage, &data_dir)?;
    tracing::info!(backend = %config.storage.backend, path = %data_dir.display(), "Order storage ready");

    if args.list_orders {
        for order in backend.list_recent(args.limit)? {
            println!(
                "{}  {}  {}  {} item(s)  ${:.2}  {}",
                order.timestamp.format("%Y-%m-%d %H:%M:%S"),
                order.order_id,
                order.call_id,
                order.items.len(),
                order.total_price,
                order.restaurant_name
            );
        }
        return Ok(());
    }

    // Catalog.
    let catalog_path = args.resolve_catalog_path(&config);
    let directory = CatalogDirectory::load(&catalog_path)?;
    let catalog = match &args.callee {
        Some(callee) => directory.find_by_callee(callee).ok_or_else(|| {
            format!("No catalog answers calls to {} in {}", callee, catalog_path.display())
        })?,
        None => directory
            .catalogs
            .first()
            .ok_or_else(|| format!("{} defines no catalogs", catalog_path.display()))?,
    };
    tracing::info!(catalog = %catalog.id, items = catalog.items.len(), "Catalog selected");

    // Dialog engine.
    let mut engine = DialogEngine::new(backend.store())
        .with_settings(config.dialog.clone())
        .with_resolver(CatalogResolver::new().with_config(&config.matcher));

    if config.matcher.enabled {
        match OpenAiItemMatcher::from_config(&config.matcher) {
            Ok(matcher) => engine = engine.with_matcher(Arc::new(matcher)),
            Err(e) => tracing::warn!(error = %e, "AI matcher unavailable; using deterministic matching only"),
        }
    }

    // Call.
    let call_id = args.resolve_call_id();
    tracing::info!(call_id = %call_id, "Simulated call connected");
    let stdin = std::io::stdin();
    let turns = console::run_call(&engine, catalog, &call_id, stdin.lock(), std::io::stdout()).await?;
    tracing::info!(call_id = %call_id, turns, "Simulated call finished");

    Ok(())
}

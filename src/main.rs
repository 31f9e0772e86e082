//! starrdesk - headless entry point.
//!
//! Loads settings from `starrdesk/` (or `$STARRDESK_DIR`), sets up logging, then lists
//! the download clients of every saved instance and logs the outcome. The desktop
//! front end embeds the library directly and calls [`Starrs`] and [`App`] itself.
//!
//! # Execution Flow
//!
//! 1. Load `starrdesk.yaml` (plus `STARRDESK__*` environment overrides)
//! 2. Initialize logging → `<log.dir>/<log.prefix>.<date>`
//! 3. Create tokio runtime
//! 4. Build the notifier, payload store and [`Starrs`] dispatcher
//! 5. Query each saved instance
//! 6. Log metrics and shut down

use anyhow::Result;
use starrdesk::logging::setup_logging;
use starrdesk::notify::Notifier;
use starrdesk::storage::DialogStore;
use starrdesk::{APP_NAME, App, ConfigManager, Starrs, VERSION};
use std::sync::Arc;

fn main() -> Result<()> {
    let config_dir =
        std::env::var("STARRDESK_DIR").unwrap_or_else(|_| "starrdesk".to_string());
    let config_manager = ConfigManager::new(&config_dir)?;
    let settings = config_manager.load_settings()?;

    let log = setup_logging(&settings.log)?;
    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("starrdesk-worker")
        .build()?;

    let notifier = Arc::new(Notifier::default());
    let export_dir = if settings.export_dir.is_empty() {
        config_manager.config_dir().to_path_buf()
    } else {
        settings.export_dir.clone().into()
    };
    let store = Arc::new(DialogStore::new(export_dir));

    let app = App::new(config_manager, settings, notifier.clone(), Some(log));
    let starrs = Starrs::new(notifier.clone(), store)
        .with_translator(app.shared_translator())
        .with_busy_floor(app.busy_floor());

    runtime.block_on(async {
        let settings = app.get_config();
        let mut queried = 0;

        for instance in settings.all_instances() {
            queried += 1;
            match starrs.download_clients(instance).await {
                Ok(clients) => tracing::info!(
                    "{} ({}): {} download clients",
                    instance.name,
                    instance.app,
                    clients.len()
                ),
                // Already reported through the notifier
                Err(failure) => tracing::debug!("{:?}", failure.cause),
            }
        }

        if queried == 0 {
            tracing::warn!("No instances configured, nothing to query");
        }
    });

    starrs.metrics().log_summary();
    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    tracing::info!("Shutdown complete");
    Ok(())
}

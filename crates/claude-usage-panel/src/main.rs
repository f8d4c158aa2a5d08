mod bootstrap;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use panel_core::settings::Settings;
use panel_core::view_mode::PanelGeometry;
use panel_runtime::bridge::PanelHeight;
use panel_runtime::local_backend::LocalBackend;
use panel_runtime::orchestrator::PanelOrchestrator;
use panel_ui::app::App;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    let log_path = bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Claude Usage Panel v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Theme: {}, Poll interval: {}s, Log: {}",
        settings.theme,
        settings.poll_interval,
        log_path.display()
    );

    let geometry = PanelGeometry::default();
    let height = PanelHeight::new(geometry.compact_height);
    let (events_tx, events_rx) = mpsc::channel(16);

    let backend = Arc::new(LocalBackend::new(
        settings.usage_file_or_default(),
        events_tx,
        height.clone(),
    ));
    tracing::info!("Reading usage from {}", backend.usage_file().display());

    let poller = Arc::clone(&backend)
        .spawn_polling(Duration::from_secs(u64::from(settings.poll_interval)));

    let (handle, views) = PanelOrchestrator::new(backend)
        .with_geometry(geometry)
        .start(events_rx);

    let app = App::new(&settings.theme, handle.sender(), height);

    // The TUI exits on 'q' / Ctrl+C. We also listen for Ctrl+C at the OS level
    // so that signals received outside raw mode shut down cleanly.
    tokio::select! {
        result = app.run(views) => {
            handle.abort();
            poller.abort();
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down panel");
            handle.abort();
            poller.abort();
        }
    }

    tracing::info!("Claude Usage Panel stopped");
    Ok(())
}

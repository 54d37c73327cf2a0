mod app;
mod config;
mod error;
mod media;
mod models;
mod palette;
mod polish;
mod session;
mod store;

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

use app::NotebookApp;
use config::AppConfig;
use session::Library;
use store::{BlobStore, MemoryBlobStore, SqliteBlobStore};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn open_store(config: &AppConfig) -> Box<dyn BlobStore> {
    match SqliteBlobStore::open(config.db_path.clone()) {
        Ok(store) => {
            tracing::info!(path = %store.path().display(), "notebook store opened");
            Box::new(store)
        }
        Err(err) => {
            tracing::warn!(
                path = %config.db_path.display(),
                error = %err,
                "could not open notebook store; changes will not survive a restart"
            );
            Box::new(MemoryBlobStore::new())
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = AppConfig::from_env();
    let library = Library::load(open_store(&config));

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 900.0])
            .with_min_inner_size([640.0, 480.0])
            .with_resizable(true)
            .with_drag_and_drop(true)
            .with_title("Dream Notebook"),
        ..Default::default()
    };

    let ai = config.ai.clone();
    eframe::run_native(
        "Dream Notebook",
        native_options,
        Box::new(move |cc| Box::new(NotebookApp::new(&cc.egui_ctx, library, &ai))),
    )
    .map_err(|err| anyhow!("failed to run the notebook window: {err}"))
}

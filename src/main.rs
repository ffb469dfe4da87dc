//! Exports discovered translation files as a static asset layout.
//!
//! ```text
//! i18n-export <project-root> <output-dir>
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use i18n_runtime::config::ConfigManager;
use i18n_runtime::export::export_table;
use i18n_runtime::{
    Engine,
    EngineSetup,
};

/// Engine instance used for the export.
const INSTANCE_NAME: &str = "i18n-export";
/// Name of the discovered project source.
const SOURCE_NAME: &str = "project";

/// Loads the project settings, merges every language and writes the layout.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(root), Some(out)) = (args.next().map(PathBuf::from), args.next().map(PathBuf::from))
    else {
        tracing::error!("Usage: i18n-export <project-root> <output-dir>");
        return ExitCode::from(2);
    };

    let mut config_manager = ConfigManager::new();
    if let Err(e) = config_manager.load_settings(Some(root)) {
        tracing::error!("{e}");
        return ExitCode::FAILURE;
    }
    let Some(source) = config_manager.discovered_source(SOURCE_NAME) else {
        tracing::error!("No project root to discover translation files in");
        return ExitCode::FAILURE;
    };
    let settings = config_manager.headless_settings();

    let engine = Engine::instance(INSTANCE_NAME);
    engine.initialize(EngineSetup::new().source(source).settings(settings)).await;

    let codes = engine.codes();
    for code in &codes {
        engine.preload(code.clone()).await;
    }

    let report = engine.analyze_keys();
    for (code, keys) in &report.missing {
        tracing::warn!(%code, count = keys.len(), "Missing keys: {:?}", keys);
    }

    let mut table = engine.base_snapshot();
    table.retain(|_, map| !map.is_empty());
    if let Err(e) = export_table(&table, &out).await {
        tracing::error!("{e}");
        return ExitCode::FAILURE;
    }
    tracing::info!(languages = table.len(), out = %out.display(), "Export finished");
    ExitCode::SUCCESS
}

//! Writes translation tables in the static asset layout.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use crate::input::source::{
    DataSource,
    SourceError,
};
use crate::input::{
    MANIFEST_FILE,
    data_file_path,
};
use crate::types::LanguageCode;
use crate::value::{
    TranslationTable,
    TranslationValue,
};

/// Errors from writing a static export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Output directory or file could not be written.
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),

    /// Export data could not be serialized.
    #[error("Failed to serialize export: {0}")]
    Json(#[from] serde_json::Error),

    /// The source could not provide its data.
    #[error("Failed to read source for export: {0}")]
    Source(#[from] SourceError),
}

/// Writes `codes.json` and one `data/<code>.json` per language under `dir`.
///
/// Codes and keys are written in sorted order so exports are reproducible.
///
/// # Errors
/// Fails on the first write or serialization error.
pub async fn export_table(table: &TranslationTable, dir: &Path) -> Result<(), ExportError> {
    let mut codes: Vec<&LanguageCode> = table.keys().collect();
    codes.sort();

    tokio::fs::create_dir_all(dir.join(crate::input::DATA_DIR)).await?;
    tokio::fs::write(dir.join(MANIFEST_FILE), serde_json::to_string_pretty(&codes)?).await?;

    for code in codes {
        let Some(map) = table.get(code) else {
            continue;
        };
        let sorted: BTreeMap<&String, &TranslationValue> = map.iter().collect();
        let path = dir.join(data_file_path(code));
        tokio::fs::write(&path, serde_json::to_string_pretty(&sorted)?).await?;
        tracing::debug!(%code, path = %path.display(), keys = sorted.len(), "Exported language");
    }

    Ok(())
}

/// Fetches every language of `source` and exports it with [`export_table`].
///
/// Unlike merging, a failing source aborts the export.
///
/// # Errors
/// Returns [`ExportError::Source`] when the source fails, otherwise as [`export_table`].
pub async fn export_source(source: &dyn DataSource, dir: &Path) -> Result<(), ExportError> {
    let mut table = TranslationTable::new();
    for code in source.supported_codes().await? {
        let data = source.data(&code).await?;
        table.insert(code, data);
    }
    export_table(&table, dir).await
}

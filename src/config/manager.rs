//! Project settings and what the command-line surface derives from them.

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    EngineSettings,
    loader,
};
use crate::input::translation::AssetSource;

/// Validated settings of one project and the root they were loaded from.
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// Defaults until [`ConfigManager::load_settings`] succeeds.
    settings: EngineSettings,

    /// Root of the last successful load.
    project_root: Option<PathBuf>,
}

impl ConfigManager {
    /// Manager holding the default settings and no project.
    #[must_use]
    pub fn new() -> Self {
        Self { settings: EngineSettings::default(), project_root: None }
    }

    /// Loads settings from `project_root`, falling back to defaults when the
    /// root or its settings file is missing. On error nothing changes.
    ///
    /// # Errors
    /// - File read failure
    /// - JSON parse failure
    /// - Validation failure
    pub fn load_settings(&mut self, project_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings for project: {:?}", project_root);

        let settings = if let Some(root) = &project_root {
            loader::load_from_root(root)?.map_or_else(EngineSettings::default, |loaded| {
                tracing::debug!("Loaded project settings: {:?}", loaded);
                loaded
            })
        } else {
            EngineSettings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.settings = settings;
        self.project_root = project_root;
        tracing::debug!("Settings loaded successfully: {:?}", self.settings);

        Ok(())
    }

    /// Settings as loaded.
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Root of the loaded project, if any.
    #[must_use]
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Settings for a one-shot run: the device locale is ignored and the
    /// active language is never persisted.
    #[must_use]
    pub fn headless_settings(&self) -> EngineSettings {
        EngineSettings { sync_with_device: false, auto_save: false, ..self.settings.clone() }
    }

    /// Source discovering the project's translation files with the configured
    /// pattern and key separator. `None` without a project root.
    #[must_use]
    pub fn discovered_source(&self, name: &str) -> Option<AssetSource> {
        self.project_root().map(|root| {
            AssetSource::discover(
                name,
                root,
                self.settings.translation_files.file_pattern.clone(),
                self.settings.key_separator.clone(),
            )
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::config::CONFIG_FILE_NAME;
    use crate::input::source::DataSource;
    use crate::types::LanguageCode;

    /// new: created with defaults
    #[rstest]
    fn test_new_creates_default_settings() {
        let manager = ConfigManager::new();

        assert_eq!(manager.settings().key_separator, ".");
        assert!(manager.settings().auto_save);
        assert!(manager.project_root().is_none());
        assert!(manager.discovered_source("project").is_none());
    }

    /// `load_settings`: no project root
    #[rstest]
    fn test_load_settings_without_root() {
        let mut manager = ConfigManager::new();

        let result = manager.load_settings(None);

        assert!(result.is_ok());
        assert!(manager.settings().initial_code.is_none());
        assert!(manager.project_root().is_none());
    }

    /// `load_settings`: settings file present
    #[rstest]
    fn test_load_settings_with_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"initialCode": "en", "autoSave": false}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(result.is_ok());
        assert!(!manager.settings().auto_save);
        assert_eq!(manager.project_root(), Some(temp_dir.path()));
    }

    /// `load_settings`: invalid settings are rejected and the old ones kept
    #[rstest]
    fn test_load_settings_with_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), r#"{"keySeparator": ""}"#).unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(matches!(result, Err(ConfigError::ValidationErrors(_))));
        assert_eq!(manager.settings().key_separator, ".");
        assert!(manager.project_root().is_none());
    }

    /// `headless_settings`: device sync and persistence are off, the rest kept
    #[rstest]
    fn test_headless_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"initialCode": "vi", "syncWithDevice": true}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();
        let mut manager = ConfigManager::new();
        manager.load_settings(Some(temp_dir.path().to_path_buf())).unwrap();

        let settings = manager.headless_settings();

        assert!(!settings.sync_with_device);
        assert!(!settings.auto_save);
        assert_eq!(settings.initial_code.unwrap().as_str(), "vi");
    }

    /// `discovered_source`: uses the configured pattern and separator
    #[tokio::test]
    async fn test_discovered_source_uses_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_content =
            r#"{"keySeparator": "/", "translationFiles": {"filePattern": "**/lang/*.json"}}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();
        fs::create_dir_all(temp_dir.path().join("lang")).unwrap();
        fs::write(temp_dir.path().join("lang/fr.json"), r#"{"menu": {"open": "Ouvrir"}}"#)
            .unwrap();
        let mut manager = ConfigManager::new();
        manager.load_settings(Some(temp_dir.path().to_path_buf())).unwrap();

        let source = manager.discovered_source("project").unwrap();

        assert_eq!(source.supported_codes().await.unwrap(), vec![LanguageCode::from("fr")]);
        let data = source.data(&"fr".into()).await.unwrap();
        assert!(data.contains_key("menu/open"));
    }
}

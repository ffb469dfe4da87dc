//! Construction parameters for [`Engine::initialize`](super::Engine::initialize).

use std::fmt;
use std::sync::Arc;

use crate::config::EngineSettings;
use crate::diagnostic::DiagnosticHook;
use crate::input::device::{
    DeviceLocale,
    SystemLocale,
};
use crate::input::preferences::{
    MemoryStore,
    PreferenceStore,
};
use crate::input::source::DataSource;
use crate::notify::RenderLayer;

/// Everything an engine instance is initialized with.
///
/// ```
/// use i18n_runtime::engine::EngineSetup;
/// use i18n_runtime::input::source::InlineSource;
///
/// let setup = EngineSetup::new()
///     .source(InlineSource::new("app", Default::default()))
///     .diagnostic_hook(|message| eprintln!("{message}"));
/// ```
pub struct EngineSetup {
    /// Base sources in merge order.
    pub(super) sources: Vec<Arc<dyn DataSource>>,
    /// Sources of the override layer.
    pub(super) override_sources: Vec<Arc<dyn DataSource>>,
    /// Instance settings.
    pub(super) settings: EngineSettings,
    /// Where the active and device codes are persisted.
    pub(super) store: Arc<dyn PreferenceStore>,
    /// Host locale.
    pub(super) device: Arc<dyn DeviceLocale>,
    /// Keeps the previous layer on re-initialization when `None`.
    pub(super) render_layer: Option<Arc<dyn RenderLayer>>,
    /// Receiver of absorbed anomalies.
    pub(super) diagnostic_hook: Option<DiagnosticHook>,
}

impl EngineSetup {
    /// Default settings, an in-memory store and the system locale.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            override_sources: Vec::new(),
            settings: EngineSettings::default(),
            store: Arc::new(MemoryStore::new()),
            device: Arc::new(SystemLocale),
            render_layer: None,
            diagnostic_hook: None,
        }
    }

    /// Appends a merged source. Registration order is merge order.
    #[must_use]
    pub fn source(self, source: impl DataSource + 'static) -> Self {
        self.shared_source(Arc::new(source))
    }

    /// Like [`EngineSetup::source`] for a source that is also used elsewhere.
    #[must_use]
    pub fn shared_source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Appends a source whose data feeds the override layer.
    #[must_use]
    pub fn override_source(mut self, source: impl DataSource + 'static) -> Self {
        self.override_sources.push(Arc::new(source));
        self
    }

    /// Replaces the default settings.
    #[must_use]
    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the in-memory preference store.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn PreferenceStore>) -> Self {
        self.store = store;
        self
    }

    /// Replaces [`SystemLocale`].
    #[must_use]
    pub fn device(mut self, device: impl DeviceLocale + 'static) -> Self {
        self.device = Arc::new(device);
        self
    }

    /// Host hierarchy used to plan subscriber refreshes.
    #[must_use]
    pub fn render_layer(mut self, layer: Arc<dyn RenderLayer>) -> Self {
        self.render_layer = Some(layer);
        self
    }

    /// Receives absorbed anomalies when `isDebug` is set.
    #[must_use]
    pub fn diagnostic_hook(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.diagnostic_hook = Some(Arc::new(hook));
        self
    }
}

impl Default for EngineSetup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EngineSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineSetup")
            .field("sources", &self.sources)
            .field("override_sources", &self.override_sources)
            .field("settings", &self.settings)
            .field("store", &self.store)
            .field("device", &self.device)
            .field("render_layer", &self.render_layer)
            .field("diagnostic_hook", &self.diagnostic_hook.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

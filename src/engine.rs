//! Named engine instances: merged tables, active language, subscribers.

mod setup;

use std::collections::{
    HashMap,
    HashSet,
};
use std::fmt;
use std::sync::{
    Arc,
    LazyLock,
};

use parking_lot::{
    Mutex,
    RwLock,
};
use tokio::sync::{
    broadcast,
    watch,
};

pub use self::setup::EngineSetup;
use crate::analysis::{
    self,
    KeyReport,
};
use crate::config::EngineSettings;
use crate::diagnostic::Diagnostics;
use crate::error::EngineError;
use crate::input::device::{
    DeviceLocale,
    SystemLocale,
};
use crate::input::preferences::{
    MemoryStore,
    PreferenceStore,
};
use crate::input::source::DataSource;
use crate::interpolate;
use crate::merge::{
    self,
    RegisteredSource,
};
use crate::notify::{
    RenderLayer,
    SubscriberRegistry,
    TargetId,
};
use crate::resolver::{
    self,
    ChangeDecision,
    InitialInputs,
};
use crate::types::{
    LanguageCode,
    Params,
};
use crate::value::{
    TranslationMap,
    TranslationTable,
    TranslationValue,
};

/// Name of the instance returned by [`Engine::global`].
pub const DEFAULT_INSTANCE: &str = "default";

/// Store key suffix of the persisted active code.
const ACTIVE_CODE_KEY: &str = "activeCode";
/// Store key suffix of the last device locale seen.
const DEVICE_CODE_KEY: &str = "deviceCode";
/// Change events buffered per receiver.
const EVENT_CAPACITY: usize = 32;

/// Live instances by name.
static INSTANCES: LazyLock<Mutex<HashMap<String, Engine>>> = LazyLock::new(Mutex::default);

/// Handle to a named engine instance.
///
/// Handles are cheap to clone and compare equal by name. All handles obtained
/// for one name through [`Engine::instance`] share the same state until the
/// instance is [disposed](Engine::dispose).
#[derive(Clone)]
pub struct Engine {
    /// State shared by every handle of the instance.
    inner: Arc<EngineInner>,
}

/// # Lock order
///
/// `state` before `subscribers`. No lock is held across an `.await` or while
/// calling into a render layer or diagnostic hook.
struct EngineInner {
    /// Instance name, also the prefix of persisted keys.
    name: String,
    /// Everything replaced by [`Engine::initialize`].
    state: RwLock<EngineState>,
    /// Render targets to refresh on changes.
    subscribers: Mutex<SubscriberRegistry>,
    /// New active code after each effective change.
    events: broadcast::Sender<LanguageCode>,
    /// Flips to true once initialization completes.
    initialized: watch::Sender<bool>,
}

/// Tables, sources and collaborators of an initialized instance.
struct EngineState {
    /// Settings given at initialization.
    settings: EngineSettings,
    /// Base sources in registration order.
    sources: Vec<Arc<RegisteredSource>>,
    /// Sources feeding the override layer.
    override_sources: Vec<Arc<RegisteredSource>>,
    /// Merged base table of the loaded languages.
    base: TranslationTable,
    /// Override layer, consulted before `base`.
    overrides: TranslationTable,
    /// Languages merged into `base` so far.
    loaded: HashSet<LanguageCode>,
    /// Codes advertised by the sources, in first-seen order.
    known: Vec<LanguageCode>,
    /// `None` until initialized.
    active: Option<LanguageCode>,
    /// Persistence of the active and device codes.
    store: Arc<dyn PreferenceStore>,
    /// Host locale source.
    device: Arc<dyn DeviceLocale>,
    /// Host hierarchy used to plan refreshes.
    render_layer: Option<Arc<dyn RenderLayer>>,
    /// Absorbed-anomaly reporting.
    diagnostics: Diagnostics,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            settings: EngineSettings::default(),
            sources: Vec::new(),
            override_sources: Vec::new(),
            base: TranslationTable::new(),
            overrides: TranslationTable::new(),
            loaded: HashSet::new(),
            known: Vec::new(),
            active: None,
            store: Arc::new(MemoryStore::new()),
            device: Arc::new(SystemLocale),
            render_layer: None,
            diagnostics: Diagnostics::default(),
        }
    }
}

impl EngineState {
    /// Loaded codes, sorted.
    fn loaded_codes(&self) -> Vec<LanguageCode> {
        let mut codes: Vec<LanguageCode> = self.loaded.iter().cloned().collect();
        codes.sort();
        codes
    }
}

/// A render target registered with an engine.
#[derive(Debug, Clone)]
pub struct Subscriber {
    /// Registered render target.
    target: TargetId,
    /// Engine the target is registered with.
    engine: Engine,
}

impl Subscriber {
    /// Registered render target.
    #[must_use]
    pub const fn target(&self) -> TargetId {
        self.target
    }

    /// Engine the target is registered with.
    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Removes the target from its engine.
    pub fn unregister(&self) -> bool {
        self.engine.unregister(self.target)
    }
}

impl Engine {
    /// Returns the instance named `name`, creating it on first use.
    #[must_use]
    pub fn instance(name: &str) -> Self {
        INSTANCES.lock().entry(name.to_string()).or_insert_with(|| Self::create(name)).clone()
    }

    /// The process-wide default instance.
    #[must_use]
    pub fn global() -> Self {
        Self::instance(DEFAULT_INSTANCE)
    }

    /// Fresh, uninitialized instance.
    fn create(name: &str) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (initialized, _) = watch::channel(false);
        Self {
            inner: Arc::new(EngineInner {
                name: name.to_string(),
                state: RwLock::new(EngineState::default()),
                subscribers: Mutex::new(SubscriberRegistry::new()),
                events,
                initialized,
            }),
        }
    }

    /// Instance name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Persisted key `<name>.<suffix>`.
    fn key(&self, suffix: &str) -> String {
        format!("{}.{suffix}", self.inner.name)
    }

    /// Current diagnostics sink.
    fn diagnostics(&self) -> Diagnostics {
        self.inner.state.read().diagnostics.clone()
    }

    /// Loads sources, picks the active language and marks the instance ready.
    ///
    /// Calling it again replaces the sources, tables and settings. Source
    /// failures are absorbed; the engine always ends up with an active code.
    pub async fn initialize(&self, setup: EngineSetup) {
        let EngineSetup {
            sources,
            override_sources,
            settings,
            store,
            device,
            render_layer,
            diagnostic_hook,
        } = setup;

        let diagnostics = Diagnostics::new(diagnostic_hook, settings.is_debug);
        if let Err(errors) = settings.validate() {
            for error in errors {
                diagnostics.warn(&error.to_string());
            }
        }

        let register = |list: Vec<Arc<dyn DataSource>>| -> Vec<Arc<RegisteredSource>> {
            list.into_iter().map(|source| Arc::new(RegisteredSource::new(source))).collect()
        };
        let sources = register(sources);
        let override_sources = register(override_sources);

        let mut known = merge::known_codes(&sources, &diagnostics).await;
        let saved = if settings.auto_save {
            store.get(&self.key(ACTIVE_CODE_KEY)).await.map(LanguageCode::from)
        } else {
            None
        };
        let device_code = if settings.sync_with_device { device.current() } else { None };

        let chosen = resolver::choose_initial_code(InitialInputs {
            known: &known,
            settings: &settings,
            saved: saved.as_ref(),
            device: device_code.as_ref(),
        });

        let mut base = TranslationTable::new();
        let mut overrides = TranslationTable::new();
        let active = if let Some(code) = chosen {
            base.insert(code.clone(), merge::build_language(&sources, &code, &diagnostics).await);
            let corrections = merge::build_language(&override_sources, &code, &diagnostics).await;
            if !corrections.is_empty() {
                overrides.insert(code.clone(), corrections);
            }
            code
        } else {
            let code = resolver::fallback_code(&settings);
            diagnostics.warn(&format!(
                "No source of '{}' provides any language, starting with an empty '{code}'",
                self.name()
            ));
            base.insert(code.clone(), TranslationMap::new());
            known.push(code.clone());
            code
        };

        let sync_with_device = settings.sync_with_device;
        let previous = {
            let mut state = self.inner.state.write();
            let previous = state.active.take();
            let render_layer = render_layer.or_else(|| state.render_layer.take());
            *state = EngineState {
                settings,
                sources,
                override_sources,
                base,
                overrides,
                loaded: HashSet::from([active.clone()]),
                known,
                active: Some(active.clone()),
                store,
                device: Arc::clone(&device),
                render_layer,
                diagnostics,
            };
            previous
        };
        self.inner.initialized.send_replace(true);
        tracing::info!(instance = %self.name(), code = %active, "Engine initialized");

        if previous.is_some_and(|previous| previous != active) {
            self.announce(&active);
        }

        if sync_with_device && let Some(current) = device.current() {
            self.reconcile_device(current, true).await;
        }
    }

    /// Whether [`Engine::initialize`] has completed since creation or disposal.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        *self.inner.initialized.borrow()
    }

    /// Waits until [`Engine::initialize`] has completed.
    pub async fn ensure_initialized(&self) {
        let mut ready = self.inner.initialized.subscribe();
        let _ = ready.wait_for(|initialized| *initialized).await;
    }

    /// Active language code.
    ///
    /// # Errors
    /// [`EngineError::NotInitialized`] before initialization completes.
    pub fn code(&self) -> Result<LanguageCode, EngineError> {
        self.inner
            .state
            .read()
            .active
            .clone()
            .ok_or_else(|| EngineError::NotInitialized { instance: self.name().to_string() })
    }

    /// Codes advertised by the registered sources, in first-seen order.
    #[must_use]
    pub fn codes(&self) -> Vec<LanguageCode> {
        self.inner.state.read().known.clone()
    }

    /// Settings in effect.
    #[must_use]
    pub fn settings(&self) -> EngineSettings {
        self.inner.state.read().settings.clone()
    }

    /// Whether `code` has been merged into the base table.
    #[must_use]
    pub fn is_loaded(&self, code: &LanguageCode) -> bool {
        self.inner.state.read().loaded.contains(code)
    }

    /// Copy of the merged base table.
    #[must_use]
    pub fn base_snapshot(&self) -> TranslationTable {
        self.inner.state.read().base.clone()
    }

    /// Copy of the override layer.
    #[must_use]
    pub fn overrides_snapshot(&self) -> TranslationTable {
        self.inner.state.read().overrides.clone()
    }

    /// Fetches and merges `code` from every source unless already loaded.
    pub async fn preload(&self, code: impl Into<LanguageCode>) {
        let code = code.into();
        let (sources, override_sources, diagnostics) = {
            let state = self.inner.state.read();
            if state.loaded.contains(&code) {
                return;
            }
            (state.sources.clone(), state.override_sources.clone(), state.diagnostics.clone())
        };

        let base = merge::build_language(&sources, &code, &diagnostics).await;
        let corrections = merge::build_language(&override_sources, &code, &diagnostics).await;
        tracing::debug!(instance = %self.name(), %code, keys = base.len(), "Language loaded");

        let mut state = self.inner.state.write();
        state.loaded.insert(code.clone());
        state.base.insert(code.clone(), base);
        if !corrections.is_empty() {
            let layer = state.overrides.entry(code).or_default();
            for (key, value) in corrections {
                layer.entry(key).or_insert(value);
            }
        }
    }

    /// Switches the active language.
    ///
    /// Returns whether the active code changed. An unknown code falls back to
    /// `initialCode` when `useInitialCodeWhenUnavailable` is set and is
    /// otherwise ignored.
    ///
    /// # Errors
    /// [`EngineError::NotInitialized`] before initialization completes.
    pub async fn change(&self, code: impl Into<LanguageCode>) -> Result<bool, EngineError> {
        let requested = code.into();
        let (decision, current, diagnostics) = {
            let state = self.inner.state.read();
            let Some(current) = state.active.clone() else {
                return Err(EngineError::NotInitialized { instance: self.name().to_string() });
            };
            let decision = resolver::decide_change(&state.known, &requested, &state.settings);
            (decision, current, state.diagnostics.clone())
        };

        let target = match decision {
            ChangeDecision::Switch(target) => target,
            ChangeDecision::Unavailable => {
                diagnostics.warn(&format!(
                    "Language '{requested}' is not available in '{}', keeping '{current}'",
                    self.name()
                ));
                return Ok(false);
            }
        };
        if target != requested {
            diagnostics.warn(&format!(
                "Language '{requested}' is not available in '{}', falling back to '{target}'",
                self.name()
            ));
        }
        if target == current {
            return Ok(false);
        }

        self.preload(target.clone()).await;

        let (store, auto_save) = {
            let mut state = self.inner.state.write();
            if state.active.as_ref() == Some(&target) {
                return Ok(false);
            }
            state.active = Some(target.clone());
            (Arc::clone(&state.store), state.settings.auto_save)
        };
        if auto_save {
            store.set(&self.key(ACTIVE_CODE_KEY), target.as_str()).await;
        }

        self.announce(&target);
        Ok(true)
    }

    /// Reconciles with a new device locale when `syncWithDevice` is on.
    pub async fn device_locale_changed(&self, code: impl Into<LanguageCode>) {
        let code = code.into();
        if self.settings().sync_with_device {
            self.reconcile_device(code, false).await;
        } else {
            tracing::debug!(instance = %self.name(), %code, "Device locale ignored");
        }
    }

    /// Re-reads the configured device locale and reconciles with it.
    pub async fn refresh_device_locale(&self) {
        let current = self.inner.state.read().device.current();
        if let Some(current) = current {
            self.device_locale_changed(current).await;
        }
    }

    /// Compares the persisted device code with `current`; on a difference,
    /// records it and switches to the best matching known code.
    ///
    /// At startup a missing record only sets the baseline, so a restored
    /// saved code is not replaced on the first launch with device sync.
    async fn reconcile_device(&self, current: LanguageCode, at_startup: bool) {
        let (store, target) = {
            let state = self.inner.state.read();
            let target = resolver::match_device_code(
                &state.known,
                &current,
                state.settings.is_optional_country_code,
            );
            (Arc::clone(&state.store), target)
        };

        let key = self.key(DEVICE_CODE_KEY);
        let last_seen = store.get(&key).await;
        if last_seen.as_deref() == Some(current.as_str()) {
            return;
        }
        store.set(&key, current.as_str()).await;
        if at_startup && last_seen.is_none() {
            tracing::debug!(instance = %self.name(), %current, "Device locale recorded");
            return;
        }
        tracing::debug!(
            instance = %self.name(),
            last_seen = ?last_seen,
            %current,
            "Device locale changed"
        );

        if let Err(e) = self.change(target.unwrap_or(current)).await {
            self.diagnostics().warn(&e.to_string());
        }
    }

    /// Registers a source after initialization.
    ///
    /// Its data is merged into every loaded language. With `activate`, all
    /// subscribers are refreshed afterwards.
    pub async fn add_source(&self, source: Arc<dyn DataSource>, activate: bool) {
        let registered = Arc::new(RegisteredSource::new(source));
        let (loaded, diagnostics) = {
            let state = self.inner.state.read();
            (state.loaded_codes(), state.diagnostics.clone())
        };

        let codes = registered.codes(&diagnostics).await;
        let mut contributions = Vec::new();
        for code in loaded.into_iter().filter(|code| codes.contains(code)) {
            let data = registered.fetch(&code, &diagnostics).await;
            contributions.push((code, data));
        }

        {
            let mut state = self.inner.state.write();
            for code in codes {
                if !state.known.contains(&code) {
                    state.known.push(code);
                }
            }
            for (code, data) in contributions {
                merge::apply(state.base.entry(code).or_default(), data, registered.overrides());
            }
            tracing::debug!(instance = %self.name(), source = %registered.name(), "Source added");
            state.sources.push(registered);
        }

        if activate {
            self.reload();
        }
    }

    /// Unregisters the source named `name` and rebuilds every loaded language
    /// from the remaining sources. Returns false when no such source exists.
    ///
    /// If the active language is no longer provided, the engine switches to
    /// `initialCode` or the first remaining code.
    pub async fn remove_source(&self, name: &str, activate: bool) -> bool {
        let (sources, loaded, diagnostics) = {
            let mut state = self.inner.state.write();
            let Some(position) = state.sources.iter().position(|source| source.name() == name)
            else {
                return false;
            };
            state.sources.remove(position);
            (state.sources.clone(), state.loaded_codes(), state.diagnostics.clone())
        };

        let known = merge::known_codes(&sources, &diagnostics).await;
        let mut rebuilt = TranslationTable::new();
        for code in loaded {
            let data = merge::build_language(&sources, &code, &diagnostics).await;
            rebuilt.insert(code, data);
        }

        let replacement = {
            let mut state = self.inner.state.write();
            state.known = known;
            state.base = rebuilt;
            match state.active.clone() {
                Some(active) if !state.known.contains(&active) => {
                    let next = state
                        .settings
                        .initial_code
                        .clone()
                        .filter(|initial| state.known.contains(initial))
                        .or_else(|| state.known.first().cloned());
                    if next.is_none() {
                        state.known.push(active);
                    }
                    next
                }
                _ => None,
            }
        };
        tracing::debug!(instance = %self.name(), source = %name, "Source removed");

        if let Some(next) = replacement {
            diagnostics.warn(&format!(
                "Active language of '{}' is no longer provided, switching to '{next}'",
                self.name()
            ));
            self.preload(next.clone()).await;
            self.inner.state.write().active = Some(next.clone());
            self.announce(&next);
        } else if activate {
            self.reload();
        }
        true
    }

    /// Merges `entries` into the override layer for `code`.
    pub fn add_overrides(
        &self,
        code: impl Into<LanguageCode>,
        entries: TranslationMap,
        activate: bool,
    ) {
        self.inner.state.write().overrides.entry(code.into()).or_default().extend(entries);
        if activate {
            self.reload();
        }
    }

    /// Sets one override entry. Call [`Engine::reload`] to refresh subscribers.
    pub fn set_override(
        &self,
        code: impl Into<LanguageCode>,
        key: impl Into<String>,
        value: impl Into<TranslationValue>,
    ) {
        self.inner
            .state
            .write()
            .overrides
            .entry(code.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Removes one override entry and returns it.
    pub fn remove_override(&self, code: &LanguageCode, key: &str) -> Option<TranslationValue> {
        self.inner.state.write().overrides.get_mut(code).and_then(|layer| layer.remove(key))
    }

    /// Empties the override layer of every language.
    pub fn clear_overrides(&self) {
        self.inner.state.write().overrides.clear();
    }

    /// Resolves `key` for `code`, or for the active language when `None`.
    ///
    /// Never fails; see [`interpolate::resolve`] for the fallbacks.
    #[must_use]
    pub fn translate(&self, key: &str, params: &Params, code: Option<&LanguageCode>) -> String {
        let (text, anomaly) = {
            let state = self.inner.state.read();
            match code.or(state.active.as_ref()) {
                None => (
                    key.to_string(),
                    Some((
                        state.diagnostics.clone(),
                        format!("'{key}' looked up before '{}' was initialized", self.name()),
                    )),
                ),
                Some(code) => {
                    let text =
                        interpolate::resolve(key, params, code, &state.base, &state.overrides);
                    let missing =
                        interpolate::lookup(key, code, &state.base, &state.overrides).is_none();
                    let anomaly = missing.then(|| {
                        (state.diagnostics.clone(), format!("No translation for '{key}' in '{code}'"))
                    });
                    (text, anomaly)
                }
            }
        };

        if let Some((diagnostics, message)) = anomaly {
            diagnostics.debug(&message);
        }
        text
    }

    /// Receiver of the new active code after each effective language change.
    #[must_use]
    pub fn subscribe_changes(&self) -> broadcast::Receiver<LanguageCode> {
        self.inner.events.subscribe()
    }

    /// Registers a render target. `force_rebuild` overrides the engine's
    /// `forceRebuild` setting for this target.
    pub fn register(&self, target: TargetId, force_rebuild: Option<bool>) -> Subscriber {
        self.inner.subscribers.lock().register(target, force_rebuild);
        Subscriber { target, engine: self.clone() }
    }

    /// Returns false when `target` was not registered.
    pub fn unregister(&self, target: TargetId) -> bool {
        self.inner.subscribers.lock().unregister(target)
    }

    /// Number of registered render targets.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    /// Sets the render layer used for hierarchy lookups and refreshes.
    pub fn set_render_layer(&self, layer: Arc<dyn RenderLayer>) {
        self.inner.state.write().render_layer = Some(layer);
    }

    /// Refreshes subscribers without a language change. Returns the targets
    /// that were asked to refresh.
    pub fn reload(&self) -> Vec<TargetId> {
        let (layer, inherited_force, diagnostics) = {
            let state = self.inner.state.read();
            (state.render_layer.clone(), state.settings.force_rebuild, state.diagnostics.clone())
        };

        let Some(layer) = layer else {
            if self.subscriber_count() > 0 {
                diagnostics.debug(&format!(
                    "'{}' has subscribers but no render layer to refresh them",
                    self.name()
                ));
            }
            return Vec::new();
        };

        let plan =
            self.inner.subscribers.lock().plan_refresh(layer.as_ref(), self.name(), inherited_force);
        for &target in &plan {
            layer.request_refresh(target);
        }
        tracing::debug!(instance = %self.name(), refreshed = plan.len(), "Subscribers refreshed");
        plan
    }

    /// Publishes `code` as the new active language and refreshes subscribers.
    fn announce(&self, code: &LanguageCode) {
        tracing::info!(instance = %self.name(), %code, "Language changed");
        let _ = self.inner.events.send(code.clone());
        self.reload();
    }

    /// Missing and orphaned keys across the loaded languages.
    #[must_use]
    pub fn analyze_keys(&self) -> KeyReport {
        let report = {
            let state = self.inner.state.read();
            analysis::analyze_keys(&state.base, &state.overrides)
        };
        tracing::debug!(
            instance = %self.name(),
            missing = report.missing_count(),
            orphaned = report.orphan_count(),
            "Keys analyzed"
        );
        report
    }

    /// Clears subscribers and state and drops the instance from the registry.
    ///
    /// Persisted preferences are kept; a later [`Engine::instance`] call with
    /// the same name starts a fresh, uninitialized instance.
    pub fn dispose(&self) {
        self.inner.subscribers.lock().clear();
        *self.inner.state.write() = EngineState::default();
        self.inner.initialized.send_replace(false);

        let mut instances = INSTANCES.lock();
        if instances.get(self.name()).is_some_and(|engine| Arc::ptr_eq(&engine.inner, &self.inner)) {
            instances.remove(self.name());
        }
        tracing::debug!(instance = %self.name(), "Engine disposed");
    }
}

impl PartialEq for Engine {
    fn eq(&self, other: &Self) -> bool {
        self.inner.name == other.inner.name
    }
}

impl Eq for Engine {}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("name", &self.inner.name)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

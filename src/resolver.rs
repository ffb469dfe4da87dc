//! Active-language selection rules.
//!
//! These functions only decide; the engine performs loading, persistence and
//! notification around them.

use crate::config::EngineSettings;
use crate::types::LanguageCode;

/// Inputs of the initialization priority chain.
#[derive(Debug, Clone, Copy)]
pub struct InitialInputs<'a> {
    /// Codes offered by the sources.
    pub known: &'a [LanguageCode],
    /// Engine settings.
    pub settings: &'a EngineSettings,
    /// Persisted active code; only consulted when auto-save is on.
    pub saved: Option<&'a LanguageCode>,
    /// Current device locale.
    pub device: Option<&'a LanguageCode>,
}

/// Picks the initial active code.
///
/// Returns `None` only when `known` is empty; the caller then installs a
/// temporary entry for [`fallback_code`].
#[must_use]
pub fn choose_initial_code(inputs: InitialInputs<'_>) -> Option<LanguageCode> {
    let InitialInputs { known, settings, saved, device } = inputs;
    let is_known = |code: &&LanguageCode| known.contains(code);
    let saved = saved.filter(|_| settings.auto_save);

    if !settings.sync_with_device
        && saved.is_none()
        && let Some(initial) = settings.initial_code.as_ref().filter(is_known)
    {
        return Some(initial.clone());
    }

    if let Some(saved) = saved.filter(is_known) {
        return Some(saved.clone());
    }

    if settings.sync_with_device
        && let Some(device) = device
        && let Some(matched) = match_device_code(known, device, settings.is_optional_country_code)
    {
        return Some(matched);
    }

    if let Some(initial) = settings.initial_code.as_ref().filter(is_known) {
        return Some(initial.clone());
    }

    known.first().cloned()
}

/// Code to use when no source advertises any language.
#[must_use]
pub fn fallback_code(settings: &EngineSettings) -> LanguageCode {
    settings.initial_code.clone().unwrap_or_else(|| LanguageCode::from("en"))
}

/// Matches a device locale against the known codes: exactly first, then by
/// language subtag when `optional_country` is set.
///
/// For the language-only match a known code without region wins over a
/// regional one (`en_GB` prefers `en` to `en-US`).
#[must_use]
pub fn match_device_code(
    known: &[LanguageCode],
    device: &LanguageCode,
    optional_country: bool,
) -> Option<LanguageCode> {
    if let Some(exact) = known.iter().find(|code| *code == device) {
        return Some(exact.clone());
    }
    if !optional_country {
        return None;
    }

    let candidates = known.iter().filter(|code| code.same_language(device));
    let mut first = None;
    for code in candidates {
        if code.region().is_none() {
            return Some(code.clone());
        }
        if first.is_none() {
            first = Some(code);
        }
    }
    first.cloned()
}

/// Outcome of a `change` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeDecision {
    /// Switch to this code (it may equal the current one).
    Switch(LanguageCode),
    /// The requested code is unknown and no fallback applies.
    Unavailable,
}

/// Decides the target of `change(requested)`.
#[must_use]
pub fn decide_change(
    known: &[LanguageCode],
    requested: &LanguageCode,
    settings: &EngineSettings,
) -> ChangeDecision {
    if known.contains(requested) {
        return ChangeDecision::Switch(requested.clone());
    }
    if settings.use_initial_code_when_unavailable
        && let Some(initial) = &settings.initial_code
        && known.contains(initial)
    {
        return ChangeDecision::Switch(initial.clone());
    }
    ChangeDecision::Unavailable
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    fn codes(values: &[&str]) -> Vec<LanguageCode> {
        values.iter().copied().map(LanguageCode::from).collect()
    }

    fn settings(initial: Option<&str>, sync_with_device: bool, auto_save: bool) -> EngineSettings {
        EngineSettings {
            initial_code: initial.map(LanguageCode::from),
            sync_with_device,
            auto_save,
            ..EngineSettings::default()
        }
    }

    fn choose(
        known: &[&str],
        settings: &EngineSettings,
        saved: Option<&str>,
        device: Option<&str>,
    ) -> Option<String> {
        let known = codes(known);
        let saved = saved.map(LanguageCode::from);
        let device = device.map(LanguageCode::from);
        choose_initial_code(InitialInputs {
            known: &known,
            settings,
            saved: saved.as_ref(),
            device: device.as_ref(),
        })
        .map(|code| code.to_string())
    }

    #[rstest]
    fn initial_code_wins_without_device_sync_or_saved_code() {
        let settings = settings(Some("vi"), false, true);

        assert_that!(choose(&["en", "vi"], &settings, None, Some("en")), some(eq("vi")));
    }

    #[rstest]
    fn saved_code_wins_when_auto_save_on() {
        let settings = settings(Some("vi"), false, true);

        assert_that!(choose(&["en", "vi", "fr"], &settings, Some("fr"), None), some(eq("fr")));
    }

    #[rstest]
    fn saved_code_ignored_when_auto_save_off() {
        let settings = settings(Some("vi"), false, false);

        assert_that!(choose(&["en", "vi", "fr"], &settings, Some("fr"), None), some(eq("vi")));
    }

    #[rstest]
    fn unknown_saved_code_falls_through_to_device() {
        let settings = settings(None, true, true);

        assert_that!(choose(&["en", "vi"], &settings, Some("de"), Some("vi_VN")), some(eq("vi")));
    }

    #[rstest]
    fn device_beats_initial_code_when_syncing() {
        let settings = settings(Some("en"), true, true);

        assert_that!(choose(&["en", "vi"], &settings, None, Some("vi")), some(eq("vi")));
    }

    #[rstest]
    fn unmatched_device_uses_initial_code() {
        let settings = settings(Some("vi"), true, true);

        assert_that!(choose(&["en", "vi"], &settings, None, Some("ja")), some(eq("vi")));
    }

    #[rstest]
    fn first_known_code_is_last_resort() {
        let settings = settings(Some("ja"), true, true);

        assert_that!(choose(&["fr", "en"], &settings, None, None), some(eq("fr")));
        assert_that!(choose(&[], &settings, None, None), none());
    }

    #[rstest]
    #[case::exact(&["en", "en-GB"], "en-GB", true, Some("en-GB"))]
    #[case::language_only(&["vi", "en"], "en_US", true, Some("en"))]
    #[case::prefers_regionless(&["en-US", "en"], "en-GB", true, Some("en"))]
    #[case::regional_when_only_option(&["en-US"], "en-GB", true, Some("en-US"))]
    #[case::strict(&["en"], "en_US", false, None)]
    #[case::no_match(&["vi"], "en", true, None)]
    fn test_match_device_code(
        #[case] known: &[&str],
        #[case] device: &str,
        #[case] optional_country: bool,
        #[case] expected: Option<&str>,
    ) {
        let matched = match_device_code(&codes(known), &device.into(), optional_country);

        assert_eq!(matched, expected.map(LanguageCode::from));
    }

    #[rstest]
    #[case::known("vi", true, ChangeDecision::Switch("vi".into()))]
    #[case::fallback("fr", true, ChangeDecision::Switch("en".into()))]
    #[case::unavailable("fr", false, ChangeDecision::Unavailable)]
    fn test_decide_change(
        #[case] requested: &str,
        #[case] use_initial: bool,
        #[case] expected: ChangeDecision,
    ) {
        let settings = EngineSettings {
            initial_code: Some("en".into()),
            use_initial_code_when_unavailable: use_initial,
            ..EngineSettings::default()
        };

        let decision = decide_change(&codes(&["en", "vi"]), &requested.into(), &settings);

        assert_eq!(decision, expected);
    }

    #[rstest]
    fn fallback_prefers_initial_code() {
        assert_that!(fallback_code(&settings(Some("vi"), true, true)).as_str(), eq("vi"));
        assert_that!(fallback_code(&EngineSettings::default()).as_str(), eq("en"));
    }
}

//! Host device locale.

use crate::types::LanguageCode;

/// Reports the host's current locale.
pub trait DeviceLocale: Send + Sync + std::fmt::Debug {
    /// Current locale, `None` when the host reports none usable.
    fn current(&self) -> Option<LanguageCode>;
}

/// Locale reported by the operating system through [`sys_locale`].
///
/// On Unix this honours `LC_ALL`, `LC_MESSAGES` and `LANG` in that order;
/// other platforms use their native locale APIs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLocale;

impl DeviceLocale for SystemLocale {
    fn current(&self) -> Option<LanguageCode> {
        sys_locale::get_locale().and_then(|raw| normalize_locale(&raw))
    }
}

/// A locale fixed by the host, e.g. read from a platform API.
#[derive(Debug, Default, Clone)]
pub struct FixedLocale(pub Option<LanguageCode>);

impl FixedLocale {
    /// Always reports `code`.
    #[must_use]
    pub fn new(code: impl Into<LanguageCode>) -> Self {
        Self(Some(code.into()))
    }
}

impl DeviceLocale for FixedLocale {
    fn current(&self) -> Option<LanguageCode> {
        self.0.clone()
    }
}

/// `en_US.UTF-8@euro` and `en-US` -> `en_US`; `C` and `POSIX` carry no language.
fn normalize_locale(raw: &str) -> Option<LanguageCode> {
    let raw = raw.trim();
    let raw = raw.split('@').next().unwrap_or(raw);
    let raw = raw.split('.').next().unwrap_or(raw).trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("c") || raw.eq_ignore_ascii_case("posix") {
        return None;
    }
    Some(LanguageCode::from(raw.replace('-', "_")))
}

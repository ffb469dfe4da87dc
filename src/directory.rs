//! Static directory of language subtags with display metadata.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{
    Deserialize,
    Serialize,
};

use crate::types::LanguageCode;

/// Writing direction of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

/// Reference metadata for a language subtag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    /// Language subtag.
    pub code: &'static str,
    /// English name.
    pub name: &'static str,
    /// Name in the language itself.
    pub native_name: &'static str,
    /// Writing direction.
    pub direction: TextDirection,
}

/// Left-to-right table entry.
const fn ltr(code: &'static str, name: &'static str, native_name: &'static str) -> LanguageInfo {
    LanguageInfo { code, name, native_name, direction: TextDirection::Ltr }
}

/// Right-to-left table entry.
const fn rtl(code: &'static str, name: &'static str, native_name: &'static str) -> LanguageInfo {
    LanguageInfo { code, name, native_name, direction: TextDirection::Rtl }
}

/// ISO 639 language subtags. Two-letter codes that collide with common path
/// words (`to`, `as`, `or`, `my`, `so`) are left out so path detection stays
/// unambiguous.
const LANGUAGES: &[LanguageInfo] = &[
    ltr("af", "Afrikaans", "Afrikaans"),
    rtl("ar", "Arabic", "العربية"),
    ltr("az", "Azerbaijani", "Azərbaycan dili"),
    ltr("be", "Belarusian", "Беларуская"),
    ltr("bg", "Bulgarian", "Български"),
    ltr("bn", "Bengali", "বাংলা"),
    ltr("bs", "Bosnian", "Bosanski"),
    ltr("ca", "Catalan", "Català"),
    ltr("cs", "Czech", "Čeština"),
    ltr("cy", "Welsh", "Cymraeg"),
    ltr("da", "Danish", "Dansk"),
    ltr("de", "German", "Deutsch"),
    rtl("dv", "Divehi", "ދިވެހި"),
    ltr("el", "Greek", "Ελληνικά"),
    ltr("en", "English", "English"),
    ltr("eo", "Esperanto", "Esperanto"),
    ltr("es", "Spanish", "Español"),
    ltr("et", "Estonian", "Eesti"),
    ltr("eu", "Basque", "Euskara"),
    rtl("fa", "Persian", "فارسی"),
    ltr("fi", "Finnish", "Suomi"),
    ltr("fil", "Filipino", "Filipino"),
    ltr("fo", "Faroese", "Føroyskt"),
    ltr("fr", "French", "Français"),
    ltr("ga", "Irish", "Gaeilge"),
    ltr("gl", "Galician", "Galego"),
    ltr("gu", "Gujarati", "ગુજરાતી"),
    rtl("he", "Hebrew", "עברית"),
    ltr("hi", "Hindi", "हिन्दी"),
    ltr("hr", "Croatian", "Hrvatski"),
    ltr("hu", "Hungarian", "Magyar"),
    ltr("hy", "Armenian", "Հայերեն"),
    ltr("id", "Indonesian", "Bahasa Indonesia"),
    ltr("is", "Icelandic", "Íslenska"),
    ltr("it", "Italian", "Italiano"),
    ltr("ja", "Japanese", "日本語"),
    ltr("ka", "Georgian", "ქართული"),
    ltr("kk", "Kazakh", "Қазақ тілі"),
    ltr("km", "Khmer", "ភាសាខ្មែរ"),
    ltr("kn", "Kannada", "ಕನ್ನಡ"),
    ltr("ko", "Korean", "한국어"),
    ltr("kok", "Konkani", "कोंकणी"),
    ltr("ky", "Kyrgyz", "Кыргызча"),
    ltr("lo", "Lao", "ລາວ"),
    ltr("lt", "Lithuanian", "Lietuvių"),
    ltr("lv", "Latvian", "Latviešu"),
    ltr("mi", "Maori", "Māori"),
    ltr("mk", "Macedonian", "Македонски"),
    ltr("ml", "Malayalam", "മലയാളം"),
    ltr("mn", "Mongolian", "Монгол"),
    ltr("mr", "Marathi", "मराठी"),
    ltr("ms", "Malay", "Bahasa Melayu"),
    ltr("mt", "Maltese", "Malti"),
    ltr("nb", "Norwegian Bokmål", "Norsk bokmål"),
    ltr("ne", "Nepali", "नेपाली"),
    ltr("nl", "Dutch", "Nederlands"),
    ltr("nn", "Norwegian Nynorsk", "Norsk nynorsk"),
    ltr("pa", "Punjabi", "ਪੰਜਾਬੀ"),
    ltr("pl", "Polish", "Polski"),
    rtl("ps", "Pashto", "پښتو"),
    ltr("pt", "Portuguese", "Português"),
    ltr("qu", "Quechua", "Runa Simi"),
    ltr("ro", "Romanian", "Română"),
    ltr("ru", "Russian", "Русский"),
    ltr("sa", "Sanskrit", "संस्कृतम्"),
    ltr("se", "Northern Sami", "Davvisámegiella"),
    ltr("si", "Sinhala", "සිංහල"),
    ltr("sk", "Slovak", "Slovenčina"),
    ltr("sl", "Slovenian", "Slovenščina"),
    ltr("sq", "Albanian", "Shqip"),
    ltr("sr", "Serbian", "Српски"),
    ltr("sv", "Swedish", "Svenska"),
    ltr("sw", "Swahili", "Kiswahili"),
    rtl("syr", "Syriac", "ܣܘܪܝܝܐ"),
    ltr("ta", "Tamil", "தமிழ்"),
    ltr("te", "Telugu", "తెలుగు"),
    ltr("th", "Thai", "ไทย"),
    ltr("tl", "Tagalog", "Tagalog"),
    ltr("tn", "Tswana", "Setswana"),
    ltr("tr", "Turkish", "Türkçe"),
    ltr("ts", "Tsonga", "Xitsonga"),
    ltr("tt", "Tatar", "Татарча"),
    ltr("uk", "Ukrainian", "Українська"),
    rtl("ur", "Urdu", "اردو"),
    ltr("uz", "Uzbek", "Oʻzbekcha"),
    ltr("vi", "Vietnamese", "Tiếng Việt"),
    ltr("xh", "Xhosa", "isiXhosa"),
    rtl("yi", "Yiddish", "ייִדיש"),
    ltr("zh", "Chinese", "中文"),
    ltr("zu", "Zulu", "isiZulu"),
];

/// [`LANGUAGES`] indexed by subtag.
static BY_SUBTAG: LazyLock<HashMap<&'static str, &'static LanguageInfo>> =
    LazyLock::new(|| LANGUAGES.iter().map(|info| (info.code, info)).collect());

/// Looks up metadata for a code, falling back to its language subtag.
#[must_use]
pub fn language_info(code: &LanguageCode) -> Option<&'static LanguageInfo> {
    BY_SUBTAG.get(code.language().to_ascii_lowercase().as_str()).copied()
}

/// Writing direction for a code; unknown codes are left-to-right.
#[must_use]
pub fn text_direction(code: &LanguageCode) -> TextDirection {
    language_info(code).map_or(TextDirection::Ltr, |info| info.direction)
}

/// All directory entries, in subtag order.
#[must_use]
pub const fn all_languages() -> &'static [LanguageInfo] {
    LANGUAGES
}

/// True when `candidate` is a well-formed tag whose language subtag is in the
/// directory, e.g. `en`, `en-US`, `en_us`, `zh-Hant-TW`, `es-419`.
///
/// Anything after the language subtag must be a script (4 letters) or a region
/// (2 letters or 3 digits); `en-trans` is rejected.
#[must_use]
pub fn is_language_tag(candidate: &str) -> bool {
    let mut parts = candidate.split(['-', '_']);
    let Some(language) = parts.next() else {
        return false;
    };
    if !BY_SUBTAG.contains_key(language.to_ascii_lowercase().as_str()) {
        return false;
    }
    parts.all(|part| {
        let alpha = part.chars().all(|c| c.is_ascii_alphabetic());
        let digits = part.chars().all(|c| c.is_ascii_digit());
        (alpha && (part.len() == 2 || part.len() == 4)) || (digits && part.len() == 3)
    })
}

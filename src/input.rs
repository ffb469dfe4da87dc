//! External inputs: translation data sources, the preference store and the
//! device locale.
//!
//! Static sources share one on-disk/over-the-wire layout:
//!
//! ```text
//! <root>/codes.json        ["en", "vi", ...]
//! <root>/data/<code>.json  { "<key>": <translation value>, ... }
//! ```

pub mod device;
pub mod network;
pub mod preferences;
pub mod source;
pub mod translation;

/// Manifest file listing the codes of a static layout.
pub const MANIFEST_FILE: &str = "codes.json";
/// Directory holding one data file per code.
pub const DATA_DIR: &str = "data";

/// Path of a code's data file, relative to the layout root.
#[must_use]
pub fn data_file_path(code: &crate::types::LanguageCode) -> String {
    format!("{DATA_DIR}/{code}.json")
}

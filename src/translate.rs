//! `str` extension for looking up translations.
//!
//! ```no_run
//! use i18n_runtime::translate::Tr;
//! use i18n_runtime::types::params;
//!
//! let greeting = "Hello".tr();
//! let balance = "You have @{number} dollars".tr_p(&params([("number", 100)]));
//! ```

use crate::context;
use crate::engine::Engine;
use crate::types::{
    LanguageCode,
    Params,
};

/// Translation lookup on a key.
///
/// Without an explicit engine, the engine currently rendering on this thread is
/// used, or the global engine outside any render pass.
pub trait Tr {
    /// Active language, no parameters.
    fn tr(&self) -> String;

    /// Active language with parameters.
    fn tr_p(&self, params: &Params) -> String;

    /// Explicit language, no parameters.
    fn tr_t(&self, code: &LanguageCode) -> String;

    /// Full form; `None` picks the active language or the ambient engine.
    fn tr_f(&self, params: &Params, code: Option<&LanguageCode>, engine: Option<&Engine>)
    -> String;
}

impl Tr for str {
    fn tr(&self) -> String {
        self.tr_f(&Params::new(), None, None)
    }

    fn tr_p(&self, params: &Params) -> String {
        self.tr_f(params, None, None)
    }

    fn tr_t(&self, code: &LanguageCode) -> String {
        self.tr_f(&Params::new(), Some(code), None)
    }

    fn tr_f(
        &self,
        params: &Params,
        code: Option<&LanguageCode>,
        engine: Option<&Engine>,
    ) -> String {
        match engine {
            Some(engine) => engine.translate(self, params, code),
            None => context::current().translate(self, params, code),
        }
    }
}

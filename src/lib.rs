//! i18n-runtime
//!
//! Runtime localization engine: layered translation sources, conditional
//! interpolation and coalesced change notification for render trees.

pub mod analysis;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod directory;
pub mod engine;
pub mod error;
pub mod export;
pub mod input;
pub mod interpolate;
pub mod merge;
pub mod notify;
pub mod render;
pub mod resolver;
pub mod translate;
pub mod types;
pub mod value;

mod test_utils;

pub use engine::{
    Engine,
    EngineSetup,
    Subscriber,
};
pub use error::EngineError;
pub use translate::Tr;
pub use types::{
    LanguageCode,
    Params,
    params,
};
pub use value::{
    ConditionSet,
    TranslationMap,
    TranslationTable,
    TranslationValue,
};

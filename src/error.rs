//! Engine-level errors.
//!
//! Translation lookups never fail; these cover the few fatal cases.

use thiserror::Error;

/// Fatal engine errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The active language was read before `initialize` completed.
    #[error("Engine '{instance}' is not initialized")]
    NotInitialized {
        /// Name of the engine.
        instance: String,
    },

    /// Serialized translation data could not be decoded.
    #[error("Failed to decode translation data: {0}")]
    Decode(#[from] serde_json::Error),
}

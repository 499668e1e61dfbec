//! Error types for the engine binary.

use riftline_store::StoreError;

/// Errors that can abort the boot sequence.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {message}")]
    Config {
        /// What went wrong.
        message: String,
    },

    /// The store layer failed during boot (migration failures land
    /// here; they must abort startup).
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}

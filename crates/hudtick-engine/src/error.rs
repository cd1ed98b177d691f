//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: hudtick_core::config::ConfigError,
    },

    /// The effect feed could not be built.
    #[error("effects error: {source}")]
    Effects {
        /// The underlying effects error.
        #[from]
        source: hudtick_effects::EffectsError,
    },

    /// The shared scheduler failed.
    #[error("scheduler error: {source}")]
    Shared {
        /// The underlying shared-scheduler error.
        #[from]
        source: hudtick_core::shared::SharedError,
    },

    /// The pulse loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: hudtick_core::runner::RunnerError,
    },
}

//! Error types for the `hudtick-effects` crate.

/// Errors that can occur while building the effect feed.
#[derive(Debug, thiserror::Error)]
pub enum EffectsError {
    /// A built-in pattern failed to compile.
    #[error("invalid {name} pattern: {source}")]
    Pattern {
        /// Which pattern failed.
        name: &'static str,
        /// The underlying regex error.
        source: regex::Error,
    },
}

/// Compile a built-in pattern, tagging failures with its name.
pub(crate) fn compile(name: &'static str, pattern: &str) -> Result<regex::Regex, EffectsError> {
    regex::Regex::new(pattern).map_err(|source| EffectsError::Pattern { name, source })
}

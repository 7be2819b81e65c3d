//! Error types for starfield setup.
//!
//! Only initialisation can fail. Generation, per-frame updates, and
//! rendering are infallible, and a full trail pool is a normal state
//! reported as `None` rather than an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrreryError {
    /// The drawing surface could not be found; no animation is started.
    #[error("drawing surface `{selector}` not found")]
    MissingSurface { selector: String },

    /// A JSON configuration override could not be parsed.
    #[error("invalid starfield config: {0}")]
    Config(#[from] serde_json::Error),
}

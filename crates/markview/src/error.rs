//! CLI error types.

use markview_config::ConfigError;
use markview_renderer::ResourceError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Resource(#[from] ResourceError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },
}

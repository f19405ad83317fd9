//! Error types shared by the library modules.

use thiserror::Error;

/// Everything that can go wrong between the user and the provider.
#[derive(Error, Debug)]
pub enum SwipeError {
    /// The provider rejected the bearer token (HTTP 401). Always means the
    /// stored token is unusable and the user has to authenticate again.
    #[error("Authorization expired or invalid. Please run songswipe auth")]
    Unauthorized,

    /// The provider answered with a non-success status other than 401.
    #[error("Spotify API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport level failure, or a body that could not be decoded.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Input rejected before any request was issued.
    #[error("{0}")]
    Validation(String),

    /// The playlist was created but the tracks could not be added to it.
    #[error("Playlist '{name}' was created but adding tracks failed: {source}")]
    PartialCommit {
        playlist_id: String,
        name: String,
        #[source]
        source: Box<SwipeError>,
    },

    /// A decision was requested while no track is on screen.
    #[error("No track is being presented")]
    NotPresenting,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SwipeError {
    /// True when the error means the token has to be dropped.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            SwipeError::Unauthorized => true,
            SwipeError::PartialCommit { source, .. } => source.is_unauthorized(),
            _ => false,
        }
    }

    /// True when the provider refused the token or the account outright.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SwipeError::Unauthorized | SwipeError::Api { status: 403, .. }
        )
    }

    /// True for failures where the provider never gave a verdict.
    pub fn is_transport(&self) -> bool {
        matches!(self, SwipeError::Request(e) if e.status().is_none() && !e.is_decode())
    }
}

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, SwipeError>;

//! Error types for backend access.

use thiserror::Error;

/// Errors returned by [`crate::ApiClient`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The request never got an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// Missing, expired or rejected token (HTTP 401).
    #[error("authentication required")]
    Unauthorized,

    /// The resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code returned by the backend.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response body is not the expected JSON.
    #[error("invalid response: {0}")]
    Decode(String),

    /// Local file access (photo upload/download, token file).
    #[error("I/O error: {0}")]
    Io(String),

    /// The client could not be built from its configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Generic message suitable for a banner shown to the user.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Network(_) => "Impossible de joindre le serveur. Vérifiez votre connexion.",
            Self::Unauthorized => {
                "Session expirée ou absente. Reconnectez-vous avec `volontaires login`."
            }
            Self::NotFound(_) => "Élément introuvable.",
            Self::Http { status, .. } if *status >= 500 => {
                "Erreur du serveur. Réessayez plus tard."
            }
            Self::Http { .. } => "La requête a été refusée par le serveur.",
            Self::Decode(_) => "Réponse inattendue du serveur.",
            Self::Io(_) => "Erreur d'accès au fichier.",
            Self::Config(_) => "Configuration invalide.",
        }
    }

    /// True when the user has to log in again.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, ApiError>;

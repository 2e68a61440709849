use core_library::LibraryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    /// The request never produced a response (DNS, connect, TLS, timeout)
    #[error("{provider} request failed: {message}")]
    Network {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    HttpStatus {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Missing credentials, or the provider rejected them (401/403)
    #[error("{provider} authorization failed: {message}")]
    Unauthorized {
        provider: &'static str,
        message: String,
    },

    #[error("Failed to parse {provider} response: {message}")]
    JsonParse {
        provider: &'static str,
        message: String,
    },

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),
}

impl MetadataError {
    /// Whether the failure came from talking to a remote catalog rather than
    /// from local storage.
    pub fn is_external_service_error(&self) -> bool {
        !matches!(self, MetadataError::Library(_))
    }

    pub fn provider(&self) -> Option<&'static str> {
        match self {
            MetadataError::Network { provider, .. }
            | MetadataError::HttpStatus { provider, .. }
            | MetadataError::Unauthorized { provider, .. }
            | MetadataError::JsonParse { provider, .. } => Some(provider),
            MetadataError::Library(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MetadataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_classification() {
        let err = MetadataError::HttpStatus {
            provider: "Discogs",
            status: 502,
            body: String::new(),
        };
        assert!(err.is_external_service_error());
        assert_eq!(err.provider(), Some("Discogs"));

        let err = MetadataError::from(LibraryError::Unauthenticated);
        assert!(!err.is_external_service_error());
        assert_eq!(err.provider(), None);
    }

    #[test]
    fn test_display_includes_status() {
        let err = MetadataError::HttpStatus {
            provider: "Napster",
            status: 404,
            body: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "Napster returned HTTP 404: not found");
    }
}

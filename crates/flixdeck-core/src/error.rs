//! Unified error type for flixdeck.
//!
//! A single catalog request can be awaited by many callers at once, so
//! [`Error`] is `Clone`: wrapped sources live behind an `Arc` and every waiter
//! receives the same failure.

use std::fmt;
use std::sync::Arc;

/// Why a request was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbortReason {
    /// The request's own timeout elapsed.
    Timeout,
    /// A caller-supplied signal was fired.
    Caller,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Timeout => f.write_str("timeout"),
            AbortReason::Caller => f.write_str("signal"),
        }
    }
}

/// Coarse classification of an [`Error`], for callers deciding whether to
/// retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Http,
    Aborted,
    Transport,
    Parse,
    Decode,
    Internal,
}

/// Unified error type covering all failure modes in flixdeck.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// No API key in the request parameters, the URL, or the configuration.
    #[error("TMDB API key missing. Set TMDB_API_KEY in your environment.")]
    MissingApiKey,

    /// The request target could not be turned into a URL.
    #[error("Invalid request URL {url}: {message}")]
    InvalidUrl {
        /// The string that failed to parse.
        url: String,
        /// Parser error description.
        message: String,
    },

    /// The catalog API answered with a non-success status.
    #[error("TMDB fetch error {status} {reason}{}", body_suffix(.body))]
    Http {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for `status`, if known.
        reason: String,
        /// Response body text; empty when it could not be read.
        body: String,
    },

    /// The request was cancelled before a response arrived.
    #[error("Request aborted ({reason})")]
    Aborted {
        /// Which source fired.
        reason: AbortReason,
    },

    /// Connection, TLS, or body-read failure.
    #[error("Transport error: {source}")]
    Transport {
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The response body was not valid JSON.
    #[error("Malformed JSON body: {source}")]
    Parse { source: Arc<serde_json::Error> },

    /// The JSON body did not match the shape the caller asked for.
    #[error("Unexpected response shape: {source}")]
    Decode { source: Arc<serde_json::Error> },

    /// Configuration could not be read or is inconsistent.
    #[error("Config error: {0}")]
    Config(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

impl Error {
    /// Convenience constructor for [`Error::Transport`].
    pub fn transport(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Transport {
            source: Arc::from(source.into()),
        }
    }

    /// Convenience constructor for [`Error::Parse`].
    pub fn parse(source: serde_json::Error) -> Self {
        Error::Parse {
            source: Arc::new(source),
        }
    }

    /// Convenience constructor for [`Error::Decode`].
    pub fn decode(source: serde_json::Error) -> Self {
        Error::Decode {
            source: Arc::new(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingApiKey | Error::InvalidUrl { .. } | Error::Config(_) => ErrorKind::Config,
            Error::Http { .. } => ErrorKind::Http,
            Error::Aborted { .. } => ErrorKind::Aborted,
            Error::Transport { .. } => ErrorKind::Transport,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// `true` for timeouts and caller cancellations.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Error::Aborted { .. })
    }

    /// `true` only when the request's own timeout fired.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Aborted {
                reason: AbortReason::Timeout
            }
        )
    }

    /// The HTTP status code, for [`Error::Http`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_display() {
        let err = Error::MissingApiKey;
        assert!(err.to_string().contains("TMDB_API_KEY"));
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn http_display_with_body() {
        let err = Error::Http {
            status: 401,
            reason: "Unauthorized".into(),
            body: r#"{"status_code":7}"#.into(),
        };
        assert_eq!(
            err.to_string(),
            r#"TMDB fetch error 401 Unauthorized: {"status_code":7}"#
        );
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.kind(), ErrorKind::Http);
        assert!(!err.is_aborted());
    }

    #[test]
    fn http_display_without_body() {
        let err = Error::Http {
            status: 502,
            reason: "Bad Gateway".into(),
            body: String::new(),
        };
        assert_eq!(err.to_string(), "TMDB fetch error 502 Bad Gateway");
    }

    #[test]
    fn aborted_markers() {
        let timeout = Error::Aborted {
            reason: AbortReason::Timeout,
        };
        assert!(timeout.is_aborted());
        assert!(timeout.is_timeout());
        assert_eq!(timeout.to_string(), "Request aborted (timeout)");

        let caller = Error::Aborted {
            reason: AbortReason::Caller,
        };
        assert!(caller.is_aborted());
        assert!(!caller.is_timeout());
        assert_eq!(caller.status(), None);
    }

    #[test]
    fn transport_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::transport(io);
        assert!(err.to_string().contains("refused"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn parse_and_decode_kinds() {
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(Error::parse(bad).kind(), ErrorKind::Parse);

        let shape = serde_json::from_str::<u32>(r#""x""#).unwrap_err();
        assert_eq!(Error::decode(shape).kind(), ErrorKind::Decode);
    }

    #[test]
    fn clones_share_source() {
        let err = Error::transport("connection reset");
        let copy = err.clone();
        match (&err, &copy) {
            (Error::Transport { source: a }, Error::Transport { source: b }) => {
                assert!(Arc::ptr_eq(a, b));
            }
            _ => panic!("expected transport errors"),
        }
    }
}

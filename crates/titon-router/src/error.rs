//! Errors raised while registering, matching and building routes
//!
//! None of these are transient. Every variant describes either an
//! unroutable request or a configuration mistake, and is surfaced to the
//! immediate caller without retries.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// A `<name>` token was used without a registered or inline pattern
    #[error("route `{path}` references pattern `<{token}>` which has not been defined")]
    MissingPattern { path: String, token: String },

    /// A custom pattern (or the compiled route) is not a valid regular expression
    #[error("route `{path}` compiled to an invalid expression: {reason}")]
    InvalidPattern { path: String, reason: String },

    /// No registered route matched the URL
    #[error("no route found for `{url}`")]
    NoMatch { url: String },

    /// A route references a filter that was never declared
    #[error("filter `{0}` does not exist")]
    MissingFilter(String),

    /// Lookup of a route key that was never registered
    #[error("route `{0}` does not exist")]
    MissingRoute(String),

    /// Lookup of an unknown URL segment
    #[error("URL segment `{0}` does not exist")]
    MissingSegment(String),

    /// Reverse-build against an unknown route, or without a required token
    #[error("invalid route: {0}")]
    InvalidRoute(String),

    /// Filter registration with an unusable key
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

pub type Result<T, E = RouteError> = std::result::Result<T, E>;

impl RouteError {
    pub(crate) fn missing_pattern(path: &str, token: &str) -> Self {
        RouteError::MissingPattern {
            path: path.to_string(),
            token: token.to_string(),
        }
    }

    pub(crate) fn invalid_pattern(path: &str, reason: impl ToString) -> Self {
        RouteError::InvalidPattern {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

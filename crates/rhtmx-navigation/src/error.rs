// File: src/error.rs
// Purpose: Error types for navigation pages, factories and URL generation

use thiserror::Error;

/// Errors raised by a [`UrlGenerator`](crate::router::UrlGenerator)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("no route named \"{0}\" is registered")]
    UnknownRoute(String),

    #[error("route \"{route}\" requires parameter \"{param}\"")]
    MissingParameter { route: String, param: String },

    #[error("invalid route pattern \"{0}\": patterns must start with '/'")]
    InvalidPattern(String),
}

/// Errors raised by pages, containers and their factories
#[derive(Debug, Error)]
pub enum NavigationError {
    /// Bad constructor or setter input
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required upstream service is missing
    #[error("{0}")]
    Domain(String),

    /// A link was requested from a failed route match
    #[error("attempting to use matched result when routing failed; aborting")]
    RoutingFailure,

    #[error(transparent)]
    Router(#[from] RouterError),
}

pub type Result<T, E = NavigationError> = std::result::Result<T, E>;

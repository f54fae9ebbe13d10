// File: src/route_result.rs
// Purpose: Outcome of matching a request against the named route table

use crate::params::Params;

/// Result of routing the current request
///
/// Produced once per request by the routing middleware and shared with every
/// route-bound page through an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteResult {
    Success { route_name: String, params: Params },
    Failure { allowed_methods: Vec<String> },
}

impl RouteResult {
    pub fn from_route(route_name: impl Into<String>, params: Params) -> Self {
        RouteResult::Success {
            route_name: route_name.into(),
            params,
        }
    }

    /// Failure with no route matched at all
    pub fn from_route_failure() -> Self {
        RouteResult::Failure {
            allowed_methods: Vec::new(),
        }
    }

    /// Failure where the path matched but the method did not
    pub fn from_method_failure<I, S>(allowed_methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RouteResult::Failure {
            allowed_methods: allowed_methods.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RouteResult::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn is_method_failure(&self) -> bool {
        matches!(self, RouteResult::Failure { allowed_methods } if !allowed_methods.is_empty())
    }

    pub fn matched_route_name(&self) -> Option<&str> {
        match self {
            RouteResult::Success { route_name, .. } => Some(route_name),
            RouteResult::Failure { .. } => None,
        }
    }

    /// Matched parameters; empty for failures
    pub fn matched_params(&self) -> &Params {
        static EMPTY: Params = Params::EMPTY;
        match self {
            RouteResult::Success { params, .. } => params,
            RouteResult::Failure { .. } => &EMPTY,
        }
    }

    pub fn allowed_methods(&self) -> &[String] {
        match self {
            RouteResult::Success { .. } => &[],
            RouteResult::Failure { allowed_methods } => allowed_methods,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_accessors() {
        let result = RouteResult::from_route("users.show", Params::from([("id", "7")]));

        assert!(result.is_success());
        assert!(!result.is_failure());
        assert_eq!(result.matched_route_name(), Some("users.show"));
        assert_eq!(result.matched_params().get("id"), Some("7"));
    }

    #[test]
    fn test_failure_accessors() {
        let result = RouteResult::from_route_failure();

        assert!(result.is_failure());
        assert!(!result.is_method_failure());
        assert_eq!(result.matched_route_name(), None);
        assert!(result.matched_params().is_empty());
    }

    #[test]
    fn test_method_failure() {
        let result = RouteResult::from_method_failure(["GET", "HEAD"]);

        assert!(result.is_failure());
        assert!(result.is_method_failure());
        assert_eq!(result.allowed_methods(), ["GET".to_string(), "HEAD".to_string()]);
    }
}

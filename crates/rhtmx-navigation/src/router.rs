// File: src/router.rs
// Purpose: Named route table used to match requests and generate page links

//! Pages only need the [`UrlGenerator`] capability. [`NamedRouter`] is the
//! bundled implementation: it also matches request paths into
//! [`RouteResult`]s for the routing middleware.
//!
//! Pattern syntax:
//! - Static segments: `/about`
//! - Required parameters: `/users/:id`
//! - Optional parameters: `/posts/:page?`
//! - Catch-all (one or more segments, last only): `/docs/*slug`
//!
//! Matched parameter values are percent-decoded; generated URLs encode them
//! again, so a matched route always regenerates the request path.
//!
//! ```
//! use rhtmx_navigation::{NamedRouter, Params, UrlGenerator};
//!
//! let router = NamedRouter::new()
//!     .with_route("user.show", "/users/:id")
//!     .unwrap();
//!
//! let result = router.match_path("/users/42");
//! assert_eq!(result.matched_route_name(), Some("user.show"));
//!
//! let url = router.generate_uri("user.show", &Params::from([("id", "42")])).unwrap();
//! assert_eq!(url, "/users/42");
//! ```

use crate::error::RouterError;
use crate::params::Params;
use crate::route_result::RouteResult;

/// Turns a route name plus parameters into a URL
pub trait UrlGenerator: Send + Sync {
    fn generate_uri(&self, route_name: &str, params: &Params) -> Result<String, RouterError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    Optional(String),
    CatchAll(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match raw.chars().next() {
            Some(':') if raw.ends_with('?') => Segment::Optional(raw[1..raw.len() - 1].to_string()),
            Some(':') => Segment::Param(raw[1..].to_string()),
            Some('*') => Segment::CatchAll(raw[1..].to_string()),
            _ => Segment::Static(raw.to_string()),
        }
    }
}

/// A single named route
#[derive(Debug, Clone)]
pub struct NamedRoute {
    name: String,
    pattern: String,
    segments: Vec<Segment>,
    /// Empty means any method
    methods: Vec<String>,
    priority: usize,
}

impl NamedRoute {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Result<Self, RouterError> {
        let pattern = pattern.into();
        if !pattern.starts_with('/') {
            return Err(RouterError::InvalidPattern(pattern));
        }

        let segments: Vec<Segment> = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect();

        let catch_all_at = segments.iter().position(|s| matches!(s, Segment::CatchAll(_)));
        if catch_all_at.is_some_and(|at| at + 1 != segments.len()) {
            return Err(RouterError::InvalidPattern(pattern));
        }

        let dynamic_count = segments
            .iter()
            .filter(|s| !matches!(s, Segment::Static(_)))
            .count();
        let priority = if catch_all_at.is_some() {
            1000 + segments.len()
        } else {
            dynamic_count
        };

        Ok(Self {
            name: name.into(),
            pattern,
            segments,
            methods: Vec::new(),
            priority,
        })
    }

    /// Restrict this route to the given HTTP methods
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods
            .into_iter()
            .map(|m| m.into().to_ascii_uppercase())
            .collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    fn allows(&self, method: &str) -> bool {
        self.methods.is_empty() || self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }

    /// Match a request path, returning decoded parameters in pattern order
    ///
    /// Paths whose segments do not decode to UTF-8 never match.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let path_segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode_segment)
            .collect::<Option<Vec<String>>>()?;
        match_segments(&self.segments, &path_segments, Params::new())
    }

    /// Build a URL by substituting parameters into the pattern
    ///
    /// Parameters the pattern does not name are ignored.
    pub fn generate(&self, params: &Params) -> Result<String, RouterError> {
        let missing = |param: &str| RouterError::MissingParameter {
            route: self.name.clone(),
            param: param.to_string(),
        };

        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Static(s) => parts.push(s.clone()),
                Segment::Param(name) => {
                    let value = params.get(name).ok_or_else(|| missing(name))?;
                    parts.push(urlencoding::encode(value).into_owned());
                }
                Segment::Optional(name) => {
                    if let Some(value) = params.get(name).filter(|v| !v.is_empty()) {
                        parts.push(urlencoding::encode(value).into_owned());
                    }
                }
                Segment::CatchAll(name) => {
                    let value = params.get(name).ok_or_else(|| missing(name))?;
                    let encoded: Vec<_> = value
                        .split('/')
                        .filter(|s| !s.is_empty())
                        .map(urlencoding::encode)
                        .collect();
                    parts.push(encoded.join("/"));
                }
            }
        }

        Ok(format!("/{}", parts.join("/")))
    }
}

fn decode_segment(raw: &str) -> Option<String> {
    urlencoding::decode(raw).ok().map(|s| s.into_owned())
}

fn match_segments(pattern: &[Segment], path: &[String], mut params: Params) -> Option<Params> {
    let Some((segment, rest)) = pattern.split_first() else {
        return path.is_empty().then_some(params);
    };

    match segment {
        Segment::CatchAll(name) => {
            if path.is_empty() {
                return None;
            }
            params.insert(name.as_str(), path.join("/"));
            Some(params)
        }
        Segment::Optional(name) => {
            if let Some((first, remaining)) = path.split_first() {
                let mut consumed = params.clone();
                consumed.insert(name.as_str(), first.as_str());
                if let Some(found) = match_segments(rest, remaining, consumed) {
                    return Some(found);
                }
            }
            match_segments(rest, path, params)
        }
        Segment::Param(name) => {
            let (first, remaining) = path.split_first()?;
            params.insert(name.as_str(), first.as_str());
            match_segments(rest, remaining, params)
        }
        Segment::Static(expected) => {
            let (first, remaining) = path.split_first()?;
            if first != expected {
                return None;
            }
            match_segments(rest, remaining, params)
        }
    }
}

/// Ordered table of named routes
#[derive(Debug, Clone, Default)]
pub struct NamedRouter {
    routes: Vec<NamedRoute>,
}

impl NamedRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route matching any method
    pub fn add_route(
        &mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Result<(), RouterError> {
        self.add(NamedRoute::new(name, pattern)?);
        Ok(())
    }

    /// Register a prepared route; routes are kept sorted by priority
    pub fn add(&mut self, route: NamedRoute) {
        self.routes.retain(|r| r.name != route.name);
        self.routes.push(route);
        self.routes.sort_by_key(|r| r.priority);
    }

    /// Builder form of [`add_route`](Self::add_route)
    pub fn with_route(
        mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Result<Self, RouterError> {
        self.add_route(name, pattern)?;
        Ok(self)
    }

    pub fn routes(&self) -> &[NamedRoute] {
        &self.routes
    }

    pub fn get_route_by_name(&self, name: &str) -> Option<&NamedRoute> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Match a path regardless of method
    pub fn match_path(&self, path: &str) -> RouteResult {
        self.routes
            .iter()
            .find_map(|route| route.matches(path).map(|params| (route, params)))
            .map(|(route, params)| RouteResult::from_route(route.name.clone(), params))
            .unwrap_or_else(RouteResult::from_route_failure)
    }

    /// Match a path and method
    ///
    /// When the path matches only routes that exclude `method`, the failure
    /// carries the methods those routes accept.
    pub fn match_request(&self, method: &str, path: &str) -> RouteResult {
        let mut allowed: Vec<String> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.matches(path) else {
                continue;
            };
            if route.allows(method) {
                return RouteResult::from_route(route.name.clone(), params);
            }
            for m in &route.methods {
                if !allowed.contains(m) {
                    allowed.push(m.clone());
                }
            }
        }

        if allowed.is_empty() {
            RouteResult::from_route_failure()
        } else {
            RouteResult::from_method_failure(allowed)
        }
    }
}

impl UrlGenerator for NamedRouter {
    fn generate_uri(&self, route_name: &str, params: &Params) -> Result<String, RouterError> {
        self.get_route_by_name(route_name)
            .ok_or_else(|| RouterError::UnknownRoute(route_name.to_string()))?
            .generate(params)
    }
}

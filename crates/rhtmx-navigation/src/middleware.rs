// File: src/middleware.rs
// Purpose: Per-request route result injection into navigation containers

//! Two middleware functions cooperate:
//!
//! 1. [`route_result_middleware`] matches the request against a
//!    [`NamedRouter`] and stores an `Arc<RouteResult>` in the request
//!    extensions.
//! 2. [`navigation_middleware`] clones the configured navigation templates,
//!    hands every route-bound page that result, and stores the per-request
//!    copies as a [`RequestNavigation`] extension.
//!
//! Templates are never written by a request, so concurrent requests cannot
//! observe each other's route results. [`NavigationMiddleware::attach`]
//! layers both in the right order.

use axum::extract::{Request, State};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::Response;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::config::AppConfig;
use crate::container::{inject_route_result, Navigation};
use crate::error::{NavigationError, Result};
use crate::route_result::RouteResult;
use crate::router::NamedRouter;
use crate::service::{ServiceRegistry, NAVIGATION_SERVICE, SERVICE_PREFIX};

/// Navigation containers prepared for the current request
#[derive(Clone)]
pub struct RequestNavigation {
    containers: Arc<Mutex<Vec<Navigation>>>,
    route_result: Arc<RouteResult>,
}

impl RequestNavigation {
    pub fn new(containers: Vec<Navigation>, route_result: Arc<RouteResult>) -> Self {
        Self {
            containers: Arc::new(Mutex::new(containers)),
            route_result,
        }
    }

    /// Containers in the order the middleware was configured with
    pub async fn lock(&self) -> MutexGuard<'_, Vec<Navigation>> {
        self.containers.lock().await
    }

    pub fn route_result(&self) -> &Arc<RouteResult> {
        &self.route_result
    }
}

/// Injects the request's route result into navigation containers
#[derive(Clone, Default)]
pub struct NavigationMiddleware {
    templates: Arc<Vec<Arc<Navigation>>>,
}

impl NavigationMiddleware {
    pub fn new(templates: Vec<Arc<Navigation>>) -> Self {
        Self {
            templates: Arc::new(templates),
        }
    }

    pub fn containers(&self) -> &[Arc<Navigation>] {
        &self.templates
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Fresh copies of every template, each page bound to `result`
    ///
    /// All containers are fully injected before this returns.
    pub fn prepare(&self, result: &Arc<RouteResult>) -> Vec<Navigation> {
        let mut bound = 0;
        let containers: Vec<Navigation> = self
            .templates
            .iter()
            .map(|template| {
                let mut navigation = Navigation::clone(template);
                bound += inject_route_result(&mut navigation, result);
                navigation
            })
            .collect();

        tracing::debug!(
            containers = containers.len(),
            pages = bound,
            route = ?result.matched_route_name(),
            "injected route result into navigation"
        );

        containers
    }

    /// Layer routing and navigation injection onto `app`
    ///
    /// The routing layer is added last so it runs first.
    pub fn attach<S>(self, app: axum::Router<S>, router: Arc<NamedRouter>) -> axum::Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        app.layer(from_fn_with_state(self, navigation_middleware))
            .layer(from_fn_with_state(router, route_result_middleware))
    }
}

/// Match the request and attach the outcome as an `Arc<RouteResult>` extension
pub async fn route_result_middleware(
    State(router): State<Arc<NamedRouter>>,
    mut request: Request,
    next: Next,
) -> Response {
    let result = router.match_request(request.method().as_str(), request.uri().path());
    request.extensions_mut().insert(Arc::new(result));

    next.run(request).await
}

/// Bind the request's route result to every configured navigation container
///
/// Requests without a route result pass through untouched.
pub async fn navigation_middleware(
    State(middleware): State<NavigationMiddleware>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(result) = request.extensions().get::<Arc<RouteResult>>().cloned() else {
        tracing::trace!("no route result on request, skipping navigation injection");
        return next.run(request).await;
    };

    let containers = middleware.prepare(&result);
    request
        .extensions_mut()
        .insert(RequestNavigation::new(containers, result));

    next.run(request).await
}

/// Builds a [`NavigationMiddleware`] from the service registry
///
/// Which containers are injected depends on the configured sections:
/// none yields a no-op middleware, exactly one uses the `Navigation`
/// service, several use `Navigation::<Section>` each.
#[derive(Debug, Default)]
pub struct NavigationMiddlewareFactory {
    names: OnceCell<Vec<String>>,
}

impl NavigationMiddlewareFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service names to inject, resolved once per factory
    pub fn container_names(&self, config: Option<&AppConfig>) -> &[String] {
        self.names.get_or_init(|| resolve_container_names(config))
    }

    pub fn create(&self, registry: &mut ServiceRegistry) -> Result<NavigationMiddleware> {
        let names = self.container_names(registry.config());

        let mut templates = Vec::with_capacity(names.len());
        for name in names {
            if !registry.has(name) {
                return Err(NavigationError::Domain(format!(
                    "navigation middleware requires a \"{}\" service at instantiation; none found",
                    name
                )));
            }
            templates.push(registry.navigation(name)?);
        }

        tracing::debug!(containers = ?names, "created navigation middleware");
        Ok(NavigationMiddleware::new(templates))
    }
}

/// Map navigation config sections onto container service names
pub fn resolve_container_names(config: Option<&AppConfig>) -> Vec<String> {
    let Some(sections) = config.and_then(AppConfig::sections) else {
        return Vec::new();
    };

    if sections.len() == 1 {
        return vec![NAVIGATION_SERVICE.to_string()];
    }

    sections
        .keys()
        .map(|key| format!("{}{}", SERVICE_PREFIX, capitalize(key)))
        .collect()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use crate::router::UrlGenerator;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn config(toml: &str) -> AppConfig {
        AppConfig::from_toml_str(toml).unwrap()
    }

    #[test]
    fn test_names_without_config() {
        assert!(resolve_container_names(None).is_empty());
        assert!(resolve_container_names(Some(&AppConfig::default())).is_empty());
    }

    #[rstest]
    #[case("[[navigation.default]]\nroute = \"home\"")]
    #[case("[[navigation.main]]\nroute = \"home\"")]
    fn test_names_single_section_uses_canonical_name(#[case] toml: &str) {
        assert_eq!(resolve_container_names(Some(&config(toml))), vec!["Navigation"]);
    }

    #[test]
    fn test_names_multiple_sections() {
        let config = config(
            "[[navigation.default]]\nroute = \"home\"\n[[navigation.special]]\nroute = \"home\"",
        );
        assert_eq!(
            resolve_container_names(Some(&config)),
            vec!["Navigation::Default", "Navigation::Special"]
        );
    }

    #[test]
    fn test_names_follow_config_order() {
        let config = config(
            "[[navigation.special]]\nroute = \"home\"\n[[navigation.default]]\nroute = \"home\"",
        );
        assert_eq!(
            resolve_container_names(Some(&config)),
            vec!["Navigation::Special", "Navigation::Default"]
        );
    }

    #[test]
    fn test_names_are_memoized() {
        let factory = NavigationMiddlewareFactory::new();
        let first = config("[[navigation.default]]\nuri = \"/\"");

        assert_eq!(factory.container_names(Some(&first)), ["Navigation".to_string()]);
        assert_eq!(factory.container_names(None), ["Navigation".to_string()]);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("special"), "Special");
        assert_eq!(capitalize("émoji"), "Émoji");
        assert_eq!(capitalize(""), "");
    }

    fn router() -> Arc<NamedRouter> {
        Arc::new(NamedRouter::new().with_route("home", "/").unwrap())
    }

    #[test]
    fn test_factory_with_multiple_navigations() {
        let mut registry = ServiceRegistry::new()
            .with_config(config(
                "[[navigation.default]]\nroute = \"home\"\n[[navigation.special]]\nroute = \"home\"",
            ))
            .with_router(router());

        let middleware = NavigationMiddlewareFactory::new().create(&mut registry).unwrap();
        assert_eq!(middleware.containers().len(), 2);
    }

    #[test]
    fn test_factory_with_one_navigation() {
        let mut registry = ServiceRegistry::new()
            .with_config(config("[[navigation.default]]\nroute = \"home\""))
            .with_router(router());

        let middleware = NavigationMiddlewareFactory::new().create(&mut registry).unwrap();
        assert_eq!(middleware.containers().len(), 1);
    }

    #[test]
    fn test_factory_without_config_returns_noop_middleware() {
        let mut registry = ServiceRegistry::new();
        let middleware = NavigationMiddlewareFactory::new().create(&mut registry).unwrap();
        assert!(middleware.is_empty());
    }

    #[test]
    fn test_factory_missing_service_is_domain_error() {
        // A lone non-default section maps to "Navigation", which has no section
        let mut registry = ServiceRegistry::new()
            .with_config(config("[[navigation.main]]\nroute = \"home\""))
            .with_router(router());

        assert!(matches!(
            NavigationMiddlewareFactory::new().create(&mut registry),
            Err(NavigationError::Domain(_))
        ));
    }

    #[test]
    fn test_prepare_leaves_templates_untouched() {
        let template = Arc::new(
            Navigation::new().with_page(
                Page::for_route("home")
                    .unwrap()
                    .with_page(Page::for_current_route().with_router(router() as Arc<dyn UrlGenerator>)),
            ),
        );
        let middleware = NavigationMiddleware::new(vec![Arc::clone(&template)]);
        let result = Arc::new(RouteResult::from_route("home", Default::default()));

        let prepared = middleware.prepare(&result);

        assert_eq!(prepared.len(), 1);
        assert!(prepared[0]
            .iter()
            .all(|page| Arc::ptr_eq(page.route_result().unwrap(), &result)));
        assert!(template.iter().all(|page| page.route_result().is_none()));
    }
}

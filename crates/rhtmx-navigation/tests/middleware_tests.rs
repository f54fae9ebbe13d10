// File: tests/middleware_tests.rs
// Purpose: End-to-end tests for navigation injection through an Axum app

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::get,
    Extension, Router,
};
use pretty_assertions::assert_eq;
use rhtmx_navigation::{
    navigation_middleware, AppConfig, NamedRouter, Navigation, NavigationError,
    NavigationMiddleware, NavigationMiddlewareFactory, Page, Params, RequestNavigation,
    RouteResult, ServiceRegistry,
};
use std::sync::Arc;
use tower::ServiceExt;

const CONFIG: &str = r#"
[[navigation.default]]
label = "Home"
route = "home"

[[navigation.default.pages]]
label = "Alice"
route = "user.show"
params = { id = 1 }

[[navigation.default.pages]]
label = "Bob"
route = "user.show"
params = { id = 2 }
fragment = "profile"

[[navigation.special]]
label = "About"
route = "about"

[[navigation.special]]
label = "Blog"
uri = "https://blog.example.com"
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn router() -> Arc<NamedRouter> {
    Arc::new(
        NamedRouter::new()
            .with_route("home", "/")
            .and_then(|r| r.with_route("user.show", "/users/:id"))
            .and_then(|r| r.with_route("about", "/about"))
            .unwrap(),
    )
}

fn registry(config: &str) -> ServiceRegistry {
    ServiceRegistry::new()
        .with_config(AppConfig::from_toml_str(config).unwrap())
        .with_router(router())
}

/// One line per page: `label active href`
async fn describe(navigation: Option<Extension<RequestNavigation>>) -> String {
    let Some(Extension(navigation)) = navigation else {
        return "none".to_string();
    };

    let mut lines = Vec::new();
    for container in navigation.lock().await.iter_mut() {
        container.visit_mut(|page| {
            let label = page.label().unwrap_or("-").to_string();
            let active = page.is_active(false);
            let href = page.href().unwrap_or_else(|e| format!("error: {}", e));
            lines.push(format!("{} {} {}", label, active, href));
        });
    }
    lines.join("\n")
}

fn app(middleware: NavigationMiddleware) -> Router {
    let routes = Router::new()
        .route("/", get(describe))
        .route("/users/:id", get(describe))
        .route("/about", get(describe))
        .fallback(describe);

    middleware.attach(routes, router())
}

async fn get_body(app: Router, uri: &str) -> String {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_matched_route_activates_page() {
    init_tracing();
    let middleware = NavigationMiddlewareFactory::new()
        .create(&mut registry(CONFIG))
        .unwrap();

    let body = get_body(app(middleware), "/users/2").await;

    assert_eq!(
        body,
        [
            "Home false /",
            "Alice false /users/1",
            "Bob true /users/2#profile",
            "About false /about",
            "Blog false https://blog.example.com",
        ]
        .join("\n")
    );
}

#[tokio::test]
async fn test_unmatched_request_leaves_pages_inactive() {
    init_tracing();
    let middleware = NavigationMiddlewareFactory::new()
        .create(&mut registry(CONFIG))
        .unwrap();

    let body = get_body(app(middleware), "/missing").await;

    assert!(body.lines().all(|line| line.contains(" false ")));
}

#[tokio::test]
async fn test_single_section_is_injected() {
    init_tracing();
    let config = "[[navigation.default]]\nlabel = \"Home\"\nroute = \"home\"";
    let middleware = NavigationMiddlewareFactory::new()
        .create(&mut registry(config))
        .unwrap();

    assert_eq!(middleware.containers().len(), 1);
    assert_eq!(get_body(app(middleware), "/").await, "Home true /");
}

#[tokio::test]
async fn test_no_navigation_config_is_noop() {
    init_tracing();
    let middleware = NavigationMiddlewareFactory::new()
        .create(&mut ServiceRegistry::new())
        .unwrap();
    assert!(middleware.is_empty());

    assert_eq!(get_body(app(middleware), "/").await, "");
}

#[tokio::test]
async fn test_request_without_route_result_passes_through() {
    init_tracing();
    let middleware = NavigationMiddleware::new(vec![Arc::new(
        Navigation::new().with_page(Page::for_route("home").unwrap()),
    )]);

    // Navigation layer only; nothing puts a route result on the request
    let app = Router::new()
        .route("/", get(describe))
        .layer(axum::middleware::from_fn_with_state(middleware, navigation_middleware));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"none");
}

#[tokio::test]
async fn test_route_result_from_outer_layer_is_used() {
    init_tracing();
    let middleware = NavigationMiddlewareFactory::new()
        .create(&mut registry(CONFIG))
        .unwrap();

    let result = Arc::new(RouteResult::from_route("about", Default::default()));
    let app = Router::new()
        .route("/anything", get(describe))
        .layer(axum::middleware::from_fn_with_state(middleware, navigation_middleware))
        .layer(Extension(Arc::clone(&result)));

    let body = get_body(app, "/anything").await;
    assert!(body.contains("About true /about"));
}

#[tokio::test]
async fn test_templates_are_not_mutated_by_requests() {
    init_tracing();
    let middleware = NavigationMiddlewareFactory::new()
        .create(&mut registry(CONFIG))
        .unwrap();
    let templates = middleware.clone();

    get_body(app(middleware), "/users/1").await;

    for container in templates.containers() {
        assert!(container.iter().all(|page| page.route_result().is_none()));
    }
}

#[tokio::test]
async fn test_concurrent_requests_see_their_own_route() {
    init_tracing();
    let middleware = NavigationMiddlewareFactory::new()
        .create(&mut registry(CONFIG))
        .unwrap();

    let (alice, bob) = tokio::join!(
        get_body(app(middleware.clone()), "/users/1"),
        get_body(app(middleware.clone()), "/users/2"),
    );

    assert!(alice.contains("Alice true /users/1"));
    assert!(alice.contains("Bob false"));
    assert!(bob.contains("Bob true /users/2#profile"));
    assert!(bob.contains("Alice false"));
}

#[tokio::test]
async fn test_config_loaded_from_file() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("navigation.toml");
    std::fs::write(&path, CONFIG).unwrap();

    let mut registry = ServiceRegistry::new()
        .with_config(AppConfig::load(&path).unwrap())
        .with_router(router());
    let middleware = NavigationMiddlewareFactory::new().create(&mut registry).unwrap();

    assert_eq!(middleware.containers().len(), 2);
    assert!(get_body(app(middleware), "/about")
        .await
        .contains("About true /about"));
}

#[test]
fn test_missing_container_service_is_domain_error() {
    init_tracing();
    let mut registry = registry("[[navigation.main]]\nroute = \"home\"");

    let result = NavigationMiddlewareFactory::new().create(&mut registry);
    assert!(matches!(result, Err(NavigationError::Domain(_))));
}

#[tokio::test]
async fn test_percent_encoded_path_activates_page() {
    init_tracing();
    let navigation = Navigation::new()
        .with_page(
            Page::for_route("user.show")
                .unwrap()
                .with_label("Spaced")
                .with_params(Params::from([("id", "a b")]))
                .with_router(router()),
        )
        .with_page(Page::for_current_route().with_label("Current").with_router(router()));

    let middleware = NavigationMiddleware::new(vec![Arc::new(navigation)]);
    let body = get_body(app(middleware), "/users/a%20b").await;

    assert_eq!(
        body,
        ["Spaced true /users/a%20b", "Current false /users/a%20b"].join("\n")
    );
}

#[test]
fn test_containers_follow_config_file_order() {
    init_tracing();
    let config = r#"
[[navigation.special]]
label = "About"
route = "about"

[[navigation.default]]
label = "Home"
route = "home"
"#;
    let middleware = NavigationMiddlewareFactory::new()
        .create(&mut registry(config))
        .unwrap();

    let labels: Vec<_> = middleware
        .containers()
        .iter()
        .map(|container| container.pages()[0].label())
        .collect();
    assert_eq!(labels, vec![Some("About"), Some("Home")]);
}

// File: rhtmx-navigation/src/lib.rs
// Purpose: Main entry point for rhtmx-navigation library

//! # rhtmx-navigation
//!
//! Route-aware navigation containers for Axum applications.
//!
//! Pages bound to a named route build their links through a router and
//! decide whether they are active from the request's route result. The
//! middleware hands every request its own copy of the configured containers
//! with that result already injected.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rhtmx_navigation::{
//!     AppConfig, NamedRouter, NavigationMiddlewareFactory, RequestNavigation, ServiceRegistry,
//! };
//!
//! // 1. Describe the menu in navigation.toml
//! //
//! //   [[navigation.default]]
//! //   label = "Home"
//! //   route = "home"
//!
//! // 2. Build the middleware from config and a router
//! let router = Arc::new(NamedRouter::new().with_route("home", "/")?);
//! let mut registry = ServiceRegistry::new()
//!     .with_config(AppConfig::load_default()?)
//!     .with_router(router.clone());
//! let navigation = NavigationMiddlewareFactory::new().create(&mut registry)?;
//!
//! // 3. Attach it to your Axum app
//! let app = navigation.attach(Router::new().route("/", get(index)), router);
//!
//! // 4. Read the prepared containers in a handler
//! async fn index(Extension(nav): Extension<RequestNavigation>) -> String {
//!     let mut containers = nav.lock().await;
//!     containers[0].pages_mut()[0].href().unwrap_or_default()
//! }
//! ```

pub mod config;
pub mod container;
pub mod error;
pub mod middleware;
pub mod page;
pub mod params;
pub mod route_result;
pub mod router;
pub mod service;

pub use config::{AppConfig, PageConfig, Sections, CONFIG_KEY};
pub use container::{inject_route_result, Navigation, PreOrder};
pub use error::{NavigationError, Result, RouterError};
pub use middleware::{
    navigation_middleware, resolve_container_names, route_result_middleware,
    NavigationMiddleware, NavigationMiddlewareFactory, RequestNavigation,
};
pub use page::{Activation, Page, PageKind, RouteBindable, RouteBinding};
pub use params::Params;
pub use route_result::RouteResult;
pub use router::{NamedRoute, NamedRouter, UrlGenerator};
pub use service::{
    page_from_config, pages_from_config, DefaultNavigationFactory, NavigationFactory,
    ServiceRegistry, DEFAULT_SECTION, NAVIGATION_ALIAS, NAVIGATION_SERVICE, SERVICE_PREFIX,
};

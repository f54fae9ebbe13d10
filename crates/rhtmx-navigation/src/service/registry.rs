// File: src/service/registry.rs
// Purpose: Application-scoped registry of config, router and navigation services

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::container::Navigation;
use crate::error::{NavigationError, Result};
use crate::router::UrlGenerator;

use super::factory::{DefaultNavigationFactory, NavigationFactory, NAVIGATION_SERVICE};

/// Lowercase alias accepted for the default navigation service
pub const NAVIGATION_ALIAS: &str = "navigation";

/// Holds the services navigation factories depend on
///
/// Navigation containers are looked up by service name: explicitly
/// registered ones first. `Navigation` is then built by
/// [`DefaultNavigationFactory`] from the `default` section, and every
/// `Navigation::<Name>` by [`NavigationFactory`].
pub struct ServiceRegistry {
    config: Option<AppConfig>,
    router: Option<Arc<dyn UrlGenerator>>,
    navigations: HashMap<String, Arc<Navigation>>,
    aliases: HashMap<String, String>,
    factory: NavigationFactory,
    default_factory: DefaultNavigationFactory,
    default_navigation: Option<Arc<Navigation>>,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceRegistry {
    pub fn new() -> Self {
        let mut aliases = HashMap::new();
        aliases.insert(NAVIGATION_ALIAS.to_string(), NAVIGATION_SERVICE.to_string());

        Self {
            config: None,
            router: None,
            navigations: HashMap::new(),
            aliases,
            factory: NavigationFactory::new(),
            default_factory: DefaultNavigationFactory::new(),
            default_navigation: None,
        }
    }

    /// Set the application config; previously built containers are discarded
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self.factory = NavigationFactory::new();
        self.default_factory = DefaultNavigationFactory::new();
        self.default_navigation = None;
        self
    }

    pub fn with_router(mut self, router: Arc<dyn UrlGenerator>) -> Self {
        self.router = Some(router);
        self
    }

    /// Register a ready-made container under `name`
    pub fn with_navigation(mut self, name: impl Into<String>, navigation: Navigation) -> Self {
        self.navigations.insert(name.into(), Arc::new(navigation));
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), target.into());
        self
    }

    pub fn config(&self) -> Option<&AppConfig> {
        self.config.as_ref()
    }

    pub fn router(&self) -> Option<&Arc<dyn UrlGenerator>> {
        self.router.as_ref()
    }

    fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    /// Can a navigation service named `name` be provided?
    pub fn has(&self, name: &str) -> bool {
        let name = self.resolve(name);
        if self.navigations.contains_key(name) {
            return true;
        }

        if name == NAVIGATION_SERVICE {
            self.default_factory.can_create(self.config.as_ref())
        } else {
            self.factory.can_create(self.config.as_ref(), name)
        }
    }

    /// Fetch or build the navigation service named `name`
    pub fn navigation(&mut self, name: &str) -> Result<Arc<Navigation>> {
        let name = self.resolve(name).to_string();

        if let Some(navigation) = self.navigations.get(&name) {
            tracing::trace!(service = %name, "using registered navigation");
            return Ok(Arc::clone(navigation));
        }

        if name == NAVIGATION_SERVICE {
            return self.default_navigation();
        }

        if !self.factory.can_create(self.config.as_ref(), &name) {
            return Err(NavigationError::Domain(format!(
                "no navigation service named \"{}\" is registered",
                name
            )));
        }

        self.factory
            .create(self.config.as_ref(), self.router.as_ref(), &name)
    }

    fn default_navigation(&mut self) -> Result<Arc<Navigation>> {
        if let Some(navigation) = &self.default_navigation {
            return Ok(Arc::clone(navigation));
        }

        let navigation = Arc::new(
            self.default_factory
                .create(self.config.as_ref(), self.router.as_ref())?,
        );
        tracing::debug!(pages = navigation.len(), "built default navigation");

        self.default_navigation = Some(Arc::clone(&navigation));
        Ok(navigation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use crate::router::NamedRouter;

    fn registry() -> ServiceRegistry {
        let config = AppConfig::from_toml_str(
            r#"
            [[navigation.default]]
            route = "home"

            [[navigation.special]]
            uri = "/special"
            "#,
        )
        .unwrap();

        ServiceRegistry::new()
            .with_config(config)
            .with_router(Arc::new(NamedRouter::new().with_route("home", "/").unwrap()))
    }

    #[test]
    fn test_has_named_and_aliased_services() {
        let registry = registry();

        assert!(registry.has("Navigation"));
        assert!(registry.has("navigation"));
        assert!(registry.has("Navigation::Special"));
        assert!(!registry.has("Navigation::Missing"));
        assert!(!registry.has("Foobar"));
    }

    #[test]
    fn test_navigation_is_built_once() {
        let mut registry = registry();

        let first = registry.navigation("navigation").unwrap();
        let second = registry.navigation("Navigation").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.find_by_route("home").map(Page::is_route_bound), Some(true));
    }

    #[test]
    fn test_default_service_uses_default_section_factory() {
        let mut registry = registry();

        let default = registry.navigation("Navigation").unwrap();
        assert_eq!(registry.default_factory.pages().map(|pages| pages.len()), Some(1));

        // The named service is a separate container built from the same section
        let named = registry.navigation("Navigation::Default").unwrap();
        assert!(!Arc::ptr_eq(&default, &named));
        assert_eq!(default.count_all(), named.count_all());
    }

    #[test]
    fn test_default_service_without_default_section() {
        let config = AppConfig::from_toml_str("[[navigation.main]]\nuri = \"/\"").unwrap();
        let mut registry = ServiceRegistry::new().with_config(config);

        assert!(!registry.has("Navigation"));
        assert!(matches!(
            registry.navigation("Navigation"),
            Err(NavigationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_registered_navigation_wins() {
        let mut registry = registry().with_navigation(
            "Navigation::Special",
            Navigation::new().with_page(Page::for_uri("/custom")),
        );

        let navigation = registry.navigation("Navigation::Special").unwrap();
        assert_eq!(navigation.pages()[0].uri(), Some("/custom"));
    }

    #[test]
    fn test_unknown_service_is_domain_error() {
        let mut registry = registry();
        assert!(matches!(
            registry.navigation("Foobar"),
            Err(NavigationError::Domain(_))
        ));
    }

    #[test]
    fn test_missing_router_is_domain_error() {
        let config = AppConfig::from_toml_str("[[navigation.default]]\nroute = \"home\"").unwrap();
        let mut registry = ServiceRegistry::new().with_config(config);

        assert!(matches!(
            registry.navigation("Navigation"),
            Err(NavigationError::Domain(_))
        ));
    }
}

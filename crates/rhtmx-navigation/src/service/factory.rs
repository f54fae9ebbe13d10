// File: src/service/factory.rs
// Purpose: Build navigation containers from configuration sections

use once_cell::sync::OnceCell;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{AppConfig, PageConfig, Sections};
use crate::container::Navigation;
use crate::error::{NavigationError, Result};
use crate::page::Page;
use crate::router::UrlGenerator;

/// Service name of the single (default) navigation container
pub const NAVIGATION_SERVICE: &str = "Navigation";

/// Prefix of named navigation services, e.g. `Navigation::Special`
pub const SERVICE_PREFIX: &str = "Navigation::";

/// Section used by [`DefaultNavigationFactory`]
pub const DEFAULT_SECTION: &str = "default";

/// Convert page configuration into pages
///
/// Pages with a `route` become route-bound and receive `router`; every other
/// page links to its `uri`. Children are converted recursively.
pub fn pages_from_config(
    configs: &[PageConfig],
    router: Option<&Arc<dyn UrlGenerator>>,
) -> Result<Vec<Page>> {
    configs
        .iter()
        .map(|config| page_from_config(config, router))
        .collect()
}

pub fn page_from_config(config: &PageConfig, router: Option<&Arc<dyn UrlGenerator>>) -> Result<Page> {
    let mut page = match (&config.route, &config.uri) {
        (Some(route), _) => {
            let router = router.ok_or_else(|| {
                NavigationError::Domain(format!(
                    "navigation page for route \"{}\" requires a router; none registered",
                    route
                ))
            })?;
            Page::for_route(route)?
                .with_router(Arc::clone(router))
                .with_params(config.params.clone())
                .with_query(config.query.clone())
        }
        (None, Some(uri)) => Page::for_uri(uri),
        (None, None) => Page::new(),
    };

    if let Some(label) = &config.label {
        page = page.with_label(label);
    }
    if let Some(id) = &config.id {
        page = page.with_id(id);
    }
    if let Some(title) = &config.title {
        page = page.with_title(title);
    }
    if let Some(fragment) = &config.fragment {
        page = page.with_fragment(fragment);
    }
    if let Some(active) = config.active {
        page.set_active(active);
    }
    page.set_visible(config.visible);

    for child in pages_from_config(&config.pages, router)? {
        page.add_page(child);
    }

    Ok(page)
}

/// Builds `Navigation::<Name>` containers on demand from `[navigation.<name>]`
///
/// `"Navigation"` is an alias for `"Navigation::Default"`. Section lookup
/// tries the exact suffix first, then its lowercase form. Built containers
/// are memoized by name.
#[derive(Default)]
pub struct NavigationFactory {
    sections: OnceCell<Sections>,
    containers: HashMap<String, Arc<Navigation>>,
}

impl NavigationFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize_name(requested: &str) -> Cow<'_, str> {
        if requested == NAVIGATION_SERVICE {
            Cow::Owned(format!("{}Default", SERVICE_PREFIX))
        } else {
            Cow::Borrowed(requested)
        }
    }

    fn sections(&self, config: Option<&AppConfig>) -> &Sections {
        self.sections
            .get_or_init(|| config.map(|c| c.navigation.clone()).unwrap_or_default())
    }

    fn named_section<'a>(sections: &'a Sections, name: &str) -> Option<&'a Vec<PageConfig>> {
        let without_prefix = name.strip_prefix(SERVICE_PREFIX)?;
        sections
            .get(without_prefix)
            .or_else(|| sections.get(&without_prefix.to_lowercase()))
    }

    /// Can this factory provide the requested service?
    pub fn can_create(&self, config: Option<&AppConfig>, requested: &str) -> bool {
        let name = Self::normalize_name(requested);

        if !name.starts_with(SERVICE_PREFIX) {
            return false;
        }

        if self.containers.contains_key(name.as_ref()) {
            return true;
        }

        Self::named_section(self.sections(config), &name).is_some()
    }

    /// Build (or return the memoized) container for `requested`
    ///
    /// A missing section yields an empty container.
    pub fn create(
        &mut self,
        config: Option<&AppConfig>,
        router: Option<&Arc<dyn UrlGenerator>>,
        requested: &str,
    ) -> Result<Arc<Navigation>> {
        let name = Self::normalize_name(requested).into_owned();

        if let Some(existing) = self.containers.get(&name) {
            return Ok(Arc::clone(existing));
        }

        let pages = match Self::named_section(self.sections(config), &name) {
            Some(configs) => pages_from_config(configs, router)?,
            None => Vec::new(),
        };

        tracing::debug!(service = %name, pages = pages.len(), "built navigation container");

        let navigation = Arc::new(Navigation::from_pages(pages));
        self.containers.insert(name, Arc::clone(&navigation));
        Ok(navigation)
    }
}

/// Strict builder for the `default` navigation section
///
/// Unlike [`NavigationFactory`], a missing section is an error. The page
/// configuration is read once and reused by later calls.
#[derive(Debug, Default)]
pub struct DefaultNavigationFactory {
    pages: Option<Vec<PageConfig>>,
}

impl DefaultNavigationFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &'static str {
        DEFAULT_SECTION
    }

    /// Page configuration, once loaded
    pub fn pages(&self) -> Option<&[PageConfig]> {
        self.pages.as_deref()
    }

    /// Is there a `default` section to build from?
    pub fn can_create(&self, config: Option<&AppConfig>) -> bool {
        self.pages.is_some()
            || config
                .and_then(AppConfig::sections)
                .is_some_and(|sections| sections.get(DEFAULT_SECTION).is_some())
    }

    fn load_pages(config: Option<&AppConfig>) -> Result<Vec<PageConfig>> {
        let sections = config.and_then(AppConfig::sections).ok_or_else(|| {
            NavigationError::InvalidArgument("could not find navigation configuration key".to_string())
        })?;

        sections.get(DEFAULT_SECTION).cloned().ok_or_else(|| {
            NavigationError::InvalidArgument(format!(
                "failed to find a navigation container by the name \"{}\"",
                DEFAULT_SECTION
            ))
        })
    }

    pub fn create(
        &mut self,
        config: Option<&AppConfig>,
        router: Option<&Arc<dyn UrlGenerator>>,
    ) -> Result<Navigation> {
        if self.pages.is_none() {
            self.pages = Some(Self::load_pages(config)?);
        }

        let configs = self.pages.as_deref().unwrap_or_default();
        Ok(Navigation::from_pages(pages_from_config(configs, router)?))
    }
}

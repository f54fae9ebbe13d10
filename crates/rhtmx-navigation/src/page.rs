// File: src/page.rs
// Purpose: Navigation pages with route-aware activation and cached hrefs

use std::fmt;
use std::sync::Arc;

use crate::error::{NavigationError, Result};
use crate::params::Params;
use crate::route_result::RouteResult;
use crate::router::UrlGenerator;

static NO_PARAMS: Params = Params::EMPTY;

/// Activation state of a page
///
/// `Active` is a latch: once a page is found active it stays active until
/// [`Page::set_active`] is called again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    #[default]
    Unknown,
    Active,
    Inactive,
}

/// Capability of pages that can receive the current request's route result
pub trait RouteBindable {
    fn route_result(&self) -> Option<&Arc<RouteResult>>;

    /// Replace the route result; any previous one is dropped
    fn set_route_result(&mut self, result: Arc<RouteResult>);
}

/// Routing data of a route-bound page
#[derive(Clone, Default)]
pub struct RouteBinding {
    /// `None` means "link to whatever route matched the request"
    route_name: Option<String>,
    params: Params,
    query: Params,
    route_result: Option<Arc<RouteResult>>,
    router: Option<Arc<dyn UrlGenerator>>,
    href_cache: Option<String>,
}

impl fmt::Debug for RouteBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteBinding")
            .field("route_name", &self.route_name)
            .field("params", &self.params)
            .field("query", &self.query)
            .field("route_result", &self.route_result)
            .field("has_router", &self.router.is_some())
            .field("href_cache", &self.href_cache)
            .finish()
    }
}

impl RouteBinding {
    /// Does the assigned route result select this page?
    fn matches_route_result(&self) -> bool {
        let (Some(route_name), Some(result)) = (&self.route_name, &self.route_result) else {
            return false;
        };

        result.matched_route_name() == Some(route_name.as_str())
            && self.params.intersection_count(result.matched_params()) == self.params.len()
    }

    fn href(&mut self, fragment: Option<&str>) -> Result<String> {
        if let Some(cached) = &self.href_cache {
            return Ok(cached.clone());
        }

        let mut href = match &self.route_name {
            Some(route_name) => self.router()?.generate_uri(route_name, &self.params)?,
            None => {
                let result = self.route_result.as_ref().ok_or_else(|| {
                    NavigationError::InvalidArgument(
                        "a page without a route needs a route result to build its href".to_string(),
                    )
                })?;
                let route_name = result
                    .matched_route_name()
                    .ok_or(NavigationError::RoutingFailure)?;
                let params = result.matched_params().merged_with(&self.params);
                self.router()?.generate_uri(route_name, &params)?
            }
        };

        if !self.query.is_empty() {
            href.push('?');
            href.push_str(&self.query.to_query_string());
        }

        if let Some(fragment) = fragment {
            href.push('#');
            href.push_str(fragment);
        }

        self.href_cache = Some(href.clone());
        Ok(href)
    }

    fn router(&self) -> Result<&Arc<dyn UrlGenerator>> {
        self.router.as_ref().ok_or_else(|| {
            NavigationError::InvalidArgument("a router is required to build a route href".to_string())
        })
    }
}

impl RouteBindable for RouteBinding {
    fn route_result(&self) -> Option<&Arc<RouteResult>> {
        self.route_result.as_ref()
    }

    fn set_route_result(&mut self, result: Arc<RouteResult>) {
        self.route_result = Some(result);
        self.href_cache = None;
    }
}

/// What a page links to
#[derive(Debug, Clone)]
pub enum PageKind {
    /// A fixed URI
    Uri(Option<String>),
    /// A named route resolved through the router
    Route(RouteBinding),
}

/// A node in a navigation tree
#[derive(Debug, Clone)]
pub struct Page {
    label: Option<String>,
    id: Option<String>,
    title: Option<String>,
    fragment: Option<String>,
    visible: bool,
    activation: Activation,
    kind: PageKind,
    pages: Vec<Page>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    fn with_kind(kind: PageKind) -> Self {
        Self {
            label: None,
            id: None,
            title: None,
            fragment: None,
            visible: true,
            activation: Activation::Unknown,
            kind,
            pages: Vec::new(),
        }
    }

    /// A page without any link target
    pub fn new() -> Self {
        Self::with_kind(PageKind::Uri(None))
    }

    /// A page linking to a fixed URI
    pub fn for_uri(uri: impl Into<String>) -> Self {
        Self::with_kind(PageKind::Uri(Some(uri.into())))
    }

    /// A page linking to a named route
    pub fn for_route(route_name: &str) -> Result<Self> {
        let mut page = Self::for_current_route();
        page.set_route(Some(route_name))?;
        Ok(page)
    }

    /// A route-bound page without a route name; it links to the matched route
    pub fn for_current_route() -> Self {
        Self::with_kind(PageKind::Route(RouteBinding::default()))
    }

    // ========================================================================
    // Builders
    // ========================================================================

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.set_fragment(Some(fragment.into()));
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.set_params(Some(params));
        self
    }

    pub fn with_query(mut self, query: Params) -> Self {
        self.set_query(Some(query));
        self
    }

    pub fn with_router(mut self, router: Arc<dyn UrlGenerator>) -> Self {
        self.set_router(router);
        self
    }

    pub fn with_route_result(mut self, result: Arc<RouteResult>) -> Self {
        self.set_route_result(result);
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.set_active(active);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.pages.push(page);
        self
    }

    // ========================================================================
    // Activation & href
    // ========================================================================

    /// Is this page active for the current request?
    ///
    /// A route-bound page with a route name and a route result is active when
    /// the matched route name equals its own and every one of its params
    /// appears, with the same value, among the matched params. Otherwise the
    /// explicit activation state decides, and with `recursive` an active
    /// descendant makes this page active too.
    pub fn is_active(&mut self, recursive: bool) -> bool {
        if self.activation != Activation::Active {
            if let PageKind::Route(binding) = &self.kind {
                if binding.matches_route_result() {
                    self.activation = Activation::Active;
                    return true;
                }
            }
        }

        self.base_is_active(recursive)
    }

    fn base_is_active(&mut self, recursive: bool) -> bool {
        if self.activation == Activation::Active {
            return true;
        }

        recursive && self.pages.iter_mut().any(|page| page.is_active(true))
    }

    /// The page's link: path, query string and fragment
    ///
    /// Route-bound pages memoize the result until one of their inputs changes.
    pub fn href(&mut self) -> Result<String> {
        let fragment = self.fragment.as_deref();

        match &mut self.kind {
            PageKind::Uri(uri) => {
                let mut href = uri.clone().unwrap_or_default();
                if let Some(fragment) = fragment {
                    href.push('#');
                    href.push_str(fragment);
                }
                Ok(href)
            }
            PageKind::Route(binding) => binding.href(fragment),
        }
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn set_active(&mut self, active: bool) {
        self.activation = if active {
            Activation::Active
        } else {
            Activation::Inactive
        };
    }

    // ========================================================================
    // Route binding
    // ========================================================================

    /// Route-bound view of this page, if it links to a route
    pub fn route_bindable(&self) -> Option<&dyn RouteBindable> {
        match &self.kind {
            PageKind::Route(binding) => Some(binding),
            PageKind::Uri(_) => None,
        }
    }

    pub fn route_bindable_mut(&mut self) -> Option<&mut dyn RouteBindable> {
        match &mut self.kind {
            PageKind::Route(binding) => Some(binding),
            PageKind::Uri(_) => None,
        }
    }

    pub fn is_route_bound(&self) -> bool {
        matches!(self.kind, PageKind::Route(_))
    }

    /// Change the route binding and drop the cached href
    ///
    /// A URI page becomes route-bound first.
    fn update_binding(&mut self, update: impl FnOnce(&mut RouteBinding)) {
        match self.kind {
            PageKind::Route(ref mut binding) => {
                update(binding);
                binding.href_cache = None;
            }
            PageKind::Uri(_) => {
                let mut binding = RouteBinding::default();
                update(&mut binding);
                self.kind = PageKind::Route(binding);
            }
        }
    }

    fn binding(&self) -> Option<&RouteBinding> {
        match &self.kind {
            PageKind::Route(binding) => Some(binding),
            PageKind::Uri(_) => None,
        }
    }

    /// Set or clear the route name
    ///
    /// `None` means "the currently matched route"; an empty name is rejected.
    pub fn set_route(&mut self, route_name: Option<&str>) -> Result<()> {
        if route_name == Some("") {
            return Err(NavigationError::InvalidArgument(
                "route must be a non-empty string or None".to_string(),
            ));
        }

        self.update_binding(|binding| binding.route_name = route_name.map(str::to_string));
        Ok(())
    }

    pub fn route(&self) -> Option<&str> {
        self.binding()?.route_name.as_deref()
    }

    pub fn set_params(&mut self, params: Option<Params>) {
        self.update_binding(|binding| binding.params = params.unwrap_or_default());
    }

    pub fn params(&self) -> &Params {
        self.binding().map_or(&NO_PARAMS, |b| &b.params)
    }

    pub fn set_query(&mut self, query: Option<Params>) {
        self.update_binding(|binding| binding.query = query.unwrap_or_default());
    }

    pub fn query(&self) -> &Params {
        self.binding().map_or(&NO_PARAMS, |b| &b.query)
    }

    pub fn set_router(&mut self, router: Arc<dyn UrlGenerator>) {
        self.update_binding(|binding| binding.router = Some(router));
    }

    pub fn router(&self) -> Option<&Arc<dyn UrlGenerator>> {
        self.binding()?.router.as_ref()
    }

    pub fn set_route_result(&mut self, result: Arc<RouteResult>) {
        self.update_binding(|binding| binding.set_route_result(result));
    }

    pub fn route_result(&self) -> Option<&Arc<RouteResult>> {
        self.binding()?.route_result()
    }

    // ========================================================================
    // Plain properties
    // ========================================================================

    pub fn uri(&self) -> Option<&str> {
        match &self.kind {
            PageKind::Uri(uri) => uri.as_deref(),
            PageKind::Route(_) => None,
        }
    }

    pub fn kind(&self) -> &PageKind {
        &self.kind
    }

    pub fn set_fragment(&mut self, fragment: Option<String>) {
        self.fragment = fragment;
        if let PageKind::Route(binding) = &mut self.kind {
            binding.href_cache = None;
        }
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    // ========================================================================
    // Children
    // ========================================================================

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    pub fn has_pages(&self) -> bool {
        !self.pages.is_empty()
    }
}

// File: src/service/mod.rs
// Purpose: Factories and registry that turn configuration into navigation services

pub mod factory;
pub mod registry;

pub use factory::{
    page_from_config, pages_from_config, DefaultNavigationFactory, NavigationFactory,
    DEFAULT_SECTION, NAVIGATION_SERVICE, SERVICE_PREFIX,
};
pub use registry::{ServiceRegistry, NAVIGATION_ALIAS};

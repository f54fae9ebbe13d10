// File: src/container.rs
// Purpose: Ordered navigation trees and pre-order traversal

use std::sync::Arc;

use crate::page::Page;
use crate::route_result::RouteResult;

/// An ordered tree of pages
#[derive(Debug, Clone, Default)]
pub struct Navigation {
    pages: Vec<Page>,
}

impl Navigation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.pages.push(page);
        self
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Top-level pages
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    /// Number of top-level pages
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All pages, each parent before its children
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder::new(&self.pages)
    }

    /// Visit every page mutably in pre-order
    pub fn visit_mut<F: FnMut(&mut Page)>(&mut self, mut visit: F) {
        fn walk<F: FnMut(&mut Page)>(pages: &mut [Page], visit: &mut F) {
            for page in pages {
                visit(page);
                walk(page.pages_mut(), visit);
            }
        }

        walk(&mut self.pages, &mut visit);
    }

    /// First page, in pre-order, bound to the given route name
    pub fn find_by_route(&self, route_name: &str) -> Option<&Page> {
        self.iter().find(|page| page.route() == Some(route_name))
    }

    /// First page, in pre-order, with the given label
    pub fn find_by_label(&self, label: &str) -> Option<&Page> {
        self.iter().find(|page| page.label() == Some(label))
    }

    /// Total number of pages at every depth
    pub fn count_all(&self) -> usize {
        self.iter().count()
    }
}

impl<'a> IntoIterator for &'a Navigation {
    type Item = &'a Page;
    type IntoIter = PreOrder<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy pre-order walk over a page tree
///
/// Keeps one slice iterator per open level, so memory is O(depth).
#[derive(Clone)]
pub struct PreOrder<'a> {
    stack: Vec<std::slice::Iter<'a, Page>>,
}

impl<'a> PreOrder<'a> {
    pub fn new(pages: &'a [Page]) -> Self {
        Self {
            stack: vec![pages.iter()],
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Page;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(page) => {
                    if page.has_pages() {
                        self.stack.push(page.pages().iter());
                    }
                    return Some(page);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Give every route-bound page in `navigation` the route result
///
/// Returns the number of pages that received it.
pub fn inject_route_result(navigation: &mut Navigation, result: &Arc<RouteResult>) -> usize {
    let mut bound = 0;
    navigation.visit_mut(|page| {
        if let Some(bindable) = page.route_bindable_mut() {
            bindable.set_route_result(Arc::clone(result));
            bound += 1;
        }
    });
    bound
}

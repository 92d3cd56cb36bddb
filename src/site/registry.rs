//! Registries owning the loaded templates and pages.
//!
//! Both registries are populated once during startup and never written
//! afterwards; request handling only looks entities up, so unsynchronized
//! concurrent reads are safe.

use super::{Page, Template, is_route_path};
use crate::error::StartupError;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Templates keyed by their unique name.
#[derive(Default)]
pub struct TemplateRegistry {
    templates: FxHashMap<String, Arc<Template>>,
}

impl TemplateRegistry {
    pub fn insert(&mut self, template: Template) -> Result<(), StartupError> {
        if self.templates.contains_key(&template.name) {
            return Err(StartupError::DuplicateTemplate(template.name));
        }
        self.templates
            .insert(template.name.clone(), Arc::new(template));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<Template>> {
        self.templates.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Pages keyed by their unique route url.
#[derive(Default)]
pub struct PageRegistry {
    pages: FxHashMap<String, Arc<Page>>,
}

impl PageRegistry {
    /// Register a page. The url must match the route path grammar and be
    /// unused.
    pub fn insert(&mut self, page: Page) -> Result<(), StartupError> {
        if !is_route_path(&page.url) {
            return Err(StartupError::InvalidRoutePath(page.url));
        }
        if self.pages.contains_key(&page.url) {
            return Err(StartupError::DuplicatePage(page.url));
        }
        self.pages.insert(page.url.clone(), Arc::new(page));
        Ok(())
    }

    pub fn get(&self, url: &str) -> Option<Arc<Page>> {
        self.pages.get(url).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Page>> {
        self.pages.values()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_template_names() {
        let mut registry = TemplateRegistry::default();
        registry.insert(Template::new("main")).unwrap();
        assert!(matches!(
            registry.insert(Template::new("main")),
            Err(StartupError::DuplicateTemplate(_))
        ));
    }

    #[test]
    fn rejects_duplicate_page_urls() {
        let mut registry = PageRegistry::default();
        registry.insert(Page::new("/", "main")).unwrap();
        assert!(matches!(
            registry.insert(Page::new("/", "other")),
            Err(StartupError::DuplicatePage(_))
        ));
    }

    #[test]
    fn rejects_pages_with_malformed_urls() {
        let mut registry = PageRegistry::default();
        assert!(matches!(
            registry.insert(Page::new("/about/", "main")),
            Err(StartupError::InvalidRoutePath(_))
        ));
        assert!(matches!(
            registry.insert(Page::new("about", "main")),
            Err(StartupError::InvalidRoutePath(_))
        ));
    }

    #[test]
    fn lookup_is_exact() {
        let mut registry = PageRegistry::default();
        registry.insert(Page::new("/about", "main")).unwrap();
        assert!(registry.get("/about").is_some());
        assert!(registry.get("/about/").is_none());
        assert!(registry.get("/abou").is_none());
    }
}

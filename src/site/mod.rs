//! Site entities: templates (page shells) and pages (route content).
//!
//! Both are immutable after registration. A [`Template`] is the shared
//! shell a [`Page`] is merged into at serve time; the page's `template`
//! field names its shell and is resolved (and checked) during startup
//! validation.

pub mod registry;

use crate::render::Node;
use crate::server::reply::Reply;
use crate::server::request::Request;
use anyhow::Result;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Route path grammar: `/` or one or more non-empty segments, no trailing
/// slash except root.
static ROUTE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(/|(/[^/]+)+)$").expect("route path regex"));

/// Check a url against the route path grammar.
pub fn is_route_path(url: &str) -> bool {
    ROUTE_PATH.is_match(url)
}

/// A render function invoked per request.
pub type RenderFn = Box<dyn Fn(&Request) -> Result<Node> + Send + Sync>;

/// A pre-render interception hook. Returning a non-empty path redirects
/// the request there instead of rendering; `None` (or an empty string)
/// means continue.
pub type InterceptFn = Box<dyn Fn(&Request) -> Result<Option<String>> + Send + Sync>;

/// A page-level POST handler. Returning `None` means "not handled" and
/// yields the 405 reply.
pub type PostFn = Box<dyn Fn(&Request) -> Result<Option<Reply>> + Send + Sync>;

/// Where a head or body render tree comes from: a pre-built tree, or a
/// function producing one per request.
pub enum RenderSource {
    Static(Node),
    Dynamic(RenderFn),
}

impl RenderSource {
    /// Wrap a render function.
    pub fn dynamic(f: impl Fn(&Request) -> Result<Node> + Send + Sync + 'static) -> Self {
        RenderSource::Dynamic(Box::new(f))
    }

    fn empty() -> Self {
        RenderSource::Static(Node::Fragment(Vec::new()))
    }
}

impl From<Node> for RenderSource {
    fn from(tree: Node) -> Self {
        RenderSource::Static(tree)
    }
}

impl fmt::Debug for RenderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderSource::Static(tree) => f.debug_tuple("Static").field(tree).finish(),
            RenderSource::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// A reusable page shell.
pub struct Template {
    pub name: String,
    pub favicon: String,
    pub styles: Vec<String>,
    pub scripts: Vec<String>,
    pub head: RenderSource,
    pub body: RenderSource,
    pub onrequest: Option<InterceptFn>,
}

impl Template {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            favicon: String::new(),
            styles: Vec::new(),
            scripts: Vec::new(),
            head: RenderSource::empty(),
            body: RenderSource::empty(),
            onrequest: None,
        }
    }

    pub fn favicon(mut self, url: impl Into<String>) -> Self {
        self.favicon = url.into();
        self
    }

    pub fn style(mut self, url: impl Into<String>) -> Self {
        self.styles.push(url.into());
        self
    }

    pub fn script(mut self, url: impl Into<String>) -> Self {
        self.scripts.push(url.into());
        self
    }

    pub fn head(mut self, source: impl Into<RenderSource>) -> Self {
        self.head = source.into();
        self
    }

    pub fn body(mut self, source: impl Into<RenderSource>) -> Self {
        self.body = source.into();
        self
    }

    /// Install the shell-level interception hook. It runs before the
    /// page-level hook on every request routed through this template.
    pub fn onrequest(
        mut self,
        f: impl Fn(&Request) -> Result<Option<String>> + Send + Sync + 'static,
    ) -> Self {
        self.onrequest = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("favicon", &self.favicon)
            .field("styles", &self.styles)
            .field("scripts", &self.scripts)
            .finish_non_exhaustive()
    }
}

/// Route-specific content merged into a template at serve time.
pub struct Page {
    pub url: String,
    pub title: String,
    pub template: String,
    pub styles: Vec<String>,
    pub scripts: Vec<String>,
    pub head: RenderSource,
    pub body: RenderSource,
    pub onpost: Option<PostFn>,
    pub onrequest: Option<InterceptFn>,
}

impl Page {
    pub fn new(url: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            template: template.into(),
            styles: Vec::new(),
            scripts: Vec::new(),
            head: RenderSource::empty(),
            body: RenderSource::empty(),
            onpost: None,
            onrequest: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn style(mut self, url: impl Into<String>) -> Self {
        self.styles.push(url.into());
        self
    }

    pub fn script(mut self, url: impl Into<String>) -> Self {
        self.scripts.push(url.into());
        self
    }

    pub fn head(mut self, source: impl Into<RenderSource>) -> Self {
        self.head = source.into();
        self
    }

    pub fn body(mut self, source: impl Into<RenderSource>) -> Self {
        self.body = source.into();
        self
    }

    pub fn onpost(
        mut self,
        f: impl Fn(&Request) -> Result<Option<Reply>> + Send + Sync + 'static,
    ) -> Self {
        self.onpost = Some(Box::new(f));
        self
    }

    pub fn onrequest(
        mut self,
        f: impl Fn(&Request) -> Result<Option<String>> + Send + Sync + 'static,
    ) -> Self {
        self.onrequest = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("url", &self.url)
            .field("title", &self.title)
            .field("template", &self.template)
            .field("styles", &self.styles)
            .field("scripts", &self.scripts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_grammar_accepts_root_and_segments() {
        assert!(is_route_path("/"));
        assert!(is_route_path("/about"));
        assert!(is_route_path("/blog/2024/intro"));
    }

    #[test]
    fn route_grammar_rejects_malformed_paths() {
        assert!(!is_route_path(""));
        assert!(!is_route_path("about"));
        assert!(!is_route_path("/about/"));
        assert!(!is_route_path("//"));
        assert!(!is_route_path("/a//b"));
    }

    #[test]
    fn builders_accumulate_in_order() {
        let template = Template::new("main")
            .favicon("/favicon.ico")
            .style("/a.css")
            .style("/b.css")
            .script("/app.js");
        assert_eq!(template.styles, vec!["/a.css", "/b.css"]);
        assert_eq!(template.scripts, vec!["/app.js"]);

        let page = Page::new("/", "main").title("Home").style("/home.css");
        assert_eq!(page.template, "main");
        assert_eq!(page.styles, vec!["/home.css"]);
    }
}

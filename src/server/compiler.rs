//! Template/page composition.
//!
//! The compiler is pure: it resolves the four render sources of a
//! template/page pair and merges them into either a full HTML document or
//! a partial-update payload for client-side navigation. It knows nothing
//! about routing and performs no I/O of its own.

use crate::config::Config;
use crate::render::Node;
use crate::server::request::Request;
use crate::site::{Page, RenderSource, Template};
use anyhow::Result;
use regex::{Captures, Regex};
use serde_json::{Value, json};
use std::sync::LazyLock;

/// Import-map bootstrap emitted in client mode, ahead of any module
/// script.
const IMPORT_MAP: &str = r#"{"imports":{"plinth-client":"https://esm.sh/plinth-client"}}"#;

/// Attribute marking whether a link/script came from the template or the
/// page, read by the client agent during partial updates.
const ORIGIN_ATTR: &str = "plinth-type";

/// Matches the first element whose `id` attribute equals `app`, capturing
/// its opening and closing tags. Single match, first occurrence; nested
/// or repeated ids are not considered.
static APP_SLOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)(<[^>]*id\s*=\s*['"]app['"][^>]*>).*?(</[^>]*>)"#).expect("app slot regex")
});

/// Composes templates and pages into servable output.
pub struct Compiler {
    lang: String,
    client: bool,
}

impl Compiler {
    pub fn new(config: &Config) -> Self {
        Self {
            lang: config.lang.clone(),
            client: config.client,
        }
    }

    /// Resolve a render source to a concrete tree, invoking the render
    /// function for dynamic sources.
    pub fn compile(&self, req: &Request, source: &RenderSource) -> Result<Node> {
        match source {
            RenderSource::Static(tree) => Ok(tree.clone()),
            RenderSource::Dynamic(render) => render(req),
        }
    }

    /// Compose a full HTML document from a template and a page.
    pub fn create_document(
        &self,
        req: &Request,
        template: &Template,
        page: &Page,
    ) -> Result<String> {
        let template_head = self.compile(req, &template.head)?;
        let page_head = self.compile(req, &page.head)?;

        let template_body = self.compile(req, &template.body)?;
        let page_body = self.compile(req, &page.body)?;

        let combined_body = splice_app_slot(&template_body.to_html(), &page_body.to_html());

        let head = Node::elem("head")
            .child(template_head)
            .child(Node::elem("title").child(Node::text(page.title.as_str())))
            .child(Node::elem("meta").attr("charset", "UTF-8"))
            .child(
                Node::elem("meta")
                    .attr("http-equiv", "X-UA-Compatible")
                    .attr("content", "IE=edge"),
            )
            .child(Node::elem("meta").attr("name", "viewport").attr(
                "content",
                "width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no",
            ))
            .children(self.stylesheet_links(&template.styles, "template"))
            .children(self.stylesheet_links(&page.styles, "page"))
            .child(
                Node::elem("link")
                    .attr("rel", "shortcut icon")
                    .attr("href", template.favicon.as_str()),
            )
            .child(page_head);

        let mut body = Node::elem("body").child(
            Node::elem("div")
                .attr("id", "root")
                .child(Node::raw(combined_body)),
        );
        if self.client {
            body = body.child(
                Node::elem("script")
                    .attr("type", "importmap")
                    .child(Node::text(IMPORT_MAP)),
            );
        }
        body = body
            .children(self.script_tags(&template.scripts, "template"))
            .children(self.script_tags(&page.scripts, "page"));

        let html = Node::elem("html")
            .attr("lang", self.lang.as_str())
            .child(head)
            .child(body);

        Ok(format!("<!DOCTYPE html>{}", html.to_html()))
    }

    /// Compose the partial-update payload for client-side navigation.
    ///
    /// The `template` field is `null` when the request already holds the
    /// page's template (its JSON body names it), so an unchanged shell is
    /// never re-sent.
    pub fn create_partial_update(
        &self,
        req: &Request,
        template: &Template,
        page: &Page,
    ) -> Result<Value> {
        let cached_template = req
            .json_body()
            .and_then(|body| body.get("template"))
            .and_then(Value::as_str)
            == Some(page.template.as_str());

        let template_value = if cached_template {
            Value::Null
        } else {
            json!({
                "name": template.name,
                "styles": template.styles,
                "scripts": template.scripts,
                "head": self.compile(req, &template.head)?.to_html(),
                "body": self.compile(req, &template.body)?.to_html(),
            })
        };

        Ok(json!({
            "url": req.path(),
            "title": page.title,
            "favicon": template.favicon,
            "template": template_value,
            "page": {
                "styles": page.styles,
                "scripts": page.scripts,
                "head": self.compile(req, &page.head)?.to_html(),
                "body": self.compile(req, &page.body)?.to_html(),
            },
        }))
    }

    fn stylesheet_links(&self, urls: &[String], origin: &'static str) -> Vec<Node> {
        urls.iter()
            .map(|url| {
                let link = Node::elem("link")
                    .attr("rel", "stylesheet")
                    .attr("href", url.as_str());
                if self.client {
                    link.attr(ORIGIN_ATTR, origin)
                } else {
                    link
                }
            })
            .collect()
    }

    fn script_tags(&self, urls: &[String], origin: &'static str) -> Vec<Node> {
        urls.iter()
            .map(|url| {
                let script = Node::elem("script")
                    .attr("src", url.as_str())
                    .attr("type", "module");
                if self.client {
                    script.attr(ORIGIN_ATTR, origin)
                } else {
                    script
                }
            })
            .collect()
    }
}

/// Replace the inner content of the first `id="app"` element in the
/// template markup with the page markup. Without a match the template
/// markup passes through unchanged and the page body is dropped.
fn splice_app_slot(template_markup: &str, page_markup: &str) -> String {
    APP_SLOT
        .replace(template_markup, |caps: &Captures| {
            format!("{}{}{}", &caps[1], page_markup, &caps[2])
        })
        .into_owned()
}

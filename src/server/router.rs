//! Request-to-response state machine.
//!
//! A matched route runs the interception chain, then renders (GET),
//! answers the partial-update protocol, or delegates to the page's POST
//! handler. An unmatched GET falls back to the static asset pipeline and
//! finally to the configured not-found redirect.

use crate::asset::StaticAssetPipeline;
use crate::config::Config;
use crate::error::StartupError;
use crate::server::compiler::Compiler;
use crate::server::reply::Reply;
use crate::server::request::{Method, Request};
use crate::site::registry::{PageRegistry, TemplateRegistry};
use crate::site::{Page, Template};
use anyhow::Result;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Body `agent` value marking a request as coming from the client-side
/// navigation agent.
pub const CLIENT_AGENT: &str = "plinth-client";

/// A page with its template reference resolved at startup.
struct Route {
    template: Arc<Template>,
    page: Arc<Page>,
}

/// Dispatches requests against the registered routes.
pub struct Router {
    routes: FxHashMap<String, Route>,
    compiler: Compiler,
    assets: StaticAssetPipeline,
    r404: String,
    client: bool,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .field("r404", &self.r404)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Build the route table, resolving every page's template reference.
    /// A dangling reference is a startup error.
    pub fn new(
        workspace: &Path,
        config: &Config,
        templates: &TemplateRegistry,
        pages: &PageRegistry,
    ) -> Result<Self, StartupError> {
        let mut routes = FxHashMap::default();
        for page in pages.iter() {
            let template =
                templates
                    .get(&page.template)
                    .ok_or_else(|| StartupError::UnknownTemplate {
                        page: page.url.clone(),
                        template: page.template.clone(),
                    })?;
            routes.insert(
                page.url.clone(),
                Route {
                    template,
                    page: Arc::clone(page),
                },
            );
        }

        Ok(Self {
            routes,
            compiler: Compiler::new(config),
            assets: StaticAssetPipeline::new(workspace, config),
            r404: config.r404.clone(),
            client: config.client,
        })
    }

    /// Whether a page is registered for the exact url.
    pub fn has_route(&self, url: &str) -> bool {
        self.routes.contains_key(url)
    }

    /// Dispatch a request. Handler faults are answered with the uniform
    /// 500 reply; everything else resolves to a valid response.
    pub fn dispatch(&self, req: &Request) -> Reply {
        match self.try_dispatch(req) {
            Ok(reply) => reply,
            Err(e) => {
                log!("error"; "{} failed: {e:#}", req.path());
                Reply::internal_error()
            }
        }
    }

    fn try_dispatch(&self, req: &Request) -> Result<Reply> {
        match self.routes.get(req.path()) {
            Some(route) => match req.method() {
                Method::Get => self.handle_get(req, route),
                Method::Post => self.handle_post(req, route),
                Method::Other(_) => Ok(Reply::method_not_allowed()),
            },
            None => self.handle_fallback(req),
        }
    }

    /// Run the interception chain: template hook first, then page hook.
    /// The first non-empty redirect target short-circuits.
    fn intercept(&self, req: &Request, route: &Route) -> Result<Option<String>> {
        if let Some(hook) = &route.template.onrequest
            && let Some(target) = hook(req)?
            && !target.is_empty()
        {
            return Ok(Some(target));
        }

        if let Some(hook) = &route.page.onrequest
            && let Some(target) = hook(req)?
            && !target.is_empty()
        {
            return Ok(Some(target));
        }

        Ok(None)
    }

    fn handle_get(&self, req: &Request, route: &Route) -> Result<Reply> {
        if let Some(target) = self.intercept(req, route)? {
            return Ok(Reply::redirect(target));
        }

        let document = self
            .compiler
            .create_document(req, &route.template, &route.page)?;
        Ok(Reply::html(document))
    }

    fn handle_post(&self, req: &Request, route: &Route) -> Result<Reply> {
        if let Some(target) = self.intercept(req, route)? {
            return Ok(Reply::redirect(target));
        }

        // Partial-update protocol: only consulted in client mode.
        if self.client && is_client_agent(req) {
            let payload = self
                .compiler
                .create_partial_update(req, &route.template, &route.page)?;
            return Ok(Reply::json(200, payload));
        }

        match &route.page.onpost {
            Some(handler) => Ok(handler(req)?.unwrap_or_else(Reply::method_not_allowed)),
            None => Ok(Reply::method_not_allowed()),
        }
    }

    /// No page matched: static lookup for GET, 405 for unknown methods,
    /// not-found redirect otherwise.
    fn handle_fallback(&self, req: &Request) -> Result<Reply> {
        match req.method() {
            Method::Other(_) => return Ok(Reply::method_not_allowed()),
            Method::Get => {
                if let Some(reply) = self.assets.resolve(req) {
                    return Ok(reply);
                }
            }
            Method::Post => {}
        }

        Ok(Reply::redirect(self.r404.clone()))
    }
}

/// Check the request body's `agent` field against the recognized client
/// agent.
fn is_client_agent(req: &Request) -> bool {
    req.json_body()
        .and_then(|body| body.get("agent"))
        .and_then(Value::as_str)
        == Some(CLIENT_AGENT)
}

//! Engine entry point.
//!
//! An [`Engine`] owns the configuration and the template/page registries.
//! [`Engine::start`] validates the workspace layout and every
//! cross-reference the registries carry, then binds the HTTP server and
//! serves until the process exits. All validation failures are fatal
//! before the first request is accepted.

use crate::config::Config;
use crate::error::StartupError;
use crate::server::{self, router::Router};
use crate::site::registry::{PageRegistry, TemplateRegistry};
use crate::site::{self, Page, Template};
use anyhow::Result;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_http::Server;

/// Directories every workspace must provide.
const REQUIRED_DIRECTORIES: [&str; 3] = ["templates", "pages", "static"];

/// The site engine: configuration, registries, and the serving loop.
pub struct Engine {
    workspace: PathBuf,
    config: Config,
    templates: TemplateRegistry,
    pages: PageRegistry,
}

impl Engine {
    /// Start building an engine rooted at the given workspace directory.
    pub fn builder(workspace: impl Into<PathBuf>) -> EngineBuilder {
        EngineBuilder {
            workspace: workspace.into(),
            config: Config::default(),
            templates: TemplateRegistry::default(),
            pages: PageRegistry::default(),
            error: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Validate the workspace and bind the server socket without
    /// entering the request loop.
    pub fn bind(&self) -> Result<BoundEngine> {
        self.validate()?;

        let router = Arc::new(Router::new(
            &self.workspace,
            &self.config,
            &self.templates,
            &self.pages,
        )?);

        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.config.port);
        let server = Server::http(addr)
            .map_err(|e| anyhow::anyhow!("failed to bind http server on {addr}: {e}"))?;
        log!("serve"; "http://{addr}");

        Ok(BoundEngine {
            server,
            addr,
            router,
        })
    }

    /// Validate, bind, and serve requests until the process exits.
    pub fn start(&self) -> Result<()> {
        self.bind()?.run()
    }

    /// Startup preconditions: directory layout, the not-found route, and
    /// the registries' cross-references (the latter checked when the
    /// route table resolves template references).
    fn validate(&self) -> Result<(), StartupError> {
        if !self.workspace.is_dir() {
            return Err(StartupError::WorkspaceMissing(self.workspace.clone()));
        }
        for dir in REQUIRED_DIRECTORIES {
            let path = self.workspace.join(dir);
            if !path.is_dir() {
                return Err(StartupError::DirectoryMissing(path));
            }
        }

        if !site::is_route_path(&self.config.r404) {
            return Err(StartupError::InvalidRoutePath(self.config.r404.clone()));
        }
        if self.pages.get(&self.config.r404).is_none() {
            return Err(StartupError::UnknownNotFoundPage(self.config.r404.clone()));
        }

        Ok(())
    }
}

/// Builder collecting the configuration and route definitions.
///
/// Registration errors (duplicate names, malformed urls) are deferred
/// and surfaced by [`EngineBuilder::build`], so call chains stay flat.
pub struct EngineBuilder {
    workspace: PathBuf,
    config: Config,
    templates: TemplateRegistry,
    pages: PageRegistry,
    error: Option<StartupError>,
}

impl EngineBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn template(mut self, template: Template) -> Self {
        if self.error.is_none()
            && let Err(e) = self.templates.insert(template)
        {
            self.error = Some(e);
        }
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        if self.error.is_none()
            && let Err(e) = self.pages.insert(page)
        {
            self.error = Some(e);
        }
        self
    }

    pub fn build(self) -> Result<Engine, StartupError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        Ok(Engine {
            workspace: self.workspace,
            config: self.config,
            templates: self.templates,
            pages: self.pages,
        })
    }
}

/// A bound server, ready to accept requests.
pub struct BoundEngine {
    server: Server,
    addr: SocketAddr,
    router: Arc<Router>,
}

impl BoundEngine {
    /// The address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Enter the request loop (blocking).
    pub fn run(self) -> Result<()> {
        server::run(self.server, self.router);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Node;
    use std::fs;

    fn workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for sub in REQUIRED_DIRECTORIES {
            fs::create_dir(dir.path().join(sub)).unwrap();
        }
        dir
    }

    fn shell() -> Template {
        Template::new("main").body(Node::elem("div").attr("id", "app"))
    }

    #[test]
    fn valid_workspace_passes_validation() {
        let dir = workspace();
        let engine = Engine::builder(dir.path())
            .template(shell())
            .page(Page::new("/", "main"))
            .build()
            .unwrap();
        engine.validate().unwrap();
    }

    #[test]
    fn missing_required_directory_is_fatal() {
        let dir = workspace();
        fs::remove_dir(dir.path().join("static")).unwrap();
        let engine = Engine::builder(dir.path())
            .template(shell())
            .page(Page::new("/", "main"))
            .build()
            .unwrap();
        assert!(matches!(
            engine.validate(),
            Err(StartupError::DirectoryMissing(_))
        ));
    }

    #[test]
    fn missing_workspace_is_fatal() {
        let engine = Engine::builder("/nonexistent/workspace")
            .template(shell())
            .page(Page::new("/", "main"))
            .build()
            .unwrap();
        assert!(matches!(
            engine.validate(),
            Err(StartupError::WorkspaceMissing(_))
        ));
    }

    #[test]
    fn malformed_not_found_route_is_fatal() {
        let dir = workspace();
        let config = Config {
            r404: "/missing/".into(),
            ..Config::default()
        };
        let engine = Engine::builder(dir.path())
            .config(config)
            .template(shell())
            .page(Page::new("/", "main"))
            .build()
            .unwrap();
        assert!(matches!(
            engine.validate(),
            Err(StartupError::InvalidRoutePath(_))
        ));
    }

    #[test]
    fn unregistered_not_found_page_is_fatal() {
        let dir = workspace();
        let config = Config {
            r404: "/404".into(),
            ..Config::default()
        };
        let engine = Engine::builder(dir.path())
            .config(config)
            .template(shell())
            .page(Page::new("/", "main"))
            .build()
            .unwrap();
        assert!(matches!(
            engine.validate(),
            Err(StartupError::UnknownNotFoundPage(_))
        ));
    }

    #[test]
    fn builder_surfaces_registration_errors() {
        let dir = workspace();
        let result = Engine::builder(dir.path())
            .template(shell())
            .template(shell())
            .page(Page::new("/", "main"))
            .build();
        assert!(matches!(result, Err(StartupError::DuplicateTemplate(_))));
    }
}

//! Small site engine: composes reusable template shells with per-route
//! pages into served HTML, and serves a workspace's static assets through
//! a transform/cache pipeline.
//!
//! The public surface is [`Engine`]: register [`Template`]s and [`Page`]s
//! through the builder, then [`Engine::start`] validates the workspace and
//! serves requests until the process exits.
//!
//! ```ignore
//! let engine = Engine::builder("./site")
//!     .config(Config::default())
//!     .template(Template::new("main").body(shell))
//!     .page(Page::new("/", "main").title("Home").body(home))
//!     .build()?;
//! engine.start()?;
//! ```

#[macro_use]
pub mod logger;

pub mod asset;
pub mod config;
mod engine;
pub mod error;
pub mod render;
pub mod server;
pub mod site;
pub mod utils;

pub use config::Config;
pub use engine::{BoundEngine, Engine, EngineBuilder};
pub use error::StartupError;
pub use render::Node;
pub use server::compiler::Compiler;
pub use server::reply::Reply;
pub use server::request::{Method, Request};
pub use server::router::Router;
pub use site::registry::{PageRegistry, TemplateRegistry};
pub use site::{Page, RenderSource, Template};

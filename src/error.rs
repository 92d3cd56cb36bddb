//! Startup error types.
//!
//! Every variant here is fatal: [`crate::Engine::start`] refuses to serve
//! when the workspace layout or the registered routes are inconsistent.

use std::path::PathBuf;
use thiserror::Error;

/// Errors detected while validating the workspace and registries before
/// the server binds.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("the workspace `{0}` does not exist")]
    WorkspaceMissing(PathBuf),

    #[error("the directory `{0}` does not exist")]
    DirectoryMissing(PathBuf),

    #[error("invalid route path `{0}` (expected `/` or `/segment[/segment...]`)")]
    InvalidRoutePath(String),

    #[error("a page with url `{0}` is already registered")]
    DuplicatePage(String),

    #[error("a template named `{0}` is already registered")]
    DuplicateTemplate(String),

    #[error("page `{page}` references the template `{template}`, which does not exist")]
    UnknownTemplate { page: String, template: String },

    #[error("the 404 page `{0}` does not exist")]
    UnknownNotFoundPage(String),
}

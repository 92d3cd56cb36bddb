//! Static asset serving with sandboxed resolution, on-the-fly transforms
//! and conditional caching.
//!
//! Requests that match no page fall through to this pipeline. A resolved
//! file is either transformed (scripts and stylesheets, with a weak
//! validator and a long-lived cache policy) or passed through verbatim
//! with its mapped content type. Everything that fails to resolve — a
//! missing file, a directory, a traversal attempt — is a uniform miss.

pub mod etag;
pub mod path;
pub mod transform;

use crate::config::Config;
use crate::server::reply::Reply;
use crate::server::request::Request;
use crate::utils::mime;
use rustc_hash::FxHashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Serves files from the workspace's `static/` directory.
pub struct StaticAssetPipeline {
    root: PathBuf,
    env: FxHashMap<String, serde_json::Value>,
}

impl StaticAssetPipeline {
    pub fn new(workspace: &Path, config: &Config) -> Self {
        Self {
            root: workspace.join("static"),
            env: config.env.clone(),
        }
    }

    /// Resolve a request against the sandbox. `None` is a miss; the
    /// router turns it into the not-found redirect.
    pub fn resolve(&self, req: &Request) -> Option<Reply> {
        let file = path::resolve(req.path(), &self.root)?;

        let ext = file
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref().and_then(transform::loader_for) {
            Some(loader) => self.serve_transformed(req, &file, loader),
            None => self.serve_verbatim(&file),
        }
    }

    /// Transform pipeline: fingerprint the raw bytes, honor the client's
    /// validator before doing any work, then substitute/minify.
    fn serve_transformed(
        &self,
        req: &Request,
        file: &Path,
        loader: transform::Loader,
    ) -> Option<Reply> {
        let raw = fs::read(file).ok()?;
        let tag = etag::weak_tag(&raw);

        if etag::matches(req.header("if-none-match"), &tag) {
            return Some(Reply::NotModified { etag: tag });
        }

        let source = match String::from_utf8(raw) {
            Ok(source) => source,
            // Not valid text: serve the bytes untouched.
            Err(err) => {
                return Some(Reply::Asset {
                    content_type: mime::from_path(file),
                    body: err.into_bytes(),
                    etag: None,
                    cacheable: false,
                });
            }
        };

        let body = transform::transform(&source, loader, &self.env);
        debug!("static"; "transformed {} ({} -> {} bytes)", file.display(), source.len(), body.len());

        Some(Reply::Asset {
            content_type: mime::from_path(file),
            body: body.into_bytes(),
            etag: Some(tag),
            cacheable: true,
        })
    }

    fn serve_verbatim(&self, file: &Path) -> Option<Reply> {
        let body = fs::read(file).ok()?;
        Some(Reply::Asset {
            content_type: mime::from_path(file),
            body,
            etag: None,
            cacheable: false,
        })
    }
}

//! Transport-independent responses.
//!
//! The router state machine produces a [`Reply`]; the serve loop turns it
//! into a wire response. Keeping the two apart makes the whole dispatch
//! path testable without sockets.

use serde_json::{Value, json};

/// One year, in seconds. Transformed assets are content-addressed by
/// their validator tag, so the long lifetime is safe.
pub const ASSET_MAX_AGE: &str = "public, max-age=31536000";

/// A response value, still independent of the HTTP transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// 200 with an HTML body.
    Html(String),
    /// A JSON body with an explicit status code.
    Json { status: u16, body: Value },
    /// 302 to the given location.
    Redirect(String),
    /// A static file body. `etag` and `cacheable` are set on transformed
    /// assets only.
    Asset {
        content_type: &'static str,
        body: Vec<u8>,
        etag: Option<String>,
        cacheable: bool,
    },
    /// 304; the validator matched, no body.
    NotModified { etag: String },
}

impl Reply {
    pub fn html(body: impl Into<String>) -> Self {
        Reply::Html(body.into())
    }

    pub fn json(status: u16, body: Value) -> Self {
        Reply::Json { status, body }
    }

    pub fn redirect(target: impl Into<String>) -> Self {
        Reply::Redirect(target.into())
    }

    /// The uniform 405 reply.
    pub fn method_not_allowed() -> Self {
        Reply::Json {
            status: 405,
            body: json!({
                "success": false,
                "error": "405 Method Not Allowed.",
            }),
        }
    }

    /// The uniform reply for a handler fault.
    pub fn internal_error() -> Self {
        Reply::Json {
            status: 500,
            body: json!({
                "success": false,
                "error": "500 Internal Server Error.",
            }),
        }
    }

    /// Status code this reply will be sent with.
    pub fn status(&self) -> u16 {
        match self {
            Reply::Html(_) | Reply::Asset { .. } => 200,
            Reply::Json { status, .. } => *status,
            Reply::Redirect(_) => 302,
            Reply::NotModified { .. } => 304,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_not_allowed_body_is_exact() {
        let Reply::Json { status, body } = Reply::method_not_allowed() else {
            panic!("expected json reply");
        };
        assert_eq!(status, 405);
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"success":false,"error":"405 Method Not Allowed."}"#
        );
    }

    #[test]
    fn statuses() {
        assert_eq!(Reply::html("x").status(), 200);
        assert_eq!(Reply::redirect("/").status(), 302);
        assert_eq!(
            Reply::NotModified {
                etag: "W/\"a\"".into()
            }
            .status(),
            304
        );
        assert_eq!(Reply::internal_error().status(), 500);
    }
}

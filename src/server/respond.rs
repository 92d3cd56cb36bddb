//! Conversion from [`Reply`] values to wire responses.

use super::reply::{ASSET_MAX_AGE, Reply};
use crate::utils::mime::types::{HTML, JSON};
use anyhow::Result;
use tiny_http::{Header, Response, StatusCode};

/// Send a reply on the given transport request.
pub fn respond(request: tiny_http::Request, reply: Reply) -> Result<()> {
    match reply {
        Reply::Html(body) => send_body(request, 200, HTML, body.into_bytes(), Vec::new()),
        Reply::Json { status, body } => {
            let bytes = serde_json::to_vec(&body)?;
            send_body(request, status, JSON, bytes, Vec::new())
        }
        Reply::Redirect(target) => {
            let response =
                Response::empty(StatusCode(302)).with_header(make_header("Location", &target));
            request.respond(response)?;
            Ok(())
        }
        Reply::Asset {
            content_type,
            body,
            etag,
            cacheable,
        } => {
            let mut extra = Vec::new();
            if cacheable {
                extra.push(make_header("Cache-Control", ASSET_MAX_AGE));
            }
            if let Some(tag) = etag {
                extra.push(make_header("ETag", &tag));
            }
            send_body(request, 200, content_type, body, extra)
        }
        Reply::NotModified { etag } => {
            let response =
                Response::empty(StatusCode(304)).with_header(make_header("ETag", &etag));
            request.respond(response)?;
            Ok(())
        }
    }
}

fn send_body(
    request: tiny_http::Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
    extra: Vec<Header>,
) -> Result<()> {
    let mut response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type));
    for header in extra {
        response = response.with_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &str, value: &str) -> Header {
    Header::from_bytes(key.as_bytes(), value.as_bytes()).expect("valid header")
}

//! HTTP serving: transport binding and the request loop.
//!
//! The transport is `tiny_http`; requests are dispatched on a small
//! worker pool so a slow render or POST handler never blocks other
//! requests. Everything behind [`read_request`] works on the
//! transport-independent [`Request`]/[`Reply`] pair.

pub mod compiler;
pub mod reply;
pub mod request;
mod respond;
pub mod router;

use self::request::{Method, Request};
use self::router::Router;
use anyhow::Result;
use std::sync::Arc;
use tiny_http::Server;

/// Worker threads dispatching requests.
const WORKER_THREADS: usize = 4;

/// Run the request loop (blocking). Returns when the server socket is
/// closed.
pub(crate) fn run(server: Server, router: Arc<Router>) {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(WORKER_THREADS)
        .build()
        .expect("failed to create thread pool");

    for http_request in server.incoming_requests() {
        let router = Arc::clone(&router);
        pool.spawn(move || {
            if let Err(e) = handle(http_request, &router) {
                log!("serve"; "request error: {e:#}");
            }
        });
    }
}

/// Handle a single HTTP request end to end.
fn handle(mut http_request: tiny_http::Request, router: &Router) -> Result<()> {
    let req = read_request(&mut http_request)?;
    let reply = router.dispatch(&req);
    respond::respond(http_request, reply)
}

/// Lift a transport request into its dispatchable form.
fn read_request(http_request: &mut tiny_http::Request) -> Result<Request> {
    let method = match http_request.method() {
        tiny_http::Method::Get => Method::Get,
        tiny_http::Method::Post => Method::Post,
        other => Method::Other(other.to_string()),
    };
    let url = http_request.url().to_string();
    let headers = http_request
        .headers()
        .iter()
        .map(|h| {
            (
                h.field.as_str().as_str().to_string(),
                h.value.as_str().to_string(),
            )
        })
        .collect();

    let mut body = Vec::new();
    http_request.as_reader().read_to_end(&mut body)?;

    Ok(Request::new(method, &url, headers, body))
}

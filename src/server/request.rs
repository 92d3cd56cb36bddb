//! Transport-independent view of one HTTP request.
//!
//! The serve loop builds a [`Request`] from the raw transport request
//! before dispatch; handlers and tests only ever see this type.

use serde_json::Value;

/// Request method. Only GET and POST are routable; everything else is
/// carried through for the 405 path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

/// One inbound request: method, path (query stripped), headers, body.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    json: Option<Value>,
}

impl Request {
    /// Build a request. `url` may carry a query string; it is stripped
    /// from the stored path. A JSON body is parsed eagerly so handlers
    /// can inspect it without re-parsing.
    pub fn new(method: Method, url: &str, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        let path = url.split('?').next().unwrap_or(url).to_string();
        let json = serde_json::from_slice(&body).ok();
        Self {
            method,
            path,
            headers,
            body,
            json,
        }
    }

    /// Shorthand for a bodyless GET.
    pub fn get(url: &str) -> Self {
        Self::new(Method::Get, url, Vec::new(), Vec::new())
    }

    /// Shorthand for a POST carrying a JSON body.
    pub fn post_json(url: &str, body: &Value) -> Self {
        Self::new(
            Method::Post,
            url,
            vec![("Content-Type".into(), "application/json".into())],
            serde_json::to_vec(body).unwrap_or_default(),
        )
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path with the query string stripped.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Look up a header value, case-insensitively. Returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body parsed as JSON, if it was valid JSON.
    pub fn json_body(&self) -> Option<&Value> {
        self.json.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_string_is_stripped_from_path() {
        let req = Request::get("/search?q=term&page=2");
        assert_eq!(req.path(), "/search");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = Request::new(
            Method::Get,
            "/",
            vec![("If-None-Match".into(), "W/\"abc\"".into())],
            Vec::new(),
        );
        assert_eq!(req.header("if-none-match"), Some("W/\"abc\""));
        assert_eq!(req.header("IF-NONE-MATCH"), Some("W/\"abc\""));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn json_body_parses_eagerly() {
        let req = Request::post_json("/", &json!({"agent": "someone"}));
        assert_eq!(req.json_body().unwrap()["agent"], json!("someone"));

        let garbage = Request::new(Method::Post, "/", Vec::new(), b"not json".to_vec());
        assert!(garbage.json_body().is_none());
    }
}

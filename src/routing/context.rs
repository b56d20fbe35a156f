//! Per-request routing input.

use std::collections::HashMap;

/// Everything the routing pipeline looks at for one request.
///
/// Built once per request and never mutated while routing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Lowercased host, port included when the client sent one.
    pub hostname: String,
    /// Host taken from an absolute-form request URI, when present.
    pub url_host: Option<String>,
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: Option<String>,
    query_params: HashMap<String, String>,
    cookies: HashMap<String, String>,
    pub is_api_route: bool,
}

impl RequestContext {
    pub fn new(hostname: &str, path: &str) -> Self {
        let path = if path.is_empty() { "/" } else { path };
        Self {
            hostname: hostname.trim().to_lowercase(),
            path: path.to_string(),
            is_api_route: is_api_path(path),
            ..Default::default()
        }
    }

    /// Attach a query string. Repeated keys keep their first value.
    pub fn with_query(mut self, query: &str) -> Self {
        let query = query.trim_start_matches('?');
        if query.is_empty() {
            return self;
        }
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            self.query_params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
        self.query = Some(query.to_string());
        self
    }

    /// Attach one `Cookie` header value. May be called once per header.
    pub fn with_cookie_header(mut self, header: &str) -> Self {
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            self.cookies
                .entry(name.to_string())
                .or_insert_with(|| value.trim().trim_matches('"').to_string());
        }
        self
    }

    pub fn with_url_host(mut self, host: &str) -> Self {
        self.url_host = Some(host.to_lowercase());
        self
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// `?query` suffix to append to a rewritten path, or empty.
    pub fn query_suffix(&self) -> String {
        match &self.query {
            Some(q) => format!("?{}", q),
            None => String::new(),
        }
    }
}

/// API routes are scoped by header only.
pub fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

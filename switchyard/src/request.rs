//! The request view the router matches against: method, path, host
//! and the few headers routing cares about.

use std::collections::HashMap;

use crate::method::Method;

/// HTTP headers.
#[derive(Clone, Debug, Default)]
pub struct Headers {
    headers: HashMap<String, String>,
}

impl Headers {
    /// Create new empty headers.
    pub fn new() -> Self {
        Self {
            headers: HashMap::new(),
        }
    }

    /// Insert a header name and value.
    ///
    /// The name will be converted to lowercase.
    pub fn insert(&mut self, name: impl ToString, value: impl ToString) {
        self.headers
            .insert(name.to_string().to_lowercase(), value.to_string());
    }

    /// Get a header value by name. Case insensitive.
    pub fn get(&self, name: &str) -> Option<&String> {
        self.headers.get(&name.to_lowercase())
    }
}

/// An incoming request, reduced to what routing needs.
///
/// The host server owns the full request; it hands the router this
/// view and gets back a route, path parameters and a trailing-slash
/// indicator.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    path: String,
    host: String,
    headers: Headers,
}

impl Request {
    /// Request for the given method and path. Host and headers are
    /// filled in with the builder methods.
    pub fn new(method: Method, path: impl ToString) -> Self {
        Self {
            method,
            path: path.to_string(),
            host: String::new(),
            headers: Headers::new(),
        }
    }

    /// Set the `Host` header value, e.g. `localhost:8080`.
    pub fn with_host(mut self, host: impl ToString) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn with_header(mut self, name: impl ToString, value: impl ToString) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_headers_case_insensitive() {
        let request = Request::new(Method::Post, "/hotels/12345/cancel")
            .with_host("localhost:8080")
            .with_header("X-HTTP-Method-Override", "DELETE");

        assert_eq!(
            request.headers().get("x-http-method-override"),
            Some(&"DELETE".to_string())
        );
        assert_eq!(request.headers().get("accept"), None);
        assert_eq!(request.host(), "localhost:8080");
        assert_eq!(request.path(), "/hotels/12345/cancel");
    }
}

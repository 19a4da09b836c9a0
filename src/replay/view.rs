//! Read views over an inbound request.
//!
//! [`InboundRequest`] is the pass-through variant: it owns the buffered
//! request and answers every accessor directly. [`ObservedRequest`] wraps any
//! view for one replay pass and logs what downstream code reads, returning the
//! wrapped value untouched.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::http::{header, request::Parts, Extensions, HeaderMap, Method, Uri, Version};

/// Read accessors a handler chain sees.
pub trait RequestView: Send + Sync {
    fn method(&self) -> &Method;

    /// Request URI as received (path and query).
    fn uri(&self) -> &Uri;

    fn version(&self) -> Version;

    /// Path component of the request URI.
    fn path_info(&self) -> &str;

    /// `path_info` resolved against the document root, when one is configured.
    fn path_translated(&self) -> Option<PathBuf>;

    /// Reconstructed URL without the query string.
    fn request_url(&self) -> String;

    fn headers(&self) -> &HeaderMap;

    fn extensions(&self) -> &Extensions;

    fn body(&self) -> &Bytes;
}

/// A fully buffered inbound request.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    extensions: Extensions,
    body: Bytes,
    document_root: Option<PathBuf>,
}

impl InboundRequest {
    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            extensions: parts.extensions,
            body,
            document_root: None,
        }
    }

    pub fn with_document_root(mut self, root: impl AsRef<Path>) -> Self {
        self.document_root = Some(root.as_ref().to_path_buf());
        self
    }
}

impl RequestView for InboundRequest {
    fn method(&self) -> &Method {
        &self.method
    }

    fn uri(&self) -> &Uri {
        &self.uri
    }

    fn version(&self) -> Version {
        self.version
    }

    fn path_info(&self) -> &str {
        self.uri.path()
    }

    fn path_translated(&self) -> Option<PathBuf> {
        let root = self.document_root.as_ref()?;
        Some(root.join(self.uri.path().trim_start_matches('/')))
    }

    fn request_url(&self) -> String {
        let scheme = self.uri.scheme_str().unwrap_or("http");
        let host = self
            .uri
            .authority()
            .map(|a| a.as_str())
            .or_else(|| self.headers.get(header::HOST).and_then(|h| h.to_str().ok()))
            .unwrap_or("localhost");
        format!("{}://{}{}", scheme, host, self.uri.path())
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Per-pass view that logs request-line accessors and forwards everything.
#[derive(Clone, Copy)]
pub struct ObservedRequest<'a> {
    inner: &'a dyn RequestView,
    pass: usize,
}

impl<'a> ObservedRequest<'a> {
    pub fn new(inner: &'a dyn RequestView, pass: usize) -> Self {
        Self { inner, pass }
    }

    pub fn pass(&self) -> usize {
        self.pass
    }
}

impl RequestView for ObservedRequest<'_> {
    fn method(&self) -> &Method {
        let method = self.inner.method();
        tracing::debug!(pass = self.pass, method = %method, "Replay observed method");
        method
    }

    fn uri(&self) -> &Uri {
        let uri = self.inner.uri();
        tracing::debug!(pass = self.pass, uri = %uri, "Replay observed request URI");
        uri
    }

    fn version(&self) -> Version {
        self.inner.version()
    }

    fn path_info(&self) -> &str {
        let path = self.inner.path_info();
        tracing::debug!(pass = self.pass, path_info = %path, "Replay observed path info");
        path
    }

    fn path_translated(&self) -> Option<PathBuf> {
        let path = self.inner.path_translated();
        tracing::debug!(pass = self.pass, path_translated = ?path, "Replay observed translated path");
        path
    }

    fn request_url(&self) -> String {
        let url = self.inner.request_url();
        tracing::debug!(pass = self.pass, url = %url, "Replay observed request URL");
        url
    }

    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn extensions(&self) -> &Extensions {
        self.inner.extensions()
    }

    fn body(&self) -> &Bytes {
        self.inner.body()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn inbound(uri: &str) -> InboundRequest {
        let (parts, ()) = Request::builder()
            .method("GET")
            .uri(uri)
            .header("host", "localhost:8080")
            .header("origin", "http://localhost:9000")
            .body(())
            .unwrap()
            .into_parts();
        InboundRequest::from_parts(parts, Bytes::from_static(b"payload"))
    }

    #[test]
    fn test_inbound_accessors() {
        let request = inbound("/greeting?name=Ada");
        assert_eq!(*request.method(), Method::GET);
        assert_eq!(request.path_info(), "/greeting");
        assert_eq!(request.uri().query(), Some("name=Ada"));
        assert_eq!(request.request_url(), "http://localhost:8080/greeting");
        assert_eq!(request.path_translated(), None);
        assert_eq!(request.body().as_ref(), b"payload");
    }

    #[test]
    fn test_absolute_uri_wins_over_host_header() {
        let request = inbound("https://example.com/greeting");
        assert_eq!(request.request_url(), "https://example.com/greeting");
    }

    #[test]
    fn test_path_translated_with_root() {
        let request = inbound("/public/hello.js").with_document_root("/srv/www");
        assert_eq!(request.path_translated(), Some(PathBuf::from("/srv/www/public/hello.js")));
    }

    #[test]
    fn test_observed_view_is_transparent() {
        let request = inbound("/greeting?name=Ada").with_document_root("/srv");
        let observed = ObservedRequest::new(&request, 1);

        assert_eq!(observed.pass(), 1);
        assert_eq!(observed.method(), request.method());
        assert_eq!(observed.uri(), request.uri());
        assert_eq!(observed.version(), request.version());
        assert_eq!(observed.path_info(), request.path_info());
        assert_eq!(observed.path_translated(), request.path_translated());
        assert_eq!(observed.request_url(), request.request_url());
        assert_eq!(observed.headers(), request.headers());
        assert_eq!(observed.body(), request.body());
    }
}

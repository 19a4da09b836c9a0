//! Write destinations for a handler chain's response.
//!
//! A sink carries response metadata (status, headers) plus a byte output with
//! a text output layered on top. [`LiveResponse`] is the real response being
//! assembled for the client. [`BufferedSink`] wraps another sink for one replay
//! pass: metadata is forwarded to the wrapped sink, body bytes stay in a
//! private buffer that is dropped with the wrapper.

use std::fmt;
use std::io::{self, Write};

use axum::{
    body::Body,
    http::{header, HeaderMap, StatusCode},
    response::Response,
};

/// Response write accessors a handler chain sees.
pub trait ResponseSink: Send {
    fn status(&self) -> StatusCode;

    fn set_status(&mut self, status: StatusCode);

    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Binary body output.
    fn output_stream(&mut self) -> &mut dyn Write;

    /// Text body output, written through [`ResponseSink::output_stream`].
    fn writer(&mut self) -> TextWriter<'_> {
        TextWriter::new(self.output_stream())
    }
}

/// UTF-8 text adapter over a byte output.
pub struct TextWriter<'a> {
    out: &'a mut dyn Write,
}

impl<'a> TextWriter<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self { out }
    }
}

impl fmt::Write for TextWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.write_all(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

/// Body bytes of the real response, with a count of write calls.
#[derive(Debug, Default)]
struct LiveBody {
    bytes: Vec<u8>,
    writes: usize,
}

impl Write for LiveBody {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes += 1;
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// The response that will actually be sent to the client.
#[derive(Debug)]
pub struct LiveResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: LiveBody,
}

impl LiveResponse {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: LiveBody::default(),
        }
    }

    /// Number of write calls that reached the body.
    pub fn body_writes(&self) -> usize {
        self.body.writes
    }

    pub fn body(&self) -> &[u8] {
        &self.body.bytes
    }

    /// Finish into an HTTP response.
    ///
    /// Framing headers are dropped; the body written here determines them.
    pub fn into_response(self) -> Response {
        let mut headers = self.headers;
        headers.remove(header::CONTENT_LENGTH);
        headers.remove(header::TRANSFER_ENCODING);

        let mut response = Response::new(Body::from(self.body.bytes));
        *response.status_mut() = self.status;
        *response.headers_mut() = headers;
        response
    }
}

impl Default for LiveResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSink for LiveResponse {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn output_stream(&mut self) -> &mut dyn Write {
        &mut self.body
    }
}

/// Sink for one replay pass. Body output never reaches the wrapped sink.
pub struct BufferedSink<'a, S: ResponseSink + ?Sized> {
    inner: &'a mut S,
    buffer: Vec<u8>,
}

impl<'a, S: ResponseSink + ?Sized> BufferedSink<'a, S> {
    pub fn new(inner: &'a mut S) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    /// Bytes captured so far.
    pub fn captured(&self) -> &[u8] {
        &self.buffer
    }
}

impl<S: ResponseSink + ?Sized> ResponseSink for BufferedSink<'_, S> {
    fn status(&self) -> StatusCode {
        self.inner.status()
    }

    fn set_status(&mut self, status: StatusCode) {
        self.inner.set_status(status);
    }

    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn output_stream(&mut self) -> &mut dyn Write {
        &mut self.buffer
    }
}

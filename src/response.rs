//! The response-writing capability handlers write through, and the buffered
//! writer the server hands them.
//!
//! Handlers do not return a response value. They receive a
//! `&mut dyn ResponseWriter`, set headers, optionally commit a status, and
//! write body bytes. That indirection is what lets middleware slip a
//! decorator in between the handler and the real transport.

use std::io;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// A destination for one HTTP response.
///
/// Semantics follow the usual server contract:
///
/// - headers may be edited until the status is committed;
/// - the first [`write_header`](ResponseWriter::write_header) commits the
///   status, later calls are ignored by the transport;
/// - a [`write`](ResponseWriter::write) without a prior status commits
///   `200 OK`.
///
/// `dyn ResponseWriter` implements [`std::io::Write`], so `write!` works:
///
/// ```rust
/// use std::io::Write;
/// use accesslog::{Request, ResponseWriter};
///
/// fn hello(_req: &Request, res: &mut dyn ResponseWriter) {
///     res.headers().insert("content-type", "text/plain".parse().unwrap());
///     let _ = write!(res, "hello, {}", "world");
/// }
/// ```
pub trait ResponseWriter {
    /// The header map that will be sent with the response. Mutations before
    /// the status is committed are visible to the client.
    fn headers(&mut self) -> &mut HeaderMap;

    fn write_header(&mut self, status: StatusCode);

    /// Writes body bytes and returns how many were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Pushes buffered data toward the client. Writers without an explicit
    /// flush keep this default no-op.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for dyn ResponseWriter + '_ {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ResponseWriter::write(self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        ResponseWriter::flush(self)
    }
}

// ── ResponseBuffer ────────────────────────────────────────────────────────────

/// A [`ResponseWriter`] that collects the whole response in memory.
///
/// This is what [`Server`](crate::Server) gives each handler; once the handler
/// returns, [`into_response`](ResponseBuffer::into_response) turns it into the
/// `http::Response` hyper sends.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed status, or `200 OK` if nothing was committed yet.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_response(self) -> http::Response<Full<Bytes>> {
        let status = self.status();
        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for ResponseBuffer {
    fn headers(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        if let Some(committed) = self.status {
            tracing::warn!(%committed, ignored = %status, "superfluous write_header call");
            return;
        }
        self.status = Some(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.status.get_or_insert(StatusCode::OK);
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn first_status_wins() {
        let mut buf = ResponseBuffer::new();
        buf.write_header(StatusCode::CREATED);
        buf.write_header(StatusCode::BAD_REQUEST);
        assert_eq!(buf.status(), StatusCode::CREATED);
    }

    #[test]
    fn body_write_commits_ok() {
        let mut buf = ResponseBuffer::new();
        ResponseWriter::write(&mut buf, b"hi").unwrap();
        buf.write_header(StatusCode::NOT_FOUND);
        assert_eq!(buf.status(), StatusCode::OK);
    }

    #[test]
    fn io_write_goes_through_the_trait() {
        let mut buf = ResponseBuffer::new();
        let res: &mut dyn ResponseWriter = &mut buf;
        write!(res, "{}-{}", 4, 2).unwrap();
        ResponseWriter::flush(res).unwrap();
        assert_eq!(buf.body(), b"4-2");
    }

    #[test]
    fn into_response_carries_status_headers_and_body() {
        let mut buf = ResponseBuffer::new();
        buf.headers().insert("x-request-id", "abc".parse().unwrap());
        buf.write_header(StatusCode::ACCEPTED);
        ResponseWriter::write(&mut buf, b"queued").unwrap();

        let response = buf.into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()["x-request-id"], "abc");
    }
}

//! A transparent [`ResponseWriter`] decorator that records what went out.

use std::io;
use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset, Local};
use http::{HeaderMap, StatusCode};

use crate::response::ResponseWriter;

/// Wraps a response writer and records the committed status and the number
/// of body bytes the writer actually accepted.
///
/// Every call is forwarded unchanged; the observer only watches. It belongs
/// to a single request and is dropped once that request has been logged.
///
/// The first status wins: a later `write_header`, or one after the body has
/// started, is still forwarded but not recorded. A wrapped writer that lets
/// later calls replace the status breaks the [`ResponseWriter`] contract and
/// will log a different status than it sends.
pub struct ResponseObserver<'w, W: ResponseWriter + ?Sized> {
    inner: &'w mut W,
    start: DateTime<FixedOffset>,
    started: Instant,
    status: Option<StatusCode>,
    size: usize,
}

impl<'w, W: ResponseWriter + ?Sized> ResponseObserver<'w, W> {
    /// Starts the clock.
    pub fn new(inner: &'w mut W) -> Self {
        Self {
            inner,
            start: Local::now().fixed_offset(),
            started: Instant::now(),
            status: None,
            size: 0,
        }
    }

    /// The committed status; `None` until a status is set or a byte written.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Body bytes the underlying writer accepted so far.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Wall-clock time the observer was created, in local time.
    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for ResponseObserver<'_, W> {
    fn headers(&mut self) -> &mut HeaderMap {
        self.inner.headers()
    }

    // Only the first status reaches the client, so only the first is recorded.
    fn write_header(&mut self, status: StatusCode) {
        self.status.get_or_insert(status);
        self.inner.write_header(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.status.get_or_insert(StatusCode::OK);
        let written = self.inner.write(buf)?;
        self.size += written;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ResponseBuffer;

    /// Accepts at most `limit` bytes per call and counts flushes.
    #[derive(Default)]
    struct Trickle {
        limit: usize,
        received: Vec<u8>,
        flushes: usize,
        headers: HeaderMap,
    }

    impl ResponseWriter for Trickle {
        fn headers(&mut self) -> &mut HeaderMap { &mut self.headers }
        fn write_header(&mut self, _status: StatusCode) {}

        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.limit);
            self.received.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    struct Broken(HeaderMap);

    impl ResponseWriter for Broken {
        fn headers(&mut self) -> &mut HeaderMap { &mut self.0 }
        fn write_header(&mut self, _status: StatusCode) {}
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn write_without_status_records_ok() {
        let mut buf = ResponseBuffer::new();
        let mut obs = ResponseObserver::new(&mut buf);
        assert_eq!(obs.status(), None);
        obs.write(b"hello").unwrap();
        assert_eq!(obs.status(), Some(StatusCode::OK));
    }

    #[test]
    fn explicit_status_survives_body_write() {
        let mut buf = ResponseBuffer::new();
        let mut obs = ResponseObserver::new(&mut buf);
        obs.write_header(StatusCode::NOT_FOUND);
        obs.write(b"missing").unwrap();
        assert_eq!(obs.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(buf.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn recorded_status_matches_what_the_writer_committed() {
        let mut buf = ResponseBuffer::new();
        let mut obs = ResponseObserver::new(&mut buf);
        obs.write_header(StatusCode::CREATED);
        obs.write_header(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(obs.status(), Some(StatusCode::CREATED));
        assert_eq!(buf.status(), StatusCode::CREATED);
    }

    #[test]
    fn status_after_body_is_forwarded_but_not_recorded() {
        let mut buf = ResponseBuffer::new();
        let mut obs = ResponseObserver::new(&mut buf);
        obs.write(b"partial").unwrap();
        obs.write_header(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(obs.status(), Some(StatusCode::OK));
        assert_eq!(buf.status(), StatusCode::OK);
    }

    #[test]
    fn bytes_pass_through_and_are_counted() {
        let mut buf = ResponseBuffer::new();
        let mut obs = ResponseObserver::new(&mut buf);
        for chunk in [&b"hello"[..], b", ", b"world"] {
            assert_eq!(obs.write(chunk).unwrap(), chunk.len());
        }
        assert_eq!(obs.size(), 12);
        assert_eq!(buf.body(), b"hello, world");
    }

    #[test]
    fn short_writes_count_only_accepted_bytes() {
        let mut sink = Trickle { limit: 3, ..Trickle::default() };
        let mut obs = ResponseObserver::new(&mut sink);
        assert_eq!(obs.write(b"abcdef").unwrap(), 3);
        assert_eq!(obs.write(b"gh").unwrap(), 2);
        let size = obs.size();
        assert_eq!(size, sink.received.len());
        assert_eq!(sink.received, b"abcgh");
    }

    #[test]
    fn failed_writes_add_nothing() {
        let mut broken = Broken(HeaderMap::new());
        let mut obs = ResponseObserver::new(&mut broken);
        assert_eq!(obs.write(b"lost").unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(obs.size(), 0);
    }

    #[test]
    fn flush_reaches_writers_that_support_it() {
        let mut sink = Trickle { limit: usize::MAX, ..Trickle::default() };
        ResponseObserver::new(&mut sink).flush().unwrap();
        assert_eq!(sink.flushes, 1);
    }

    #[test]
    fn flush_is_a_no_op_for_writers_without_it() {
        let mut broken = Broken(HeaderMap::new());
        assert!(ResponseObserver::new(&mut broken).flush().is_ok());
    }

    #[test]
    fn headers_are_the_underlying_map() {
        let mut buf = ResponseBuffer::new();
        ResponseObserver::new(&mut buf)
            .headers()
            .insert("cache-control", "no-store".parse().unwrap());
        assert_eq!(buf.headers()["cache-control"], "no-store");
    }

    #[test]
    fn wraps_trait_objects() {
        let mut buf = ResponseBuffer::new();
        let res: &mut dyn ResponseWriter = &mut buf;
        let mut obs = ResponseObserver::new(res);
        obs.write(b"ok").unwrap();
        assert_eq!(obs.size(), 2);
    }
}

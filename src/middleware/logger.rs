//! Access-log middleware.

use std::io;

use http::StatusCode;
use tracing::{debug, warn};

use super::observer::ResponseObserver;
use crate::format::{Formatter, LogEntry, LogFormat};
use crate::handler::{BoxedHandler, Handler};
use crate::metrics::MetricsClient;
use crate::request::Request;
use crate::response::ResponseWriter;
use crate::sink::LogSink;

/// Wraps a handler and writes one access-log line per request.
///
/// `Logger` is itself a [`Handler`], so it drops in wherever the wrapped
/// handler was used:
///
/// ```rust,no_run
/// use std::io::Write;
/// use accesslog::{LogFormat, Request, ResponseWriter, Server};
/// use accesslog::middleware::Logger;
///
/// fn ping(_req: &Request, res: &mut dyn ResponseWriter) {
///     let _ = res.write_all(b"pong");
/// }
///
/// # async fn run() -> Result<(), accesslog::Error> {
/// let app = Logger::new(ping, std::io::stderr(), LogFormat::Dev);
/// Server::bind("0.0.0.0:3000")?.serve(app).await
/// # }
/// ```
///
/// Logging is best-effort. A sink or metrics failure is reported through
/// `tracing` and never changes the response the inner handler produced.
pub struct Logger {
    inner: BoxedHandler,
    sink: Box<dyn LogSink>,
    format: LogFormat,
    // Resolved from `format` once at construction.
    formatter: Formatter,
    metrics: Option<Box<dyn MetricsClient>>,
}

impl Logger {
    pub fn new(inner: impl Handler, sink: impl LogSink + 'static, format: LogFormat) -> Self {
        Self {
            inner: inner.into_boxed(),
            sink: Box::new(sink),
            format,
            formatter: format.formatter(),
            metrics: None,
        }
    }

    /// Combined format to standard output, no metrics.
    pub fn stdout(inner: impl Handler) -> Self {
        Self::new(inner, io::stdout(), LogFormat::Combined)
    }

    /// Also report `http.response` / `http.size` measurements to `client`.
    pub fn with_metrics(mut self, client: impl MetricsClient + 'static) -> Self {
        self.metrics = Some(Box::new(client));
        self
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    fn report(&self, metrics: &dyn MetricsClient, entry: &LogEntry<'_>) {
        let tags = [format!("status:{}", entry.status), format!("method:{}", entry.method)];

        let outcomes = [
            ("http.response", metrics.incr("http.response", &tags)),
            ("http.size", metrics.gauge("http.size", entry.size as f64, &tags)),
            ("http.response", metrics.timing("http.response", entry.elapsed, &tags)),
        ];
        for (name, outcome) in outcomes {
            if let Err(e) = outcome {
                warn!(metric = name, error = %e, "metrics emission failed");
            }
        }

        debug!(status = entry.status, method = entry.method, size = entry.size, "metrics reported");
    }
}

impl Handler for Logger {
    fn serve(&self, req: &Request, res: &mut dyn ResponseWriter) {
        let mut observer = ResponseObserver::new(res);
        self.inner.serve(req, &mut observer);
        let elapsed = observer.elapsed();

        let entry = LogEntry {
            remote_ip: req.remote_ip(),
            username: req.username().unwrap_or("-"),
            start: observer.start(),
            method: req.method().as_str(),
            request_uri: req.request_uri(),
            proto: req.proto(),
            // Nothing committed means the transport sends its default.
            status: observer.status().unwrap_or(StatusCode::OK).as_u16(),
            size: observer.size(),
            referer: req.referer(),
            user_agent: req.user_agent(),
            elapsed,
        };

        let mut line = (self.formatter)(&entry);
        line.push('\n');
        if let Err(e) = self.sink.append(line.as_bytes()) {
            warn!(error = %e, format = %self.format, "access log write failed");
        }

        if let Some(metrics) = &self.metrics {
            self.report(&**metrics, &entry);
        }
    }
}

//! # accesslog
//!
//! Apache-style access logging for HTTP handlers.
//!
//! Wrap a handler in a [`middleware::Logger`] and every request it serves
//! produces one line in the layout you pick:
//!
//! ```text
//! 127.0.0.1 - - [16/Oct/2026:09:14:03 +0000] "GET /ping HTTP/1.1" 200 4 "" "curl/8.5.0"
//! GET /ping 200 4 - 0.091 ms
//! ```
//!
//! ## How it works
//!
//! Handlers write their response through a [`ResponseWriter`]. The logger
//! slips a [`middleware::ResponseObserver`] in between the handler and the
//! real writer; the observer forwards every call untouched while recording
//! the committed status and the number of bytes written. Once the handler
//! returns, the logger renders the line, appends it to a [`LogSink`], and
//! optionally reports `http.response` / `http.size` to a [`MetricsClient`].
//!
//! Logging is best-effort: a failing sink or metrics backend is reported
//! through `tracing` and never touches the response.
//!
//! What this crate leaves to others:
//!
//! - **Log rotation and persistence**: pass any [`LogSink`]; rotate with logrotate
//! - **Metrics transport**: install a `metrics` recorder (Prometheus, statsd, …)
//! - **The HTTP server**: hyper does the wire work, [`Server`] only adapts it
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::io::Write;
//! use accesslog::middleware::Logger;
//! use accesslog::{LogFormat, MetricsFacade, Request, ResponseWriter, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), accesslog::Error> {
//!     let app = Logger::new(ping, std::io::stdout(), "tiny".parse::<LogFormat>()?)
//!         .with_metrics(MetricsFacade);
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! fn ping(_req: &Request, res: &mut dyn ResponseWriter) {
//!     res.headers().insert("content-type", "text/plain".parse().unwrap());
//!     let _ = res.write_all(b"pong");
//! }
//! ```

mod config;
mod error;
mod format;
mod handler;
mod metrics;
mod request;
mod response;
mod server;
mod sink;

pub mod middleware;

pub use config::Config;
pub use error::Error;
pub use format::{Formatter, LogEntry, LogFormat};
pub use handler::{BoxedHandler, Handler};
pub use crate::metrics::{MetricsClient, MetricsFacade};
pub use request::Request;
pub use response::{ResponseBuffer, ResponseWriter};
pub use server::{Server, serve_listener};
pub use sink::LogSink;

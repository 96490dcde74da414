//! Middleware layer.
//!
//! Middleware is a [`Handler`](crate::Handler) that wraps another handler.
//! It sees the request before the inner handler does and can watch the
//! response on its way out by handing the inner handler a decorated
//! [`ResponseWriter`](crate::ResponseWriter) instead of the real one.
//!
//! Built-in middleware:
//! - [`Logger`] writes one access-log line per request (Apache combined,
//!   common, or one of the shorter layouts) and optionally reports
//!   `http.response` / `http.size` metrics.
//!
//! [`ResponseObserver`] is the decorator `Logger` is built on. Use it to
//! write other middleware that needs the final status or response size.

mod logger;
mod observer;

pub use logger::Logger;
pub use observer::ResponseObserver;

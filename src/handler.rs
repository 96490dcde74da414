//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! Middleware wraps handlers of *different* concrete types, and the server
//! holds whatever the outermost layer happens to be. Both store them behind a
//! trait object so the concrete type disappears at the boundary:
//!
//! ```text
//! fn ping(req: &Request, res: &mut dyn ResponseWriter) { … }  ← user writes this
//!        ↓ Logger::stdout(ping)
//! ping.into_boxed()                                        ← Handler blanket impl
//!        ↓
//! Arc::new(ping)  stored as BoxedHandler = Arc<dyn Handler>
//!        ↓
//! handler.serve(&req, &mut observer)  at request time      ← one vtable dispatch
//! ```
//!
//! Handlers are synchronous: they run to completion before `serve` returns,
//! which is what lets a middleware log the finished response right after the
//! inner call. The server runs them on tokio's blocking pool.

use std::sync::Arc;

use crate::request::Request;
use crate::response::ResponseWriter;

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// `Arc` gives cheap, thread-safe shared ownership (one atomic increment per
/// request) without copying the handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// Serves one request by writing a response.
///
/// Implemented automatically for every function or closure with the signature
///
/// ```text
/// fn name(req: &Request, res: &mut dyn ResponseWriter)
/// ```
///
/// and implemented by middleware such as [`Logger`](crate::middleware::Logger),
/// which is how layers compose.
pub trait Handler: Send + Sync + 'static {
    fn serve(&self, req: &Request, res: &mut dyn ResponseWriter);

    #[doc(hidden)]
    fn into_boxed(self) -> BoxedHandler
    where
        Self: Sized,
    {
        Arc::new(self)
    }
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut dyn ResponseWriter) + Send + Sync + 'static,
{
    fn serve(&self, req: &Request, res: &mut dyn ResponseWriter) {
        self(req, res)
    }
}

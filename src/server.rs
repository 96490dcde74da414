//! Hosting handlers on hyper, with graceful shutdown.
//!
//! hyper owns the wire: parsing, keep-alive, HTTP/1.1 vs HTTP/2. This module
//! only adapts each hyper request into a [`Request`] plus a
//! [`ResponseBuffer`], runs the handler, and hands the buffered response back.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or **SIGINT** (or the caller's own signal, see
//! [`Server::serve_with_shutdown`]) the server:
//! 1. stops accepting new connections;
//! 2. lets every in-flight connection task run to completion;
//! 3. returns from `serve`.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::{ResponseBuffer, ResponseWriter};

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// use accesslog::Server;
    ///
    /// assert!(Server::bind("0.0.0.0:3000").is_ok());
    /// assert!(Server::bind("localhost").is_err());
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr = addr.parse().map_err(|_| Error::InvalidAddr(addr.to_owned()))?;
        Ok(Self { addr })
    }

    /// Serves `handler` until SIGTERM or Ctrl-C, then drains in-flight
    /// connections and returns.
    pub async fn serve(self, handler: impl Handler) -> Result<(), Error> {
        self.serve_with_shutdown(handler, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops when `signal` resolves.
    pub async fn serve_with_shutdown(
        self,
        handler: impl Handler,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        serve_listener(listener, handler, signal).await
    }
}

/// Serves `handler` on an already-bound listener until `signal` resolves.
///
/// Useful when the port is chosen by the OS (`127.0.0.1:0`) and the caller
/// needs the address before the server starts.
pub async fn serve_listener(
    listener: TcpListener,
    handler: impl Handler,
    signal: impl Future<Output = ()>,
) -> Result<(), Error> {
    let handler = handler.into_boxed();
    let addr = listener.local_addr()?;

    info!(%addr, "accesslog listening");

    // Every spawned connection task, so shutdown can wait for them.
    let mut tasks = tokio::task::JoinSet::new();

    tokio::pin!(signal);

    loop {
        tokio::select! {
            // Check shutdown first so a signal stops accepting immediately,
            // even if more connections are queued.
            biased;

            () = &mut signal => {
                info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, remote_addr) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                let handler = Arc::clone(&handler);
                let io = TokioIo::new(stream);

                tasks.spawn(async move {
                    // Called once per request on the connection.
                    let svc = service_fn(move |req| dispatch(Arc::clone(&handler), req, remote_addr));

                    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                        .serve_connection(io, svc)
                        .await
                    {
                        error!(peer = %remote_addr, "connection error: {e}");
                    }
                });
            }

            // Reap finished tasks so the set does not grow without bound.
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    while tasks.join_next().await.is_some() {}

    info!("accesslog stopped");
    Ok(())
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Runs one request through the handler.
///
/// Never fails towards hyper: an unreadable body becomes `400`, a panicking
/// handler becomes `500`.
async fn dispatch(
    handler: BoxedHandler,
    req: hyper::Request<Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(peer = %remote_addr, "failed to read request body: {e}");
            return Ok(status_only(StatusCode::BAD_REQUEST));
        }
    };
    let req = Request::new(http::Request::from_parts(parts, body), remote_addr.to_string());

    // Handlers are synchronous; keep them off the reactor threads.
    let served = tokio::task::spawn_blocking(move || {
        let mut buf = ResponseBuffer::new();
        handler.serve(&req, &mut buf);
        buf
    })
    .await;

    match served {
        Ok(buf) => Ok(buf.into_response()),
        Err(e) => {
            error!(peer = %remote_addr, "handler failed: {e}");
            Ok(status_only(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

fn status_only(status: StatusCode) -> http::Response<Full<Bytes>> {
    let mut buf = ResponseBuffer::new();
    buf.write_header(status);
    buf.into_response()
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM (sent by Kubernetes and most supervisors)
/// or SIGINT. On Windows only Ctrl-C is available.
///
/// A signal that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_rejects_addresses_without_port() {
        assert!(matches!(Server::bind("0.0.0.0"), Err(Error::InvalidAddr(a)) if a == "0.0.0.0"));
    }

    #[test]
    fn status_only_has_empty_body() {
        let res = status_only(StatusCode::BAD_REQUEST);
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(res.headers().is_empty());
    }
}

//! Unified error type.

/// The error type returned by accesslog's fallible operations.
///
/// Logging itself never fails a request: sink and metrics failures are
/// reported through `tracing` and dropped. This type surfaces the things that
/// *should* stop a program: misconfiguration at construction time and
/// infrastructure failures while binding or accepting connections.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// A format selector that names none of the five known layouts.
    #[error("unknown log format `{0}`")]
    UnknownFormat(String),

    #[error("invalid socket address `{0}`")]
    InvalidAddr(String),

    /// Reported by [`MetricsClient`](crate::MetricsClient) implementations
    /// that talk to a fallible backend.
    #[error("metrics: {0}")]
    Metrics(String),
}

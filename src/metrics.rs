//! Metrics client capability.
//!
//! [`Logger`](crate::middleware::Logger) reports three measurements per
//! request through a [`MetricsClient`]:
//!
//! - `http.response` counter, incremented by one
//! - `http.size` gauge, set to the response size in bytes
//! - `http.response` timing, set to the elapsed duration
//!
//! each tagged `status:<code>` and `method:<verb>`.
//!
//! The trait is shaped after statsd clients (name, value, `key:value` tags).
//! [`MetricsFacade`] forwards to whatever recorder is installed for the
//! `metrics` crate, e.g. a Prometheus exporter; the transport is the
//! recorder's business.

use std::sync::Arc;
use std::time::Duration;

use ::metrics::Label;

use crate::error::Error;

/// Emits counters, gauges and timers.
///
/// Shared by every request a logger serves, so implementations must be
/// thread-safe. Errors are reported by the logger and otherwise ignored.
pub trait MetricsClient: Send + Sync {
    fn incr(&self, name: &str, tags: &[String]) -> Result<(), Error>;
    fn gauge(&self, name: &str, value: f64, tags: &[String]) -> Result<(), Error>;
    fn timing(&self, name: &str, value: Duration, tags: &[String]) -> Result<(), Error>;
}

impl<M: MetricsClient + ?Sized> MetricsClient for Arc<M> {
    fn incr(&self, name: &str, tags: &[String]) -> Result<(), Error> {
        (**self).incr(name, tags)
    }

    fn gauge(&self, name: &str, value: f64, tags: &[String]) -> Result<(), Error> {
        (**self).gauge(name, value, tags)
    }

    fn timing(&self, name: &str, value: Duration, tags: &[String]) -> Result<(), Error> {
        (**self).timing(name, value, tags)
    }
}

/// [`MetricsClient`] backed by the global `metrics` recorder.
///
/// Timings become histograms recorded in seconds. With no recorder installed
/// every call is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct MetricsFacade;

impl MetricsClient for MetricsFacade {
    fn incr(&self, name: &str, tags: &[String]) -> Result<(), Error> {
        ::metrics::counter!(name.to_owned(), labels(tags)).increment(1);
        Ok(())
    }

    fn gauge(&self, name: &str, value: f64, tags: &[String]) -> Result<(), Error> {
        ::metrics::gauge!(name.to_owned(), labels(tags)).set(value);
        Ok(())
    }

    fn timing(&self, name: &str, value: Duration, tags: &[String]) -> Result<(), Error> {
        ::metrics::histogram!(name.to_owned(), labels(tags)).record(value.as_secs_f64());
        Ok(())
    }
}

/// `status:200` becomes the label `status="200"`; a tag without a colon
/// becomes a label with an empty value.
fn labels(tags: &[String]) -> Vec<Label> {
    tags.iter()
        .map(|tag| match tag.split_once(':') {
            Some((key, value)) => Label::new(key.to_owned(), value.to_owned()),
            None => Label::new(tag.clone(), String::new()),
        })
        .collect()
}

//! Access-log line layouts.
//!
//! Five fixed layouts, each a single space-joined line:
//!
//! | Format | Layout |
//! |---|---|
//! | `Combined` | `:remote-addr - :remote-user [:date] ":method :url :proto" :status :size ":referrer" ":user-agent"` |
//! | `Common`   | `:remote-addr - :remote-user [:date] ":method :url :proto" :status :size` |
//! | `Dev`      | `:method :url :status :response-time ms - :size` |
//! | `Short`    | `:remote-addr :remote-user :method :url :proto :status :size - :response-time ms` |
//! | `Tiny`     | `:method :url :status :size - :response-time ms` |
//!
//! `:date` is Apache CLF (`10/Oct/2000:13:55:36 -0700`). `:response-time` is
//! milliseconds with three decimals.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};

use crate::error::Error;

/// Apache common-log-format timestamp.
const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// A pure line renderer. The newline is appended by the caller.
pub type Formatter = fn(&LogEntry<'_>) -> String;

// ── LogEntry ──────────────────────────────────────────────────────────────────

/// Everything any layout may print about one finished exchange.
///
/// Each layout uses a subset; the unused fields cost nothing since they all
/// borrow from the request.
#[derive(Clone, Debug)]
pub struct LogEntry<'a> {
    /// Host part of the peer address, `""` when unavailable.
    pub remote_ip: &'a str,
    /// URL user-info username, or `-`.
    pub username: &'a str,
    pub start: DateTime<FixedOffset>,
    pub method: &'a str,
    pub request_uri: &'a str,
    pub proto: &'a str,
    pub status: u16,
    pub size: usize,
    pub referer: &'a str,
    pub user_agent: &'a str,
    pub elapsed: Duration,
}

// ── LogFormat ─────────────────────────────────────────────────────────────────

/// Which layout a [`Logger`](crate::middleware::Logger) writes.
///
/// Raw selectors convert fallibly, so a misconfigured value is rejected up
/// front instead of silently falling back to some default:
///
/// ```rust
/// use accesslog::LogFormat;
///
/// assert_eq!("tiny".parse::<LogFormat>().unwrap(), LogFormat::Tiny);
/// assert_eq!(LogFormat::try_from(2u8).unwrap(), LogFormat::Dev);
/// assert!(LogFormat::try_from(5u8).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum LogFormat {
    /// Apache combined log output.
    #[default]
    Combined,
    /// Apache common log output.
    Common,
    /// Concise, for development.
    Dev,
    /// Shorter than common, includes response time.
    Short,
    /// Minimal output.
    Tiny,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Combined => "combined",
            Self::Common   => "common",
            Self::Dev      => "dev",
            Self::Short    => "short",
            Self::Tiny     => "tiny",
        }
    }

    /// The renderer for this layout.
    pub fn formatter(self) -> Formatter {
        match self {
            Self::Combined => combined,
            Self::Common   => common,
            Self::Dev      => dev,
            Self::Short    => short,
            Self::Tiny     => tiny,
        }
    }

    pub fn render(self, entry: &LogEntry<'_>) -> String {
        (self.formatter())(entry)
    }
}

impl TryFrom<u8> for LogFormat {
    type Error = Error;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        match selector {
            0 => Ok(Self::Combined),
            1 => Ok(Self::Common),
            2 => Ok(Self::Dev),
            3 => Ok(Self::Short),
            4 => Ok(Self::Tiny),
            n => Err(Error::UnknownFormat(n.to_string())),
        }
    }
}

/// Case-insensitive layout name.
impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Combined, Self::Common, Self::Dev, Self::Short, Self::Tiny]
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownFormat(s.to_owned()))
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Renderers ─────────────────────────────────────────────────────────────────

fn combined(e: &LogEntry<'_>) -> String {
    format!(
        "{} \"{}\" \"{}\"",
        common(e),
        e.referer,
        e.user_agent,
    )
}

fn common(e: &LogEntry<'_>) -> String {
    format!(
        "{} - {} [{}] \"{} {} {}\" {} {}",
        e.remote_ip,
        e.username,
        e.start.format(CLF_TIME),
        e.method,
        e.request_uri,
        e.proto,
        e.status,
        e.size,
    )
}

fn dev(e: &LogEntry<'_>) -> String {
    format!(
        "{} {} {} {} - {}",
        e.method,
        e.request_uri,
        e.status,
        response_time(e.elapsed),
        e.size,
    )
}

fn short(e: &LogEntry<'_>) -> String {
    format!(
        "{} {} {} {} {} {} {} - {}",
        e.remote_ip,
        e.username,
        e.method,
        e.request_uri,
        e.proto,
        e.status,
        e.size,
        response_time(e.elapsed),
    )
}

fn tiny(e: &LogEntry<'_>) -> String {
    format!(
        "{} {} {} {} - {}",
        e.method,
        e.request_uri,
        e.status,
        e.size,
        response_time(e.elapsed),
    )
}

fn response_time(elapsed: Duration) -> String {
    format!("{:.3} ms", elapsed.as_secs_f64() * 1e3)
}

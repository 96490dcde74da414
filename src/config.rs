//! Environment-driven configuration.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `ACCESSLOG_ADDR` | `0.0.0.0:3000` | listen address for [`Server::bind`](crate::Server::bind) |
//! | `ACCESSLOG_FORMAT` | `combined` | [`LogFormat`] name |
//!
//! An unknown format name is an error, not a fallback: a typo in a deploy
//! manifest should stop the process at startup.

use crate::error::Error;
use crate::format::LogFormat;

pub const ADDR_VAR: &str = "ACCESSLOG_ADDR";
pub const FORMAT_VAR: &str = "ACCESSLOG_FORMAT";

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub addr: String,
    pub format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key → value source. Empty values count as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let get = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());

        let format = match get(FORMAT_VAR) {
            Some(name) => name.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            addr: get(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_owned()),
            format,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { addr: DEFAULT_ADDR.to_owned(), format: LogFormat::default() }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])).unwrap(), Config::default());
    }

    #[test]
    fn reads_both_variables() {
        let config = Config::from_lookup(lookup(&[
            (ADDR_VAR, "127.0.0.1:8080"),
            (FORMAT_VAR, "Tiny"),
        ]))
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080");
        assert_eq!(config.format, LogFormat::Tiny);
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = Config::from_lookup(lookup(&[(FORMAT_VAR, "  ")])).unwrap();
        assert_eq!(config.format, LogFormat::Combined);
    }

    #[test]
    fn unknown_format_fails() {
        let err = Config::from_lookup(lookup(&[(FORMAT_VAR, "verbose")])).unwrap_err();
        assert!(matches!(err, Error::UnknownFormat(name) if name == "verbose"));
    }
}

use chrono::{Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

const TOKEN_FORMAT: &str = "%Y-%m-%d-%Hh-%Mmin-%Ssec";

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}-\d{2}h-\d{2}min-\d{2}sec$").unwrap());

static PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2}-\d{2}h-\d{2}min-\d{2}sec):\s*").unwrap());

/// A sampler timestamp token of the form `YYYY-MM-DD-HHh-MMmin-SSsec`.
///
/// The token is the identity: two timestamps are equal iff their string forms
/// are equal, and there is no sub-second resolution. The epoch-millisecond
/// view exists only for rate arithmetic.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Validates and wraps a token. Returns `None` for anything that does not
    /// match the fixed grammar.
    pub fn parse(token: &str) -> Option<Self> {
        if TOKEN_RE.is_match(token) {
            Some(Self(token.to_string()))
        } else {
            None
        }
    }

    /// The current wall-clock time rendered as a token, for live lines that
    /// arrive without a timestamp prefix.
    pub fn now() -> Self {
        Self(Local::now().format(TOKEN_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Epoch milliseconds for delta arithmetic. The token has no timezone, so
    /// it is interpreted as UTC; only differences between tokens matter.
    pub fn epoch_ms(&self) -> Option<i64> {
        let dt = NaiveDateTime::parse_from_str(&self.0, TOKEN_FORMAT).ok()?;
        Some(dt.and_utc().timestamp_millis())
    }

    /// Splits an optional `<token>: ` prefix off a line, returning the token
    /// (if present) and the remainder.
    pub fn split_prefix(line: &str) -> (Option<Timestamp>, &str) {
        match PREFIX_RE.captures(line) {
            Some(caps) => {
                let token = Self(caps[1].to_string());
                let rest = &line[caps.get(0).map(|m| m.end()).unwrap_or(0)..];
                (Some(token), rest)
            }
            None => (None, line),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

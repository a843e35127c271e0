//! Route keys: a pattern plus an HTTP verb or the `*` wildcard.

use axum::http::Method;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Verb a route answers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteVerb {
    /// `*`: any verb.
    Any,
    Method(Method),
}

/// A verb string that is neither `*` nor a valid HTTP method token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid HTTP verb '{0}'")]
pub struct InvalidVerb(pub String);

impl RouteVerb {
    /// Whether a request with `method` is served by this verb.
    pub fn matches(&self, method: &Method) -> bool {
        match self {
            RouteVerb::Any => true,
            RouteVerb::Method(m) => m == method,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, RouteVerb::Any)
    }
}

impl FromStr for RouteVerb {
    type Err = InvalidVerb;

    /// Verbs are normalized to upper case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "*" {
            return Ok(RouteVerb::Any);
        }
        if s.is_empty() {
            return Err(InvalidVerb(s.to_string()));
        }
        Method::from_bytes(s.to_ascii_uppercase().as_bytes())
            .map(RouteVerb::Method)
            .map_err(|_| InvalidVerb(s.to_string()))
    }
}

impl From<Method> for RouteVerb {
    fn from(method: Method) -> Self {
        RouteVerb::Method(method)
    }
}

impl fmt::Display for RouteVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteVerb::Any => f.write_str("*"),
            RouteVerb::Method(m) => f.write_str(m.as_str()),
        }
    }
}

/// A registered `(pattern, verb)` pair.
///
/// Derived equality is exact. `overlaps` is the wildcard-aware relation the
/// route table uses to reject colliding registrations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub pattern: String,
    pub verb: RouteVerb,
}

impl RouteKey {
    pub fn new(pattern: impl Into<String>, verb: RouteVerb) -> Self {
        Self {
            pattern: pattern.into(),
            verb,
        }
    }

    /// Same pattern, and verbs equal or either one is `*`.
    pub fn overlaps(&self, other: &RouteKey) -> bool {
        if self.pattern != other.pattern {
            return false;
        }
        match (&self.verb, &other.verb) {
            (RouteVerb::Any, _) | (_, RouteVerb::Any) => true,
            (RouteVerb::Method(a), RouteVerb::Method(b)) => a == b,
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.pattern)
    }
}

//! Domain types for the market dashboard with strong typing.
//!
//! Newtypes keep user ids and ticker symbols from being confused with the
//! plain integers and strings that arrive in form posts.

pub mod clock;
pub mod credentials;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use session::{SessionUser, UserProfile};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

/// Unique identifier for a registered user.
///
/// # Examples
///
/// ```rust
/// use marketdesk::domain::UserId;
///
/// let id = UserId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UserId(i32);

impl UserId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        debug_assert!(id >= 0, "UserId should be non-negative");
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for i32 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl Serialize for UserId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = i32::deserialize(deserializer)?;
        Ok(Self::new(id))
    }
}

/// A normalized ticker symbol: trimmed, upper-cased, 1-10 characters of
/// `A-Z`, `0-9`, `.`, `-` or `^`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("Symbol is required")]
    Empty,

    #[error("Invalid symbol '{0}': use 1-10 letters, digits, '.', '-' or '^'")]
    Invalid(String),
}

fn symbol_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z0-9.\-^]{1,10}$").expect("Invalid regex"))
}

impl Symbol {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl FromStr for Symbol {
    type Err = SymbolError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SymbolError::Empty);
        }

        let normalized = trimmed.to_ascii_uppercase();
        if !symbol_regex().is_match(&normalized) {
            return Err(SymbolError::Invalid(trimmed.to_string()));
        }

        Ok(Self(normalized))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_roundtrip() {
        let id = UserId::from(7);
        assert_eq!(i32::from(id), 7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
    }

    #[test]
    fn test_symbol_normalizes() {
        let sym: Symbol = "  aapl ".parse().unwrap();
        assert_eq!(sym.as_str(), "AAPL");

        let sym: Symbol = "brk.b".parse().unwrap();
        assert_eq!(sym.as_str(), "BRK.B");

        let sym: Symbol = "^gspc".parse().unwrap();
        assert_eq!(sym.as_str(), "^GSPC");
    }

    #[test]
    fn test_symbol_rejects_garbage() {
        assert_eq!("".parse::<Symbol>(), Err(SymbolError::Empty));
        assert_eq!("   ".parse::<Symbol>(), Err(SymbolError::Empty));
        assert!("AAPL; DROP".parse::<Symbol>().is_err());
        assert!("ABCDEFGHIJK".parse::<Symbol>().is_err());
    }
}

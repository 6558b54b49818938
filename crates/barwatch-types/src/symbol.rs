//! Ticker symbol identifier.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// An opaque, case-sensitive ticker symbol (e.g., "AAPL").
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol from anything string-like.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self(value.to_string())
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
    fn test_symbol_is_case_sensitive() {
        assert_ne!(Symbol::from("brk.a"), Symbol::from("BRK.A"));
    }

    #[test]
    fn test_symbol_display() {
        assert_eq!(Symbol::new("AAPL").to_string(), "AAPL");
    }

    #[test]
    fn test_symbol_serde_transparent() {
        let json = serde_json::to_string(&Symbol::from("MSFT")).unwrap();
        assert_eq!(json, "\"MSFT\"");
    }
}

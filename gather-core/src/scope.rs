//! Scopes naming the independent clustering domains.
//!
//! Each scope is clustered on its own; replacing the cluster set for one
//! scope never touches another.
//!
//! # Examples
//! ```
//! use gather_core::Scope;
//!
//! assert_eq!(Scope::Places.as_str(), "places");
//! assert_eq!(Scope::Venues.to_string(), "venues");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named category of locatable entities clustered independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// User-created places.
    Places,
    /// Partner-owned venues.
    Venues,
    /// Scheduled plans.
    Plans,
}

/// Error returned when parsing an unknown scope name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown scope '{0}'")]
pub struct ScopeParseError(String);

impl Scope {
    /// Return the scope as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Places => "places",
            Self::Venues => "venues",
            Self::Plans => "plans",
        }
    }

    /// Human-readable label prefix used when naming clusters.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Places => "Places",
            Self::Venues => "Venues",
            Self::Plans => "Plans",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scope {
    type Err = ScopeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "places" => Ok(Self::Places),
            "venues" => Ok(Self::Venues),
            "plans" => Ok(Self::Plans),
            other => Err(ScopeParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Scope::Plans.to_string(), Scope::Plans.as_str());
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(Scope::from_str("Venues"), Ok(Scope::Venues));
    }

    #[test]
    fn parsing_rejects_unknown() {
        let err = Scope::from_str("galaxies").expect_err("unknown scope should fail");
        assert!(err.to_string().contains("unknown scope"));
    }
}

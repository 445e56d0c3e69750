//! Theme selection.
//!
//! Two known variants plus a carrier for whatever else a persisted record
//! holds. Unknown values are kept verbatim so that loading and saving a record
//! never rewrites a theme the user (or another client) stored.

use serde::{Deserialize, Serialize};

// ============================================================================
// Theme
// ============================================================================

/// Display theme stored in the user's preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    Light,
    Dark,
    /// A stored value that is neither `light` nor `dark`.
    Other(String),
}

impl Theme {
    /// Parse a stored theme name. Matching is exact, so `"Dark"` is `Other`.
    pub fn from_str_name(s: &str) -> Self {
        match s {
            "light" => Self::Light,
            "dark" => Self::Dark,
            other => Self::Other(other.to_string()),
        }
    }

    /// Flip Light ↔ Dark. Unknown values are returned unchanged.
    pub fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
            Self::Other(raw) => Self::Other(raw.clone()),
        }
    }

    /// Stored name of the theme.
    pub fn name(&self) -> &str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Other(raw) => raw,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::Light
    }
}

impl From<String> for Theme {
    fn from(s: String) -> Self {
        Self::from_str_name(&s)
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        theme.name().to_string()
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Shared types for the houndify CLI.
//!
//! Kept in hound-core so the request/response shaping can be tested without
//! pulling in tokio, reqwest, or filesystem access.

use std::fmt;
use std::str::FromStr;

/// Application name; also the config directory and file stem.
pub const APP_NAME: &str = "houndify-cli";

/// Query sent when the user gives no words.
pub const DEFAULT_QUERY: &str = "what can you do?";

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Provider token for imperial units.
pub const TOKEN_US: &str = "US";
/// Provider token for metric units.
pub const TOKEN_METRIC: &str = "METRIC";

/// Local unit system preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnitPreference {
    #[default]
    Metric,
    Imperial,
}

impl UnitPreference {
    pub const ALL: [UnitPreference; 2] = [UnitPreference::Metric, UnitPreference::Imperial];

    pub fn as_str(self) -> &'static str {
        match self {
            UnitPreference::Metric => "metric",
            UnitPreference::Imperial => "imperial",
        }
    }

    /// Token the provider expects in `UnitPreference`.
    pub fn provider_token(self) -> &'static str {
        to_provider_token(self.as_str())
    }
}

impl fmt::Display for UnitPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit system name outside the recognized set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0} not supported; valid unit systems: metric, imperial")]
pub struct UnknownUnits(pub String);

impl FromStr for UnitPreference {
    type Err = UnknownUnits;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(UnitPreference::Metric),
            "imperial" => Ok(UnitPreference::Imperial),
            other => Err(UnknownUnits(other.to_string())),
        }
    }
}

/// Map a unit system name to the provider token.
///
/// Total: anything that is not `imperial` is metric. Validation happens when
/// the name is read from config or the command line, not here.
pub fn to_provider_token(units: &str) -> &'static str {
    match units {
        "imperial" => TOKEN_US,
        _ => TOKEN_METRIC,
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Approximate caller location from the geolocation lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationInfo {
    pub latitude: f64,
    pub longitude: f64,
    pub country_name: String,
}

// ---------------------------------------------------------------------------
// Pipeline toggles
// ---------------------------------------------------------------------------

/// Optional request enrichments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    /// Send `UnitPreference` in the request metadata.
    pub units: bool,
    /// Look up the caller's location before querying.
    pub geolocation: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            units: true,
            geolocation: false,
        }
    }
}

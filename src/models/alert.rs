//! Active hazard alerts

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Alert severity, declared from most to least severe so the derived
/// ordering is the ranking.
///
/// `Unknown` is a severity the service reported but we do not recognise
/// (including its literal "Unknown"); `Unspecified` means none was sent.
/// Both rank last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Severity {
    Extreme,
    Severe,
    Moderate,
    Minor,
    Unknown,
    #[default]
    Unspecified,
}

impl Severity {
    /// Position in the ranking, 0 is most severe
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Extreme => 0,
            Self::Severe => 1,
            Self::Moderate => 2,
            Self::Minor => 3,
            Self::Unknown | Self::Unspecified => 4,
        }
    }

    /// Severe enough to be promoted to the emergency banner
    #[must_use]
    pub fn is_emergency(self) -> bool {
        matches!(self, Self::Extreme | Self::Severe)
    }

    /// Upstream label; `None` when no severity was sent
    #[must_use]
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Extreme => Some("Extreme"),
            Self::Severe => Some("Severe"),
            Self::Moderate => Some("Moderate"),
            Self::Minor => Some("Minor"),
            Self::Unknown => Some("Unknown"),
            Self::Unspecified => None,
        }
    }
}

impl From<&str> for Severity {
    fn from(value: &str) -> Self {
        match value {
            "Extreme" => Self::Extreme,
            "Severe" => Self::Severe,
            "Moderate" => Self::Moderate,
            "Minor" => Self::Minor,
            _ => Self::Unknown,
        }
    }
}

impl From<Option<String>> for Severity {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map_or(Self::Unspecified, Self::from)
    }
}

impl From<Severity> for Option<String> {
    fn from(value: Severity) -> Self {
        value.label().map(str::to_string)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label().unwrap_or("Unspecified"))
    }
}

/// GeoJSON area an alert covers, as `[lon, lat]` rings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum AlertGeometry {
    Polygon(Vec<Vec<[f64; 2]>>),
    MultiPolygon(Vec<Vec<Vec<[f64; 2]>>>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Option<String>,
    pub event: String,
    #[serde(default)]
    pub severity: Severity,
    pub headline: Option<String>,
    #[serde(default)]
    pub description: String,
    pub instruction: Option<String>,
    pub area_desc: Option<String>,
    pub effective: DateTime<FixedOffset>,
    pub ends: Option<DateTime<FixedOffset>>,
    pub urgency: Option<String>,
    pub geometry: Option<AlertGeometry>,
}

impl Alert {
    /// Text for the banner: the headline, else the description
    #[must_use]
    pub fn banner_message(&self) -> &str {
        self.headline
            .as_deref()
            .filter(|h| !h.is_empty())
            .unwrap_or(&self.description)
    }

    /// Affected area, falling back to the queried place
    #[must_use]
    pub fn area_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.area_desc.as_deref().unwrap_or(fallback)
    }

    /// Expiry label; alerts without an end run until further notice
    #[must_use]
    pub fn expires_label(&self) -> String {
        self.ends.map_or_else(
            || "Until further notice".to_string(),
            |ends| ends.format("%a, %b %-d, %-I:%M %p").to_string(),
        )
    }
}

//! Alert triage
//!
//! Ranks active alerts by severity, picks the one alert worth an emergency
//! banner, and tags each alert with a display icon.

use crate::models::{Alert, Severity};
use serde::{Deserialize, Serialize};

/// Result of ranking a batch of alerts
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Triage {
    /// Most severe first; equal severities keep upstream order
    pub sorted: Vec<Alert>,
    /// Top alert, only when it is Extreme or Severe
    pub banner: Option<Alert>,
}

impl Triage {
    #[must_use]
    pub fn status(&self) -> AlertStatus {
        AlertStatus::of(&self.sorted, self.banner.as_ref())
    }
}

/// Overall hazard state for a place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// No active alerts at all
    AllClear,
    /// Alerts exist but none warrants the banner
    Advisory,
    /// The top alert is on the banner
    Emergency,
}

impl AlertStatus {
    #[must_use]
    pub fn of(alerts: &[Alert], banner: Option<&Alert>) -> Self {
        match (alerts.is_empty(), banner.is_some()) {
            (true, _) => Self::AllClear,
            (false, false) => Self::Advisory,
            (false, true) => Self::Emergency,
        }
    }
}

/// Sort alerts by severity and select the banner alert
#[must_use]
pub fn triage(alerts: Vec<Alert>) -> Triage {
    let mut sorted = alerts;
    // sort_by_key is stable
    sorted.sort_by_key(|alert| alert.severity.rank());

    let banner = sorted
        .first()
        .filter(|top| top.severity.is_emergency())
        .cloned();

    Triage { sorted, banner }
}

/// Display icon for an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertIcon {
    Tornado,
    Hurricane,
    Flood,
    Thunderstorm,
    Winter,
    Heat,
    Wind,
    Freeze,
    Fire,
    Dust,
    Generic,
}

impl AlertIcon {
    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Tornado => "🌪️",
            Self::Hurricane => "🌀",
            Self::Flood => "🌊",
            Self::Thunderstorm => "⛈️",
            Self::Winter => "❄️",
            Self::Heat | Self::Fire => "🔥",
            Self::Wind => "💨",
            Self::Freeze => "🧊",
            Self::Dust => "🌫️",
            Self::Generic => "⚠️",
        }
    }
}

/// Keyword rules, checked in order; the first rule with a hit wins, even
/// when a later rule would be more specific.
///
/// The winter rule sits ahead of the thunder/storm rule, which otherwise
/// comes first, so "Winter Storm Warning" reads as winter weather rather
/// than a thunderstorm. "Ice Storm Warning" still hits the storm rule. See
/// the icon-order entry in DESIGN.md.
const ICON_RULES: &[(&[&str], AlertIcon)] = &[
    (&["tornado"], AlertIcon::Tornado),
    (&["hurricane"], AlertIcon::Hurricane),
    (&["flood"], AlertIcon::Flood),
    (&["winter", "snow", "blizzard"], AlertIcon::Winter),
    (&["thunder", "storm"], AlertIcon::Thunderstorm),
    (&["heat"], AlertIcon::Heat),
    (&["wind"], AlertIcon::Wind),
    (&["freeze", "frost"], AlertIcon::Freeze),
    (&["fire"], AlertIcon::Fire),
    (&["dust"], AlertIcon::Dust),
];

/// Classify an alert event name, case-insensitively
#[must_use]
pub fn classify_icon(event: &str) -> AlertIcon {
    let event = event.to_lowercase();
    ICON_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| event.contains(k)))
        .map_or(AlertIcon::Generic, |(_, icon)| *icon)
}

impl Alert {
    #[must_use]
    pub fn icon(&self) -> AlertIcon {
        classify_icon(&self.event)
    }
}

impl Severity {
    /// Badge text shown next to an alert; "Alert" stands in only when
    /// no severity was sent
    #[must_use]
    pub fn badge(self) -> String {
        format!("{} WARNING", self.label().unwrap_or("Alert"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use rstest::rstest;

    fn alert(event: &str, severity: Severity) -> Alert {
        Alert {
            id: Some(format!("urn:test:{event}")),
            event: event.to_string(),
            severity,
            headline: Some(format!("{event} in effect")),
            description: String::new(),
            instruction: None,
            area_desc: None,
            effective: DateTime::parse_from_rfc3339("2026-10-18T10:00:00-04:00").unwrap(),
            ends: None,
            urgency: None,
            geometry: None,
        }
    }

    fn events(triage: &Triage) -> Vec<&str> {
        triage.sorted.iter().map(|a| a.event.as_str()).collect()
    }

    #[test]
    fn test_empty_is_all_clear() {
        let result = triage(Vec::new());
        assert!(result.sorted.is_empty());
        assert!(result.banner.is_none());
        assert_eq!(result.status(), AlertStatus::AllClear);
    }

    #[test]
    fn test_minor_only_is_advisory_not_all_clear() {
        let result = triage(vec![alert("Beach Hazards Statement", Severity::Minor)]);
        assert_eq!(result.sorted.len(), 1);
        assert!(result.banner.is_none());
        assert_eq!(result.status(), AlertStatus::Advisory);
    }

    #[test]
    fn test_extreme_promoted_over_moderate() {
        let result = triage(vec![
            alert("Wind Advisory", Severity::Moderate),
            alert("Tornado Warning", Severity::Extreme),
        ]);
        assert_eq!(events(&result), vec!["Tornado Warning", "Wind Advisory"]);
        assert_eq!(result.banner.as_ref().unwrap().event, "Tornado Warning");
        assert_eq!(result.status(), AlertStatus::Emergency);
    }

    #[test]
    fn test_severe_gets_banner() {
        let result = triage(vec![alert("Flood Warning", Severity::Severe)]);
        assert_eq!(result.banner.unwrap().severity, Severity::Severe);
    }

    #[test]
    fn test_many_moderate_no_banner() {
        let result = triage(vec![
            alert("Wind Advisory", Severity::Moderate),
            alert("Dense Fog Advisory", Severity::Moderate),
            alert("Frost Advisory", Severity::Minor),
        ]);
        assert!(result.banner.is_none());
    }

    #[test]
    fn test_sort_is_stable_with_unknown_last() {
        let result = triage(vec![
            alert("Special Weather Statement", Severity::Unknown),
            alert("Heat Advisory", Severity::Moderate),
            alert("Flood Watch", Severity::Severe),
            alert("Wind Advisory", Severity::Moderate),
            alert("Flash Flood Warning", Severity::Severe),
            alert("Rip Current Statement", Severity::Minor),
        ]);
        assert_eq!(
            events(&result),
            vec![
                "Flood Watch",
                "Flash Flood Warning",
                "Heat Advisory",
                "Wind Advisory",
                "Rip Current Statement",
                "Special Weather Statement",
            ]
        );
        let ranks: Vec<u8> = result.sorted.iter().map(|a| a.severity.rank()).collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[rstest]
    #[case("Tornado Warning", AlertIcon::Tornado)]
    #[case("Hurricane Watch", AlertIcon::Hurricane)]
    #[case("Flash Flood Warning", AlertIcon::Flood)]
    #[case("Severe Thunderstorm Warning", AlertIcon::Thunderstorm)]
    #[case("Blizzard Warning", AlertIcon::Winter)]
    #[case("Excessive Heat Warning", AlertIcon::Heat)]
    #[case("High Wind Warning", AlertIcon::Wind)]
    #[case("Hard Freeze Warning", AlertIcon::Freeze)]
    #[case("Red Flag Fire Weather Watch", AlertIcon::Fire)]
    #[case("Blowing Dust Advisory", AlertIcon::Dust)]
    #[case("Special Marine Warning", AlertIcon::Generic)]
    #[case("TORNADO EMERGENCY", AlertIcon::Tornado)]
    fn test_classify_icon(#[case] event: &str, #[case] expected: AlertIcon) {
        assert_eq!(classify_icon(event), expected);
    }

    #[test]
    fn test_classify_icon_first_match_wins() {
        // winter rule is listed before thunder/storm
        assert_eq!(classify_icon("Winter Storm Warning"), AlertIcon::Winter);
        assert_eq!(classify_icon("Ice Storm Warning"), AlertIcon::Thunderstorm);
        // "flood" is listed before "thunder"/"storm"
        assert_eq!(classify_icon("Storm Surge Flood Warning"), AlertIcon::Flood);
        // "winter" is listed before "wind"
        assert_eq!(classify_icon("Winter Weather Advisory"), AlertIcon::Winter);
        // "hurricane" beats "wind"
        assert_eq!(classify_icon("Hurricane Force Wind Warning"), AlertIcon::Hurricane);
        // "wind" is listed before "freeze"
        assert_eq!(classify_icon("Wind Chill Freeze Warning"), AlertIcon::Wind);
    }

    #[test]
    fn test_badge() {
        assert_eq!(Severity::Extreme.badge(), "Extreme WARNING");
        assert_eq!(Severity::Unknown.badge(), "Unknown WARNING");
        assert_eq!(Severity::Unspecified.badge(), "Alert WARNING");
    }
}

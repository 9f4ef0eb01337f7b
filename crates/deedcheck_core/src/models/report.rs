//! Analysis report returned by the verification service.
//!
//! The payload is kept exactly as the service sent it. Everything typed in
//! this module is a read-only view over it, and a view never rejects the
//! payload: a field with an unexpected shape simply reads as absent.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Report payload for one analyzed document.
///
/// Any JSON object is accepted. The progress controller only buffers it and
/// hands it to the host; serializing it gives back the same object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult {
    payload: Map<String, Value>,
}

impl AnalysisResult {
    pub fn from_payload(payload: Map<String, Value>) -> Self {
        Self { payload }
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn into_payload(self) -> Map<String, Value> {
        self.payload
    }

    /// Placeholder report used when the simulated sequence completes without
    /// a buffered result (demo runs).
    pub fn fallback() -> Self {
        let sample = serde_json::json!({
            "risk_score": 25,
            "issues": [{
                "title": "Sample analysis",
                "description": "This report was generated without contacting the analysis service.",
                "severity": "low"
            }],
            "recommendations": [
                "Upload a real registration document to get an actual risk assessment.",
                "Compare the owner name on the document with the other party's ID."
            ],
            "sample": true
        });
        match sample {
            Value::Object(payload) => Self::from_payload(payload),
            _ => Self::default(),
        }
    }

    /// Raw score as sent, if it is a number (or a numeric string).
    pub fn risk_score(&self) -> Option<f64> {
        let score: Option<f64> = match self.payload.get("risk_score")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        score.filter(|s| s.is_finite())
    }

    /// Score rounded and clamped to 0..=100 for display.
    pub fn display_score(&self) -> Option<u8> {
        self.risk_score()
            .map(|score| score.round().clamp(0.0, 100.0) as u8)
    }

    /// Risk band for the score.
    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.risk_score().map(RiskLevel::from_score)
    }

    /// Findings, in payload order. Bare strings read as titles.
    pub fn issues(&self) -> Vec<Issue<'_>> {
        let Some(Value::Array(items)) = self.payload.get("issues") else {
            return Vec::new();
        };
        items.iter().filter_map(Issue::from_value).collect()
    }

    /// Recommendations, in payload order. Non-string entries are shown as
    /// JSON.
    pub fn recommendations(&self) -> Vec<Cow<'_, str>> {
        let Some(Value::Array(items)) = self.payload.get("recommendations") else {
            return Vec::new();
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Cow::Borrowed(s.as_str()),
                other => Cow::Owned(other.to_string()),
            })
            .collect()
    }

    pub fn analyzed_at(&self) -> Option<AnalyzedAt<'_>> {
        match self.payload.get("analyzed_at")? {
            Value::String(raw) => Some(AnalyzedAt::parse(raw)),
            _ => None,
        }
    }

    /// Whether this is the placeholder from [`AnalysisResult::fallback`].
    pub fn is_sample(&self) -> bool {
        matches!(self.payload.get("sample"), Some(Value::Bool(true)))
    }
}

/// One finding, borrowed from the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub severity: Option<Severity>,
    /// The issue object as sent, unknown fields included.
    pub raw: &'a Value,
}

impl<'a> Issue<'a> {
    fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::String(title) => Some(Self {
                title: title.as_str(),
                description: None,
                severity: None,
                raw: value,
            }),
            Value::Object(fields) => Some(Self {
                title: fields.get("title").and_then(Value::as_str).unwrap_or("Untitled finding"),
                description: fields
                    .get("description")
                    .and_then(Value::as_str)
                    .filter(|d| !d.is_empty()),
                severity: fields
                    .get("severity")
                    .and_then(Value::as_str)
                    .map(Severity::from_label),
                raw: value,
            }),
            _ => None,
        }
    }
}

/// How serious a finding is. Labels outside the known three are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Low,
    Medium,
    High,
    Other(String),
}

impl Severity {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            _ => Severity::Other(label.to_string()),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Other(label) => write!(f, "{}", label),
        }
    }
}

/// Report timestamp as far as it could be understood.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzedAt<'a> {
    /// RFC 3339 with an offset; the offset is kept.
    Zoned(DateTime<FixedOffset>),
    /// Date and time without a zone.
    Local(NaiveDateTime),
    /// Anything else, shown as sent.
    Raw(&'a str),
}

impl<'a> AnalyzedAt<'a> {
    fn parse(raw: &'a str) -> Self {
        if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
            return AnalyzedAt::Zoned(zoned);
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(AnalyzedAt::Local)
            .unwrap_or(AnalyzedAt::Raw(raw))
    }
}

impl fmt::Display for AnalyzedAt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzedAt::Zoned(at) => write!(f, "{}", at.format("%Y-%m-%d %H:%M %:z")),
            AnalyzedAt::Local(at) => write!(f, "{}", at.format("%Y-%m-%d %H:%M")),
            AnalyzedAt::Raw(raw) => write!(f, "{}", raw),
        }
    }
}

/// Risk band derived from the score. Lower is safer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Score below 30.
    Low,
    /// Score from 30 up to 70.
    Medium,
    /// Score of 70 or more.
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 30.0 {
            RiskLevel::Low
        } else if score < 70.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    /// Short guidance line for the band.
    pub fn guidance(self) -> &'static str {
        match self {
            RiskLevel::Low => "No significant risk indicators were found.",
            RiskLevel::Medium => "Some entries need a closer look before you sign.",
            RiskLevel::High => "Serious risk indicators were found. Get professional advice before proceeding.",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IRREGULAR_PAYLOAD: &str = r#"{
        "risk_score": 64.5,
        "analyzed_at": "2024-05-01T10:00:00",
        "issues": [
            {"title": "Senior lien", "severity": "critical"},
            {"title": "Trust deed", "page": 3, "evidence": "line 12"}
        ],
        "recommendations": ["Confirm lien release"],
        "request_id": "abc-123"
    }"#;

    #[test]
    fn irregular_payload_survives_unchanged() {
        let original: Value = serde_json::from_str(IRREGULAR_PAYLOAD).unwrap();
        let result: AnalysisResult = serde_json::from_str(IRREGULAR_PAYLOAD).unwrap();

        assert_eq!(serde_json::to_value(&result).unwrap(), original);

        // The issue without description or severity gains nothing
        let trust_deed = &serde_json::to_value(&result).unwrap()["issues"][1];
        assert!(trust_deed.get("description").is_none());
        assert!(trust_deed.get("severity").is_none());
        assert_eq!(trust_deed["page"], Value::from(3));
    }

    #[test]
    fn irregular_payload_still_reads() {
        let result: AnalysisResult = serde_json::from_str(IRREGULAR_PAYLOAD).unwrap();

        assert_eq!(result.risk_score(), Some(64.5));
        assert_eq!(result.display_score(), Some(65));
        assert_eq!(result.risk_level(), Some(RiskLevel::Medium));

        let issues = result.issues();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Some(Severity::Other("critical".to_string())));
        assert_eq!(issues[1].title, "Trust deed");
        assert_eq!(issues[1].severity, None);
        assert_eq!(issues[1].raw["evidence"], Value::from("line 12"));

        match result.analyzed_at() {
            Some(at @ AnalyzedAt::Local(_)) => assert_eq!(at.to_string(), "2024-05-01 10:00"),
            other => panic!("unexpected timestamp: {:?}", other),
        }
    }

    #[test]
    fn zoned_timestamp_keeps_its_offset() {
        let result: AnalysisResult =
            serde_json::from_str(r#"{"analyzed_at": "2024-05-01T10:00:00+09:00"}"#).unwrap();
        assert_eq!(result.analyzed_at().unwrap().to_string(), "2024-05-01 10:00 +09:00");

        let odd: AnalysisResult = serde_json::from_str(r#"{"analyzed_at": "yesterday"}"#).unwrap();
        assert_eq!(odd.analyzed_at(), Some(AnalyzedAt::Raw("yesterday")));
    }

    #[test]
    fn out_of_range_score_is_clamped_for_display_only() {
        let result: AnalysisResult = serde_json::from_str(r#"{"risk_score": 140}"#).unwrap();
        assert_eq!(result.display_score(), Some(100));
        assert_eq!(result.risk_level(), Some(RiskLevel::High));
        assert_eq!(serde_json::to_value(&result).unwrap()["risk_score"], Value::from(140));
    }

    #[test]
    fn missing_or_malformed_fields_read_as_absent() {
        let result: AnalysisResult =
            serde_json::from_str(r#"{"risk_score": "n/a", "issues": {"not": "a list"}}"#).unwrap();
        assert_eq!(result.risk_score(), None);
        assert_eq!(result.risk_level(), None);
        assert!(result.issues().is_empty());
        assert!(result.recommendations().is_empty());
        assert!(result.analyzed_at().is_none());
        assert!(!result.is_sample());
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(serde_json::from_str::<AnalysisResult>("[1, 2, 3]").is_err());
    }

    #[test]
    fn risk_level_bands() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(29.9), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(30.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(69.5), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(70.0), RiskLevel::High);
    }

    #[test]
    fn fallback_is_marked_as_sample() {
        let result = AnalysisResult::fallback();
        assert!(result.is_sample());
        assert_eq!(result.risk_level(), Some(RiskLevel::Low));
        assert_eq!(result.issues()[0].severity, Some(Severity::Low));
    }
}

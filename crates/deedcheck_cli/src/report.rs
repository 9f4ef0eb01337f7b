//! Plain-text rendering of an analysis report.

use std::io::{self, Write};

use deedcheck_core::models::AnalysisResult;

pub fn print_report(result: &AnalysisResult, out: &mut impl Write) -> io::Result<()> {
    if result.is_sample() {
        writeln!(out, "(sample report, no document was analyzed)")?;
    }
    match (result.display_score(), result.risk_level()) {
        (Some(score), Some(level)) => {
            writeln!(out, "Risk score: {}/100 ({} risk)", score, level)?;
            writeln!(out, "{}", level.guidance())?;
        }
        _ => writeln!(out, "Risk score: unavailable")?,
    }

    if let Some(at) = result.analyzed_at() {
        writeln!(out, "Analyzed at: {}", at)?;
    }

    let issues = result.issues();
    writeln!(out)?;
    if issues.is_empty() {
        writeln!(out, "Issues: none")?;
    } else {
        writeln!(out, "Issues:")?;
        for issue in &issues {
            match &issue.severity {
                Some(severity) => writeln!(out, "  [{}] {}", severity, issue.title)?,
                None => writeln!(out, "  [unrated] {}", issue.title)?,
            }
            if let Some(description) = issue.description {
                writeln!(out, "      {}", description)?;
            }
        }
    }

    let recommendations = result.recommendations();
    if !recommendations.is_empty() {
        writeln!(out)?;
        writeln!(out, "Recommendations:")?;
        for (i, recommendation) in recommendations.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, recommendation)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(result: &AnalysisResult) -> String {
        let mut out = Vec::new();
        print_report(result, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn report(value: serde_json::Value) -> AnalysisResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn prints_issues_and_recommendations() {
        let result = report(json!({
            "risk_score": 75,
            "issues": [{
                "title": "Provisional seizure",
                "description": "Registered by a creditor",
                "severity": "high"
            }],
            "recommendations": ["Ask for the seizure to be lifted"]
        }));

        let text = render(&result);
        assert!(text.contains("Risk score: 75/100 (High risk)"));
        assert!(text.contains("[high] Provisional seizure"));
        assert!(text.contains("Registered by a creditor"));
        assert!(text.contains("1. Ask for the seizure to be lifted"));
        assert!(!text.contains("sample report"));
    }

    #[test]
    fn prints_unusual_values_as_sent() {
        let result = report(json!({
            "risk_score": 64.5,
            "analyzed_at": "2024-05-01T10:00:00",
            "issues": [
                {"title": "Lis pendens", "severity": "critical"},
                {"title": "Old easement"}
            ]
        }));

        let text = render(&result);
        assert!(text.contains("Risk score: 65/100 (Medium risk)"));
        assert!(text.contains("Analyzed at: 2024-05-01 10:00"));
        assert!(text.contains("[critical] Lis pendens"));
        assert!(text.contains("[unrated] Old easement"));
    }

    #[test]
    fn missing_score_is_reported_as_unavailable() {
        let text = render(&report(json!({"issues": []})));
        assert!(text.contains("Risk score: unavailable"));
        assert!(text.contains("Issues: none"));
    }

    #[test]
    fn marks_sample_report() {
        let text = render(&AnalysisResult::fallback());
        assert!(text.starts_with("(sample report"));
    }
}

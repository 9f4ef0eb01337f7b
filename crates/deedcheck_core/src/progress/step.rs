//! The fixed set of analysis steps shown while a document is processed.

use serde::{Deserialize, Serialize};

/// One phase of the analysis sequence.
///
/// The set is closed and ordered: upload, extract, analyze, generate.
/// Only `Upload` follows real progress; the other three are simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStep {
    Upload,
    Extract,
    Analyze,
    Generate,
}

impl AnalysisStep {
    /// All steps in display order.
    pub const ALL: [AnalysisStep; 4] = [
        AnalysisStep::Upload,
        AnalysisStep::Extract,
        AnalysisStep::Analyze,
        AnalysisStep::Generate,
    ];

    /// Number of steps in the sequence.
    pub const COUNT: usize = Self::ALL.len();

    /// Look up a step by its position in the sequence.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Position of this step in the sequence (0-based).
    pub fn index(self) -> usize {
        match self {
            AnalysisStep::Upload => 0,
            AnalysisStep::Extract => 1,
            AnalysisStep::Analyze => 2,
            AnalysisStep::Generate => 3,
        }
    }

    /// The step that follows this one, or `None` for the last step.
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// Whether this is the final step of the sequence.
    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    /// Short title shown next to the progress indicator.
    pub fn title(self) -> &'static str {
        match self {
            AnalysisStep::Upload => "Uploading document",
            AnalysisStep::Extract => "Extracting text",
            AnalysisStep::Analyze => "Analyzing risk factors",
            AnalysisStep::Generate => "Generating report",
        }
    }

    /// One-line description of what happens during the step.
    pub fn description(self) -> &'static str {
        match self {
            AnalysisStep::Upload => "Sending the registration document to the analysis service",
            AnalysisStep::Extract => "Reading ownership, rights and encumbrance entries",
            AnalysisStep::Analyze => "Checking the entries for fraud-risk indicators",
            AnalysisStep::Generate => "Preparing the risk score and recommendations",
        }
    }

    /// Nominal duration in seconds, used only for simulated timing.
    pub fn nominal_secs(self) -> f64 {
        match self {
            AnalysisStep::Upload => 3.0,
            AnalysisStep::Extract => 5.0,
            AnalysisStep::Analyze => 8.0,
            AnalysisStep::Generate => 4.0,
        }
    }
}

impl std::fmt::Display for AnalysisStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisStep::Upload => write!(f, "upload"),
            AnalysisStep::Extract => write!(f, "extract"),
            AnalysisStep::Analyze => write!(f, "analyze"),
            AnalysisStep::Generate => write!(f, "generate"),
        }
    }
}

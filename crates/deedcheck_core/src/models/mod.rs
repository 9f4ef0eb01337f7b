//! Data models shared across the crate.
//!
//! - [`DocumentFile`]: the document selected for upload
//! - [`AnalysisResult`]: the report returned by the analysis service

mod document;
mod report;

pub use document::{DocumentError, DocumentFile};
pub use report::{AnalysisResult, AnalyzedAt, Issue, RiskLevel, Severity};

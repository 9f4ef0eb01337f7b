//! The analysis call: upload a document, receive a report.
//!
//! [`AnalysisClient`] is the seam between the session driver and the
//! network. [`HttpAnalysisClient`] talks to the real service; tests plug in
//! their own implementations.

mod errors;
mod http;

use std::future::Future;
use std::sync::Arc;

use crate::models::{AnalysisResult, DocumentFile};

pub use errors::{ClientError, ClientResult};
pub use http::{upload_percent, HttpAnalysisClient, ANALYZE_PATH, UPLOAD_CHUNK_SIZE};

/// Upload progress callback. Receives a percentage from 0 to 100.
pub type UploadProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// Something that can analyze a document.
///
/// Implementations report upload progress through `on_upload_progress` and
/// resolve once the service has produced a report or failed.
pub trait AnalysisClient: Send + Sync + 'static {
    fn analyze(
        &self,
        file: &DocumentFile,
        model: &str,
        on_upload_progress: UploadProgressFn,
    ) -> impl Future<Output = ClientResult<AnalysisResult>> + Send;
}

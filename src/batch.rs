//! Batch analysis across the rayon thread pool
//!
//! Each request is analyzed independently; there is no shared state, so
//! results are identical to calling [`AnalyzeRequest::analyze`] in a loop.

use rayon::prelude::*;

use crate::experiment::AnalysisResult;
use crate::request::AnalyzeRequest;
use crate::Result;

/// Analyze every request in parallel, preserving input order.
///
/// One failing request does not affect the others.
#[must_use]
pub fn analyze_many(requests: &[AnalyzeRequest]) -> Vec<Result<AnalysisResult>> {
    let results: Vec<Result<AnalysisResult>> =
        requests.par_iter().map(AnalyzeRequest::analyze).collect();
    tracing::debug!(
        requests = requests.len(),
        failed = results.iter().filter(|r| r.is_err()).count(),
        "batch analysis complete"
    );
    results
}

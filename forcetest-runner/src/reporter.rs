//! Rendering a test-run result to the host's surfaces.

use crate::{
    correlate,
    coverage::CoverageMap,
    errors::CorrelationMiss,
    surfaces::{Diagnostic, DocumentId, EditorSurfaces, RunStatus},
};
use forcetest_metadata::TestRunResult;
use indexmap::IndexMap;
use tracing::debug;

/// Banner line opening the failure section of a report.
pub const FAILURE_BANNER_OPEN: &str = "=========================================================   TEST FAILURES   ==========================================================";

/// Banner line closing the failure section of a report.
pub const FAILURE_BANNER_CLOSE: &str = "=======================================================================================================================================";

/// What a report pass produced beyond its side effects.
///
/// Correlation misses are observable here rather than silently dropped; they
/// never affect the run's status.
#[derive(Debug, Default)]
pub struct ReportOutcome {
    /// The number of diagnostics attached to open documents.
    pub diagnostics_attached: usize,

    /// Coverage warnings that could not be matched to any open document, in
    /// warning order.
    pub misses: Vec<CorrelationMiss>,
}

/// Renders `result` to the report surface, records coverage, correlates
/// warnings to open documents, and sets the final run status.
///
/// Assumes its input is well-formed (collections present, possibly empty) and
/// generates no errors of its own. The report surface is cleared and
/// rewritten from scratch on every pass.
pub fn report(
    result: &TestRunResult,
    coverage: &CoverageMap,
    surfaces: &EditorSurfaces,
) -> ReportOutcome {
    let mut outcome = ReportOutcome::default();

    surfaces.report.clear();

    if !result.failures.is_empty() {
        surfaces.report.append_line(FAILURE_BANNER_OPEN);
    }
    for failure in &result.failures {
        surfaces
            .report
            .append_line(&format!("FAILED: {}\n{}", failure.stack_trace, failure.message));
    }
    if !result.failures.is_empty() {
        surfaces.report.append_line(FAILURE_BANNER_CLOSE);
    }

    for success in &result.successes {
        surfaces.report.append_line(&format!(
            "SUCCESS: {}:{} - in {}ms",
            success.name, success.method_name, success.time
        ));
    }

    for record in &result.code_coverage {
        coverage.record(record.clone());
    }

    // One fresh diagnostic collection per document per pass: warnings that
    // land on the same document accumulate within the pass, and the final
    // replace drops anything attached by earlier passes.
    let mut per_document: IndexMap<DocumentId, Vec<Diagnostic>> = IndexMap::new();
    for warning in &result.code_coverage_warnings {
        match correlate::correlate(warning, coverage, surfaces.documents.as_ref()) {
            Ok(attached) => {
                per_document
                    .entry(attached.document)
                    .or_default()
                    .push(attached.diagnostic);
            }
            Err(miss) => {
                debug!(%miss, "coverage warning not correlated");
                outcome.misses.push(miss);
            }
        }
    }
    for (document, diagnostics) in per_document {
        outcome.diagnostics_attached += diagnostics.len();
        surfaces.diagnostics.replace(&document, diagnostics);
    }

    surfaces.report.show();

    let status = if result.all_passed() {
        RunStatus::AllPassed
    } else {
        RunStatus::SomeFailed
    };
    surfaces.status.set_status(status);

    outcome
}

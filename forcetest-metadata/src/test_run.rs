use serde::{Deserialize, Serialize};

/// A request to execute unit tests for a single artifact.
///
/// The method list may be empty; the service decides what an empty submission
/// means, and this side does not special-case it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunRequest {
    /// The artifact's opaque remote identifier.
    pub artifact_id: String,

    /// The names of the methods to run, in symbol-table order.
    pub method_names: Vec<String>,
}

/// The structured result of a remote test run.
///
/// Every collection here defaults to empty: the service omits fields it has
/// nothing to report under, and consumers must not assume non-emptiness.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunResult {
    /// Failed test methods, in execution order.
    #[serde(default)]
    pub failures: Vec<TestFailure>,

    /// Passing test methods, in execution order.
    #[serde(default)]
    pub successes: Vec<TestSuccess>,

    /// Per-artifact coverage measurements for this run.
    #[serde(default)]
    pub code_coverage: Vec<CoverageRecord>,

    /// Coverage warnings emitted by the service.
    #[serde(default)]
    pub code_coverage_warnings: Vec<CoverageWarning>,

    /// The identifier of the execution log produced by this run. Empty when
    /// the service did not produce one.
    #[serde(default)]
    pub apex_log_id: String,
}

impl TestRunResult {
    /// Returns true if no test in the run failed.
    ///
    /// A run with zero tests also counts as passed; the two cases are not
    /// distinguished.
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A single test failure.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFailure {
    /// The stack trace reported by the service.
    #[serde(default)]
    pub stack_trace: String,

    /// The failure message.
    #[serde(default)]
    pub message: String,
}

/// A single passing test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuccess {
    /// The name of the containing artifact.
    #[serde(default)]
    pub name: String,

    /// The test method name.
    #[serde(default)]
    pub method_name: String,

    /// Execution time in milliseconds.
    #[serde(default)]
    pub time: f64,
}

/// A per-artifact coverage measurement.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRecord {
    /// The covered artifact's remote identifier.
    pub id: String,

    /// The covered artifact's name. Used to correlate coverage warnings back
    /// to open documents.
    #[serde(default)]
    pub name: String,

    /// The namespace the artifact lives under, if any.
    #[serde(default)]
    pub namespace: Option<String>,

    /// Total number of coverable locations.
    #[serde(default)]
    pub num_locations: u64,

    /// Number of locations the run did not cover.
    #[serde(default)]
    pub num_locations_not_covered: u64,
}

/// A coverage warning tied to a coverage record, not a hard failure.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageWarning {
    /// The remote identifier of the artifact the warning is about.
    pub id: String,

    /// The warning text.
    #[serde(default)]
    pub message: String,
}

//! Fetching and displaying execution logs.

use crate::{
    client::ToolingClient,
    config::ForcetestConfig,
    errors::LogRetrieveError,
    surfaces::LogDisplay,
};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;

/// Directory under the workspace root where execution logs are placed.
pub const LOG_DIR: &str = ".logs";

/// The fallback debug-filter pattern when the configured one is empty.
pub const DEFAULT_DEBUG_FILTER: &str = "USER_DEBUG";

/// The deterministic target path for a log: `{root}/.logs/{log_id}.log`.
pub fn log_file_path(workspace_root: &Utf8Path, log_id: &str) -> Utf8PathBuf {
    workspace_root.join(LOG_DIR).join(format!("{log_id}.log"))
}

/// Keeps only the lines of `body` matching `pattern`, preserving order.
pub fn filter_debug_lines(body: &str, pattern: &Regex) -> String {
    body.lines()
        .filter(|line| pattern.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fetches the execution log with the given id and displays it at its
/// deterministic path, filtered to debug lines if so configured.
///
/// The caller gates this on `show_test_log` and runs it detached from the
/// main pipeline; errors returned here are logged, never routed to the run's
/// terminal handler.
pub async fn retrieve_log(
    client: &dyn ToolingClient,
    config: &ForcetestConfig,
    display: &dyn LogDisplay,
    workspace_root: &Utf8Path,
    log_id: &str,
) -> Result<(), LogRetrieveError> {
    let body = client
        .fetch_log_body(log_id)
        .await
        .map_err(|error| LogRetrieveError::Fetch {
            log_id: log_id.to_owned(),
            error,
        })?;

    let contents = if config.debug_only {
        let pattern = if config.debug_filter.is_empty() {
            DEFAULT_DEBUG_FILTER
        } else {
            &config.debug_filter
        };
        let pattern = Regex::new(pattern).map_err(|error| LogRetrieveError::Pattern {
            pattern: pattern.to_owned(),
            error,
        })?;
        filter_debug_lines(&body, &pattern)
    } else {
        body
    };

    let path = log_file_path(workspace_root, log_id);
    display
        .show_and_replace(&path, &contents)
        .map_err(|error| LogRetrieveError::Display { path, error })
}

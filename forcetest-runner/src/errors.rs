//! Errors produced by forcetest.

use camino::Utf8PathBuf;
use config::ConfigError;
use std::{fmt, io};
use thiserror::Error;

/// An error that occurred while parsing the forcetest config.
#[derive(Debug, Error)]
#[error("failed to parse forcetest config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    err: ConfigError,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, err: ConfigError) -> Self {
        Self {
            config_file: config_file.into(),
            err,
        }
    }
}

/// An artifact was resolved (or not resolved at all) without a usable symbol
/// table, so no test methods can be derived for it.
///
/// This is a terminal failure for the run. It is deliberately the same
/// failure shape whether the registry returned no record or returned a record
/// with no attached symbol metadata.
#[derive(Clone, Debug, Error)]
#[error("no symbol table available for `{artifact_name}`")]
pub struct MissingSymbolTableError {
    artifact_name: String,
}

impl MissingSymbolTableError {
    /// Creates a new error for the given artifact name.
    pub fn new(artifact_name: impl Into<String>) -> Self {
        Self {
            artifact_name: artifact_name.into(),
        }
    }

    /// The name of the artifact the symbol table was missing for.
    pub fn artifact_name(&self) -> &str {
        &self.artifact_name
    }
}

/// An error that occurred during one of the remote tooling-API calls.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteCallError {
    /// The underlying HTTP transport failed.
    #[error("request to `{endpoint}` failed")]
    Transport {
        /// The endpoint path the request was sent to.
        endpoint: String,

        /// The underlying error.
        #[source]
        error: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("`{endpoint}` returned HTTP {status}")]
    UnexpectedStatus {
        /// The endpoint path the request was sent to.
        endpoint: String,

        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("failed to decode response from `{endpoint}`")]
    Decode {
        /// The endpoint path the request was sent to.
        endpoint: String,

        /// The underlying error.
        #[source]
        error: reqwest::Error,
    },
}

/// An error that occurred while driving a test run through the remote
/// pipeline.
///
/// All variants abort the run and route to the single terminal handler; no
/// reporting side effects happen after one of these is produced.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TestRunError {
    /// Querying the artifact registry failed.
    #[error("looking up artifact `{artifact_name}` failed")]
    ArtifactLookup {
        /// The artifact name that was being resolved.
        artifact_name: String,

        /// The underlying error.
        #[source]
        error: RemoteCallError,
    },

    /// No test methods could be derived for the artifact.
    #[error(transparent)]
    MissingSymbolTable(#[from] MissingSymbolTableError),

    /// Submitting the run to the test-execution endpoint failed.
    #[error("submitting test run for artifact `{artifact_id}` failed")]
    Submit {
        /// The remote identifier the run was submitted for.
        artifact_id: String,

        /// The underlying error.
        #[source]
        error: RemoteCallError,
    },
}

/// An error that occurred while retrieving or displaying an execution log.
///
/// Log retrieval is best-effort: these errors are logged by the detached
/// retrieval task and never reach the pipeline's terminal handler, so a
/// log-fetch failure cannot be mistaken for a test-run failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LogRetrieveError {
    /// Fetching the log body failed.
    #[error("fetching execution log `{log_id}` failed")]
    Fetch {
        /// The log identifier that was being fetched.
        log_id: String,

        /// The underlying error.
        #[source]
        error: RemoteCallError,
    },

    /// The configured debug filter is not a valid regex.
    #[error("invalid debug filter pattern `{pattern}`")]
    Pattern {
        /// The pattern as configured.
        pattern: String,

        /// The underlying error.
        #[source]
        error: regex::Error,
    },

    /// The host's log display surface failed to open or write the document.
    #[error("displaying log at `{path}` failed")]
    Display {
        /// The target path of the log document.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },
}

/// A coverage warning could not be correlated to any open document.
///
/// Non-fatal: the run's status is unaffected. Misses are collected into the
/// report outcome instead of being silently dropped, so callers can surface
/// them if they choose to.
#[derive(Clone, Debug)]
pub struct CorrelationMiss {
    artifact_id: String,
    subject: Option<String>,
    message: String,
}

impl CorrelationMiss {
    pub(crate) fn new(
        artifact_id: impl Into<String>,
        subject: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            subject,
            message: message.into(),
        }
    }

    /// The remote identifier of the artifact the warning referred to.
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// The artifact name the correlator searched for, if a coverage entry
    /// supplied one.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// The original warning message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CorrelationMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subject {
            Some(subject) => write!(
                f,
                "no open document matches `{subject}` for coverage warning: {}",
                self.message
            ),
            None => write!(
                f,
                "no coverage entry for artifact `{}` for coverage warning: {}",
                self.artifact_id, self.message
            ),
        }
    }
}

//! The client side of the platform tooling API.
//!
//! The orchestration pipeline only ever sees the [`ToolingClient`] trait;
//! [`HttpToolingClient`] is the production implementation against an
//! already-authenticated endpoint. Tests drive the pipeline with in-memory
//! implementations instead.

use crate::errors::RemoteCallError;
use async_trait::async_trait;
use forcetest_metadata::{ArtifactKind, ArtifactRecord, TestRunRequest, TestRunResult};
use serde::Deserialize;
use tracing::debug;

/// Access to the three remote endpoints a test run touches: the artifact
/// registry, the test-execution endpoint, and the execution-log store.
#[async_trait]
pub trait ToolingClient: Send + Sync {
    /// Queries the artifact registry for an artifact matching the given name
    /// and namespace prefix, scoped to `kind`.
    ///
    /// An empty result set is a valid response shape, returned as `None`
    /// rather than an error.
    async fn find_artifact(
        &self,
        name: &str,
        namespace_prefix: &str,
        kind: ArtifactKind,
    ) -> Result<Option<ArtifactRecord>, RemoteCallError>;

    /// Submits a test run and waits for its structured result. May take
    /// minutes; callers await it at a suspension point rather than blocking.
    async fn run_unit_tests(
        &self,
        request: &TestRunRequest,
    ) -> Result<TestRunResult, RemoteCallError>;

    /// Fetches the raw body of the execution log with the given id.
    async fn fetch_log_body(&self, log_id: &str) -> Result<String, RemoteCallError>;
}

/// Shape of the registry's query responses.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    records: Vec<ArtifactRecord>,
}

/// A [`ToolingClient`] over HTTP.
///
/// Connection and session negotiation are out of scope here: the client is
/// constructed from a base URL and an access token that are already valid.
#[derive(Debug)]
pub struct HttpToolingClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl HttpToolingClient {
    /// Creates a client against the given tooling-API base URL (no trailing
    /// slash) with the given access token.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
            access_token: access_token.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get(&self, endpoint: &str) -> Result<reqwest::Response, RemoteCallError> {
        let response = self
            .client
            .get(endpoint)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|error| RemoteCallError::Transport {
                endpoint: endpoint.to_owned(),
                error,
            })?;
        check_status(endpoint, &response)?;
        Ok(response)
    }
}

fn check_status(endpoint: &str, response: &reqwest::Response) -> Result<(), RemoteCallError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(RemoteCallError::UnexpectedStatus {
            endpoint: endpoint.to_owned(),
            status: status.as_u16(),
        })
    }
}

/// Escapes a value for interpolation into a single-quoted query literal.
fn quote_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl ToolingClient for HttpToolingClient {
    async fn find_artifact(
        &self,
        name: &str,
        namespace_prefix: &str,
        kind: ArtifactKind,
    ) -> Result<Option<ArtifactRecord>, RemoteCallError> {
        let query = format!(
            "SELECT Id, Name, NamespacePrefix, SymbolTable FROM {} \
             WHERE Name = '{}' AND NamespacePrefix = '{}'",
            kind.as_str(),
            quote_literal(name),
            quote_literal(namespace_prefix),
        );
        let endpoint = self.endpoint("/tooling/query");
        debug!(artifact = name, kind = kind.as_str(), "resolving artifact");

        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(&self.access_token)
            .query(&[("q", query.as_str())])
            .send()
            .await
            .map_err(|error| RemoteCallError::Transport {
                endpoint: endpoint.clone(),
                error,
            })?;
        check_status(&endpoint, &response)?;

        let mut body: QueryResponse =
            response
                .json()
                .await
                .map_err(|error| RemoteCallError::Decode {
                    endpoint: endpoint.clone(),
                    error,
                })?;
        if body.records.is_empty() {
            Ok(None)
        } else {
            // Expect exactly one logical result; take the first entry.
            Ok(Some(body.records.swap_remove(0)))
        }
    }

    async fn run_unit_tests(
        &self,
        request: &TestRunRequest,
    ) -> Result<TestRunResult, RemoteCallError> {
        let endpoint = self.endpoint("/tooling/runTestsSynchronous");
        debug!(
            artifact_id = request.artifact_id.as_str(),
            methods = request.method_names.len(),
            "submitting test run"
        );

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await
            .map_err(|error| RemoteCallError::Transport {
                endpoint: endpoint.clone(),
                error,
            })?;
        check_status(&endpoint, &response)?;

        response
            .json()
            .await
            .map_err(|error| RemoteCallError::Decode {
                endpoint: endpoint.clone(),
                error,
            })
    }

    async fn fetch_log_body(&self, log_id: &str) -> Result<String, RemoteCallError> {
        let endpoint = self.endpoint(&format!("/sobjects/ApexLog/{log_id}/Body"));
        debug!(log_id, "fetching execution log");

        let response = self.get(&endpoint).await?;
        response
            .text()
            .await
            .map_err(|error| RemoteCallError::Decode { endpoint, error })
    }
}

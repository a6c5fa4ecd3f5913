//! The test-run coordinator.
//!
//! The main structure in this module is [`TestRunCoordinator`].

use crate::{
    client::ToolingClient,
    config::ForcetestConfig,
    coverage::CoverageMap,
    errors::{MissingSymbolTableError, TestRunError},
    list, logs, reporter,
    surfaces::{EditorSurfaces, RunStatus},
};
use camino::{Utf8Path, Utf8PathBuf};
use forcetest_metadata::{ArtifactKind, TestRunRequest, TestRunResult};
use std::{error::Error, sync::Arc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Coordinator options.
#[derive(Debug, Default)]
pub struct TestRunCoordinatorBuilder {
    config: Option<ForcetestConfig>,
}

impl TestRunCoordinatorBuilder {
    /// Sets the configuration for the coordinator. Defaults to the built-in
    /// config when not set.
    pub fn set_config(&mut self, config: ForcetestConfig) -> &mut Self {
        self.config = Some(config);
        self
    }

    /// Creates a new coordinator from this builder.
    pub fn build(
        &self,
        client: Arc<dyn ToolingClient>,
        surfaces: EditorSurfaces,
        coverage: Arc<CoverageMap>,
        workspace_root: impl Into<Utf8PathBuf>,
    ) -> TestRunCoordinator {
        TestRunCoordinator {
            client,
            config: self
                .config
                .clone()
                .unwrap_or_else(ForcetestConfig::default_config),
            surfaces,
            coverage,
            workspace_root: workspace_root.into(),
            run_lock: Mutex::new(()),
        }
    }
}

/// Drives the multi-step remote sequence for a unit-test run: resolve the
/// artifact, extract its test methods, submit them, and fan the result out to
/// the host's surfaces.
///
/// Runs are serialized: a second `run` call awaits the first one's reporting
/// phase before touching any shared surface, so interleaved runs cannot mix
/// their output. The one deliberate exception is log retrieval, which is
/// detached and may land after a later run has started.
pub struct TestRunCoordinator {
    client: Arc<dyn ToolingClient>,
    config: ForcetestConfig,
    surfaces: EditorSurfaces,
    coverage: Arc<CoverageMap>,
    workspace_root: Utf8PathBuf,
    run_lock: Mutex<()>,
}

impl TestRunCoordinator {
    /// Runs the unit tests of the named artifact and reports the result.
    ///
    /// On success the structured result has already been rendered to the
    /// report surface, coverage recorded, warnings correlated, and the final
    /// status set. On failure the error has been rendered to the report
    /// surface and the status indicator is left in its last-set state.
    pub async fn run(
        &self,
        artifact_name: &str,
        kind: ArtifactKind,
    ) -> Result<TestRunResult, TestRunError> {
        let _guard = self.run_lock.lock().await;

        info!(artifact = artifact_name, kind = kind.as_str(), "starting unit-test run");
        self.surfaces.status.set_status(RunStatus::Running);

        match self.run_pipeline(artifact_name, kind).await {
            Ok(result) => Ok(result),
            Err(error) => {
                self.render_error(&error);
                Err(error)
            }
        }
    }

    /// The workspace root execution logs are written under.
    pub fn workspace_root(&self) -> &Utf8Path {
        &self.workspace_root
    }

    async fn run_pipeline(
        &self,
        artifact_name: &str,
        kind: ArtifactKind,
    ) -> Result<TestRunResult, TestRunError> {
        let record = self
            .client
            .find_artifact(artifact_name, &self.config.namespace_prefix, kind)
            .await
            .map_err(|error| TestRunError::ArtifactLookup {
                artifact_name: artifact_name.to_owned(),
                error,
            })?;

        // Zero registry matches deliberately shares a failure shape with a
        // record that has no symbol table attached.
        let record = record.ok_or_else(|| MissingSymbolTableError::new(artifact_name))?;
        let method_names = list::test_methods(record.symbol_table.as_ref(), artifact_name)?;
        debug!(
            artifact_id = record.id.as_str(),
            methods = method_names.len(),
            "submitting unit tests"
        );

        let request = TestRunRequest {
            artifact_id: record.id.clone(),
            method_names,
        };
        let result = self
            .client
            .run_unit_tests(&request)
            .await
            .map_err(|error| TestRunError::Submit {
                artifact_id: record.id,
                error,
            })?;

        let outcome = reporter::report(&result, &self.coverage, &self.surfaces);
        info!(
            failures = result.failures.len(),
            successes = result.successes.len(),
            diagnostics = outcome.diagnostics_attached,
            misses = outcome.misses.len(),
            "unit-test run reported"
        );

        self.spawn_log_retrieval(&result);
        Ok(result)
    }

    /// Kicks off log retrieval without awaiting it. The run is observably
    /// complete once reporting resolves; the log lands whenever it lands, and
    /// its failures stay inside the detached task.
    fn spawn_log_retrieval(&self, result: &TestRunResult) {
        if !self.config.show_test_log || result.apex_log_id.is_empty() {
            return;
        }

        let client = Arc::clone(&self.client);
        let config = self.config.clone();
        let display = Arc::clone(&self.surfaces.log_display);
        let workspace_root = self.workspace_root.clone();
        let log_id = result.apex_log_id.clone();
        tokio::spawn(async move {
            if let Err(error) = logs::retrieve_log(
                client.as_ref(),
                &config,
                display.as_ref(),
                &workspace_root,
                &log_id,
            )
            .await
            {
                warn!(%log_id, %error, "execution log retrieval failed");
            }
        });
    }

    /// The single terminal handler: renders the error chain to the report
    /// surface. The status indicator keeps its last-set value.
    fn render_error(&self, error: &TestRunError) {
        self.surfaces.report.append_line(&format!("ERROR: {error}"));
        let mut source = error.source();
        while let Some(cause) = source {
            self.surfaces.report.append_line(&format!("  caused by: {cause}"));
            source = cause.source();
        }
        self.surfaces.report.show();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::RemoteCallError,
        surfaces::test_support::{FakeSurfaces, doc},
    };
    use async_trait::async_trait;
    use forcetest_metadata::{
        ArtifactRecord, MethodAnnotation, SymbolMethod, SymbolTable, TestFailure, TestSuccess,
    };
    use std::{sync::Mutex as StdMutex, time::Duration};

    struct ScriptedClient {
        artifact: Option<ArtifactRecord>,
        fail_submit: bool,
        result: TestRunResult,
        log_body: String,
        submitted: StdMutex<Vec<TestRunRequest>>,
    }

    impl ScriptedClient {
        fn new(artifact: Option<ArtifactRecord>, result: TestRunResult) -> Self {
            Self {
                artifact,
                fail_submit: false,
                result,
                log_body: "USER_DEBUG: hello\nINFO: noise".to_owned(),
                submitted: StdMutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl ToolingClient for ScriptedClient {
        async fn find_artifact(
            &self,
            _name: &str,
            _namespace_prefix: &str,
            _kind: ArtifactKind,
        ) -> Result<Option<ArtifactRecord>, RemoteCallError> {
            Ok(self.artifact.clone())
        }

        async fn run_unit_tests(
            &self,
            request: &TestRunRequest,
        ) -> Result<TestRunResult, RemoteCallError> {
            self.submitted.lock().unwrap().push(request.clone());
            if self.fail_submit {
                Err(RemoteCallError::UnexpectedStatus {
                    endpoint: "/tooling/runTestsSynchronous".to_owned(),
                    status: 500,
                })
            } else {
                Ok(self.result.clone())
            }
        }

        async fn fetch_log_body(&self, _log_id: &str) -> Result<String, RemoteCallError> {
            Ok(self.log_body.clone())
        }
    }

    fn test_class_record() -> ArtifactRecord {
        ArtifactRecord {
            id: "01p000".to_owned(),
            name: "MyTests".to_owned(),
            namespace_prefix: None,
            symbol_table: Some(SymbolTable {
                methods: vec![
                    SymbolMethod {
                        name: "testA".to_owned(),
                        annotations: vec![MethodAnnotation::new("IsTest")],
                    },
                    SymbolMethod {
                        name: "testB".to_owned(),
                        annotations: vec![MethodAnnotation::new("IsTest")],
                    },
                    SymbolMethod {
                        name: "helper".to_owned(),
                        annotations: vec![],
                    },
                ],
            }),
        }
    }

    fn coordinator(client: ScriptedClient, fake: &FakeSurfaces) -> TestRunCoordinator {
        TestRunCoordinatorBuilder::default().build(
            Arc::new(client),
            fake.surfaces(),
            Arc::new(CoverageMap::new()),
            "/work/project",
        )
    }

    async fn wait_for_log(fake: &FakeSurfaces) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while fake.logs().is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("detached log task completes");
    }

    #[tokio::test]
    async fn successful_run_submits_extracted_methods() {
        let fake = FakeSurfaces::new(vec![]);
        let client = ScriptedClient::new(
            Some(test_class_record()),
            TestRunResult {
                successes: vec![TestSuccess {
                    name: "MyTests".to_owned(),
                    method_name: "testA".to_owned(),
                    time: 5.0,
                }],
                ..Default::default()
            },
        );
        let coordinator = coordinator(client, &fake);

        let result = coordinator.run("MyTests", ArtifactKind::ApexClass).await.unwrap();
        assert!(result.all_passed());
        assert_eq!(fake.statuses(), vec![RunStatus::Running, RunStatus::AllPassed]);
        assert_eq!(
            fake.report_lines(),
            vec!["SUCCESS: MyTests:testA - in 5ms"]
        );
    }

    #[tokio::test]
    async fn submitted_request_carries_artifact_id_and_method_order() {
        let fake = FakeSurfaces::new(vec![]);
        let client = Arc::new(ScriptedClient::new(
            Some(test_class_record()),
            TestRunResult::default(),
        ));
        let coordinator = TestRunCoordinatorBuilder::default().build(
            client.clone(),
            fake.surfaces(),
            Arc::new(CoverageMap::new()),
            "/work/project",
        );

        coordinator.run("MyTests", ArtifactKind::ApexClass).await.unwrap();

        let submitted = client.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].artifact_id, "01p000");
        assert_eq!(submitted[0].method_names, vec!["testA", "testB"]);
    }

    #[tokio::test]
    async fn zero_matches_and_missing_table_share_a_failure_shape() {
        for artifact in [
            None,
            Some(ArtifactRecord {
                symbol_table: None,
                ..test_class_record()
            }),
        ] {
            let fake = FakeSurfaces::new(vec![]);
            let client = ScriptedClient::new(artifact, TestRunResult::default());
            let coordinator = coordinator(client, &fake);

            let err = coordinator
                .run("MyTests", ArtifactKind::ApexClass)
                .await
                .unwrap_err();
            assert!(matches!(err, TestRunError::MissingSymbolTable(_)));

            // The terminal handler renders the error; the status stays where
            // the pipeline left it.
            assert_eq!(fake.statuses(), vec![RunStatus::Running]);
            let lines = fake.report_lines();
            assert!(lines[0].starts_with("ERROR: "));
            assert!(lines[0].contains("MyTests"));
            assert!(fake.report_shown());
        }
    }

    #[tokio::test]
    async fn submit_failure_renders_error_chain_and_skips_reporting() {
        let fake = FakeSurfaces::new(vec![]);
        let mut client = ScriptedClient::new(Some(test_class_record()), TestRunResult::default());
        client.fail_submit = true;
        let coordinator = coordinator(client, &fake);

        let err = coordinator
            .run("MyTests", ArtifactKind::ApexClass)
            .await
            .unwrap_err();
        assert!(matches!(err, TestRunError::Submit { .. }));

        let lines = fake.report_lines();
        assert!(lines[0].starts_with("ERROR: submitting test run"));
        assert!(lines[1].contains("HTTP 500"), "source chain is rendered");
        assert_eq!(fake.statuses(), vec![RunStatus::Running]);
        assert!(fake.logs().is_empty(), "no log retrieval on failure");
    }

    #[tokio::test]
    async fn scenario_one_failure_one_success() {
        let fake = FakeSurfaces::new(vec![]);
        let client = ScriptedClient::new(
            Some(test_class_record()),
            TestRunResult {
                failures: vec![TestFailure {
                    stack_trace: "Class.MyTests.testA: line 4".to_owned(),
                    message: "boom".to_owned(),
                }],
                successes: vec![TestSuccess {
                    name: "MyTests".to_owned(),
                    method_name: "testB".to_owned(),
                    time: 7.0,
                }],
                ..Default::default()
            },
        );
        let coordinator = coordinator(client, &fake);

        let result = coordinator.run("MyTests", ArtifactKind::ApexClass).await.unwrap();
        assert!(!result.all_passed());

        let lines = fake.report_lines();
        let failed = lines.iter().filter(|l| l.starts_with("FAILED:")).count();
        let succeeded = lines.iter().filter(|l| l.starts_with("SUCCESS:")).count();
        assert_eq!((failed, succeeded), (1, 1));
        assert_eq!(fake.last_status(), Some(RunStatus::SomeFailed));
    }

    #[tokio::test]
    async fn log_is_retrieved_after_successful_run() {
        let fake = FakeSurfaces::new(vec![]);
        let client = ScriptedClient::new(
            Some(test_class_record()),
            TestRunResult {
                apex_log_id: "07L000".to_owned(),
                ..Default::default()
            },
        );
        let coordinator = coordinator(client, &fake);

        coordinator.run("MyTests", ArtifactKind::ApexClass).await.unwrap();
        wait_for_log(&fake).await;

        let logs = fake.logs();
        assert_eq!(logs[0].0.as_str(), "/work/project/.logs/07L000.log");
        assert_eq!(logs[0].1, "USER_DEBUG: hello\nINFO: noise");
    }

    #[tokio::test]
    async fn log_display_failure_leaves_run_result_untouched() {
        let fake = FakeSurfaces::new(vec![]);
        fake.fail_log_display();
        let client = ScriptedClient::new(
            Some(test_class_record()),
            TestRunResult {
                apex_log_id: "07L000".to_owned(),
                ..Default::default()
            },
        );
        let coordinator = coordinator(client, &fake);

        let result = coordinator.run("MyTests", ArtifactKind::ApexClass).await.unwrap();
        assert!(result.all_passed());

        // Give the detached task a chance to fail.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(fake.last_status(), Some(RunStatus::AllPassed));
        assert!(!fake.report_lines().iter().any(|l| l.starts_with("ERROR:")));
    }

    #[tokio::test]
    async fn show_test_log_off_skips_retrieval_entirely() {
        let fake = FakeSurfaces::new(vec![doc("src/MyTests.cls", "MyTests")]);
        let client = ScriptedClient::new(
            Some(test_class_record()),
            TestRunResult {
                apex_log_id: "07L000".to_owned(),
                ..Default::default()
            },
        );
        let mut builder = TestRunCoordinatorBuilder::default();
        builder.set_config(ForcetestConfig {
            show_test_log: false,
            ..ForcetestConfig::default_config()
        });
        let coordinator = builder.build(
            Arc::new(client),
            fake.surfaces(),
            Arc::new(CoverageMap::new()),
            "/work/project",
        );

        coordinator.run("MyTests", ArtifactKind::ApexClass).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(fake.logs().is_empty());
    }
}

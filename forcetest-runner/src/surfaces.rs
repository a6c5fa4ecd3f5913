//! Trait seams for the host-owned editor surfaces.
//!
//! The orchestration core never talks to an editor directly. Everything it
//! needs from the host (a report channel, a status field, the set of open
//! documents, diagnostic attachment, and a log buffer) comes in through the
//! traits here. Hosts with interior mutability, the usual shape for editor
//! APIs, implement these on shared handles; tests implement them on
//! mutex-wrapped vectors.

use camino::{Utf8Path, Utf8PathBuf};
use std::{fmt, io, sync::Arc};

/// The append-only, clearable text channel test reports are written to.
pub trait ReportSurface: Send + Sync {
    /// Removes all previously written lines.
    fn clear(&self);

    /// Appends a single line to the channel.
    fn append_line(&self, line: &str);

    /// Brings the channel into view.
    fn show(&self);
}

/// The overall status of a test run, surfaced through a single text field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunStatus {
    /// The run has been submitted and is in flight.
    Running,

    /// The run completed and no test failed. Zero-test runs also land here.
    AllPassed,

    /// The run completed and at least one test failed.
    SomeFailed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RunStatus::Running => "Running unit tests",
            RunStatus::AllPassed => "All tests passed",
            RunStatus::SomeFailed => "Some tests failed",
        };
        f.write_str(text)
    }
}

/// The single text field reflecting pipeline milestones.
pub trait StatusIndicator: Send + Sync {
    /// Replaces the displayed status.
    fn set_status(&self, status: RunStatus);
}

/// Identifies an open document within the host. Documents are addressed by
/// path.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DocumentId(pub Utf8PathBuf);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A currently open document, as seen by the correlator.
#[derive(Clone, Debug)]
pub struct OpenDocument {
    /// The document's identity.
    pub id: DocumentId,

    /// The document's logical name, derived by the host (typically the file
    /// stem). Compared case-insensitively against coverage subjects.
    pub logical_name: String,

    /// The character length of the document's first line, for full-width
    /// diagnostic ranges.
    pub first_line_len: u32,
}

/// Read-only access to the host's set of open documents.
///
/// The core never opens or closes documents through this trait; the one
/// document it does create (the execution log) goes through [`LogDisplay`].
pub trait DocumentSet: Send + Sync {
    /// Returns the open documents in host-provided order.
    fn open_documents(&self) -> Vec<OpenDocument>;
}

/// Severity of a [`Diagnostic`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DiagnosticSeverity {
    /// A hard error.
    Error,

    /// A warning.
    Warning,
}

/// A diagnostic annotation to attach to a document.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    /// Zero-based line the diagnostic covers.
    pub line: u32,

    /// Zero-based column the range starts at.
    pub start_col: u32,

    /// Zero-based column the range ends at (exclusive).
    pub end_col: u32,

    /// The severity to render with.
    pub severity: DiagnosticSeverity,

    /// The message to display.
    pub message: String,
}

/// Attaches diagnostics to documents, keyed per document.
pub trait DiagnosticSink: Send + Sync {
    /// Replaces the diagnostics for the given document with `diagnostics`.
    /// Each correlation pass replaces rather than accumulates.
    fn replace(&self, document: &DocumentId, diagnostics: Vec<Diagnostic>);
}

/// Displays an execution log in the editor.
pub trait LogDisplay: Send + Sync {
    /// Opens the document at `path` (the persisted file if one exists,
    /// otherwise a new unsaved buffer addressed at that path), brings it into
    /// view, and replaces its entire content with `contents`.
    fn show_and_replace(&self, path: &Utf8Path, contents: &str) -> io::Result<()>;
}

/// The bundle of host-owned surfaces a test run reports into.
///
/// Handles are shared (`Arc`) because the detached log-retrieval task
/// outlives the pipeline call that spawned it.
#[derive(Clone)]
pub struct EditorSurfaces {
    /// The report channel.
    pub report: Arc<dyn ReportSurface>,

    /// The status field.
    pub status: Arc<dyn StatusIndicator>,

    /// The open-document set.
    pub documents: Arc<dyn DocumentSet>,

    /// The diagnostic sink.
    pub diagnostics: Arc<dyn DiagnosticSink>,

    /// The log buffer.
    pub log_display: Arc<dyn LogDisplay>,
}

/// Derives a document's logical name from its path: the file stem, as-is.
///
/// Hosts typically use this when building [`OpenDocument`] values; the
/// correlator compares logical names case-insensitively, so no case folding
/// happens here.
pub fn logical_document_name(path: &Utf8Path) -> &str {
    path.file_stem().unwrap_or(path.as_str())
}

pub mod test_support {
    //! In-memory surface implementations, used by this crate's tests and
    //! useful for host integration tests.

    use super::{
        Diagnostic, DiagnosticSink, DocumentId, DocumentSet, EditorSurfaces, LogDisplay,
        OpenDocument, ReportSurface, RunStatus, StatusIndicator,
    };
    use camino::{Utf8Path, Utf8PathBuf};
    use indexmap::IndexMap;
    use std::{
        io,
        sync::{
            Arc, Mutex,
            atomic::{AtomicBool, Ordering},
        },
    };

    /// Builds an [`OpenDocument`] with a fixed first-line length.
    pub fn doc(path: &str, logical_name: &str) -> OpenDocument {
        OpenDocument {
            id: DocumentId(Utf8PathBuf::from(path)),
            logical_name: logical_name.to_owned(),
            first_line_len: 40,
        }
    }

    #[derive(Default)]
    struct Inner {
        report_lines: Mutex<Vec<String>>,
        report_shown: AtomicBool,
        statuses: Mutex<Vec<RunStatus>>,
        documents: Mutex<Vec<OpenDocument>>,
        diagnostics: Mutex<IndexMap<DocumentId, Vec<Diagnostic>>>,
        logs: Mutex<Vec<(Utf8PathBuf, String)>>,
        fail_log_display: AtomicBool,
    }

    impl ReportSurface for Inner {
        fn clear(&self) {
            self.report_lines.lock().unwrap().clear();
        }

        fn append_line(&self, line: &str) {
            self.report_lines.lock().unwrap().push(line.to_owned());
        }

        fn show(&self) {
            self.report_shown.store(true, Ordering::SeqCst);
        }
    }

    impl StatusIndicator for Inner {
        fn set_status(&self, status: RunStatus) {
            self.statuses.lock().unwrap().push(status);
        }
    }

    impl DocumentSet for Inner {
        fn open_documents(&self) -> Vec<OpenDocument> {
            self.documents.lock().unwrap().clone()
        }
    }

    impl DiagnosticSink for Inner {
        fn replace(&self, document: &DocumentId, diagnostics: Vec<Diagnostic>) {
            self.diagnostics
                .lock()
                .unwrap()
                .insert(document.clone(), diagnostics);
        }
    }

    impl LogDisplay for Inner {
        fn show_and_replace(&self, path: &Utf8Path, contents: &str) -> io::Result<()> {
            if self.fail_log_display.load(Ordering::SeqCst) {
                return Err(io::Error::other("log display failed"));
            }
            self.logs
                .lock()
                .unwrap()
                .push((path.to_owned(), contents.to_owned()));
            Ok(())
        }
    }

    /// A recording implementation of every host surface.
    #[derive(Clone)]
    pub struct FakeSurfaces {
        inner: Arc<Inner>,
    }

    impl FakeSurfaces {
        /// Creates fake surfaces with the given set of open documents.
        pub fn new(documents: Vec<OpenDocument>) -> Self {
            let inner = Inner::default();
            *inner.documents.lock().unwrap() = documents;
            Self {
                inner: Arc::new(inner),
            }
        }

        /// Returns an [`EditorSurfaces`] bundle backed by this fake.
        pub fn surfaces(&self) -> EditorSurfaces {
            EditorSurfaces {
                report: self.inner.clone(),
                status: self.inner.clone(),
                documents: self.inner.clone(),
                diagnostics: self.inner.clone(),
                log_display: self.inner.clone(),
            }
        }

        /// The lines currently on the report surface.
        pub fn report_lines(&self) -> Vec<String> {
            self.inner.report_lines.lock().unwrap().clone()
        }

        /// Whether the report surface has been shown.
        pub fn report_shown(&self) -> bool {
            self.inner.report_shown.load(Ordering::SeqCst)
        }

        /// Every status set so far, in order.
        pub fn statuses(&self) -> Vec<RunStatus> {
            self.inner.statuses.lock().unwrap().clone()
        }

        /// The most recently set status, if any.
        pub fn last_status(&self) -> Option<RunStatus> {
            self.inner.statuses.lock().unwrap().last().copied()
        }

        /// The diagnostics currently attached to the document at `path`.
        pub fn diagnostics_for(&self, path: &str) -> Vec<Diagnostic> {
            self.inner
                .diagnostics
                .lock()
                .unwrap()
                .get(&DocumentId(Utf8PathBuf::from(path)))
                .cloned()
                .unwrap_or_default()
        }

        /// Every `(path, contents)` pair written through the log display.
        pub fn logs(&self) -> Vec<(Utf8PathBuf, String)> {
            self.inner.logs.lock().unwrap().clone()
        }

        /// Makes subsequent log-display calls fail with an I/O error.
        pub fn fail_log_display(&self) {
            self.inner.fail_log_display.store(true, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_status_display_strings_are_stable() {
        assert_eq!(RunStatus::Running.to_string(), "Running unit tests");
        assert_eq!(RunStatus::AllPassed.to_string(), "All tests passed");
        assert_eq!(RunStatus::SomeFailed.to_string(), "Some tests failed");
    }

    #[test]
    fn logical_name_is_the_file_stem() {
        assert_eq!(
            logical_document_name(Utf8Path::new("src/classes/MyTests.cls")),
            "MyTests"
        );
        assert_eq!(logical_document_name(Utf8Path::new("MyTests")), "MyTests");
    }
}

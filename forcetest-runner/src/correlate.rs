//! Correlating coverage warnings back to open documents.

use crate::{
    coverage::CoverageMap,
    errors::CorrelationMiss,
    surfaces::{Diagnostic, DiagnosticSeverity, DocumentId, DocumentSet},
};
use forcetest_metadata::CoverageWarning;

/// Prefix applied to every coverage-warning diagnostic message.
pub const COVERAGE_WARNING_PREFIX: &str = "CODE COVERAGE WARNING: ";

/// A diagnostic the correlator wants attached to a specific document.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentDiagnostic {
    /// The document the diagnostic belongs to.
    pub document: DocumentId,

    /// The diagnostic to attach.
    pub diagnostic: Diagnostic,
}

/// Attempts to locate the open document a coverage warning is about.
///
/// The warning carries only an artifact id; its subject name comes from the
/// coverage map entry recorded for that id earlier in the same report pass.
/// The open-document scan is first-match-wins in host-provided order, and the
/// name comparison is case-insensitive (the registry and the filesystem do
/// not agree on casing). A miss is returned, not swallowed: the caller
/// decides whether to surface it.
pub fn correlate(
    warning: &CoverageWarning,
    coverage: &CoverageMap,
    documents: &dyn DocumentSet,
) -> Result<DocumentDiagnostic, CorrelationMiss> {
    let Some(subject) = coverage.artifact_name(&warning.id) else {
        return Err(CorrelationMiss::new(&warning.id, None, &warning.message));
    };

    let matched = documents
        .open_documents()
        .into_iter()
        .find(|document| document.logical_name.eq_ignore_ascii_case(&subject));

    match matched {
        Some(document) => Ok(DocumentDiagnostic {
            document: document.id,
            diagnostic: Diagnostic {
                line: 0,
                start_col: 0,
                end_col: document.first_line_len,
                severity: DiagnosticSeverity::Warning,
                message: format!("{COVERAGE_WARNING_PREFIX}{}", warning.message),
            },
        }),
        None => Err(CorrelationMiss::new(
            &warning.id,
            Some(subject),
            &warning.message,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surfaces::OpenDocument;
    use camino::Utf8PathBuf;
    use forcetest_metadata::CoverageRecord;

    struct FixedDocuments(Vec<OpenDocument>);

    impl DocumentSet for FixedDocuments {
        fn open_documents(&self) -> Vec<OpenDocument> {
            self.0.clone()
        }
    }

    fn doc(path: &str, logical_name: &str) -> OpenDocument {
        OpenDocument {
            id: DocumentId(Utf8PathBuf::from(path)),
            logical_name: logical_name.to_owned(),
            first_line_len: 24,
        }
    }

    fn coverage_for(id: &str, name: &str) -> CoverageMap {
        let map = CoverageMap::new();
        map.record(CoverageRecord {
            id: id.to_owned(),
            name: name.to_owned(),
            namespace: None,
            num_locations: 10,
            num_locations_not_covered: 4,
        });
        map
    }

    fn warning(id: &str, message: &str) -> CoverageWarning {
        CoverageWarning {
            id: id.to_owned(),
            message: message.to_owned(),
        }
    }

    #[test]
    fn matches_case_insensitively_at_first_line() {
        let coverage = coverage_for("01p000", "MyClass");
        let documents = FixedDocuments(vec![
            doc("src/classes/Unrelated.cls", "Unrelated"),
            doc("src/classes/myclass.cls", "myclass"),
        ]);

        let attached = correlate(
            &warning("01p000", "coverage below 75%"),
            &coverage,
            &documents,
        )
        .unwrap();
        assert_eq!(
            attached.document,
            DocumentId(Utf8PathBuf::from("src/classes/myclass.cls"))
        );
        assert_eq!(attached.diagnostic.line, 0);
        assert_eq!(attached.diagnostic.start_col, 0);
        assert_eq!(attached.diagnostic.end_col, 24);
        assert_eq!(attached.diagnostic.severity, DiagnosticSeverity::Warning);
        assert_eq!(
            attached.diagnostic.message,
            "CODE COVERAGE WARNING: coverage below 75%"
        );
    }

    #[test]
    fn first_match_wins_in_host_order() {
        let coverage = coverage_for("01p000", "MyClass");
        let documents = FixedDocuments(vec![
            doc("a/MyClass.cls", "MyClass"),
            doc("b/MyClass.cls", "MyClass"),
        ]);

        let attached = correlate(&warning("01p000", "w"), &coverage, &documents).unwrap();
        assert_eq!(attached.document, DocumentId(Utf8PathBuf::from("a/MyClass.cls")));
    }

    #[test]
    fn no_matching_document_is_a_miss_not_a_panic() {
        let coverage = coverage_for("01p000", "MyClass");
        let documents = FixedDocuments(vec![doc("src/Other.cls", "Other")]);

        let miss = correlate(&warning("01p000", "w"), &coverage, &documents).unwrap_err();
        assert_eq!(miss.artifact_id(), "01p000");
        assert_eq!(miss.subject(), Some("MyClass"));
    }

    #[test]
    fn missing_coverage_entry_is_a_miss() {
        let coverage = CoverageMap::new();
        let documents = FixedDocuments(vec![doc("src/MyClass.cls", "MyClass")]);

        let miss = correlate(&warning("01p000", "w"), &coverage, &documents).unwrap_err();
        assert_eq!(miss.subject(), None);
        assert!(miss.to_string().contains("01p000"));
    }
}

use crate::errors::ArtifactKindParseError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The annotation name that marks a method as a unit test.
///
/// Matching is case-sensitive and exact.
pub const IS_TEST_ANNOTATION: &str = "IsTest";

/// The kind of a remotely addressable test artifact.
///
/// The tooling API scopes artifact lookups by kind; the kind also forms part
/// of the sobject endpoint path.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// A compiled class, the usual container for unit tests.
    ApexClass,

    /// A trigger. Triggers cannot contain test methods themselves, but the
    /// registry accepts lookups scoped to them.
    ApexTrigger,
}

impl ArtifactKind {
    /// Returns the sobject name for this kind, as used in endpoint paths and
    /// registry queries.
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::ApexClass => "ApexClass",
            ArtifactKind::ApexTrigger => "ApexTrigger",
        }
    }

    /// Returns the list of all known kinds as strings.
    pub fn variants() -> Vec<&'static str> {
        vec![
            ArtifactKind::ApexClass.as_str(),
            ArtifactKind::ApexTrigger.as_str(),
        ]
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = ArtifactKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ApexClass" => Ok(ArtifactKind::ApexClass),
            "ApexTrigger" => Ok(ArtifactKind::ApexTrigger),
            other => Err(ArtifactKindParseError::new(other)),
        }
    }
}

/// A single record returned by the remote artifact registry.
///
/// Sobject records use PascalCase field names on the wire. `SymbolTable` is
/// optional: an artifact that has never been compiled with symbol metadata
/// legitimately has none, and that state is distinct from a table with zero
/// methods.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// The opaque remote identifier for this artifact.
    #[serde(rename = "Id")]
    pub id: String,

    /// The artifact's name.
    #[serde(rename = "Name")]
    pub name: String,

    /// The namespace prefix the artifact lives under, if any.
    #[serde(rename = "NamespacePrefix", default)]
    pub namespace_prefix: Option<String>,

    /// Symbol metadata for the artifact's members, if attached.
    #[serde(rename = "SymbolTable", default)]
    pub symbol_table: Option<SymbolTable>,
}

/// Symbol metadata attached to a compiled artifact.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SymbolTable {
    /// The artifact's methods, in declaration order.
    #[serde(default)]
    pub methods: Vec<SymbolMethod>,
}

/// A single method entry in a [`SymbolTable`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SymbolMethod {
    /// The method name.
    pub name: String,

    /// Annotations carried by the method.
    #[serde(default)]
    pub annotations: Vec<MethodAnnotation>,
}

impl SymbolMethod {
    /// Returns true if this method carries the [`IS_TEST_ANNOTATION`] tag.
    pub fn is_test(&self) -> bool {
        self.annotations
            .iter()
            .any(|annotation| annotation.name == IS_TEST_ANNOTATION)
    }
}

/// An annotation attached to a [`SymbolMethod`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MethodAnnotation {
    /// The annotation name, e.g. `IsTest`.
    pub name: String,
}

impl MethodAnnotation {
    /// Creates a new annotation with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_kind_round_trip() {
        for kind in [ArtifactKind::ApexClass, ArtifactKind::ApexTrigger] {
            assert_eq!(kind.as_str().parse::<ArtifactKind>().unwrap(), kind);
        }
        let err = "ApexPage".parse::<ArtifactKind>().unwrap_err();
        assert!(err.to_string().contains("ApexPage"), "error names the input");
    }

    #[test]
    fn record_without_symbol_table_deserializes() {
        let record: ArtifactRecord = serde_json::from_str(
            r#"{"Id": "01p000", "Name": "MyTests", "NamespacePrefix": null}"#,
        )
        .unwrap();
        assert_eq!(record.id, "01p000");
        assert!(record.symbol_table.is_none());
    }

    #[test]
    fn is_test_matching_is_exact() {
        let method = SymbolMethod {
            name: "testA".to_owned(),
            annotations: vec![MethodAnnotation::new("istest")],
        };
        assert!(!method.is_test(), "annotation match is case-sensitive");

        let method = SymbolMethod {
            name: "testA".to_owned(),
            annotations: vec![
                MethodAnnotation::new("Deprecated"),
                MethodAnnotation::new("IsTest"),
            ],
        };
        assert!(method.is_test());
    }
}

use crate::ArtifactKind;
use thiserror::Error;

/// Error returned while parsing an [`ArtifactKind`] value from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized artifact kind: {input}\n(known kinds: {})",
    ArtifactKind::variants().join(", "),
)]
pub struct ArtifactKindParseError {
    input: String,
}

impl ArtifactKindParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

//! Error taxonomy shared by the model and the interpreter.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the scenario crates.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// What kind of id a [`ScenarioError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingKind {
    Scene,
    Stage,
    Procedure,
    Object,
    Puzzle,
    Audio,
    Hint,
    Timer,
    AssetBatch,
    MessageButton,
}

impl MissingKind {
    pub fn label(&self) -> &'static str {
        match self {
            MissingKind::Scene => "scene",
            MissingKind::Stage => "stage",
            MissingKind::Procedure => "procedure",
            MissingKind::Object => "object",
            MissingKind::Puzzle => "puzzle",
            MissingKind::Audio => "audio",
            MissingKind::Hint => "hint",
            MissingKind::Timer => "timer",
            MissingKind::AssetBatch => "asset batch",
            MissingKind::MessageButton => "message button",
        }
    }
}

impl std::fmt::Display for MissingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything that can go wrong while loading or interpreting a scenario.
///
/// A scripted world is expected to be internally consistent, so every
/// variant is surfaced to the caller of the entry point that triggered it.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: MissingKind, id: String },

    #[error("unknown action type `{0}`")]
    UnknownActionType(String),

    #[error("unknown guard type `{0}`")]
    UnknownGuardType(String),

    #[error("variable `{variable}` holds {found}, expected a number")]
    TypeMismatch { variable: String, found: String },

    #[error("invalid world configuration: {0}")]
    InvalidConfig(String),

    #[error("no blocking message is open")]
    NoOpenMessage,

    #[error("failed to parse {0}")]
    Parse(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScenarioError {
    /// Shorthand for [`ScenarioError::NotFound`].
    pub fn not_found(kind: MissingKind, id: impl Into<String>) -> Self {
        ScenarioError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ScenarioError::not_found(MissingKind::Procedure, "open_door");
        assert_eq!(err.to_string(), "procedure not found: open_door");
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = ScenarioError::TypeMismatch {
            variable: "coins".to_string(),
            found: "nothing".to_string(),
        };
        assert!(err.to_string().contains("coins"));
        assert!(err.to_string().contains("expected a number"));
    }
}

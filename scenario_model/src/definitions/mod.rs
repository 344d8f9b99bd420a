//! World configuration as authored in JSON: stages, scenes, puzzles and actions.

mod action;
mod scene;

pub use action::*;
pub use scene::*;

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::error::{MissingKind, ScenarioError, ScenarioResult};
use crate::world_state::Parameters;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a visitable scene.
    SceneId
);
string_id!(
    /// Identifier of a stage, the unit of loading.
    StageId
);
string_id!(
    /// Identifier of a code puzzle.
    PuzzleId
);
string_id!(
    /// Identifier of an interactive object.
    ObjectId
);

/// Clickable area of a scene, in fractions of the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDef {
    pub id: ObjectId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A batch of content loaded together.
#[derive(Debug, Clone, Deserialize)]
pub struct Stage {
    pub id: StageId,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    /// Audio key -> candidate file names.
    #[serde(default)]
    pub audio: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub load_actions: Vec<Action>,
}

impl Stage {
    /// Whether loading this stage has to wait for assets.
    pub fn needs_preload(&self) -> bool {
        !self.audio.is_empty() || self.scenes.iter().any(|scene| scene.background.is_some())
    }

    fn validate(&self) -> ScenarioResult<()> {
        Action::validate_all(&self.load_actions)?;
        for scene in &self.scenes {
            scene.validate()?;
        }
        Ok(())
    }
}

/// Expected solution(s) of a puzzle.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PuzzleConfig {
    /// Single expected code, unlocking `stage`.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub stage: Option<StageId>,
    /// Alternate codes, each unlocking its own stage. Kept sorted by code,
    /// not in declaration order.
    #[serde(default)]
    pub codes: Option<BTreeMap<String, StageId>>,
    #[serde(default)]
    pub hints: Vec<String>,
}

impl PuzzleConfig {
    /// Every (expected code, target stage) pair of this puzzle, alternates
    /// sorted by code.
    pub fn solutions(&self) -> ScenarioResult<Vec<(&str, &StageId)>> {
        if let Some(codes) = &self.codes {
            return Ok(codes
                .iter()
                .map(|(code, stage)| (code.as_str(), stage))
                .collect());
        }
        match (&self.code, &self.stage) {
            (Some(code), Some(stage)) => Ok(vec![(code.as_str(), stage)]),
            _ => Err(ScenarioError::InvalidConfig(
                "puzzle needs either `codes` or both `code` and `stage`".to_string(),
            )),
        }
    }
}

/// Top-level world description document.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldConfig {
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub puzzles: BTreeMap<PuzzleId, PuzzleConfig>,
    #[serde(default)]
    pub parameters: Parameters,
}

impl WorldConfig {
    /// Parse a world description, reporting the JSON path of the first error.
    pub fn from_json_str(raw: &str) -> ScenarioResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                ScenarioError::Parse(format!("world json: {source}"))
            } else {
                ScenarioError::Parse(format!("world json at {path}: {source}"))
            }
        })
    }

    /// Read and parse a world description file.
    pub fn from_path(path: impl AsRef<Path>) -> ScenarioResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn stage(&self, id: &str) -> ScenarioResult<&Stage> {
        self.stages
            .iter()
            .find(|stage| stage.id.as_str() == id)
            .ok_or_else(|| ScenarioError::not_found(MissingKind::Stage, id))
    }

    pub fn first_stage(&self) -> ScenarioResult<&Stage> {
        self.stages
            .first()
            .ok_or_else(|| ScenarioError::InvalidConfig("world declares no stages".to_string()))
    }

    pub fn puzzle(&self, id: &str) -> ScenarioResult<&PuzzleConfig> {
        self.puzzles
            .get(id)
            .ok_or_else(|| ScenarioError::not_found(MissingKind::Puzzle, id))
    }

    /// Structural checks run once before the first stage loads.
    pub fn validate(&self) -> ScenarioResult<()> {
        self.first_stage()?;

        let mut seen = HashSet::new();
        for stage in &self.stages {
            if !seen.insert(stage.id.as_str()) {
                return Err(ScenarioError::InvalidConfig(format!(
                    "stage `{}` is declared twice",
                    stage.id
                )));
            }
            stage.validate()?;
        }

        for (id, puzzle) in &self.puzzles {
            puzzle.solutions().map_err(|err| match err {
                ScenarioError::InvalidConfig(reason) => {
                    ScenarioError::InvalidConfig(format!("puzzle `{id}`: {reason}"))
                }
                other => other,
            })?;
        }

        Action::validate_all(&self.parameters.default_wrong_code_actions)?;
        Action::validate_all(&self.parameters.default_rediscovered_stage_actions)?;
        Ok(())
    }
}

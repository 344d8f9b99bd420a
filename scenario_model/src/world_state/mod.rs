//! World state management - the static world description and the mutable player state.

mod parameters;

pub use parameters::*;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::definitions::{Action, ObjectDef, ObjectId, PuzzleId, Scene, SceneId, StageId};
use crate::error::{MissingKind, ScenarioError, ScenarioResult};

/// Value of an in-game variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl VarValue {
    /// Strict equality: same kind and same value, integers and floats compare numerically.
    pub fn strictly_equals(&self, other: &VarValue) -> bool {
        match (self, other) {
            (VarValue::Bool(a), VarValue::Bool(b)) => a == b,
            (VarValue::String(a), VarValue::String(b)) => a == b,
            (VarValue::Int(a), VarValue::Int(b)) => a == b,
            (VarValue::Int(a), VarValue::Float(b)) | (VarValue::Float(b), VarValue::Int(a)) => {
                *a as f64 == *b
            }
            (VarValue::Float(a), VarValue::Float(b)) => a == b,
            _ => false,
        }
    }

    /// Numeric addition. `None` when either side is not a number.
    pub fn checked_add(&self, increment: &VarValue) -> Option<VarValue> {
        match (self, increment) {
            (VarValue::Int(a), VarValue::Int(b)) => Some(
                a.checked_add(*b)
                    .map(VarValue::Int)
                    .unwrap_or(VarValue::Float(*a as f64 + *b as f64)),
            ),
            (VarValue::Int(a), VarValue::Float(b)) => Some(VarValue::Float(*a as f64 + b)),
            (VarValue::Float(a), VarValue::Int(b)) => Some(VarValue::Float(a + *b as f64)),
            (VarValue::Float(a), VarValue::Float(b)) => Some(VarValue::Float(a + b)),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, VarValue::Int(_) | VarValue::Float(_))
    }

    /// Short description used in error messages.
    pub fn kind_label(&self) -> &'static str {
        match self {
            VarValue::Bool(_) => "a boolean",
            VarValue::Int(_) | VarValue::Float(_) => "a number",
            VarValue::String(_) => "a string",
        }
    }
}

impl From<bool> for VarValue {
    fn from(value: bool) -> Self {
        VarValue::Bool(value)
    }
}

impl From<i64> for VarValue {
    fn from(value: i64) -> Self {
        VarValue::Int(value)
    }
}

impl From<f64> for VarValue {
    fn from(value: f64) -> Self {
        VarValue::Float(value)
    }
}

impl From<&str> for VarValue {
    fn from(value: &str) -> Self {
        VarValue::String(value.to_string())
    }
}

/// How an interactive object behaves while a non-blocking message is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Built-in navigation arrow; stays visible under a non-blocking message.
    Navigation,
    /// Clickable area declared by a scene.
    Hotspot,
}

/// An interactive object known to the world.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectHandle {
    pub id: ObjectId,
    pub kind: ObjectKind,
    /// Viewport area for scene-declared objects.
    pub area: Option<ObjectDef>,
}

impl ObjectHandle {
    pub fn navigation(id: impl Into<ObjectId>) -> Self {
        Self {
            id: id.into(),
            kind: ObjectKind::Navigation,
            area: None,
        }
    }

    pub fn hotspot(def: ObjectDef) -> Self {
        Self {
            id: def.id.clone(),
            kind: ObjectKind::Hotspot,
            area: Some(def),
        }
    }

    pub fn is_navigation(&self) -> bool {
        self.kind == ObjectKind::Navigation
    }
}

/// Background image of a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundHandle {
    pub scene: SceneId,
    pub url: String,
}

/// A loaded audio asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioHandle {
    pub key: String,
    pub urls: Vec<String>,
}

/// Everything discovered about the world so far.
///
/// Grows monotonically as stages load; only the stage loader writes to it.
#[derive(Debug, Clone, Default)]
pub struct WorldDescription {
    /// Interactive clickable objects, navigation arrows included.
    pub objects: HashMap<ObjectId, ObjectHandle>,

    /// Background image per scene.
    pub backgrounds: HashMap<SceneId, BackgroundHandle>,

    /// Registered scenes with their inherited interactions already merged.
    pub scenes: HashMap<SceneId, Scene>,

    pub audio: HashMap<String, AudioHandle>,

    /// Named reusable action lists, global namespace.
    pub procedures: HashMap<String, Vec<Action>>,

    pub parameters: Parameters,
}

impl WorldDescription {
    /// Create an empty description with the given parameters.
    pub fn new(parameters: Parameters) -> Self {
        Self {
            parameters,
            ..Self::default()
        }
    }

    pub fn scene(&self, id: &str) -> ScenarioResult<&Scene> {
        self.scenes
            .get(id)
            .ok_or_else(|| ScenarioError::not_found(MissingKind::Scene, id))
    }

    pub fn object(&self, id: &str) -> ScenarioResult<&ObjectHandle> {
        self.objects
            .get(id)
            .ok_or_else(|| ScenarioError::not_found(MissingKind::Object, id))
    }

    pub fn audio(&self, key: &str) -> ScenarioResult<&AudioHandle> {
        self.audio
            .get(key)
            .ok_or_else(|| ScenarioError::not_found(MissingKind::Audio, key))
    }

    pub fn procedure(&self, name: &str) -> ScenarioResult<&[Action]> {
        self.procedures
            .get(name)
            .map(|actions| actions.as_slice())
            .ok_or_else(|| ScenarioError::not_found(MissingKind::Procedure, name))
    }

    /// Register an object unless one with the same id exists. Returns whether it was added.
    pub fn register_object(&mut self, handle: ObjectHandle) -> bool {
        if self.objects.contains_key(&handle.id) {
            return false;
        }
        self.objects.insert(handle.id.clone(), handle);
        true
    }

    /// Register an audio handle unless the key exists. Returns whether it was added.
    pub fn register_audio(&mut self, handle: AudioHandle) -> bool {
        if self.audio.contains_key(&handle.key) {
            return false;
        }
        self.audio.insert(handle.key.clone(), handle);
        true
    }

    /// Register a procedure unless the name exists. Returns whether it was added.
    pub fn register_procedure(&mut self, name: &str, actions: &[Action]) -> bool {
        if self.procedures.contains_key(name) {
            return false;
        }
        self.procedures.insert(name.to_string(), actions.to_vec());
        true
    }

    /// Register a scene, replacing any previous registration with the same id.
    pub fn register_scene(&mut self, scene: Scene) {
        self.scenes.insert(scene.id.clone(), scene);
    }

    /// Register a background, replacing any previous registration for the scene.
    pub fn register_background(&mut self, handle: BackgroundHandle) {
        self.backgrounds.insert(handle.scene.clone(), handle);
    }
}

/// The state of one play session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub session_id: Uuid,

    /// The scene the player is currently seeing; `None` before the first scene.
    pub current_scene_id: Option<SceneId>,

    /// Key of the ambience track currently looping.
    pub background_audio_key: Option<String>,

    pub variables: HashMap<String, VarValue>,

    /// Only grows.
    pub loaded_stages: HashSet<StageId>,

    pub visited_scenes: HashSet<SceneId>,

    /// Accepted code per solved puzzle.
    pub correct_answers: HashMap<PuzzleId, String>,

    /// One action list per button of the open blocking message.
    #[serde(skip)]
    pub next_actions: Option<Vec<Vec<Action>>>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            current_scene_id: None,
            background_audio_key: None,
            variables: HashMap::new(),
            loaded_stages: HashSet::new(),
            visited_scenes: HashSet::new(),
            correct_answers: HashMap::new(),
            next_actions: None,
        }
    }
}

impl PlayerState {
    /// Create a fresh session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(&self, name: &str) -> Option<&VarValue> {
        self.variables.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: VarValue) {
        self.variables.insert(name.into(), value);
    }

    pub fn is_puzzle_solved(&self, puzzle: &str) -> bool {
        self.correct_answers.contains_key(puzzle)
    }

    pub fn has_visited(&self, scene: &str) -> bool {
        self.visited_scenes.contains(scene)
    }

    pub fn is_stage_loaded(&self, stage: &str) -> bool {
        self.loaded_stages.contains(stage)
    }

    /// Returns `true` if the stage was not loaded before.
    pub fn mark_stage_loaded(&mut self, stage: StageId) -> bool {
        self.loaded_stages.insert(stage)
    }

    /// Returns `true` on the first visit.
    pub fn mark_visited(&mut self, scene: SceneId) -> bool {
        self.visited_scenes.insert(scene)
    }

    pub fn record_answer(&mut self, puzzle: PuzzleId, code: impl Into<String>) {
        self.correct_answers.insert(puzzle, code.into());
    }

    /// Number of prerequisite puzzles not solved yet.
    pub fn unsolved_count(&self, prerequisites: &[PuzzleId]) -> usize {
        prerequisites
            .iter()
            .filter(|puzzle| !self.is_puzzle_solved(puzzle.as_str()))
            .count()
    }

    pub fn has_open_message(&self) -> bool {
        self.next_actions.is_some()
    }
}

/// World description plus player state, owned by the interpreter.
#[derive(Debug, Clone, Default)]
pub struct WorldModel {
    pub description: WorldDescription,
    pub state: PlayerState,
}

impl WorldModel {
    pub fn new(parameters: Parameters) -> Self {
        Self {
            description: WorldDescription::new(parameters),
            state: PlayerState::new(),
        }
    }

    /// The definition of the scene the player is in.
    pub fn current_scene(&self) -> ScenarioResult<&Scene> {
        let id = self
            .state
            .current_scene_id
            .as_ref()
            .ok_or_else(|| ScenarioError::not_found(MissingKind::Scene, "<no current scene>"))?;
        self.description.scene(id.as_str())
    }
}

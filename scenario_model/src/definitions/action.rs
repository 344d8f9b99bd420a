//! Actions and guards - the closed vocabulary of the scenario language.

use serde::Deserialize;
use serde_json::Value;

use super::{PuzzleId, SceneId, StageId};
use crate::error::{ScenarioError, ScenarioResult};
use crate::world_state::VarValue;

/// One step of an action list, optionally gated by a guard.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Action {
    /// The `type` tag as written, kept for logs and for unrecognised actions.
    pub type_name: String,
    pub guard: Option<Guard>,
    pub kind: ActionKind,
}

/// What an action does.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    GoToScene {
        scene: SceneId,
    },
    /// Submit a code; without `puzzle` the current scene's puzzle is used.
    EnterCode {
        #[serde(default)]
        puzzle: Option<PuzzleId>,
        code: String,
    },
    ShowText {
        text: String,
    },
    BlockingText {
        text: String,
        #[serde(default)]
        button: Option<String>,
        #[serde(default)]
        next: Vec<Action>,
    },
    Alternative {
        text: String,
        alternatives: Vec<Vec<Action>>,
        buttons: Vec<String>,
    },
    SetVariable {
        variable: String,
        value: VarValue,
    },
    IncrementVariable {
        variable: String,
        #[serde(default = "default_increment")]
        increment: VarValue,
    },
    BackgroundFadeTween {
        tween: Value,
    },
    /// `audio: null` stops the ambience.
    SetBackgroundMusic {
        #[serde(default)]
        audio: Option<String>,
        #[serde(default)]
        config: Option<Value>,
    },
    BackgroundMusicTween {
        tween: Value,
    },
    PlayAudio {
        audio: String,
        #[serde(default)]
        config: Option<Value>,
    },
    StopAudio {
        audio: String,
    },
    GroupedActions {
        next: Vec<Action>,
    },
    RunProcedure {
        procedure: String,
    },
    /// `delay` is in milliseconds.
    DelayedActions {
        delay: f64,
        next: Vec<Action>,
    },
    HideInteractiveElements,
    Redirect {
        url: String,
    },
    #[serde(other)]
    Unrecognized,
}

fn default_increment() -> VarValue {
    VarValue::Int(1)
}

impl ActionKind {
    /// The `type` tag this kind is written with.
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::GoToScene { .. } => "go_to_scene",
            ActionKind::EnterCode { .. } => "enter_code",
            ActionKind::ShowText { .. } => "show_text",
            ActionKind::BlockingText { .. } => "blocking_text",
            ActionKind::Alternative { .. } => "alternative",
            ActionKind::SetVariable { .. } => "set_variable",
            ActionKind::IncrementVariable { .. } => "increment_variable",
            ActionKind::BackgroundFadeTween { .. } => "background_fade_tween",
            ActionKind::SetBackgroundMusic { .. } => "set_background_music",
            ActionKind::BackgroundMusicTween { .. } => "background_music_tween",
            ActionKind::PlayAudio { .. } => "play_audio",
            ActionKind::StopAudio { .. } => "stop_audio",
            ActionKind::GroupedActions { .. } => "grouped_actions",
            ActionKind::RunProcedure { .. } => "run_procedure",
            ActionKind::DelayedActions { .. } => "delayed_actions",
            ActionKind::HideInteractiveElements => "hide_interactive_elements",
            ActionKind::Redirect { .. } => "redirect",
            ActionKind::Unrecognized => "unrecognized",
        }
    }
}

impl Action {
    /// Create an unguarded action.
    pub fn new(kind: ActionKind) -> Self {
        Self {
            type_name: kind.name().to_string(),
            guard: None,
            kind,
        }
    }

    /// Gate this action behind a guard.
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Structural checks: alternative/button counts and delays, recursively.
    pub fn validate(&self) -> ScenarioResult<()> {
        match &self.kind {
            ActionKind::Alternative {
                alternatives,
                buttons,
                ..
            } => {
                if alternatives.len() != buttons.len() {
                    return Err(ScenarioError::InvalidConfig(format!(
                        "alternative declares {} action lists for {} buttons",
                        alternatives.len(),
                        buttons.len()
                    )));
                }
                alternatives
                    .iter()
                    .try_for_each(|actions| Self::validate_all(actions))
            }
            ActionKind::DelayedActions { delay, next } => {
                if !delay.is_finite() || *delay < 0.0 {
                    return Err(ScenarioError::InvalidConfig(format!(
                        "delayed_actions has invalid delay {delay}"
                    )));
                }
                Self::validate_all(next)
            }
            ActionKind::BlockingText { next, .. } | ActionKind::GroupedActions { next } => {
                Self::validate_all(next)
            }
            _ => Ok(()),
        }
    }

    pub fn validate_all(actions: &[Action]) -> ScenarioResult<()> {
        actions.iter().try_for_each(Action::validate)
    }
}

impl TryFrom<Value> for Action {
    type Error = ScenarioError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut fields) = value else {
            return Err(ScenarioError::InvalidConfig(
                "action must be a JSON object".to_string(),
            ));
        };
        let type_name = match fields.get("type") {
            Some(Value::String(name)) => name.clone(),
            _ => {
                return Err(ScenarioError::InvalidConfig(
                    "action is missing a string `type`".to_string(),
                ))
            }
        };

        let guard = match fields.remove("guard") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(Guard::try_from(raw)?),
        };

        let kind: ActionKind = serde_json::from_value(Value::Object(fields)).map_err(|err| {
            ScenarioError::InvalidConfig(format!("action `{type_name}`: {err}"))
        })?;

        Ok(Self {
            type_name,
            guard,
            kind,
        })
    }
}

/// A boolean predicate over the player state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Guard {
    pub condition: Condition,
    /// Applied after the condition is computed, `and` folding included.
    pub negate: bool,
}

/// What a guard checks.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// All nested guards hold, evaluated left to right.
    All(Vec<Guard>),
    Variable { variable: String, value: VarValue },
    PuzzleSolved(PuzzleId),
    SceneVisited(SceneId),
    StageLoaded(StageId),
    /// A `type` tag this engine does not know, kept verbatim.
    Unrecognized(String),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawCheck {
    Variable { variable: String, value: VarValue },
    PuzzleSolved { puzzle: PuzzleId },
    SceneVisited { scene: SceneId },
    StageLoaded { stage: StageId },
    #[serde(other)]
    Unrecognized,
}

impl Guard {
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            negate: false,
        }
    }

    pub fn all(guards: Vec<Guard>) -> Self {
        Self::new(Condition::All(guards))
    }

    pub fn variable(variable: impl Into<String>, value: impl Into<VarValue>) -> Self {
        Self::new(Condition::Variable {
            variable: variable.into(),
            value: value.into(),
        })
    }

    /// Flip the final result of this guard.
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }
}

impl TryFrom<Value> for Guard {
    type Error = ScenarioError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut fields) = value else {
            return Err(ScenarioError::InvalidConfig(
                "guard must be a JSON object".to_string(),
            ));
        };

        let negate = match fields.remove("not") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => flag,
            Some(other) => {
                return Err(ScenarioError::InvalidConfig(format!(
                    "guard `not` must be a boolean, got {other}"
                )))
            }
        };

        if let Some(nested) = fields.remove("and") {
            let guards: Vec<Guard> = serde_json::from_value(nested)
                .map_err(|err| ScenarioError::InvalidConfig(format!("guard `and`: {err}")))?;
            return Ok(Self {
                condition: Condition::All(guards),
                negate,
            });
        }

        let type_name = match fields.get("type") {
            Some(Value::String(name)) => name.clone(),
            _ => {
                return Err(ScenarioError::InvalidConfig(
                    "guard needs either `and` or a string `type`".to_string(),
                ))
            }
        };

        let raw: RawCheck = serde_json::from_value(Value::Object(fields))
            .map_err(|err| ScenarioError::InvalidConfig(format!("guard `{type_name}`: {err}")))?;
        let condition = match raw {
            RawCheck::Variable { variable, value } => Condition::Variable { variable, value },
            RawCheck::PuzzleSolved { puzzle } => Condition::PuzzleSolved(puzzle),
            RawCheck::SceneVisited { scene } => Condition::SceneVisited(scene),
            RawCheck::StageLoaded { stage } => Condition::StageLoaded(stage),
            RawCheck::Unrecognized => Condition::Unrecognized(type_name),
        };

        Ok(Self { condition, negate })
    }
}

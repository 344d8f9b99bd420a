//! Puzzle Validator - code submission, rediscovery and hints.

use scenario_model::{MissingKind, PuzzleId, ScenarioError, ScenarioResult, StageId};
use tracing::{info, warn};

use crate::host::Host;
use crate::interpreter::ScenarioInterpreter;

impl<H: Host> ScenarioInterpreter<H> {
    /// Submit a code for the current scene's puzzle.
    pub fn submit_code(&mut self, code: &str) -> ScenarioResult<()> {
        self.submit_code_for(None, code)
    }

    /// Compare `code` against every solution of the puzzle.
    ///
    /// Only the submitted code is trimmed; both sides are case-folded. Every
    /// matching alternate is accepted, in sorted code order.
    pub(crate) fn submit_code_for(
        &mut self,
        puzzle: Option<&PuzzleId>,
        code: &str,
    ) -> ScenarioResult<()> {
        let puzzle = match puzzle {
            Some(id) => id.clone(),
            None => {
                let scene = self.model.current_scene()?;
                scene.puzzle.clone().ok_or_else(|| {
                    ScenarioError::not_found(
                        MissingKind::Puzzle,
                        format!("<none in scene {}>", scene.id),
                    )
                })?
            }
        };

        let submitted = code.trim();
        let folded = submitted.to_lowercase();
        let targets: Vec<StageId> = self
            .world_config()?
            .puzzle(puzzle.as_str())?
            .solutions()?
            .into_iter()
            .filter(|(expected, _)| expected.to_lowercase() == folded)
            .map(|(_, stage)| stage.clone())
            .collect();

        if targets.is_empty() {
            return self.reject_code(&puzzle, submitted);
        }
        for stage in &targets {
            self.accept_code(&puzzle, submitted, stage)?;
        }
        Ok(())
    }

    fn accept_code(
        &mut self,
        puzzle: &PuzzleId,
        code: &str,
        stage: &StageId,
    ) -> ScenarioResult<()> {
        if self.model.state.is_stage_loaded(stage.as_str()) {
            info!(puzzle = %puzzle, stage = %stage, "puzzle_rediscovered");
            let actions = self
                .model
                .description
                .parameters
                .default_rediscovered_stage_actions
                .clone();
            return self.execute(&actions);
        }

        self.model.state.record_answer(puzzle.clone(), code);
        info!(puzzle = %puzzle, stage = %stage, "puzzle_solved");
        self.refresh_code_input()?;
        self.load_stage(stage)
    }

    fn reject_code(&mut self, puzzle: &PuzzleId, code: &str) -> ScenarioResult<()> {
        warn!(puzzle = %puzzle, code, "wrong_code");
        self.host.clear_code_input();

        let scene_actions = match self.model.state.current_scene_id {
            Some(_) => self.model.current_scene()?.wrong_code_actions.clone(),
            None => None,
        };
        let actions = scene_actions.unwrap_or_else(|| {
            self.model
                .description
                .parameters
                .default_wrong_code_actions
                .clone()
        });
        self.execute(&actions)
    }
}

#[cfg(test)]
mod tests {
    use crate::host::{HostCall, RecordingHost};
    use crate::interpreter::ScenarioInterpreter;
    use scenario_model::{MissingKind, PuzzleId, ScenarioError, VarValue, WorldConfig};
    use serde_json::json;

    fn start(world: serde_json::Value) -> ScenarioInterpreter<RecordingHost> {
        let world: WorldConfig = serde_json::from_value(world).unwrap();
        let mut interpreter = ScenarioInterpreter::new(RecordingHost::new());
        interpreter.start(world).unwrap();
        interpreter
    }

    fn safe_world() -> serde_json::Value {
        json!({
            "parameters": {
                "defaultWrongCodeActions": [
                    { "type": "set_variable", "variable": "wrong", "value": "default" }
                ],
                "defaultRediscoveredStageActions": [
                    { "type": "increment_variable", "variable": "rediscovered" }
                ]
            },
            "stages": [
                {
                    "id": "S0",
                    "scenes": [
                        { "id": "safe", "puzzle": "p1" },
                        {
                            "id": "panel",
                            "puzzle": "p1",
                            "wrong_code_actions": [
                                { "type": "set_variable", "variable": "wrong", "value": "panel" }
                            ]
                        }
                    ],
                    "load_actions": [
                        { "type": "set_variable", "variable": "rediscovered", "value": 0 }
                    ]
                },
                {
                    "id": "S1",
                    "load_actions": [
                        { "type": "set_variable", "variable": "opened", "value": true }
                    ]
                }
            ],
            "puzzles": { "p1": { "code": "Abc", "stage": "S1" } }
        })
    }

    fn flag(name: &str) -> serde_json::Value {
        json!({ "type": "set_variable", "variable": name, "value": true })
    }

    #[test]
    fn test_case_and_whitespace() {
        let mut interpreter = start(safe_world());
        interpreter.submit_code("ab c").unwrap();
        assert!(!interpreter.player_state().is_puzzle_solved("p1"));

        interpreter.submit_code("  ABC ").unwrap();
        assert_eq!(interpreter.correct_answer(&PuzzleId::from("p1")), Some("ABC"));
        assert!(interpreter.player_state().is_stage_loaded("S1"));
        assert_eq!(
            interpreter.player_state().variable("opened"),
            Some(&VarValue::Bool(true))
        );
        assert_eq!(interpreter.host().code_input, Some((false, "ABC".to_string())));
    }

    #[test]
    fn test_wrong_code_actions() {
        let mut interpreter = start(safe_world());
        interpreter.submit_code("nope").unwrap();
        assert_eq!(
            interpreter.player_state().variable("wrong"),
            Some(&VarValue::from("default"))
        );
        assert!(interpreter.host().calls.contains(&HostCall::ClearCodeInput));

        interpreter.go_to_scene("panel").unwrap();
        interpreter.submit_code("nope").unwrap();
        assert_eq!(
            interpreter.player_state().variable("wrong"),
            Some(&VarValue::from("panel"))
        );
    }

    #[test]
    fn test_resubmission_only_rediscovers() {
        let mut interpreter = start(safe_world());
        interpreter.submit_code("abc").unwrap();
        interpreter.submit_code("abc").unwrap();
        interpreter.submit_code("ABC").unwrap();

        let state = interpreter.player_state();
        assert_eq!(state.variable("rediscovered"), Some(&VarValue::Int(2)));
        assert_eq!(interpreter.correct_answer(&PuzzleId::from("p1")), Some("abc"));
    }

    #[test]
    fn test_every_matching_alternate_runs() {
        let mut interpreter = start(json!({
            "stages": [
                { "id": "S0", "scenes": [{ "id": "dial", "puzzle": "dial" }] },
                { "id": "red", "load_actions": [flag("red")] },
                { "id": "RED", "load_actions": [flag("RED")] },
                { "id": "blue", "load_actions": [flag("blue")] }
            ],
            "puzzles": { "dial": { "codes": { "red": "red", "Red": "RED", "blue": "blue" } } }
        }));

        interpreter.submit_code("RED").unwrap();
        let state = interpreter.player_state();
        assert!(state.variable("red").is_some());
        assert!(state.variable("RED").is_some());
        assert!(state.variable("blue").is_none());
    }

    #[test]
    fn test_matching_alternates_run_in_sorted_order() {
        let winner = |value: &str| {
            json!({ "type": "set_variable", "variable": "winner", "value": value })
        };
        let mut interpreter = start(json!({
            "stages": [
                { "id": "S0", "scenes": [{ "id": "dial", "puzzle": "dial" }] },
                { "id": "upper", "load_actions": [winner("upper")] },
                { "id": "lower", "load_actions": [winner("lower")] }
            ],
            "puzzles": { "dial": { "codes": { "x": "lower", "X": "upper" } } }
        }));

        interpreter.submit_code("x").unwrap();
        assert_eq!(
            interpreter.player_state().variable("winner"),
            Some(&VarValue::from("lower"))
        );
    }

    #[test]
    fn test_enter_code_action_names_puzzle() {
        let mut interpreter = start(json!({
            "stages": [
                {
                    "id": "S0",
                    "scenes": [{
                        "id": "hall",
                        "objects": [
                            { "id": "lever", "x": 0.0, "y": 0.0, "width": 0.1, "height": 0.1 }
                        ],
                        "interactive": {
                            "lever": [{ "type": "enter_code", "puzzle": "lever", "code": "pulled" }]
                        }
                    }]
                },
                { "id": "S1" }
            ],
            "puzzles": { "lever": { "code": "pulled", "stage": "S1" } }
        }));

        interpreter.object_clicked("lever").unwrap();
        assert!(interpreter.player_state().is_stage_loaded("S1"));
    }

    #[test]
    fn test_scene_without_puzzle() {
        let mut interpreter =
            start(json!({ "stages": [{ "id": "S0", "scenes": [{ "id": "hall" }] }] }));
        assert!(matches!(
            interpreter.submit_code("1"),
            Err(ScenarioError::NotFound {
                kind: MissingKind::Puzzle,
                ..
            })
        ));
    }
}

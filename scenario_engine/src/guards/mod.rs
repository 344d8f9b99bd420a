//! Guard Evaluator - pure predicates over the player state.

use scenario_model::{Action, Condition, Guard, PlayerState, ScenarioError, ScenarioResult};

/// Evaluates guards against a snapshot of the player state. Never mutates anything.
#[derive(Debug, Clone, Copy)]
pub struct GuardEvaluator<'a> {
    state: &'a PlayerState,
}

impl<'a> GuardEvaluator<'a> {
    pub fn new(state: &'a PlayerState) -> Self {
        Self { state }
    }

    /// Evaluate a guard.
    ///
    /// `and` lists stop at the first false entry, so an unrecognised guard
    /// after it is never reached. Negation is applied last.
    pub fn evaluate(&self, guard: &Guard) -> ScenarioResult<bool> {
        let result = match &guard.condition {
            Condition::All(guards) => {
                let mut all = true;
                for nested in guards {
                    if !self.evaluate(nested)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            Condition::Variable { variable, value } => self
                .state
                .variable(variable)
                .map_or(false, |stored| stored.strictly_equals(value)),
            Condition::PuzzleSolved(puzzle) => self.state.is_puzzle_solved(puzzle.as_str()),
            Condition::SceneVisited(scene) => self.state.has_visited(scene.as_str()),
            Condition::StageLoaded(stage) => self.state.is_stage_loaded(stage.as_str()),
            Condition::Unrecognized(type_name) => {
                return Err(ScenarioError::UnknownGuardType(type_name.clone()))
            }
        };

        Ok(result != guard.negate)
    }

    /// An unguarded action always passes.
    pub fn passes(&self, action: &Action) -> ScenarioResult<bool> {
        match &action.guard {
            Some(guard) => self.evaluate(guard),
            None => Ok(true),
        }
    }

    /// Whether an object bound to `interactions` should be shown: some entry passes.
    pub fn any_active(&self, interactions: &[Action]) -> ScenarioResult<bool> {
        for action in interactions {
            if self.passes(action)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_model::{PuzzleId, SceneId, StageId, VarValue};
    use serde_json::json;

    fn guard(value: serde_json::Value) -> Guard {
        serde_json::from_value(value).unwrap()
    }

    fn sample_state() -> PlayerState {
        let mut state = PlayerState::new();
        state.set_variable("lamp", VarValue::Bool(true));
        state.set_variable("coins", VarValue::Int(3));
        state.record_answer(PuzzleId::from("p1"), "42");
        state.mark_visited(SceneId::from("hall"));
        state.mark_stage_loaded(StageId::from("S0"));
        state
    }

    fn sample_guards() -> Vec<Guard> {
        vec![
            guard(json!({ "type": "variable", "variable": "lamp", "value": true })),
            guard(json!({ "type": "variable", "variable": "coins", "value": 4 })),
            guard(json!({ "type": "variable", "variable": "missing", "value": 0 })),
            guard(json!({ "type": "puzzle_solved", "puzzle": "p1" })),
            guard(json!({ "type": "puzzle_solved", "puzzle": "p2" })),
            guard(json!({ "type": "scene_visited", "scene": "hall" })),
            guard(json!({ "type": "stage_loaded", "stage": "S1" })),
        ]
    }

    #[test]
    fn test_basic_checks() {
        let state = sample_state();
        let evaluator = GuardEvaluator::new(&state);
        let results: Vec<bool> = sample_guards()
            .iter()
            .map(|g| evaluator.evaluate(g).unwrap())
            .collect();

        assert_eq!(results, vec![true, false, false, true, false, true, false]);
    }

    #[test]
    fn test_strict_equality_distinguishes_types() {
        let state = sample_state();
        let evaluator = GuardEvaluator::new(&state);

        let as_string = guard(json!({ "type": "variable", "variable": "coins", "value": "3" }));
        let as_float = guard(json!({ "type": "variable", "variable": "coins", "value": 3.0 }));

        assert!(!evaluator.evaluate(&as_string).unwrap());
        assert!(evaluator.evaluate(&as_float).unwrap());
    }

    #[test]
    fn test_single_and_equals_inner_guard() {
        let state = sample_state();
        let evaluator = GuardEvaluator::new(&state);

        for inner in sample_guards() {
            let wrapped = Guard::all(vec![inner.clone()]);
            assert_eq!(
                evaluator.evaluate(&wrapped).unwrap(),
                evaluator.evaluate(&inner).unwrap()
            );
        }
    }

    #[test]
    fn test_not_negates_result() {
        let state = sample_state();
        let evaluator = GuardEvaluator::new(&state);

        for inner in sample_guards() {
            let negated = inner.clone().negated();
            assert_eq!(
                evaluator.evaluate(&negated).unwrap(),
                !evaluator.evaluate(&inner).unwrap()
            );
        }
    }

    #[test]
    fn test_not_applies_after_and_folding() {
        let state = sample_state();
        let evaluator = GuardEvaluator::new(&state);

        let folded = guard(json!({
            "and": [
                { "type": "puzzle_solved", "puzzle": "p1" },
                { "type": "puzzle_solved", "puzzle": "p2" }
            ],
            "not": true
        }));

        assert!(evaluator.evaluate(&folded).unwrap());
    }

    #[test]
    fn test_empty_and_is_true() {
        let state = PlayerState::new();
        assert!(GuardEvaluator::new(&state)
            .evaluate(&Guard::all(vec![]))
            .unwrap());
    }

    #[test]
    fn test_unknown_guard_type_fails() {
        let state = PlayerState::new();
        let unknown = guard(json!({ "type": "moon_phase" }));

        let err = GuardEvaluator::new(&state).evaluate(&unknown).unwrap_err();
        assert!(matches!(err, ScenarioError::UnknownGuardType(name) if name == "moon_phase"));
    }

    #[test]
    fn test_and_short_circuits_before_unknown_guard() {
        let state = PlayerState::new();
        let short = guard(json!({
            "and": [
                { "type": "puzzle_solved", "puzzle": "p1" },
                { "type": "moon_phase" }
            ]
        }));
        assert!(!GuardEvaluator::new(&state).evaluate(&short).unwrap());

        let reached = guard(json!({
            "and": [
                { "type": "puzzle_solved", "puzzle": "p1", "not": true },
                { "type": "moon_phase" }
            ]
        }));
        assert!(GuardEvaluator::new(&state).evaluate(&reached).is_err());
    }

    #[test]
    fn test_any_active_uses_first_passing_entry() {
        let state = sample_state();
        let evaluator = GuardEvaluator::new(&state);

        let interactions: Vec<Action> = serde_json::from_value(json!([
            {
                "type": "show_text",
                "text": "locked",
                "guard": { "type": "stage_loaded", "stage": "S1" }
            },
            { "type": "show_text", "text": "open" }
        ]))
        .unwrap();
        assert!(evaluator.any_active(&interactions).unwrap());
        assert!(!evaluator.any_active(&interactions[..1]).unwrap());
        assert!(!evaluator.any_active(&[]).unwrap());
    }
}

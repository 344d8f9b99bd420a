//! Scene definitions.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::{Action, ObjectDef, ObjectId, PuzzleId, SceneId};
use crate::error::ScenarioResult;

/// A single visitable location.
#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    pub id: SceneId,

    /// Background image file name, relative to the configured images path.
    #[serde(default)]
    pub background: Option<String>,

    #[serde(default)]
    pub objects: Vec<ObjectDef>,

    /// Object id -> responses to a click, each optionally guarded.
    #[serde(default)]
    pub interactive: BTreeMap<ObjectId, Vec<Action>>,

    /// Scene whose `interactive` map this one extends.
    #[serde(default)]
    pub interactive_inherit: Option<SceneId>,

    /// Procedures contributed to the global table when the stage loads.
    #[serde(default)]
    pub procedures: BTreeMap<String, Vec<Action>>,

    #[serde(default)]
    pub puzzle: Option<PuzzleId>,

    /// Puzzles that must be solved before this scene's puzzle accepts input.
    #[serde(default)]
    pub puzzle_depends_on: Vec<PuzzleId>,

    #[serde(default)]
    pub hide_code_input: bool,

    /// Run on every visit, after `first_entry_actions`.
    #[serde(default)]
    pub entry_actions: Vec<Action>,

    #[serde(default)]
    pub first_entry_actions: Vec<Action>,

    /// Overrides the default wrong-code response.
    #[serde(default)]
    pub wrong_code_actions: Option<Vec<Action>>,
}

impl Scene {
    /// Whether entering this scene shows a code input.
    pub fn shows_code_input(&self) -> bool {
        self.puzzle.is_some() && !self.hide_code_input
    }

    /// Merge this scene's own interactions over `base`; own entries win.
    pub fn inherit_interactions(&mut self, base: &BTreeMap<ObjectId, Vec<Action>>) {
        let own = std::mem::take(&mut self.interactive);
        let mut merged = base.clone();
        merged.extend(own);
        self.interactive = merged;
    }

    pub(crate) fn validate(&self) -> ScenarioResult<()> {
        for actions in self.interactive.values() {
            Action::validate_all(actions)?;
        }
        for actions in self.procedures.values() {
            Action::validate_all(actions)?;
        }
        Action::validate_all(&self.entry_actions)?;
        Action::validate_all(&self.first_entry_actions)?;
        if let Some(actions) = &self.wrong_code_actions {
            Action::validate_all(actions)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scene(value: serde_json::Value) -> Scene {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_scene_defaults() {
        let hall = scene(json!({ "id": "hall", "background": "hall.jpg" }));
        assert!(hall.interactive.is_empty());
        assert!(hall.puzzle.is_none());
        assert!(!hall.shows_code_input());
        assert!(hall.wrong_code_actions.is_none());
    }

    #[test]
    fn test_code_input_visibility() {
        let safe = scene(json!({ "id": "safe", "puzzle": "p1" }));
        assert!(safe.shows_code_input());

        let hidden = scene(json!({ "id": "safe", "puzzle": "p1", "hide_code_input": true }));
        assert!(!hidden.shows_code_input());
    }

    #[test]
    fn test_inherit_interactions_own_entries_win() {
        let base = scene(json!({
            "id": "base",
            "interactive": {
                "left": [{ "type": "go_to_scene", "scene": "west" }],
                "right": [{ "type": "go_to_scene", "scene": "east" }]
            }
        }));
        let mut child = scene(json!({
            "id": "child",
            "interactive_inherit": "base",
            "interactive": {
                "right": [{ "type": "show_text", "text": "Blocked." }],
                "desk": [{ "type": "show_text", "text": "A desk." }]
            }
        }));

        child.inherit_interactions(&base.interactive);

        assert_eq!(child.interactive.len(), 3);
        let left = ObjectId::from("left");
        assert_eq!(child.interactive[&left], base.interactive[&left]);
        assert_eq!(child.interactive[&ObjectId::from("right")][0].type_name, "show_text");
        assert!(child.interactive.contains_key("desk"));
    }
}

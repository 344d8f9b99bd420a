//! Scene Transition Controller - leaving and entering scenes, object visibility.

use scenario_model::{ObjectId, ScenarioResult, SceneId};
use tracing::{debug, info};

use crate::host::Host;
use crate::interpreter::ScenarioInterpreter;

impl<H: Host> ScenarioInterpreter<H> {
    /// Leave the current scene, if any, and enter `id`.
    ///
    /// Every object the target reacts to must be registered; otherwise the
    /// player stays where they are.
    pub fn go_to_scene(&mut self, id: &str) -> ScenarioResult<()> {
        let scene = self.model.description.scene(id)?;
        for object in scene.interactive.keys() {
            self.model.description.object(object.as_str())?;
        }
        let target = scene.id.clone();
        if self.model.state.current_scene_id.is_some() {
            self.leave_scene()?;
        }
        self.enter_scene(target)
    }

    fn leave_scene(&mut self) -> ScenarioResult<()> {
        self.hide_interactive_elements()?;

        if let Some(id) = self.model.state.current_scene_id.take() {
            if self.model.description.backgrounds.contains_key(&id) {
                self.host.hide_background(&id);
            }
            debug!(scene = %id, "scene_left");
        }
        Ok(())
    }

    fn enter_scene(&mut self, id: SceneId) -> ScenarioResult<()> {
        self.model.state.current_scene_id = Some(id.clone());
        if self.model.description.backgrounds.contains_key(&id) {
            self.host.show_background(&id);
        }
        let first_visit = self.model.state.mark_visited(id.clone());

        self.refresh_objects()?;
        self.refresh_code_input()?;
        if self.model.state.next_actions.is_some() {
            self.hide_interactive_elements()?;
        } else if self.notice_open {
            self.hide_hotspots()?;
        }
        info!(scene = %id, first_visit, "scene_entered");

        let scene = self.model.description.scene(id.as_str())?;
        let first_entry = if first_visit {
            scene.first_entry_actions.clone()
        } else {
            Vec::new()
        };
        let entry = scene.entry_actions.clone();

        self.execute(&first_entry)?;
        self.execute(&entry)
    }

    /// Show every object of the current scene with an active interaction, hide the rest.
    ///
    /// Evaluated fresh on each call.
    pub(crate) fn refresh_objects(&mut self) -> ScenarioResult<()> {
        let scene = self.model.current_scene()?;
        let guards = self.guards();

        let mut plan = Vec::with_capacity(scene.interactive.len());
        for (id, interactions) in &scene.interactive {
            self.model.description.object(id.as_str())?;
            plan.push((id.clone(), guards.any_active(interactions)?));
        }

        for (id, visible) in plan {
            if visible {
                self.host.show_object(&id);
            } else {
                self.host.hide_object(&id);
            }
        }
        Ok(())
    }

    /// Apply the code-input policy of the current scene's puzzle.
    ///
    /// Solved puzzles show their answer, locked ones the lock message; both disabled.
    pub(crate) fn refresh_code_input(&mut self) -> ScenarioResult<()> {
        if self.model.state.current_scene_id.is_none() {
            return Ok(());
        }
        let scene = self.model.current_scene()?;
        let Some(puzzle) = scene.puzzle.as_ref().filter(|_| scene.shows_code_input()) else {
            return Ok(());
        };

        let state = &self.model.state;
        let (enabled, prefill) = match state.correct_answers.get(puzzle) {
            Some(answer) => (false, answer.clone()),
            None => match state.unsolved_count(&scene.puzzle_depends_on) {
                0 => (true, String::new()),
                unsolved => (
                    false,
                    self.model
                        .description
                        .parameters
                        .locked_message(unsolved)
                        .to_string(),
                ),
            },
        };

        self.host.show_code_input(enabled, &prefill);
        Ok(())
    }

    /// Hide every object of the current scene and its code input. Scene state is kept.
    pub(crate) fn hide_interactive_elements(&mut self) -> ScenarioResult<()> {
        self.hide_scene_objects(false)
    }

    /// Hide the current scene's objects except navigation arrows.
    pub(crate) fn hide_hotspots(&mut self) -> ScenarioResult<()> {
        self.hide_scene_objects(true)
    }

    fn hide_scene_objects(&mut self, keep_navigation: bool) -> ScenarioResult<()> {
        if self.model.state.current_scene_id.is_none() {
            return Ok(());
        }
        let scene = self.model.current_scene()?;
        let objects = &self.model.description.objects;
        let hidden: Vec<ObjectId> = scene
            .interactive
            .keys()
            .filter(|id| {
                objects
                    .get(*id)
                    .map_or(false, |handle| !(keep_navigation && handle.is_navigation()))
            })
            .cloned()
            .collect();
        let hide_input = !keep_navigation && scene.shows_code_input();

        for id in &hidden {
            self.host.hide_object(id);
        }
        if hide_input {
            self.host.hide_code_input();
        }
        Ok(())
    }
}

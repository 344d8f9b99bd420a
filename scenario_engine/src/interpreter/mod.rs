//! Scenario Interpreter - owns the world model and turns events into state transitions.
//!
//! Control flow for one play session:
//! 1. **Start**: validate the world configuration, register the navigation arrows,
//!    load the first stage
//! 2. **Load**: the stage loader preloads assets, then materialises scenes, audio and procedures
//! 3. **Enter**: the scene controller shows the background and the currently active objects
//! 4. **Interact**: clicks, code submissions, message buttons and timers feed the action dispatcher
//! 5. **Chain**: actions may enter scenes, submit codes or load further stages

use std::collections::{HashMap, VecDeque};

use scenario_model::{
    Action, MissingKind, ObjectHandle, ObjectId, PlayerState, PuzzleId, ScenarioError,
    ScenarioResult, SceneId, StageId, WorldConfig, WorldDescription, WorldModel,
};
use tracing::{debug, info, warn};

use crate::events::{BatchId, EngineEvent, TimerId};
use crate::guards::GuardEvaluator;
use crate::host::Host;

/// Settings of the interpreter itself, independent of any world.
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    /// Ids of the built-in navigation arrows registered at start.
    pub navigation_arrows: Vec<ObjectId>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            navigation_arrows: ["left", "right", "up", "down"]
                .into_iter()
                .map(ObjectId::from)
                .collect(),
        }
    }
}

/// The scenario interpreter.
///
/// Single owner of the world model. Every mutation happens synchronously
/// inside one entry point call; asynchronous work is represented by pending
/// timers and asset batches that the host completes by posting events.
pub struct ScenarioInterpreter<H: Host> {
    pub(crate) host: H,
    pub(crate) settings: InterpreterConfig,
    pub(crate) world: Option<WorldConfig>,
    pub(crate) model: WorldModel,
    queue: VecDeque<EngineEvent>,
    /// Stage loads waiting for their asset batch.
    pub(crate) pending_loads: HashMap<BatchId, StageId>,
    /// Deferred tails of `delayed_actions`; never cancelled.
    pub(crate) pending_timers: HashMap<TimerId, Vec<Action>>,
    /// A non-blocking message is on screen.
    pub(crate) notice_open: bool,
}

impl<H: Host> ScenarioInterpreter<H> {
    /// Create an interpreter with default settings.
    pub fn new(host: H) -> Self {
        Self::with_config(host, InterpreterConfig::default())
    }

    pub fn with_config(host: H, settings: InterpreterConfig) -> Self {
        Self {
            host,
            settings,
            world: None,
            model: WorldModel::default(),
            queue: VecDeque::new(),
            pending_loads: HashMap::new(),
            pending_timers: HashMap::new(),
            notice_open: false,
        }
    }

    /// Begin a new session with `config` and load its first stage.
    pub fn start(&mut self, config: WorldConfig) -> ScenarioResult<()> {
        config.validate()?;
        let first_stage = config.first_stage()?.id.clone();

        self.model = WorldModel::new(config.parameters.clone());
        self.queue.clear();
        self.pending_loads.clear();
        self.pending_timers.clear();
        self.notice_open = false;

        for id in &self.settings.navigation_arrows {
            let handle = ObjectHandle::navigation(id.clone());
            self.host.create_object(&handle);
            self.model.description.register_object(handle);
        }

        info!(
            session = %self.model.state.session_id,
            stages = config.stages.len(),
            puzzles = config.puzzles.len(),
            "scenario_started"
        );
        self.world = Some(config);

        self.load_stage(&first_stage)
    }

    /// Queue an event for [`Self::pump`].
    pub fn post(&mut self, event: EngineEvent) {
        self.queue.push_back(event);
    }

    /// Process queued events in order until the queue is empty.
    ///
    /// Stops at the first failing event and returns its error; later events stay queued.
    pub fn pump(&mut self) -> ScenarioResult<usize> {
        let mut handled = 0;
        while let Some(event) = self.queue.pop_front() {
            self.handle(event)?;
            handled += 1;
        }
        Ok(handled)
    }

    pub fn queued_events(&self) -> usize {
        self.queue.len()
    }

    /// Process one event immediately.
    pub fn handle(&mut self, event: EngineEvent) -> ScenarioResult<()> {
        debug!(event = event.label(), "event_received");
        match event {
            EngineEvent::ObjectClicked(id) => self.object_clicked(id.as_str()),
            EngineEvent::CodeSubmitted(code) => self.submit_code(&code),
            EngineEvent::HintRequested { puzzle, index } => {
                self.request_hint(puzzle.as_str(), index).map(|_| ())
            }
            EngineEvent::MessageButtonClicked(index) => self.message_button_clicked(index),
            EngineEvent::MessageDismissed => self.message_dismissed(),
            EngineEvent::AssetsReady(batch) => self.assets_ready(batch),
            EngineEvent::TimerFired(timer) => self.timer_fired(timer),
        }
    }

    /// Pointer-down on an interactive object.
    ///
    /// Closes an open non-blocking message first, then runs every entry of the
    /// object's interaction list whose guard passes.
    pub fn object_clicked(&mut self, id: &str) -> ScenarioResult<()> {
        if self.model.state.has_open_message() {
            warn!(object = id, "click_ignored_blocking_message_open");
            return Ok(());
        }
        if self.notice_open {
            self.close_notice()?;
        }

        let scene = self.model.current_scene()?;
        let Some(actions) = scene.interactive.get(id).cloned() else {
            self.model.description.object(id)?;
            debug!(object = id, scene = %scene.id, "click_without_interactions");
            return Ok(());
        };

        debug!(object = id, scene = %scene.id, entries = actions.len(), "object_clicked");
        self.execute(&actions)
    }

    /// Show a puzzle hint as a non-blocking message and return its text.
    pub fn request_hint(&mut self, puzzle: &str, index: usize) -> ScenarioResult<String> {
        let hint = self
            .world_config()?
            .puzzle(puzzle)?
            .hints
            .get(index)
            .cloned()
            .ok_or_else(|| {
                ScenarioError::not_found(MissingKind::Hint, format!("{puzzle}#{index}"))
            })?;

        info!(puzzle, index, "hint_requested");
        self.show_text(&hint)?;
        Ok(hint)
    }

    /// A pending `delayed_actions` timer expired.
    ///
    /// Runs even if the scene or stage changed since it was armed.
    pub fn timer_fired(&mut self, timer: TimerId) -> ScenarioResult<()> {
        let actions = self
            .pending_timers
            .remove(&timer)
            .ok_or_else(|| ScenarioError::not_found(MissingKind::Timer, timer.to_string()))?;
        debug!(%timer, actions = actions.len(), "timer_fired");
        self.execute(&actions)
    }

    pub fn player_state(&self) -> &PlayerState {
        &self.model.state
    }

    pub fn world(&self) -> &WorldDescription {
        &self.model.description
    }

    pub fn model(&self) -> &WorldModel {
        &self.model
    }

    pub fn current_scene_id(&self) -> Option<&SceneId> {
        self.model.state.current_scene_id.as_ref()
    }

    pub fn correct_answer(&self, puzzle: &PuzzleId) -> Option<&str> {
        self.model
            .state
            .correct_answers
            .get(puzzle)
            .map(|code| code.as_str())
    }

    pub fn is_notice_open(&self) -> bool {
        self.notice_open
    }

    pub fn pending_timer_count(&self) -> usize {
        self.pending_timers.len()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub(crate) fn world_config(&self) -> ScenarioResult<&WorldConfig> {
        self.world
            .as_ref()
            .ok_or_else(|| {
                ScenarioError::InvalidConfig("scenario has not been started".to_string())
            })
    }

    pub(crate) fn guards(&self) -> GuardEvaluator<'_> {
        GuardEvaluator::new(&self.model.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;
    use serde_json::json;

    fn world(value: serde_json::Value) -> WorldConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_start_registers_navigation_arrows() {
        let mut interpreter = ScenarioInterpreter::new(RecordingHost::new());
        interpreter
            .start(world(json!({ "stages": [{ "id": "S0" }] })))
            .unwrap();

        for arrow in ["left", "right", "up", "down"] {
            assert!(interpreter.world().object(arrow).unwrap().is_navigation());
        }
        assert!(interpreter.player_state().is_stage_loaded("S0"));
    }

    #[test]
    fn test_start_rejects_invalid_world() {
        let mut interpreter = ScenarioInterpreter::new(RecordingHost::new());
        let err = interpreter
            .start(world(json!({ "stages": [] })))
            .unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidConfig(_)));
    }

    #[test]
    fn test_entry_points_before_start() {
        let mut interpreter = ScenarioInterpreter::new(RecordingHost::new());
        assert!(interpreter.request_hint("p1", 0).is_err());
        assert!(interpreter.object_clicked("left").is_err());
    }

    #[test]
    fn test_pump_stops_at_first_error() {
        let mut interpreter = ScenarioInterpreter::new(RecordingHost::new());
        interpreter
            .start(world(json!({ "stages": [{ "id": "S0" }] })))
            .unwrap();

        interpreter.post(EngineEvent::TimerFired(TimerId::new()));
        interpreter.post(EngineEvent::MessageDismissed);

        assert!(matches!(
            interpreter.pump(),
            Err(ScenarioError::NotFound {
                kind: MissingKind::Timer,
                ..
            })
        ));
        assert_eq!(interpreter.queued_events(), 1);
        assert_eq!(interpreter.pump().unwrap(), 1);
    }

    #[test]
    fn test_hint_lookup() {
        let mut interpreter = ScenarioInterpreter::new(RecordingHost::new());
        interpreter
            .start(world(json!({
                "stages": [{ "id": "S0" }],
                "puzzles": {
                    "p1": { "code": "1", "stage": "S0", "hints": ["Look under the rug."] }
                }
            })))
            .unwrap();

        assert_eq!(interpreter.request_hint("p1", 0).unwrap(), "Look under the rug.");
        assert!(interpreter.is_notice_open());
        assert_eq!(
            interpreter.host().message.as_ref().map(|m| m.text.as_str()),
            Some("Look under the rug.")
        );

        assert!(matches!(
            interpreter.request_hint("p1", 1),
            Err(ScenarioError::NotFound {
                kind: MissingKind::Hint,
                ..
            })
        ));
        assert!(matches!(
            interpreter.request_hint("p9", 0),
            Err(ScenarioError::NotFound {
                kind: MissingKind::Puzzle,
                ..
            })
        ));
    }
}

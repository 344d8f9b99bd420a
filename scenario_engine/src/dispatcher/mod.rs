//! Action Dispatcher - runs action lists against the world model.
//!
//! Lists run strictly in order. A guard that evaluates to false skips its
//! action; an error stops the list and leaves earlier effects applied.

mod messages;

use std::time::Duration;

use scenario_model::{Action, ActionKind, ScenarioError, ScenarioResult, VarValue};
use serde_json::Value;
use tracing::{debug, info};

use crate::events::TimerId;
use crate::host::{AnimationTarget, Host};
use crate::interpreter::ScenarioInterpreter;

impl<H: Host> ScenarioInterpreter<H> {
    /// Run every action of `actions` whose guard passes.
    pub fn execute(&mut self, actions: &[Action]) -> ScenarioResult<()> {
        for action in actions {
            if !self.guards().passes(action)? {
                debug!(action = %action.type_name, "action_skipped_by_guard");
                continue;
            }
            debug!(action = %action.type_name, "action_dispatched");
            self.perform(action)?;
        }
        Ok(())
    }

    fn perform(&mut self, action: &Action) -> ScenarioResult<()> {
        match &action.kind {
            ActionKind::GoToScene { scene } => self.go_to_scene(scene.as_str()),
            ActionKind::EnterCode { puzzle, code } => self.submit_code_for(puzzle.as_ref(), code),
            ActionKind::ShowText { text } => self.show_text(text),
            ActionKind::BlockingText { text, button, next } => {
                let label = button.clone().unwrap_or_else(|| {
                    self.model
                        .description
                        .parameters
                        .default_message_box_single_button_text
                        .clone()
                });
                self.show_blocking(text, vec![label], vec![next.clone()])
            }
            ActionKind::Alternative {
                text,
                alternatives,
                buttons,
            } => {
                if alternatives.len() != buttons.len() {
                    return Err(ScenarioError::InvalidConfig(format!(
                        "alternative declares {} action lists for {} buttons",
                        alternatives.len(),
                        buttons.len()
                    )));
                }
                self.show_blocking(text, buttons.clone(), alternatives.clone())
            }
            ActionKind::SetVariable { variable, value } => {
                self.model.state.set_variable(variable.clone(), value.clone());
                Ok(())
            }
            ActionKind::IncrementVariable {
                variable,
                increment,
            } => self.increment_variable(variable, increment),
            ActionKind::BackgroundFadeTween { tween } => {
                self.host.cancel_animation(&AnimationTarget::FadeOverlay);
                self.host
                    .set_animation_target(&AnimationTarget::FadeOverlay, tween);
                Ok(())
            }
            ActionKind::SetBackgroundMusic { audio, config } => {
                self.set_background_music(audio.as_deref(), config.as_ref())
            }
            ActionKind::BackgroundMusicTween { tween } => {
                // Nothing to retarget without ambience.
                if let Some(key) = &self.model.state.background_audio_key {
                    self.host
                        .set_animation_target(&AnimationTarget::Ambience(key.clone()), tween);
                }
                Ok(())
            }
            ActionKind::PlayAudio { audio, config } => {
                self.model.description.audio(audio)?;
                self.host.play(audio, config.as_ref(), false);
                Ok(())
            }
            ActionKind::StopAudio { audio } => {
                self.model.description.audio(audio)?;
                self.host.stop(audio);
                Ok(())
            }
            ActionKind::GroupedActions { next } => self.execute(next),
            ActionKind::RunProcedure { procedure } => {
                let actions = self.model.description.procedure(procedure)?.to_vec();
                debug!(procedure = %procedure, actions = actions.len(), "procedure_started");
                self.execute(&actions)
            }
            ActionKind::DelayedActions { delay, next } => self.schedule(*delay, next),
            ActionKind::HideInteractiveElements => self.hide_interactive_elements(),
            ActionKind::Redirect { url } => {
                info!(url = %url, "redirect");
                self.host.redirect(url);
                Ok(())
            }
            ActionKind::Unrecognized => {
                Err(ScenarioError::UnknownActionType(action.type_name.clone()))
            }
        }
    }

    fn increment_variable(&mut self, variable: &str, increment: &VarValue) -> ScenarioResult<()> {
        if !increment.is_number() {
            return Err(ScenarioError::InvalidConfig(format!(
                "increment of `{variable}` is {}, expected a number",
                increment.kind_label()
            )));
        }

        let next = match self.model.state.variable(variable) {
            Some(current) => current
                .checked_add(increment)
                .ok_or_else(|| ScenarioError::TypeMismatch {
                    variable: variable.to_string(),
                    found: current.kind_label().to_string(),
                })?,
            None => {
                return Err(ScenarioError::TypeMismatch {
                    variable: variable.to_string(),
                    found: "nothing".to_string(),
                })
            }
        };

        self.model.state.set_variable(variable, next);
        Ok(())
    }

    /// Swap the looping ambience. `None` stops it without replacement.
    fn set_background_music(
        &mut self,
        audio: Option<&str>,
        config: Option<&Value>,
    ) -> ScenarioResult<()> {
        if self.model.state.background_audio_key.as_deref() == audio {
            return Ok(());
        }
        if let Some(key) = audio {
            self.model.description.audio(key)?;
        }

        if let Some(previous) = self.model.state.background_audio_key.take() {
            self.host.stop(&previous);
        }
        if let Some(key) = audio {
            self.host.play(key, config, true);
            self.model.state.background_audio_key = Some(key.to_string());
        }
        debug!(audio = ?audio, "background_music_changed");
        Ok(())
    }

    /// Arm a timer for `next`. The rest of the current list keeps running.
    fn schedule(&mut self, delay_ms: f64, next: &[Action]) -> ScenarioResult<()> {
        let delay = Duration::try_from_secs_f64(delay_ms / 1000.0).map_err(|_| {
            ScenarioError::InvalidConfig(format!("delayed_actions has invalid delay {delay_ms}"))
        })?;

        let timer = TimerId::new();
        self.pending_timers.insert(timer, next.to_vec());
        debug!(%timer, delay_ms, "timer_armed");
        self.host.after(delay, timer);
        Ok(())
    }
}

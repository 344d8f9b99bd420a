//! A host that records every call instead of rendering anything.
//!
//! Used by the tests and by headless replays of event logs.

use std::collections::BTreeSet;
use std::time::Duration;

use scenario_model::{BackgroundHandle, ObjectHandle, ObjectId, SceneId};
use serde_json::Value;

use super::{AnimationTarget, AssetLoader, AudioPlayer, Clock, Renderer, UiSurface};
use crate::events::{BatchId, EngineEvent, TimerId};

/// One call made by the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    CreateObject(ObjectId),
    CreateBackground { scene: SceneId, url: String },
    ShowObject(ObjectId),
    HideObject(ObjectId),
    ShowBackground(SceneId),
    HideBackground(SceneId),
    SetAnimationTarget { target: AnimationTarget, params: Value },
    CancelAnimation(AnimationTarget),
    RequestImage { key: String, url: String },
    RequestAudio { key: String, urls: Vec<String> },
    StartBatch(BatchId),
    Play { key: String, looped: bool },
    Stop(String),
    ShowMessage { text: String, buttons: Vec<String> },
    HideMessage,
    ShowCodeInput { enabled: bool, prefill: String },
    HideCodeInput,
    ClearCodeInput,
    ShowLoading,
    HideLoading,
    Redirect(String),
    After { delay: Duration, timer: TimerId },
}

/// The message currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownMessage {
    pub text: String,
    pub buttons: Vec<String>,
}

/// Records calls and keeps the resulting on-screen state.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
    pub visible_objects: BTreeSet<ObjectId>,
    pub visible_backgrounds: BTreeSet<SceneId>,
    pub playing: BTreeSet<String>,
    pub message: Option<ShownMessage>,
    /// `(enabled, prefill)` of the code input while shown.
    pub code_input: Option<(bool, String)>,
    pub loading: bool,
    pub redirected_to: Option<String>,
    pending_batches: Vec<BatchId>,
    pending_timers: Vec<(Duration, TimerId)>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible_objects.contains(id)
    }

    /// Drain the calls recorded so far.
    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    /// Completion events for every batch started so far, as a real loader would post them.
    pub fn complete_batches(&mut self) -> Vec<EngineEvent> {
        self.pending_batches
            .drain(..)
            .map(EngineEvent::AssetsReady)
            .collect()
    }

    /// Expiry events for every timer armed so far, shortest delay first.
    pub fn expire_timers(&mut self) -> Vec<EngineEvent> {
        let mut timers = std::mem::take(&mut self.pending_timers);
        timers.sort_by_key(|(delay, _)| *delay);
        timers
            .into_iter()
            .map(|(_, timer)| EngineEvent::TimerFired(timer))
            .collect()
    }

    pub fn pending_timer_count(&self) -> usize {
        self.pending_timers.len()
    }
}

impl Renderer for RecordingHost {
    fn create_object(&mut self, object: &ObjectHandle) {
        self.calls.push(HostCall::CreateObject(object.id.clone()));
    }

    fn create_background(&mut self, background: &BackgroundHandle) {
        self.calls.push(HostCall::CreateBackground {
            scene: background.scene.clone(),
            url: background.url.clone(),
        });
    }

    fn show_object(&mut self, id: &ObjectId) {
        self.visible_objects.insert(id.clone());
        self.calls.push(HostCall::ShowObject(id.clone()));
    }

    fn hide_object(&mut self, id: &ObjectId) {
        self.visible_objects.remove(id);
        self.calls.push(HostCall::HideObject(id.clone()));
    }

    fn show_background(&mut self, scene: &SceneId) {
        self.visible_backgrounds.insert(scene.clone());
        self.calls.push(HostCall::ShowBackground(scene.clone()));
    }

    fn hide_background(&mut self, scene: &SceneId) {
        self.visible_backgrounds.remove(scene);
        self.calls.push(HostCall::HideBackground(scene.clone()));
    }

    fn set_animation_target(&mut self, target: &AnimationTarget, params: &Value) {
        self.calls.push(HostCall::SetAnimationTarget {
            target: target.clone(),
            params: params.clone(),
        });
    }

    fn cancel_animation(&mut self, target: &AnimationTarget) {
        self.calls.push(HostCall::CancelAnimation(target.clone()));
    }
}

impl AssetLoader for RecordingHost {
    fn request_image(&mut self, key: &str, url: &str) {
        self.calls.push(HostCall::RequestImage {
            key: key.to_string(),
            url: url.to_string(),
        });
    }

    fn request_audio(&mut self, key: &str, urls: &[String]) {
        self.calls.push(HostCall::RequestAudio {
            key: key.to_string(),
            urls: urls.to_vec(),
        });
    }

    fn start_batch(&mut self, batch: BatchId) {
        self.pending_batches.push(batch);
        self.calls.push(HostCall::StartBatch(batch));
    }
}

impl AudioPlayer for RecordingHost {
    fn play(&mut self, key: &str, _config: Option<&Value>, looped: bool) {
        if looped {
            self.playing.insert(key.to_string());
        }
        self.calls.push(HostCall::Play {
            key: key.to_string(),
            looped,
        });
    }

    fn stop(&mut self, key: &str) {
        self.playing.remove(key);
        self.calls.push(HostCall::Stop(key.to_string()));
    }
}

impl UiSurface for RecordingHost {
    fn show_message(&mut self, text: &str, buttons: &[String]) {
        self.message = Some(ShownMessage {
            text: text.to_string(),
            buttons: buttons.to_vec(),
        });
        self.calls.push(HostCall::ShowMessage {
            text: text.to_string(),
            buttons: buttons.to_vec(),
        });
    }

    fn hide_message(&mut self) {
        self.message = None;
        self.calls.push(HostCall::HideMessage);
    }

    fn show_code_input(&mut self, enabled: bool, prefill: &str) {
        self.code_input = Some((enabled, prefill.to_string()));
        self.calls.push(HostCall::ShowCodeInput {
            enabled,
            prefill: prefill.to_string(),
        });
    }

    fn hide_code_input(&mut self) {
        self.code_input = None;
        self.calls.push(HostCall::HideCodeInput);
    }

    fn clear_code_input(&mut self) {
        if let Some((_, prefill)) = self.code_input.as_mut() {
            prefill.clear();
        }
        self.calls.push(HostCall::ClearCodeInput);
    }

    fn show_loading(&mut self) {
        self.loading = true;
        self.calls.push(HostCall::ShowLoading);
    }

    fn hide_loading(&mut self) {
        self.loading = false;
        self.calls.push(HostCall::HideLoading);
    }

    fn redirect(&mut self, url: &str) {
        self.redirected_to = Some(url.to_string());
        self.calls.push(HostCall::Redirect(url.to_string()));
    }
}

impl Clock for RecordingHost {
    fn after(&mut self, delay: Duration, timer: TimerId) {
        self.pending_timers.push((delay, timer));
        self.calls.push(HostCall::After { delay, timer });
    }
}

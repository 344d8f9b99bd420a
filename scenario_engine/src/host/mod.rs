//! Collaborator interfaces the interpreter drives.
//!
//! Rendering, asset decoding, audio playback and widgets live in the host.
//! The interpreter only issues the narrow calls below and never reads
//! anything back except through [`crate::EngineEvent`]s.

mod recording;

pub use recording::*;

use std::time::Duration;

use scenario_model::{BackgroundHandle, ObjectHandle, ObjectId, SceneId};
use serde_json::Value;

use crate::events::{BatchId, TimerId};

/// Something an animation can be attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationTarget {
    /// Full-screen overlay used for fades.
    FadeOverlay,
    /// The looping ambience track with the given key.
    Ambience(String),
}

pub trait Renderer {
    /// Create an object, initially hidden.
    fn create_object(&mut self, object: &ObjectHandle);
    /// Create a scene background, initially hidden.
    fn create_background(&mut self, background: &BackgroundHandle);
    fn show_object(&mut self, id: &ObjectId);
    fn hide_object(&mut self, id: &ObjectId);
    fn show_background(&mut self, scene: &SceneId);
    fn hide_background(&mut self, scene: &SceneId);
    fn set_animation_target(&mut self, target: &AnimationTarget, params: &Value);
    fn cancel_animation(&mut self, target: &AnimationTarget);
}

pub trait AssetLoader {
    fn request_image(&mut self, key: &str, url: &str);
    fn request_audio(&mut self, key: &str, urls: &[String]);
    /// Start loading everything requested since the previous batch.
    ///
    /// The host posts [`crate::EngineEvent::AssetsReady`] with this id once,
    /// when the whole batch has finished.
    fn start_batch(&mut self, batch: BatchId);
}

pub trait AudioPlayer {
    fn play(&mut self, key: &str, config: Option<&Value>, looped: bool);
    fn stop(&mut self, key: &str);
}

pub trait UiSurface {
    /// Open a message. No buttons means a non-blocking message.
    fn show_message(&mut self, text: &str, buttons: &[String]);
    fn hide_message(&mut self);
    fn show_code_input(&mut self, enabled: bool, prefill: &str);
    fn hide_code_input(&mut self);
    fn clear_code_input(&mut self);
    fn show_loading(&mut self);
    fn hide_loading(&mut self);
    /// Leave the game for another page.
    fn redirect(&mut self, url: &str);
}

pub trait Clock {
    /// Fire-once timer; the host posts [`crate::EngineEvent::TimerFired`] when it expires.
    fn after(&mut self, delay: Duration, timer: TimerId);
}

/// Everything the interpreter needs from its host.
pub trait Host: Renderer + AssetLoader + AudioPlayer + UiSurface + Clock {}

impl<T> Host for T where T: Renderer + AssetLoader + AudioPlayer + UiSurface + Clock {}

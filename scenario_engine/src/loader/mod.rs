//! Stage Loader - preloads a stage's assets and materialises it into the world description.
//!
//! `REQUESTED -> PRELOADING -> MATERIALIZING -> READY`, skipping `PRELOADING`
//! when the stage has neither backgrounds nor audio. A stage counts as loaded
//! from the moment it is requested.

use scenario_model::{
    AudioHandle, BackgroundHandle, MissingKind, ObjectHandle, ScenarioError, ScenarioResult,
    Scene, SceneId, Stage, StageId,
};
use tracing::{debug, info};

use crate::events::BatchId;
use crate::host::Host;
use crate::interpreter::ScenarioInterpreter;

impl<H: Host> ScenarioInterpreter<H> {
    /// Load `id`, waiting for its assets first when it has any.
    pub fn load_stage(&mut self, id: &StageId) -> ScenarioResult<()> {
        let stage = self.world_config()?.stage(id.as_str())?.clone();
        self.model.state.mark_stage_loaded(stage.id.clone());
        info!(stage = %stage.id, scenes = stage.scenes.len(), "stage_load_requested");
        self.host.show_loading();

        if !stage.needs_preload() {
            return self.finish_stage_load(&stage);
        }

        let params = &self.model.description.parameters;
        for scene in &stage.scenes {
            if let Some(file) = &scene.background {
                self.host
                    .request_image(scene.id.as_str(), &params.background_url(file));
            }
        }
        for (key, files) in &stage.audio {
            if !self.model.description.audio.contains_key(key) {
                self.host.request_audio(key, &params.audio_urls(files));
            }
        }

        let batch = BatchId::new();
        self.pending_loads.insert(batch, stage.id.clone());
        debug!(stage = %stage.id, %batch, "stage_preloading");
        self.host.start_batch(batch);
        Ok(())
    }

    /// Every asset of `batch` finished loading; resume its stage.
    pub fn assets_ready(&mut self, batch: BatchId) -> ScenarioResult<()> {
        let stage_id = self
            .pending_loads
            .remove(&batch)
            .ok_or_else(|| ScenarioError::not_found(MissingKind::AssetBatch, batch.to_string()))?;
        let stage = self.world_config()?.stage(stage_id.as_str())?.clone();
        self.finish_stage_load(&stage)
    }

    fn finish_stage_load(&mut self, stage: &Stage) -> ScenarioResult<()> {
        self.materialize(stage)?;
        if self.pending_loads.is_empty() {
            self.host.hide_loading();
        }
        info!(
            stage = %stage.id,
            scenes = self.model.description.scenes.len(),
            procedures = self.model.description.procedures.len(),
            "stage_materialized"
        );

        self.execute(&stage.load_actions)?;
        if self.model.state.current_scene_id.is_none() {
            if let Some(first) = stage.scenes.first() {
                self.go_to_scene(first.id.as_str())?;
            }
        }
        Ok(())
    }

    /// Register the stage's scenes, backgrounds, objects, procedures and audio.
    ///
    /// Inheritance is resolved for every scene before anything is registered,
    /// so a broken reference leaves the description untouched.
    fn materialize(&mut self, stage: &Stage) -> ScenarioResult<()> {
        let mut resolved: Vec<Scene> = Vec::with_capacity(stage.scenes.len());
        for (position, declared) in stage.scenes.iter().enumerate() {
            let mut scene = declared.clone();
            if let Some(base_id) = &declared.interactive_inherit {
                let base = self.inheritance_base(stage, position, base_id)?;
                scene.inherit_interactions(&base.interactive);
            }
            resolved.push(scene);
        }

        for scene in resolved {
            for def in &scene.objects {
                let handle = ObjectHandle::hotspot(def.clone());
                if self.model.description.register_object(handle.clone()) {
                    self.host.create_object(&handle);
                }
            }

            if let Some(file) = &scene.background {
                let handle = BackgroundHandle {
                    scene: scene.id.clone(),
                    url: self.model.description.parameters.background_url(file),
                };
                self.host.create_background(&handle);
                self.model.description.register_background(handle);
            }

            for (name, actions) in &scene.procedures {
                if !self.model.description.register_procedure(name, actions) {
                    debug!(procedure = %name, scene = %scene.id, "procedure_already_registered");
                }
            }

            self.model.description.register_scene(scene);
        }

        for (key, files) in &stage.audio {
            let handle = AudioHandle {
                key: key.clone(),
                urls: self.model.description.parameters.audio_urls(files),
            };
            self.model.description.register_audio(handle);
        }
        Ok(())
    }

    /// Declaration of the scene `base_id` that the scene at `position` inherits from.
    ///
    /// An earlier scene of the same stage wins over an already registered one.
    /// Only the base's own entries are inherited, never what it inherited itself.
    fn inheritance_base<'a>(
        &'a self,
        stage: &'a Stage,
        position: usize,
        base_id: &SceneId,
    ) -> ScenarioResult<&'a Scene> {
        if let Some(base) = stage.scenes[..position]
            .iter()
            .rev()
            .find(|candidate| candidate.id == *base_id)
        {
            return Ok(base);
        }

        let missing = || ScenarioError::not_found(MissingKind::Scene, base_id.as_str());
        if !self.model.description.scenes.contains_key(base_id) {
            return Err(missing());
        }
        self.world_config()?
            .stages
            .iter()
            .rev()
            .filter(|other| self.model.state.is_stage_loaded(other.id.as_str()))
            .find_map(|other| other.scenes.iter().find(|candidate| candidate.id == *base_id))
            .ok_or_else(missing)
    }
}

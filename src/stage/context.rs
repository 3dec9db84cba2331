//! The stage: everything the viewer mutates from frame to frame, in one
//! owner.
//!
//! Asset loads complete in any order. The context applies each completion as
//! it arrives and wires the results into the controller; requests that come
//! in before the clips they need are ready are skipped by the controller.

use std::sync::Arc;

use glam::Vec3;

use crate::animation::AnimationMixer;
use crate::app::input::Input;
use crate::assets::{AssetLoader, AssetSlot, LoadEvent, LoadedAsset, ModelAsset};
use crate::config::ViewerConfig;
use crate::scene::{Background, Camera, DirectionalLight, NodeHandle, Scene, Transform};
use crate::stage::controller::{AnimationStateController, ClipSlot, SkipReason, Transition};
use crate::stage::trigger::{Playback, PlaybackTrigger, TriggerRequest};
use crate::utils::OrbitControls;

pub struct StageContext<P: Playback> {
    config: ViewerConfig,
    scene: Scene,
    orbit: OrbitControls,
    mixer: Option<AnimationMixer>,
    controller: AnimationStateController,
    trigger: PlaybackTrigger<P>,
    model: Option<NodeHandle>,
    environment: Option<NodeHandle>,
}

impl<P: Playback> StageContext<P> {
    pub fn new(config: ViewerConfig, playback: P) -> Self {
        let mut scene = Scene::new();

        let light = &config.light;
        scene.light = DirectionalLight::new(light.color, light.intensity, light.position);
        scene.ambient = light.ambient;

        let cam = &config.camera;
        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let mut camera_transform = Transform::new();
        camera_transform.position = cam.position;
        camera_transform.look_at(cam.target, Vec3::Y);
        scene.add_camera(
            Camera::new_perspective(cam.fov_degrees, aspect, cam.near, cam.far),
            camera_transform,
        );

        let orbit = OrbitControls::from_position(cam.position, cam.target, &config.orbit);
        let trigger = PlaybackTrigger::new(playback, &config.auto_resume);

        Self {
            config,
            scene,
            orbit,
            mixer: None,
            controller: AnimationStateController::new(),
            trigger,
            model: None,
            environment: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn controller(&self) -> &AnimationStateController {
        &self.controller
    }

    pub fn trigger(&self) -> &PlaybackTrigger<P> {
        &self.trigger
    }

    pub fn mixer(&self) -> Option<&AnimationMixer> {
        self.mixer.as_ref()
    }

    /// Root node of the character, once loaded.
    pub fn model(&self) -> Option<NodeHandle> {
        self.model
    }

    pub fn environment(&self) -> Option<NodeHandle> {
        self.environment
    }

    // ========================================================================
    // Asset wiring
    // ========================================================================

    /// Requests the background, the environment and the idle character.
    /// The dance file is requested once the character is in the scene.
    pub fn request_initial_assets(&mut self, loader: &AssetLoader) {
        let assets = &self.config.assets;
        loader.request(AssetSlot::Background, assets.resolve(&assets.background));
        loader.request(AssetSlot::Environment, assets.resolve(&assets.environment));
        loader.request(AssetSlot::CharacterIdle, assets.resolve(&assets.character_idle));
        self.controller.set_idle_clip(ClipSlot::Loading);
    }

    pub fn apply_load_event(&mut self, event: LoadEvent, loader: &AssetLoader) {
        let LoadEvent { slot, path, result } = event;

        let asset = match result {
            Ok(asset) => asset,
            Err(err) => {
                log::error!("Failed to load {slot:?} from {}: {err}", path.display());
                match slot {
                    AssetSlot::CharacterIdle => self.controller.set_idle_clip(ClipSlot::Absent),
                    AssetSlot::CharacterDance => self.controller.set_dance_clip(ClipSlot::Absent),
                    AssetSlot::Background | AssetSlot::Environment => {}
                }
                return;
            }
        };

        match (slot, asset) {
            (AssetSlot::Background, LoadedAsset::Image(image)) => {
                log::info!("Background loaded ({}x{})", image.width, image.height);
                self.scene.background = Background::Texture(Arc::new(image));
            }
            (AssetSlot::Environment, LoadedAsset::Model(model)) => self.place_environment(&model),
            (AssetSlot::CharacterIdle, LoadedAsset::Model(model)) => {
                self.place_character(&model);
                let assets = &self.config.assets;
                loader.request(AssetSlot::CharacterDance, assets.resolve(&assets.character_dance));
                self.controller.set_dance_clip(ClipSlot::Loading);
            }
            (AssetSlot::CharacterDance, LoadedAsset::Model(model)) => self.bind_dance(&model),
            (slot, _) => log::warn!("Unexpected asset kind for {slot:?}, ignoring"),
        }
    }

    fn place_environment(&mut self, model: &ModelAsset) {
        let placement = &self.config.placement;
        let root = model.instantiate(&mut self.scene, "environment");
        if let Some(node) = self.scene.get_node_mut(root) {
            node.transform.scale = Vec3::splat(placement.environment_scale);
            node.transform.position = placement.environment_position;
        }
        self.environment = Some(root);
        log::info!("Environment loaded");
    }

    fn place_character(&mut self, model: &ModelAsset) {
        let root = model.instantiate(&mut self.scene, "character");
        if let Some(node) = self.scene.get_node_mut(root) {
            node.transform.scale = Vec3::splat(self.config.placement.character_scale);
        }
        self.scene.update_matrix_world();
        self.model = Some(root);
        self.controller.bind_model(root);

        let mut mixer = AnimationMixer::new(root);
        match model.clip(0) {
            Some(clip) => {
                let key = mixer.clip_action(clip, &self.scene);
                self.controller.set_idle_clip(ClipSlot::Ready(key));
                self.controller.start_idle(&mut mixer);
            }
            None => {
                log::warn!("Character '{}' has no animations; idle clip unavailable", model.name);
                self.controller.set_idle_clip(ClipSlot::Absent);
            }
        }
        self.mixer = Some(mixer);
        log::info!("Character loaded");
    }

    /// Binds the dance clip. Music that is already playing starts the dance
    /// right away.
    fn bind_dance(&mut self, model: &ModelAsset) {
        let Some(mixer) = self.mixer.as_mut() else {
            log::warn!("Dance clip arrived before the character, ignoring");
            self.controller.set_dance_clip(ClipSlot::Absent);
            return;
        };
        let Some(clip) = model.clip(0) else {
            log::warn!("Dance file '{}' has no animations", model.name);
            self.controller.set_dance_clip(ClipSlot::Absent);
            return;
        };
        let key = mixer.clip_action(clip, &self.scene);
        self.controller.set_dance_clip(ClipSlot::Ready(key));
        log::info!("Dance clip ready");

        if !self.trigger.is_paused() {
            self.dispatch(TriggerRequest::EnterDancing);
        }
    }

    // ========================================================================
    // Triggers
    // ========================================================================

    /// The music button: flips playback and moves the character to match.
    pub fn toggle_music(&mut self) -> Transition {
        let request = self.trigger.toggle();
        self.dispatch(request)
    }

    pub fn dispatch(&mut self, request: TriggerRequest) -> Transition {
        let Some(mixer) = self.mixer.as_mut() else {
            log::debug!("{request:?} skipped: character not loaded");
            return Transition::Skipped(SkipReason::IdleClipNotReady);
        };
        match request {
            TriggerRequest::EnterDancing => self.controller.enter_dancing(mixer),
            TriggerRequest::EnterIdle => self.controller.enter_idle(&mut self.scene, mixer),
        }
    }

    // ========================================================================
    // Frame
    // ========================================================================

    pub fn update(&mut self, dt: f32, input: &Input) {
        if input.music_toggle_pressed() {
            self.toggle_music();
        }
        if let Some(request) = self.trigger.tick(dt) {
            self.dispatch(request);
        }

        if let Some(mixer) = self.mixer.as_mut() {
            mixer.update(dt, &mut self.scene);
        }

        self.orbit.target = self.config.camera.target;
        if let Some((transform, camera)) = self.scene.query_main_camera_bundle() {
            let fov = camera.fov_degrees();
            self.orbit.update(transform, input, fov, dt);
        }

        self.scene.update();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some((_, camera)) = self.scene.query_main_camera_bundle() {
            camera.set_viewport(width, height);
        }
    }
}

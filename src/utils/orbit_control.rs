use glam::{Vec2, Vec3};
use winit::event::MouseButton;

use crate::app::input::Input;
use crate::config::OrbitConfig;
use crate::scene::transform::Transform;

const POLE_EPSILON: f32 = 0.0001;

/// Orbit camera: left drag rotates, wheel zooms, right drag pans when
/// enabled.
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub enable_pan: bool,
    pub min_distance: f32,
    pub max_distance: f32,

    pub target: Vec3,
    pub radius: f32,
    /// Azimuth around +Y, zero looking down -Z.
    pub theta: f32,
    /// Polar angle from +Y.
    pub phi: f32,

    rotate_delta: Vec2,
}

impl OrbitControls {
    #[must_use]
    pub fn new(target: Vec3, radius: f32) -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            damping_factor: 0.05,
            enable_damping: true,
            enable_pan: true,
            min_distance: 0.0,
            max_distance: f32::INFINITY,

            target,
            radius,
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_2,

            rotate_delta: Vec2::ZERO,
        }
    }

    /// Starts orbiting `target` from `position`, with limits from `config`.
    #[must_use]
    pub fn from_position(position: Vec3, target: Vec3, config: &OrbitConfig) -> Self {
        let offset = position - target;
        let radius = offset.length().max(f32::EPSILON);

        let mut controls = Self::new(target, radius);
        controls.theta = offset.x.atan2(offset.z);
        controls.phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
        controls.enable_damping = config.enable_damping;
        controls.damping_factor = config.damping_factor;
        controls.enable_pan = config.enable_pan;
        controls.min_distance = config.min_distance;
        controls.max_distance = config.max_distance;
        controls.radius = controls.clamp_radius(radius);
        controls
    }

    fn clamp_radius(&self, radius: f32) -> f32 {
        radius.clamp(self.min_distance, self.max_distance.max(self.min_distance))
    }

    fn offset(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta) * self.radius
    }

    pub fn update(&mut self, transform: &mut Transform, input: &Input, fov_degrees: f32, dt: f32) {
        let screen_height = input.screen_size.y.max(1.0);

        if input.is_button_pressed(MouseButton::Left) {
            let rotate_per_pixel = 2.0 * std::f32::consts::PI / screen_height;
            self.rotate_delta -= input.cursor_delta * rotate_per_pixel * self.rotate_speed;
        }

        if self.enable_damping {
            // Frame-rate independent: the factor is tuned for 60 fps.
            let retention = (1.0 - self.damping_factor).powf(dt * 60.0);
            let applied = self.rotate_delta * (1.0 - retention);
            self.theta += applied.x;
            self.phi += applied.y;
            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }

        self.phi = self.phi.clamp(POLE_EPSILON, std::f32::consts::PI - POLE_EPSILON);

        if input.scroll_delta.y != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(input.scroll_delta.y.abs());
            if input.scroll_delta.y > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
        }
        self.radius = self.clamp_radius(self.radius);

        if self.enable_pan && input.is_button_pressed(MouseButton::Right) {
            let world_height = 2.0 * self.radius * (fov_degrees.to_radians() / 2.0).tan();
            let pixels_to_world = world_height / screen_height;

            let forward = -self.offset().normalize();
            let right = forward.cross(Vec3::Y).normalize();
            let up = right.cross(forward).normalize();

            self.target += (right * -input.cursor_delta.x + up * input.cursor_delta.y)
                * pixels_to_world
                * self.pan_speed;
        }

        transform.position = self.target + self.offset();
        transform.look_at(self.target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_position_recovers_the_start_pose() {
        let config = OrbitConfig::default();
        let mut controls =
            OrbitControls::from_position(Vec3::new(0.0, 1.0, 5.0), Vec3::new(0.0, 1.0, 0.0), &config);
        let mut transform = Transform::new();
        controls.update(&mut transform, &Input::new(), 75.0, 1.0 / 60.0);

        assert!((transform.position - Vec3::new(0.0, 1.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn zoom_respects_distance_limits() {
        let config = OrbitConfig::default();
        let mut controls = OrbitControls::from_position(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, &config);
        let mut transform = Transform::new();

        let mut input = Input::new();
        input.scroll_delta = Vec2::new(0.0, 500.0);
        controls.update(&mut transform, &input, 75.0, 1.0 / 60.0);
        assert!((controls.radius - config.min_distance).abs() < 1e-5);

        input.scroll_delta = Vec2::new(0.0, -500.0);
        controls.update(&mut transform, &input, 75.0, 1.0 / 60.0);
        assert!((controls.radius - config.max_distance).abs() < 1e-5);
    }

    #[test]
    fn pan_is_ignored_when_disabled() {
        let config = OrbitConfig::default();
        let mut controls = OrbitControls::from_position(Vec3::new(0.0, 1.0, 5.0), Vec3::Y, &config);
        let mut transform = Transform::new();

        let mut input = Input::new();
        input.screen_size = Vec2::new(800.0, 600.0);
        input.cursor_delta = Vec2::new(40.0, 40.0);
        input.mouse_buttons.insert(MouseButton::Right);
        controls.update(&mut transform, &input, 75.0, 1.0 / 60.0);

        assert_eq!(controls.target, Vec3::Y);
    }
}

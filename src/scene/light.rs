use glam::Vec3;

/// A directional light shining from `position` towards the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
}

impl DirectionalLight {
    #[must_use]
    pub fn new(color: Vec3, intensity: f32, position: Vec3) -> Self {
        Self {
            color,
            intensity,
            position,
        }
    }

    /// Unit vector pointing from the surface towards the light.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or(Vec3::Y)
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::ONE, 1.0, Vec3::Y)
    }
}

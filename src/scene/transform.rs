use glam::{Affine3A, Mat3, Quat, Vec3};

/// Position, rotation and scale of a node, relative to its parent.
///
/// The local matrix is rebuilt lazily: [`update_local_matrix`](Self::update_local_matrix)
/// compares the TRS fields against the values it last built from, so
/// animation tracks can write the public fields directly.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,

    /// TRS the local matrix was built from. `None` forces a rebuild.
    built_from: Option<(Vec3, Quat, Vec3)>,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,
            built_from: None,
        }
    }

    /// Returns true if the local matrix had to be rebuilt.
    pub fn update_local_matrix(&mut self) -> bool {
        let trs = (self.position, self.rotation, self.scale);
        if self.built_from == Some(trs) {
            return false;
        }

        self.local_matrix =
            Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position);
        self.built_from = Some(trs);
        true
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    pub(crate) fn set_world_matrix(&mut self, mat: Affine3A) {
        self.world_matrix = mat;
    }

    /// Orients -Z towards `target`. `target` and `up` are in the parent space.
    /// Does nothing when `target` lies straight along `up`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        let right = forward.cross(up);
        if right.length_squared() < 1e-4 {
            return;
        }

        let right = right.normalize();
        let up = right.cross(forward);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward));
    }

    /// Forces the next [`update_local_matrix`](Self::update_local_matrix) to rebuild.
    pub fn mark_dirty(&mut self) {
        self.built_from = None;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::scene::background::Image;

/// Interleaved vertex layout consumed by the mesh pipeline.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// CPU-side geometry for one draw call.
///
/// Skinned primitives keep their bind-pose data here; the deformed vertices
/// are produced every frame by [`Primitive::skinned_vertices`].
#[derive(Debug, Clone, Default)]
pub struct Primitive {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub joints: Vec<[u16; 4]>,
    pub weights: Vec<Vec4>,
    pub indices: Vec<u32>,

    pub base_color: Vec4,
    pub base_color_image: Option<Arc<Image>>,
}

impl Primitive {
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        !self.joints.is_empty() && self.joints.len() == self.positions.len()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Bind-pose vertices.
    #[must_use]
    pub fn vertices(&self) -> Vec<Vertex> {
        (0..self.positions.len())
            .map(|i| self.vertex(i, self.positions[i], self.normal(i)))
            .collect()
    }

    /// Linear-blend skins every vertex with `joint_matrices`, which map bind
    /// space straight to world space.
    #[must_use]
    pub fn skinned_vertices(&self, joint_matrices: &[Mat4]) -> Vec<Vertex> {
        (0..self.positions.len())
            .map(|i| {
                let skin = self.skin_matrix(i, joint_matrices);
                let position = skin.transform_point3(self.positions[i]);
                let normal = skin.transform_vector3(self.normal(i)).normalize_or_zero();
                self.vertex(i, position, normal)
            })
            .collect()
    }

    fn skin_matrix(&self, i: usize, joint_matrices: &[Mat4]) -> Mat4 {
        let joints = self.joints[i];
        let weights = self.weights.get(i).copied().unwrap_or(Vec4::X);

        let mut skin = Mat4::ZERO;
        let mut total = 0.0;
        for (joint, weight) in joints.iter().zip(weights.to_array()) {
            if weight <= 0.0 {
                continue;
            }
            if let Some(m) = joint_matrices.get(usize::from(*joint)) {
                skin += *m * weight;
                total += weight;
            }
        }

        if total <= f32::EPSILON {
            Mat4::IDENTITY
        } else {
            skin * (1.0 / total)
        }
    }

    fn normal(&self, i: usize) -> Vec3 {
        self.normals.get(i).copied().unwrap_or(Vec3::Y)
    }

    fn vertex(&self, i: usize, position: Vec3, normal: Vec3) -> Vertex {
        Vertex {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: self.uvs.get(i).copied().unwrap_or(Vec2::ZERO).to_array(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub primitives: Vec<Primitive>,
}

//! glTF decoding into a CPU-side [`ModelAsset`].
//!
//! Everything here runs on a loader thread, so it produces plain data only.
//! Scene nodes are created later by [`ModelAsset::instantiate`].

use std::path::Path;
use std::sync::Arc;

use glam::{Affine3A, Mat4, Quat, Vec2, Vec3, Vec4};
use gltf::animation::util::ReadOutputs;

use crate::animation::{AnimationClip, InterpolationMode, KeyframeTrack, Track};
use crate::assets::model::{ModelAsset, NodeDesc, SkinDesc};
use crate::errors::{Result, ViewerError};
use crate::scene::{Image, Mesh, Primitive};

/// Loads a `.glb` / `.gltf` file with its buffers and embedded images.
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelAsset> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ViewerError::AssetNotFound(path.to_path_buf()));
    }

    let (document, buffers, images) = gltf::import(path)?;
    let asset_name = path
        .file_stem()
        .map_or_else(|| "model".to_string(), |s| s.to_string_lossy().into_owned());

    let images: Vec<Option<Arc<Image>>> = images
        .into_iter()
        .enumerate()
        .map(|(index, data)| {
            let image = convert_image(data);
            if image.is_none() {
                log::warn!("{asset_name}: image {index} has an unsupported pixel format, ignoring");
            }
            image.map(Arc::new)
        })
        .collect();

    let meshes = document
        .meshes()
        .map(|mesh| load_mesh(&mesh, &buffers, &images))
        .collect();

    let nodes = document.nodes().map(|node| load_node(&node)).collect();

    let roots = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .map(|scene| scene.nodes().map(|n| n.index()).collect())
        .unwrap_or_default();

    let skins = document.skins().map(|skin| load_skin(&skin, &buffers)).collect();

    let animations = document
        .animations()
        .map(|anim| Arc::new(load_animation(&anim, &buffers)))
        .collect();

    let model = ModelAsset {
        name: asset_name,
        nodes,
        roots,
        meshes,
        skins,
        animations,
    };

    log::debug!(
        "Decoded {}: {} nodes, {} meshes, {} skins, {} clips",
        path.display(),
        model.nodes.len(),
        model.meshes.len(),
        model.skins.len(),
        model.animations.len()
    );

    Ok(model)
}

fn node_name(node: &gltf::Node<'_>) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), str::to_string)
}

fn load_node(node: &gltf::Node<'_>) -> NodeDesc {
    let (t, r, s) = node.transform().decomposed();
    NodeDesc {
        name: node_name(node),
        translation: Vec3::from_array(t),
        rotation: Quat::from_array(r),
        scale: Vec3::from_array(s),
        children: node.children().map(|c| c.index()).collect(),
        mesh: node.mesh().map(|m| m.index()),
        skin: node.skin().map(|s| s.index()),
    }
}

fn load_skin(skin: &gltf::Skin<'_>, buffers: &[gltf::buffer::Data]) -> SkinDesc {
    let joints: Vec<usize> = skin.joints().map(|n| n.index()).collect();
    let reader = skin.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
    let inverse_bind_matrices = match reader.read_inverse_bind_matrices() {
        Some(iter) => iter
            .map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
            .collect(),
        None => vec![Affine3A::IDENTITY; joints.len()],
    };

    SkinDesc {
        name: skin.name().unwrap_or("Skeleton").to_string(),
        joints,
        inverse_bind_matrices,
    }
}

fn load_mesh(
    mesh: &gltf::Mesh<'_>,
    buffers: &[gltf::buffer::Data],
    images: &[Option<Arc<Image>>],
) -> Mesh {
    let name = mesh
        .name()
        .map_or_else(|| format!("Mesh_{}", mesh.index()), str::to_string);

    let mut primitives = Vec::new();
    for prim in mesh.primitives() {
        if prim.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("{name}: skipping primitive with mode {:?}", prim.mode());
            continue;
        }

        let reader = prim.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
        let Some(positions) = reader.read_positions() else {
            log::warn!("{name}: skipping primitive without positions");
            continue;
        };
        let positions: Vec<Vec3> = positions.map(Vec3::from_array).collect();

        let normals = reader
            .read_normals()
            .map(|it| it.map(Vec3::from_array).collect())
            .unwrap_or_default();

        let pbr = prim.material().pbr_metallic_roughness();
        let texture = pbr.base_color_texture();
        let uv_set = texture.as_ref().map_or(0, gltf::texture::Info::tex_coord);
        let uvs = reader
            .read_tex_coords(uv_set)
            .map(|it| it.into_f32().map(Vec2::from_array).collect())
            .unwrap_or_default();

        let joints = reader
            .read_joints(0)
            .map(|it| it.into_u16().collect())
            .unwrap_or_default();
        let weights = reader
            .read_weights(0)
            .map(|it| it.into_f32().map(Vec4::from_array).collect())
            .unwrap_or_default();

        let indices = match reader.read_indices() {
            Some(it) => it.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let base_color_image = texture
            .and_then(|info| images.get(info.texture().source().index()).cloned().flatten());

        primitives.push(Primitive {
            positions,
            normals,
            uvs,
            joints,
            weights,
            indices,
            base_color: Vec4::from_array(pbr.base_color_factor()),
            base_color_image,
        });
    }

    Mesh { name, primitives }
}

fn load_animation(anim: &gltf::Animation<'_>, buffers: &[gltf::buffer::Data]) -> AnimationClip {
    let clip_name = anim
        .name()
        .map_or_else(|| format!("Animation_{}", anim.index()), str::to_string);

    let mut tracks = Vec::new();
    for channel in anim.channels() {
        let reader = channel.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
        let node = node_name(&channel.target().node());

        let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs()) else {
            log::warn!("{clip_name}: channel for '{node}' has no keyframe data");
            continue;
        };
        let times: Vec<f32> = inputs.collect();

        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
            gltf::animation::Interpolation::Step => InterpolationMode::Step,
            gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
        };

        let track = match outputs {
            ReadOutputs::Translations(iter) => Track::translation(
                node,
                KeyframeTrack::new(times, iter.map(Vec3::from_array).collect(), interpolation),
            ),
            ReadOutputs::Rotations(iter) => Track::rotation(
                node,
                KeyframeTrack::new(
                    times,
                    iter.into_f32().map(Quat::from_array).collect(),
                    interpolation,
                ),
            ),
            ReadOutputs::Scales(iter) => Track::scale(
                node,
                KeyframeTrack::new(times, iter.map(Vec3::from_array).collect(), interpolation),
            ),
            ReadOutputs::MorphTargetWeights(_) => continue,
        };
        tracks.push(track);
    }

    AnimationClip::new(clip_name, tracks)
}

/// Expands 8-bit glTF image data to RGBA8. Other formats are not supported.
fn convert_image(data: gltf::image::Data) -> Option<Image> {
    use gltf::image::Format;

    let rgba = match data.format {
        Format::R8G8B8A8 => data.pixels,
        Format::R8G8B8 => data
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => data
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[1], 0, 255])
            .collect(),
        Format::R8 => data.pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        _ => return None,
    };

    Some(Image {
        width: data.width,
        height: data.height,
        rgba,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let err = load_model("does/not/exist.glb").unwrap_err();
        assert!(matches!(err, ViewerError::AssetNotFound(_)));
    }

    #[test]
    fn rgb_images_gain_opaque_alpha() {
        let data = gltf::image::Data {
            pixels: vec![10, 20, 30, 40, 50, 60],
            format: gltf::image::Format::R8G8B8,
            width: 2,
            height: 1,
        };
        let image = convert_image(data).unwrap();
        assert_eq!(image.rgba, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }
}

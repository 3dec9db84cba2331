//! Asset loading tests
//!
//! Tests for:
//! - Decoding a small embedded glTF (nodes, mesh, animation)
//! - Instantiating a decoded model into a scene and animating it
//! - AssetLoader delivering worker results through poll/wait_next

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use glam::Vec3;

use dancehall::animation::AnimationMixer;
use dancehall::assets::{AssetLoader, AssetSlot, LoadedAsset, load_image, load_model};
use dancehall::errors::ViewerError;
use dancehall::scene::Scene;

// ============================================================================
// Fixture
// ============================================================================

/// "Root" > "Tri": one triangle, plus a 2 s clip sliding "Tri" from the
/// origin to (4, 0, 0).
const TRIANGLE_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "nodes": [0] }],
  "nodes": [
    { "name": "Root", "children": [1] },
    { "name": "Tri", "mesh": 0 }
  ],
  "meshes": [{ "name": "Triangle", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }],
  "animations": [{
    "name": "slide",
    "channels": [{ "sampler": 0, "target": { "node": 1, "path": "translation" } }],
    "samplers": [{ "input": 2, "output": 3, "interpolation": "LINEAR" }]
  }],
  "buffers": [{
    "byteLength": 76,
    "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAAAAAAAAAAAQAAAAAAAAAAAAAAAAAAAgEAAAAAAAAAAAA=="
  }],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 6 },
    { "buffer": 0, "byteOffset": 44, "byteLength": 8 },
    { "buffer": 0, "byteOffset": 52, "byteLength": 24 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" },
    { "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0], "max": [2] },
    { "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3" }
  ]
}"#;

/// Writes `contents` to a per-test file in the temp directory.
fn fixture(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("dancehall-{}-{name}", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// glTF decoding
// ============================================================================

#[test]
fn decodes_embedded_gltf() {
    let path = fixture("decode.gltf", TRIANGLE_GLTF);
    let model = load_model(&path).unwrap();

    assert_eq!(model.nodes.len(), 2);
    assert_eq!(model.roots, vec![0]);
    assert_eq!(model.nodes[0].children, vec![1]);
    assert_eq!(model.nodes[1].mesh, Some(0));

    let primitive = &model.meshes[0].primitives[0];
    assert_eq!(primitive.positions.len(), 3);
    assert_eq!(primitive.indices, vec![0, 1, 2]);
    assert!(!primitive.is_skinned());

    let clip = model.clip(0).unwrap();
    assert_eq!(clip.name, "slide");
    assert!((clip.duration - 2.0).abs() < 1e-6);
    assert_eq!(clip.tracks[0].meta.node_name, "Tri");
    assert!(model.clip(1).is_none());

    let _ = fs::remove_file(path);
}

#[test]
fn instantiated_model_animates() {
    let path = fixture("animate.gltf", TRIANGLE_GLTF);
    let model = load_model(&path).unwrap();

    let mut scene = Scene::new();
    let root = model.instantiate(&mut scene, "character");
    let tri = scene.find_node_by_name(root, "Tri").unwrap();
    assert_eq!(scene.mesh_nodes().count(), 1);

    let mut mixer = AnimationMixer::new(root);
    let key = mixer.clip_action(model.clip(0).unwrap(), &scene);
    mixer.action_mut(key).unwrap().play();
    mixer.update(1.0, &mut scene);
    scene.update();

    let position = scene.world_position(tri).unwrap();
    assert!((position - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);

    let _ = fs::remove_file(path);
}

#[test]
fn malformed_gltf_is_an_error() {
    let path = fixture("broken.gltf", "{ \"asset\": ");
    let err = load_model(&path).unwrap_err();
    assert!(matches!(err, ViewerError::GltfError(_)));
    let _ = fs::remove_file(path);
}

#[test]
fn missing_image_is_not_found() {
    let err = load_image("does/not/exist.jpg").unwrap_err();
    assert!(matches!(err, ViewerError::AssetNotFound(_)));
}

// ============================================================================
// AssetLoader
// ============================================================================

#[test]
fn loader_delivers_results_from_workers() {
    let path = fixture("loader.gltf", TRIANGLE_GLTF);
    let loader = AssetLoader::new();
    loader.request(AssetSlot::Environment, &path);
    loader.request(AssetSlot::Background, "does/not/exist.jpg");

    let mut events = Vec::new();
    while events.len() < 2 {
        let event = loader
            .wait_next(Duration::from_secs(10))
            .expect("loader timed out");
        events.push(event);
    }
    assert!(loader.poll().is_empty());

    let env = events.iter().find(|e| e.slot == AssetSlot::Environment).unwrap();
    assert!(matches!(env.result, Ok(LoadedAsset::Model(_))));
    let sky = events.iter().find(|e| e.slot == AssetSlot::Background).unwrap();
    assert!(sky.result.is_err());

    let _ = fs::remove_file(path);
}

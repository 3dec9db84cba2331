//! Error Types
//!
//! This module defines the error types used throughout the viewer.
//!
//! # Overview
//!
//! The main error type [`ViewerError`] covers every failure the viewer can
//! report:
//! - GPU initialization failures
//! - Asset loading and decoding errors
//! - Configuration errors
//!
//! None of these are fatal to the running stage except GPU/window setup: an
//! asset that fails to load is logged and its slot simply stays empty.
//!
//! # Usage
//!
//! Fallible APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, ViewerError>`.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for the viewer.
#[derive(Error, Debug)]
pub enum ViewerError {
    // ========================================================================
    // GPU & Window Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create the presentation surface.
    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    /// The surface could not hand out a frame.
    #[error("Surface error: {0}")]
    SurfaceError(#[from] wgpu::SurfaceError),

    /// Window creation failed.
    #[error("Window creation failed: {0}")]
    WindowCreateFailed(#[from] winit::error::OsError),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The requested asset was not found on disk.
    #[error("Asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    /// The asset decoded but lacks data the viewer needs.
    #[error("Asset {asset} is missing {what}")]
    MissingAssetData {
        /// The asset being decoded
        asset: String,
        /// Description of the missing piece
        what: String,
    },

    /// glTF parsing or loading error.
    #[error("glTF error: {0}")]
    GltfError(String),

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    // ========================================================================
    // I/O & Configuration Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for ViewerError {
    fn from(err: image::ImageError) -> Self {
        ViewerError::ImageDecodeError(err.to_string())
    }
}

impl From<gltf::Error> for ViewerError {
    fn from(err: gltf::Error) -> Self {
        ViewerError::GltfError(err.to_string())
    }
}

/// Alias for `Result<T, ViewerError>`.
pub type Result<T> = std::result::Result<T, ViewerError>;

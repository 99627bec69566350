// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Android backend: EGL, GLES 3 and the camera2 NDK.

mod camera_ndk;
mod egl;
mod gles;
mod ndk;

pub use camera_ndk::{NdkCameraPlatform, device_api_level};
pub use egl::EglGraphics;
pub use gles::{GL_TEXTURE_EXTERNAL_OES, GlesFunctions};

use std::sync::Arc;

use crate::core::bridge::{DeviceContext, TextureRegistry};
use crate::core::config::CameraConfig;
use crate::core::error::Result;
use crate::core::gpu::GlesDevice;
use crate::core::permissions::PermissionGate;
use crate::core::session::NativeCamera;

/// Controller wired to the device's EGL, GLES and camera NDK.
///
/// A missing camera NDK is not an error here: without it `open` reports
/// `PlatformUnsupported` unless `config` enables override mode.
pub fn native_camera(
    config: CameraConfig,
    device: Arc<dyn DeviceContext>,
    registry: Arc<dyn TextureRegistry>,
    permissions: Arc<dyn PermissionGate>,
) -> Result<NativeCamera> {
    let egl = Arc::new(EglGraphics::load()?);
    let gl: Arc<dyn GlesDevice> = Arc::new(GlesFunctions::load(&egl)?);

    let camera = NativeCamera::new(
        config.clone(),
        egl.clone(),
        Arc::clone(&gl),
        device,
        registry,
        permissions,
    );

    if config.override_texture {
        return Ok(camera);
    }

    match NdkCameraPlatform::load(egl, gl) {
        Ok(platform) => Ok(camera.with_capture_platform(Arc::new(platform))),
        Err(e) => {
            tracing::warn!("Camera: native capture unavailable: {}", e);
            Ok(camera)
        }
    }
}

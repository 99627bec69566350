// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! GPU side of the bridge: the shared context and the external-image pass.

pub mod api;
pub mod compositor;
pub mod shared_context;

pub use api::{GlesDevice, GraphicsApi, TextureTarget};
pub use compositor::{
    CAMERA_FRAG_SHADER, CAMERA_TEXTURE_UNIFORM, CAMERA_VERT_SHADER, ExternalImageCompositor,
    ExternalTexture,
};
pub use shared_context::{ContextScope, SharedGraphicsContext};

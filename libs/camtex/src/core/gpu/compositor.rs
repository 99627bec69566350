// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Draws the external camera image into a plain RGBA `GL_TEXTURE_2D`.
//!
//! The engine cannot sample `samplerExternalOES` images, so every frame is
//! redrawn through a single full-screen pass into a framebuffer-backed 2D
//! texture whose dimensions are fixed when the compositor is created.
//!
//! All methods, including drop, issue GL calls on the calling thread's current
//! context. Callers make the right context current first.

use std::sync::Arc;

use crate::core::config::{CameraConfig, TextureFilter};
use crate::core::error::{CameraError, Result};
use crate::core::gpu::api::{GlesDevice, TextureTarget};
use crate::core::handles::{ExternalImageHandle, FramebufferId, NativeTextureId, ProgramId};

/// Vertex stage. No vertex buffer: the quad is derived from `gl_VertexID`.
pub const CAMERA_VERT_SHADER: &str = r#"#version 300 es
precision highp float;
out vec2 cameraFrameUV;
void main() {
    cameraFrameUV = vec2(gl_VertexID & 1, (gl_VertexID & 2) >> 1) * 2.0;
    gl_Position = vec4(cameraFrameUV * 2.0 - 1.0, 0.0, 1.0);
}
"#;

/// Fragment stage: one sample of the external image.
pub const CAMERA_FRAG_SHADER: &str = r#"#version 300 es
#extension GL_OES_EGL_image_external_essl3 : require
precision mediump float;
in vec2 cameraFrameUV;
uniform samplerExternalOES cameraTexture;
layout(location = 0) out vec4 oFragColor;
void main() {
    oFragColor = texture(cameraTexture, cameraFrameUV);
}
"#;

pub const CAMERA_TEXTURE_UNIFORM: &str = "cameraTexture";

const CAMERA_TEXTURE_UNIT: u32 = 0;

// One oversized triangle covers the viewport.
const QUAD_VERTEX_COUNT: i32 = 3;

/// Composite texture, its framebuffer, and the external-image program.
pub struct ExternalImageCompositor {
    gl: Arc<dyn GlesDevice>,
    width: u32,
    height: u32,
    texture: Option<NativeTextureId>,
    framebuffer: Option<FramebufferId>,
    program: Option<ProgramId>,
    sampler_location: Option<i32>,
}

impl ExternalImageCompositor {
    /// Allocate the composite texture and framebuffer and build the program.
    ///
    /// Anything allocated before a failing step is released before returning.
    pub fn new(
        gl: Arc<dyn GlesDevice>,
        width: u32,
        height: u32,
        config: &CameraConfig,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CameraError::InvalidDimensions { width, height });
        }

        let mut this = Self {
            gl,
            width,
            height,
            texture: None,
            framebuffer: None,
            program: None,
            sampler_location: None,
        };

        let texture = this.gl.gen_texture()?;
        this.texture = Some(texture);
        this.gl.bind_texture(TextureTarget::Texture2D, Some(texture));
        this.gl.allocate_rgba8(width, height);
        this.gl
            .set_texture_filter(TextureTarget::Texture2D, config.texture_filter);
        if config.generate_mipmaps {
            this.gl.generate_mipmap(TextureTarget::Texture2D);
        }
        this.gl.bind_texture(TextureTarget::Texture2D, None);

        let framebuffer = this.gl.gen_framebuffer()?;
        this.framebuffer = Some(framebuffer);
        this.gl.bind_framebuffer(Some(framebuffer));
        this.gl.attach_color_texture(texture);
        let complete = this.gl.framebuffer_complete();
        this.gl.bind_framebuffer(None);
        if !complete {
            return Err(CameraError::Gpu(format!(
                "Camera framebuffer {} is incomplete ({}x{})",
                framebuffer, width, height
            )));
        }

        let program = this
            .gl
            .create_program(CAMERA_VERT_SHADER, CAMERA_FRAG_SHADER)?;
        this.program = Some(program);
        this.sampler_location = this.gl.uniform_location(program, CAMERA_TEXTURE_UNIFORM);
        if this.sampler_location.is_none() {
            tracing::warn!(
                "Camera: uniform '{}' not found in program {}",
                CAMERA_TEXTURE_UNIFORM,
                program
            );
        }

        tracing::debug!(
            "Camera: composite texture {} / framebuffer {} / program {} ({}x{})",
            texture,
            framebuffer,
            program,
            width,
            height
        );

        Ok(this)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The composite texture's GL name.
    pub fn texture(&self) -> NativeTextureId {
        self.texture.unwrap_or(NativeTextureId::from_raw(0))
    }

    pub fn framebuffer(&self) -> Option<FramebufferId> {
        self.framebuffer
    }

    /// Draw `image` into the composite texture.
    pub fn draw(&self, image: ExternalImageHandle) {
        let (Some(framebuffer), Some(program)) = (self.framebuffer, self.program) else {
            return;
        };

        self.gl.bind_framebuffer(Some(framebuffer));
        self.gl.viewport(self.width, self.height);
        self.gl.use_program(Some(program));

        if let Some(location) = self.sampler_location {
            self.gl
                .set_uniform_i32(location, CAMERA_TEXTURE_UNIT as i32);
        }
        self.gl.active_texture(CAMERA_TEXTURE_UNIT);
        let external = (image != ExternalImageHandle::NONE)
            .then(|| NativeTextureId::from_raw(image.as_raw()));
        self.gl.bind_texture(TextureTarget::ExternalOes, external);
        self.gl.unbind_sampler(CAMERA_TEXTURE_UNIT);

        self.gl.draw_triangle_strip(0, QUAD_VERTEX_COUNT);

        self.gl.use_program(None);
        self.gl.bind_framebuffer(None);
    }

    /// Forget the GL objects without deleting them. Used when their context
    /// can no longer be made current; they go away with the share group.
    pub fn abandon(mut self) {
        tracing::warn!(
            "Camera: abandoning composite texture {:?} / framebuffer {:?} / program {:?}",
            self.texture,
            self.framebuffer,
            self.program
        );
        self.texture = None;
        self.framebuffer = None;
        self.program = None;
    }
}

impl Drop for ExternalImageCompositor {
    fn drop(&mut self) {
        if let Some(program) = self.program.take() {
            self.gl.delete_program(program);
        }
        if let Some(framebuffer) = self.framebuffer.take() {
            self.gl.delete_framebuffer(framebuffer);
        }
        if let Some(texture) = self.texture.take() {
            self.gl.delete_texture(texture);
        }
    }
}

impl std::fmt::Debug for ExternalImageCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalImageCompositor")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("texture", &self.texture)
            .field("framebuffer", &self.framebuffer)
            .field("program", &self.program)
            .finish()
    }
}

/// `GL_TEXTURE_EXTERNAL_OES` texture that the OS image queue latches into.
/// Deleted on drop.
pub struct ExternalTexture {
    gl: Arc<dyn GlesDevice>,
    texture: Option<NativeTextureId>,
}

impl ExternalTexture {
    pub fn new(gl: Arc<dyn GlesDevice>, filter: TextureFilter) -> Result<Self> {
        let texture = gl.gen_texture()?;
        gl.bind_texture(TextureTarget::ExternalOes, Some(texture));
        gl.set_texture_filter(TextureTarget::ExternalOes, filter);
        gl.bind_texture(TextureTarget::ExternalOes, None);

        Ok(Self {
            gl,
            texture: Some(texture),
        })
    }

    pub fn image(&self) -> ExternalImageHandle {
        self.texture
            .map(ExternalImageHandle::from)
            .unwrap_or(ExternalImageHandle::NONE)
    }

    pub fn abandon(mut self) {
        self.texture = None;
    }
}

impl Drop for ExternalTexture {
    fn drop(&mut self) {
        if let Some(texture) = self.texture.take() {
            self.gl.delete_texture(texture);
        }
    }
}

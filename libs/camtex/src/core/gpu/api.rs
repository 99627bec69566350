// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Graphics API seams: context management (EGL) and the handful of GLES
//! calls the compositor issues.

use std::sync::Arc;

use crate::core::config::TextureFilter;
use crate::core::error::Result;
use crate::core::handles::{FramebufferId, GlContextHandle, NativeTextureId, ProgramId};

/// Texture binding points used by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    /// `GL_TEXTURE_2D`
    Texture2D,
    /// `GL_TEXTURE_EXTERNAL_OES`
    ExternalOes,
}

/// Context management on the display the engine renders with.
///
/// All calls act on the calling thread's current-context slot. Surfaces are
/// never bound; the bridge only renders into framebuffer objects.
pub trait GraphicsApi: Send + Sync {
    /// The context current on the calling thread, if any.
    fn current_context(&self) -> Option<GlContextHandle>;

    /// Create a GLES 3 context that shares objects with `share_with`.
    fn create_shared_context(&self, share_with: Option<GlContextHandle>)
    -> Result<GlContextHandle>;

    /// Make `context` current on the calling thread. `None` releases the
    /// current context.
    fn make_current(&self, context: Option<GlContextHandle>) -> Result<()>;

    fn destroy_context(&self, context: GlContextHandle) -> Result<()>;
}

impl GraphicsApi for Arc<dyn GraphicsApi> {
    fn current_context(&self) -> Option<GlContextHandle> {
        (**self).current_context()
    }

    fn create_shared_context(
        &self,
        share_with: Option<GlContextHandle>,
    ) -> Result<GlContextHandle> {
        (**self).create_shared_context(share_with)
    }

    fn make_current(&self, context: Option<GlContextHandle>) -> Result<()> {
        (**self).make_current(context)
    }

    fn destroy_context(&self, context: GlContextHandle) -> Result<()> {
        (**self).destroy_context(context)
    }
}

/// GLES calls issued on whatever context is current.
///
/// Deliberately thin: each method maps to one GL entry point (or a fixed
/// short sequence for program creation), so the call order the compositor
/// produces is exactly what the driver sees.
pub trait GlesDevice: Send + Sync {
    fn gen_texture(&self) -> Result<NativeTextureId>;

    fn delete_texture(&self, texture: NativeTextureId);

    /// `None` unbinds the target.
    fn bind_texture(&self, target: TextureTarget, texture: Option<NativeTextureId>);

    /// Min and mag filter of the texture bound to `target`.
    fn set_texture_filter(&self, target: TextureTarget, filter: TextureFilter);

    /// `glTexImage2D(GL_TEXTURE_2D, 0, GL_RGBA, w, h, 0, GL_RGBA, GL_UNSIGNED_BYTE, NULL)`
    fn allocate_rgba8(&self, width: u32, height: u32);

    fn generate_mipmap(&self, target: TextureTarget);

    fn gen_framebuffer(&self) -> Result<FramebufferId>;

    fn delete_framebuffer(&self, framebuffer: FramebufferId);

    /// `None` binds the default framebuffer.
    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>);

    /// Attach a 2D texture as color attachment 0 of the bound framebuffer.
    fn attach_color_texture(&self, texture: NativeTextureId);

    fn framebuffer_complete(&self) -> bool;

    /// Compile both stages and link them. Compile and link logs come back in
    /// the error.
    fn create_program(&self, vertex_source: &str, fragment_source: &str) -> Result<ProgramId>;

    fn delete_program(&self, program: ProgramId);

    fn use_program(&self, program: Option<ProgramId>);

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<i32>;

    fn set_uniform_i32(&self, location: i32, value: i32);

    /// `glActiveTexture(GL_TEXTURE0 + unit)`
    fn active_texture(&self, unit: u32);

    /// `glBindSampler(unit, 0)`
    fn unbind_sampler(&self, unit: u32);

    fn viewport(&self, width: u32, height: u32);

    fn draw_triangle_strip(&self, first: i32, count: i32);
}

impl GlesDevice for Arc<dyn GlesDevice> {
    fn gen_texture(&self) -> Result<NativeTextureId> {
        (**self).gen_texture()
    }

    fn delete_texture(&self, texture: NativeTextureId) {
        (**self).delete_texture(texture)
    }

    fn bind_texture(&self, target: TextureTarget, texture: Option<NativeTextureId>) {
        (**self).bind_texture(target, texture)
    }

    fn set_texture_filter(&self, target: TextureTarget, filter: TextureFilter) {
        (**self).set_texture_filter(target, filter)
    }

    fn allocate_rgba8(&self, width: u32, height: u32) {
        (**self).allocate_rgba8(width, height)
    }

    fn generate_mipmap(&self, target: TextureTarget) {
        (**self).generate_mipmap(target)
    }

    fn gen_framebuffer(&self) -> Result<FramebufferId> {
        (**self).gen_framebuffer()
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        (**self).delete_framebuffer(framebuffer)
    }

    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>) {
        (**self).bind_framebuffer(framebuffer)
    }

    fn attach_color_texture(&self, texture: NativeTextureId) {
        (**self).attach_color_texture(texture)
    }

    fn framebuffer_complete(&self) -> bool {
        (**self).framebuffer_complete()
    }

    fn create_program(&self, vertex_source: &str, fragment_source: &str) -> Result<ProgramId> {
        (**self).create_program(vertex_source, fragment_source)
    }

    fn delete_program(&self, program: ProgramId) {
        (**self).delete_program(program)
    }

    fn use_program(&self, program: Option<ProgramId>) {
        (**self).use_program(program)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<i32> {
        (**self).uniform_location(program, name)
    }

    fn set_uniform_i32(&self, location: i32, value: i32) {
        (**self).set_uniform_i32(location, value)
    }

    fn active_texture(&self, unit: u32) {
        (**self).active_texture(unit)
    }

    fn unbind_sampler(&self, unit: u32) {
        (**self).unbind_sampler(unit)
    }

    fn viewport(&self, width: u32, height: u32) {
        (**self).viewport(width, height)
    }

    fn draw_triangle_strip(&self, first: i32, count: i32) {
        (**self).draw_triangle_strip(first, count)
    }
}

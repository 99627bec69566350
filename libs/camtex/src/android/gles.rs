// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! GLES 3 entry points through the `gl` crate.
//!
//! The `gl` bindings are process-global function pointers, loaded once from
//! EGL with `libGLESv3.so` as fallback for drivers that only export core
//! functions from the library.

use std::ffi::{CString, c_void};
use std::ptr;

use libloading::Library;

use super::egl::EglGraphics;
use crate::core::config::TextureFilter;
use crate::core::error::{CameraError, Result};
use crate::core::gpu::{GlesDevice, TextureTarget};
use crate::core::handles::{FramebufferId, NativeTextureId, ProgramId};

/// `GL_TEXTURE_EXTERNAL_OES` (OES_EGL_image_external).
pub const GL_TEXTURE_EXTERNAL_OES: gl::types::GLenum = 0x8D65;

const GLES_LIBRARY: &str = "libGLESv3.so";

fn target(target: TextureTarget) -> gl::types::GLenum {
    match target {
        TextureTarget::Texture2D => gl::TEXTURE_2D,
        TextureTarget::ExternalOes => GL_TEXTURE_EXTERNAL_OES,
    }
}

fn filter(filter: TextureFilter) -> gl::types::GLint {
    match filter {
        TextureFilter::Linear => gl::LINEAR as gl::types::GLint,
        TextureFilter::Nearest => gl::NEAREST as gl::types::GLint,
    }
}

/// [`GlesDevice`] on whatever context is current on the calling thread.
pub struct GlesFunctions {
    _library: Option<Library>,
}

impl GlesFunctions {
    pub fn load(egl: &EglGraphics) -> Result<Self> {
        let library = match unsafe { Library::new(GLES_LIBRARY) } {
            Ok(library) => Some(library),
            Err(e) => {
                tracing::debug!("Camera: {} not loadable ({}), EGL only", GLES_LIBRARY, e);
                None
            }
        };

        gl::load_with(|name| {
            if let Some(f) = egl.get_proc_address(name) {
                return f as *const c_void;
            }
            let Some(library) = library.as_ref() else {
                return ptr::null();
            };
            let Ok(symbol) = CString::new(name) else {
                return ptr::null();
            };
            unsafe {
                library
                    .get::<*const c_void>(symbol.as_bytes_with_nul())
                    .map(|s| *s)
                    .unwrap_or(ptr::null())
            }
        });

        if !gl::GenTextures::is_loaded() || !gl::DrawArrays::is_loaded() {
            return Err(CameraError::PlatformUnsupported(
                "GLES 3 entry points not available".into(),
            ));
        }

        Ok(Self { _library: library })
    }
}

impl GlesDevice for GlesFunctions {
    fn gen_texture(&self) -> Result<NativeTextureId> {
        let mut texture = 0;
        unsafe { gl::GenTextures(1, &mut texture) };
        if texture == 0 {
            return Err(CameraError::Gpu("glGenTextures returned 0".into()));
        }
        Ok(NativeTextureId::from_raw(texture))
    }

    fn delete_texture(&self, texture: NativeTextureId) {
        let name = texture.as_raw();
        unsafe { gl::DeleteTextures(1, &name) };
    }

    fn bind_texture(&self, t: TextureTarget, texture: Option<NativeTextureId>) {
        let name = texture.map(NativeTextureId::as_raw).unwrap_or(0);
        unsafe { gl::BindTexture(target(t), name) };
    }

    fn set_texture_filter(&self, t: TextureTarget, f: TextureFilter) {
        unsafe {
            gl::TexParameteri(target(t), gl::TEXTURE_MIN_FILTER, filter(f));
            gl::TexParameteri(target(t), gl::TEXTURE_MAG_FILTER, filter(f));
        }
    }

    fn allocate_rgba8(&self, width: u32, height: u32) {
        unsafe {
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGBA as gl::types::GLint,
                width as gl::types::GLsizei,
                height as gl::types::GLsizei,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                ptr::null(),
            )
        };
    }

    fn generate_mipmap(&self, t: TextureTarget) {
        unsafe { gl::GenerateMipmap(target(t)) };
    }

    fn gen_framebuffer(&self) -> Result<FramebufferId> {
        let mut framebuffer = 0;
        unsafe { gl::GenFramebuffers(1, &mut framebuffer) };
        if framebuffer == 0 {
            return Err(CameraError::Gpu("glGenFramebuffers returned 0".into()));
        }
        Ok(FramebufferId::from_raw(framebuffer))
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        let name = framebuffer.as_raw();
        unsafe { gl::DeleteFramebuffers(1, &name) };
    }

    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>) {
        let name = framebuffer.map(FramebufferId::as_raw).unwrap_or(0);
        unsafe { gl::BindFramebuffer(gl::FRAMEBUFFER, name) };
    }

    fn attach_color_texture(&self, texture: NativeTextureId) {
        unsafe {
            gl::FramebufferTexture2D(
                gl::FRAMEBUFFER,
                gl::COLOR_ATTACHMENT0,
                gl::TEXTURE_2D,
                texture.as_raw(),
                0,
            )
        };
    }

    fn framebuffer_complete(&self) -> bool {
        unsafe { gl::CheckFramebufferStatus(gl::FRAMEBUFFER) == gl::FRAMEBUFFER_COMPLETE }
    }

    fn create_program(&self, vertex_source: &str, fragment_source: &str) -> Result<ProgramId> {
        let vertex = compile_shader(gl::VERTEX_SHADER, vertex_source)?;
        let fragment = match compile_shader(gl::FRAGMENT_SHADER, fragment_source) {
            Ok(fragment) => fragment,
            Err(e) => {
                unsafe { gl::DeleteShader(vertex) };
                return Err(e);
            }
        };

        unsafe {
            let program = gl::CreateProgram();
            gl::AttachShader(program, vertex);
            gl::AttachShader(program, fragment);
            gl::LinkProgram(program);

            // The program keeps its own reference.
            gl::DetachShader(program, vertex);
            gl::DetachShader(program, fragment);
            gl::DeleteShader(vertex);
            gl::DeleteShader(fragment);

            let mut status = 0;
            gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);
            if status == 0 {
                let log = program_info_log(program);
                gl::DeleteProgram(program);
                return Err(CameraError::Gpu(format!("Program link failed: {}", log)));
            }

            Ok(ProgramId::from_raw(program))
        }
    }

    fn delete_program(&self, program: ProgramId) {
        unsafe { gl::DeleteProgram(program.as_raw()) };
    }

    fn use_program(&self, program: Option<ProgramId>) {
        unsafe { gl::UseProgram(program.map(ProgramId::as_raw).unwrap_or(0)) };
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<i32> {
        let name = CString::new(name).ok()?;
        let location = unsafe { gl::GetUniformLocation(program.as_raw(), name.as_ptr()) };
        (location >= 0).then_some(location)
    }

    fn set_uniform_i32(&self, location: i32, value: i32) {
        unsafe { gl::Uniform1i(location, value) };
    }

    fn active_texture(&self, unit: u32) {
        unsafe { gl::ActiveTexture(gl::TEXTURE0 + unit) };
    }

    fn unbind_sampler(&self, unit: u32) {
        unsafe { gl::BindSampler(unit, 0) };
    }

    fn viewport(&self, width: u32, height: u32) {
        unsafe { gl::Viewport(0, 0, width as i32, height as i32) };
    }

    fn draw_triangle_strip(&self, first: i32, count: i32) {
        unsafe { gl::DrawArrays(gl::TRIANGLE_STRIP, first, count) };
    }
}

fn compile_shader(kind: gl::types::GLenum, source: &str) -> Result<gl::types::GLuint> {
    let source = CString::new(source)
        .map_err(|_| CameraError::Gpu("Shader source contains a NUL byte".into()))?;

    unsafe {
        let shader = gl::CreateShader(kind);
        gl::ShaderSource(shader, 1, &source.as_ptr(), ptr::null());
        gl::CompileShader(shader);

        let mut status = 0;
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);
        if status == 0 {
            let log = shader_info_log(shader);
            gl::DeleteShader(shader);
            let stage = if kind == gl::VERTEX_SHADER {
                "vertex"
            } else {
                "fragment"
            };
            return Err(CameraError::Gpu(format!(
                "{} shader compile failed: {}",
                stage, log
            )));
        }

        Ok(shader)
    }
}

unsafe fn shader_info_log(shader: gl::types::GLuint) -> String {
    let mut length = 0;
    unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut length) };
    let mut log = vec![0u8; length.max(1) as usize];
    let mut written = 0;
    unsafe {
        gl::GetShaderInfoLog(shader, length, &mut written, log.as_mut_ptr().cast())
    };
    log.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&log).into_owned()
}

unsafe fn program_info_log(program: gl::types::GLuint) -> String {
    let mut length = 0;
    unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut length) };
    let mut log = vec![0u8; length.max(1) as usize];
    let mut written = 0;
    unsafe {
        gl::GetProgramInfoLog(program, length, &mut written, log.as_mut_ptr().cast())
    };
    log.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&log).into_owned()
}

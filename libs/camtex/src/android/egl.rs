// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! EGL context management on the engine's display.

use std::ffi::c_void;

use khronos_egl as egl;

use crate::core::error::{CameraError, Result};
use crate::core::gpu::GraphicsApi;
use crate::core::handles::GlContextHandle;

type EglInstance = egl::DynamicInstance<egl::EGL1_4>;

// EGL_KHR_create_context
const EGL_OPENGL_ES3_BIT_KHR: egl::Int = 0x0040;
const EGL_CONTEXT_MAJOR_VERSION_KHR: egl::Int = 0x3098;
const EGL_CONTEXT_MINOR_VERSION_KHR: egl::Int = 0x30FB;

const CONFIG_ATTRIBS: [egl::Int; 15] = [
    egl::RENDERABLE_TYPE,
    EGL_OPENGL_ES3_BIT_KHR,
    egl::BLUE_SIZE,
    8,
    egl::GREEN_SIZE,
    8,
    egl::RED_SIZE,
    8,
    egl::ALPHA_SIZE,
    8,
    egl::DEPTH_SIZE,
    16,
    egl::STENCIL_SIZE,
    8,
    egl::NONE,
];

const CONTEXT_ATTRIBS: [egl::Int; 5] = [
    EGL_CONTEXT_MAJOR_VERSION_KHR,
    3,
    EGL_CONTEXT_MINOR_VERSION_KHR,
    0,
    egl::NONE,
];

/// `libEGL.so` loaded at runtime, bound to one display.
pub struct EglGraphics {
    egl: EglInstance,
    display: egl::Display,
    config: egl::Config,
}

// EGLDisplay and EGLConfig are process-wide handles; EGL calls on them are
// thread-safe. Context currency is per-thread and handled by EGL itself.
unsafe impl Send for EglGraphics {}
unsafe impl Sync for EglGraphics {}

impl EglGraphics {
    /// Load EGL and pick an ES3 config on the current display (the default
    /// display when nothing is current).
    pub fn load() -> Result<Self> {
        let egl = unsafe { EglInstance::load_required() }.map_err(|e| {
            CameraError::PlatformUnsupported(format!("Unable to load libEGL: {}", e))
        })?;

        let display = match egl.get_current_display() {
            Some(display) => display,
            None => {
                let display = unsafe { egl.get_display(egl::DEFAULT_DISPLAY) }.ok_or_else(|| {
                    CameraError::ContextCreationFailed("No default EGL display".into())
                })?;
                egl.initialize(display).map_err(|e| {
                    CameraError::ContextCreationFailed(format!("eglInitialize failed: {}", e))
                })?;
                display
            }
        };

        let config = egl
            .choose_first_config(display, &CONFIG_ATTRIBS)
            .map_err(|e| {
                CameraError::ContextCreationFailed(format!("eglChooseConfig failed: {}", e))
            })?
            .ok_or_else(|| {
                CameraError::ContextCreationFailed("No RGBA8888 ES3 EGL config".into())
            })?;

        tracing::debug!("Camera: EGL display {:?}", display.as_ptr());

        Ok(Self {
            egl,
            display,
            config,
        })
    }

    pub fn display_ptr(&self) -> *mut c_void {
        self.display.as_ptr()
    }

    /// Extension or core entry point by name.
    pub fn get_proc_address(&self, name: &str) -> Option<extern "system" fn()> {
        self.egl.get_proc_address(name)
    }
}

fn to_handle(context: egl::Context) -> GlContextHandle {
    GlContextHandle::from_raw(context.as_ptr() as usize)
}

fn from_handle(handle: GlContextHandle) -> egl::Context {
    unsafe { egl::Context::from_ptr(handle.as_raw() as egl::EGLContext) }
}

impl GraphicsApi for EglGraphics {
    fn current_context(&self) -> Option<GlContextHandle> {
        self.egl.get_current_context().map(to_handle)
    }

    fn create_shared_context(
        &self,
        share_with: Option<GlContextHandle>,
    ) -> Result<GlContextHandle> {
        let context = self
            .egl
            .create_context(
                self.display,
                self.config,
                share_with.map(from_handle),
                &CONTEXT_ATTRIBS,
            )
            .map_err(|e| {
                CameraError::ContextCreationFailed(format!("eglCreateContext failed: {}", e))
            })?;
        Ok(to_handle(context))
    }

    fn make_current(&self, context: Option<GlContextHandle>) -> Result<()> {
        // No surfaces: the bridge only renders into framebuffer objects.
        self.egl
            .make_current(self.display, None, None, context.map(from_handle))
            .map_err(|e| CameraError::ContextSwitchFailed(format!("eglMakeCurrent failed: {}", e)))
    }

    fn destroy_context(&self, context: GlContextHandle) -> Result<()> {
        self.egl
            .destroy_context(self.display, from_handle(context))
            .map_err(|e| CameraError::Gpu(format!("eglDestroyContext failed: {}", e)))
    }
}

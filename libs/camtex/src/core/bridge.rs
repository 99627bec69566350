// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Hands the composite texture to the rendering engine.

use std::sync::Arc;

use crate::core::handles::{EngineTextureHandle, GlContextHandle, NativeTextureId};

/// Work queued to run on the engine's render thread before its next frame.
pub type BeforeRenderTask = Box<dyn FnOnce() + Send + 'static>;

/// The rendering engine's device context.
pub trait DeviceContext: Send + Sync {
    /// The engine's main GL context. The bridge's shared context is created
    /// in its share group.
    fn main_context(&self) -> Option<GlContextHandle>;

    /// Run `task` at the engine's before-render point: after the current
    /// frame has been submitted and before the next one starts.
    fn before_render(&self, task: BeforeRenderTask);
}

impl DeviceContext for Arc<dyn DeviceContext> {
    fn main_context(&self) -> Option<GlContextHandle> {
        (**self).main_context()
    }

    fn before_render(&self, task: BeforeRenderTask) {
        (**self).before_render(task)
    }
}

/// The engine's texture handle table.
pub trait TextureRegistry: Send + Sync {
    /// Make `handle` sample from the GL texture `native` from now on. The
    /// handle keeps its identity.
    fn override_backing_store(&self, handle: EngineTextureHandle, native: NativeTextureId);
}

impl TextureRegistry for Arc<dyn TextureRegistry> {
    fn override_backing_store(&self, handle: EngineTextureHandle, native: NativeTextureId) {
        (**self).override_backing_store(handle, native)
    }
}

/// Schedules backing-store swaps on the before-render hook so a swap is never
/// observed mid-frame.
#[derive(Clone)]
pub struct TextureOverrideBridge {
    device: Arc<dyn DeviceContext>,
    registry: Arc<dyn TextureRegistry>,
}

impl TextureOverrideBridge {
    pub fn new(device: Arc<dyn DeviceContext>, registry: Arc<dyn TextureRegistry>) -> Self {
        Self { device, registry }
    }

    pub fn device(&self) -> &Arc<dyn DeviceContext> {
        &self.device
    }

    /// Queue `handle` → `native` for the next before-render point.
    pub fn schedule(&self, handle: EngineTextureHandle, native: NativeTextureId) {
        let registry = Arc::clone(&self.registry);
        self.device.before_render(Box::new(move || {
            tracing::trace!("Camera: {} now backed by {}", handle, native);
            registry.override_backing_store(handle, native);
        }));
    }
}

impl std::fmt::Debug for TextureOverrideBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureOverrideBridge").finish_non_exhaustive()
    }
}

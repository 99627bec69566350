// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Typed opaque handles for OS and GPU objects.
//!
//! Nothing in the core dereferences these. Each one stands in for a pointer or
//! object name that belongs to a collaborator (camera subsystem, EGL, GLES, the
//! rendering engine). Ownership is recorded on the type:
//!
//! | Handle | Allocated by | Released by |
//! |---|---|---|
//! | [`GlContextHandle`] | [`GraphicsApi`](crate::GraphicsApi) | [`SharedGraphicsContext`](crate::SharedGraphicsContext) drop |
//! | [`NativeTextureId`], [`FramebufferId`], [`ProgramId`] | [`GlesDevice`](crate::GlesDevice) | compositor drop |
//! | [`ExternalImageHandle`] | core (capture mode) or caller (override mode) | whoever allocated it |
//! | [`EngineTextureHandle`] | rendering engine | never released here |
//! | capture handles | [`CameraPlatform`](crate::CameraPlatform) | `CaptureSession` drop |

use std::fmt;

macro_rules! opaque_handle {
    ($(#[$meta:meta])* $name:ident($repr:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name($repr);

        impl $name {
            /// Wrap a raw platform value.
            pub const fn from_raw(raw: $repr) -> Self {
                Self(raw)
            }

            /// The raw platform value.
            pub const fn as_raw(self) -> $repr {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:#x})", stringify!($name), self.0)
            }
        }
    };
}

// GPU side

opaque_handle!(
    /// An EGL context (`EGLContext`).
    GlContextHandle(usize)
);

opaque_handle!(
    /// A GL texture object name.
    NativeTextureId(u32)
);

opaque_handle!(
    /// A GL framebuffer object name.
    FramebufferId(u32)
);

opaque_handle!(
    /// A linked GL program object name.
    ProgramId(u32)
);

opaque_handle!(
    /// The external camera image as seen by the sampler: a
    /// `GL_TEXTURE_EXTERNAL_OES` texture name.
    ExternalImageHandle(u32)
);

opaque_handle!(
    /// A texture handle owned by the rendering engine. Only its backing store
    /// is ever swapped; its identity never changes.
    EngineTextureHandle(u64)
);

impl ExternalImageHandle {
    /// GL's reserved "no texture" name. Sampling it yields black.
    pub const NONE: Self = Self(0);
}

impl From<NativeTextureId> for ExternalImageHandle {
    fn from(texture: NativeTextureId) -> Self {
        Self(texture.as_raw())
    }
}

// Capture side

opaque_handle!(
    /// `ACameraManager*`
    CameraManagerHandle(usize)
);

opaque_handle!(
    /// `ACameraDevice*`
    CameraDeviceHandle(usize)
);

opaque_handle!(
    /// `ACaptureRequest*`
    CaptureRequestHandle(usize)
);

opaque_handle!(
    /// `ACaptureSessionOutput*`
    SessionOutputHandle(usize)
);

opaque_handle!(
    /// `ACaptureSessionOutputContainer*`
    OutputContainerHandle(usize)
);

opaque_handle!(
    /// `ACameraOutputTarget*`
    OutputTargetHandle(usize)
);

opaque_handle!(
    /// `ACameraCaptureSession*`
    CaptureSessionHandle(usize)
);

opaque_handle!(
    /// The OS buffer queue feeding the external image (`AImageReader*`).
    ImageSurfaceHandle(usize)
);

opaque_handle!(
    /// `ANativeWindow*` producer end of an image surface.
    NativeWindowHandle(usize)
);

/// Platform camera identifier as reported by the camera id list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CameraId(String);

impl CameraId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CameraId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

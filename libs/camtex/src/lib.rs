// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Live device camera feed as an engine-visible GPU texture.
//!
//! The OS capture pipeline fills an *external image* asynchronously on its own
//! thread. Once per render iteration [`NativeCamera::update_frame`] latches the
//! latest image, draws it into an RGBA `GL_TEXTURE_2D` on a context that shares
//! objects with the engine's main context, and schedules the engine to treat
//! that texture as the backing store of one of its texture handles before the
//! next frame is rendered.
//!
//! Everything the core needs from the outside world (camera subsystem, EGL,
//! GLES, permission prompt, engine device context) comes in through the traits
//! re-exported below, so the lifecycle can run against test doubles as well as
//! the Android backend in the `android` module.

pub mod core;

#[cfg(target_os = "android")]
pub mod android;

pub use core::{
    BeforeRenderTask, BoxFuture, CameraConfig, CameraDeviceHandle, CameraError, CameraFacing,
    CameraId, CameraInfo, CameraManagerHandle, CameraPlatform, CameraSession, CaptureBackend,
    CaptureEventHandler, CaptureFailure, CaptureRequestHandle, CaptureSession,
    CaptureSessionHandle, ContextScope, DeviceContext, DiagnosticSink, EngineTextureHandle,
    ExternalImageCompositor, ExternalImageHandle, ExternalTexture, ForwardingCaptureEvents,
    FramebufferId, GlContextHandle, GlesDevice, GraphicsApi, ImageSurfaceHandle, LensFacing,
    NativeCamera, NativeTextureId, NativeWindowHandle, NoopCaptureEvents, OutputContainerHandle,
    OutputTargetHandle, PermissionGate, ProgramId, Result, SessionOutputHandle, SessionState,
    SharedGraphicsContext, StaticPermissionGate, TextureFilter, TextureOverrideBridge,
    TextureRegistry, TextureTarget, TracingDiagnostics,
};

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod bridge;
pub mod capture;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod gpu;
pub mod handles;
pub mod permissions;
pub mod session;

pub use bridge::{BeforeRenderTask, DeviceContext, TextureOverrideBridge, TextureRegistry};
pub use capture::{
    CameraFacing, CameraInfo, CameraPlatform, CaptureBackend, CaptureEventHandler,
    CaptureFailure, CaptureSession, ForwardingCaptureEvents, LensFacing, NoopCaptureEvents,
};
pub use config::{CameraConfig, TextureFilter};
pub use diagnostics::{DiagnosticSink, TracingDiagnostics};
pub use error::{CameraError, Result};
pub use gpu::{
    ContextScope, ExternalImageCompositor, ExternalTexture, GlesDevice, GraphicsApi,
    SharedGraphicsContext, TextureTarget,
};
pub use handles::{
    CameraDeviceHandle, CameraId, CameraManagerHandle, CaptureRequestHandle,
    CaptureSessionHandle, EngineTextureHandle, ExternalImageHandle, FramebufferId,
    GlContextHandle, ImageSurfaceHandle, NativeTextureId, NativeWindowHandle,
    OutputContainerHandle, OutputTargetHandle, ProgramId, SessionOutputHandle,
};
pub use permissions::{BoxFuture, PermissionGate, StaticPermissionGate};
pub use session::{CameraSession, NativeCamera, SessionState};

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Camera session lifecycle: `open` → `update_frame` per render iteration →
//! `close`.
//!
//! ```text
//! Closed ──open()──▶ Opening ──permission + setup──▶ Open
//!    ▲                  │ error                        │ close()
//!    └──────────────────┴──────────── Closing ◀────────┘
//! ```
//!
//! `update_frame` and `close` are synchronous and run on the thread that owns
//! the engine's main context. `open` suspends only on the permission gate;
//! everything after it completes on the continuation before `open` returns.

use std::sync::Arc;

use crate::core::bridge::{DeviceContext, TextureOverrideBridge, TextureRegistry};
use crate::core::capture::{
    CameraFacing, CameraInfo, CameraPlatform, CaptureBackend, CaptureEventHandler,
    CaptureSession, ForwardingCaptureEvents,
};
use crate::core::config::CameraConfig;
use crate::core::diagnostics::{DiagnosticSink, TracingDiagnostics};
use crate::core::error::{CameraError, Result};
use crate::core::gpu::{
    ContextScope, ExternalImageCompositor, ExternalTexture, GlesDevice, GraphicsApi,
    SharedGraphicsContext,
};
use crate::core::handles::{
    EngineTextureHandle, ExternalImageHandle, GlContextHandle, NativeTextureId,
};
use crate::core::permissions::PermissionGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Closed,
    Opening,
    Open,
    Closing,
}

/// The one camera instance a controller has open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraSession {
    pub width: u32,
    pub height: u32,
    pub facing: CameraFacing,
    /// The caller supplies the external image; no OS capture runs.
    pub override_mode: bool,
    pub state: SessionState,
}

/// Controller for one live camera texture.
///
/// Owns the shared GL context, the composite texture and its pass, the
/// external image texture and the OS capture session. Everything is released
/// by [`close`](Self::close), which also runs on drop.
pub struct NativeCamera {
    config: CameraConfig,
    graphics: Arc<dyn GraphicsApi>,
    gl: Arc<dyn GlesDevice>,
    bridge: TextureOverrideBridge,
    permissions: Arc<dyn PermissionGate>,
    diagnostics: Arc<dyn DiagnosticSink>,
    capture_platform: Option<Arc<dyn CameraPlatform>>,
    capture_events: Option<Arc<dyn CaptureEventHandler>>,
    override_image: Option<ExternalImageHandle>,
    state: SessionState,
    session: Option<OpenSession>,
}

impl NativeCamera {
    pub fn new(
        config: CameraConfig,
        graphics: Arc<dyn GraphicsApi>,
        gl: Arc<dyn GlesDevice>,
        device: Arc<dyn DeviceContext>,
        registry: Arc<dyn TextureRegistry>,
        permissions: Arc<dyn PermissionGate>,
    ) -> Self {
        Self {
            config,
            graphics,
            gl,
            bridge: TextureOverrideBridge::new(device, registry),
            permissions,
            diagnostics: Arc::new(TracingDiagnostics),
            capture_platform: None,
            capture_events: None,
            override_image: None,
            state: SessionState::Closed,
            session: None,
        }
    }

    /// OS camera subsystem used outside override mode. Without one, `open`
    /// fails with [`CameraError::PlatformUnsupported`] unless the config
    /// enables override mode.
    pub fn with_capture_platform(mut self, platform: Arc<dyn CameraPlatform>) -> Self {
        self.capture_platform = Some(platform);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Replace the default [`ForwardingCaptureEvents`] handler.
    pub fn with_capture_events(mut self, events: Arc<dyn CaptureEventHandler>) -> Self {
        self.capture_events = Some(events);
        self
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    pub fn session(&self) -> Option<CameraSession> {
        self.session.as_ref().map(|open| CameraSession {
            state: self.state,
            ..open.info
        })
    }

    /// GL name of the composite texture while open.
    pub fn composite_texture(&self) -> Option<NativeTextureId> {
        self.session
            .as_ref()
            .and_then(|open| open.compositor.as_ref())
            .map(ExternalImageCompositor::texture)
    }

    /// The shared context, when `open` had to create one.
    pub fn shared_context(&self) -> Option<GlContextHandle> {
        self.session
            .as_ref()
            .and_then(|open| open.context.as_ref())
            .map(SharedGraphicsContext::handle)
    }

    /// Every camera the OS reports, with its lens facing.
    pub fn list_cameras(&self) -> Result<Vec<CameraInfo>> {
        self.capture_backend()?.list_cameras()
    }

    /// Open the camera facing `front_camera ? front : back` at
    /// `width`x`height`.
    ///
    /// Suspends on the permission gate, then allocates everything
    /// synchronously. On error nothing stays allocated and the controller is
    /// `Closed`. Opening an already open controller fails with
    /// [`CameraError::AlreadyOpen`] and leaves the open session untouched.
    pub async fn open(&mut self, width: u32, height: u32, front_camera: bool) -> Result<()> {
        if self.session.is_some() {
            return Err(CameraError::AlreadyOpen);
        }
        if width == 0 || height == 0 {
            return Err(CameraError::InvalidDimensions { width, height });
        }
        self.config.validate()?;

        let facing = CameraFacing::from_front(front_camera);
        let override_mode = self.config.override_texture;

        // Capture support is decided before the permission prompt so an
        // unsupported device never allocates or prompts.
        let backend = if override_mode {
            None
        } else {
            Some(self.capture_backend()?)
        };

        tracing::info!(
            "Camera: opening {} camera {}x{}{}",
            facing,
            width,
            height,
            if override_mode { " (override mode)" } else { "" }
        );

        // Back to `Closed` if this future is dropped while suspended.
        let permissions = Arc::clone(&self.permissions);
        let opening = OpeningGuard::begin(&mut self.state);
        if !permissions.check_camera_permission().await {
            drop(opening);
            tracing::warn!("Camera: permission denied");
            return Err(CameraError::PermissionDenied);
        }
        opening.complete();

        let info = CameraSession {
            width,
            height,
            facing,
            override_mode,
            state: SessionState::Open,
        };

        match self.build_session(info, backend.as_ref()) {
            Ok(open) => {
                self.session = Some(open);
                self.state = SessionState::Open;
                tracing::info!("Camera: open");
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Closed;
                tracing::error!("Camera: open failed: {}", e);
                Err(e)
            }
        }
    }

    /// Supply the external image to sample in override mode. May be called
    /// before or after `open`; the latest handle is used by the next
    /// `update_frame`. No texture is touched here.
    pub fn set_texture_override(&mut self, image: ExternalImageHandle) -> Result<()> {
        if !self.config.override_texture {
            return Err(CameraError::InvalidMode(
                "set_texture_override requires override_texture".into(),
            ));
        }
        tracing::debug!("Camera: override image {}", image);
        self.override_image = Some(image);
        Ok(())
    }

    /// Redraw the composite texture from the latest camera image and schedule
    /// `engine_texture` to be backed by it before the next engine frame.
    ///
    /// A [`CameraError::ContextSwitchFailed`] is fatal for the session; call
    /// [`close`](Self::close).
    pub fn update_frame(&mut self, engine_texture: EngineTextureHandle) -> Result<()> {
        if self.state != SessionState::Open {
            return Err(CameraError::NotOpen);
        }
        let open = self.session.as_ref().ok_or(CameraError::NotOpen)?;
        let compositor = open
            .compositor
            .as_ref()
            .ok_or_else(|| CameraError::Gpu("composite texture missing".into()))?;

        let scope = open.enter(&self.graphics)?;

        let image = if open.info.override_mode {
            self.override_image.unwrap_or(ExternalImageHandle::NONE)
        } else {
            if let Some(capture) = &open.capture {
                match capture.update_latest_image() {
                    Ok(true) => {}
                    Ok(false) => tracing::trace!("Camera: no new image this frame"),
                    Err(e) => tracing::warn!("Camera: failed to latch latest image: {}", e),
                }
            }
            open.external
                .as_ref()
                .map(ExternalTexture::image)
                .unwrap_or(ExternalImageHandle::NONE)
        };

        compositor.draw(image);
        scope.exit()?;

        self.bridge.schedule(engine_texture, compositor.texture());
        Ok(())
    }

    /// Stop capture and release every resource. Idempotent; never fails.
    /// Release failures go to the diagnostic sink.
    ///
    /// When `open` ran on the caller's current context instead of creating a
    /// shared one, that context must be current again here. Otherwise the GL
    /// names are abandoned and the sink is told.
    pub fn close(&mut self) {
        let Some(open) = self.session.take() else {
            self.state = SessionState::Closed;
            return;
        };

        self.state = SessionState::Closing;
        tracing::info!("Camera: closing");
        open.teardown(&self.graphics, self.diagnostics.as_ref());
        self.state = SessionState::Closed;
        tracing::info!("Camera: closed");
    }

    fn capture_backend(&self) -> Result<CaptureBackend> {
        let platform = self.capture_platform.as_ref().ok_or_else(|| {
            CameraError::PlatformUnsupported("no native camera backend available".into())
        })?;

        let level = platform.api_level();
        if level < self.config.min_capture_api_level {
            return Err(CameraError::PlatformUnsupported(format!(
                "native camera needs API level {}, device has {}",
                self.config.min_capture_api_level, level
            )));
        }

        let events = self.capture_events.clone().unwrap_or_else(|| {
            Arc::new(ForwardingCaptureEvents::new(Arc::clone(&self.diagnostics)))
        });

        Ok(CaptureBackend::new(
            Arc::clone(platform),
            events,
            Arc::clone(&self.diagnostics),
        ))
    }

    fn build_session(
        &self,
        info: CameraSession,
        backend: Option<&CaptureBackend>,
    ) -> Result<OpenSession> {
        // A shared context is only needed when nothing is current here.
        // Otherwise GL work runs on the context the caller already has.
        let current = self.graphics.current_context();
        let (context, scope) = if current.is_none() {
            let (context, scope) = SharedGraphicsContext::create(
                Arc::clone(&self.graphics),
                self.bridge.device().main_context(),
                Arc::clone(&self.diagnostics),
            )?;
            (Some(context), scope)
        } else {
            (None, ContextScope::inert(Arc::clone(&self.graphics)))
        };

        let borrowed = if context.is_none() { current } else { None };
        let mut open = OpenSession {
            info,
            capture: None,
            external: None,
            compositor: None,
            context,
            borrowed,
        };

        if let Err(e) = self.allocate(&mut open, backend) {
            open.release_current();
            drop(scope);
            open.teardown(&self.graphics, self.diagnostics.as_ref());
            return Err(e);
        }

        if let Err(e) = scope.exit() {
            open.teardown(&self.graphics, self.diagnostics.as_ref());
            return Err(e);
        }

        Ok(open)
    }

    // Runs with the session's context current.
    fn allocate(&self, open: &mut OpenSession, backend: Option<&CaptureBackend>) -> Result<()> {
        let CameraSession {
            width,
            height,
            facing,
            ..
        } = open.info;

        open.compositor = Some(ExternalImageCompositor::new(
            Arc::clone(&self.gl),
            width,
            height,
            &self.config,
        )?);

        if let Some(backend) = backend {
            let external = ExternalTexture::new(Arc::clone(&self.gl), self.config.texture_filter)?;
            let image = external.image();
            open.external = Some(external);
            open.capture = Some(backend.start(
                facing,
                image,
                width,
                height,
                self.config.image_queue_depth(),
            )?);
        }

        Ok(())
    }
}

impl Drop for NativeCamera {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for NativeCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeCamera")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("session", &self.session())
            .finish_non_exhaustive()
    }
}

/// Holds the controller in `Opening` across the permission await.
struct OpeningGuard<'a> {
    state: &'a mut SessionState,
    armed: bool,
}

impl<'a> OpeningGuard<'a> {
    fn begin(state: &'a mut SessionState) -> Self {
        *state = SessionState::Opening;
        Self { state, armed: true }
    }

    fn complete(mut self) {
        self.armed = false;
    }
}

impl Drop for OpeningGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.state = SessionState::Closed;
        }
    }
}

/// Resources of one open session, in allocation order.
struct OpenSession {
    info: CameraSession,
    capture: Option<CaptureSession>,
    external: Option<ExternalTexture>,
    compositor: Option<ExternalImageCompositor>,
    context: Option<SharedGraphicsContext>,
    // Caller's context the GL objects were created on when no shared
    // context was needed.
    borrowed: Option<GlContextHandle>,
}

impl OpenSession {
    fn enter(&self, graphics: &Arc<dyn GraphicsApi>) -> Result<ContextScope> {
        match &self.context {
            Some(context) => context.enter(),
            None => {
                let current = graphics.current_context();
                if current != self.borrowed {
                    return Err(CameraError::ContextSwitchFailed(format!(
                        "camera GL objects belong to context {:?} but {:?} is current",
                        self.borrowed, current
                    )));
                }
                Ok(ContextScope::inert(Arc::clone(graphics)))
            }
        }
    }

    /// Stop capture, then delete GL objects. Requires the session's context
    /// to be current.
    fn release_current(&mut self) {
        if let Some(capture) = self.capture.take() {
            capture.stop();
        }
        self.compositor = None;
        self.external = None;
    }

    fn teardown(mut self, graphics: &Arc<dyn GraphicsApi>, diagnostics: &dyn DiagnosticSink) {
        if let Some(capture) = self.capture.take() {
            capture.stop();
        }

        if self.compositor.is_some() || self.external.is_some() {
            match self.enter(graphics) {
                Ok(scope) => {
                    self.release_current();
                    if let Err(e) = scope.exit() {
                        diagnostics.teardown_failed("GL context restore", &e);
                    }
                }
                Err(e) => {
                    diagnostics.teardown_failed("camera GL objects", &e);
                    if let Some(compositor) = self.compositor.take() {
                        compositor.abandon();
                    }
                    if let Some(external) = self.external.take() {
                        external.abandon();
                    }
                }
            }
        }

        // Destroyed last, after everything that lives in its share group.
        self.context = None;
    }
}

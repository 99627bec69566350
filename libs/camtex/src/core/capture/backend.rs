// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use super::{CameraFacing, CameraPlatform, CaptureEventHandler, LensFacing};
use crate::core::diagnostics::DiagnosticSink;
use crate::core::error::{CameraError, Result};
use crate::core::handles::{
    CameraDeviceHandle, CameraId, CameraManagerHandle, CaptureRequestHandle, CaptureSessionHandle,
    ExternalImageHandle, ImageSurfaceHandle, NativeWindowHandle, OutputContainerHandle,
    OutputTargetHandle, SessionOutputHandle,
};

/// A camera reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraInfo {
    pub id: CameraId,
    pub facing: LensFacing,
}

/// Opens one physical camera and runs one repeating preview request into a
/// single output surface.
#[derive(Clone)]
pub struct CaptureBackend {
    platform: Arc<dyn CameraPlatform>,
    events: Arc<dyn CaptureEventHandler>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl CaptureBackend {
    pub fn new(
        platform: Arc<dyn CameraPlatform>,
        events: Arc<dyn CaptureEventHandler>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            platform,
            events,
            diagnostics,
        }
    }

    pub fn platform(&self) -> &Arc<dyn CameraPlatform> {
        &self.platform
    }

    /// Every camera id with its lens facing, in platform order.
    pub fn list_cameras(&self) -> Result<Vec<CameraInfo>> {
        let manager = self.platform.create_manager()?;
        let cameras = self.describe_cameras(manager);
        self.release("camera manager", self.platform.delete_manager(manager));
        cameras
    }

    /// First camera whose lens faces `facing`, `None` when there is none.
    pub fn select_camera(
        &self,
        manager: CameraManagerHandle,
        facing: CameraFacing,
    ) -> Result<Option<CameraId>> {
        let wanted = facing.lens();
        for id in self.platform.camera_ids(manager)? {
            match self.platform.lens_facing(manager, &id) {
                Ok(lens) if lens == wanted => return Ok(Some(id)),
                Ok(_) => {}
                Err(e) => tracing::debug!("Camera: skipping {} (no lens facing: {})", id, e),
            }
        }
        Ok(None)
    }

    /// Open the `facing` camera and start streaming into a new image surface
    /// latched into `image`.
    ///
    /// On error every handle acquired so far is released before returning.
    pub fn start(
        &self,
        facing: CameraFacing,
        image: ExternalImageHandle,
        width: u32,
        height: u32,
        queue_depth: u32,
    ) -> Result<CaptureSession> {
        let platform = self.platform.as_ref();
        let mut session = CaptureSession::empty(
            Arc::clone(&self.platform),
            Arc::clone(&self.diagnostics),
        );

        let manager = platform.create_manager()?;
        session.manager = Some(manager);

        let id = self
            .select_camera(manager, facing)?
            .ok_or(CameraError::CameraNotFound(facing))?;
        tracing::info!("Camera: opening {} camera {}", facing, id);

        let device = platform.open_device(manager, &id, Arc::clone(&self.events))?;
        session.device = Some(device);

        let surface = platform.create_image_surface(image, width, height, queue_depth)?;
        session.surface = Some(surface);

        let window = platform.acquire_window(surface)?;
        session.window = Some(window);

        let request = platform.create_preview_request(device)?;
        session.request = Some(request);

        let output = platform.create_session_output(window)?;
        session.output = Some(output);

        let container = platform.create_output_container()?;
        session.container = Some(container);
        platform.add_output(container, output)?;

        let target = platform.create_output_target(window)?;
        session.target = Some(target);
        platform.add_target(request, target)?;

        let capture = platform.create_capture_session(device, container, Arc::clone(&self.events))?;
        session.session = Some(capture);

        platform.set_repeating_request(capture, request, Arc::clone(&self.events))?;
        session.repeating = true;

        session.camera_id = Some(id);
        tracing::info!("Camera: repeating preview request started ({}x{})", width, height);
        Ok(session)
    }

    // Cameras without readable lens facing are skipped, as in `select_camera`.
    fn describe_cameras(&self, manager: CameraManagerHandle) -> Result<Vec<CameraInfo>> {
        let cameras = self
            .platform
            .camera_ids(manager)?
            .into_iter()
            .filter_map(|id| match self.platform.lens_facing(manager, &id) {
                Ok(facing) => Some(CameraInfo { id, facing }),
                Err(e) => {
                    tracing::debug!("Camera: skipping {} (no lens facing: {})", id, e);
                    None
                }
            })
            .collect();
        Ok(cameras)
    }

    fn release(&self, resource: &'static str, result: Result<()>) {
        if let Err(e) = result {
            self.diagnostics.teardown_failed(resource, &e);
        }
    }
}

impl std::fmt::Debug for CaptureBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureBackend").finish_non_exhaustive()
    }
}

/// Every OS handle of one running capture. Released in teardown order on
/// [`stop`](Self::stop) or drop.
pub struct CaptureSession {
    platform: Arc<dyn CameraPlatform>,
    diagnostics: Arc<dyn DiagnosticSink>,
    camera_id: Option<CameraId>,
    manager: Option<CameraManagerHandle>,
    device: Option<CameraDeviceHandle>,
    surface: Option<ImageSurfaceHandle>,
    window: Option<NativeWindowHandle>,
    request: Option<CaptureRequestHandle>,
    output: Option<SessionOutputHandle>,
    container: Option<OutputContainerHandle>,
    target: Option<OutputTargetHandle>,
    session: Option<CaptureSessionHandle>,
    repeating: bool,
}

impl CaptureSession {
    fn empty(platform: Arc<dyn CameraPlatform>, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            platform,
            diagnostics,
            camera_id: None,
            manager: None,
            device: None,
            surface: None,
            window: None,
            request: None,
            output: None,
            container: None,
            target: None,
            session: None,
            repeating: false,
        }
    }

    pub fn camera_id(&self) -> Option<&CameraId> {
        self.camera_id.as_ref()
    }

    /// Latch the newest captured image into the external image.
    pub fn update_latest_image(&self) -> Result<bool> {
        let surface = self
            .surface
            .ok_or_else(|| CameraError::Capture("image surface released".into()))?;
        self.platform.update_latest_image(surface)
    }

    /// Stop capturing and release every handle. Never fails.
    pub fn stop(mut self) {
        self.release_all();
    }

    fn release_all(&mut self) {
        let platform = Arc::clone(&self.platform);

        if let Some(session) = self.session.take() {
            if std::mem::take(&mut self.repeating) {
                self.report("repeating request", platform.stop_repeating(session));
            }
            self.report("capture session", platform.close_session(session));
        }
        if let Some(container) = self.container.take() {
            self.report("output container", platform.free_output_container(container));
        }
        if let Some(output) = self.output.take() {
            self.report("session output", platform.free_session_output(output));
        }
        if let Some(target) = self.target.take() {
            self.report("output target", platform.free_output_target(target));
        }
        if let Some(window) = self.window.take() {
            self.report("native window", platform.release_window(window));
        }
        if let Some(surface) = self.surface.take() {
            self.report("image surface", platform.release_image_surface(surface));
        }
        if let Some(request) = self.request.take() {
            self.report("capture request", platform.free_request(request));
        }
        if let Some(device) = self.device.take() {
            self.report("camera device", platform.close_device(device));
        }
        if let Some(manager) = self.manager.take() {
            self.report("camera manager", platform.delete_manager(manager));
        }

        if let Some(id) = self.camera_id.take() {
            tracing::info!("Camera: closed camera {}", id);
        }
    }

    fn report(&self, resource: &'static str, result: Result<()>) {
        if let Err(e) = result {
            self.diagnostics.teardown_failed(resource, &e);
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("camera_id", &self.camera_id)
            .field("repeating", &self.repeating)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::capture::NoopCaptureEvents;
    use crate::core::diagnostics::TracingDiagnostics;
    use std::sync::Mutex;

    /// Three cameras: front, back, back. Records every call by name.
    #[derive(Default)]
    struct ScriptedPlatform {
        calls: Mutex<Vec<String>>,
        fail_at: Mutex<Option<&'static str>>,
        // Adds camera "3", which has no readable lens facing.
        unreadable: bool,
    }

    impl ScriptedPlatform {
        fn call(&self, name: &'static str) -> Result<usize> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(name.to_string());
            if *self.fail_at.lock().unwrap() == Some(name) {
                return Err(CameraError::Capture(format!("{} failed", name)));
            }
            Ok(calls.len())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CameraPlatform for ScriptedPlatform {
        fn api_level(&self) -> u32 {
            30
        }
        fn create_manager(&self) -> Result<CameraManagerHandle> {
            self.call("create_manager").map(CameraManagerHandle::from_raw)
        }
        fn delete_manager(&self, _m: CameraManagerHandle) -> Result<()> {
            self.call("delete_manager").map(drop)
        }
        fn camera_ids(&self, _m: CameraManagerHandle) -> Result<Vec<CameraId>> {
            let mut ids: Vec<CameraId> = vec!["0".into(), "1".into(), "2".into()];
            if self.unreadable {
                ids.insert(1, "3".into());
            }
            Ok(ids)
        }
        fn lens_facing(&self, _m: CameraManagerHandle, id: &CameraId) -> Result<LensFacing> {
            match id.as_str() {
                "0" => Ok(LensFacing::Front),
                "3" => Err(CameraError::Capture("no ACAMERA_LENS_FACING".into())),
                _ => Ok(LensFacing::Back),
            }
        }
        fn open_device(
            &self,
            _m: CameraManagerHandle,
            id: &CameraId,
            _events: Arc<dyn CaptureEventHandler>,
        ) -> Result<CameraDeviceHandle> {
            self.calls.lock().unwrap().push(format!("open {}", id));
            self.call("open_device").map(CameraDeviceHandle::from_raw)
        }
        fn close_device(&self, _d: CameraDeviceHandle) -> Result<()> {
            self.call("close_device").map(drop)
        }
        fn create_image_surface(
            &self,
            _image: ExternalImageHandle,
            _w: u32,
            _h: u32,
            _max: u32,
        ) -> Result<ImageSurfaceHandle> {
            self.call("create_image_surface").map(ImageSurfaceHandle::from_raw)
        }
        fn release_image_surface(&self, _s: ImageSurfaceHandle) -> Result<()> {
            self.call("release_image_surface").map(drop)
        }
        fn acquire_window(&self, _s: ImageSurfaceHandle) -> Result<NativeWindowHandle> {
            self.call("acquire_window").map(NativeWindowHandle::from_raw)
        }
        fn release_window(&self, _w: NativeWindowHandle) -> Result<()> {
            self.call("release_window").map(drop)
        }
        fn update_latest_image(&self, _s: ImageSurfaceHandle) -> Result<bool> {
            Ok(true)
        }
        fn create_preview_request(&self, _d: CameraDeviceHandle) -> Result<CaptureRequestHandle> {
            self.call("create_preview_request").map(CaptureRequestHandle::from_raw)
        }
        fn free_request(&self, _r: CaptureRequestHandle) -> Result<()> {
            self.call("free_request").map(drop)
        }
        fn create_session_output(&self, _w: NativeWindowHandle) -> Result<SessionOutputHandle> {
            self.call("create_session_output").map(SessionOutputHandle::from_raw)
        }
        fn free_session_output(&self, _o: SessionOutputHandle) -> Result<()> {
            self.call("free_session_output").map(drop)
        }
        fn create_output_container(&self) -> Result<OutputContainerHandle> {
            self.call("create_output_container").map(OutputContainerHandle::from_raw)
        }
        fn add_output(&self, _c: OutputContainerHandle, _o: SessionOutputHandle) -> Result<()> {
            self.call("add_output").map(drop)
        }
        fn free_output_container(&self, _c: OutputContainerHandle) -> Result<()> {
            self.call("free_output_container").map(drop)
        }
        fn create_output_target(&self, _w: NativeWindowHandle) -> Result<OutputTargetHandle> {
            self.call("create_output_target").map(OutputTargetHandle::from_raw)
        }
        fn add_target(&self, _r: CaptureRequestHandle, _t: OutputTargetHandle) -> Result<()> {
            self.call("add_target").map(drop)
        }
        fn free_output_target(&self, _t: OutputTargetHandle) -> Result<()> {
            self.call("free_output_target").map(drop)
        }
        fn create_capture_session(
            &self,
            _d: CameraDeviceHandle,
            _c: OutputContainerHandle,
            _events: Arc<dyn CaptureEventHandler>,
        ) -> Result<CaptureSessionHandle> {
            self.call("create_capture_session").map(CaptureSessionHandle::from_raw)
        }
        fn set_repeating_request(
            &self,
            _s: CaptureSessionHandle,
            _r: CaptureRequestHandle,
            _events: Arc<dyn CaptureEventHandler>,
        ) -> Result<()> {
            self.call("set_repeating_request").map(drop)
        }
        fn stop_repeating(&self, _s: CaptureSessionHandle) -> Result<()> {
            self.call("stop_repeating").map(drop)
        }
        fn close_session(&self, _s: CaptureSessionHandle) -> Result<()> {
            self.call("close_session").map(drop)
        }
    }

    fn backend(platform: Arc<ScriptedPlatform>) -> CaptureBackend {
        CaptureBackend::new(
            platform,
            Arc::new(NoopCaptureEvents),
            Arc::new(TracingDiagnostics),
        )
    }

    #[test]
    fn test_select_camera_first_match_wins() {
        let platform = Arc::new(ScriptedPlatform::default());
        let backend = backend(platform);
        let manager = CameraManagerHandle::from_raw(1);

        let back = backend.select_camera(manager, CameraFacing::Back).unwrap();
        assert_eq!(back, Some(CameraId::from("1")));

        let front = backend.select_camera(manager, CameraFacing::Front).unwrap();
        assert_eq!(front, Some(CameraId::from("0")));
    }

    #[test]
    fn test_list_cameras_releases_manager() {
        let platform = Arc::new(ScriptedPlatform::default());
        let cameras = backend(platform.clone()).list_cameras().unwrap();

        assert_eq!(cameras.len(), 3);
        assert_eq!(cameras[2].facing, LensFacing::Back);
        assert_eq!(platform.calls(), vec!["create_manager", "delete_manager"]);
    }

    #[test]
    fn test_list_and_select_skip_unreadable_lens_facing() {
        let platform = Arc::new(ScriptedPlatform {
            unreadable: true,
            ..Default::default()
        });
        let backend = backend(platform.clone());

        let ids: Vec<_> = backend
            .list_cameras()
            .unwrap()
            .into_iter()
            .map(|camera| camera.id)
            .collect();
        assert_eq!(ids, vec![CameraId::from("0"), "1".into(), "2".into()]);
        assert_eq!(platform.calls(), vec!["create_manager", "delete_manager"]);

        let manager = CameraManagerHandle::from_raw(1);
        let back = backend.select_camera(manager, CameraFacing::Back).unwrap();
        assert_eq!(back, Some(CameraId::from("1")));
    }

    #[test]
    fn test_stop_releases_in_teardown_order() {
        let platform = Arc::new(ScriptedPlatform::default());
        let session = backend(platform.clone())
            .start(CameraFacing::Back, ExternalImageHandle::from_raw(5), 640, 480, 3)
            .unwrap();
        assert_eq!(session.camera_id(), Some(&CameraId::from("1")));

        platform.calls.lock().unwrap().clear();
        session.stop();

        assert_eq!(
            platform.calls(),
            vec![
                "stop_repeating",
                "close_session",
                "free_output_container",
                "free_session_output",
                "free_output_target",
                "release_window",
                "release_image_surface",
                "free_request",
                "close_device",
                "delete_manager",
            ]
        );
    }

    #[test]
    fn test_failed_start_releases_acquired_handles() {
        let platform = Arc::new(ScriptedPlatform::default());
        *platform.fail_at.lock().unwrap() = Some("create_capture_session");

        let err = backend(platform.clone())
            .start(CameraFacing::Front, ExternalImageHandle::from_raw(5), 64, 64, 3)
            .unwrap_err();
        assert!(matches!(err, CameraError::Capture(_)));

        let calls = platform.calls();
        let after = calls
            .iter()
            .position(|c| c == "create_capture_session")
            .unwrap();
        assert_eq!(
            &calls[after + 1..],
            &[
                "free_output_container",
                "free_session_output",
                "free_output_target",
                "release_window",
                "release_image_surface",
                "free_request",
                "close_device",
                "delete_manager",
            ]
        );
    }
}

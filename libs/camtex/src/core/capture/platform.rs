// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use super::{CaptureEventHandler, LensFacing};
use crate::core::error::Result;
use crate::core::handles::{
    CameraDeviceHandle, CameraId, CameraManagerHandle, CaptureRequestHandle, CaptureSessionHandle,
    ExternalImageHandle, ImageSurfaceHandle, NativeWindowHandle, OutputContainerHandle,
    OutputTargetHandle, SessionOutputHandle,
};

/// The OS camera subsystem, one call per native entry point.
///
/// Every `create_*`/`open_*`/`acquire_*` has exactly one matching release.
/// Handles never outlive the [`CaptureSession`](super::CaptureSession) that
/// acquired them; it calls each release once, in teardown order.
pub trait CameraPlatform: Send + Sync {
    /// Platform API level. Native capture needs at least
    /// [`CameraConfig::min_capture_api_level`](crate::CameraConfig).
    fn api_level(&self) -> u32;

    fn create_manager(&self) -> Result<CameraManagerHandle>;

    fn delete_manager(&self, manager: CameraManagerHandle) -> Result<()>;

    /// Camera ids in platform order.
    fn camera_ids(&self, manager: CameraManagerHandle) -> Result<Vec<CameraId>>;

    fn lens_facing(&self, manager: CameraManagerHandle, id: &CameraId) -> Result<LensFacing>;

    fn open_device(
        &self,
        manager: CameraManagerHandle,
        id: &CameraId,
        events: Arc<dyn CaptureEventHandler>,
    ) -> Result<CameraDeviceHandle>;

    fn close_device(&self, device: CameraDeviceHandle) -> Result<()>;

    /// Create the OS buffer queue whose images are latched into `image`.
    /// `queue_depth` counts every image, including the one kept bound.
    fn create_image_surface(
        &self,
        image: ExternalImageHandle,
        width: u32,
        height: u32,
        queue_depth: u32,
    ) -> Result<ImageSurfaceHandle>;

    fn release_image_surface(&self, surface: ImageSurfaceHandle) -> Result<()>;

    /// Take a reference on the surface's producer window.
    fn acquire_window(&self, surface: ImageSurfaceHandle) -> Result<NativeWindowHandle>;

    fn release_window(&self, window: NativeWindowHandle) -> Result<()>;

    /// Latch the newest queued image into the external image. Returns `false`
    /// when nothing new has arrived since the last call. Must run with the
    /// context owning the external image current.
    fn update_latest_image(&self, surface: ImageSurfaceHandle) -> Result<bool>;

    /// Request built from the preview template.
    fn create_preview_request(&self, device: CameraDeviceHandle) -> Result<CaptureRequestHandle>;

    fn free_request(&self, request: CaptureRequestHandle) -> Result<()>;

    fn create_session_output(&self, window: NativeWindowHandle) -> Result<SessionOutputHandle>;

    fn free_session_output(&self, output: SessionOutputHandle) -> Result<()>;

    fn create_output_container(&self) -> Result<OutputContainerHandle>;

    fn add_output(&self, container: OutputContainerHandle, output: SessionOutputHandle)
    -> Result<()>;

    fn free_output_container(&self, container: OutputContainerHandle) -> Result<()>;

    fn create_output_target(&self, window: NativeWindowHandle) -> Result<OutputTargetHandle>;

    fn add_target(&self, request: CaptureRequestHandle, target: OutputTargetHandle) -> Result<()>;

    fn free_output_target(&self, target: OutputTargetHandle) -> Result<()>;

    fn create_capture_session(
        &self,
        device: CameraDeviceHandle,
        outputs: OutputContainerHandle,
        events: Arc<dyn CaptureEventHandler>,
    ) -> Result<CaptureSessionHandle>;

    fn set_repeating_request(
        &self,
        session: CaptureSessionHandle,
        request: CaptureRequestHandle,
        events: Arc<dyn CaptureEventHandler>,
    ) -> Result<()>;

    fn stop_repeating(&self, session: CaptureSessionHandle) -> Result<()>;

    fn close_session(&self, session: CaptureSessionHandle) -> Result<()>;
}

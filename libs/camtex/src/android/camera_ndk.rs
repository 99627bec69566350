// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! [`CameraPlatform`] over the camera2 and media NDKs.
//!
//! The image surface is an `AImageReader` producing GPU-sampleable hardware
//! buffers. Latching binds the newest buffer to the external texture through
//! an `EGLImage`; the previous image and buffer are released after the new one
//! is bound.

use std::collections::HashMap;
use std::ffi::{CStr, CString, c_char, c_void};
use std::ptr;
use std::sync::Arc;

use parking_lot::Mutex;

use super::egl::EglGraphics;
use super::gles::GL_TEXTURE_EXTERNAL_OES;
use super::ndk::*;
use crate::core::capture::{CameraPlatform, CaptureEventHandler, LensFacing};
use crate::core::error::{CameraError, Result};
use crate::core::gpu::{GlesDevice, TextureTarget};
use crate::core::handles::{
    CameraDeviceHandle, CameraId, CameraManagerHandle, CaptureRequestHandle, CaptureSessionHandle,
    ExternalImageHandle, ImageSurfaceHandle, NativeTextureId, NativeWindowHandle,
    OutputContainerHandle, OutputTargetHandle, SessionOutputHandle,
};

const SDK_PROPERTY: &CStr = c"ro.build.version.sdk";
const PROP_VALUE_MAX: usize = 92;

/// `ro.build.version.sdk`, 0 when unreadable.
pub fn device_api_level() -> u32 {
    let mut value = [0 as c_char; PROP_VALUE_MAX];
    let len = unsafe { libc::__system_property_get(SDK_PROPERTY.as_ptr(), value.as_mut_ptr()) };
    if len <= 0 {
        return 0;
    }
    unsafe { CStr::from_ptr(value.as_ptr()) }
        .to_str()
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn check(status: camera_status_t, call: &str) -> Result<()> {
    if status == ACAMERA_OK {
        Ok(())
    } else {
        Err(CameraError::Capture(format!("{} failed: camera status {}", call, status)))
    }
}

fn check_media(status: media_status_t, call: &str) -> Result<()> {
    if status == AMEDIA_OK {
        Ok(())
    } else {
        Err(CameraError::Capture(format!("{} failed: media status {}", call, status)))
    }
}

fn non_null<T>(ptr: *mut T, call: &str) -> Result<usize> {
    if ptr.is_null() {
        Err(CameraError::Capture(format!("{} returned null", call)))
    } else {
        Ok(ptr as usize)
    }
}

// Callback trampolines. `context` points at an `Arc<dyn CaptureEventHandler>`
// kept alive in `NdkCameraPlatform::event_contexts`.

unsafe fn events<'a>(context: *mut c_void) -> Option<&'a Arc<dyn CaptureEventHandler>> {
    unsafe { (context as *const Arc<dyn CaptureEventHandler>).as_ref() }
}

unsafe extern "C" fn on_disconnected(context: *mut c_void, _device: *mut ACameraDevice) {
    if let Some(events) = unsafe { events(context) } {
        events.on_device_disconnected();
    }
}

unsafe extern "C" fn on_error(context: *mut c_void, _device: *mut ACameraDevice, error: i32) {
    if let Some(events) = unsafe { events(context) } {
        events.on_device_error(error);
    }
}

unsafe extern "C" fn on_session_closed(context: *mut c_void, _s: *mut ACameraCaptureSession) {
    if let Some(events) = unsafe { events(context) } {
        events.on_session_closed();
    }
}

unsafe extern "C" fn on_session_ready(context: *mut c_void, _s: *mut ACameraCaptureSession) {
    if let Some(events) = unsafe { events(context) } {
        events.on_session_ready();
    }
}

unsafe extern "C" fn on_session_active(context: *mut c_void, _s: *mut ACameraCaptureSession) {
    if let Some(events) = unsafe { events(context) } {
        events.on_session_active();
    }
}

unsafe extern "C" fn on_capture_completed(
    context: *mut c_void,
    _s: *mut ACameraCaptureSession,
    _request: *mut ACaptureRequest,
    _result: *const ACameraMetadata,
) {
    if let Some(events) = unsafe { events(context) } {
        events.on_capture_completed();
    }
}

unsafe extern "C" fn on_capture_failed(
    context: *mut c_void,
    _s: *mut ACameraCaptureSession,
    _request: *mut ACaptureRequest,
    failure: *mut ACameraCaptureFailure,
) {
    let Some(events) = (unsafe { events(context) }) else {
        return;
    };
    match unsafe { failure.as_ref() } {
        Some(f) => events.on_capture_failed(f.frameNumber, f.reason, f.sequenceId),
        None => events.on_capture_failed(-1, -1, -1),
    }
}

unsafe extern "C" fn on_sequence_completed(
    context: *mut c_void,
    _s: *mut ACameraCaptureSession,
    sequence_id: i32,
    frame_number: i64,
) {
    if let Some(events) = unsafe { events(context) } {
        events.on_sequence_completed(sequence_id, frame_number);
    }
}

unsafe extern "C" fn on_sequence_aborted(
    context: *mut c_void,
    _s: *mut ACameraCaptureSession,
    sequence_id: i32,
) {
    if let Some(events) = unsafe { events(context) } {
        events.on_sequence_aborted(sequence_id);
    }
}

struct HardwareBufferBinding {
    image: *mut AImage,
    egl_image: *mut c_void,
}

struct ImageSurface {
    reader: *mut AImageReader,
    texture: NativeTextureId,
    bound: Option<HardwareBufferBinding>,
}

struct EglImageFns {
    get_native_client_buffer: GetNativeClientBufferFn,
    create_image: CreateImageKhrFn,
    destroy_image: DestroyImageKhrFn,
    image_target_texture: ImageTargetTexture2dFn,
}

impl EglImageFns {
    fn load(egl: &EglGraphics) -> Result<Self> {
        let lookup = |name: &str| {
            egl.get_proc_address(name).ok_or_else(|| {
                CameraError::PlatformUnsupported(format!("{} not available", name))
            })
        };
        // SAFETY: each name resolves to the entry point with the signature
        // declared in `ndk`.
        unsafe {
            Ok(Self {
                get_native_client_buffer: std::mem::transmute::<
                    extern "system" fn(),
                    GetNativeClientBufferFn,
                >(lookup("eglGetNativeClientBufferANDROID")?),
                create_image: std::mem::transmute::<extern "system" fn(), CreateImageKhrFn>(
                    lookup("eglCreateImageKHR")?,
                ),
                destroy_image: std::mem::transmute::<extern "system" fn(), DestroyImageKhrFn>(
                    lookup("eglDestroyImageKHR")?,
                ),
                image_target_texture: std::mem::transmute::<
                    extern "system" fn(),
                    ImageTargetTexture2dFn,
                >(lookup("glEGLImageTargetTexture2DOES")?),
            })
        }
    }
}

/// Android camera subsystem.
pub struct NdkCameraPlatform {
    camera: CameraNdk,
    media: MediaNdk,
    window: NativeWindowNdk,
    egl: Arc<EglGraphics>,
    egl_image: EglImageFns,
    gl: Arc<dyn GlesDevice>,
    api_level: u32,
    surfaces: Mutex<HashMap<usize, ImageSurface>>,
    // Callbacks may arrive until the manager that opened the device is
    // deleted, so contexts live that long. Keyed by manager.
    event_contexts: Mutex<HashMap<usize, Vec<Box<Arc<dyn CaptureEventHandler>>>>>,
    // Device and session handle -> owning manager.
    owners: Mutex<HashMap<usize, usize>>,
}

// Raw NDK pointers are only dereferenced by the NDK, which is thread-safe for
// the calls made here. Surface state is behind a mutex.
unsafe impl Send for NdkCameraPlatform {}
unsafe impl Sync for NdkCameraPlatform {}

impl NdkCameraPlatform {
    /// Load the camera, media and window NDK libraries.
    ///
    /// Fails with [`CameraError::PlatformUnsupported`] when any library or
    /// entry point is missing (API level below 26 for `AImageReader_newWithUsage`).
    pub fn load(egl: Arc<EglGraphics>, gl: Arc<dyn GlesDevice>) -> Result<Self> {
        let unsupported = |e: anyhow::Error| CameraError::PlatformUnsupported(format!("{:#}", e));

        let camera = CameraNdk::load().map_err(unsupported)?;
        let media = MediaNdk::load().map_err(unsupported)?;
        let window = NativeWindowNdk::load().map_err(unsupported)?;
        let egl_image = EglImageFns::load(&egl)?;
        let api_level = device_api_level();

        tracing::info!("Camera: camera2 NDK loaded (API level {})", api_level);

        Ok(Self {
            camera,
            media,
            window,
            egl,
            egl_image,
            gl,
            api_level,
            surfaces: Mutex::new(HashMap::new()),
            event_contexts: Mutex::new(HashMap::new()),
            owners: Mutex::new(HashMap::new()),
        })
    }

    /// Box `events` for the lifetime of `manager` and return the context
    /// pointer handed to the NDK.
    fn retain_events(
        &self,
        manager: usize,
        events: Arc<dyn CaptureEventHandler>,
    ) -> *mut c_void {
        let boxed = Box::new(events);
        let context = &*boxed as *const Arc<dyn CaptureEventHandler> as *mut c_void;
        self.event_contexts
            .lock()
            .entry(manager)
            .or_default()
            .push(boxed);
        context
    }

    fn manager_of(&self, handle: usize) -> usize {
        self.owners.lock().get(&handle).copied().unwrap_or(0)
    }

    fn release_binding(&self, binding: HardwareBufferBinding) {
        unsafe {
            if !binding.egl_image.is_null() {
                (self.egl_image.destroy_image)(self.egl.display_ptr(), binding.egl_image);
            }
            if !binding.image.is_null() {
                (self.media.AImage_delete)(binding.image);
            }
        }
    }

    fn bind_image(&self, texture: NativeTextureId, image: *mut AImage) -> Result<*mut c_void> {
        let mut buffer: *mut AHardwareBuffer = ptr::null_mut();
        check_media(
            unsafe { (self.media.AImage_getHardwareBuffer)(image, &mut buffer) },
            "AImage_getHardwareBuffer",
        )?;

        let attribs = [EGL_IMAGE_PRESERVED_KHR, EGL_TRUE, EGL_NONE];
        let egl_image = unsafe {
            let client_buffer = (self.egl_image.get_native_client_buffer)(buffer);
            (self.egl_image.create_image)(
                self.egl.display_ptr(),
                ptr::null_mut(),
                EGL_NATIVE_BUFFER_ANDROID as u32,
                client_buffer,
                attribs.as_ptr(),
            )
        };
        if egl_image.is_null() {
            return Err(CameraError::Gpu("eglCreateImageKHR returned EGL_NO_IMAGE".into()));
        }

        self.gl.bind_texture(TextureTarget::ExternalOes, Some(texture));
        unsafe { (self.egl_image.image_target_texture)(GL_TEXTURE_EXTERNAL_OES, egl_image) };
        self.gl.bind_texture(TextureTarget::ExternalOes, None);

        Ok(egl_image)
    }
}

impl CameraPlatform for NdkCameraPlatform {
    fn api_level(&self) -> u32 {
        self.api_level
    }

    fn create_manager(&self) -> Result<CameraManagerHandle> {
        let manager = unsafe { (self.camera.ACameraManager_create)() };
        non_null(manager, "ACameraManager_create").map(CameraManagerHandle::from_raw)
    }

    fn delete_manager(&self, manager: CameraManagerHandle) -> Result<()> {
        unsafe { (self.camera.ACameraManager_delete)(manager.as_raw() as *mut ACameraManager) };
        self.event_contexts.lock().remove(&manager.as_raw());
        Ok(())
    }

    fn camera_ids(&self, manager: CameraManagerHandle) -> Result<Vec<CameraId>> {
        let mut list: *mut ACameraIdList = ptr::null_mut();
        check(
            unsafe {
                (self.camera.ACameraManager_getCameraIdList)(
                    manager.as_raw() as *mut ACameraManager,
                    &mut list,
                )
            },
            "ACameraManager_getCameraIdList",
        )?;

        let ids = match unsafe { list.as_ref() } {
            Some(list) if !list.cameraIds.is_null() => (0..list.numCameras.max(0) as usize)
                .filter_map(|i| {
                    let id = unsafe { *list.cameraIds.add(i) };
                    (!id.is_null()).then(|| {
                        CameraId::new(unsafe { CStr::from_ptr(id) }.to_string_lossy().into_owned())
                    })
                })
                .collect(),
            _ => Vec::new(),
        };

        unsafe { (self.camera.ACameraManager_deleteCameraIdList)(list) };
        Ok(ids)
    }

    fn lens_facing(&self, manager: CameraManagerHandle, id: &CameraId) -> Result<LensFacing> {
        let c_id = CString::new(id.as_str())
            .map_err(|_| CameraError::Capture(format!("invalid camera id {}", id)))?;

        let mut metadata: *mut ACameraMetadata = ptr::null_mut();
        check(
            unsafe {
                (self.camera.ACameraManager_getCameraCharacteristics)(
                    manager.as_raw() as *mut ACameraManager,
                    c_id.as_ptr(),
                    &mut metadata,
                )
            },
            "ACameraManager_getCameraCharacteristics",
        )?;

        let mut entry = ACameraMetadata_const_entry {
            tag: 0,
            type_: 0,
            count: 0,
            data: ptr::null(),
        };
        let status = unsafe {
            (self.camera.ACameraMetadata_getConstEntry)(metadata, ACAMERA_LENS_FACING, &mut entry)
        };
        let raw = (status == ACAMERA_OK && entry.count > 0 && !entry.data.is_null())
            .then(|| unsafe { *(entry.data as *const u8) });
        unsafe { (self.camera.ACameraMetadata_free)(metadata) };

        raw.and_then(LensFacing::from_raw).ok_or_else(|| {
            CameraError::Capture(format!("camera {} reports no lens facing", id))
        })
    }

    fn open_device(
        &self,
        manager: CameraManagerHandle,
        id: &CameraId,
        events: Arc<dyn CaptureEventHandler>,
    ) -> Result<CameraDeviceHandle> {
        let c_id = CString::new(id.as_str())
            .map_err(|_| CameraError::Capture(format!("invalid camera id {}", id)))?;

        let mut callbacks = ACameraDevice_StateCallbacks {
            context: self.retain_events(manager.as_raw(), events),
            onDisconnected: Some(on_disconnected),
            onError: Some(on_error),
        };

        let mut device: *mut ACameraDevice = ptr::null_mut();
        check(
            unsafe {
                (self.camera.ACameraManager_openCamera)(
                    manager.as_raw() as *mut ACameraManager,
                    c_id.as_ptr(),
                    &mut callbacks,
                    &mut device,
                )
            },
            "ACameraManager_openCamera",
        )?;
        let device = non_null(device, "ACameraManager_openCamera")?;
        self.owners.lock().insert(device, manager.as_raw());
        Ok(CameraDeviceHandle::from_raw(device))
    }

    fn close_device(&self, device: CameraDeviceHandle) -> Result<()> {
        self.owners.lock().remove(&device.as_raw());
        check(
            unsafe { (self.camera.ACameraDevice_close)(device.as_raw() as *mut ACameraDevice) },
            "ACameraDevice_close",
        )
    }

    fn create_image_surface(
        &self,
        image: ExternalImageHandle,
        width: u32,
        height: u32,
        queue_depth: u32,
    ) -> Result<ImageSurfaceHandle> {
        let mut reader: *mut AImageReader = ptr::null_mut();
        check_media(
            unsafe {
                (self.media.AImageReader_newWithUsage)(
                    width as i32,
                    height as i32,
                    AIMAGE_FORMAT_PRIVATE,
                    AHARDWAREBUFFER_USAGE_GPU_SAMPLED_IMAGE,
                    i32::try_from(queue_depth).unwrap_or(i32::MAX),
                    &mut reader,
                )
            },
            "AImageReader_newWithUsage",
        )?;
        let key = non_null(reader, "AImageReader_newWithUsage")?;

        self.surfaces.lock().insert(
            key,
            ImageSurface {
                reader,
                texture: NativeTextureId::from_raw(image.as_raw()),
                bound: None,
            },
        );
        tracing::debug!("Camera: image reader {:#x} ({}x{})", key, width, height);
        Ok(ImageSurfaceHandle::from_raw(key))
    }

    fn release_image_surface(&self, surface: ImageSurfaceHandle) -> Result<()> {
        let Some(state) = self.surfaces.lock().remove(&surface.as_raw()) else {
            return Err(CameraError::Capture(format!("unknown image surface {}", surface)));
        };
        if let Some(binding) = state.bound {
            self.release_binding(binding);
        }
        unsafe { (self.media.AImageReader_delete)(state.reader) };
        Ok(())
    }

    fn acquire_window(&self, surface: ImageSurfaceHandle) -> Result<NativeWindowHandle> {
        let mut window: *mut ANativeWindow = ptr::null_mut();
        check_media(
            unsafe {
                (self.media.AImageReader_getWindow)(
                    surface.as_raw() as *mut AImageReader,
                    &mut window,
                )
            },
            "AImageReader_getWindow",
        )?;
        let raw = non_null(window, "AImageReader_getWindow")?;
        unsafe { (self.window.ANativeWindow_acquire)(window) };
        Ok(NativeWindowHandle::from_raw(raw))
    }

    fn release_window(&self, window: NativeWindowHandle) -> Result<()> {
        unsafe { (self.window.ANativeWindow_release)(window.as_raw() as *mut ANativeWindow) };
        Ok(())
    }

    fn update_latest_image(&self, surface: ImageSurfaceHandle) -> Result<bool> {
        let mut surfaces = self.surfaces.lock();
        let state = surfaces
            .get_mut(&surface.as_raw())
            .ok_or_else(|| CameraError::Capture(format!("unknown image surface {}", surface)))?;

        let mut image: *mut AImage = ptr::null_mut();
        let status = unsafe { (self.media.AImageReader_acquireLatestImage)(state.reader, &mut image) };
        if status == AMEDIA_IMGREADER_NO_BUFFER_AVAILABLE {
            return Ok(false);
        }
        check_media(status, "AImageReader_acquireLatestImage")?;

        let egl_image = match self.bind_image(state.texture, image) {
            Ok(egl_image) => egl_image,
            Err(e) => {
                unsafe { (self.media.AImage_delete)(image) };
                return Err(e);
            }
        };

        if let Some(previous) = state.bound.replace(HardwareBufferBinding { image, egl_image }) {
            self.release_binding(previous);
        }
        Ok(true)
    }

    fn create_preview_request(&self, device: CameraDeviceHandle) -> Result<CaptureRequestHandle> {
        let mut request: *mut ACaptureRequest = ptr::null_mut();
        check(
            unsafe {
                (self.camera.ACameraDevice_createCaptureRequest)(
                    device.as_raw() as *const ACameraDevice,
                    TEMPLATE_PREVIEW,
                    &mut request,
                )
            },
            "ACameraDevice_createCaptureRequest",
        )?;
        non_null(request, "ACameraDevice_createCaptureRequest").map(CaptureRequestHandle::from_raw)
    }

    fn free_request(&self, request: CaptureRequestHandle) -> Result<()> {
        unsafe { (self.camera.ACaptureRequest_free)(request.as_raw() as *mut ACaptureRequest) };
        Ok(())
    }

    fn create_session_output(&self, window: NativeWindowHandle) -> Result<SessionOutputHandle> {
        let mut output: *mut ACaptureSessionOutput = ptr::null_mut();
        check(
            unsafe {
                (self.camera.ACaptureSessionOutput_create)(
                    window.as_raw() as *mut ANativeWindow,
                    &mut output,
                )
            },
            "ACaptureSessionOutput_create",
        )?;
        non_null(output, "ACaptureSessionOutput_create").map(SessionOutputHandle::from_raw)
    }

    fn free_session_output(&self, output: SessionOutputHandle) -> Result<()> {
        unsafe {
            (self.camera.ACaptureSessionOutput_free)(output.as_raw() as *mut ACaptureSessionOutput)
        };
        Ok(())
    }

    fn create_output_container(&self) -> Result<OutputContainerHandle> {
        let mut container: *mut ACaptureSessionOutputContainer = ptr::null_mut();
        check(
            unsafe { (self.camera.ACaptureSessionOutputContainer_create)(&mut container) },
            "ACaptureSessionOutputContainer_create",
        )?;
        non_null(container, "ACaptureSessionOutputContainer_create")
            .map(OutputContainerHandle::from_raw)
    }

    fn add_output(
        &self,
        container: OutputContainerHandle,
        output: SessionOutputHandle,
    ) -> Result<()> {
        check(
            unsafe {
                (self.camera.ACaptureSessionOutputContainer_add)(
                    container.as_raw() as *mut ACaptureSessionOutputContainer,
                    output.as_raw() as *const ACaptureSessionOutput,
                )
            },
            "ACaptureSessionOutputContainer_add",
        )
    }

    fn free_output_container(&self, container: OutputContainerHandle) -> Result<()> {
        unsafe {
            (self.camera.ACaptureSessionOutputContainer_free)(
                container.as_raw() as *mut ACaptureSessionOutputContainer
            )
        };
        Ok(())
    }

    fn create_output_target(&self, window: NativeWindowHandle) -> Result<OutputTargetHandle> {
        let mut target: *mut ACameraOutputTarget = ptr::null_mut();
        check(
            unsafe {
                (self.camera.ACameraOutputTarget_create)(
                    window.as_raw() as *mut ANativeWindow,
                    &mut target,
                )
            },
            "ACameraOutputTarget_create",
        )?;
        non_null(target, "ACameraOutputTarget_create").map(OutputTargetHandle::from_raw)
    }

    fn add_target(&self, request: CaptureRequestHandle, target: OutputTargetHandle) -> Result<()> {
        check(
            unsafe {
                (self.camera.ACaptureRequest_addTarget)(
                    request.as_raw() as *mut ACaptureRequest,
                    target.as_raw() as *const ACameraOutputTarget,
                )
            },
            "ACaptureRequest_addTarget",
        )
    }

    fn free_output_target(&self, target: OutputTargetHandle) -> Result<()> {
        unsafe { (self.camera.ACameraOutputTarget_free)(target.as_raw() as *mut ACameraOutputTarget) };
        Ok(())
    }

    fn create_capture_session(
        &self,
        device: CameraDeviceHandle,
        outputs: OutputContainerHandle,
        events: Arc<dyn CaptureEventHandler>,
    ) -> Result<CaptureSessionHandle> {
        let manager = self.manager_of(device.as_raw());
        let callbacks = ACameraCaptureSession_stateCallbacks {
            context: self.retain_events(manager, events),
            onClosed: Some(on_session_closed),
            onReady: Some(on_session_ready),
            onActive: Some(on_session_active),
        };

        let mut session: *mut ACameraCaptureSession = ptr::null_mut();
        check(
            unsafe {
                (self.camera.ACameraDevice_createCaptureSession)(
                    device.as_raw() as *mut ACameraDevice,
                    outputs.as_raw() as *const ACaptureSessionOutputContainer,
                    &callbacks,
                    &mut session,
                )
            },
            "ACameraDevice_createCaptureSession",
        )?;
        let session = non_null(session, "ACameraDevice_createCaptureSession")?;
        self.owners.lock().insert(session, manager);
        Ok(CaptureSessionHandle::from_raw(session))
    }

    fn set_repeating_request(
        &self,
        session: CaptureSessionHandle,
        request: CaptureRequestHandle,
        events: Arc<dyn CaptureEventHandler>,
    ) -> Result<()> {
        let mut callbacks = ACameraCaptureSession_captureCallbacks {
            context: self.retain_events(self.manager_of(session.as_raw()), events),
            onCaptureStarted: None,
            onCaptureProgressed: None,
            onCaptureCompleted: Some(on_capture_completed),
            onCaptureFailed: Some(on_capture_failed),
            onCaptureSequenceCompleted: Some(on_sequence_completed),
            onCaptureSequenceAborted: Some(on_sequence_aborted),
            onCaptureBufferLost: None,
        };

        let mut requests = [request.as_raw() as *mut ACaptureRequest];
        let mut sequence_id = 0;
        check(
            unsafe {
                (self.camera.ACameraCaptureSession_setRepeatingRequest)(
                    session.as_raw() as *mut ACameraCaptureSession,
                    &mut callbacks,
                    1,
                    requests.as_mut_ptr(),
                    &mut sequence_id,
                )
            },
            "ACameraCaptureSession_setRepeatingRequest",
        )?;
        tracing::debug!("Camera: repeating request sequence {}", sequence_id);
        Ok(())
    }

    fn stop_repeating(&self, session: CaptureSessionHandle) -> Result<()> {
        check(
            unsafe {
                (self.camera.ACameraCaptureSession_stopRepeating)(
                    session.as_raw() as *mut ACameraCaptureSession
                )
            },
            "ACameraCaptureSession_stopRepeating",
        )
    }

    fn close_session(&self, session: CaptureSessionHandle) -> Result<()> {
        unsafe {
            (self.camera.ACameraCaptureSession_close)(session.as_raw() as *mut ACameraCaptureSession)
        };
        self.owners.lock().remove(&session.as_raw());
        Ok(())
    }
}

impl Drop for NdkCameraPlatform {
    fn drop(&mut self) {
        let surfaces: Vec<_> = self.surfaces.lock().drain().map(|(_, s)| s).collect();
        for surface in surfaces {
            if let Some(binding) = surface.bound {
                self.release_binding(binding);
            }
            unsafe { (self.media.AImageReader_delete)(surface.reader) };
        }
    }
}

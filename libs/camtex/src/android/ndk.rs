// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Runtime-loaded camera2 / media NDK entry points.
//!
//! `libcamera2ndk.so` and `libmediandk.so` only exist on API 24+, so nothing
//! here is linked. Every entry point is resolved once when the tables load.

#![allow(non_camel_case_types, non_snake_case)]

use std::ffi::{c_char, c_void};

use anyhow::Context;
use libloading::Library;

pub type camera_status_t = i32;
pub type media_status_t = i32;

pub const ACAMERA_OK: camera_status_t = 0;
pub const AMEDIA_OK: media_status_t = 0;
pub const AMEDIA_IMGREADER_NO_BUFFER_AVAILABLE: media_status_t = -30001;

/// `ACAMERA_LENS_FACING` (section `ACAMERA_LENS`, index 5).
pub const ACAMERA_LENS_FACING: u32 = (8 << 16) + 5;
pub const TEMPLATE_PREVIEW: i32 = 1;

pub const AIMAGE_FORMAT_PRIVATE: i32 = 0x22;
pub const AHARDWAREBUFFER_USAGE_GPU_SAMPLED_IMAGE: u64 = 1 << 8;

pub const EGL_NATIVE_BUFFER_ANDROID: i32 = 0x3140;
pub const EGL_IMAGE_PRESERVED_KHR: i32 = 0x30D2;
pub const EGL_TRUE: i32 = 1;
pub const EGL_NONE: i32 = 0x3038;

macro_rules! opaque {
    ($($name:ident),* $(,)?) => {
        $(
            #[repr(C)]
            pub struct $name {
                _private: [u8; 0],
            }
        )*
    };
}

opaque!(
    ACameraManager,
    ACameraDevice,
    ACameraMetadata,
    ACaptureRequest,
    ACaptureSessionOutput,
    ACaptureSessionOutputContainer,
    ACameraOutputTarget,
    ACameraCaptureSession,
    AImageReader,
    AImage,
    AHardwareBuffer,
    ANativeWindow,
);

#[repr(C)]
pub struct ACameraIdList {
    pub numCameras: i32,
    pub cameraIds: *mut *const c_char,
}

#[repr(C)]
pub struct ACameraMetadata_const_entry {
    pub tag: u32,
    pub type_: u8,
    pub count: u32,
    pub data: *const c_void,
}

#[repr(C)]
pub struct ACameraCaptureFailure {
    pub frameNumber: i64,
    pub reason: i32,
    pub sequenceId: i32,
    pub wasImageCaptured: bool,
}

#[repr(C)]
pub struct ACameraDevice_StateCallbacks {
    pub context: *mut c_void,
    pub onDisconnected: Option<unsafe extern "C" fn(*mut c_void, *mut ACameraDevice)>,
    pub onError: Option<unsafe extern "C" fn(*mut c_void, *mut ACameraDevice, i32)>,
}

#[repr(C)]
pub struct ACameraCaptureSession_stateCallbacks {
    pub context: *mut c_void,
    pub onClosed: Option<unsafe extern "C" fn(*mut c_void, *mut ACameraCaptureSession)>,
    pub onReady: Option<unsafe extern "C" fn(*mut c_void, *mut ACameraCaptureSession)>,
    pub onActive: Option<unsafe extern "C" fn(*mut c_void, *mut ACameraCaptureSession)>,
}

#[repr(C)]
pub struct ACameraCaptureSession_captureCallbacks {
    pub context: *mut c_void,
    pub onCaptureStarted: Option<
        unsafe extern "C" fn(*mut c_void, *mut ACameraCaptureSession, *const ACaptureRequest, i64),
    >,
    pub onCaptureProgressed: Option<
        unsafe extern "C" fn(
            *mut c_void,
            *mut ACameraCaptureSession,
            *mut ACaptureRequest,
            *const ACameraMetadata,
        ),
    >,
    pub onCaptureCompleted: Option<
        unsafe extern "C" fn(
            *mut c_void,
            *mut ACameraCaptureSession,
            *mut ACaptureRequest,
            *const ACameraMetadata,
        ),
    >,
    pub onCaptureFailed: Option<
        unsafe extern "C" fn(
            *mut c_void,
            *mut ACameraCaptureSession,
            *mut ACaptureRequest,
            *mut ACameraCaptureFailure,
        ),
    >,
    pub onCaptureSequenceCompleted:
        Option<unsafe extern "C" fn(*mut c_void, *mut ACameraCaptureSession, i32, i64)>,
    pub onCaptureSequenceAborted:
        Option<unsafe extern "C" fn(*mut c_void, *mut ACameraCaptureSession, i32)>,
    pub onCaptureBufferLost: Option<
        unsafe extern "C" fn(
            *mut c_void,
            *mut ACameraCaptureSession,
            *mut ACaptureRequest,
            *mut ANativeWindow,
            i64,
        ),
    >,
}

macro_rules! entry_points {
    ($table:ident from $library:literal { $($name:ident: fn($($arg:ty),*) $(-> $ret:ty)?;)* }) => {
        pub struct $table {
            _library: Library,
            $(pub $name: unsafe extern "C" fn($($arg),*) $(-> $ret)?,)*
        }

        impl $table {
            pub fn load() -> anyhow::Result<Self> {
                let library = unsafe { Library::new($library) }
                    .with_context(|| format!("Failed to load {}", $library))?;
                $(
                    let $name = unsafe {
                        *library
                            .get::<unsafe extern "C" fn($($arg),*) $(-> $ret)?>(
                                concat!(stringify!($name), "\0").as_bytes(),
                            )
                            .with_context(|| {
                                format!("{} missing {}", $library, stringify!($name))
                            })?
                    };
                )*
                Ok(Self { _library: library, $($name,)* })
            }
        }
    };
}

entry_points!(CameraNdk from "libcamera2ndk.so" {
    ACameraManager_create: fn() -> *mut ACameraManager;
    ACameraManager_delete: fn(*mut ACameraManager);
    ACameraManager_getCameraIdList: fn(*mut ACameraManager, *mut *mut ACameraIdList) -> camera_status_t;
    ACameraManager_deleteCameraIdList: fn(*mut ACameraIdList);
    ACameraManager_getCameraCharacteristics: fn(*mut ACameraManager, *const c_char, *mut *mut ACameraMetadata) -> camera_status_t;
    ACameraMetadata_getConstEntry: fn(*const ACameraMetadata, u32, *mut ACameraMetadata_const_entry) -> camera_status_t;
    ACameraMetadata_free: fn(*mut ACameraMetadata);
    ACameraManager_openCamera: fn(*mut ACameraManager, *const c_char, *mut ACameraDevice_StateCallbacks, *mut *mut ACameraDevice) -> camera_status_t;
    ACameraDevice_close: fn(*mut ACameraDevice) -> camera_status_t;
    ACameraDevice_createCaptureRequest: fn(*const ACameraDevice, i32, *mut *mut ACaptureRequest) -> camera_status_t;
    ACaptureRequest_free: fn(*mut ACaptureRequest);
    ACaptureRequest_addTarget: fn(*mut ACaptureRequest, *const ACameraOutputTarget) -> camera_status_t;
    ACaptureSessionOutput_create: fn(*mut ANativeWindow, *mut *mut ACaptureSessionOutput) -> camera_status_t;
    ACaptureSessionOutput_free: fn(*mut ACaptureSessionOutput);
    ACaptureSessionOutputContainer_create: fn(*mut *mut ACaptureSessionOutputContainer) -> camera_status_t;
    ACaptureSessionOutputContainer_add: fn(*mut ACaptureSessionOutputContainer, *const ACaptureSessionOutput) -> camera_status_t;
    ACaptureSessionOutputContainer_free: fn(*mut ACaptureSessionOutputContainer);
    ACameraOutputTarget_create: fn(*mut ANativeWindow, *mut *mut ACameraOutputTarget) -> camera_status_t;
    ACameraOutputTarget_free: fn(*mut ACameraOutputTarget);
    ACameraDevice_createCaptureSession: fn(*mut ACameraDevice, *const ACaptureSessionOutputContainer, *const ACameraCaptureSession_stateCallbacks, *mut *mut ACameraCaptureSession) -> camera_status_t;
    ACameraCaptureSession_setRepeatingRequest: fn(*mut ACameraCaptureSession, *mut ACameraCaptureSession_captureCallbacks, i32, *mut *mut ACaptureRequest, *mut i32) -> camera_status_t;
    ACameraCaptureSession_stopRepeating: fn(*mut ACameraCaptureSession) -> camera_status_t;
    ACameraCaptureSession_close: fn(*mut ACameraCaptureSession);
});

entry_points!(MediaNdk from "libmediandk.so" {
    AImageReader_newWithUsage: fn(i32, i32, i32, u64, i32, *mut *mut AImageReader) -> media_status_t;
    AImageReader_delete: fn(*mut AImageReader);
    AImageReader_getWindow: fn(*mut AImageReader, *mut *mut ANativeWindow) -> media_status_t;
    AImageReader_acquireLatestImage: fn(*mut AImageReader, *mut *mut AImage) -> media_status_t;
    AImage_getHardwareBuffer: fn(*const AImage, *mut *mut AHardwareBuffer) -> media_status_t;
    AImage_delete: fn(*mut AImage);
});

entry_points!(NativeWindowNdk from "libandroid.so" {
    ANativeWindow_acquire: fn(*mut ANativeWindow);
    ANativeWindow_release: fn(*mut ANativeWindow);
});

/// EGL/GLES extension entry points for binding hardware buffers.
pub type GetNativeClientBufferFn =
    unsafe extern "system" fn(*const AHardwareBuffer) -> *mut c_void;
pub type CreateImageKhrFn =
    unsafe extern "system" fn(*mut c_void, *mut c_void, u32, *mut c_void, *const i32) -> *mut c_void;
pub type DestroyImageKhrFn = unsafe extern "system" fn(*mut c_void, *mut c_void) -> u32;
pub type ImageTargetTexture2dFn = unsafe extern "system" fn(u32, *mut c_void);

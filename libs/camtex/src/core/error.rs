// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use thiserror::Error;

use crate::core::capture::CameraFacing;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Platform unsupported: {0}")]
    PlatformUnsupported(String),

    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    #[error("No {0} camera found")]
    CameraNotFound(CameraFacing),

    #[error("GL context creation failed: {0}")]
    ContextCreationFailed(String),

    #[error("GL context switch failed: {0}")]
    ContextSwitchFailed(String),

    #[error("Camera session is already open")]
    AlreadyOpen,

    #[error("Camera session is not open")]
    NotOpen,

    #[error("Invalid texture dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Capture operation failed: {0}")]
    Capture(String),

    #[error("GPU operation failed: {0}")]
    Gpu(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CameraError {
    /// Errors after which the open session must not be used again. The caller
    /// is expected to `close()`.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ContextSwitchFailed(_) | Self::ContextCreationFailed(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CameraError>;

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! OS camera capture: device selection by facing and one continuous preview
//! request into the surface behind the external image.

mod backend;
mod events;
mod platform;

pub use backend::{CameraInfo, CaptureBackend, CaptureSession};
pub use events::{CaptureEventHandler, CaptureFailure, ForwardingCaptureEvents, NoopCaptureEvents};
pub use platform::CameraPlatform;

use std::fmt;

/// Which way the requested camera points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraFacing {
    Front,
    Back,
}

impl CameraFacing {
    pub fn from_front(front_camera: bool) -> Self {
        if front_camera { Self::Front } else { Self::Back }
    }

    pub fn lens(self) -> LensFacing {
        match self {
            Self::Front => LensFacing::Front,
            Self::Back => LensFacing::Back,
        }
    }
}

impl fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => f.write_str("front"),
            Self::Back => f.write_str("back"),
        }
    }
}

/// Lens-facing metadata reported for a camera id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LensFacing {
    Front,
    Back,
    External,
}

impl LensFacing {
    /// `ACAMERA_LENS_FACING_*` value.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Front),
            1 => Some(Self::Back),
            2 => Some(Self::External),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_from_flag() {
        assert_eq!(CameraFacing::from_front(true), CameraFacing::Front);
        assert_eq!(CameraFacing::from_front(false), CameraFacing::Back);
        assert_eq!(CameraFacing::Back.lens(), LensFacing::Back);
    }

    #[test]
    fn test_lens_facing_raw_values() {
        assert_eq!(LensFacing::from_raw(0), Some(LensFacing::Front));
        assert_eq!(LensFacing::from_raw(1), Some(LensFacing::Back));
        assert_eq!(LensFacing::from_raw(2), Some(LensFacing::External));
        assert_eq!(LensFacing::from_raw(9), None);
    }
}

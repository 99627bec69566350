// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Callbacks from the OS capture pipeline.
//!
//! Capture is a best-effort preview: nothing here is retried. Failures are
//! reported so they can be seen, not recovered from.

use std::fmt;
use std::sync::Arc;

use crate::core::diagnostics::DiagnosticSink;

/// A failure reported by the capture pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureFailure {
    DeviceDisconnected,
    DeviceError {
        code: i32,
    },
    CaptureFailed {
        frame_number: i64,
        reason: i32,
        sequence_id: i32,
    },
    SequenceAborted {
        sequence_id: i32,
    },
}

impl fmt::Display for CaptureFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceDisconnected => f.write_str("camera device disconnected"),
            Self::DeviceError { code } => write!(f, "camera device error {}", code),
            Self::CaptureFailed {
                frame_number,
                reason,
                sequence_id,
            } => write!(
                f,
                "capture of frame {} failed (reason {}, sequence {})",
                frame_number, reason, sequence_id
            ),
            Self::SequenceAborted { sequence_id } => {
                write!(f, "capture sequence {} aborted", sequence_id)
            }
        }
    }
}

/// Device, session and capture callbacks. Invoked on the OS capture thread.
///
/// All methods have default no-op implementations, so you only need to
/// override the ones you care about.
pub trait CaptureEventHandler: Send + Sync {
    fn on_device_disconnected(&self) {}

    fn on_device_error(&self, _code: i32) {}

    fn on_session_active(&self) {}

    fn on_session_ready(&self) {}

    fn on_session_closed(&self) {}

    fn on_capture_completed(&self) {}

    fn on_capture_failed(&self, _frame_number: i64, _reason: i32, _sequence_id: i32) {}

    fn on_sequence_completed(&self, _sequence_id: i32, _frame_number: i64) {}

    fn on_sequence_aborted(&self, _sequence_id: i32) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCaptureEvents;

impl CaptureEventHandler for NoopCaptureEvents {}

/// Default handler: failures go to the diagnostic sink, state changes to
/// `tracing`.
#[derive(Clone)]
pub struct ForwardingCaptureEvents {
    sink: Arc<dyn DiagnosticSink>,
}

impl ForwardingCaptureEvents {
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }
}

impl CaptureEventHandler for ForwardingCaptureEvents {
    fn on_device_disconnected(&self) {
        self.sink.capture_failed(&CaptureFailure::DeviceDisconnected);
    }

    fn on_device_error(&self, code: i32) {
        self.sink.capture_failed(&CaptureFailure::DeviceError { code });
    }

    fn on_session_active(&self) {
        tracing::debug!("Camera: capture session active");
    }

    fn on_session_ready(&self) {
        tracing::debug!("Camera: capture session ready");
    }

    fn on_session_closed(&self) {
        tracing::debug!("Camera: capture session closed");
    }

    fn on_capture_failed(&self, frame_number: i64, reason: i32, sequence_id: i32) {
        self.sink.capture_failed(&CaptureFailure::CaptureFailed {
            frame_number,
            reason,
            sequence_id,
        });
    }

    fn on_sequence_aborted(&self, sequence_id: i32) {
        self.sink
            .capture_failed(&CaptureFailure::SequenceAborted { sequence_id });
    }
}

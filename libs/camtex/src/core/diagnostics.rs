// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Sink for failures the controller does not propagate.
//!
//! `close()` never fails and the capture pipeline reports errors on its own
//! thread, so neither can surface through a `Result`. Both end up here.

use std::sync::Arc;

use crate::core::capture::CaptureFailure;
use crate::core::error::CameraError;

/// Receives failures that never reach a caller.
pub trait DiagnosticSink: Send + Sync {
    /// A resource release during teardown failed. `resource` names what was
    /// being released (e.g. `"capture session"`).
    fn teardown_failed(&self, resource: &'static str, error: &CameraError);

    /// The OS capture pipeline reported a failure. Called on the capture
    /// callback thread.
    fn capture_failed(&self, failure: &CaptureFailure);
}

impl DiagnosticSink for Arc<dyn DiagnosticSink> {
    fn teardown_failed(&self, resource: &'static str, error: &CameraError) {
        (**self).teardown_failed(resource, error)
    }

    fn capture_failed(&self, failure: &CaptureFailure) {
        (**self).capture_failed(failure)
    }
}

/// Default sink: logs through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn teardown_failed(&self, resource: &'static str, error: &CameraError) {
        tracing::warn!("Camera: failed to release {}: {}", resource, error);
    }

    fn capture_failed(&self, failure: &CaptureFailure) {
        tracing::warn!("Camera: capture failure: {}", failure);
    }
}

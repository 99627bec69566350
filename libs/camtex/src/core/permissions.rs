// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future type for async trait methods (required for dyn compatibility).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Asynchronous camera permission gate.
///
/// The host decides how to ask (system prompt, manifest check, always-yes in
/// a test harness). `open()` awaits the answer without blocking the caller
/// thread and allocates nothing until it resolves to `true`.
pub trait PermissionGate: Send + Sync {
    #[must_use]
    fn check_camera_permission(&self) -> BoxFuture<'_, bool>;
}

impl PermissionGate for Arc<dyn PermissionGate> {
    fn check_camera_permission(&self) -> BoxFuture<'_, bool> {
        (**self).check_camera_permission()
    }
}

/// Gate with a fixed answer. Useful for override mode, where there is no OS
/// camera to ask about.
#[derive(Debug, Clone, Copy)]
pub struct StaticPermissionGate {
    granted: bool,
}

impl StaticPermissionGate {
    pub fn granted() -> Self {
        Self { granted: true }
    }

    pub fn denied() -> Self {
        Self { granted: false }
    }
}

impl PermissionGate for StaticPermissionGate {
    fn check_camera_permission(&self) -> BoxFuture<'_, bool> {
        let granted = self.granted;
        Box::pin(async move {
            tracing::debug!("Camera permission (static): {}", granted);
            granted
        })
    }
}

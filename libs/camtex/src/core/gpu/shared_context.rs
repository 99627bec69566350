// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Secondary GL context sharing objects with the engine's main context.
//!
//! The camera texture is written on this context and sampled by the engine on
//! its own; sharing makes the texture name valid on both without a CPU copy.
//! Every switch onto it goes through a [`ContextScope`], which puts the
//! previously current context back when it ends, including on early returns.

use std::sync::Arc;

use crate::core::diagnostics::DiagnosticSink;
use crate::core::error::{CameraError, Result};
use crate::core::gpu::api::GraphicsApi;
use crate::core::handles::GlContextHandle;

/// Owned shared context. Destroyed on drop.
pub struct SharedGraphicsContext {
    api: Arc<dyn GraphicsApi>,
    diagnostics: Arc<dyn DiagnosticSink>,
    context: GlContextHandle,
}

impl SharedGraphicsContext {
    /// Create a context sharing with `share_with` and make it current.
    ///
    /// Returns the context together with the scope that restores whatever was
    /// current before. Creation and the initial make-current both report
    /// [`CameraError::ContextCreationFailed`].
    pub fn create(
        api: Arc<dyn GraphicsApi>,
        share_with: Option<GlContextHandle>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Result<(Self, ContextScope)> {
        let previous = api.current_context();

        let context = api
            .create_shared_context(share_with)
            .map_err(|e| CameraError::ContextCreationFailed(e.to_string()))?;

        if let Err(e) = api.make_current(Some(context)) {
            if let Err(destroy_err) = api.destroy_context(context) {
                diagnostics.teardown_failed("shared GL context", &destroy_err);
            }
            return Err(CameraError::ContextCreationFailed(format!(
                "Unable to make the shared GL context current: {}",
                e
            )));
        }

        tracing::info!(
            "Camera: created shared GL context {} (sharing with {:?})",
            context,
            share_with
        );

        let scope = ContextScope {
            api: Arc::clone(&api),
            previous: Some(previous),
        };

        Ok((
            Self {
                api,
                diagnostics,
                context,
            },
            scope,
        ))
    }

    pub fn handle(&self) -> GlContextHandle {
        self.context
    }

    /// Make this context current until the returned scope ends.
    pub fn enter(&self) -> Result<ContextScope> {
        let previous = self.api.current_context();

        self.api.make_current(Some(self.context)).map_err(|e| {
            tracing::error!("Camera: unable to make shared GL context current: {}", e);
            CameraError::ContextSwitchFailed(format!(
                "Unable to make current shared GL context {}: {}",
                self.context, e
            ))
        })?;

        Ok(ContextScope {
            api: Arc::clone(&self.api),
            previous: Some(previous),
        })
    }
}

impl Drop for SharedGraphicsContext {
    fn drop(&mut self) {
        match self.api.destroy_context(self.context) {
            Ok(()) => tracing::info!("Camera: destroyed shared GL context {}", self.context),
            Err(e) => self.diagnostics.teardown_failed("shared GL context", &e),
        }
    }
}

impl std::fmt::Debug for SharedGraphicsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedGraphicsContext")
            .field("context", &self.context)
            .finish()
    }
}

/// Restores the previously current context when it ends.
///
/// Call [`exit`](Self::exit) on the success path to observe restore failures;
/// dropping the scope restores as well but can only log.
#[must_use = "dropping the scope immediately restores the previous context"]
pub struct ContextScope {
    api: Arc<dyn GraphicsApi>,
    // Outer `None`: no switch happened, nothing to restore.
    previous: Option<Option<GlContextHandle>>,
}

impl ContextScope {
    /// A scope that switched nothing. Used when GL work runs on a context the
    /// caller already had current.
    pub fn inert(api: Arc<dyn GraphicsApi>) -> Self {
        Self {
            api,
            previous: None,
        }
    }

    pub fn is_inert(&self) -> bool {
        self.previous.is_none()
    }

    /// Put the previous context back.
    pub fn exit(mut self) -> Result<()> {
        match self.previous.take() {
            Some(previous) => restore(self.api.as_ref(), previous),
            None => Ok(()),
        }
    }
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            if let Err(e) = restore(self.api.as_ref(), previous) {
                tracing::error!("Camera: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for ContextScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextScope")
            .field("previous", &self.previous)
            .finish()
    }
}

fn restore(api: &dyn GraphicsApi, previous: Option<GlContextHandle>) -> Result<()> {
    api.make_current(previous).map_err(|e| {
        CameraError::ContextSwitchFailed(format!(
            "Unable to restore previous GL context {:?}: {}",
            previous, e
        ))
    })
}

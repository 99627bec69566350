// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Controller configuration via `camtex.yaml`.

use crate::core::{CameraError, Result};
use serde::Deserialize;
use std::path::Path;

/// Sampling filter applied to both the external image and the composite
/// texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureFilter {
    #[default]
    Linear,
    Nearest,
}

/// Configuration for a [`NativeCamera`](crate::NativeCamera).
///
/// Width, height and facing are per-`open()` arguments; everything here is
/// fixed for the lifetime of the controller.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Caller supplies the external image through `set_texture_override`
    /// instead of the OS capture pipeline.
    pub override_texture: bool,

    /// Lowest platform API level that ships the native capture APIs.
    pub min_capture_api_level: u32,

    /// Frames the OS image queue may hold in flight beyond the one bound to
    /// the external image.
    pub max_images: u32,

    /// Allocate a mip chain for the composite texture at open.
    pub generate_mipmaps: bool,

    pub texture_filter: TextureFilter,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            override_texture: false,
            min_capture_api_level: 24,
            max_images: 2,
            generate_mipmaps: true,
            texture_filter: TextureFilter::Linear,
        }
    }
}

impl CameraConfig {
    /// Configuration file name.
    pub const FILE_NAME: &'static str = "camtex.yaml";

    /// Override-mode configuration with every other field at its default.
    pub fn override_mode() -> Self {
        Self::default().with_override_texture(true)
    }

    pub fn with_override_texture(mut self, override_texture: bool) -> Self {
        self.override_texture = override_texture;
        self
    }

    pub fn with_min_capture_api_level(mut self, level: u32) -> Self {
        self.min_capture_api_level = level;
        self
    }

    pub fn with_max_images(mut self, max_images: u32) -> Self {
        self.max_images = max_images;
        self
    }

    pub fn with_generate_mipmaps(mut self, generate_mipmaps: bool) -> Self {
        self.generate_mipmaps = generate_mipmaps;
        self
    }

    pub fn with_texture_filter(mut self, filter: TextureFilter) -> Self {
        self.texture_filter = filter;
        self
    }

    /// Parse a YAML document and validate it.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| CameraError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory. Returns error if the file is
    /// missing or cannot be parsed.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            CameraError::Configuration(format!("Failed to read {}: {}", config_path.display(), e))
        })?;

        let config = Self::from_yaml(&content).map_err(|e| {
            CameraError::Configuration(format!("{}: {}", config_path.display(), e))
        })?;

        tracing::info!("Loaded camera config from {}", config_path.display());
        Ok(config)
    }

    /// Load configuration from a directory, returning defaults if the file is
    /// missing or unparseable.
    pub fn load_or_default(dir: &Path) -> Self {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            tracing::debug!(
                "No {} found in {}, using defaults",
                Self::FILE_NAME,
                dir.display()
            );
            return Self::default();
        }

        match Self::load(dir) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Total image queue size: `max_images` plus the bound image, never
    /// below 3 so the newest frame can be latched while one is held.
    pub fn image_queue_depth(&self) -> u32 {
        self.max_images.saturating_add(1).max(3)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_images == 0 {
            return Err(CameraError::Configuration(
                "max_images must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

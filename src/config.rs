//! Editor configuration, loaded from JSON. Every field has a default, so `{}` is a valid
//! configuration.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    assets::color::parse_hex_color,
    assets::image_store::UploadLimits,
    foundation::error::{DrapeError, DrapeResult},
    placement::engine::PlacementRules,
    session::mode::InteractionMode,
};

/// Box the uploaded photo is fitted into for display and export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayBox {
    /// Width of the hosting viewport; the box is never wider than this.
    pub viewport_width: u32,
    /// Upper bound on the box width.
    pub max_width: u32,
    pub height: u32,
}

impl Default for DisplayBox {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            max_width: 700,
            height: 500,
        }
    }
}

impl DisplayBox {
    pub fn width(&self) -> u32 {
        self.viewport_width.min(self.max_width)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub display: DisplayBox,
    pub placement: PlacementRules,
    /// Keypoints scored below this are treated as missing.
    pub min_keypoint_score: f64,
    /// Mode a freshly placed garment starts in. Defaults to full manipulation.
    pub initial_mode: InteractionMode,
    /// Colour used by the `solid` background when none is given.
    pub brand_color: String,
    pub upload: UploadLimits,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            display: DisplayBox::default(),
            placement: PlacementRules::default(),
            min_keypoint_score: 0.0,
            initial_mode: InteractionMode::Resize,
            brand_color: "#FF36C7".to_string(),
            upload: UploadLimits::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(s: &str) -> DrapeResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| DrapeError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> DrapeResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> DrapeResult<()> {
        if self.display.width() == 0 || self.display.height == 0 {
            return Err(DrapeError::validation("display box must be non-empty"));
        }
        if !self.min_keypoint_score.is_finite() {
            return Err(DrapeError::validation("min_keypoint_score must be finite"));
        }
        let p = &self.placement;
        let factors = [
            ("fallback_scale", p.fallback_scale),
            ("torso_width_factor", p.torso_width_factor),
            ("torso_height_factor", p.torso_height_factor),
            ("head_width_factor", p.head_width_factor),
        ];
        for (name, v) in factors {
            if !(v.is_finite() && v > 0.0) {
                return Err(DrapeError::validation(format!(
                    "placement.{name} must be > 0, got {v}"
                )));
            }
        }
        let offsets = [
            ("fallback_offset_x", p.fallback_offset_x),
            ("fallback_offset_y", p.fallback_offset_y),
            ("torso_top_lift", p.torso_top_lift),
            ("head_min_width_ratio", p.head_min_width_ratio),
            ("head_top_lift", p.head_top_lift),
        ];
        for (name, v) in offsets {
            if !v.is_finite() {
                return Err(DrapeError::validation(format!(
                    "placement.{name} must be finite"
                )));
            }
        }
        if self.upload.max_width == 0 || self.upload.max_height == 0 {
            return Err(DrapeError::validation("upload limits must be non-zero"));
        }
        parse_hex_color(&self.brand_color)
            .map_err(|e| DrapeError::validation(format!("brand_color: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;

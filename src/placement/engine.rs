//! Keypoint-guided initial placement of a garment over the displayed base image.
//!
//! Every rule works in display space: keypoints are mapped through the base image's
//! display transform before any arithmetic. Placement never fails; when the pose is
//! missing, incomplete or degenerate the fallback rule applies.

use serde::{Deserialize, Serialize};

use crate::{
    assets::catalog::{ClothingAsset, ClothingKind},
    foundation::core::{Point, Size, Transform2D},
    pose::keypoints::{KeypointName, Pose},
};

/// Which rule produced a placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementRule {
    /// Shoulder/hip box, used for jackets and hoodies.
    Torso,
    /// Eye span anchored at the nose, used for caps.
    Head,
    /// Fixed scale and offset relative to the base image.
    Fallback,
}

/// A computed placement and the rule behind it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub transform: Transform2D,
    pub rule: PlacementRule,
}

/// Tunable factors of the placement heuristics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacementRules {
    /// Scale applied to the asset when no keypoint rule applies.
    pub fallback_scale: f64,
    /// Fallback offset from the base image's top-left, as fractions of its displayed size.
    pub fallback_offset_x: f64,
    pub fallback_offset_y: f64,
    /// Shoulder span multiplier giving the garment width.
    pub torso_width_factor: f64,
    /// Shoulder-to-hip multiplier giving the garment height.
    pub torso_height_factor: f64,
    /// Fraction of the scaled garment height placed above the shoulder line.
    pub torso_top_lift: f64,
    /// Eye span multiplier giving the cap width.
    pub head_width_factor: f64,
    /// Lower bound on the cap width, as a fraction of the displayed base width.
    pub head_min_width_ratio: f64,
    /// Fraction of the scaled cap height placed above the higher eye.
    pub head_top_lift: f64,
}

impl Default for PlacementRules {
    fn default() -> Self {
        Self {
            fallback_scale: 0.5,
            fallback_offset_x: 0.25,
            fallback_offset_y: 0.15,
            torso_width_factor: 1.3,
            torso_height_factor: 1.2,
            torso_top_lift: 0.2,
            head_width_factor: 2.5,
            head_min_width_ratio: 0.2,
            head_top_lift: 0.7,
        }
    }
}

/// Where the base image sits in display space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaseFrame {
    pub display: Transform2D,
    pub intrinsic: Size,
}

impl BaseFrame {
    fn to_display(&self, x: f64, y: f64) -> Point {
        self.display.map_point(x, y)
    }

    fn display_width(&self) -> f64 {
        f64::from(self.intrinsic.width) * self.display.scale_x
    }

    fn display_height(&self) -> f64 {
        f64::from(self.intrinsic.height) * self.display.scale_y
    }
}

/// Initial placement with the default heuristics.
pub fn compute_initial_placement(
    kind: ClothingKind,
    pose: Option<&Pose>,
    asset: &ClothingAsset,
    base: BaseFrame,
) -> Transform2D {
    PlacementRules::default().place(kind, pose, asset, base)
}

impl PlacementRules {
    pub fn place(
        &self,
        kind: ClothingKind,
        pose: Option<&Pose>,
        asset: &ClothingAsset,
        base: BaseFrame,
    ) -> Transform2D {
        self.place_explained(kind, pose, asset, base).transform
    }

    pub fn place_explained(
        &self,
        kind: ClothingKind,
        pose: Option<&Pose>,
        asset: &ClothingAsset,
        base: BaseFrame,
    ) -> Placement {
        let fitted = pose.and_then(|pose| match kind {
            ClothingKind::Jacket | ClothingKind::Hoodie => self
                .torso(pose, asset, base)
                .map(|t| (t, PlacementRule::Torso)),
            ClothingKind::Cap => self.head(pose, asset, base).map(|t| (t, PlacementRule::Head)),
        });

        let placement = match fitted {
            Some((transform, rule)) if is_usable(&transform) => Placement { transform, rule },
            _ => Placement {
                transform: self.fallback(base),
                rule: PlacementRule::Fallback,
            },
        };
        tracing::debug!(
            %kind,
            rule = ?placement.rule,
            transform = ?placement.transform,
            "placed clothing"
        );
        placement
    }

    fn fallback(&self, base: BaseFrame) -> Transform2D {
        let scale = if self.fallback_scale.is_finite() && self.fallback_scale > 0.0 {
            self.fallback_scale
        } else {
            PlacementRules::default().fallback_scale
        };
        let left = base.display.left + base.display_width() * self.fallback_offset_x;
        let top = base.display.top + base.display_height() * self.fallback_offset_y;
        Transform2D::uniform(
            scale,
            finite_or(left, base.display.left),
            finite_or(top, base.display.top),
        )
    }

    fn torso(&self, pose: &Pose, asset: &ClothingAsset, base: BaseFrame) -> Option<Transform2D> {
        let [ls, rs, lh, rh] = pose.require([
            KeypointName::LeftShoulder,
            KeypointName::RightShoulder,
            KeypointName::LeftHip,
            KeypointName::RightHip,
        ])?;
        let ls = base.to_display(ls.x, ls.y);
        let rs = base.to_display(rs.x, rs.y);
        let lh = base.to_display(lh.x, lh.y);
        let rh = base.to_display(rh.x, rh.y);

        let torso_width = (ls.x - rs.x).abs() * self.torso_width_factor;
        let torso_height =
            (ls.y - lh.y).abs().max((rs.y - rh.y).abs()) * self.torso_height_factor;

        let (asset_w, asset_h) = asset_dims(asset);
        // Cover-fit: the garment may overflow one axis but never looks undersized.
        let scale = (torso_width / asset_w).max(torso_height / asset_h);

        let shoulder_mid = ls.midpoint(rs);
        let left = shoulder_mid.x - asset_w * scale / 2.0;
        let top = shoulder_mid.y - asset_h * scale * self.torso_top_lift;
        Some(Transform2D::uniform(scale, left, top))
    }

    fn head(&self, pose: &Pose, asset: &ClothingAsset, base: BaseFrame) -> Option<Transform2D> {
        let [nose, le, re] = pose.require([
            KeypointName::Nose,
            KeypointName::LeftEye,
            KeypointName::RightEye,
        ])?;
        let nose = base.to_display(nose.x, nose.y);
        let le = base.to_display(le.x, le.y);
        let re = base.to_display(re.x, re.y);

        let head_width = ((le.x - re.x).abs() * self.head_width_factor)
            .max(base.display_width() * self.head_min_width_ratio);

        let (asset_w, asset_h) = asset_dims(asset);
        let scale = head_width / asset_w;

        let left = nose.x - asset_w * scale / 2.0;
        let top = le.y.min(re.y) - asset_h * scale * self.head_top_lift;
        Some(Transform2D::uniform(scale, left, top))
    }
}

fn asset_dims(asset: &ClothingAsset) -> (f64, f64) {
    (
        f64::from(asset.intrinsic_width.max(1)),
        f64::from(asset.intrinsic_height.max(1)),
    )
}

fn is_usable(t: &Transform2D) -> bool {
    t.is_finite() && t.has_positive_scale()
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

#[cfg(test)]
#[path = "../../tests/unit/placement/engine.rs"]
mod tests;

//! The overlay session: one upload-to-export editing context.
//!
//! States run `no_image -> image_loaded -> clothing_placed`; [`InteractionMode`] is an
//! orthogonal sub-state that only matters while clothing is placed. All mutation goes
//! through the methods below, and a failing method leaves the session exactly as it was.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    assets::catalog::{ClothingAsset, ClothingCatalog, ClothingKind},
    assets::color::parse_hex_color,
    assets::decode::decode_image,
    assets::image_store::ImageStore,
    assets::store::PreparedAssetStore,
    config::EditorConfig,
    foundation::core::{Canvas, Rgba8Premul, Size, Transform2D},
    foundation::error::{DrapeError, DrapeResult},
    placement::engine::{BaseFrame, Placement, PlacementRule},
    pose::estimator::{PoseEstimator, detect_or_degrade},
    pose::keypoints::Pose,
    render::backend::{FrameRGBA, Layer, RenderBackend, Scene},
    render::export::encode_png,
    session::mode::{InteractionMode, TransformField},
};

// Displayed garment extent must stay within this range on both axes. Gestures that
// would leave it are rejected unless they move the extent back towards it.
const MIN_SCALED_EXTENT: f64 = 1e-3;
const MAX_SCALED_EXTENT: f64 = 1e6;

/// Identity of one uploaded image within a session. Changes on every load and reset, so
/// late results of abandoned work can be told apart from current ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// The uploaded photo and where it sits on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseImage {
    pub source_ref: String,
    pub intrinsic: Size,
    /// Uniform fit-scale plus centring offset; never rotated.
    pub display: Transform2D,
}

impl BaseImage {
    pub fn frame(&self) -> BaseFrame {
        BaseFrame {
            display: self.display,
            intrinsic: self.intrinsic,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundKind {
    Transparent,
    Solid,
    Custom,
}

impl FromStr for BackgroundKind {
    type Err = DrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transparent" => Ok(Self::Transparent),
            "solid" | "pink" => Ok(Self::Solid),
            "custom" => Ok(Self::Custom),
            other => Err(DrapeError::invalid_background(format!(
                "unknown background kind '{other}'"
            ))),
        }
    }
}

/// Fill drawn beneath the photo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Background {
    #[default]
    Transparent,
    Solid(Rgba8Premul),
    Custom(Rgba8Premul),
}

impl Background {
    pub fn kind(&self) -> BackgroundKind {
        match self {
            Self::Transparent => BackgroundKind::Transparent,
            Self::Solid(_) => BackgroundKind::Solid,
            Self::Custom(_) => BackgroundKind::Custom,
        }
    }

    pub fn fill(&self) -> Rgba8Premul {
        match *self {
            Self::Transparent => Rgba8Premul::transparent(),
            Self::Solid(c) | Self::Custom(c) => c,
        }
    }
}

/// Pose detection outcome for the current image.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum KeypointSlot {
    #[default]
    NotDetected,
    /// Detection finished; `None` means no subject was found.
    Detected(Option<Pose>),
}

/// The garment currently on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedClothing {
    pub asset: ClothingAsset,
    pub transform: Transform2D,
    /// Rule that produced the initial placement.
    pub rule: PlacementRule,
}

/// A user gesture. Position and rotation are added; scale entries multiply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformDelta {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    /// Degrees.
    pub rotation: Option<f64>,
}

impl TransformDelta {
    pub fn translate(dx: f64, dy: f64) -> Self {
        Self {
            left: Some(dx),
            top: Some(dy),
            ..Self::default()
        }
    }

    pub fn scale(factor: f64) -> Self {
        Self {
            scale_x: Some(factor),
            scale_y: Some(factor),
            ..Self::default()
        }
    }

    pub fn rotate(degrees: f64) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }

    fn entries(&self) -> impl Iterator<Item = (TransformField, f64)> {
        [
            (TransformField::Left, self.left),
            (TransformField::Top, self.top),
            (TransformField::ScaleX, self.scale_x),
            (TransformField::ScaleY, self.scale_y),
            (TransformField::Rotation, self.rotation),
        ]
        .into_iter()
        .filter_map(|(field, v)| v.map(|v| (field, v)))
    }

    fn validate(&self) -> DrapeResult<()> {
        for (field, v) in self.entries() {
            if !v.is_finite() {
                return Err(DrapeError::validation(format!(
                    "{field:?} delta must be finite, got {v}"
                )));
            }
            let is_scale = matches!(field, TransformField::ScaleX | TransformField::ScaleY);
            if is_scale && v <= 0.0 {
                return Err(DrapeError::validation(format!(
                    "{field:?} factor must be > 0, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Which fields of a delta took effect.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaReport {
    pub applied: Vec<TransformField>,
    /// Fields locked by the current mode (or all fields when nothing is placed).
    pub rejected: Vec<TransformField>,
}

impl DeltaReport {
    pub fn is_fully_applied(&self) -> bool {
        self.rejected.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NoImage,
    ImageLoaded,
    ClothingPlaced,
}

#[derive(Clone, Debug)]
pub struct OverlaySession {
    config: EditorConfig,
    id: SessionId,
    base: Option<BaseImage>,
    keypoints: KeypointSlot,
    clothing: Option<PlacedClothing>,
    mode: InteractionMode,
    background: Background,
}

impl Default for OverlaySession {
    fn default() -> Self {
        Self::from_valid_config(EditorConfig::default())
    }
}

impl OverlaySession {
    pub fn new(config: EditorConfig) -> DrapeResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: EditorConfig) -> Self {
        Self {
            id: SessionId(0),
            base: None,
            keypoints: KeypointSlot::NotDetected,
            mode: config.initial_mode,
            config,
            clothing: None,
            background: Background::Transparent,
        }
    }

    fn next_id(&mut self) -> SessionId {
        self.id = SessionId(self.id.0.wrapping_add(1));
        self.id
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        match (&self.base, &self.clothing) {
            (None, _) => SessionState::NoImage,
            (Some(_), None) => SessionState::ImageLoaded,
            (Some(_), Some(_)) => SessionState::ClothingPlaced,
        }
    }

    pub fn base_image(&self) -> Option<&BaseImage> {
        self.base.as_ref()
    }

    pub fn keypoint_slot(&self) -> &KeypointSlot {
        &self.keypoints
    }

    /// Detected pose, if detection ran and found a subject.
    pub fn keypoints(&self) -> Option<&Pose> {
        match &self.keypoints {
            KeypointSlot::Detected(pose) => pose.as_ref(),
            KeypointSlot::NotDetected => None,
        }
    }

    pub fn clothing(&self) -> Option<&PlacedClothing> {
        self.clothing.as_ref()
    }

    pub fn clothing_transform(&self) -> Option<Transform2D> {
        self.clothing.as_ref().map(|c| c.transform)
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn background(&self) -> Background {
        self.background
    }

    /// Canvas the photo is fitted into and exported at.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.config.display.width(),
            height: self.config.display.height,
        }
    }

    /// Start editing a new photo. Fits it into the display box and drops keypoints,
    /// clothing and mode. The background carries over.
    #[tracing::instrument(skip(self, source_ref), fields(source_ref = tracing::field::Empty))]
    pub fn load_image(
        &mut self,
        source_ref: impl Into<String>,
        width: u32,
        height: u32,
    ) -> DrapeResult<SessionId> {
        let source_ref = source_ref.into();
        tracing::Span::current().record("source_ref", source_ref.as_str());

        let intrinsic = Size::new(width, height)?;
        let fitted = fit_into(self.canvas(), intrinsic);

        self.base = Some(BaseImage {
            source_ref,
            intrinsic,
            display: fitted,
        });
        self.keypoints = KeypointSlot::NotDetected;
        self.clothing = None;
        self.mode = self.config.initial_mode;
        let id = self.next_id();
        tracing::debug!(%id, fit = ?fitted, "image loaded");
        Ok(id)
    }

    /// Detect, store and decode an upload, then load it. All of that happens before any
    /// state changes, so a bad upload leaves the session untouched.
    ///
    /// The estimator sees the upload as sent. Its keypoints are mapped into the pixel
    /// space of the stored (possibly downscaled) image.
    #[tracing::instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn upload(
        &mut self,
        bytes: &[u8],
        images: &mut dyn ImageStore,
        assets: &mut PreparedAssetStore,
        estimator: &dyn PoseEstimator,
    ) -> DrapeResult<SessionId> {
        let original = decode_image(bytes)?;
        let pose = detect_or_degrade(estimator, &original)?;

        let stored = images.store(bytes)?;
        let prepared = decode_image(&images.fetch(&stored.url)?)?;
        let pose = pose.map(|p| {
            p.scaled(
                f64::from(prepared.width) / f64::from(original.width),
                f64::from(prepared.height) / f64::from(original.height),
            )
        });

        assets.insert_image(stored.url.clone(), prepared);
        let ticket = self.load_image(stored.url, stored.width, stored.height)?;
        self.complete_detection(ticket, pose);
        Ok(ticket)
    }

    /// Record the detection result for the current image. Keypoints are set at most once
    /// per image; returns whether they were stored.
    #[tracing::instrument(skip_all)]
    pub fn set_keypoints(&mut self, pose: Option<Pose>) -> bool {
        if self.base.is_none() {
            tracing::debug!("ignoring keypoints: no image loaded");
            return false;
        }
        if matches!(self.keypoints, KeypointSlot::Detected(_)) {
            tracing::debug!("ignoring keypoints: already set for this image");
            return false;
        }
        let min_score = self.config.min_keypoint_score;
        let pose = pose
            .map(|p| p.with_min_score(min_score))
            .filter(|p| !p.is_empty());
        self.keypoints = KeypointSlot::Detected(pose);
        true
    }

    /// Deliver an asynchronous detection result. Results for any image other than the
    /// current one are dropped.
    pub fn complete_detection(&mut self, ticket: SessionId, pose: Option<Pose>) -> bool {
        if ticket != self.id {
            tracing::warn!(%ticket, current = %self.id, "dropping stale detection result");
            return false;
        }
        self.set_keypoints(pose)
    }

    /// Resolve `kind` and place it. Catalog failures leave the current garment in place.
    #[tracing::instrument(skip(self, catalog))]
    pub fn select_clothing(
        &mut self,
        kind: ClothingKind,
        catalog: &dyn ClothingCatalog,
    ) -> DrapeResult<Transform2D> {
        if self.base.is_none() {
            return Err(DrapeError::no_image("select an image before choosing clothing"));
        }
        let asset = catalog.resolve(kind)?;
        if asset.kind != kind {
            return Err(DrapeError::asset_unavailable(format!(
                "catalog returned a {} for {kind}",
                asset.kind
            )));
        }
        self.place_clothing(asset)
    }

    /// Place `asset` with the placement engine, replacing any current garment.
    #[tracing::instrument(skip(self, asset), fields(kind = %asset.kind))]
    pub fn place_clothing(&mut self, asset: ClothingAsset) -> DrapeResult<Transform2D> {
        let Some(base) = &self.base else {
            return Err(DrapeError::no_image("select an image before choosing clothing"));
        };
        let Placement { transform, rule } = self.config.placement.place_explained(
            asset.kind,
            self.keypoints(),
            &asset,
            base.frame(),
        );
        self.clothing = Some(PlacedClothing {
            asset,
            transform,
            rule,
        });
        self.mode = self.config.initial_mode;
        Ok(transform)
    }

    /// Returns false (and changes nothing) when no garment is placed.
    #[tracing::instrument(skip(self))]
    pub fn set_interaction_mode(&mut self, mode: InteractionMode) -> bool {
        if self.clothing.is_none() {
            return false;
        }
        self.mode = mode;
        true
    }

    /// Apply a user gesture under the current mode's locks.
    ///
    /// Locked fields are skipped and listed in the report. Invalid deltas, or deltas that
    /// would push the transform out of range, fail without applying anything.
    #[tracing::instrument(skip(self))]
    pub fn apply_user_transform_delta(&mut self, delta: TransformDelta) -> DrapeResult<DeltaReport> {
        delta.validate()?;

        let mode = self.mode;
        let mut report = DeltaReport::default();
        let Some(clothing) = self.clothing.as_mut() else {
            report.rejected = delta.entries().map(|(field, _)| field).collect();
            return Ok(report);
        };

        let mut next = clothing.transform;
        for (field, v) in delta.entries() {
            if !mode.allows(field) {
                report.rejected.push(field);
                continue;
            }
            match field {
                TransformField::Left => next.left += v,
                TransformField::Top => next.top += v,
                TransformField::ScaleX => next.scale_x *= v,
                TransformField::ScaleY => next.scale_y *= v,
                TransformField::Rotation => next.rotation += v,
            }
            report.applied.push(field);
        }

        if !(next.is_finite() && next.has_positive_scale()) {
            return Err(DrapeError::validation(format!(
                "delta would produce an invalid transform {next:?}"
            )));
        }
        let intrinsic = clothing.asset.size();
        let before = clothing.transform.scaled_size(intrinsic);
        let after = next.scaled_size(intrinsic);
        let in_range = |n: f64, p: f64| {
            n.is_finite()
                && (n <= MAX_SCALED_EXTENT || n <= p)
                && (n >= MIN_SCALED_EXTENT || n >= p)
        };
        if !(in_range(after.x, before.x) && in_range(after.y, before.y)) {
            return Err(DrapeError::validation(format!(
                "delta would scale the garment to {:.3}x{:.3} px, outside {MIN_SCALED_EXTENT}..{MAX_SCALED_EXTENT}",
                after.x, after.y
            )));
        }
        clothing.transform = next;
        if !report.rejected.is_empty() {
            tracing::debug!(%mode, rejected = ?report.rejected, "locked fields ignored");
        }
        Ok(report)
    }

    /// Discard user edits: recompute the placement for the current garment from the same
    /// keypoints and base image. Returns the new transform, or `None` with no garment.
    #[tracing::instrument(skip(self))]
    pub fn reset_clothing_position(&mut self) -> DrapeResult<Option<Transform2D>> {
        let Some(clothing) = &self.clothing else {
            return Ok(None);
        };
        let asset = clothing.asset.clone();
        self.place_clothing(asset).map(Some)
    }

    /// `custom` needs a colour; `solid` falls back to the configured brand colour.
    #[tracing::instrument(skip(self))]
    pub fn set_background(&mut self, kind: BackgroundKind, color: Option<&str>) -> DrapeResult<()> {
        let parse = |s: &str| parse_hex_color(s).map_err(DrapeError::invalid_background);
        let next = match kind {
            BackgroundKind::Transparent => Background::Transparent,
            BackgroundKind::Solid => {
                Background::Solid(parse(color.unwrap_or(self.config.brand_color.as_str()))?)
            }
            BackgroundKind::Custom => {
                let color = color.ok_or_else(|| {
                    DrapeError::invalid_background("custom background needs a colour")
                })?;
                Background::Custom(parse(color)?)
            }
        };
        self.background = next;
        Ok(())
    }

    /// Everything an export draws, bottom layer first.
    pub fn scene(&self) -> DrapeResult<Scene> {
        let Some(base) = &self.base else {
            return Err(DrapeError::NothingToExport);
        };
        let mut layers = vec![Layer {
            source_ref: base.source_ref.clone(),
            transform: base.display.to_affine(base.intrinsic),
            intrinsic: base.intrinsic,
        }];
        if let Some(c) = &self.clothing {
            let intrinsic = c.asset.size();
            layers.push(Layer {
                source_ref: c.asset.source_ref.clone(),
                transform: c.transform.to_affine(intrinsic),
                intrinsic,
            });
        }
        Ok(Scene {
            canvas: self.canvas(),
            background: self.background.fill(),
            layers,
        })
    }

    /// Flatten the session into premultiplied pixels.
    pub fn render_flattened(
        &self,
        backend: &mut dyn RenderBackend,
        assets: &PreparedAssetStore,
    ) -> DrapeResult<FrameRGBA> {
        let scene = self.scene()?;
        backend.render_scene(&scene, assets)
    }

    /// Flatten the session and encode it as PNG.
    #[tracing::instrument(skip_all, fields(id = %self.id))]
    pub fn export_flattened(
        &self,
        backend: &mut dyn RenderBackend,
        assets: &PreparedAssetStore,
    ) -> DrapeResult<Vec<u8>> {
        let frame = self.render_flattened(backend, assets)?;
        encode_png(&frame)
    }

    /// Back to `no_image`. Only the configuration survives.
    #[tracing::instrument(skip(self))]
    pub fn reset(&mut self) -> SessionId {
        self.base = None;
        self.keypoints = KeypointSlot::NotDetected;
        self.clothing = None;
        self.mode = self.config.initial_mode;
        self.background = Background::Transparent;
        self.next_id()
    }
}

/// Uniform scale fitting `image` inside `canvas`, centred.
fn fit_into(canvas: Canvas, image: Size) -> Transform2D {
    let box_w = f64::from(canvas.width);
    let box_h = f64::from(canvas.height);
    let img_w = f64::from(image.width);
    let img_h = f64::from(image.height);

    let scale = (box_w / img_w).min(box_h / img_h);
    Transform2D::uniform(
        scale,
        (box_w - img_w * scale) / 2.0,
        (box_h - img_h * scale) / 2.0,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/session/overlay.rs"]
mod tests;

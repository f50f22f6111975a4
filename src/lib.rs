//! drape places a garment graphic over a photo of a person and lets the user edit it.
//!
//! The public API is session-oriented:
//!
//! - Load a photo into an [`OverlaySession`] and hand it the detected [`Pose`]
//! - Select clothing from a [`ClothingCatalog`]; the placement engine fits it to the body
//! - Apply user gestures under the current [`InteractionMode`]
//! - Export the flattened result as PNG through a [`RenderBackend`]
#![forbid(unsafe_code)]

mod assets;
mod config;
mod foundation;
mod placement;
mod pose;
mod render;
mod session;

pub use crate::foundation::core::{Affine, Canvas, Point, Rect, Rgba8Premul, Size, Transform2D, Vec2};
pub use crate::foundation::error::{DrapeError, DrapeResult};

pub use crate::assets::catalog::{
    ClothingAsset, ClothingCatalog, ClothingKind, DirCatalog, MemoryCatalog,
};
pub use crate::assets::color::parse_hex_color;
pub use crate::assets::decode::{decode_image, parse_svg};
pub use crate::assets::image_store::{
    DirImageStore, ImageStore, MemoryImageStore, StoredImage, UploadLimits, normalize_upload,
};
pub use crate::assets::store::{PreparedAsset, PreparedAssetStore, PreparedImage, PreparedSvg};
pub use crate::config::{DisplayBox, EditorConfig};
pub use crate::placement::engine::{
    BaseFrame, Placement, PlacementRule, PlacementRules, compute_initial_placement,
};
pub use crate::pose::estimator::{
    JsonPoseEstimator, NoPoseEstimator, PoseEstimator, StaticPoseEstimator, detect_or_degrade,
};
pub use crate::pose::keypoints::{Keypoint, KeypointName, Pose};
pub use crate::render::backend::{FrameRGBA, Layer, RenderBackend, Scene};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::export::encode_png;
pub use crate::session::mode::{InteractionMode, TransformField};
pub use crate::session::overlay::{
    Background, BackgroundKind, BaseImage, DeltaReport, KeypointSlot, OverlaySession,
    PlacedClothing, SessionId, SessionState, TransformDelta,
};

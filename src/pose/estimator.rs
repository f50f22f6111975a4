use std::path::PathBuf;

use crate::{
    assets::store::PreparedImage,
    foundation::error::{DrapeError, DrapeResult},
    pose::keypoints::Pose,
};

/// Single-subject pose detection over a decoded image.
///
/// `Ok(None)` means no subject was found, which is not an error. Implementations report
/// [`DrapeError::DetectionUnavailable`] when the estimator itself cannot run.
pub trait PoseEstimator {
    /// Detect keypoints for at most one subject in `image`.
    fn detect(&self, image: &PreparedImage) -> DrapeResult<Option<Pose>>;
}

/// Estimator backed by keypoints computed ahead of time and stored as JSON.
#[derive(Clone, Debug)]
pub struct JsonPoseEstimator {
    path: PathBuf,
}

impl JsonPoseEstimator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PoseEstimator for JsonPoseEstimator {
    fn detect(&self, _image: &PreparedImage) -> DrapeResult<Option<Pose>> {
        if !self.path.exists() {
            return Err(DrapeError::detection_unavailable(format!(
                "keypoint file '{}' not found",
                self.path.display()
            )));
        }
        let pose = Pose::from_path(&self.path)?;
        Ok((!pose.is_empty()).then_some(pose))
    }
}

/// Estimator that always answers with the same result.
#[derive(Clone, Debug, Default)]
pub struct StaticPoseEstimator {
    pose: Option<Pose>,
}

impl StaticPoseEstimator {
    pub fn new(pose: Option<Pose>) -> Self {
        Self { pose }
    }
}

impl PoseEstimator for StaticPoseEstimator {
    fn detect(&self, _image: &PreparedImage) -> DrapeResult<Option<Pose>> {
        Ok(self.pose.clone())
    }
}

/// Stand-in used when no estimator is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPoseEstimator;

impl PoseEstimator for NoPoseEstimator {
    fn detect(&self, _image: &PreparedImage) -> DrapeResult<Option<Pose>> {
        Err(DrapeError::detection_unavailable("no pose estimator configured"))
    }
}

/// Run `estimator`, turning [`DrapeError::DetectionUnavailable`] into "no subject".
///
/// Placement then takes its fallback path. Other errors still propagate.
pub fn detect_or_degrade(
    estimator: &dyn PoseEstimator,
    image: &PreparedImage,
) -> DrapeResult<Option<Pose>> {
    match estimator.detect(image) {
        Ok(pose) => Ok(pose),
        Err(DrapeError::DetectionUnavailable(reason)) => {
            tracing::warn!(%reason, "pose detection unavailable, using fallback placement");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/estimator.rs"]
mod tests;

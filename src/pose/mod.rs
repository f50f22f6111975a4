pub(crate) mod estimator;
pub(crate) mod keypoints;

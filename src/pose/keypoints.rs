use std::{path::Path, str::FromStr};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::core::Point;
use crate::foundation::error::{DrapeError, DrapeResult};

/// Named anatomical points produced by single-person pose estimators (MoveNet/COCO order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeypointName {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl KeypointName {
    pub const COUNT: usize = 17;

    pub const ALL: [KeypointName; Self::COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for KeypointName {
    type Err = DrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DrapeError::validation(format!("unknown keypoint name \"{s}\"")))
    }
}

/// One detected point in original-image pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Keypoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, score: None }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Wire form emitted by pose-detection libraries: a flat list of named points.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct NamedKeypoint {
    name: String,
    x: f64,
    y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
}

/// Keypoints of a single detected subject, indexed by [`KeypointName`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pose {
    points: [Option<Keypoint>; KeypointName::COUNT],
}

impl Pose {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `kp` under `name`. Points with non-finite coordinates are treated as absent.
    pub fn set(&mut self, name: KeypointName, kp: Keypoint) {
        self.points[name.index()] = if kp.x.is_finite() && kp.y.is_finite() {
            Some(kp)
        } else {
            None
        };
    }

    pub fn with(mut self, name: KeypointName, x: f64, y: f64) -> Self {
        self.set(name, Keypoint::new(x, y));
        self
    }

    pub fn get(&self, name: KeypointName) -> Option<&Keypoint> {
        self.points[name.index()].as_ref()
    }

    pub fn remove(&mut self, name: KeypointName) -> Option<Keypoint> {
        self.points[name.index()].take()
    }

    /// All of `names`, or `None` if any is missing.
    pub fn require<const N: usize>(&self, names: [KeypointName; N]) -> Option<[Keypoint; N]> {
        let mut out = [Keypoint::new(0.0, 0.0); N];
        for (slot, name) in out.iter_mut().zip(names) {
            *slot = *self.get(name)?;
        }
        Some(out)
    }

    pub fn len(&self) -> usize {
        self.points.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeypointName, &Keypoint)> + '_ {
        KeypointName::ALL
            .into_iter()
            .zip(self.points.iter())
            .filter_map(|(name, kp)| kp.as_ref().map(|kp| (name, kp)))
    }

    /// Drop points whose score is below `min_score`. Points without a score are kept.
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        for slot in &mut self.points {
            if slot
                .as_ref()
                .is_some_and(|kp| kp.score.is_some_and(|s| s < min_score))
            {
                *slot = None;
            }
        }
        self
    }

    /// Map every point into an image resized by `(sx, sy)`. Scores are kept.
    pub fn scaled(mut self, sx: f64, sy: f64) -> Self {
        for kp in self.points.iter_mut().flatten() {
            kp.x *= sx;
            kp.y *= sy;
        }
        self
    }

    /// Parse the flat `[{ "name", "x", "y", "score" }]` list. Unknown names are skipped and a
    /// later duplicate overrides an earlier one. An empty list yields an empty pose.
    pub fn from_json_str(s: &str) -> DrapeResult<Self> {
        let list: Vec<NamedKeypoint> =
            serde_json::from_str(s).map_err(|e| DrapeError::serde(e.to_string()))?;
        let mut pose = Self::new();
        for kp in list {
            match kp.name.parse::<KeypointName>() {
                Ok(name) => pose.set(
                    name,
                    Keypoint {
                        x: kp.x,
                        y: kp.y,
                        score: kp.score,
                    },
                ),
                Err(_) => tracing::debug!(name = %kp.name, "skipping unknown keypoint"),
            }
        }
        Ok(pose)
    }

    pub fn from_path(path: &Path) -> DrapeResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read keypoints '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    pub fn to_json_string(&self) -> DrapeResult<String> {
        let list: Vec<NamedKeypoint> = self
            .iter()
            .map(|(name, kp)| NamedKeypoint {
                name: name.as_str().to_string(),
                x: kp.x,
                y: kp.y,
                score: kp.score,
            })
            .collect();
        serde_json::to_string_pretty(&list).map_err(|e| DrapeError::serde(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/keypoints.rs"]
mod tests;

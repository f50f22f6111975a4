use std::fmt;

use serde::{Deserialize, Serialize};

/// What user gestures may change on the placed garment.
///
/// | mode   | move | scale | rotate |
/// |--------|------|-------|--------|
/// | locked | no   | no    | no     |
/// | move   | yes  | no    | no     |
/// | resize | yes  | yes   | yes    |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// Opt-in: the garment ignores every gesture.
    Locked,
    Move,
    /// Resize also frees position, so a single gesture can move and scale at once.
    #[default]
    Resize,
}

impl InteractionMode {
    pub fn can_move(self) -> bool {
        matches!(self, Self::Move | Self::Resize)
    }

    pub fn can_scale(self) -> bool {
        matches!(self, Self::Resize)
    }

    pub fn can_rotate(self) -> bool {
        matches!(self, Self::Resize)
    }

    pub fn allows(self, field: TransformField) -> bool {
        match field {
            TransformField::Left | TransformField::Top => self.can_move(),
            TransformField::ScaleX | TransformField::ScaleY => self.can_scale(),
            TransformField::Rotation => self.can_rotate(),
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Locked => "locked",
            Self::Move => "move",
            Self::Resize => "resize",
        })
    }
}

/// Individually lockable fields of a garment transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformField {
    Left,
    Top,
    ScaleX,
    ScaleY,
    Rotation,
}

#[cfg(test)]
#[path = "../../tests/unit/session/mode.rs"]
mod tests;

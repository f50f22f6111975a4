use crate::foundation::error::{DrapeError, DrapeResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Width/height pair in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> DrapeResult<Self> {
        if width == 0 || height == 0 {
            return Err(DrapeError::validation(format!(
                "size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

/// Output surface dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Placement of an asset of known intrinsic size in display space.
///
/// `left`/`top` locate the unrotated top-left corner of the scaled asset. Rotation is in
/// degrees and pivots around the centre of the scaled asset.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform2D {
    pub scale_x: f64,
    pub scale_y: f64,
    pub left: f64,
    pub top: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            left: 0.0,
            top: 0.0,
            rotation: 0.0,
        }
    }
}

impl Transform2D {
    /// Uniform scale plus offset, no rotation.
    pub fn uniform(scale: f64, left: f64, top: f64) -> Self {
        Self {
            scale_x: scale,
            scale_y: scale,
            left,
            top,
            rotation: 0.0,
        }
    }

    /// Map a point from the asset's intrinsic pixel space into display space, ignoring
    /// rotation. Base image transforms never rotate, so this is exact for them.
    pub fn map_point(&self, x: f64, y: f64) -> Point {
        Point::new(self.left + x * self.scale_x, self.top + y * self.scale_y)
    }

    /// Displayed size of an asset with the given intrinsic size.
    pub fn scaled_size(&self, intrinsic: Size) -> Vec2 {
        Vec2::new(
            f64::from(intrinsic.width) * self.scale_x,
            f64::from(intrinsic.height) * self.scale_y,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.scale_x.is_finite()
            && self.scale_y.is_finite()
            && self.left.is_finite()
            && self.top.is_finite()
            && self.rotation.is_finite()
    }

    pub fn has_positive_scale(&self) -> bool {
        self.scale_x > 0.0 && self.scale_y > 0.0
    }

    pub fn to_affine(self, intrinsic: Size) -> Affine {
        let center = self.scaled_size(intrinsic) * 0.5;
        let t_translate = Affine::translate(Vec2::new(self.left, self.top));
        let t_center = Affine::translate(center);
        let t_uncenter = Affine::translate(-center);
        let t_rotate = Affine::rotate(self.rotation.to_radians());
        let t_scale = Affine::scale_non_uniform(self.scale_x, self.scale_y);

        // T(left,top) * T(center) * R(rot) * T(-center) * S(scale)
        t_translate * t_center * t_rotate * t_uncenter * t_scale
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

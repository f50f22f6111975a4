use crate::foundation::core::{Affine, Rect};
use crate::foundation::error::{DrapeError, DrapeResult};

// Avoid pathological allocations for absurd transforms.
const MAX_DIM: u32 = 16_384;

/// How to rasterize an SVG for one draw.
///
/// The SVG is rendered at draw scale, but only the part that lands inside the clip
/// rectangle is rasterized. A garment scaled far past the canvas still produces a
/// canvas-sized pixmap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SvgRasterPlan {
    pub width: u32,
    pub height: u32,
    /// SVG logical space into pixmap pixels.
    pub svg_to_raster: Affine,
    /// Pixmap pixels into canvas space.
    pub raster_to_canvas: Affine,
}

/// Plan the raster for drawing `tree` with `transform`, clipped to `clip` in canvas space.
///
/// Returns `None` when nothing of the SVG lands inside `clip`.
pub fn svg_raster_plan(
    tree: &usvg::Tree,
    transform: Affine,
    clip: Rect,
) -> DrapeResult<Option<SvgRasterPlan>> {
    let size = tree.size();
    let base_w = f64::from(size.width());
    let base_h = f64::from(size.height());
    if !(base_w.is_finite() && base_h.is_finite() && base_w > 0.0 && base_h > 0.0) {
        return Err(DrapeError::validation("svg has invalid width/height"));
    }

    let [a, b, c, d, _e, _f] = transform.as_coeffs();
    let sx = (a * a + b * b).sqrt().max(1e-6);
    let sy = (c * c + d * d).sqrt().max(1e-6);

    // Full draw-scale raster space, before clipping.
    let full = transform * Affine::scale_non_uniform(1.0 / sx, 1.0 / sy);
    if !(full.is_finite() && full.determinant().is_normal()) {
        return Err(DrapeError::validation(format!(
            "svg transform is not invertible: {transform:?}"
        )));
    }
    let extent = Rect::new(0.0, 0.0, base_w * sx, base_h * sy);
    let visible = full
        .inverse()
        .transform_rect_bbox(clip)
        .intersect(extent);
    if !(visible.width() > 0.0 && visible.height() > 0.0) {
        return Ok(None);
    }

    let x0 = visible.x0.floor();
    let y0 = visible.y0.floor();
    let w = (visible.x1.ceil() - x0).max(1.0);
    let h = (visible.y1.ceil() - y0).max(1.0);
    if w > f64::from(MAX_DIM) || h > f64::from(MAX_DIM) {
        return Err(DrapeError::validation(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    Ok(Some(SvgRasterPlan {
        width: w as u32,
        height: h as u32,
        svg_to_raster: Affine::translate((-x0, -y0)) * Affine::scale_non_uniform(sx, sy),
        raster_to_canvas: full * Affine::translate((x0, y0)),
    }))
}

/// Rasterize `tree` into a `width x height` premultiplied RGBA8 pixmap, mapping SVG
/// logical space through `svg_to_raster`.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
    svg_to_raster: Affine,
) -> DrapeResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| DrapeError::validation("failed to allocate svg pixmap"))?;

    let [a, b, c, d, e, f] = svg_to_raster.as_coeffs();
    let xform = resvg::tiny_skia::Transform::from_row(
        a as f32, b as f32, c as f32, d as f32, e as f32, f as f32,
    );

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;

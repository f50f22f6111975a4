use crate::{
    assets::store::{PreparedAsset, PreparedAssetStore},
    assets::svg_raster::{rasterize_svg_to_premul_rgba8, svg_raster_plan},
    foundation::core::{Affine, Point, Rect},
    foundation::error::{DrapeError, DrapeResult},
    render::backend::{FrameRGBA, Layer, RenderBackend, Scene},
    render::composite::{PremulRgba8, fill, over},
};

// Upper bound on canvas pixels; export canvases are a few hundred pixels on a side.
const MAX_PIXELS: usize = 64 * 1024 * 1024;

/// Scalar CPU rasterizer: inverse-maps every covered destination pixel into the layer and
/// samples it bilinearly.
#[derive(Clone, Debug, Default)]
pub struct CpuBackend {
    layers_drawn: u64,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total layers drawn over the lifetime of this backend.
    pub fn layers_drawn(&self) -> u64 {
        self.layers_drawn
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(skip_all, fields(width = scene.canvas.width, height = scene.canvas.height, layers = scene.layers.len()))]
    fn render_scene(
        &mut self,
        scene: &Scene,
        assets: &PreparedAssetStore,
    ) -> DrapeResult<FrameRGBA> {
        let canvas = scene.canvas;
        if canvas.width == 0 || canvas.height == 0 {
            return Err(DrapeError::validation("canvas must be non-empty"));
        }
        let pixels = canvas.pixel_count();
        if pixels > MAX_PIXELS {
            return Err(DrapeError::validation(format!(
                "canvas too large: {}x{}",
                canvas.width, canvas.height
            )));
        }

        let mut frame = FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: vec![0u8; pixels * 4],
            premultiplied: true,
        };
        fill(&mut frame.data, scene.background.to_array());

        for layer in &scene.layers {
            draw_layer(&mut frame, layer, assets)?;
            self.layers_drawn += 1;
        }
        Ok(frame)
    }
}

fn draw_layer(frame: &mut FrameRGBA, layer: &Layer, assets: &PreparedAssetStore) -> DrapeResult<()> {
    match assets.get(&layer.source_ref)? {
        PreparedAsset::Image(img) => {
            let src = Texture {
                width: img.width,
                height: img.height,
                data: &img.rgba8_premul,
            };
            draw_texture(frame, &src, layer.transform)?;
        }
        PreparedAsset::Svg(svg) => {
            let clip = Rect::new(0.0, 0.0, f64::from(frame.width), f64::from(frame.height));
            let Some(plan) = svg_raster_plan(&svg.tree, layer.transform, clip)? else {
                return Ok(());
            };
            let data =
                rasterize_svg_to_premul_rgba8(&svg.tree, plan.width, plan.height, plan.svg_to_raster)?;
            let src = Texture {
                width: plan.width,
                height: plan.height,
                data: &data,
            };
            draw_texture(frame, &src, plan.raster_to_canvas)?;
        }
    }
    Ok(())
}

struct Texture<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl Texture<'_> {
    fn texel(&self, x: i64, y: i64) -> [f64; 4] {
        let x = x.clamp(0, i64::from(self.width) - 1) as usize;
        let y = y.clamp(0, i64::from(self.height) - 1) as usize;
        let i = (y * self.width as usize + x) * 4;
        match self.data.get(i..i + 4) {
            Some(px) => [
                f64::from(px[0]),
                f64::from(px[1]),
                f64::from(px[2]),
                f64::from(px[3]),
            ],
            None => [0.0; 4],
        }
    }

    /// Bilinear sample at texture-space `(x, y)`; transparent outside the texture bounds.
    fn sample(&self, x: f64, y: f64) -> PremulRgba8 {
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        if !(x >= 0.0 && y >= 0.0 && x < w && y < h) {
            return [0; 4];
        }

        let fx = x - 0.5;
        let fy = y - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let taps = [
            (0, 0, (1.0 - tx) * (1.0 - ty)),
            (1, 0, tx * (1.0 - ty)),
            (0, 1, (1.0 - tx) * ty),
            (1, 1, tx * ty),
        ];
        let mut acc = [0.0f64; 4];
        for (dx, dy, weight) in taps {
            if weight == 0.0 {
                continue;
            }
            let px = self.texel(x0 + dx, y0 + dy);
            for (a, c) in acc.iter_mut().zip(px) {
                *a += c * weight;
            }
        }

        let mut out = [0u8; 4];
        for (o, a) in out.iter_mut().zip(acc) {
            *o = a.round().clamp(0.0, 255.0) as u8;
        }
        // Keep premultiplied invariant (color <= alpha) after rounding.
        for i in 0..3 {
            out[i] = out[i].min(out[3]);
        }
        out
    }
}

fn draw_texture(frame: &mut FrameRGBA, src: &Texture<'_>, transform: Affine) -> DrapeResult<()> {
    if src.width == 0 || src.height == 0 {
        return Ok(());
    }
    if !(transform.is_finite() && transform.determinant().is_normal()) {
        return Err(DrapeError::validation(format!(
            "layer transform is not invertible: {transform:?}"
        )));
    }
    let inv = transform.inverse();

    let bounds = transform.transform_rect_bbox(Rect::new(
        0.0,
        0.0,
        f64::from(src.width),
        f64::from(src.height),
    ));
    let x0 = bounds.x0.floor().max(0.0);
    let y0 = bounds.y0.floor().max(0.0);
    let x1 = bounds.x1.ceil().min(f64::from(frame.width));
    let y1 = bounds.y1.ceil().min(f64::from(frame.height));
    if !(x0 < x1 && y0 < y1) {
        return Ok(());
    }
    let (x0, y0, x1, y1) = (x0 as u32, y0 as u32, x1 as u32, y1 as u32);

    let stride = frame.width as usize;
    for y in y0..y1 {
        for x in x0..x1 {
            let p = inv * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let s = src.sample(p.x, p.y);
            if s[3] == 0 {
                continue;
            }
            let i = (y as usize * stride + x as usize) * 4;
            let d = &mut frame.data[i..i + 4];
            let out = over([d[0], d[1], d[2], d[3]], s, 1.0);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;

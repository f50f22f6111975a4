use crate::{
    assets::store::PreparedAssetStore,
    foundation::core::{Affine, Canvas, Rgba8Premul, Size},
    foundation::error::DrapeResult,
};

/// Final rendered frame pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Row-major RGBA8 bytes.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied by alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// One drawable asset. `transform` maps the asset's intrinsic pixel space onto the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub source_ref: String,
    pub transform: Affine,
    pub intrinsic: Size,
}

/// Declarative snapshot of everything an export draws, bottom layer first.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub canvas: Canvas,
    pub background: Rgba8Premul,
    pub layers: Vec<Layer>,
}

/// Rendering backend interface. Backends never perform IO; all assets come prepared.
pub trait RenderBackend {
    fn render_scene(
        &mut self,
        scene: &Scene,
        assets: &PreparedAssetStore,
    ) -> DrapeResult<FrameRGBA>;
}

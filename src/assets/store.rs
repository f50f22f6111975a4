use std::{collections::HashMap, path::Path, sync::Arc};

use anyhow::Context;

use crate::{
    assets::decode as assets_decode,
    foundation::core::Size,
    foundation::error::{DrapeError, DrapeResult},
};

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Pixel dimensions.
    pub fn size(&self) -> DrapeResult<Size> {
        Size::new(self.width, self.height)
    }
}

#[derive(Clone, Debug)]
/// Prepared SVG asset represented as a parsed `usvg` tree.
pub struct PreparedSvg {
    /// Parsed SVG tree.
    pub tree: Arc<usvg::Tree>,
}

impl PreparedSvg {
    /// Intrinsic size taken from the SVG's width/height, rounded up to whole pixels.
    pub fn size(&self) -> DrapeResult<Size> {
        let s = self.tree.size();
        let to_px = |v: f32| -> DrapeResult<u32> {
            if !v.is_finite() || v <= 0.0 {
                return Err(DrapeError::validation("svg has invalid width/height"));
            }
            Ok((v.ceil() as u32).max(1))
        };
        Size::new(to_px(s.width())?, to_px(s.height())?)
    }
}

#[derive(Clone, Debug)]
/// Union of asset kinds the renderer can draw.
pub enum PreparedAsset {
    /// Prepared bitmap image.
    Image(PreparedImage),
    /// Prepared SVG vector tree.
    Svg(PreparedSvg),
}

impl PreparedAsset {
    /// Intrinsic size of the asset.
    pub fn size(&self) -> DrapeResult<Size> {
        match self {
            Self::Image(img) => img.size(),
            Self::Svg(svg) => svg.size(),
        }
    }
}

/// Decoded assets keyed by source reference.
///
/// All decoding happens on insert so rendering never touches IO.
#[derive(Clone, Debug, Default)]
pub struct PreparedAssetStore {
    assets: HashMap<String, PreparedAsset>,
}

impl PreparedAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source_ref: impl Into<String>, asset: PreparedAsset) {
        self.assets.insert(source_ref.into(), asset);
    }

    pub fn insert_image(&mut self, source_ref: impl Into<String>, image: PreparedImage) {
        self.insert(source_ref, PreparedAsset::Image(image));
    }

    pub fn insert_svg(&mut self, source_ref: impl Into<String>, svg: PreparedSvg) {
        self.insert(source_ref, PreparedAsset::Svg(svg));
    }

    /// Decode `bytes` as SVG or raster and insert under `source_ref`.
    #[tracing::instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn insert_bytes(&mut self, source_ref: &str, bytes: &[u8]) -> DrapeResult<Size> {
        let asset = if assets_decode::looks_like_svg(bytes) {
            PreparedAsset::Svg(assets_decode::parse_svg(bytes)?)
        } else {
            PreparedAsset::Image(assets_decode::decode_image(bytes)?)
        };
        let size = asset.size()?;
        self.insert(source_ref, asset);
        Ok(size)
    }

    /// Read and insert a file, keyed by its path string.
    pub fn insert_file(&mut self, path: &Path) -> DrapeResult<(String, Size)> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read asset '{}'", path.display()))?;
        let source_ref = path.to_string_lossy().into_owned();
        let size = self.insert_bytes(&source_ref, &bytes)?;
        Ok((source_ref, size))
    }

    pub fn get(&self, source_ref: &str) -> DrapeResult<&PreparedAsset> {
        self.assets
            .get(source_ref)
            .ok_or_else(|| DrapeError::asset_unavailable(format!("no asset for '{source_ref}'")))
    }

    pub fn contains(&self, source_ref: &str) -> bool {
        self.assets.contains_key(source_ref)
    }

    pub fn intrinsic_size(&self, source_ref: &str) -> DrapeResult<Size> {
        self.get(source_ref)?.size()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;

use std::{
    collections::HashMap,
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{DrapeError, DrapeResult},
    foundation::math::Fnv1a64,
};

/// Largest upload kept as-is; bigger images are downscaled to fit inside these bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadLimits {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_width: 1200,
            max_height: 1600,
        }
    }
}

/// Result of storing an upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Durable storage for uploaded photos.
pub trait ImageStore {
    /// Normalize and persist `bytes`, returning where they can be fetched from.
    fn store(&mut self, bytes: &[u8]) -> DrapeResult<StoredImage>;

    /// Load previously stored bytes.
    fn fetch(&self, url: &str) -> DrapeResult<Vec<u8>>;
}

/// Decode an upload, shrink it to fit `limits` (never enlarging) and re-encode as PNG.
pub fn normalize_upload(bytes: &[u8], limits: UploadLimits) -> DrapeResult<(Vec<u8>, u32, u32)> {
    let mut img = image::load_from_memory(bytes).context("decode uploaded image")?;
    if img.width() > limits.max_width || img.height() > limits.max_height {
        img = img.resize(
            limits.max_width,
            limits.max_height,
            image::imageops::FilterType::Lanczos3,
        );
    }

    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode normalized upload as png")?;
    Ok((out, img.width(), img.height()))
}

fn content_name(png: &[u8], width: u32, height: u32) -> String {
    let mut h = Fnv1a64::new_default();
    h.write_u32(width);
    h.write_u32(height);
    h.write_bytes(png);
    format!("processed_{:016x}.png", h.finish())
}

/// In-process store keyed by `mem://` urls.
#[derive(Clone, Debug, Default)]
pub struct MemoryImageStore {
    limits: UploadLimits,
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryImageStore {
    pub fn new(limits: UploadLimits) -> Self {
        Self {
            limits,
            blobs: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl ImageStore for MemoryImageStore {
    fn store(&mut self, bytes: &[u8]) -> DrapeResult<StoredImage> {
        let (png, width, height) = normalize_upload(bytes, self.limits)?;
        let url = format!("mem://{}", content_name(&png, width, height));
        self.blobs.insert(url.clone(), png);
        Ok(StoredImage { url, width, height })
    }

    fn fetch(&self, url: &str) -> DrapeResult<Vec<u8>> {
        self.blobs
            .get(url)
            .cloned()
            .ok_or_else(|| DrapeError::validation(format!("no stored image at '{url}'")))
    }
}

/// Store writing normalized PNGs into a directory; urls are bare file names.
#[derive(Clone, Debug)]
pub struct DirImageStore {
    root: PathBuf,
    limits: UploadLimits,
}

impl DirImageStore {
    pub fn new(root: impl Into<PathBuf>, limits: UploadLimits) -> Self {
        Self {
            root: root.into(),
            limits,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, url: &str) -> DrapeResult<PathBuf> {
        let valid = !url.is_empty()
            && !url.contains(['/', '\\'])
            && url != "."
            && url != "..";
        if !valid {
            return Err(DrapeError::validation(format!(
                "stored image url must be a bare file name, got '{url}'"
            )));
        }
        Ok(self.root.join(url))
    }
}

impl ImageStore for DirImageStore {
    #[tracing::instrument(skip(self, bytes), fields(root = %self.root.display(), len = bytes.len()))]
    fn store(&mut self, bytes: &[u8]) -> DrapeResult<StoredImage> {
        let (png, width, height) = normalize_upload(bytes, self.limits)?;
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("create upload dir '{}'", self.root.display()))?;

        let url = content_name(&png, width, height);
        let path = self.path_for(&url)?;
        std::fs::write(&path, &png)
            .with_context(|| format!("write upload '{}'", path.display()))?;
        Ok(StoredImage { url, width, height })
    }

    fn fetch(&self, url: &str) -> DrapeResult<Vec<u8>> {
        let path = self.path_for(url)?;
        Ok(std::fs::read(&path).with_context(|| format!("read upload '{}'", path.display()))?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image_store.rs"]
mod tests;

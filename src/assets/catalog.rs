use std::{collections::BTreeMap, fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    assets::store::PreparedAssetStore,
    foundation::core::Size,
    foundation::error::{DrapeError, DrapeResult},
};

/// Garments the editor knows how to place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClothingKind {
    Jacket,
    Hoodie,
    Cap,
}

impl ClothingKind {
    pub const ALL: [ClothingKind; 3] = [Self::Jacket, Self::Hoodie, Self::Cap];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jacket => "jacket",
            Self::Hoodie => "hoodie",
            Self::Cap => "cap",
        }
    }
}

impl fmt::Display for ClothingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClothingKind {
    type Err = DrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == needle)
            .ok_or_else(|| DrapeError::asset_unavailable(format!("unknown clothing kind \"{s}\"")))
    }
}

/// A loaded garment graphic. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothingAsset {
    pub kind: ClothingKind,
    pub intrinsic_width: u32,
    pub intrinsic_height: u32,
    /// Key of the asset's pixels in a [`PreparedAssetStore`].
    pub source_ref: String,
}

impl ClothingAsset {
    pub fn new(
        kind: ClothingKind,
        intrinsic_width: u32,
        intrinsic_height: u32,
        source_ref: impl Into<String>,
    ) -> DrapeResult<Self> {
        if intrinsic_width == 0 || intrinsic_height == 0 {
            return Err(DrapeError::asset_unavailable(format!(
                "{kind} asset has degenerate size {intrinsic_width}x{intrinsic_height}"
            )));
        }
        Ok(Self {
            kind,
            intrinsic_width,
            intrinsic_height,
            source_ref: source_ref.into(),
        })
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.intrinsic_width,
            height: self.intrinsic_height,
        }
    }
}

/// Resolves a garment kind to a loaded asset.
pub trait ClothingCatalog {
    /// Look up the asset for `kind`; [`DrapeError::AssetUnavailable`] when there is none.
    fn resolve(&self, kind: ClothingKind) -> DrapeResult<ClothingAsset>;
}

/// Catalog backed by a plain map, for embedding and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    items: BTreeMap<ClothingKind, ClothingAsset>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, asset: ClothingAsset) -> Self {
        self.insert(asset);
        self
    }

    pub fn insert(&mut self, asset: ClothingAsset) {
        self.items.insert(asset.kind, asset);
    }

    pub fn kinds(&self) -> impl Iterator<Item = ClothingKind> + '_ {
        self.items.keys().copied()
    }
}

impl ClothingCatalog for MemoryCatalog {
    fn resolve(&self, kind: ClothingKind) -> DrapeResult<ClothingAsset> {
        self.items
            .get(&kind)
            .cloned()
            .ok_or_else(|| DrapeError::asset_unavailable(format!("no asset for {kind}")))
    }
}

/// Catalog loaded from a directory holding `<kind>.<ext>` files.
#[derive(Clone, Debug)]
pub struct DirCatalog {
    inner: MemoryCatalog,
}

impl DirCatalog {
    /// Extensions tried for each kind, in order.
    pub const EXTENSIONS: [&'static str; 5] = ["svg", "png", "jpg", "jpeg", "webp"];

    /// Decode every garment found in `dir` into `store`. Kinds without a file are left
    /// unresolved; a file that fails to decode is an error.
    #[tracing::instrument(skip(dir, store), fields(dir = %dir.display()))]
    pub fn load(dir: &Path, store: &mut PreparedAssetStore) -> DrapeResult<Self> {
        let mut inner = MemoryCatalog::new();
        for kind in ClothingKind::ALL {
            let Some(path) = Self::EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{}.{ext}", kind.as_str())))
                .find(|p| p.is_file())
            else {
                tracing::debug!(%kind, "no asset file");
                continue;
            };
            let (source_ref, size) = store.insert_file(&path)?;
            inner.insert(ClothingAsset::new(kind, size.width, size.height, source_ref)?);
        }
        Ok(Self { inner })
    }

    pub fn kinds(&self) -> impl Iterator<Item = ClothingKind> + '_ {
        self.inner.kinds()
    }
}

impl ClothingCatalog for DirCatalog {
    fn resolve(&self, kind: ClothingKind) -> DrapeResult<ClothingAsset> {
        self.inner.resolve(kind)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/catalog.rs"]
mod tests;

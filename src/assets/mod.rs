pub(crate) mod catalog;
pub(crate) mod color;
pub(crate) mod decode;
pub(crate) mod image_store;
pub(crate) mod store;
pub(crate) mod svg_raster;

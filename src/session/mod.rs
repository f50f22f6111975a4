pub(crate) mod mode;
pub(crate) mod overlay;

use std::io::Cursor;

use anyhow::Context;

use crate::{
    foundation::error::{DrapeError, DrapeResult},
    foundation::math::unpremultiply_rgba8_in_place,
    render::backend::FrameRGBA,
};

/// Encode a frame as PNG with straight alpha.
pub fn encode_png(frame: &FrameRGBA) -> DrapeResult<Vec<u8>> {
    let expected = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.data.len() != expected {
        return Err(DrapeError::validation(format!(
            "frame buffer is {} bytes, expected {expected} for {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let mut data = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| DrapeError::validation("frame buffer does not match its size"))?;

    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode frame as png")?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;

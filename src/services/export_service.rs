use std::ops::Deref;

use image::codecs::png::PngEncoder;
use image::{imageops, ImageBuffer, ImageEncoder, Pixel, Rgb, RgbImage};
use tracing::debug;

use crate::models::RenderedImage;
use crate::services::chart_service::Canvas;
use crate::utils::ChartError;

/// Space kept around the drawn content after cropping
pub const CROP_PADDING: u32 = 10;

/// Crop the canvas to its content and encode it as PNG.
/// The canvas is consumed, so its pixel buffer is released on every return path.
pub fn export_png(canvas: Canvas) -> Result<RenderedImage, ChartError> {
    let (width, height) = (canvas.width(), canvas.height());
    let bg = canvas.background();
    let background = Rgb([bg.0, bg.1, bg.2]);

    let img: RgbImage = ImageBuffer::from_raw(width, height, canvas.into_pixels()).ok_or_else(|| {
        ChartError::Drawing(format!("canvas buffer does not match {}x{}", width, height))
    })?;

    let img = match content_bounds(&img, background, CROP_PADDING) {
        Some((x, y, w, h)) => imageops::crop_imm(&img, x, y, w, h).to_image(),
        None => img,
    };

    let bytes = encode_png(&img)?;
    debug!(
        "Exported {}x{} canvas as {}x{} PNG ({} bytes)",
        width,
        height,
        img.width(),
        img.height(),
        bytes.len()
    );
    Ok(RenderedImage::new(bytes, img.width(), img.height()))
}

/// Bounding box `(x, y, width, height)` of every pixel that differs from
/// `background`, grown by `pad` and clamped to the image. `None` when blank.
pub fn content_bounds(img: &RgbImage, background: Rgb<u8>, pad: u32) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in img.enumerate_pixels() {
        if *pixel == background {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }

    bounds.map(|(x0, y0, x1, y1)| {
        let left = x0.saturating_sub(pad);
        let top = y0.saturating_sub(pad);
        let right = (x1 + pad).min(img.width() - 1);
        let bottom = (y1 + pad).min(img.height() - 1);
        (left, top, right - left + 1, bottom - top + 1)
    })
}

pub fn encode_png<P, Container>(img: &ImageBuffer<P, Container>) -> Result<Vec<u8>, ChartError>
where
    P: Pixel<Subpixel = u8> + image::PixelWithColorType,
    Container: Deref<Target = [P::Subpixel]>,
{
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder.write_image(img, img.width(), img.height(), P::COLOR_TYPE.into())?;
    Ok(buf)
}

use std::path::Path;

use image::{ColorType, DynamicImage, ImageBuffer, ImageFormat, Luma};
use tracing::{debug, warn};

use crate::consts::EIGHT_TO_SIXTEEN_BIT;
use crate::error::{RedoxError, Result};
use crate::frame::BitDepth;

/// Bring a stored channel image to 16-bit range, in place.
///
/// 8-bit sources are rewritten as 16-bit grayscale with every sample `v`
/// replaced by `v * 257`, in the container format implied by the file
/// extension. Containers that cannot store 16-bit luma (JPEG, BMP, ...) are
/// left as they are; loading widens their samples by the same factor. 16-bit
/// sources are left untouched. Returns the depth the file had before
/// normalization.
pub fn normalize_depth(path: &Path) -> Result<BitDepth> {
    let img = image::open(path).map_err(|source| RedoxError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let depth = detect_bit_depth(path, img.color())?;
    if depth == BitDepth::Sixteen {
        return Ok(depth);
    }

    let format = ImageFormat::from_path(path)?;
    if !holds_sixteen_bit_luma(format) {
        warn!(
            path = %path.display(),
            format = ?format,
            "Format cannot store 16-bit samples, leaving 8-bit file in place"
        );
        return Ok(depth);
    }

    let expanded = expand_to_sixteen(&img);
    expanded.save_with_format(path, format)?;
    debug!(path = %path.display(), "Expanded 8-bit image to 16-bit");

    Ok(depth)
}

/// Classify the sample depth of a decoded image.
pub fn detect_bit_depth(path: &Path, color: ColorType) -> Result<BitDepth> {
    match color {
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => Ok(BitDepth::Eight),
        ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => {
            Ok(BitDepth::Sixteen)
        }
        other => Err(RedoxError::UnsupportedBitDepth {
            path: path.to_path_buf(),
            color: format!("{other:?}"),
        }),
    }
}

fn holds_sixteen_bit_luma(format: ImageFormat) -> bool {
    matches!(format, ImageFormat::Png | ImageFormat::Tiff | ImageFormat::Pnm)
}

fn expand_to_sixteen(img: &DynamicImage) -> ImageBuffer<Luma<u16>, Vec<u16>> {
    let gray = img.to_luma8();
    let (w, h) = gray.dimensions();
    ImageBuffer::from_fn(w, h, |x, y| {
        Luma([u16::from(gray.get_pixel(x, y).0[0]) * EIGHT_TO_SIXTEEN_BIT])
    })
}

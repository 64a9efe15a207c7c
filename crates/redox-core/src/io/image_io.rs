use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use ndarray::{Array2, Array3};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};

use crate::error::{RedoxError, Result};
use crate::frame::{BitDepth, Channel, ChannelImage};

use super::depth::detect_bit_depth;

/// Load a grayscale channel image. Color sources are converted to luma.
pub fn load_channel(path: &Path, channel: Channel, index: usize) -> Result<ChannelImage> {
    let img = image::open(path).map_err(|source| RedoxError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let bit_depth = detect_bit_depth(path, img.color())?;

    let gray = img.to_luma16();
    let (w, h) = gray.dimensions();
    let mut data = Array2::<u16>::zeros((h as usize, w as usize));

    for row in 0..h as usize {
        for col in 0..w as usize {
            data[[row, col]] = gray.get_pixel(col as u32, row as u32).0[0];
        }
    }

    Ok(ChannelImage {
        data,
        channel,
        index,
        bit_depth,
        source: path.to_path_buf(),
    })
}

/// Save a ratio map as a 32-bit float grayscale TIFF, values written unchanged.
pub fn save_ratio_tiff(data: &Array2<f32>, path: &Path) -> Result<()> {
    let (h, w) = data.dim();
    let pixels: Vec<f32> = data.iter().copied().collect();

    let file = File::create(path).map_err(|e| RedoxError::fs(path, e))?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;
    encoder.write_image::<colortype::Gray32Float>(w as u32, h as u32, &pixels)?;
    Ok(())
}

/// Load a 32-bit float grayscale TIFF written by [`save_ratio_tiff`].
pub fn load_ratio_tiff(path: &Path) -> Result<Array2<f32>> {
    let file = File::open(path).map_err(|e| RedoxError::fs(path, e))?;
    let mut decoder = Decoder::new(BufReader::new(file))?;
    let (w, h) = decoder.dimensions()?;
    let (w, h) = (w as usize, h as usize);

    let pixels = match decoder.read_image()? {
        DecodingResult::F32(buf) => buf,
        _ => {
            return Err(RedoxError::UnsupportedBitDepth {
                path: path.to_path_buf(),
                color: "non-float TIFF".into(),
            })
        }
    };
    if pixels.len() != w * h {
        return Err(RedoxError::UnsupportedBitDepth {
            path: path.to_path_buf(),
            color: format!("{} samples for {w}x{h} pixels", pixels.len()),
        });
    }

    Ok(Array2::from_shape_fn((h, w), |(row, col)| pixels[row * w + col]))
}

/// Save an RGBA render (shape `(h, w, 4)`, values in `[0, 1]`) as 8-bit RGBA.
///
/// The container is chosen from the extension: PNG for `png`, TIFF otherwise.
pub fn save_rgba_image(rgba: &Array3<f32>, path: &Path) -> Result<()> {
    let (h, w, _) = rgba.dim();
    let mut img = RgbaImage::new(w as u32, h as u32);

    for row in 0..h {
        for col in 0..w {
            let px = |c: usize| (rgba[[row, col, c]].clamp(0.0, 1.0) * 255.0).round() as u8;
            img.put_pixel(col as u32, row as u32, Rgba([px(0), px(1), px(2), px(3)]));
        }
    }

    let format = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => ImageFormat::Png,
        _ => ImageFormat::Tiff,
    };
    img.save_with_format(path, format)?;
    Ok(())
}

/// Basic facts about an image file, as reported by `redox info`.
#[derive(Clone, Debug)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub color: String,
    pub bit_depth: Option<BitDepth>,
}

pub fn inspect_image(path: &Path) -> Result<ImageInfo> {
    let img = image::open(path).map_err(|source| RedoxError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ImageInfo {
        width: img.width(),
        height: img.height(),
        color: format!("{:?}", img.color()),
        bit_depth: detect_bit_depth(path, img.color()).ok(),
    })
}

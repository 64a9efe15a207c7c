pub mod depth;
pub mod image_io;

pub use depth::normalize_depth;
pub use image_io::{load_channel, load_ratio_tiff, save_ratio_tiff, save_rgba_image};

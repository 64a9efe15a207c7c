pub mod colormap;
pub mod pretty;

pub use colormap::{ColorTable, Rgba};
pub use pretty::{color_indices, intensity_stretch, pretty_redox, PrettyRender};

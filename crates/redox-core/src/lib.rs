pub mod align;
pub mod calibrate;
pub mod consts;
pub mod error;
pub mod frame;
pub mod io;
pub mod pipeline;
pub mod ratio;
pub mod render;
pub mod session;
pub mod stats;

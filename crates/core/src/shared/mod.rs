pub mod constants;
pub mod frame;
pub mod pixel_format;
pub mod region;

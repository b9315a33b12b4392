pub mod frame_pixelater;

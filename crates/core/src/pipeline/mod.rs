pub mod pixelate_image_use_case;

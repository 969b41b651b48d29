// SPDX-License-Identifier: GPL-3.0-only

//! Image preprocessing for the labeling model

use super::Rotation;
use image::DynamicImage;
use image::imageops::FilterType;
use ndarray::Array4;

/// Square input size expected by MobileNet-style labelers
pub const INPUT_SIZE: u32 = 224;

/// ImageNet normalization mean values
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet normalization std values
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Undo the orientation hint so the model sees the scene upright
pub fn apply_rotation(image: DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::None => image,
        Rotation::Deg90 => image.rotate90(),
        Rotation::Deg180 => image.rotate180(),
        Rotation::Deg270 => image.rotate270(),
    }
}

/// Resize, normalize with ImageNet mean/std and lay out as NCHW `[1, 3, S, S]`
pub fn to_input_tensor(image: &DynamicImage, size: u32) -> Array4<f32> {
    let rgb = image.resize_exact(size, size, FilterType::Triangle).to_rgb8();
    let side = size as usize;

    let mut tensor = Array4::zeros((1, 3, side, side));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn tensor_has_nchw_shape() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 50, Rgb([255, 0, 0])));
        let tensor = to_input_tensor(&image, INPUT_SIZE);
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);

        let red = (1.0 - MEAN[0]) / STD[0];
        let green = (0.0 - MEAN[1]) / STD[1];
        assert!((tensor[[0, 0, 10, 10]] - red).abs() < 1e-4);
        assert!((tensor[[0, 1, 10, 10]] - green).abs() < 1e-4);
    }

    #[test]
    fn rotation_swaps_dimensions() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(40, 10));
        let rotated = apply_rotation(image, Rotation::Deg90);
        assert_eq!((rotated.width(), rotated.height()), (10, 40));
    }
}

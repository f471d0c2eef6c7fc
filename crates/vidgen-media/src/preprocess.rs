//! Image decoding and batch tensor assembly.
//!
//! Raw image buffers are decoded in parallel, resized bilinearly to the
//! canonical resolution, and stacked along a new leading batch axis.
//! Batch index `i` always corresponds to `images[i]` regardless of the
//! decode order.

use image::imageops::FilterType;
use image::RgbImage;
use ndarray::Array4;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Canonical edge length every input image is resized to.
pub const FRAME_SIZE: u32 = 256;
/// Color channels in the batch tensor (RGB).
pub const FRAME_CHANNELS: usize = 3;

/// Decode and resize a batch of raw image buffers into an
/// `[N, 256, 256, 3]` f32 tensor, in input order.
///
/// Pixel values keep the raw 0-255 intensity scale expected by the
/// frame synthesis models.
pub fn batch_images(images: &[Vec<u8>]) -> MediaResult<Array4<f32>> {
    if images.is_empty() {
        return Err(MediaError::EmptyInput);
    }

    // Parallel decode; collect() on indexed results restores input order
    // and surfaces the first failure.
    let decoded: Vec<RgbImage> = images
        .par_iter()
        .enumerate()
        .map(|(index, bytes)| decode_and_resize(index, bytes))
        .collect::<MediaResult<Vec<_>>>()?;

    let n = decoded.len();
    let size = FRAME_SIZE as usize;
    let mut batch = Array4::<f32>::zeros((n, size, size, FRAME_CHANNELS));

    for (i, img) in decoded.iter().enumerate() {
        for (x, y, pixel) in img.enumerate_pixels() {
            for c in 0..FRAME_CHANNELS {
                batch[[i, y as usize, x as usize, c]] = f32::from(pixel[c]);
            }
        }
    }

    debug!(batch_size = n, "assembled input batch");

    Ok(batch)
}

/// Decode one raw buffer and resize to the canonical resolution.
fn decode_and_resize(index: usize, bytes: &[u8]) -> MediaResult<RgbImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| MediaError::decode(index, e.to_string()))?;

    // Triangle filter is bilinear interpolation.
    Ok(image::imageops::resize(
        &img.to_rgb8(),
        FRAME_SIZE,
        FRAME_SIZE,
        FilterType::Triangle,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};
    use std::io::Cursor;

    /// Encode a solid-color PNG in memory.
    fn solid_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb(color));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_empty_input() {
        let result = batch_images(&[]);
        assert!(matches!(result, Err(MediaError::EmptyInput)));
    }

    #[test]
    fn test_batch_shape() {
        let images = vec![solid_png(64, 48, [10, 20, 30]), solid_png(300, 300, [1, 2, 3])];
        let batch = batch_images(&images).unwrap();
        assert_eq!(batch.dim(), (2, 256, 256, 3));
    }

    #[test]
    fn test_batch_preserves_input_order() {
        let red = solid_png(32, 32, [255, 0, 0]);
        let green = solid_png(32, 32, [0, 255, 0]);
        let blue = solid_png(32, 32, [0, 0, 255]);

        let batch = batch_images(&[red, green, blue]).unwrap();

        // Center pixel of each batch slice must match the input color.
        assert_eq!(batch[[0, 128, 128, 0]], 255.0);
        assert_eq!(batch[[1, 128, 128, 1]], 255.0);
        assert_eq!(batch[[2, 128, 128, 2]], 255.0);
        assert_eq!(batch[[0, 128, 128, 1]], 0.0);
    }

    #[test]
    fn test_corrupt_buffer_carries_index() {
        let good = solid_png(16, 16, [9, 9, 9]);
        let corrupt = vec![0xde, 0xad, 0xbe, 0xef];

        let result = batch_images(&[good, corrupt]);
        match result {
            Err(MediaError::Decode { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected Decode error, got {other:?}"),
        }
    }
}

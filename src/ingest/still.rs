//! Still-image loading for the single-image tool and the evaluators.

use anyhow::{Context, Result};
use image::imageops::FilterType;
use std::path::Path;

use crate::frame::Frame;

/// Load an image as an RGB frame, optionally resized to the detector's
/// input dimensions.
pub fn load_rgb_frame(path: &Path, resize_to: Option<(u32, u32)>) -> Result<Frame> {
    let img = image::open(path)
        .with_context(|| format!("failed to load image {}", path.display()))?;
    let rgb = match resize_to {
        Some((width, height)) => {
            image::imageops::resize(&img.to_rgb8(), width, height, FilterType::Triangle)
        }
        None => img.to_rgb8(),
    };
    let (width, height) = rgb.dimensions();
    Frame::new(rgb.into_raw(), width, height, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn loads_and_resizes_to_detector_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("img.png");
        RgbImage::from_pixel(32, 24, image::Rgb([10, 20, 30]))
            .save(&path)
            .expect("write image");

        let frame = load_rgb_frame(&path, Some((16, 16))).expect("load");
        assert_eq!((frame.width(), frame.height()), (16, 16));

        let native = load_rgb_frame(&path, None).expect("load");
        assert_eq!((native.width(), native.height()), (32, 24));
    }

    #[test]
    fn missing_image_is_an_error() {
        assert!(load_rgb_frame(Path::new("/nonexistent/img.jpg"), None).is_err());
    }
}

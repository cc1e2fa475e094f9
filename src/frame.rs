//! Owned RGB frames flowing through the pipeline.
//!
//! A `Frame` is a tightly-packed RGB24 buffer plus its dimensions and a
//! monotonically increasing index assigned by the source. Frames are
//! immutable once constructed; the detector and the snapshot writer only
//! ever borrow the pixel data.

use anyhow::{anyhow, Result};

#[derive(Clone, Debug)]
pub struct Frame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    index: u64,
}

impl Frame {
    /// Construct a frame, verifying the buffer matches `width * height * 3`.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, index: u64) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if pixels.len() != expected {
            return Err(anyhow!(
                "expected {} RGB bytes for {}x{}, received {}",
                expected,
                width,
                height,
                pixels.len()
            ));
        }
        Ok(Self {
            pixels,
            width,
            height,
            index,
        })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Source-assigned frame index (1-based for file sources).
    pub fn index(&self) -> u64 {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_buffer() {
        assert!(Frame::new(vec![0u8; 10], 4, 4, 0).is_err());
    }

    #[test]
    fn accepts_exact_buffer() {
        let frame = Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, 7).expect("frame");
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 4);
        assert_eq!(frame.index(), 7);
        assert_eq!(frame.pixels().len(), 48);
    }
}

//! Annotated alert snapshots.
//!
//! The frame that triggered an alert is written out as a JPEG with the
//! detection boxes burned in, attached to the notification, and deleted
//! once the episode resolves.

use anyhow::{anyhow, Context, Result};
use image::{Rgb, RgbImage};
use std::io::ErrorKind;
use std::path::Path;

use crate::detect::{BoundingBox, Detection};
use crate::frame::Frame;

const BOX_COLOR: Rgb<u8> = Rgb([220, 40, 40]);
const BOX_THICKNESS: u32 = 2;

/// Copy the frame and burn in one border per detection box.
pub fn annotate(frame: &Frame, detections: &[Detection]) -> Result<RgbImage> {
    let mut img = RgbImage::from_raw(
        frame.width(),
        frame.height(),
        frame.pixels().to_vec(),
    )
    .ok_or_else(|| anyhow!("frame buffer does not match its dimensions"))?;

    for detection in detections {
        let Some(bbox) = detection.bbox else {
            continue;
        };
        if let Some(rect) = to_pixel_rect(&bbox, frame.width(), frame.height()) {
            draw_rect(&mut img, rect, BOX_COLOR, BOX_THICKNESS);
        }
    }
    Ok(img)
}

/// Annotate and write the snapshot JPEG.
pub fn write_snapshot(frame: &Frame, detections: &[Detection], path: &Path) -> Result<()> {
    let img = annotate(frame, detections)?;
    img.save(path)
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    Ok(())
}

/// Delete a snapshot; an already-absent file is fine.
pub fn discard_snapshot(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => {
            Err(e).with_context(|| format!("failed to remove snapshot {}", path.display()))
        }
    }
}

/// Normalize a 0..1 box into pixel coordinates, clamped to image bounds.
fn to_pixel_rect(bbox: &BoundingBox, width: u32, height: u32) -> Option<[u32; 4]> {
    if width == 0 || height == 0 {
        return None;
    }
    let clamp = |v: f32, max: u32| -> u32 { (v.max(0.0) * max as f32).min((max - 1) as f32) as u32 };
    let x0 = clamp(bbox.x0, width);
    let y0 = clamp(bbox.y0, height);
    let x1 = clamp(bbox.x1, width);
    let y1 = clamp(bbox.y1, height);
    if x0 > x1 || y0 > y1 {
        return None;
    }
    Some([x0, y0, x1, y1])
}

/// Draw a rectangle border with the given thickness.
fn draw_rect(img: &mut RgbImage, rect: [u32; 4], color: Rgb<u8>, thickness: u32) {
    let (width, height) = img.dimensions();
    let [x0, y0, x1, y1] = rect;
    for t in 0..thickness {
        let xx0 = x0.saturating_add(t);
        let yy0 = y0.saturating_add(t);
        let xx1 = x1.saturating_sub(t);
        let yy1 = y1.saturating_sub(t);
        if xx0 >= width || yy0 >= height || xx0 > xx1 || yy0 > yy1 {
            continue;
        }
        for x in xx0..=xx1.min(width - 1) {
            img.put_pixel(x, yy0, color);
            if yy1 < height {
                img.put_pixel(x, yy1, color);
            }
        }
        for y in yy0..=yy1.min(height - 1) {
            img.put_pixel(xx0, y, color);
            if xx1 < width {
                img.put_pixel(xx1, y, color);
            }
        }
    }
}

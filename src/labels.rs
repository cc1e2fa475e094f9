//! Ground-truth label loading.
//!
//! Labels live in a directory of plain-text files, one per image, named
//! after the image stem with a `.txt` extension. Each line is one annotated
//! object whose first whitespace-separated token is the class id. Presence
//! is encoded by the file having content: a missing file and an empty file
//! both mean "nothing present" and are indistinguishable downstream.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// True when the path has a recognized image extension (case insensitive).
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// List image files in a directory in deterministic (sorted) order.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read image directory {}", dir.display()))?;
    let mut images = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && is_image_file(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// Path of the label file paired with an image.
pub fn label_path_for(image: &Path, labels_dir: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    labels_dir.join(format!("{}.txt", stem))
}

/// Binary presence label: 1 when the label file exists and has content.
///
/// A missing file and an empty (or whitespace-only) file are both 0.
pub fn presence_label(label_path: &Path) -> Result<u8> {
    match std::fs::read_to_string(label_path) {
        Ok(content) => Ok(if content.trim().is_empty() { 0 } else { 1 }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
        Err(e) => {
            Err(e).with_context(|| format!("failed to read label file {}", label_path.display()))
        }
    }
}

/// Class label: the first whitespace token of the first non-empty line.
///
/// Returns `None` when the file is absent, empty, or its first token does
/// not parse as an integer (logged; the caller skips the image).
pub fn first_class_label(label_path: &Path) -> Result<Option<i64>> {
    let content = match std::fs::read_to_string(label_path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to read label file {}", label_path.display()))
        }
    };
    let Some(token) = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .and_then(|line| line.split_whitespace().next())
    else {
        return Ok(None);
    };
    match token.parse::<i64>() {
        Ok(class_id) => Ok(Some(class_id)),
        Err(_) => {
            log::warn!(
                "label file {} has a non-integer class token '{}', skipping",
                label_path.display(),
                token
            );
            Ok(None)
        }
    }
}

/// Build the `{image filename: 0|1}` presence map for a dataset split.
pub fn build_presence_index(
    images_dir: &Path,
    labels_dir: &Path,
) -> Result<BTreeMap<String, u8>> {
    let mut index = BTreeMap::new();
    for image in list_images(images_dir)? {
        let name = image
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = presence_label(&label_path_for(&image, labels_dir))?;
        index.insert(name, label);
    }
    Ok(index)
}

/// Write a presence map as pretty-printed JSON.
pub fn write_presence_index(index: &BTreeMap<String, u8>, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(index).context("serialize presence index")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write presence index {}", path.display()))?;
    Ok(())
}

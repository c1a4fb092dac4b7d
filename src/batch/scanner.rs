//! Directory checks and image discovery.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::TaggerConfig;

/// Creates `dir` (with parents) if it does not exist.
///
/// Returns `true` when the directory had to be created.
pub fn ensure_output_dir(dir: &Path) -> io::Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir)?;
    Ok(true)
}

/// Lists accepted image files directly inside the configured input directory.
///
/// Subdirectories are not descended into. The result is sorted by path so the
/// processing order does not depend on the filesystem's listing order.
pub fn list_images(config: &TaggerConfig) -> io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(config.input_dir())? {
        let path = entry?.path();
        if path.is_file() && config.accepts(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

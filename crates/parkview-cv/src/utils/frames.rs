//! Frame sequence discovery

use crate::Result;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

/// Collects frame images from one or more directories
pub struct FrameLoader {
    frame_dirs: Vec<PathBuf>,
    supported_extensions: Vec<String>,
}

impl FrameLoader {
    pub fn new() -> Self {
        Self {
            frame_dirs: Vec::new(),
            supported_extensions: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "bmp".to_string(),
            ],
        }
    }

    /// Add frame directory
    pub fn add_frame_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.frame_dirs.push(dir.as_ref().to_path_buf());
        self
    }

    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.supported_extensions.contains(&ext))
    }

    /// All frame paths, sorted by file name within each directory.
    ///
    /// Files whose stem ends in `_mask` are label masks, not frames.
    pub fn list_frames(&self) -> Result<Vec<PathBuf>> {
        let mut frames = Vec::new();

        for dir in &self.frame_dirs {
            if !dir.exists() {
                tracing::warn!(dir = ?dir, "frame directory does not exist");
                continue;
            }

            let entries = fs::read_dir(dir)
                .with_context(|| format!("Failed to read directory: {:?}", dir))?;

            let mut found = Vec::new();
            for entry in entries {
                let path = entry?.path();
                let is_mask = path
                    .file_stem()
                    .is_some_and(|stem| stem.to_string_lossy().ends_with("_mask"));
                if path.is_file() && !is_mask && self.is_supported(&path) {
                    found.push(path);
                }
            }
            found.sort();
            frames.extend(found);
        }

        tracing::debug!(frames = frames.len(), "listed frames");
        Ok(frames)
    }
}

impl Default for FrameLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_sorted_images_only() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("parkview-frames-{}", std::process::id()));
        fs::create_dir_all(&dir)?;
        for name in ["b.png", "a.JPG", "notes.txt", "a_mask.png", "c.bmp"] {
            fs::write(dir.join(name), b"")?;
        }

        let frames = FrameLoader::new().add_frame_dir(&dir).list_frames()?;
        fs::remove_dir_all(&dir)?;

        let names: Vec<String> = frames
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.bmp"]);
        Ok(())
    }

    #[test]
    fn test_missing_dir_is_empty() -> Result<()> {
        let frames = FrameLoader::new().add_frame_dir("/nonexistent/parkview/frames").list_frames()?;
        assert!(frames.is_empty());
        Ok(())
    }
}

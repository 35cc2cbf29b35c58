//! Native image dialog using rfd (rust file dialog).

use shared::image::IMAGE_EXTENSIONS;
use std::path::{Path, PathBuf};

/// Single-image picker. Reopens in the folder of the last pick.
pub struct ImagePicker {
    title: String,
    start_dir: Option<PathBuf>,
}

impl Default for ImagePicker {
    fn default() -> Self {
        Self::new()
    }
}

impl ImagePicker {
    pub fn new() -> Self {
        Self {
            title: "Select an image".to_string(),
            start_dir: dirs::picture_dir(),
        }
    }

    /// Blocking: opens the native dialog and waits for the user.
    pub fn pick(&mut self) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new()
            .set_title(&self.title)
            .add_filter("Images", IMAGE_EXTENSIONS);

        if let Some(ref dir) = self.start_dir {
            dialog = dialog.set_directory(dir);
        }

        let picked = dialog.pick_file()?;
        self.remember(&picked);
        Some(picked)
    }

    fn remember(&mut self, picked: &Path) {
        if let Some(parent) = picked.parent() {
            self.start_dir = Some(parent.to_path_buf());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_remembers_folder() {
        let mut picker = ImagePicker::new();
        picker.remember(Path::new("/photos/trip/beach.jpg"));
        assert_eq!(picker.start_dir.as_deref(), Some(Path::new("/photos/trip")));
    }
}

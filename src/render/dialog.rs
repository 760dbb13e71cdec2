//! Native "Save as" dialog for the desktop window.

use std::path::{Path, PathBuf};

use crate::session::{FilePicker, with_default_extension};

pub const SAVE_TITLE: &str = "Save Derivation as PDF";
pub const DEFAULT_FILE_STEM: &str = "derivation";

/// Asks through the platform's save dialog. Remembers the last folder used.
#[derive(Debug, Default)]
pub struct DialogPicker {
    last_dir: Option<PathBuf>,
}

impl DialogPicker {
    pub fn new() -> Self {
        Self::default()
    }

    fn remember(&mut self, chosen: &Path) {
        self.last_dir = chosen.parent().map(Path::to_path_buf);
    }
}

impl FilePicker for DialogPicker {
    fn pick_save_path(&mut self, default_extension: &str) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new()
            .set_title(SAVE_TITLE)
            .add_filter("PDF Documents", &[default_extension])
            .set_file_name(format!("{DEFAULT_FILE_STEM}.{default_extension}"));
        if let Some(dir) = &self.last_dir {
            dialog = dialog.set_directory(dir);
        }

        let chosen = dialog.save_file()?;
        self.remember(&chosen);
        Some(with_default_extension(chosen, default_extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_the_folder_of_the_last_choice() {
        let mut picker = DialogPicker::new();
        assert!(picker.last_dir.is_none());

        picker.remember(Path::new("/home/me/papers/eq30.pdf"));
        assert_eq!(picker.last_dir.as_deref(), Some(Path::new("/home/me/papers")));
    }
}

//! Temp-file janitor.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::render::formula::file_owner;

/// Paths of rendered images awaiting deletion, in registration order.
///
/// `drain` is the single cleanup routine: it runs on re-run, after an export, on
/// window close, and from `Drop`. Deletion is best-effort; failures are logged and
/// never surface to the caller.
#[derive(Debug, Default)]
pub struct TempFileRegistry {
    paths: Vec<PathBuf>,
}

impl TempFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Delete every registered file and forget it. Returns how many files were removed.
    pub fn drain(&mut self) -> usize {
        let mut removed = 0;
        for path in self.paths.drain(..) {
            match remove_if_present(&path) {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(err) => log::warn!("could not delete temp file {}: {err}", path.display()),
            }
        }
        if removed > 0 {
            log::debug!("janitor: removed {removed} temp file(s)");
        }
        removed
    }
}

impl Drop for TempFileRegistry {
    fn drop(&mut self) {
        self.drain();
    }
}

/// Delete every rendered image in `dir` whose name says process `pid` wrote it.
///
/// Used when the registries themselves cannot be reached (an interrupt arrives on
/// another thread). Returns how many files were removed.
pub fn sweep(dir: &Path, pid: u32) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return 0,
        Err(err) => {
            log::warn!("janitor: cannot list {}: {err}", dir.display());
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let owned = entry
            .file_name()
            .to_str()
            .and_then(file_owner)
            .is_some_and(|owner| owner == pid);
        if !owned {
            continue;
        }
        let path = entry.path();
        match remove_if_present(&path) {
            Ok(true) => removed += 1,
            Ok(false) => {}
            Err(err) => log::warn!("could not delete temp file {}: {err}", path.display()),
        }
    }
    removed
}

fn remove_if_present(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"png").unwrap();
        path
    }

    #[test]
    fn drain_deletes_and_forgets() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = TempFileRegistry::new();
        let a = touch(dir.path(), "a.png");
        let b = touch(dir.path(), "b.png");
        registry.register(&a);
        registry.register(&b);

        assert_eq!(registry.drain(), 2);
        assert!(registry.is_empty());
        assert!(!a.exists() && !b.exists());
    }

    #[test]
    fn missing_files_are_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = TempFileRegistry::new();
        registry.register(dir.path().join("never-written.png"));
        let kept = touch(dir.path(), "kept.png");
        registry.register(&kept);
        fs::remove_file(&kept).unwrap();

        assert_eq!(registry.drain(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn undeletable_entry_does_not_stop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = TempFileRegistry::new();
        // A non-empty directory cannot be removed with remove_file.
        let stubborn = dir.path().join("stubborn");
        fs::create_dir(&stubborn).unwrap();
        touch(&stubborn, "inner.png");
        let after = touch(dir.path(), "after.png");

        registry.register(&stubborn);
        registry.register(&after);

        assert_eq!(registry.drain(), 1);
        assert!(stubborn.exists());
        assert!(!after.exists());
    }

    #[test]
    fn drop_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "a.png");
        {
            let mut registry = TempFileRegistry::new();
            registry.register(&path);
        }
        assert!(!path.exists());
    }

    #[test]
    fn sweep_removes_only_this_process_images() {
        let dir = tempfile::tempdir().unwrap();
        let ours = touch(dir.path(), "formula_41_100_0.png");
        let export = touch(dir.path(), "export_41_101_1.png");
        let theirs = touch(dir.path(), "formula_42_100_0.png");
        let unrelated = touch(dir.path(), "notes.png");

        assert_eq!(sweep(dir.path(), 41), 2);
        assert!(!ours.exists() && !export.exists());
        assert!(theirs.exists() && unrelated.exists());

        assert_eq!(sweep(&dir.path().join("absent"), 41), 0);
    }
}

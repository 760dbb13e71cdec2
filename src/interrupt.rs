//! Ctrl+C handling.
//!
//! SIGINT's default disposition ends the process without unwinding, so neither
//! `Session::close` nor `Drop for TempFileRegistry` would run. Headless commands
//! sweep their images from the handler thread and exit. The window forwards the
//! interrupt to its event loop, which then closes through the normal shutdown path.

use std::path::{Path, PathBuf};

use crate::panel::registry;

/// Exit status after an interrupt (128 + SIGINT).
pub const EXIT_CODE: i32 = 130;

/// Delete every image this process left in `image_dir`.
pub fn cleanup(image_dir: &Path) -> usize {
    let removed = registry::sweep(image_dir, std::process::id());
    log::info!("interrupted, removed {removed} temp file(s)");
    removed
}

/// Run `handler` on Ctrl+C. Only one handler can be installed per process.
pub fn on_interrupt<F>(handler: F) -> Result<(), ctrlc::Error>
where
    F: FnMut() + Send + 'static,
{
    ctrlc::set_handler(handler)
}

/// Clean up `image_dir` and exit with [`EXIT_CODE`] when Ctrl+C arrives.
pub fn exit_on_interrupt(image_dir: PathBuf) -> Result<(), ctrlc::Error> {
    on_interrupt(move || {
        cleanup(&image_dir);
        std::process::exit(EXIT_CODE);
    })
}

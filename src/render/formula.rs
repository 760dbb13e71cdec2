//! Formula renderer: one formula string in, one standalone PNG file out.
//!
//! Every call writes a new file. File names carry the process id, a nanosecond
//! timestamp and a process-wide sequence number, so repeated renders of the same
//! template never collide. Callers own the returned file and are responsible for deleting it
//! (see `panel::registry::TempFileRegistry`).

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use crate::typst::{
    self, CompileError,
    math::{MathRequest, Theme},
};

/// Print resolution used for formula images.
pub const DEFAULT_DPI: f32 = 300.0;

static RENDER_SEQ: AtomicU64 = AtomicU64::new(0);

/// A formula image on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub path: PathBuf,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("failed to typeset formula: {0}")]
    Typeset(#[from] CompileError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Anything that can turn a formula into an image file.
///
/// The panel and the export pipeline only depend on this trait.
pub trait RenderFormula {
    fn render(&self, formula: &str, size_pt: f32) -> Result<RenderedImage, RenderError>;
}

/// Renderer options.
#[derive(Debug, Clone)]
pub struct FormulaStyle {
    pub dpi: f32,
    pub theme: Theme,
    /// File name prefix; a unique suffix is always appended.
    pub stem: String,
}

impl Default for FormulaStyle {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            theme: Theme::DARK,
            stem: "formula".to_string(),
        }
    }
}

/// Typst-backed [`RenderFormula`] writing into `out_dir`.
#[derive(Debug, Clone)]
pub struct FormulaRenderer {
    out_dir: PathBuf,
    style: FormulaStyle,
}

impl FormulaRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            style: FormulaStyle::default(),
        }
    }

    pub fn with_style(mut self, style: FormulaStyle) -> Self {
        self.style = style;
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn style(&self) -> &FormulaStyle {
        &self.style
    }

    fn try_render(&self, formula: &str, size_pt: f32) -> Result<RenderedImage, RenderError> {
        let request = MathRequest::new(formula, size_pt).with_theme(self.style.theme);
        let png = typst::rasterize_formula(&request, self.style.dpi / 72.0)?;

        fs::create_dir_all(&self.out_dir).map_err(|source| RenderError::Io {
            path: self.out_dir.clone(),
            source,
        })?;

        let path = self.out_dir.join(unique_file_name(&self.style.stem));
        fs::write(&path, &png.data).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;

        log::debug!(
            "formula: wrote {} ({}x{})",
            path.display(),
            png.width,
            png.height
        );

        Ok(RenderedImage {
            path,
            width_px: png.width,
            height_px: png.height,
        })
    }
}

impl RenderFormula for FormulaRenderer {
    fn render(&self, formula: &str, size_pt: f32) -> Result<RenderedImage, RenderError> {
        self.try_render(formula, size_pt).inspect_err(|err| {
            log::warn!("formula: render failed for {formula:?}: {err}");
        })
    }
}

/// `<stem>_<pid>_<unix-nanos>_<seq>.png`
pub fn unique_file_name(stem: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = RENDER_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{stem}_{}_{nanos}_{seq}.png", std::process::id())
}

/// The process id embedded by [`unique_file_name`], if `name` is one of its names.
pub fn file_owner(name: &str) -> Option<u32> {
    let mut parts = name.strip_suffix(".png")?.rsplitn(4, '_');
    let seq = parts.next()?;
    let nanos = parts.next()?;
    let pid = parts.next()?;
    parts.next().filter(|stem| !stem.is_empty())?;

    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !(numeric(seq) && numeric(nanos)) {
        return None;
    }
    pid.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_names_differ_even_back_to_back() {
        let a = unique_file_name("f");
        let b = unique_file_name("f");
        assert_ne!(a, b);
        assert!(a.starts_with("f_") && a.ends_with(".png"));
    }

    #[test]
    fn names_record_the_owning_process() {
        let name = unique_file_name("formula");
        assert_eq!(file_owner(&name), Some(std::process::id()));
        assert_eq!(file_owner("my_export_12_3456_7.png"), Some(12));
        assert_eq!(file_owner("formula_1_2.png"), None);
        assert_eq!(file_owner("formula_x_2_3.png"), None);
        assert_eq!(file_owner("formula_1_2_3.jpg"), None);
        assert_eq!(file_owner("notes.png"), None);
    }

    #[test]
    fn renders_same_formula_to_two_files() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FormulaRenderer::new(dir.path());

        let a = renderer.render("frac(1, s^v)", 18.0).unwrap();
        let b = renderer.render("frac(1, s^v)", 18.0).unwrap();

        assert_ne!(a.path, b.path);
        assert!(a.path.exists() && b.path.exists());
        assert_eq!((a.width_px, a.height_px), (b.width_px, b.height_px));
    }

    #[test]
    fn larger_sizes_give_larger_images() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FormulaRenderer::new(dir.path());

        let small = renderer.render("x^2 + y^2", 12.0).unwrap();
        let large = renderer.render("x^2 + y^2", 24.0).unwrap();
        assert!(large.width_px > small.width_px);
    }

    #[test]
    fn malformed_formula_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FormulaRenderer::new(dir.path());

        let err = renderer.render("frac(1, ", 16.0).unwrap_err();
        assert!(matches!(err, RenderError::Typeset(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

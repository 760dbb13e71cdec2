//! PDF export: the input summary plus the derivation, flowed onto US-Letter pages.
//!
//! The export renders its own print-themed formula images into a registry local
//! to one call. The panel's images are never read or touched.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    derivation::{ContentBlock, InputSet, Weight},
    font::FontError,
    panel::registry::TempFileRegistry,
    render::formula::{FormulaRenderer, FormulaStyle, RenderError, RenderFormula},
    typst::{
        CompileError, engine,
        markup::{string_literal, text_lines},
        math::Theme,
    },
};

pub const REPORT_TITLE: &str = "Dr Syed Tauseef's Derivation Report";
/// Width formula images are placed at.
pub const IMAGE_WIDTH_IN: f32 = 6.5;

const PAGE_SETUP: &str = "#set page(paper: \"us-letter\", margin: 1in)\n\
                          #set text(size: 11pt)\n\
                          #set par(justify: false)\n";

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("could not render formula {index}: {source}")]
    Render {
        index: usize,
        #[source]
        source: RenderError,
    },

    #[error("{0} is not inside the export image directory")]
    ForeignImage(PathBuf),

    #[error(transparent)]
    Fonts(#[from] FontError),

    #[error("could not lay out the document: {0}")]
    Compile(CompileError),

    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<CompileError> for ExportError {
    fn from(err: CompileError) -> Self {
        match err {
            CompileError::Fonts(fonts) => ExportError::Fonts(fonts),
            other => ExportError::Compile(other),
        }
    }
}

/// What a successful export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub pages: usize,
    pub images: usize,
    pub bytes: usize,
}

/// Builds and writes the PDF report.
///
/// `image_dir` is both where formula images are written and the root the document
/// resolves `#image("/...")` paths against, so every image the renderer returns must
/// live directly inside it.
pub struct Exporter<R = FormulaRenderer> {
    renderer: R,
    image_dir: PathBuf,
}

impl Exporter<FormulaRenderer> {
    /// Exporter rendering black-on-white formulas into `image_dir`.
    pub fn new(image_dir: impl Into<PathBuf>) -> Self {
        let image_dir = image_dir.into();
        let renderer = FormulaRenderer::new(&image_dir).with_style(FormulaStyle {
            theme: Theme::LIGHT,
            stem: "export".to_string(),
            ..FormulaStyle::default()
        });
        Self {
            renderer,
            image_dir,
        }
    }

    /// Rasterise export formulas at `dpi` instead of the default.
    pub fn with_dpi(mut self, dpi: f32) -> Self {
        let style = FormulaStyle {
            dpi,
            ..self.renderer.style().clone()
        };
        self.renderer = self.renderer.with_style(style);
        self
    }
}

impl<R: RenderFormula> Exporter<R> {
    pub fn with_renderer(renderer: R, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            image_dir: image_dir.into(),
        }
    }

    /// Write the report for `inputs`/`blocks` to `destination`.
    ///
    /// Export-local images are deleted before returning, whatever the outcome.
    pub fn export(
        &self,
        inputs: &InputSet,
        blocks: &[ContentBlock],
        destination: &Path,
    ) -> Result<ExportReport, ExportError> {
        log::debug!("export: rendering formulas into {}", self.image_dir.display());
        let mut images = TempFileRegistry::new();
        let result = self.export_with(inputs, blocks, destination, &mut images);
        images.drain();

        match &result {
            Ok(report) => log::info!(
                "export: wrote {} ({} page(s), {} image(s), {} bytes)",
                report.path.display(),
                report.pages,
                report.images,
                report.bytes
            ),
            Err(err) => log::warn!("export to {} failed: {err}", destination.display()),
        }
        result
    }

    fn export_with(
        &self,
        inputs: &InputSet,
        blocks: &[ContentBlock],
        destination: &Path,
        images: &mut TempFileRegistry,
    ) -> Result<ExportReport, ExportError> {
        let mut body = String::new();

        for (index, block) in blocks.iter().enumerate() {
            match block {
                ContentBlock::Text(text) => {
                    if text.weight == Weight::Bold {
                        body.push_str("=== ");
                    }
                    body.push_str(&text_lines(&text.text));
                    body.push_str("\n#v(0.1in)\n\n");
                }
                ContentBlock::Formula(formula) => {
                    let image = self
                        .renderer
                        .render(&formula.source, formula.size)
                        .map_err(|source| ExportError::Render { index, source })?;
                    images.register(&image.path);

                    let name = self.virtual_path(&image.path)?;
                    body.push_str(&format!(
                        "#image({}, width: {IMAGE_WIDTH_IN}in)\n#v(0.1in)\n\n",
                        string_literal(&name)
                    ));
                }
            }
        }

        let source = document_source(inputs, &body);
        let document = engine::compile("/report.typ", &source, Some(self.image_dir.as_path()))?;
        let pdf = engine::export_pdf(&document)?;

        fs::write(destination, &pdf).map_err(|source| ExportError::Io {
            path: destination.to_path_buf(),
            source,
        })?;

        Ok(ExportReport {
            path: destination.to_path_buf(),
            pages: document.pages.len(),
            images: images.len(),
            bytes: pdf.len(),
        })
    }

    fn virtual_path(&self, image: &Path) -> Result<String, ExportError> {
        let relative = image
            .strip_prefix(&self.image_dir)
            .map_err(|_| ExportError::ForeignImage(image.to_path_buf()))?;
        let mut name = String::new();
        for part in relative.components() {
            name.push('/');
            name.push_str(&part.as_os_str().to_string_lossy());
        }
        Ok(name)
    }
}

/// Title, input summary and the "Derivation Steps" heading, followed by `body`.
fn document_source(inputs: &InputSet, body: &str) -> String {
    let mut out = String::from(PAGE_SETUP);
    out.push('\n');
    out.push_str(&format!("= #{}\n#v(0.25in)\n\n", string_literal(REPORT_TITLE)));

    out.push_str("== Input Values\n\n");
    for line in inputs.summary_lines() {
        out.push_str(&text_lines(&line));
        out.push_str("\n\n");
    }
    out.push_str("#v(0.25in)\n\n");

    out.push_str("== Derivation Steps\n\n");
    out.push_str(body);
    out
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{
        derivation::{self, FormulaBlock, Justify, Spacing, TextBlock},
        render::formula::RenderedImage,
    };

    fn text(text: &str, weight: Weight) -> ContentBlock {
        ContentBlock::Text(TextBlock {
            text: text.to_string(),
            size: 14.0,
            weight,
            justify: Justify::Left,
            spacing: Spacing::default(),
        })
    }

    fn formula(source: &str) -> ContentBlock {
        ContentBlock::Formula(FormulaBlock {
            source: source.to_string(),
            size: derivation::DEFAULT_FORMULA_SIZE,
        })
    }

    fn inputs() -> InputSet {
        InputSet::new("0.71", "", "", "2.5", "")
    }

    #[test]
    fn document_source_has_title_and_summary() {
        let src = document_source(&inputs(), "");
        assert!(src.contains("paper: \"us-letter\", margin: 1in"));
        assert!(src.contains("= #\"Dr Syed Tauseef's Derivation Report\""));
        assert!(src.contains("== Input Values"));
        assert!(src.contains("#\"Pr: 0.71\""));
        assert!(src.contains("#\"k1(β): 2.5\""));
        assert!(src.contains("#\"ko(β): \""));
        assert!(src.ends_with("== Derivation Steps\n\n"));
    }

    #[test]
    fn writes_a_pdf_for_the_full_derivation() {
        let images = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let destination = out.path().join("report.pdf");

        let blocks = derivation::build(&inputs());
        let report = Exporter::new(images.path())
            .export(&inputs(), &blocks, &destination)
            .unwrap();

        assert_eq!(report.images, 9);
        assert!(report.pages >= 1);
        let bytes = fs::read(&destination).unwrap();
        assert_eq!(bytes.len(), report.bytes);
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(fs::read_dir(images.path()).unwrap().count(), 0);
    }

    #[test]
    fn configured_dpi_reaches_the_export_renderer() {
        let images = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(images.path()).with_dpi(150.0);
        let style = exporter.renderer.style();
        assert_eq!(style.dpi, 150.0);
        assert_eq!(style.theme, Theme::LIGHT);
        assert_eq!(style.stem, "export");
    }

    #[test]
    fn markup_in_text_is_printed_verbatim() {
        let images = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let destination = out.path().join("odd.pdf");

        let odd = InputSet::new("$x", "#y", "*b*", "\"k\"", "\\");
        let blocks = [text("= not a heading\n_ok_", Weight::Normal), text("bold", Weight::Bold)];
        Exporter::new(images.path())
            .export(&odd, &blocks, &destination)
            .unwrap();
        assert!(destination.exists());
    }

    #[test]
    fn render_failure_aborts_and_cleans_up() {
        let images = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let destination = out.path().join("never.pdf");

        let blocks = [formula("x^2"), formula("frac(1, ")];
        let err = Exporter::new(images.path())
            .export(&inputs(), &blocks, &destination)
            .unwrap_err();

        assert!(matches!(err, ExportError::Render { index: 1, .. }));
        assert!(!destination.exists());
        assert_eq!(fs::read_dir(images.path()).unwrap().count(), 0);
    }

    #[test]
    fn write_failure_is_reported_and_images_removed() {
        let images = tempfile::tempdir().unwrap();
        let destination = images.path().join("missing-dir").join("out.pdf");

        let err = Exporter::new(images.path())
            .export(&inputs(), &[formula("x")], &destination)
            .unwrap_err();

        assert!(matches!(err, ExportError::Io { .. }));
        assert_eq!(fs::read_dir(images.path()).unwrap().count(), 0);
    }

    #[test]
    fn images_outside_the_root_are_rejected() {
        struct Elsewhere {
            dir: PathBuf,
            calls: Cell<u32>,
        }
        impl RenderFormula for Elsewhere {
            fn render(&self, _: &str, _: f32) -> Result<RenderedImage, RenderError> {
                self.calls.set(self.calls.get() + 1);
                let path = self.dir.join("elsewhere.png");
                image::RgbaImage::new(4, 4).save(&path).unwrap();
                Ok(RenderedImage {
                    path,
                    width_px: 4,
                    height_px: 4,
                })
            }
        }

        let root = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let exporter = Exporter::with_renderer(
            Elsewhere {
                dir: other.path().to_path_buf(),
                calls: Cell::new(0),
            },
            root.path(),
        );

        let err = exporter
            .export(&inputs(), &[formula("x")], &root.path().join("r.pdf"))
            .unwrap_err();
        assert!(matches!(err, ExportError::ForeignImage(_)));
        assert!(!other.path().join("elsewhere.png").exists());
    }
}

//! Display panel: turns a block sequence into displayable widgets.
//!
//! The panel is toolkit-neutral. It decides *what* is shown (labels with their style
//! hints, images with their display size); `render::canvas` decides how to paint it.

pub mod registry;

use std::path::PathBuf;

use crate::{
    derivation::{ContentBlock, Justify, Spacing, TextBlock, Weight},
    render::formula::RenderFormula,
};

use self::registry::TempFileRegistry;

/// Window width the layout is designed for, in pixels.
pub const DEFAULT_WINDOW_WIDTH: u32 = 800;
/// Horizontal space taken by frame padding, image padding and the scrollbar.
pub const DEFAULT_DISPLAY_MARGIN: u32 = 100;

pub const PLACEHOLDER: &str = "Your derivation steps will appear here...";

/// Vertical padding around formula images, in pixels.
pub const IMAGE_SPACING: Spacing = Spacing::new(10, 10);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelStyle {
    pub size: f32,
    pub weight: Weight,
    pub justify: Justify,
    pub spacing: Spacing,
    pub italic: bool,
}

impl From<&TextBlock> for LabelStyle {
    fn from(block: &TextBlock) -> Self {
        Self {
            size: block.size,
            weight: block.weight,
            justify: block.justify,
            spacing: block.spacing,
            italic: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Label {
        text: String,
        style: LabelStyle,
    },
    Image {
        path: PathBuf,
        /// Pixel size of the file on disk.
        source: (u32, u32),
        /// Size to draw at, never wider than the display budget.
        display: (u32, u32),
    },
}

/// Outcome of one [`Panel::present`] call.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PresentReport {
    pub shown: usize,
    pub skipped: usize,
}

/// Scale `(width, height)` down to at most `budget` pixels wide, keeping the aspect
/// ratio. Images that already fit are returned untouched.
pub fn fit_width(width: u32, height: u32, budget: u32) -> (u32, u32) {
    if width <= budget || width == 0 {
        return (width, height);
    }
    let scaled = u64::from(height) * u64::from(budget) / u64::from(width);
    (budget, scaled.max(1) as u32)
}

#[derive(Debug)]
pub struct Panel {
    widgets: Vec<Widget>,
    budget: u32,
    export_available: bool,
}

impl Default for Panel {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_WIDTH.saturating_sub(DEFAULT_DISPLAY_MARGIN))
    }
}

impl Panel {
    /// An empty panel showing the placeholder line.
    pub fn new(budget: u32) -> Self {
        Self {
            widgets: vec![placeholder()],
            budget,
            export_available: false,
        }
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn export_available(&self) -> bool {
        self.export_available
    }

    /// Replace the panel contents with `blocks`.
    ///
    /// Images from the previous presentation are deleted first. Formulas that fail
    /// to render (or whose image cannot be read back) are skipped.
    pub fn present(
        &mut self,
        blocks: &[ContentBlock],
        renderer: &dyn RenderFormula,
        registry: &mut TempFileRegistry,
    ) -> PresentReport {
        self.widgets.clear();
        registry.drain();

        let mut report = PresentReport::default();
        for block in blocks {
            match block {
                ContentBlock::Text(text) => {
                    self.widgets.push(Widget::Label {
                        text: text.text.clone(),
                        style: LabelStyle::from(text),
                    });
                    report.shown += 1;
                }
                ContentBlock::Formula(formula) => {
                    let Ok(image) = renderer.render(&formula.source, formula.size) else {
                        report.skipped += 1;
                        continue;
                    };
                    registry.register(&image.path);

                    let source = match image::image_dimensions(&image.path) {
                        Ok(dims) => dims,
                        Err(err) => {
                            log::warn!("panel: cannot read {}: {err}", image.path.display());
                            report.skipped += 1;
                            continue;
                        }
                    };

                    self.widgets.push(Widget::Image {
                        path: image.path,
                        source,
                        display: fit_width(source.0, source.1, self.budget),
                    });
                    report.shown += 1;
                }
            }
        }

        self.export_available = true;
        log::info!(
            "panel: presented {} block(s), skipped {}",
            report.shown,
            report.skipped
        );
        report
    }
}

fn placeholder() -> Widget {
    Widget::Label {
        text: PLACEHOLDER.to_string(),
        style: LabelStyle {
            size: 14.0,
            weight: Weight::Normal,
            justify: Justify::Left,
            spacing: Spacing::new(10, 10),
            italic: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, fs, path::Path};

    use super::*;
    use crate::{
        derivation::{self, FormulaBlock, InputSet},
        render::formula::{RenderError, RenderedImage},
        typst::CompileError,
    };

    /// Writes a real PNG of a fixed size; fails on formulas containing "bad".
    struct FakeRenderer {
        dir: PathBuf,
        size: (u32, u32),
        calls: Cell<usize>,
    }

    impl FakeRenderer {
        fn new(dir: &Path, size: (u32, u32)) -> Self {
            Self {
                dir: dir.to_path_buf(),
                size,
                calls: Cell::new(0),
            }
        }
    }

    impl RenderFormula for FakeRenderer {
        fn render(&self, formula: &str, _size_pt: f32) -> Result<RenderedImage, RenderError> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if formula.contains("bad") {
                return Err(RenderError::Typeset(CompileError::NoPages));
            }
            let path = self.dir.join(format!("fake_{n}.png"));
            image::RgbaImage::new(self.size.0, self.size.1)
                .save(&path)
                .unwrap();
            Ok(RenderedImage {
                path,
                width_px: self.size.0,
                height_px: self.size.1,
            })
        }
    }

    fn formula(source: &str) -> ContentBlock {
        ContentBlock::Formula(FormulaBlock {
            source: source.to_string(),
            size: derivation::DEFAULT_FORMULA_SIZE,
        })
    }

    #[test]
    fn fit_width_scales_only_wide_images() {
        assert_eq!(fit_width(1400, 200, 700), (700, 100));
        assert_eq!(fit_width(700, 90, 700), (700, 90));
        assert_eq!(fit_width(300, 40, 700), (300, 40));
        assert_eq!(fit_width(7000, 5, 700), (700, 1));
    }

    #[test]
    fn new_panel_shows_placeholder_without_export() {
        let panel = Panel::default();
        assert_eq!(panel.budget(), 700);
        assert!(!panel.export_available());
        assert!(matches!(
            &panel.widgets()[0],
            Widget::Label { text, .. } if text == PLACEHOLDER
        ));
    }

    #[test]
    fn presents_every_block_and_registers_images() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FakeRenderer::new(dir.path(), (1400, 60));
        let mut registry = TempFileRegistry::new();
        let mut panel = Panel::default();

        let blocks = derivation::build(&InputSet::new("0.71", "y", "β", "2.5", "k_o(β)"));
        let report = panel.present(&blocks, &renderer, &mut registry);

        assert_eq!(report, PresentReport { shown: 23, skipped: 0 });
        assert_eq!(panel.widgets().len(), 23);
        assert_eq!(registry.len(), 9);
        assert!(panel.export_available());
        for widget in panel.widgets() {
            if let Widget::Image { source, display, .. } = widget {
                assert_eq!(*source, (1400, 60));
                assert_eq!(*display, (700, 30));
            }
        }
    }

    #[test]
    fn failed_formulas_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FakeRenderer::new(dir.path(), (10, 10));
        let mut registry = TempFileRegistry::new();
        let mut panel = Panel::default();

        let report = panel.present(
            &[formula("x"), formula("bad"), formula("y")],
            &renderer,
            &mut registry,
        );

        assert_eq!(report, PresentReport { shown: 2, skipped: 1 });
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn re_presenting_deletes_previous_images() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FakeRenderer::new(dir.path(), (10, 10));
        let mut registry = TempFileRegistry::new();
        let mut panel = Panel::default();

        panel.present(&[formula("a"), formula("b")], &renderer, &mut registry);
        let first: Vec<PathBuf> = registry.paths().to_vec();

        panel.present(&[formula("c")], &renderer, &mut registry);

        assert!(first.iter().all(|p| !p.exists()));
        assert_eq!(registry.len(), 1);
        assert!(registry.paths()[0].exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn unreadable_image_is_skipped_but_still_cleaned_up() {
        struct Garbage(PathBuf);
        impl RenderFormula for Garbage {
            fn render(&self, _: &str, _: f32) -> Result<RenderedImage, RenderError> {
                let path = self.0.join("garbage.png");
                fs::write(&path, b"not a png").unwrap();
                Ok(RenderedImage {
                    path,
                    width_px: 1,
                    height_px: 1,
                })
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let mut registry = TempFileRegistry::new();
        let mut panel = Panel::default();

        let report = panel.present(
            &[formula("x")],
            &Garbage(dir.path().to_path_buf()),
            &mut registry,
        );
        assert_eq!(report.skipped, 1);

        registry.drain();
        assert!(!dir.path().join("garbage.png").exists());
    }
}

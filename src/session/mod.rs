//! The application object: form, results panel, last run, and status notice.
//!
//! `Session` is what the window (or the CLI) drives. Every user action maps to one
//! method here, and all of them run synchronously on the caller's thread.

pub mod form;
pub mod notice;

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use crate::{
    derivation::{self, ContentBlock, InputSet},
    export::{ExportReport, Exporter},
    panel::{
        DEFAULT_DISPLAY_MARGIN, DEFAULT_WINDOW_WIDTH, Panel, PresentReport,
        registry::TempFileRegistry,
    },
    render::formula::{DEFAULT_DPI, FormulaRenderer, FormulaStyle},
};

use self::{
    form::InputForm,
    notice::{Notice, NoticeKind, SUCCESS_TTL},
};

/// Asks the user where to save. `None` means cancelled.
pub trait FilePicker {
    fn pick_save_path(&mut self, default_extension: &str) -> Option<PathBuf>;
}

/// A picker that always answers with a path chosen up front (or always cancels).
#[derive(Debug, Clone, Default)]
pub struct PresetPicker {
    path: Option<PathBuf>,
}

impl PresetPicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn cancelled() -> Self {
        Self { path: None }
    }
}

impl FilePicker for PresetPicker {
    fn pick_save_path(&mut self, default_extension: &str) -> Option<PathBuf> {
        self.path
            .clone()
            .map(|path| with_default_extension(path, default_extension))
    }
}

/// Append `extension` when `path` has none.
pub fn with_default_extension(mut path: PathBuf, extension: &str) -> PathBuf {
    if path.extension().is_none() {
        path.set_extension(extension);
    }
    path
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Where formula images are written while they are on screen or being exported.
    pub image_dir: PathBuf,
    pub window_width: u32,
    /// Horizontal space not available to images.
    pub display_margin: u32,
    pub formula_dpi: f32,
    pub notice_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            image_dir: std::env::temp_dir().join("laplace-helper"),
            window_width: DEFAULT_WINDOW_WIDTH,
            display_margin: DEFAULT_DISPLAY_MARGIN,
            formula_dpi: DEFAULT_DPI,
            notice_ttl: SUCCESS_TTL,
        }
    }
}

impl SessionConfig {
    pub fn display_budget(&self) -> u32 {
        self.window_width.saturating_sub(self.display_margin)
    }
}

/// Result of [`Session::export`].
#[derive(Debug)]
pub enum ExportOutcome {
    /// Nothing has been derived yet.
    Unavailable,
    Cancelled,
    Saved(ExportReport),
    Failed(String),
}

/// Inputs and blocks of the most recent run; exports always use these.
#[derive(Debug, Clone)]
pub struct LastRun {
    pub inputs: InputSet,
    pub blocks: Vec<ContentBlock>,
}

pub struct Session {
    config: SessionConfig,
    form: InputForm,
    renderer: FormulaRenderer,
    exporter: Exporter,
    panel: Panel,
    registry: TempFileRegistry,
    last: Option<LastRun>,
    notice: Option<Notice>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let renderer = FormulaRenderer::new(&config.image_dir).with_style(FormulaStyle {
            dpi: config.formula_dpi,
            ..FormulaStyle::default()
        });
        let exporter = Exporter::new(&config.image_dir).with_dpi(config.formula_dpi);
        let panel = Panel::new(config.display_budget());

        Self {
            config,
            form: InputForm::default(),
            renderer,
            exporter,
            panel,
            registry: TempFileRegistry::new(),
            last: None,
            notice: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn form(&self) -> &InputForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut InputForm {
        &mut self.form
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn registry(&self) -> &TempFileRegistry {
        &self.registry
    }

    pub fn last_run(&self) -> Option<&LastRun> {
        self.last.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Whether the "Download PDF" action is offered right now.
    ///
    /// Hidden until the first run, and while a success notice occupies its place.
    pub fn export_visible(&self) -> bool {
        self.panel.export_available()
            && !matches!(&self.notice, Some(n) if n.kind == NoticeKind::Success)
    }

    /// Execute the derivation with the current form values.
    pub fn run(&mut self) -> PresentReport {
        let inputs = self.form.snapshot();
        log::info!("running derivation with {inputs:?}");

        let blocks = derivation::build(&inputs);
        let report = self
            .panel
            .present(&blocks, &self.renderer, &mut self.registry);

        self.notice = None;
        self.last = Some(LastRun { inputs, blocks });
        report
    }

    /// Export the last run to a PDF chosen through `picker`.
    pub fn export(&mut self, picker: &mut dyn FilePicker, now: Instant) -> ExportOutcome {
        let Some(last) = &self.last else {
            return ExportOutcome::Unavailable;
        };
        let Some(destination) = picker.pick_save_path("pdf") else {
            log::debug!("export cancelled");
            return ExportOutcome::Cancelled;
        };

        match self
            .exporter
            .export(&last.inputs, &last.blocks, &destination)
        {
            Ok(report) => {
                self.notice = Some(Notice::success(
                    format!("✔ Successfully saved to:\n{}", report.path.display()),
                    now,
                    self.config.notice_ttl,
                ));
                ExportOutcome::Saved(report)
            }
            Err(err) => {
                let message = format!("Error creating PDF: {err}");
                self.notice = Some(Notice::error(message.clone(), now));
                ExportOutcome::Failed(message)
            }
        }
    }

    /// Dismiss an expired notice. Returns whether anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
            return true;
        }
        false
    }

    /// When the next [`tick`](Self::tick) has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.notice.as_ref().and_then(Notice::expires_at)
    }

    /// Delete every on-screen image. Safe to call more than once.
    pub fn close(&mut self) {
        let removed = self.registry.drain();
        log::info!("session closed, removed {removed} temp file(s)");
    }
}

//! Command-line interface.
//!
//! Three subcommands:
//! - `window` opens the desktop form (the default when no subcommand is given)
//! - `derive` runs the derivation headless and lists the blocks and images
//! - `export` runs the derivation headless and writes the PDF report
//!
//! Every subcommand takes the same field flags. Passing a value switches that
//! field to "Enter Value"; `--keep <FIELD>` forces it back to "Keep Constant".

use std::{path::PathBuf, time::Instant};

use anyhow::{Context as _, bail};
use clap::{Args, Parser, Subcommand};

use crate::{
    derivation::ContentBlock,
    font::FontSet,
    interrupt,
    panel::Widget,
    render::{app::AppConfig, dialog::DialogPicker, window},
    session::{
        ExportOutcome, FilePicker, PresetPicker, Session, SessionConfig,
        form::{FieldId, InputForm},
    },
};

#[derive(Parser, Debug)]
#[command(
    name = "laplace-helper",
    version,
    about = "Typesets the Eq. (28) → Eq. (30) inverse Laplace derivation and exports it to PDF"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the desktop window
    Window(WindowArgs),

    /// Run the derivation and print the resulting blocks
    Derive(DeriveArgs),

    /// Run the derivation and write the PDF report
    Export(ExportArgs),
}

/// Initial field values.
#[derive(Args, Debug, Clone, Default)]
pub struct FieldArgs {
    /// Prandtl number
    #[arg(long)]
    pub pr: Option<String>,

    /// Position y
    #[arg(long)]
    pub y: Option<String>,

    /// Fractional order β
    #[arg(long)]
    pub beta: Option<String>,

    /// k1(β)
    #[arg(long)]
    pub k1: Option<String>,

    /// ko(β)
    #[arg(long)]
    pub k0: Option<String>,

    /// Keep a field at its constant symbol (pr, y, beta, k1, k0); repeatable
    #[arg(long, value_parser = parse_field)]
    pub keep: Vec<FieldId>,
}

impl FieldArgs {
    /// Apply the flags on top of the default form.
    pub fn apply(&self, form: &mut InputForm) {
        let values = [
            (FieldId::Pr, &self.pr),
            (FieldId::Y, &self.y),
            (FieldId::Beta, &self.beta),
            (FieldId::K1, &self.k1),
            (FieldId::K0, &self.k0),
        ];
        for (id, value) in values {
            if let Some(value) = value {
                let field = form.field_mut(id);
                field.set_editable(true);
                field.set_value(value.as_str());
            }
        }
        for id in &self.keep {
            form.field_mut(*id).set_editable(false);
        }
    }
}

/// Where and how formula images are produced.
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Directory for temporary formula images
    #[arg(long)]
    pub image_dir: Option<PathBuf>,

    /// Formula raster resolution
    #[arg(long, default_value_t = crate::render::formula::DEFAULT_DPI)]
    pub dpi: f32,
}

impl RenderArgs {
    fn session_config(&self) -> SessionConfig {
        let defaults = SessionConfig::default();
        SessionConfig {
            image_dir: self.image_dir.clone().unwrap_or(defaults.image_dir.clone()),
            formula_dpi: self.dpi,
            ..defaults
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct WindowArgs {
    #[command(flatten)]
    pub fields: FieldArgs,

    #[command(flatten)]
    pub render: RenderArgs,

    /// Save "Download PDF" here instead of asking with a dialog
    #[arg(long)]
    pub pdf: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DeriveArgs {
    #[command(flatten)]
    pub fields: FieldArgs,

    #[command(flatten)]
    pub render: RenderArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub fields: FieldArgs,

    #[command(flatten)]
    pub render: RenderArgs,

    /// Destination PDF (".pdf" is appended when there is no extension)
    #[arg(long, short)]
    pub output: PathBuf,
}

fn parse_field(value: &str) -> Result<FieldId, String> {
    FieldId::from_key(value).ok_or_else(|| {
        format!("unknown field `{value}` (expected one of: pr, y, beta, k1, k0)")
    })
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        // Nothing can be typeset without fonts; fail before opening anything.
        let fonts = FontSet::shared().context("initialising the typesetting backend")?;
        log::info!("typesetting backend ready ({} font faces)", fonts.len());

        match self.command {
            None => run_window(WindowArgs {
                fields: FieldArgs::default(),
                render: RenderArgs {
                    image_dir: None,
                    dpi: crate::render::formula::DEFAULT_DPI,
                },
                pdf: None,
            }),
            Some(Command::Window(args)) => run_window(args),
            Some(Command::Derive(args)) => run_derive(args),
            Some(Command::Export(args)) => run_export(args),
        }
    }
}

fn session_for(fields: &FieldArgs, render: &RenderArgs) -> Session {
    let mut session = Session::new(render.session_config());
    fields.apply(session.form_mut());
    session
}

/// Headless runs hold their session on this thread; Ctrl+C sweeps the image
/// directory instead.
fn clean_up_on_interrupt(session: &Session) {
    if let Err(err) = interrupt::exit_on_interrupt(session.config().image_dir.clone()) {
        log::warn!("Ctrl+C will not clean up temp files: {err}");
    }
}

fn run_window(args: WindowArgs) -> anyhow::Result<()> {
    let session = session_for(&args.fields, &args.render);
    window::run(AppConfig::default(), session, window_picker(args.pdf))
}

fn window_picker(preset: Option<PathBuf>) -> Box<dyn FilePicker> {
    match preset {
        Some(path) => Box::new(PresetPicker::new(Some(path))),
        None => Box::new(DialogPicker::new()),
    }
}

fn run_derive(args: DeriveArgs) -> anyhow::Result<()> {
    let mut session = session_for(&args.fields, &args.render);
    clean_up_on_interrupt(&session);
    let report = session.run();

    if let Some(last) = session.last_run() {
        for line in last.inputs.summary_lines() {
            println!("{line}");
        }
        println!();
        for (idx, block) in last.blocks.iter().enumerate() {
            match block {
                ContentBlock::Text(text) => println!("{:>2} text     {}", idx + 1, text.text.replace('\n', " / ")),
                ContentBlock::Formula(formula) => println!("{:>2} formula  {}", idx + 1, formula.source),
            }
        }
    }

    println!();
    for widget in session.panel().widgets() {
        if let Widget::Image { path, display, .. } = widget {
            println!("image {} ({}x{})", path.display(), display.0, display.1);
        }
    }
    println!("{} shown, {} skipped", report.shown, report.skipped);

    session.close();
    Ok(())
}

fn run_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut session = session_for(&args.fields, &args.render);
    clean_up_on_interrupt(&session);
    session.run();

    let mut picker = PresetPicker::new(Some(args.output));
    let outcome = session.export(&mut picker, Instant::now());
    session.close();

    match outcome {
        ExportOutcome::Saved(report) => {
            println!(
                "wrote {} ({} page(s), {} bytes)",
                report.path.display(),
                report.pages,
                report.bytes
            );
            Ok(())
        }
        ExportOutcome::Failed(message) => bail!(message),
        ExportOutcome::Unavailable | ExportOutcome::Cancelled => {
            bail!("export did not run")
        }
    }
}

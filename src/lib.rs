//! `laplace_helper` library crate root.
//!
//! The binary stays thin: it installs logging, parses the command line and calls
//! [`cli::Cli::run`]. Everything else lives here so it can be tested headless.
//!
//! Pipeline, leaf first:
//! - `derivation`: inputs → ordered content blocks (pure)
//! - `render::formula`: formula markup → PNG file
//! - `panel`: blocks → widgets, plus the temp-file janitor
//! - `export`: blocks → PDF report
//! - `session`: the application object the window and CLI drive
//!
//! Note: the library never initialises logging; callers decide their own setup.

pub mod cli;
pub mod derivation;
pub mod export;
pub mod font;
pub mod interrupt;
pub mod panel;
pub mod render;
pub mod session;
pub mod typst;

pub use derivation::{ContentBlock, InputSet, build};
pub use export::{ExportError, ExportReport, Exporter};
pub use session::{ExportOutcome, FilePicker, PresetPicker, Session, SessionConfig};

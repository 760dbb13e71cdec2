//! Typst engine integration.
//!
//! This module is responsible for:
//! - creating a minimal Typst `World` (in-memory source + shared fonts + optional asset root)
//! - compiling it into a `PagedDocument`
//! - turning compiled documents into the two artifacts the app needs: PNG rasters and PDF bytes
//!
//! Callers build Typst source text (see `typst::math` and `typst::markup`) and hand it in here.

pub mod world;

use std::path::Path;

use ecow::EcoVec;
use typst::{diag::SourceDiagnostic, layout::PagedDocument};

use crate::font::FontError;

use self::world::{InMemoryDoc, TypstWorld};

/// Errors raised while compiling or exporting a Typst document.
#[derive(thiserror::Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Fonts(#[from] FontError),

    #[error("typst compile failed with {count} error(s): {summary}")]
    Diagnostics { count: usize, summary: String },

    #[error("typst produced a document without pages")]
    NoPages,

    #[error("failed to encode page as PNG: {0}")]
    Encode(String),
}

impl CompileError {
    fn from_diagnostics(diags: &EcoVec<SourceDiagnostic>) -> Self {
        let summary = diags
            .iter()
            .map(|d| d.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        CompileError::Diagnostics {
            count: diags.len(),
            summary,
        }
    }
}

/// A rasterised page, PNG-encoded.
#[derive(Debug, Clone)]
pub struct PngPage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Compile a complete Typst source.
///
/// - `main_path` only shows up in diagnostics.
/// - `asset_root`, when set, lets the source reference files with absolute virtual paths.
pub fn compile(
    main_path: &str,
    source: &str,
    asset_root: Option<&Path>,
) -> Result<PagedDocument, CompileError> {
    let mut world = TypstWorld::new(InMemoryDoc::new(main_path, source))?;
    if let Some(root) = asset_root {
        world = world.with_asset_root(root);
    }

    let warned = typst::compile::<PagedDocument>(&world);
    for warning in &warned.warnings {
        log::debug!("typst warning in {main_path}: {}", warning.message);
    }

    let document = warned
        .output
        .map_err(|errs| CompileError::from_diagnostics(&errs))?;

    if document.pages.is_empty() {
        return Err(CompileError::NoPages);
    }
    Ok(document)
}

/// Rasterise the first page of `document` at `pixel_per_pt` and encode it as PNG.
pub fn rasterize_first_page(
    document: &PagedDocument,
    pixel_per_pt: f32,
) -> Result<PngPage, CompileError> {
    let page = document.pages.first().ok_or(CompileError::NoPages)?;
    let pixmap = typst_render::render(page, pixel_per_pt);

    let data = pixmap
        .encode_png()
        .map_err(|err| CompileError::Encode(err.to_string()))?;

    Ok(PngPage {
        width: pixmap.width(),
        height: pixmap.height(),
        data,
    })
}

/// Export every page of `document` into a single PDF.
pub fn export_pdf(document: &PagedDocument) -> Result<Vec<u8>, CompileError> {
    typst_pdf::pdf(document, &typst_pdf::PdfOptions::default())
        .map_err(|errs| CompileError::from_diagnostics(&errs))
}

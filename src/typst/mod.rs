//! Typst integration layer.
//!
//! Typst is the typesetting backend for everything the app draws:
//! - standalone formulas (rasterised to PNG files by `render::formula`)
//! - window labels (rasterised in memory by `render::canvas`)
//! - the exported report (compiled to PDF by `export`)
//!
//! `engine` owns compilation; `math` and `markup` build the sources fed into it.

pub mod engine;
pub mod markup;
pub mod math;

pub use engine::{CompileError, PngPage};

/// Compile a standalone formula request and rasterise it.
pub fn rasterize_formula(
    request: &math::MathRequest,
    pixel_per_pt: f32,
) -> Result<PngPage, CompileError> {
    let document = engine::compile("/formula.typ", &request.to_source(), None)?;
    engine::rasterize_first_page(&document, pixel_per_pt)
}

/// Compile a label request and rasterise it.
pub fn rasterize_label(
    request: &math::LabelRequest,
    pixel_per_pt: f32,
) -> Result<PngPage, CompileError> {
    let document = engine::compile("/label.typ", &request.to_source(), None)?;
    engine::rasterize_first_page(&document, pixel_per_pt)
}

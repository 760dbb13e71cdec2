//! The derivation narrative: inputs, content blocks, and the builder that ties them.
//!
//! Nothing here touches Typst or the filesystem. `build` is a pure function of the
//! five input strings; rendering and export consume its output.

pub mod content;
pub mod format;
pub mod template;

pub use content::{BLOCK_COUNT, build};
pub use format::format_token;
pub use template::{Slot, Template, TemplateError};

/// The five user-supplied values, as entered. No numeric validation is done.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSet {
    pub pr: String,
    pub y: String,
    pub beta: String,
    pub k1: String,
    pub k0: String,
}

impl InputSet {
    pub fn new(
        pr: impl Into<String>,
        y: impl Into<String>,
        beta: impl Into<String>,
        k1: impl Into<String>,
        k0: impl Into<String>,
    ) -> Self {
        Self {
            pr: pr.into(),
            y: y.into(),
            beta: beta.into(),
            k1: k1.into(),
            k0: k0.into(),
        }
    }

    /// Labeled summary lines, in field order (`"Pr: 0.71"`, ...).
    pub fn summary_lines(&self) -> [String; 5] {
        [
            format!("Pr: {}", self.pr),
            format!("y: {}", self.y),
            format!("β: {}", self.beta),
            format!("k1(β): {}", self.k1),
            format!("ko(β): {}", self.k0),
        ]
    }
}

/// Font weight hint for a text block.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Weight {
    #[default]
    Normal,
    Bold,
}

/// Horizontal justification hint for a text block.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Left,
    Center,
}

/// Vertical padding around a block, in pixels: `(top, bottom)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Spacing {
    pub top: u32,
    pub bottom: u32,
}

impl Spacing {
    pub const fn new(top: u32, bottom: u32) -> Self {
        Self { top, bottom }
    }
}

impl Default for Spacing {
    fn default() -> Self {
        Self::new(0, 10)
    }
}

pub const DEFAULT_TEXT_SIZE: f32 = 14.0;
pub const DEFAULT_FORMULA_SIZE: f32 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub size: f32,
    pub weight: Weight,
    pub justify: Justify,
    pub spacing: Spacing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormulaBlock {
    /// Typst math markup with all slots substituted.
    pub source: String,
    pub size: f32,
}

/// One unit of displayed/exported content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text(TextBlock),
    Formula(FormulaBlock),
}

/// Discriminant of a [`ContentBlock`], for structural comparisons.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Text,
    Formula,
}

impl ContentBlock {
    pub fn kind(&self) -> BlockKind {
        match self {
            ContentBlock::Text(_) => BlockKind::Text,
            ContentBlock::Formula(_) => BlockKind::Formula,
        }
    }

    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            ContentBlock::Text(text) => Some(text),
            ContentBlock::Formula(_) => None,
        }
    }

    pub fn as_formula(&self) -> Option<&FormulaBlock> {
        match self {
            ContentBlock::Formula(formula) => Some(formula),
            ContentBlock::Text(_) => None,
        }
    }
}

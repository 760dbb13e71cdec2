//! Typst sources for standalone snippets: one formula, or one label.
//!
//! Both are laid out on an auto-sized page so the compiled page *is* the bounding
//! box of the content plus a fixed padding. Rasterising that page yields an image
//! already cropped to its content.

use crate::typst::markup::{self, Color};

/// Padding around a standalone formula, in inches.
pub const FORMULA_PADDING_IN: f32 = 0.1;

/// Ink and background used when typesetting a snippet.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Theme {
    pub ink: Color,
    pub background: Color,
}

impl Theme {
    /// Light text on the panel background.
    pub const DARK: Self = Self {
        ink: Color::WHITE,
        background: Color::PANEL,
    };

    /// Black on white, for print.
    pub const LIGHT: Self = Self {
        ink: Color::BLACK,
        background: Color::WHITE,
    };
}

/// A request to typeset a single math formula.
#[derive(Debug, Clone)]
pub struct MathRequest {
    /// Typst math markup, without the surrounding `$`.
    pub formula: String,
    /// Font size in pt.
    pub size_pt: f32,
    pub theme: Theme,
}

impl MathRequest {
    pub fn new(formula: impl Into<String>, size_pt: f32) -> Self {
        Self {
            formula: formula.into(),
            size_pt,
            theme: Theme::DARK,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Full Typst source for this request.
    pub fn to_source(&self) -> String {
        format!(
            "#set page(width: auto, height: auto, margin: {pad}in, fill: {bg})\n\
             #set text(size: {size}pt, fill: {ink})\n\
             $ {formula} $\n",
            pad = FORMULA_PADDING_IN,
            bg = self.theme.background.to_typst(),
            size = self.size_pt,
            ink = self.theme.ink.to_typst(),
            formula = self.formula,
        )
    }
}

/// Horizontal placement of a label inside its box.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
}

impl Align {
    fn to_typst(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
        }
    }
}

/// A request to typeset a plain-text label at a fixed width.
#[derive(Debug, Clone)]
pub struct LabelRequest {
    pub text: String,
    pub size_pt: f32,
    pub bold: bool,
    pub italic: bool,
    pub align: Align,
    pub ink: Color,
    /// Box width in pt; long lines wrap inside it.
    pub width_pt: f32,
}

impl LabelRequest {
    pub fn new(text: impl Into<String>, size_pt: f32, width_pt: f32) -> Self {
        Self {
            text: text.into(),
            size_pt,
            bold: false,
            italic: false,
            align: Align::Left,
            ink: Color::WHITE,
            width_pt,
        }
    }

    pub fn to_source(&self) -> String {
        format!(
            "#set page(width: {width}pt, height: auto, margin: 0pt, fill: none)\n\
             #set text(size: {size}pt, weight: \"{weight}\", style: \"{style}\", fill: {ink})\n\
             #align({align})[{body}]\n",
            width = self.width_pt.max(1.0),
            size = self.size_pt,
            weight = if self.bold { "bold" } else { "regular" },
            style = if self.italic { "italic" } else { "normal" },
            ink = self.ink.to_typst(),
            align = self.align.to_typst(),
            body = markup::text_lines(&self.text),
        )
    }
}

//! Helpers for emitting Typst markup from arbitrary text.
//!
//! Content text (labels, notes, user-entered values) is never spliced into markup
//! as-is: it is embedded as a Typst string literal, which renders verbatim no
//! matter which markup characters it contains.

use std::fmt::Write as _;

/// Quote `text` as a Typst string literal (`"..."`), escaping as needed.
pub fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Markup for `text` with embedded newlines turned into explicit line breaks.
///
/// The result is a sequence of `#"..."` string embeds separated by `#linebreak()`.
pub fn text_lines(text: &str) -> String {
    let mut out = String::new();
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push_str("#linebreak()");
        }
        if !line.is_empty() {
            out.push('#');
            out.push_str(&string_literal(line));
        }
    }
    out
}

/// An sRGB color usable in Typst source as `rgb("#rrggbb")`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Self = Self::rgb(0x00, 0x00, 0x00);
    /// Background of the results panel.
    pub const PANEL: Self = Self::rgb(0x2b, 0x2b, 0x2b);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Typst expression for this color.
    pub fn to_typst(self) -> String {
        let mut out = String::with_capacity(16);
        let _ = write!(out, "rgb(\"#{:02x}{:02x}{:02x}\")", self.r, self.g, self.b);
        out
    }
}

//! Input token → Typst math markup.

/// Symbols the form offers as "constant" values, with their math markup.
const KNOWN_SYMBOLS: &[(&str, &str)] = &[
    ("β", "beta"),
    ("k_1(β)", "k_1(beta)"),
    ("k_o(β)", "k_o(beta)"),
];

/// Convert a raw input token into math markup ready for substitution.
///
/// - numbers pass through unchanged
/// - the known constant symbols map to their markup
/// - other multi-letter alphabetic tokens become upright identifiers (`Pr` → `upright("Pr")`)
/// - anything else (single letters, empty input, expressions) passes through unchanged
pub fn format_token(token: &str) -> String {
    if token.trim().parse::<f64>().is_ok() {
        return token.to_string();
    }

    if let Some((_, markup)) = KNOWN_SYMBOLS.iter().find(|(symbol, _)| *symbol == token) {
        return (*markup).to_string();
    }

    if token.chars().count() > 1 && token.chars().all(char::is_alphabetic) {
        return format!("upright(\"{token}\")");
    }

    token.to_string()
}

/// Break up identifier runs that mix letters and digits.
///
/// Typst math reads `k1` or `Pr2` as a single (unknown) variable name. Each such run
/// is split at letter/digit boundaries: single letters stay italic, longer letter
/// groups become upright text, and digits stay as numbers (`Pr2` →
/// `upright("Pr") 2`). Purely alphabetic runs (`beta`, `sqrt`) and string literals
/// are left alone.
pub fn math_safe(markup: &str) -> String {
    let chars: Vec<char> = markup.chars().collect();
    let mut out = String::with_capacity(markup.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' {
            let end = closing_quote(&chars, i + 1);
            out.extend(&chars[i..end]);
            i = end;
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            out.extend(&chars[start..i]);
        } else if c.is_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_alphanumeric() {
                i += 1;
            }
            push_identifier(&mut out, &chars[start..i]);
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

/// Index just past the `"` closing a literal that starts at `from`.
fn closing_quote(chars: &[char], from: usize) -> usize {
    let mut i = from;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '"' => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

fn push_identifier(out: &mut String, run: &[char]) {
    if !run.iter().any(char::is_ascii_digit) {
        out.extend(run);
        return;
    }

    let groups = run.chunk_by(|a, b| a.is_ascii_digit() == b.is_ascii_digit());
    for (idx, group) in groups.enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        if group.len() > 1 && !group[0].is_ascii_digit() {
            out.push_str("upright(\"");
            out.extend(group);
            out.push('"');
            out.push(')');
        } else {
            out.extend(group);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_unchanged() {
        for n in ["0.71", "2.5", "-3", "1e-4", "42", " 7 ", "0"] {
            assert_eq!(format_token(n), n);
        }
    }

    #[test]
    fn known_symbols_map_exactly() {
        assert_eq!(format_token("β"), "beta");
        assert_eq!(format_token("k_1(β)"), "k_1(beta)");
        assert_eq!(format_token("k_o(β)"), "k_o(beta)");
    }

    #[test]
    fn multi_letter_words_are_upright() {
        assert_eq!(format_token("Re"), "upright(\"Re\")");
        assert_eq!(format_token("Pr"), "upright(\"Pr\")");
        assert_eq!(format_token("Nu"), "upright(\"Nu\")");
    }

    #[test]
    fn single_letters_and_other_tokens_pass_through() {
        assert_eq!(format_token("Q"), "Q");
        assert_eq!(format_token("y"), "y");
        assert_eq!(format_token(""), "");
        assert_eq!(format_token("x+1"), "x+1");
        assert_eq!(format_token("a1"), "a1");
    }

    #[test]
    fn letter_digit_runs_are_split() {
        assert_eq!(math_safe("a1"), "a 1");
        assert_eq!(math_safe("k1"), "k 1");
        assert_eq!(math_safe("T0"), "T 0");
        assert_eq!(math_safe("Pr2"), "upright(\"Pr\") 2");
        assert_eq!(math_safe("x2y"), "x 2 y");
        assert_eq!(math_safe("2.5e3"), "2.5e 3");
        assert_eq!(math_safe("sqrt(x2)+1"), "sqrt(x 2)+1");
    }

    #[test]
    fn safe_markup_is_unchanged() {
        for markup in [
            "",
            "0.71",
            "1e-4",
            "y",
            "x+1",
            "beta",
            "k_1(beta)",
            "k_o(beta)",
            "upright(\"Re\")",
            "\"a1\"",
        ] {
            assert_eq!(math_safe(markup), markup);
        }
    }
}

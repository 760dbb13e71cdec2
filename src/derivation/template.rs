//! Formula templates with named substitution slots.
//!
//! A template is Typst math markup containing `{slot}` placeholders. The five slots
//! correspond to the five input fields. Typst math never needs literal braces in
//! our templates (`brace.l`/`brace.r` are used instead), so `{` always opens a slot.

use super::{InputSet, format::math_safe, format_token};

/// A named substitution slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Slot {
    Pr,
    Y,
    Beta,
    K1,
    K0,
}

impl Slot {
    pub const ALL: [Slot; 5] = [Slot::Pr, Slot::Y, Slot::Beta, Slot::K1, Slot::K0];

    pub fn name(self) -> &'static str {
        match self {
            Slot::Pr => "pr",
            Slot::Y => "y",
            Slot::Beta => "beta",
            Slot::K1 => "k1",
            Slot::K0 => "k0",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.name() == name)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown slot `{{{0}}}`")]
    UnknownSlot(String),

    #[error("slot `{{{0}}}` is used but not declared")]
    UndeclaredSlot(String),

    #[error("unterminated slot starting at byte {0}")]
    UnterminatedSlot(usize),
}

/// The five input values, passed through [`format_token`] and made safe to
/// embed in Typst math.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedInputs {
    pr: String,
    y: String,
    beta: String,
    k1: String,
    k0: String,
}

impl FormattedInputs {
    pub fn new(inputs: &InputSet) -> Self {
        Self {
            pr: math_safe(&format_token(&inputs.pr)),
            y: math_safe(&format_token(&inputs.y)),
            beta: math_safe(&format_token(&inputs.beta)),
            k1: math_safe(&format_token(&inputs.k1)),
            k0: math_safe(&format_token(&inputs.k0)),
        }
    }

    pub fn get(&self, slot: Slot) -> &str {
        match slot {
            Slot::Pr => &self.pr,
            Slot::Y => &self.y,
            Slot::Beta => &self.beta,
            Slot::K1 => &self.k1,
            Slot::K0 => &self.k0,
        }
    }
}

/// A fixed formula string plus the slots it is allowed to reference.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Template {
    pub source: &'static str,
    pub slots: &'static [Slot],
}

impl Template {
    pub const fn new(source: &'static str, slots: &'static [Slot]) -> Self {
        Self { source, slots }
    }

    /// Slots referenced in `source`, in order of first appearance.
    pub fn referenced_slots(&self) -> Result<Vec<Slot>, TemplateError> {
        let mut found = Vec::new();
        for piece in parse(self.source) {
            if let Piece::Slot(slot) = piece? {
                if !found.contains(&slot) {
                    found.push(slot);
                }
            }
        }
        Ok(found)
    }

    /// Substitute every slot with its formatted value.
    pub fn render(&self, values: &FormattedInputs) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len() + 32);
        for piece in parse(self.source) {
            match piece? {
                Piece::Literal(text) => out.push_str(text),
                Piece::Slot(slot) => {
                    if !self.slots.contains(&slot) {
                        return Err(TemplateError::UndeclaredSlot(slot.name().to_string()));
                    }
                    out.push_str(values.get(slot));
                }
            }
        }
        Ok(out)
    }
}

enum Piece<'a> {
    Literal(&'a str),
    Slot(Slot),
}

fn parse(source: &str) -> impl Iterator<Item = Result<Piece<'_>, TemplateError>> + '_ {
    let mut rest = source;
    let mut offset = 0usize;

    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }

        let Some(open) = rest.find('{') else {
            let literal = rest;
            rest = "";
            return Some(Ok(Piece::Literal(literal)));
        };

        if open > 0 {
            let literal = &rest[..open];
            rest = &rest[open..];
            offset += open;
            return Some(Ok(Piece::Literal(literal)));
        }

        let Some(close) = rest.find('}') else {
            let at = offset;
            rest = "";
            return Some(Err(TemplateError::UnterminatedSlot(at)));
        };

        let name = &rest[1..close];
        rest = &rest[close + 1..];
        offset += close + 1;

        Some(
            Slot::from_name(name)
                .map(Piece::Slot)
                .ok_or_else(|| TemplateError::UnknownSlot(name.to_string())),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> FormattedInputs {
        FormattedInputs::new(&InputSet::new("0.71", "y", "β", "2.5", "k_o(β)"))
    }

    #[test]
    fn substitutes_declared_slots() {
        let t = Template::new("({pr})^(K\\/2) s^(1 - {beta})", &[Slot::Pr, Slot::Beta]);
        assert_eq!(t.render(&values()).unwrap(), "(0.71)^(K\\/2) s^(1 - beta)");
    }

    #[test]
    fn repeated_slots_are_all_replaced() {
        let t = Template::new("{k0} + {k0}", &[Slot::K0]);
        assert_eq!(t.render(&values()).unwrap(), "k_o(beta) + k_o(beta)");
        assert_eq!(t.referenced_slots().unwrap(), vec![Slot::K0]);
    }

    #[test]
    fn undeclared_slot_is_rejected() {
        let t = Template::new("{pr} {y}", &[Slot::Pr]);
        assert_eq!(
            t.render(&values()),
            Err(TemplateError::UndeclaredSlot("y".into()))
        );
    }

    #[test]
    fn unknown_and_unterminated_slots_are_rejected() {
        let unknown = Template::new("a {gamma}", &[]);
        assert_eq!(
            unknown.render(&values()),
            Err(TemplateError::UnknownSlot("gamma".into()))
        );

        let open = Template::new("ab {pr", &[Slot::Pr]);
        assert_eq!(
            open.render(&values()),
            Err(TemplateError::UnterminatedSlot(3))
        );
    }

    #[test]
    fn empty_values_leave_the_surrounding_markup() {
        let inputs = FormattedInputs::new(&InputSet::new("", "", "", "", ""));
        let t = Template::new("-{y} sqrt({pr})", &[Slot::Y, Slot::Pr]);
        assert_eq!(t.render(&inputs).unwrap(), "- sqrt()");
    }
}

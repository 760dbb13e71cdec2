//! The five-row input form.
//!
//! Each row is either *constant* (shows a fixed symbol, not editable) or *editable*
//! (free text). Switching modes is a pure transition on [`InputField`].

use crate::derivation::InputSet;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldId {
    Pr,
    Y,
    Beta,
    K1,
    K0,
}

impl FieldId {
    pub const ALL: [FieldId; 5] = [
        FieldId::Pr,
        FieldId::Y,
        FieldId::Beta,
        FieldId::K1,
        FieldId::K0,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FieldId::Pr => "Pr:",
            FieldId::Y => "y:",
            FieldId::Beta => "β:",
            FieldId::K1 => "k1(β):",
            FieldId::K0 => "ko(β):",
        }
    }

    /// Value shown while the field is kept constant.
    pub fn constant_symbol(self) -> &'static str {
        match self {
            FieldId::Pr => "Pr",
            FieldId::Y => "y",
            FieldId::Beta => "β",
            FieldId::K1 => "k_1(β)",
            FieldId::K0 => "k_o(β)",
        }
    }

    /// Starting state: `Some(value)` for an editable field, `None` for a constant one.
    pub fn default_entry(self) -> Option<&'static str> {
        match self {
            FieldId::Pr => Some("0.71"),
            FieldId::K1 => Some("2.5"),
            FieldId::Y | FieldId::Beta | FieldId::K0 => None,
        }
    }

    /// Short name used on the command line (`--keep beta`).
    pub fn key(self) -> &'static str {
        match self {
            FieldId::Pr => "pr",
            FieldId::Y => "y",
            FieldId::Beta => "beta",
            FieldId::K1 => "k1",
            FieldId::K0 => "k0",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key().eq_ignore_ascii_case(key))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    id: FieldId,
    value: String,
    editable: bool,
}

impl InputField {
    pub fn new(id: FieldId) -> Self {
        match id.default_entry() {
            Some(value) => Self {
                id,
                value: value.to_string(),
                editable: true,
            },
            None => Self::constant(id),
        }
    }

    pub fn constant(id: FieldId) -> Self {
        Self {
            id,
            value: id.constant_symbol().to_string(),
            editable: false,
        }
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Switch to editable (value cleared) or back to constant (symbol restored).
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
        if editable {
            self.value.clear();
        } else {
            self.value = self.id.constant_symbol().to_string();
        }
    }

    pub fn toggle(&mut self) {
        self.set_editable(!self.editable);
    }

    /// Replace the text. Ignored while constant; returns whether it was applied.
    pub fn set_value(&mut self, value: impl Into<String>) -> bool {
        if !self.editable {
            return false;
        }
        self.value = value.into();
        true
    }

    pub fn push_char(&mut self, ch: char) -> bool {
        if !self.editable || ch.is_control() {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub fn backspace(&mut self) -> bool {
        self.editable && self.value.pop().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputForm {
    fields: [InputField; 5],
}

impl Default for InputForm {
    fn default() -> Self {
        Self {
            fields: FieldId::ALL.map(InputField::new),
        }
    }
}

impl InputForm {
    pub fn fields(&self) -> &[InputField] {
        &self.fields
    }

    pub fn field(&self, id: FieldId) -> &InputField {
        &self.fields[index(id)]
    }

    pub fn field_mut(&mut self, id: FieldId) -> &mut InputField {
        &mut self.fields[index(id)]
    }

    /// Read all five values, with surrounding quote characters stripped.
    pub fn snapshot(&self) -> InputSet {
        let get = |id| strip_quotes(self.field(id).value()).to_string();
        InputSet {
            pr: get(FieldId::Pr),
            y: get(FieldId::Y),
            beta: get(FieldId::Beta),
            k1: get(FieldId::K1),
            k0: get(FieldId::K0),
        }
    }
}

fn index(id: FieldId) -> usize {
    match id {
        FieldId::Pr => 0,
        FieldId::Y => 1,
        FieldId::Beta => 2,
        FieldId::K1 => 3,
        FieldId::K0 => 4,
    }
}

fn strip_quotes(value: &str) -> &str {
    value.trim_matches(|c| c == '\'' || c == '"')
}

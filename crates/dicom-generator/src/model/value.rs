//! Element values.

use crate::model::{Dataset, Tag, Vr, VrKind};

/// The value held by an element.
///
/// Multi-valued elements keep every value in order; an element that is
/// present without a value is [`Value::Empty`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Present with zero values.
    #[default]
    Empty,

    /// Character data: text, person names, dates, decimal and integer strings.
    Strings(Vec<String>),

    /// Binary integers (SL, SS, UL, US, SV, UV).
    Ints(Vec<i64>),

    /// Binary floats (FL, FD).
    Floats(Vec<f64>),

    /// Attribute tag values (AT).
    Tags(Vec<Tag>),

    /// Raw bytes (OB, OD, OF, OL, OV, OW, UN).
    Bytes(Vec<u8>),

    /// Sequence items (SQ).
    Sequence(Vec<Dataset>),
}

impl Value {
    /// A single string value.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Strings(vec![s.into()])
    }

    /// Short name of the variant, used in error messages.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Strings(_) => "string",
            Value::Ints(_) => "integer",
            Value::Floats(_) => "float",
            Value::Tags(_) => "attribute tag",
            Value::Bytes(_) => "bytes",
            Value::Sequence(_) => "sequence",
        }
    }

    /// Returns true if this value can be held by an element of `vr`.
    pub fn fits(&self, vr: Vr) -> bool {
        match (self, vr.kind()) {
            (Value::Empty, _) => true,
            (Value::Strings(_), VrKind::Text | VrKind::PersonName | VrKind::NumberText) => true,
            (Value::Ints(_), VrKind::Integer) => true,
            (Value::Floats(_), VrKind::Float) => true,
            (Value::Tags(_), VrKind::AttributeTag) => true,
            (Value::Bytes(_), VrKind::Binary) => true,
            (Value::Sequence(_), VrKind::Sequence) => true,
            _ => false,
        }
    }

    /// Number of values (bytes count as one).
    pub fn multiplicity(&self) -> usize {
        match self {
            Value::Empty => 0,
            Value::Strings(v) => v.len(),
            Value::Ints(v) => v.len(),
            Value::Floats(v) => v.len(),
            Value::Tags(v) => v.len(),
            Value::Bytes(_) => 1,
            Value::Sequence(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            Value::Strings(v) => Some(v),
            _ => None,
        }
    }

    /// The first string value.
    pub fn as_str(&self) -> Option<&str> {
        self.as_strings()
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            Value::Ints(v) => Some(v),
            _ => None,
        }
    }

    /// The first integer value.
    pub fn as_int(&self) -> Option<i64> {
        self.as_ints().and_then(|v| v.first().copied())
    }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            Value::Floats(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_tags(&self) -> Option<&[Tag]> {
        match self {
            Value::Tags(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Dataset]> {
        match self {
            Value::Sequence(v) => Some(v),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Strings(vec![s])
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::Strings(v)
    }
}

impl<const N: usize> From<[&str; N]> for Value {
    fn from(v: [&str; N]) -> Self {
        Value::Strings(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Ints(vec![v])
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::Ints(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Floats(vec![v])
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Floats(v)
    }
}

impl From<Tag> for Value {
    fn from(tag: Tag) -> Self {
        Value::Tags(vec![tag])
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Vec<Dataset>> for Value {
    fn from(items: Vec<Dataset>) -> Self {
        Value::Sequence(items)
    }
}

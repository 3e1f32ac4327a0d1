use thiserror::Error;

/// Failure raised by a field caster when raw text cannot be converted to the
/// field's declared scalar type.
///
/// Casters only know the raw text; the codec attaches the field index before
/// the error leaves [`decode`](crate::codec::CompositeCodec::decode).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot cast {raw:?}{}: {reason}", .index.map(|i| format!(" at field {i}")).unwrap_or_default())]
pub struct CastError {
    /// Index of the offending field, when known
    pub index: Option<usize>,
    /// The unescaped field text handed to the caster
    pub raw: String,
    /// Human readable cause
    pub reason: String,
}

impl CastError {
    /// Creates a cast error without field position information.
    pub fn new(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            index: None,
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Attaches the field index this error was raised for.
    #[must_use]
    pub fn at_field(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositeError {
    /// Malformed composite literal or field token
    #[error("Parse error at byte {position} in {literal:?}: {reason}")]
    Parse {
        literal: String,
        position: usize,
        reason: &'static str,
    },

    /// Token count differs from the registered schema
    #[error("Field count mismatch for type {type_name}: expected {expected}, found {found}")]
    FieldCountMismatch {
        type_name: String,
        expected: usize,
        found: usize,
    },

    /// A field's text could not be cast to its declared type
    #[error("Cast error in type {type_name}: {source}")]
    Cast {
        type_name: String,
        #[source]
        source: CastError,
    },

    /// Type name is not present in the registry
    #[error("Unknown composite type: {0}")]
    UnknownType(String),

    /// Field SQL type has no caster in the field type system
    #[error("Unsupported field type {sql_type:?} in composite type {type_name}")]
    UnsupportedFieldType { type_name: String, sql_type: String },

    /// Type name rejected at registration
    #[error("Invalid composite type name: {0:?}")]
    InvalidTypeName(String),
}

impl CompositeError {
    pub(crate) fn parse(literal: &str, position: usize, reason: &'static str) -> Self {
        CompositeError::Parse {
            literal: literal.to_string(),
            position,
            reason,
        }
    }

    /// Returns the field index for cast failures.
    pub fn field_index(&self) -> Option<usize> {
        match self {
            CompositeError::Cast { source, .. } => source.index,
            _ => None,
        }
    }
}

/// Result type for composite codec operations
pub type Result<T> = std::result::Result<T, CompositeError>;

//! SQL literal quoting.
//!
//! [`Quotable`] is the set of values the quoting layer knows how to embed in
//! SQL text. Scalars render as standard PostgreSQL literals; registered
//! composite types are resolved through the registry and rendered by the codec,
//! cast to the type name quoted the same way the DDL declares it.

use crate::ddl::qualified_type_name;
use crate::values::PostgresValue;
use crate::{PgCodec, PgRegistry};
use drizzle_composite_core::{CompositeType, CompositeValue, Result};
use std::borrow::Cow;

/// A value that can be rendered as a SQL literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Quotable<'a> {
    /// Built-in scalar value
    Scalar(PostgresValue),
    /// Value of a registered composite type
    Composite {
        type_name: Cow<'a, str>,
        value: Cow<'a, CompositeValue<PostgresValue>>,
    },
}

impl<'a> Quotable<'a> {
    /// Wraps a composite value for the given registered type name.
    pub fn composite(
        type_name: impl Into<Cow<'a, str>>,
        value: &'a CompositeValue<PostgresValue>,
    ) -> Self {
        Quotable::Composite {
            type_name: type_name.into(),
            value: Cow::Borrowed(value),
        }
    }

    /// Wraps a typed composite object.
    pub fn typed<T: CompositeType<PostgresValue>>(value: &T) -> Quotable<'static> {
        Quotable::Composite {
            type_name: Cow::Borrowed(T::TYPE_NAME),
            value: Cow::Owned(value.to_composite()),
        }
    }
}

impl From<PostgresValue> for Quotable<'_> {
    fn from(value: PostgresValue) -> Self {
        Quotable::Scalar(value)
    }
}

/// Renders [`Quotable`] values as SQL literals.
///
/// # Examples
///
/// ```
/// use drizzle_composite_postgres::prelude::*;
///
/// let registry = PgRegistry::new();
/// registry
///     .register(PgSchemaBuilder::new("pair").field("a", "text").field("b", "integer").build().unwrap())
///     .unwrap();
///
/// let quoter = Quoter::new(&registry);
/// let pair = CompositeValue::new([PostgresValue::from("it's"), PostgresValue::Integer(2)]);
/// assert_eq!(
///     quoter.quote(&Quotable::composite("pair", &pair)).unwrap(),
///     r#"'("it''s",2)'::"pair""#
/// );
/// assert_eq!(quoter.quote(&PostgresValue::Integer(7).into()).unwrap(), "7");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Quoter<'r> {
    codec: PgCodec<'r>,
}

impl<'r> Quoter<'r> {
    pub fn new(registry: &'r PgRegistry) -> Self {
        Self {
            codec: PgCodec::new(registry),
        }
    }

    /// Renders a value as a SQL literal.
    ///
    /// Composites fail with [`UnknownType`](drizzle_composite_core::CompositeError::UnknownType)
    /// when their type is not registered.
    pub fn quote(&self, value: &Quotable<'_>) -> Result<String> {
        match value {
            Quotable::Scalar(scalar) => Ok(quote_scalar(scalar)),
            Quotable::Composite { type_name, value } => {
                let row = self.codec.encode_row(type_name, value)?;
                Ok(format!("{}::{}", quote_string(&row), qualified_type_name(type_name)))
            }
        }
    }

    /// Renders a typed composite object as a SQL literal.
    pub fn quote_typed<T: CompositeType<PostgresValue>>(&self, value: &T) -> Result<String> {
        self.quote(&Quotable::typed(value))
    }
}

/// Single-quotes `text`, doubling embedded single quotes.
pub fn quote_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

fn quote_scalar(value: &PostgresValue) -> String {
    match value {
        PostgresValue::Null => "NULL".to_string(),
        PostgresValue::Boolean(true) => "TRUE".to_string(),
        PostgresValue::Boolean(false) => "FALSE".to_string(),
        PostgresValue::Smallint(_) | PostgresValue::Integer(_) | PostgresValue::Bigint(_) => {
            value.to_string()
        }
        PostgresValue::Real(n) if n.is_finite() => value.to_string(),
        PostgresValue::DoublePrecision(n) if n.is_finite() => value.to_string(),
        #[cfg(feature = "rust-decimal")]
        PostgresValue::Numeric(_) => value.to_string(),
        // NaN, infinities, text, bytea and everything date/uuid/json
        other => quote_string(&other.to_string()),
    }
}

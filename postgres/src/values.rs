//! PostgreSQL field values for composite types

use drizzle_composite_core::FieldValue;
use std::borrow::Cow;
use std::fmt;

#[cfg(feature = "uuid")]
use uuid::Uuid;

#[cfg(feature = "chrono")]
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

#[cfg(feature = "rust-decimal")]
use rust_decimal::Decimal;

//------------------------------------------------------------------------------
// PostgresValue Definition
//------------------------------------------------------------------------------

/// One field of a PostgreSQL composite value.
///
/// # Examples
///
/// ```
/// use drizzle_composite_postgres::values::PostgresValue;
///
/// let int_val: PostgresValue = 42i32.into();
/// assert!(matches!(int_val, PostgresValue::Integer(42)));
///
/// let str_val: PostgresValue = "hello".into();
/// assert!(matches!(str_val, PostgresValue::Text(_)));
///
/// let none: PostgresValue = Option::<i64>::None.into();
/// assert!(none.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PostgresValue {
    /// SMALLINT values (16-bit signed integer)
    Smallint(i16),
    /// INTEGER values (32-bit signed integer)
    Integer(i32),
    /// BIGINT values (64-bit signed integer)
    Bigint(i64),
    /// REAL values (32-bit floating point)
    Real(f32),
    /// DOUBLE PRECISION values (64-bit floating point)
    DoublePrecision(f64),
    /// NUMERIC / DECIMAL values
    #[cfg(feature = "rust-decimal")]
    Numeric(Decimal),
    /// TEXT, VARCHAR, CHAR values
    Text(String),
    /// BYTEA values (binary data)
    Bytea(Vec<u8>),
    /// BOOLEAN values
    Boolean(bool),
    /// UUID values
    #[cfg(feature = "uuid")]
    Uuid(Uuid),
    /// JSON values
    #[cfg(feature = "serde")]
    Json(serde_json::Value),
    /// JSONB values
    #[cfg(feature = "serde")]
    Jsonb(serde_json::Value),

    // Date and time types
    /// DATE values
    #[cfg(feature = "chrono")]
    Date(NaiveDate),
    /// TIME values
    #[cfg(feature = "chrono")]
    Time(NaiveTime),
    /// TIMESTAMP values (without timezone)
    #[cfg(feature = "chrono")]
    Timestamp(NaiveDateTime),
    /// TIMESTAMPTZ values (with timezone)
    #[cfg(feature = "chrono")]
    TimestampTz(DateTime<FixedOffset>),

    /// NULL value
    #[default]
    Null,
}

impl PostgresValue {
    /// Returns true if this value is NULL.
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, PostgresValue::Null)
    }

    /// Returns the boolean value if this is BOOLEAN.
    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            PostgresValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value widened to i64 for any integer variant.
    #[inline]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            PostgresValue::Smallint(value) => Some(*value as i64),
            PostgresValue::Integer(value) => Some(*value as i64),
            PostgresValue::Bigint(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as f64 for REAL and DOUBLE PRECISION.
    #[inline]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            PostgresValue::Real(value) => Some(*value as f64),
            PostgresValue::DoublePrecision(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the text value if this is TEXT/VARCHAR/CHAR.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PostgresValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the bytes if this is BYTEA.
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PostgresValue::Bytea(value) => Some(value),
            _ => None,
        }
    }

    /// Short variant name used in conversion errors.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            PostgresValue::Smallint(_) => "smallint",
            PostgresValue::Integer(_) => "integer",
            PostgresValue::Bigint(_) => "bigint",
            PostgresValue::Real(_) => "real",
            PostgresValue::DoublePrecision(_) => "double precision",
            #[cfg(feature = "rust-decimal")]
            PostgresValue::Numeric(_) => "numeric",
            PostgresValue::Text(_) => "text",
            PostgresValue::Bytea(_) => "bytea",
            PostgresValue::Boolean(_) => "boolean",
            #[cfg(feature = "uuid")]
            PostgresValue::Uuid(_) => "uuid",
            #[cfg(feature = "serde")]
            PostgresValue::Json(_) => "json",
            #[cfg(feature = "serde")]
            PostgresValue::Jsonb(_) => "jsonb",
            #[cfg(feature = "chrono")]
            PostgresValue::Date(_) => "date",
            #[cfg(feature = "chrono")]
            PostgresValue::Time(_) => "time",
            #[cfg(feature = "chrono")]
            PostgresValue::Timestamp(_) => "timestamp",
            #[cfg(feature = "chrono")]
            PostgresValue::TimestampTz(_) => "timestamptz",
            PostgresValue::Null => "null",
        }
    }
}

/// Formats floats the way PostgreSQL reads them back.
fn float_text(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        value.to_string()
    }
}

impl fmt::Display for PostgresValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            PostgresValue::Smallint(i) => i.to_string(),
            PostgresValue::Integer(i) => i.to_string(),
            PostgresValue::Bigint(i) => i.to_string(),
            PostgresValue::Real(r) => {
                if r.is_finite() {
                    r.to_string()
                } else {
                    float_text(*r as f64)
                }
            }
            PostgresValue::DoublePrecision(r) => float_text(*r),
            #[cfg(feature = "rust-decimal")]
            PostgresValue::Numeric(d) => d.to_string(),
            PostgresValue::Text(s) => s.clone(),
            PostgresValue::Bytea(bytes) => format!(
                "\\x{}",
                bytes.iter().map(|b| format!("{:02x}", b)).collect::<String>()
            ),
            PostgresValue::Boolean(b) => b.to_string(),
            #[cfg(feature = "uuid")]
            PostgresValue::Uuid(uuid) => uuid.to_string(),
            #[cfg(feature = "serde")]
            PostgresValue::Json(json) => json.to_string(),
            #[cfg(feature = "serde")]
            PostgresValue::Jsonb(json) => json.to_string(),

            #[cfg(feature = "chrono")]
            PostgresValue::Date(date) => date.format("%Y-%m-%d").to_string(),
            #[cfg(feature = "chrono")]
            PostgresValue::Time(time) => time.format("%H:%M:%S%.f").to_string(),
            #[cfg(feature = "chrono")]
            PostgresValue::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            #[cfg(feature = "chrono")]
            PostgresValue::TimestampTz(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string(),

            PostgresValue::Null => String::new(),
        };
        write!(f, "{value}")
    }
}

impl FieldValue for PostgresValue {
    fn null() -> Self {
        PostgresValue::Null
    }

    fn is_null(&self) -> bool {
        PostgresValue::is_null(self)
    }

    fn to_field_text(&self) -> Cow<'_, str> {
        match self {
            PostgresValue::Text(s) => Cow::Borrowed(s),
            other => Cow::Owned(other.to_string()),
        }
    }

    fn is_textual(&self) -> bool {
        match self {
            PostgresValue::Text(_) => true,
            #[cfg(feature = "serde")]
            PostgresValue::Json(_) | PostgresValue::Jsonb(_) => true,
            _ => false,
        }
    }

    fn same_kind(&self, recast: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(recast)
    }
}

//------------------------------------------------------------------------------
// From<T> implementations
//------------------------------------------------------------------------------

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for PostgresValue {
                fn from(value: $ty) -> Self {
                    PostgresValue::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    i16 => Smallint,
    i32 => Integer,
    i64 => Bigint,
    f32 => Real,
    f64 => DoublePrecision,
    bool => Boolean,
    String => Text,
    Vec<u8> => Bytea,
}

#[cfg(feature = "rust-decimal")]
impl_from! { Decimal => Numeric }

#[cfg(feature = "uuid")]
impl_from! { Uuid => Uuid }

#[cfg(feature = "chrono")]
impl_from! {
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
    DateTime<FixedOffset> => TimestampTz,
}

impl From<&str> for PostgresValue {
    fn from(value: &str) -> Self {
        PostgresValue::Text(value.to_string())
    }
}

impl From<&[u8]> for PostgresValue {
    fn from(value: &[u8]) -> Self {
        PostgresValue::Bytea(value.to_vec())
    }
}

impl<T: Into<PostgresValue>> From<Option<T>> for PostgresValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PostgresValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_scalars() {
        assert_eq!(PostgresValue::Integer(-4).to_string(), "-4");
        assert_eq!(PostgresValue::Boolean(true).to_string(), "true");
        assert_eq!(PostgresValue::Bytea(vec![0x01, 0xab]).to_string(), "\\x01ab");
        assert_eq!(PostgresValue::DoublePrecision(f64::NAN).to_string(), "NaN");
        assert_eq!(PostgresValue::Real(f32::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(PostgresValue::DoublePrecision(1.5).to_string(), "1.5");
    }

    #[test]
    fn textual_hint() {
        assert!(PostgresValue::Text("1".into()).is_textual());
        assert!(!PostgresValue::Integer(1).is_textual());
        assert!(!PostgresValue::Bytea(vec![]).is_textual());
    }

    #[test]
    fn accessors() {
        assert_eq!(PostgresValue::Smallint(7).as_i64(), Some(7));
        assert_eq!(PostgresValue::Real(0.5).as_f64(), Some(0.5));
        assert_eq!(PostgresValue::from("x").as_str(), Some("x"));
        assert_eq!(PostgresValue::Boolean(false).as_bool(), Some(false));
        assert_eq!(PostgresValue::Null.as_bool(), None);
    }
}

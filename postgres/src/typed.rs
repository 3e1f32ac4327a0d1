//! Typed composite objects.
//!
//! [`PgField`] maps a Rust field type to its PostgreSQL field type and value;
//! the [`composite_type!`](crate::composite_type) macro uses it to implement
//! [`CompositeType`](drizzle_composite_core::CompositeType) for a plain struct.

use crate::field::PgFieldType;
use crate::values::PostgresValue;
use drizzle_composite_core::{CastError, Caster, CompositeError, FieldValue};

/// A Rust type usable as one field of a typed composite.
pub trait PgField: Sized {
    /// Field type used for casting and `CREATE TYPE` output
    const FIELD_TYPE: PgFieldType;

    /// Converts a decoded field value into this type.
    fn from_pg_value(value: PostgresValue) -> Result<Self, CastError>;

    fn to_pg_value(&self) -> PostgresValue;
}

fn mismatch(value: &PostgresValue, expected: &str) -> CastError {
    CastError::new(
        value.to_field_text().into_owned(),
        format!("expected {expected}, found {}", value.kind()),
    )
}

macro_rules! impl_pg_field {
    ($ty:ty, $field_type:ident, $name:literal, |$v:ident| $from:expr) => {
        impl PgField for $ty {
            const FIELD_TYPE: PgFieldType = PgFieldType::$field_type;

            fn from_pg_value(value: PostgresValue) -> Result<Self, CastError> {
                let $v = value;
                $from.ok_or_else(|| mismatch(&$v, $name))
            }

            fn to_pg_value(&self) -> PostgresValue {
                PostgresValue::from(self.clone())
            }
        }
    };
}

impl_pg_field!(i16, SmallInt, "smallint", |v| match v {
    PostgresValue::Smallint(n) => Some(n),
    _ => None,
});
impl_pg_field!(i32, Integer, "integer", |v| match v {
    PostgresValue::Smallint(n) => Some(i32::from(n)),
    PostgresValue::Integer(n) => Some(n),
    _ => None,
});
impl_pg_field!(i64, BigInt, "bigint", |v| v.as_i64());
impl_pg_field!(f32, Real, "real", |v| match v {
    PostgresValue::Real(n) => Some(n),
    _ => None,
});
impl_pg_field!(f64, DoublePrecision, "double precision", |v| v.as_f64());
impl_pg_field!(bool, Boolean, "boolean", |v| v.as_bool());
impl_pg_field!(String, Text, "text", |v| match &v {
    PostgresValue::Text(s) => Some(s.clone()),
    _ => None,
});
impl_pg_field!(Vec<u8>, Bytea, "bytea", |v| v.as_bytes().map(<[u8]>::to_vec));

#[cfg(feature = "rust-decimal")]
impl_pg_field!(rust_decimal::Decimal, Numeric, "numeric", |v| match v {
    PostgresValue::Numeric(d) => Some(d),
    _ => None,
});

#[cfg(feature = "uuid")]
impl_pg_field!(uuid::Uuid, Uuid, "uuid", |v| match v {
    PostgresValue::Uuid(id) => Some(id),
    _ => None,
});

#[cfg(feature = "chrono")]
impl_pg_field!(chrono::NaiveDate, Date, "date", |v| match v {
    PostgresValue::Date(d) => Some(d),
    _ => None,
});

#[cfg(feature = "chrono")]
impl_pg_field!(chrono::NaiveTime, Time, "time", |v| match v {
    PostgresValue::Time(t) => Some(t),
    _ => None,
});

#[cfg(feature = "chrono")]
impl_pg_field!(chrono::NaiveDateTime, Timestamp, "timestamp", |v| match v {
    PostgresValue::Timestamp(ts) => Some(ts),
    _ => None,
});

#[cfg(feature = "chrono")]
impl_pg_field!(
    chrono::DateTime<chrono::FixedOffset>,
    TimestampTz,
    "timestamptz",
    |v| match v {
        PostgresValue::TimestampTz(ts) => Some(ts),
        _ => None,
    }
);

/// NULL maps to `None`; anything else goes through `T`.
impl<T: PgField + Clone + Into<PostgresValue>> PgField for Option<T> {
    const FIELD_TYPE: PgFieldType = T::FIELD_TYPE;

    fn from_pg_value(value: PostgresValue) -> Result<Self, CastError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_pg_value(value).map(Some)
        }
    }

    fn to_pg_value(&self) -> PostgresValue {
        self.clone().map_or(PostgresValue::Null, Into::into)
    }
}

/// Caster for a field declared with Rust type `T`.
#[doc(hidden)]
pub fn field_caster<T: PgField>() -> Caster<PostgresValue> {
    T::FIELD_TYPE.caster()
}

/// Pulls the next decoded field and converts it to `T`, tagging failures
/// with the field index.
#[doc(hidden)]
pub fn take_field<T: PgField>(
    type_name: &str,
    fields: &mut impl Iterator<Item = (usize, PostgresValue)>,
    expected: usize,
) -> Result<T, CompositeError> {
    let Some((index, value)) = fields.next() else {
        return Err(CompositeError::FieldCountMismatch {
            type_name: type_name.to_string(),
            expected,
            found: expected.saturating_sub(1),
        });
    };

    T::from_pg_value(value).map_err(|source| CompositeError::Cast {
        type_name: type_name.to_string(),
        source: source.at_field(index),
    })
}

/// Defines a struct stored as a PostgreSQL composite type.
///
/// Each field's Rust type picks its SQL type through [`PgField`]; wrap a type
/// in `Option` to allow NULL.
///
/// # Examples
///
/// ```
/// use drizzle_composite_postgres::prelude::*;
///
/// composite_type! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Point: "point" {
///         pub x: i32,
///         pub y: i32,
///     }
/// }
///
/// let registry = PgRegistry::new();
/// registry.register_type::<Point>().unwrap();
///
/// let codec = PgCodec::new(&registry);
/// let literal = codec.encode_typed(&Point { x: 3, y: -4 }).unwrap();
/// assert_eq!(literal, "(3,-4)::point");
/// assert_eq!(codec.decode_as::<Point>("(3,-4)").unwrap(), Point { x: 3, y: -4 });
/// ```
#[macro_export]
macro_rules! composite_type {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $type_name:literal {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::CompositeType<$crate::values::PostgresValue> for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn schema() -> $crate::TypeSchema<$crate::values::PostgresValue> {
                $crate::TypeSchema::builder($type_name)
                    $(
                        .field_with_caster(
                            stringify!($field),
                            <$ty as $crate::typed::PgField>::FIELD_TYPE.sql_name(),
                            $crate::typed::field_caster::<$ty>(),
                        )
                    )*
                    .build()
            }

            fn from_composite(
                value: $crate::CompositeValue<$crate::values::PostgresValue>,
            ) -> $crate::Result<Self> {
                const FIELD_COUNT: usize = [$(stringify!($field)),*].len();
                if value.len() != FIELD_COUNT {
                    return Err($crate::CompositeError::FieldCountMismatch {
                        type_name: $type_name.to_string(),
                        expected: FIELD_COUNT,
                        found: value.len(),
                    });
                }

                let mut fields = value.into_iter().enumerate();
                Ok(Self {
                    $(
                        $field: $crate::typed::take_field::<$ty>(
                            $type_name,
                            &mut fields,
                            FIELD_COUNT,
                        )?,
                    )*
                })
            }

            fn to_composite(&self) -> $crate::CompositeValue<$crate::values::PostgresValue> {
                $crate::CompositeValue::new([
                    $($crate::typed::PgField::to_pg_value(&self.$field),)*
                ])
            }
        }
    };
}

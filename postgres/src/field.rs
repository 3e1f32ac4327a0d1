//! PostgreSQL field type system: SQL type names to casters.
//!
//! Each composite sub-field declares a scalar SQL type. [`PgFieldType`] parses
//! that declaration and converts the field's unescaped text into a
//! [`PostgresValue`].

use crate::values::PostgresValue;
use drizzle_composite_core::{CastError, Caster, CompositeError, TypeSchema, TypeSchemaBuilder};
use std::sync::Arc;

/// Scalar field types a composite field can be declared with.
///
/// # Examples
///
/// ```
/// use drizzle_composite_postgres::field::PgFieldType;
///
/// assert_eq!(PgFieldType::from_sql_type("integer"), Some(PgFieldType::Integer));
/// assert_eq!(PgFieldType::from_sql_type("VARCHAR(255)"), Some(PgFieldType::Text));
/// assert_eq!(PgFieldType::from_sql_type("int8"), Some(PgFieldType::BigInt));
/// assert_eq!(PgFieldType::from_sql_type("tsvector"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PgFieldType {
    SmallInt,
    Integer,
    BigInt,
    Real,
    DoublePrecision,
    #[cfg(feature = "rust-decimal")]
    Numeric,
    Boolean,
    /// TEXT, VARCHAR(n), CHAR(n)
    Text,
    Bytea,
    #[cfg(feature = "uuid")]
    Uuid,
    #[cfg(feature = "serde")]
    Json,
    #[cfg(feature = "serde")]
    Jsonb,
    #[cfg(feature = "chrono")]
    Date,
    #[cfg(feature = "chrono")]
    Time,
    #[cfg(feature = "chrono")]
    Timestamp,
    #[cfg(feature = "chrono")]
    TimestampTz,
}

impl PgFieldType {
    /// Helper: case-insensitive prefix check
    fn starts_with_ci(s: &str, prefix: &str) -> bool {
        s.len() >= prefix.len()
            && s.is_char_boundary(prefix.len())
            && s[..prefix.len()].eq_ignore_ascii_case(prefix)
    }

    /// Resolves a SQL type declaration; `None` when no caster exists for it
    /// (or the feature providing it is disabled).
    #[must_use]
    pub fn from_sql_type(sql_type: &str) -> Option<Self> {
        let normalized = sql_type.trim();
        let is = |name: &str| normalized.eq_ignore_ascii_case(name);

        // Integer types
        if is("smallint") || is("int2") {
            return Some(Self::SmallInt);
        }
        if is("integer") || is("int") || is("int4") {
            return Some(Self::Integer);
        }
        if is("bigint") || is("int8") {
            return Some(Self::BigInt);
        }

        // Numeric types
        #[cfg(feature = "rust-decimal")]
        if Self::starts_with_ci(normalized, "numeric") || Self::starts_with_ci(normalized, "decimal")
        {
            return Some(Self::Numeric);
        }
        if is("real") || is("float4") {
            return Some(Self::Real);
        }
        if is("double precision") || is("float8") {
            return Some(Self::DoublePrecision);
        }

        if is("boolean") || is("bool") {
            return Some(Self::Boolean);
        }

        // String types
        if Self::starts_with_ci(normalized, "varchar")
            || Self::starts_with_ci(normalized, "character varying")
            || Self::starts_with_ci(normalized, "char")
            || Self::starts_with_ci(normalized, "character")
            || is("text")
        {
            return Some(Self::Text);
        }
        if is("bytea") {
            return Some(Self::Bytea);
        }

        #[cfg(feature = "uuid")]
        if is("uuid") {
            return Some(Self::Uuid);
        }

        // JSON types (jsonb before json)
        #[cfg(feature = "serde")]
        if is("jsonb") {
            return Some(Self::Jsonb);
        }
        #[cfg(feature = "serde")]
        if is("json") {
            return Some(Self::Json);
        }

        #[cfg(feature = "chrono")]
        {
            if is("timestamptz") || is("timestamp with time zone") {
                return Some(Self::TimestampTz);
            }
            if is("timestamp") || is("timestamp without time zone") {
                return Some(Self::Timestamp);
            }
            if is("time") || is("time without time zone") {
                return Some(Self::Time);
            }
            if is("date") {
                return Some(Self::Date);
            }
        }

        None
    }

    /// Canonical SQL spelling, used in `CREATE TYPE` output.
    #[must_use]
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::SmallInt => "smallint",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Real => "real",
            Self::DoublePrecision => "double precision",
            #[cfg(feature = "rust-decimal")]
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Bytea => "bytea",
            #[cfg(feature = "uuid")]
            Self::Uuid => "uuid",
            #[cfg(feature = "serde")]
            Self::Json => "json",
            #[cfg(feature = "serde")]
            Self::Jsonb => "jsonb",
            #[cfg(feature = "chrono")]
            Self::Date => "date",
            #[cfg(feature = "chrono")]
            Self::Time => "time",
            #[cfg(feature = "chrono")]
            Self::Timestamp => "timestamp",
            #[cfg(feature = "chrono")]
            Self::TimestampTz => "timestamptz",
        }
    }

    /// Converts one field's unescaped text into a value of this type.
    pub fn cast(self, raw: &str) -> Result<PostgresValue, CastError> {
        let fail = |reason: &dyn std::fmt::Display| CastError::new(raw, reason.to_string());

        match self {
            Self::SmallInt => raw.trim().parse().map(PostgresValue::Smallint).map_err(|e| fail(&e)),
            Self::Integer => raw.trim().parse().map(PostgresValue::Integer).map_err(|e| fail(&e)),
            Self::BigInt => raw.trim().parse().map(PostgresValue::Bigint).map_err(|e| fail(&e)),
            Self::Real => raw.trim().parse().map(PostgresValue::Real).map_err(|e| fail(&e)),
            Self::DoublePrecision => raw
                .trim()
                .parse()
                .map(PostgresValue::DoublePrecision)
                .map_err(|e| fail(&e)),
            #[cfg(feature = "rust-decimal")]
            Self::Numeric => raw
                .trim()
                .parse()
                .map(PostgresValue::Numeric)
                .map_err(|e: rust_decimal::Error| fail(&e)),
            Self::Boolean => parse_bool(raw)
                .map(PostgresValue::Boolean)
                .ok_or_else(|| fail(&"invalid boolean")),
            Self::Text => Ok(PostgresValue::Text(raw.to_string())),
            Self::Bytea => parse_bytea(raw)
                .map(PostgresValue::Bytea)
                .ok_or_else(|| fail(&"invalid hex bytea")),
            #[cfg(feature = "uuid")]
            Self::Uuid => uuid::Uuid::parse_str(raw.trim())
                .map(PostgresValue::Uuid)
                .map_err(|e| fail(&e)),
            #[cfg(feature = "serde")]
            Self::Json => serde_json::from_str(raw)
                .map(PostgresValue::Json)
                .map_err(|e| fail(&e)),
            #[cfg(feature = "serde")]
            Self::Jsonb => serde_json::from_str(raw)
                .map(PostgresValue::Jsonb)
                .map_err(|e| fail(&e)),
            #[cfg(feature = "chrono")]
            Self::Date => chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(PostgresValue::Date)
                .map_err(|e| fail(&e)),
            #[cfg(feature = "chrono")]
            Self::Time => chrono::NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S%.f")
                .map(PostgresValue::Time)
                .map_err(|e| fail(&e)),
            #[cfg(feature = "chrono")]
            Self::Timestamp => {
                chrono::NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S%.f")
                    .map(PostgresValue::Timestamp)
                    .map_err(|e| fail(&e))
            }
            #[cfg(feature = "chrono")]
            Self::TimestampTz => {
                chrono::DateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S%.f%#z")
                    .map(PostgresValue::TimestampTz)
                    .map_err(|e| fail(&e))
            }
        }
    }

    /// Shared caster for schema field descriptors.
    pub fn caster(self) -> Caster<PostgresValue> {
        Arc::new(move |raw| self.cast(raw))
    }
}

/// Accepts the boolean spellings PostgreSQL accepts on input.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Some(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Parses the hex bytea format, `\x0a1b...`.
fn parse_bytea(raw: &str) -> Option<Vec<u8>> {
    let hex = raw.strip_prefix("\\x")?;
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| hex.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect()
}

//------------------------------------------------------------------------------
// Schema construction from SQL type names
//------------------------------------------------------------------------------

/// Builds a [`TypeSchema`] for PostgreSQL from `(field name, SQL type)` pairs.
///
/// # Examples
///
/// ```
/// use drizzle_composite_postgres::field::PgSchemaBuilder;
///
/// let schema = PgSchemaBuilder::new("point")
///     .field("x", "integer")
///     .field("y", "integer")
///     .build()
///     .unwrap();
/// assert_eq!(schema.len(), 2);
/// assert_eq!(schema.fields()[1].sql_type(), "integer");
/// ```
#[derive(Debug, Clone)]
pub struct PgSchemaBuilder {
    type_name: String,
    fields: Vec<(String, String)>,
}

impl PgSchemaBuilder {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        self.fields.push((name.into(), sql_type.into()));
        self
    }

    /// Resolves every field type; fails on the first type with no caster.
    pub fn build(self) -> Result<TypeSchema<PostgresValue>, CompositeError> {
        let type_name = self.type_name;
        let builder: TypeSchemaBuilder<PostgresValue> = TypeSchema::builder(type_name.clone());

        self.fields
            .into_iter()
            .try_fold(builder, |builder, (name, sql_type)| {
                let field_type = PgFieldType::from_sql_type(&sql_type).ok_or_else(|| {
                    CompositeError::UnsupportedFieldType {
                        type_name: type_name.clone(),
                        sql_type: sql_type.clone(),
                    }
                })?;
                Ok(builder.field_with_caster(name, sql_type, field_type.caster()))
            })
            .map(TypeSchemaBuilder::build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_type_aliases() {
        assert_eq!(PgFieldType::from_sql_type("INT"), Some(PgFieldType::Integer));
        assert_eq!(PgFieldType::from_sql_type(" int2 "), Some(PgFieldType::SmallInt));
        assert_eq!(PgFieldType::from_sql_type("float8"), Some(PgFieldType::DoublePrecision));
        assert_eq!(PgFieldType::from_sql_type("bool"), Some(PgFieldType::Boolean));
        assert_eq!(PgFieldType::from_sql_type("character varying(10)"), Some(PgFieldType::Text));
        assert_eq!(PgFieldType::from_sql_type("char(2)"), Some(PgFieldType::Text));
        assert_eq!(PgFieldType::from_sql_type("bytea"), Some(PgFieldType::Bytea));
        assert_eq!(PgFieldType::from_sql_type("point"), None);
    }

    #[test]
    fn integer_casts() {
        assert_eq!(PgFieldType::Integer.cast("-4"), Ok(PostgresValue::Integer(-4)));
        assert_eq!(PgFieldType::SmallInt.cast("12"), Ok(PostgresValue::Smallint(12)));
        assert_eq!(
            PgFieldType::BigInt.cast("9000000000"),
            Ok(PostgresValue::Bigint(9_000_000_000))
        );

        let err = PgFieldType::Integer.cast("4.5").unwrap_err();
        assert_eq!(err.raw, "4.5");
        assert_eq!(err.index, None);
        assert!(PgFieldType::SmallInt.cast("70000").is_err());
    }

    #[test]
    fn float_casts_accept_special_values() {
        assert_eq!(PgFieldType::DoublePrecision.cast("1.25"), Ok(PostgresValue::DoublePrecision(1.25)));
        assert!(matches!(
            PgFieldType::DoublePrecision.cast("NaN"),
            Ok(PostgresValue::DoublePrecision(v)) if v.is_nan()
        ));
        assert_eq!(
            PgFieldType::Real.cast("-Infinity"),
            Ok(PostgresValue::Real(f32::NEG_INFINITY))
        );
    }

    #[test]
    fn boolean_spellings() {
        assert_eq!(PgFieldType::Boolean.cast("t"), Ok(PostgresValue::Boolean(true)));
        assert_eq!(PgFieldType::Boolean.cast("FALSE"), Ok(PostgresValue::Boolean(false)));
        assert!(PgFieldType::Boolean.cast("maybe").is_err());
    }

    #[test]
    fn bytea_hex() {
        assert_eq!(
            PgFieldType::Bytea.cast("\\x01ff"),
            Ok(PostgresValue::Bytea(vec![0x01, 0xff]))
        );
        assert!(PgFieldType::Bytea.cast("\\x0").is_err());
        assert!(PgFieldType::Bytea.cast("01ff").is_err());
        assert!(PgFieldType::Bytea.cast("\\xzz").is_err());
    }

    #[test]
    fn text_is_verbatim() {
        assert_eq!(
            PgFieldType::Text.cast(" keep spaces "),
            Ok(PostgresValue::Text(" keep spaces ".into()))
        );
    }

    #[test]
    fn schema_builder_rejects_unknown_types() {
        let err = PgSchemaBuilder::new("shape")
            .field("kind", "text")
            .field("area", "geometry")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            CompositeError::UnsupportedFieldType {
                type_name: "shape".into(),
                sql_type: "geometry".into(),
            }
        );
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn chrono_casts() {
        use chrono::{NaiveDate, Timelike};

        assert_eq!(
            PgFieldType::Date.cast("2024-02-29"),
            Ok(PostgresValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()))
        );
        let Ok(PostgresValue::TimestampTz(ts)) =
            PgFieldType::TimestampTz.cast("2024-01-02 03:04:05.5+05:30")
        else {
            panic!("expected timestamptz");
        };
        assert_eq!(ts.hour(), 3);
        assert_eq!(ts.offset().local_minus_utc(), 5 * 3600 + 30 * 60);
        assert!(PgFieldType::Timestamp.cast("2024-01-02 03:04:05").is_ok());
    }

    #[cfg(feature = "uuid")]
    #[test]
    fn uuid_cast() {
        let id = uuid::Uuid::nil();
        assert_eq!(PgFieldType::Uuid.cast(&id.to_string()), Ok(PostgresValue::Uuid(id)));
        assert!(PgFieldType::Uuid.cast("not-a-uuid").is_err());
    }
}

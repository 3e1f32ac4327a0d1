//! Materializing raw result cells.
//!
//! Drivers hand back composite columns as text. [`materialize`] turns a cell
//! into a decoded [`CompositeValue`] when its declared column type is a
//! registered composite, and leaves every other cell as raw text.

use crate::values::PostgresValue;
use crate::{PgCodec, PgRegistry};
use drizzle_composite_core::{CompositeType, CompositeValue, Result, composite_trace_codec};

/// One materialized result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    /// Text of a column whose type is not a registered composite
    Raw(String),
    Composite {
        type_name: String,
        value: CompositeValue<PostgresValue>,
    },
}

impl Cell {
    pub const fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_composite(&self) -> Option<&CompositeValue<PostgresValue>> {
        match self {
            Cell::Composite { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Cell::Raw(text) => Some(text),
            _ => None,
        }
    }
}

/// Materializes one cell of a column declared as `declared_type`.
///
/// `None` stays NULL. For a registered composite type a blank cell is also
/// NULL and anything else is decoded; other types pass the text through.
pub fn materialize(registry: &PgRegistry, declared_type: &str, raw: Option<&str>) -> Result<Cell> {
    let Some(raw) = raw else {
        return Ok(Cell::Null);
    };

    if !registry.contains(declared_type) {
        return Ok(Cell::Raw(raw.to_string()));
    }

    if raw.trim().is_empty() {
        return Ok(Cell::Null);
    }

    let value = PgCodec::new(registry).decode(declared_type, raw)?;
    composite_trace_codec!("materialize", declared_type, value.len());
    Ok(Cell::Composite {
        type_name: declared_type.to_string(),
        value,
    })
}

/// Decodes a cell straight into a typed composite; `None` and blank cells
/// become `None`.
pub fn materialize_as<T: CompositeType<PostgresValue>>(
    registry: &PgRegistry,
    raw: Option<&str>,
) -> Result<Option<T>> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => PgCodec::new(registry).decode_as(raw).map(Some),
        _ => Ok(None),
    }
}

/// Materializes a row given `(declared_type, raw)` pairs in column order.
///
/// The first failing cell fails the whole row.
pub fn materialize_row<'a, I>(registry: &PgRegistry, cells: I) -> Result<Vec<Cell>>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    cells
        .into_iter()
        .map(|(declared_type, raw)| materialize(registry, declared_type, raw))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::PgSchemaBuilder;
    use drizzle_composite_core::CompositeError;

    fn registry() -> PgRegistry {
        let registry = PgRegistry::new();
        registry
            .register(
                PgSchemaBuilder::new("point")
                    .field("x", "integer")
                    .field("y", "integer")
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn registered_type_is_decoded() {
        let registry = registry();
        let cell = materialize(&registry, "point", Some("(3,-4)")).unwrap();
        assert_eq!(
            cell.as_composite().unwrap().fields(),
            &[PostgresValue::Integer(3), PostgresValue::Integer(-4)]
        );
    }

    #[test]
    fn null_and_blank_cells() {
        let registry = registry();
        assert!(materialize(&registry, "point", None).unwrap().is_null());
        assert!(materialize(&registry, "point", Some("  ")).unwrap().is_null());
        assert_eq!(
            materialize(&registry, "text", Some("")).unwrap(),
            Cell::Raw(String::new())
        );
    }

    #[test]
    fn unregistered_type_passes_through() {
        let registry = registry();
        let cell = materialize(&registry, "varchar", Some("(3,-4)")).unwrap();
        assert_eq!(cell.as_raw(), Some("(3,-4)"));
    }

    #[test]
    fn row_fails_on_first_bad_cell() {
        let registry = registry();
        let row = materialize_row(&registry, [("integer", Some("1")), ("point", Some("(1,2)"))]).unwrap();
        assert_eq!(row.len(), 2);

        let err = materialize_row(&registry, [("point", Some("(1,2,3)")), ("text", None)]).unwrap_err();
        assert!(matches!(err, CompositeError::FieldCountMismatch { found: 3, .. }));
    }
}

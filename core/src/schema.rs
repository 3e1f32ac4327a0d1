//! Composite type schemas: ordered field descriptors with per-field casters.

use crate::error::{CastError, CompositeError, Result};
use crate::value::{CompositeValue, FieldValue};
use std::fmt;
use std::sync::Arc;

/// PostgreSQL identifier max length
const MAX_IDENTIFIER_LEN: usize = 63;

/// Converts one field's unescaped text into its typed value.
pub type Caster<V> = Arc<dyn Fn(&str) -> std::result::Result<V, CastError> + Send + Sync>;

/// One sub-field of a composite type.
#[derive(Clone)]
pub struct FieldDescriptor<V> {
    index: usize,
    name: String,
    sql_type: String,
    caster: Caster<V>,
}

impl<V> FieldDescriptor<V> {
    /// 0-based position inside the composite
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared SQL type, e.g. `integer`
    #[inline]
    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }

    /// Runs the caster, tagging failures with this field's index.
    pub fn cast(&self, raw: &str) -> std::result::Result<V, CastError> {
        (self.caster)(raw).map_err(|err| err.at_field(self.index))
    }
}

impl<V> fmt::Debug for FieldDescriptor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("sql_type", &self.sql_type)
            .finish_non_exhaustive()
    }
}

/// The shape of a composite type: its name and ordered fields.
///
/// # Examples
///
/// ```
/// use drizzle_composite_core::TypeSchema;
///
/// let schema = TypeSchema::<Option<String>>::builder("label")
///     .field("text", "text", |raw| Ok(Some(raw.to_string())))
///     .build();
/// assert_eq!(schema.type_name(), "label");
/// assert_eq!(schema.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct TypeSchema<V> {
    type_name: String,
    fields: Vec<FieldDescriptor<V>>,
}

impl<V> TypeSchema<V> {
    pub fn builder(type_name: impl Into<String>) -> TypeSchemaBuilder<V> {
        TypeSchemaBuilder {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Full type name as registered, possibly schema-qualified.
    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The `(schema, name)` pair; unqualified names live in `public`.
    pub fn qualified_name(&self) -> (&str, &str) {
        self.type_name
            .split_once('.')
            .unwrap_or(("public", self.type_name.as_str()))
    }

    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor<V>] {
        &self.fields
    }

    #[inline]
    pub fn field(&self, index: usize) -> Option<&FieldDescriptor<V>> {
        self.fields.get(index)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor<V>> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builder for [`TypeSchema`]; field indexes follow insertion order.
pub struct TypeSchemaBuilder<V> {
    type_name: String,
    fields: Vec<FieldDescriptor<V>>,
}

impl<V> TypeSchemaBuilder<V> {
    /// Appends a field with its SQL type and caster.
    pub fn field<F>(self, name: impl Into<String>, sql_type: impl Into<String>, caster: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<V, CastError> + Send + Sync + 'static,
    {
        self.field_with_caster(name, sql_type, Arc::new(caster))
    }

    /// Appends a field reusing an already shared caster.
    pub fn field_with_caster(
        mut self,
        name: impl Into<String>,
        sql_type: impl Into<String>,
        caster: Caster<V>,
    ) -> Self {
        let index = self.fields.len();
        self.fields.push(FieldDescriptor {
            index,
            name: name.into(),
            sql_type: sql_type.into(),
            caster,
        });
        self
    }

    pub fn build(self) -> TypeSchema<V> {
        TypeSchema {
            type_name: self.type_name,
            fields: self.fields,
        }
    }
}

/// A Rust type stored in a composite column.
///
/// Implementors declare their schema once; the registry and codec use it to
/// move between the typed object and [`CompositeValue`].
pub trait CompositeType<V: FieldValue>: Sized {
    /// Database type name, e.g. `point`
    const TYPE_NAME: &'static str;

    /// Field layout used to register this type.
    fn schema() -> TypeSchema<V>;

    /// Builds the typed object from decoded fields.
    fn from_composite(value: CompositeValue<V>) -> Result<Self>;

    /// Splits the typed object into field values, in schema order.
    fn to_composite(&self) -> CompositeValue<V>;
}

/// Validates a composite type name: a PostgreSQL identifier, optionally
/// qualified with a schema (`schema.name`).
pub fn validate_type_name(type_name: &str) -> Result<()> {
    let mut parts = type_name.split('.');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(name), None, None) => is_identifier(name),
        (Some(schema), Some(name), None) => is_identifier(schema) && is_identifier(name),
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(CompositeError::InvalidTypeName(type_name.to_string()))
    }
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    part.len() <= MAX_IDENTIFIER_LEN
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper_schema() -> TypeSchema<Option<String>> {
        TypeSchema::builder("shout")
            .field("a", "text", |raw| Ok(Some(raw.to_uppercase())))
            .field("b", "integer", |raw| {
                raw.parse::<i32>()
                    .map(|n| Some(n.to_string()))
                    .map_err(|e| CastError::new(raw, e.to_string()))
            })
            .build()
    }

    #[test]
    fn builder_assigns_indexes_in_order() {
        let schema = upper_schema();
        let indexes: Vec<_> = schema.fields().iter().map(FieldDescriptor::index).collect();
        assert_eq!(indexes, vec![0, 1]);
        assert_eq!(schema.field_by_name("b").map(|f| f.sql_type()), Some("integer"));
    }

    #[test]
    fn cast_tags_field_index() {
        let schema = upper_schema();
        let err = schema.fields()[1].cast("x").unwrap_err();
        assert_eq!(err.index, Some(1));
        assert_eq!(err.raw, "x");
        assert_eq!(schema.fields()[0].cast("hi").unwrap(), Some("HI".to_string()));
    }

    #[test]
    fn qualified_name_defaults_to_public() {
        let schema = upper_schema();
        assert_eq!(schema.qualified_name(), ("public", "shout"));

        let scoped = TypeSchema::<Option<String>>::builder("geo.point").build();
        assert_eq!(scoped.qualified_name(), ("geo", "point"));
    }

    #[test]
    fn type_name_validation() {
        assert!(validate_type_name("point").is_ok());
        assert!(validate_type_name("_money2").is_ok());
        assert!(validate_type_name("geo.point").is_ok());

        for bad in ["", "1point", "po int", "a.b.c", ".point", "point.", "p-t", "x;drop"] {
            assert_eq!(
                validate_type_name(bad),
                Err(CompositeError::InvalidTypeName(bad.to_string()))
            );
        }
        assert!(validate_type_name(&"a".repeat(64)).is_err());
    }
}

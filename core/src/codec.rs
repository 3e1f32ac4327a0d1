//! Decoding and encoding of composite literals against a [`TypeRegistry`].

use crate::composite_trace_codec;
use crate::error::{CastError, CompositeError, Result};
use crate::escape::{escape, needs_quotes, unescape};
use crate::parser::split_fields;
use crate::registry::TypeRegistry;
use crate::schema::{CompositeType, FieldDescriptor, TypeSchema};
use crate::value::{CompositeValue, FieldValue};
use std::sync::Arc;

const NULL_FIELD: &str = "NULL";

/// Moves values between composite literal text and [`CompositeValue`].
///
/// The codec borrows the registry it resolves type names through; it holds
/// no state of its own and is cheap to create per call site.
///
/// # Examples
///
/// ```
/// use drizzle_composite_core::{CompositeCodec, CompositeValue, TypeRegistry, TypeSchema};
///
/// let registry = TypeRegistry::<Option<String>>::new();
/// registry
///     .register(
///         TypeSchema::builder("pair")
///             .field("left", "text", |raw| Ok(Some(raw.to_string())))
///             .field("right", "text", |raw| Ok(Some(raw.to_string())))
///             .build(),
///     )
///     .unwrap();
///
/// let codec = CompositeCodec::new(&registry);
/// let value = CompositeValue::new([Some("a,b".to_string()), None]);
/// let literal = codec.encode("pair", &value).unwrap();
/// assert_eq!(literal, r#"("a,b",NULL)::pair"#);
/// assert_eq!(codec.decode("pair", &literal).unwrap(), value);
/// ```
#[derive(Debug)]
pub struct CompositeCodec<'r, V> {
    registry: &'r TypeRegistry<V>,
}

impl<V> Clone for CompositeCodec<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for CompositeCodec<'_, V> {}

impl<'r, V: FieldValue> CompositeCodec<'r, V> {
    pub fn new(registry: &'r TypeRegistry<V>) -> Self {
        Self { registry }
    }

    #[inline]
    pub fn registry(&self) -> &'r TypeRegistry<V> {
        self.registry
    }

    fn schema(&self, type_name: &str) -> Result<Arc<TypeSchema<V>>> {
        self.registry
            .lookup(type_name)
            .ok_or_else(|| CompositeError::UnknownType(type_name.to_string()))
    }

    /// Parses a composite literal into field values cast per the schema.
    ///
    /// A trailing `::type_name` annotation, as produced by [`encode`](Self::encode),
    /// is accepted and ignored.
    pub fn decode(&self, type_name: &str, raw: &str) -> Result<CompositeValue<V>> {
        let schema = self.schema(type_name)?;
        let literal = strip_annotation(raw, type_name);

        let tokens = split_fields(literal)?;
        if tokens.len() != schema.len() {
            return Err(CompositeError::FieldCountMismatch {
                type_name: type_name.to_string(),
                expected: schema.len(),
                found: tokens.len(),
            });
        }

        let value = tokens
            .into_iter()
            .zip(schema.fields())
            .map(|(token, field)| match unescape(token)? {
                None => Ok(V::null()),
                Some(text) => field.cast(&text).map_err(|source| CompositeError::Cast {
                    type_name: type_name.to_string(),
                    source,
                }),
            })
            .collect::<Result<CompositeValue<V>>>()?;

        composite_trace_codec!("decode", type_name, value.len());
        Ok(value)
    }

    /// Renders `value` as a composite literal with a `::type_name` annotation.
    ///
    /// NULL fields are written as a bare `NULL`; text is always quoted, and
    /// non-textual scalars are written bare when their text form allows it.
    pub fn encode(&self, type_name: &str, value: &CompositeValue<V>) -> Result<String> {
        let mut literal = self.encode_row(type_name, value)?;
        literal.push_str("::");
        literal.push_str(type_name);
        Ok(literal)
    }

    /// Renders `value` as a bare composite literal, `(f1,f2,...)`.
    ///
    /// Each non-NULL field's text is run through its field's caster first, so
    /// a value that would not decode back as the same kind fails with
    /// [`CompositeError::Cast`].
    pub fn encode_row(&self, type_name: &str, value: &CompositeValue<V>) -> Result<String> {
        let schema = self.schema(type_name)?;
        if value.len() != schema.len() {
            return Err(CompositeError::FieldCountMismatch {
                type_name: type_name.to_string(),
                expected: schema.len(),
                found: value.len(),
            });
        }

        let mut literal = String::from("(");
        for (i, (field, descriptor)) in value.iter().zip(schema.fields()).enumerate() {
            if !field.is_null() {
                check_field(field, descriptor).map_err(|source| CompositeError::Cast {
                    type_name: type_name.to_string(),
                    source,
                })?;
            }
            if i > 0 {
                literal.push(',');
            }
            encode_field(field, &mut literal);
        }
        literal.push(')');

        composite_trace_codec!("encode", type_name, value.len());
        Ok(literal)
    }

    /// Decodes straight into a typed composite.
    pub fn decode_as<T: CompositeType<V>>(&self, raw: &str) -> Result<T> {
        T::from_composite(self.decode(T::TYPE_NAME, raw)?)
    }

    /// Encodes a typed composite under its declared type name.
    pub fn encode_typed<T: CompositeType<V>>(&self, value: &T) -> Result<String> {
        self.encode(T::TYPE_NAME, &value.to_composite())
    }
}

fn check_field<V: FieldValue>(
    field: &V,
    descriptor: &FieldDescriptor<V>,
) -> std::result::Result<(), CastError> {
    let text = field.to_field_text();
    let recast = descriptor.cast(&text)?;
    if field.same_kind(&recast) {
        Ok(())
    } else {
        Err(CastError::new(text, format!("value is not of field type {}", descriptor.sql_type()))
            .at_field(descriptor.index()))
    }
}

fn encode_field<V: FieldValue>(field: &V, out: &mut String) {
    if field.is_null() {
        out.push_str(NULL_FIELD);
        return;
    }

    let text = field.to_field_text();
    if !field.is_textual() && !needs_quotes(&text) {
        out.push_str(&text);
    } else {
        out.push_str(&escape(&text));
    }
}

fn strip_annotation<'a>(raw: &'a str, type_name: &str) -> &'a str {
    raw.strip_suffix(type_name)
        .and_then(|rest| rest.strip_suffix("::"))
        .unwrap_or(raw)
}

//! Field values and decoded composite values.

use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::ops::Index;

/// A scalar value that can occupy one field of a composite.
///
/// Implemented by the dialect's value type; the codec only needs the NULL
/// sentinel and the external text form.
pub trait FieldValue: Clone + PartialEq + fmt::Debug {
    /// The SQL NULL value.
    fn null() -> Self;

    /// Returns true if this value is SQL NULL.
    fn is_null(&self) -> bool;

    /// The external text form written into a composite literal (unescaped).
    fn to_field_text(&self) -> Cow<'_, str>;

    /// Whether the text form is free-form text that must always be quoted.
    ///
    /// Numbers and booleans return false so they are written bare, e.g. `(3,-4)`.
    fn is_textual(&self) -> bool {
        true
    }

    /// Whether `recast`, this value's text run back through its field's
    /// caster, is the same kind of value as `self`.
    ///
    /// Encoding rejects fields that fail this check, since they would not
    /// decode back to what was written. The default accepts any recast.
    fn same_kind(&self, _recast: &Self) -> bool {
        true
    }
}

/// Plain optional text: the simplest field value, used where no scalar casting
/// is wanted.
impl FieldValue for Option<String> {
    fn null() -> Self {
        None
    }

    fn is_null(&self) -> bool {
        self.is_none()
    }

    fn to_field_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_deref().unwrap_or_default())
    }
}

/// Ordered field values of one composite, aligned with its type's schema.
///
/// A `CompositeValue` is self-contained: it keeps no reference to the registry
/// it was decoded through.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeValue<V> {
    fields: SmallVec<[V; 8]>,
}

impl<V> CompositeValue<V> {
    pub fn new(fields: impl IntoIterator<Item = V>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&V> {
        self.fields.get(index)
    }

    #[inline]
    pub fn fields(&self) -> &[V] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.fields.iter()
    }

    pub fn into_fields(self) -> Vec<V> {
        self.fields.into_vec()
    }
}

impl<V> FromIterator<V> for CompositeValue<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<V> Index<usize> for CompositeValue<V> {
    type Output = V;

    fn index(&self, index: usize) -> &V {
        &self.fields[index]
    }
}

impl<V> IntoIterator for CompositeValue<V> {
    type Item = V;
    type IntoIter = smallvec::IntoIter<[V; 8]>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a CompositeValue<V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

//! Core codec for PostgreSQL composite (row) types.
//!
//! Dialect independent: the field value type is a parameter, supplied by a
//! dialect crate such as `drizzle-composite-postgres`.

pub mod codec;
pub mod error;
pub mod escape;
pub mod parser;
pub mod registry;
pub mod schema;
pub mod tracing;
pub mod value;

// Re-export key types and traits
pub use codec::CompositeCodec;
pub use error::{CastError, CompositeError, Result};
pub use registry::{RegistryListener, TypeRegistry};
pub use schema::{Caster, CompositeType, FieldDescriptor, TypeSchema, TypeSchemaBuilder};
pub use value::{CompositeValue, FieldValue};

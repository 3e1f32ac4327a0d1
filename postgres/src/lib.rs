//! PostgreSQL support for drizzle-composite
//!
//! This crate binds the dialect-independent codec to PostgreSQL field values
//! and adds the pieces around it: the field type system, typed composites,
//! SQL literal quoting, DDL and row materialization.
//!
//! ```
//! use drizzle_composite_postgres::prelude::*;
//!
//! let registry = PgRegistry::new();
//! registry
//!     .register(PgSchemaBuilder::new("point").field("x", "integer").field("y", "integer").build()?)?;
//!
//! let codec = PgCodec::new(&registry);
//! let point = codec.decode("point", "(3,-4)")?;
//! assert_eq!(point[1], PostgresValue::Integer(-4));
//! assert_eq!(codec.encode("point", &point)?, "(3,-4)::point");
//! # Ok::<(), CompositeError>(())
//! ```

pub mod ddl;
pub mod field;
pub mod quote;
pub mod row;
pub mod typed;
pub mod values;

#[cfg(feature = "serde")]
pub mod config;

pub use drizzle_composite_core::{
    CastError, CompositeCodec, CompositeError, CompositeType, CompositeValue, FieldValue,
    RegistryListener, Result, TypeRegistry, TypeSchema,
};

/// Registry of composites with PostgreSQL field values
pub type PgRegistry = TypeRegistry<values::PostgresValue>;

/// Codec over a [`PgRegistry`]
pub type PgCodec<'r> = CompositeCodec<'r, values::PostgresValue>;

/// Common imports for working with PostgreSQL composite types.
pub mod prelude {
    pub use crate::composite_type;
    pub use crate::ddl::{ColumnOptions, ColumnTypes, CompositeTypeSql, TableBuilder};
    pub use crate::field::{PgFieldType, PgSchemaBuilder};
    pub use crate::quote::{Quotable, Quoter};
    pub use crate::row::{Cell, materialize, materialize_as, materialize_row};
    pub use crate::typed::PgField;
    pub use crate::values::PostgresValue;
    pub use crate::{PgCodec, PgRegistry};
    pub use drizzle_composite_core::{
        CastError, CompositeError, CompositeType, CompositeValue, FieldValue, RegistryListener,
    };

    #[cfg(feature = "serde")]
    pub use crate::config::{CompositeConfig, ConfigError};
}

//! # drizzle-composite
//!
//! PostgreSQL composite (row) types for Rust: register a type's fields once,
//! then move values between typed objects and the database's composite
//! literal text.
//!
//! ## Quick Start
//!
//! ```rust
//! use drizzle_composite::postgres::prelude::*;
//!
//! composite_type! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct Label: "label" {
//!         pub text: String,
//!         pub weight: Option<i32>,
//!     }
//! }
//!
//! # fn main() -> drizzle_composite::Result<()> {
//! let registry = PgRegistry::new();
//! registry.register_type::<Label>()?;
//!
//! let codec = PgCodec::new(&registry);
//! let label = Label { text: "a, (b)".into(), weight: None };
//! let literal = codec.encode_typed(&label)?;
//! assert_eq!(literal, r#"("a, (b)",NULL)::label"#);
//! assert_eq!(codec.decode_as::<Label>(&literal)?, label);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature        | Enables                                            |
//! |----------------|----------------------------------------------------|
//! | `tracing`      | debug/info events from the codec and registry      |
//! | `serde`        | TOML type configuration, `json`/`jsonb` fields     |
//! | `uuid`         | `uuid` fields                                      |
//! | `chrono`       | `date`, `time`, `timestamp`, `timestamptz` fields  |
//! | `rust-decimal` | `numeric` fields                                   |

// =============================================================================
// Root-level exports
// =============================================================================

/// Result type for composite operations
pub use drizzle_composite_core::Result;

/// Error types
pub mod error {
    pub use drizzle_composite_core::{CastError, CompositeError};
}

/// Dialect-independent codec, parser and registry.
///
/// # Module Structure
///
/// - **Grammar**: `escape` (single field tokens), `parser` (whole literals)
/// - **Schema**: `TypeSchema`, `FieldDescriptor`, `CompositeType`
/// - **Registry**: `TypeRegistry`, `RegistryListener`
/// - **Codec**: `CompositeCodec`
pub use drizzle_composite_core as core;

/// PostgreSQL field values, typed composites, quoting, DDL and row
/// materialization.
pub use drizzle_composite_postgres as postgres;

//! Declarative composite type configuration.
//!
//! ```toml
//! [[types]]
//! name = "point"
//! fields = [
//!     { name = "x", type = "integer" },
//!     { name = "y", type = "integer" },
//! ]
//! ```

use crate::PgRegistry;
use crate::field::PgSchemaBuilder;
use crate::values::PostgresValue;
use drizzle_composite_core::schema::validate_type_name;
use drizzle_composite_core::{CompositeError, TypeSchema};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Config types
// ============================================================================

/// A set of composite type declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositeConfig {
    #[serde(default)]
    pub types: Vec<CompositeTypeConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositeTypeConfig {
    pub name: String,
    pub fields: Vec<FieldConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: String,
}

// ============================================================================
// Config implementation
// ============================================================================

impl CompositeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Load from specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.into())
            } else {
                ConfigError::Io(path.into(), e)
            }
        })?;

        Self::from_toml_str(&content)
    }

    /// Builds every declared schema, failing on the first invalid type name or
    /// unsupported field type.
    pub fn to_schemas(&self) -> Result<Vec<TypeSchema<PostgresValue>>, ConfigError> {
        self.types
            .iter()
            .map(|ty| {
                validate_type_name(&ty.name)?;
                ty.fields
                    .iter()
                    .fold(PgSchemaBuilder::new(&ty.name), |builder, field| {
                        builder.field(&field.name, &field.sql_type)
                    })
                    .build()
                    .map_err(ConfigError::from)
            })
            .collect()
    }

    /// Registers every declared type; returns the number registered.
    ///
    /// All schemas are built before any is registered, so a bad declaration
    /// leaves the registry unchanged.
    pub fn register_all(&self, registry: &PgRegistry) -> Result<usize, ConfigError> {
        let schemas = self.to_schemas()?;
        let count = schemas.len();
        for schema in schemas {
            registry.register(schema)?;
        }
        Ok(count)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse composite config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error(transparent)]
    Composite(#[from] CompositeError),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const POINT: &str = r#"
        [[types]]
        name = "point"
        fields = [
            { name = "x", type = "integer" },
            { name = "y", type = "integer" },
        ]
    "#;

    #[test]
    fn parses_types() {
        let cfg = CompositeConfig::from_toml_str(POINT).unwrap();
        assert_eq!(cfg.types.len(), 1);
        assert_eq!(cfg.types[0].fields[1].sql_type, "integer");
    }

    #[test]
    fn registers_types() {
        let registry = PgRegistry::new();
        let cfg = CompositeConfig::from_toml_str(POINT).unwrap();
        assert_eq!(cfg.register_all(&registry).unwrap(), 1);
        assert_eq!(registry.lookup("point").unwrap().len(), 2);
    }

    #[test]
    fn unsupported_field_type_registers_nothing() {
        let registry = PgRegistry::new();
        let cfg = CompositeConfig::from_toml_str(
            r#"
            [[types]]
            name = "ok"
            fields = [{ name = "a", type = "text" }]

            [[types]]
            name = "bad"
            fields = [{ name = "b", type = "tsvector" }]
        "#,
        )
        .unwrap();

        let err = cfg.register_all(&registry).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Composite(CompositeError::UnsupportedFieldType { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn invalid_type_name_registers_nothing() {
        let registry = PgRegistry::new();
        let cfg = CompositeConfig::from_toml_str(
            r#"
            [[types]]
            name = "ok"
            fields = [{ name = "a", type = "text" }]

            [[types]]
            name = "bad name"
            fields = [{ name = "b", type = "integer" }]
        "#,
        )
        .unwrap();

        let err = cfg.register_all(&registry).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Composite(CompositeError::InvalidTypeName(ref name)) if name == "bad name"
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = CompositeConfig::from_toml_str("[[types]]\nname = \"p\"\nfields = []\nextra = 1\n");
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file() {
        let err = CompositeConfig::load_from(Path::new("/nonexistent/composite.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}

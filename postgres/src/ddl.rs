//! DDL for composite types and the tables that use them.
//!
//! [`TableBuilder`] declares columns by type name; composite columns are
//! checked against a [`ColumnTypes`] set kept in sync with the registry.
//! [`CompositeTypeSql`] renders `CREATE TYPE ... AS (...)` for a schema.

use drizzle_composite_core::{CompositeError, RegistryListener, Result, TypeRegistry, TypeSchema};
use hashbrown::HashSet;
use parking_lot::RwLock;
use std::sync::Arc;

// =============================================================================
// Identifiers
// =============================================================================

/// Renders `schema.name` as quoted identifiers, dropping the `public` prefix.
fn qualified(schema: &str, name: &str) -> String {
    if schema != "public" {
        format!("\"{}\".\"{}\"", schema, name)
    } else {
        format!("\"{}\"", name)
    }
}

/// Renders a possibly schema-qualified type name as quoted identifiers.
pub(crate) fn qualified_type_name(type_name: &str) -> String {
    match type_name.split_once('.') {
        Some((schema, name)) => qualified(schema, name),
        None => qualified("public", type_name),
    }
}

// =============================================================================
// Column Options
// =============================================================================

/// Constraints attached to one column definition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnOptions {
    pub not_null: bool,
    pub default: Option<String>,
    pub primary: bool,
    pub unique: bool,
}

impl ColumnOptions {
    #[must_use]
    pub fn new() -> Self {
        Default::default()
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Sets the `DEFAULT` expression, written verbatim.
    #[must_use]
    pub fn default(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    #[must_use]
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// One column of a [`TableBuilder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    /// SQL type as rendered in the column definition
    pub sql_type: String,
    pub options: ColumnOptions,
}

impl ColumnDef {
    /// Generate the column definition SQL (without leading/trailing punctuation)
    pub fn to_column_sql(&self) -> String {
        let mut sql = format!("\"{}\" {}", self.name, self.sql_type);

        if self.options.primary {
            sql.push_str(" PRIMARY KEY");
        }

        if let Some(default) = &self.options.default {
            sql.push_str(&format!(" DEFAULT {}", default));
        }

        if self.options.not_null {
            sql.push_str(" NOT NULL");
        }

        if self.options.unique {
            sql.push_str(" UNIQUE");
        }

        sql
    }
}

// =============================================================================
// Registered Column Types
// =============================================================================

/// Composite type names usable as column types.
///
/// Kept current by subscribing to a [`TypeRegistry`]; registering a type
/// makes it available to [`TableBuilder::composite`] without further wiring.
#[derive(Debug, Default)]
pub struct ColumnTypes {
    names: RwLock<HashSet<String>>,
}

impl ColumnTypes {
    /// Creates a set that follows `registry`, seeded with its current types.
    pub fn subscribe_to<V>(registry: &TypeRegistry<V>) -> Arc<Self> {
        let types = Arc::new(Self::default());
        registry.subscribe(types.clone());
        types
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.names.read().contains(type_name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.read().iter().cloned().collect();
        names.sort();
        names
    }
}

impl RegistryListener for ColumnTypes {
    fn on_register(&self, type_name: &str) {
        self.names.write().insert(type_name.to_string());
    }

    fn on_unregister(&self, type_name: &str) {
        self.names.write().remove(type_name);
    }
}

// =============================================================================
// Table Builder
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TableMode {
    Create,
    Change,
}

/// Builds `CREATE TABLE` or `ALTER TABLE ... ADD COLUMN` statements.
///
/// # Examples
///
/// ```
/// use drizzle_composite_postgres::prelude::*;
///
/// let registry = PgRegistry::new();
/// let types = ColumnTypes::subscribe_to(&registry);
/// registry
///     .register(PgSchemaBuilder::new("point").field("x", "integer").field("y", "integer").build().unwrap())
///     .unwrap();
///
/// let sql = TableBuilder::create("shapes", &types)
///     .column("id", "integer", ColumnOptions::new().primary())
///     .composite(["origin"], "point", ColumnOptions::new().not_null())
///     .unwrap()
///     .to_sql();
/// assert_eq!(
///     sql,
///     "CREATE TABLE \"shapes\" (\n\t\"id\" integer PRIMARY KEY,\n\t\"origin\" \"point\" NOT NULL\n);"
/// );
/// ```
#[derive(Clone, Debug)]
pub struct TableBuilder<'t> {
    schema: String,
    name: String,
    mode: TableMode,
    columns: Vec<ColumnDef>,
    types: &'t ColumnTypes,
}

impl<'t> TableBuilder<'t> {
    /// Starts a `CREATE TABLE` statement.
    pub fn create(name: impl Into<String>, types: &'t ColumnTypes) -> Self {
        Self::with_mode(name.into(), TableMode::Create, types)
    }

    /// Starts `ALTER TABLE ... ADD COLUMN` statements for an existing table.
    pub fn change(name: impl Into<String>, types: &'t ColumnTypes) -> Self {
        Self::with_mode(name.into(), TableMode::Change, types)
    }

    fn with_mode(name: String, mode: TableMode, types: &'t ColumnTypes) -> Self {
        Self {
            schema: "public".to_string(),
            name,
            mode,
            columns: Vec::new(),
            types,
        }
    }

    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Adds a column of any SQL type. Registered composite type names are
    /// rendered as quoted identifiers; other types are written verbatim.
    #[must_use]
    pub fn column(
        mut self,
        name: impl Into<String>,
        sql_type: &str,
        options: ColumnOptions,
    ) -> Self {
        let sql_type = if self.types.contains(sql_type) {
            qualified_type_name(sql_type)
        } else {
            sql_type.to_string()
        };
        self.columns.push(ColumnDef {
            name: name.into(),
            sql_type,
            options,
        });
        self
    }

    /// Adds one column per name, all of the registered composite `type_name`.
    ///
    /// Fails with [`CompositeError::UnknownType`] when the type is not
    /// registered.
    pub fn composite<I, S>(self, names: I, type_name: &str, options: ColumnOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.types.contains(type_name) {
            return Err(CompositeError::UnknownType(type_name.to_string()));
        }

        Ok(names.into_iter().fold(self, |builder, name| {
            builder.column(name, type_name, options.clone())
        }))
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Renders the statement(s) for the declared columns.
    pub fn to_sql(&self) -> String {
        let table = qualified(&self.schema, &self.name);
        match self.mode {
            TableMode::Create => {
                let lines = self
                    .columns
                    .iter()
                    .map(|column| format!("\t{}", column.to_column_sql()))
                    .collect::<Vec<_>>()
                    .join(",\n");
                format!("CREATE TABLE {} (\n{}\n);", table, lines)
            }
            TableMode::Change => self
                .columns
                .iter()
                .map(|column| format!("ALTER TABLE {} ADD COLUMN {};", table, column.to_column_sql()))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

// =============================================================================
// Composite Type SQL
// =============================================================================

/// `CREATE TYPE` / `DROP TYPE` rendering for a registered schema.
#[derive(Debug)]
pub struct CompositeTypeSql<'a, V> {
    schema: &'a TypeSchema<V>,
}

impl<'a, V> CompositeTypeSql<'a, V> {
    pub fn new(schema: &'a TypeSchema<V>) -> Self {
        Self { schema }
    }

    fn type_name(&self) -> String {
        let (schema, name) = self.schema.qualified_name();
        qualified(schema, name)
    }

    /// Generate CREATE TYPE ... AS (...) SQL
    pub fn create_type_sql(&self) -> String {
        let fields = self
            .schema
            .fields()
            .iter()
            .map(|field| format!("\"{}\" {}", field.name(), field.sql_type()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TYPE {} AS ({});", self.type_name(), fields)
    }

    /// Generate DROP TYPE SQL
    pub fn drop_type_sql(&self) -> String {
        format!("DROP TYPE {};", self.type_name())
    }
}

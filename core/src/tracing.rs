//! Tracing utilities for composite codec and registry observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event for a codec operation.
///
/// ```ignore
/// composite_trace_codec!("decode", type_name, fields.len());
/// ```
#[macro_export]
macro_rules! composite_trace_codec {
    ($op:literal, $type_name:expr, $field_count:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(
            op = $op,
            type_name = %$type_name,
            fields = $field_count,
            "drizzle.composite.codec"
        );
    };
}

/// Emit an info-level tracing event for registry changes (register, unregister).
///
/// ```ignore
/// composite_trace_registry!("register", type_name);
/// ```
#[macro_export]
macro_rules! composite_trace_registry {
    ($event:literal, $type_name:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!(event = $event, type_name = %$type_name, "drizzle.composite.registry");
    };
}

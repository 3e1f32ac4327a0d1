//! Registry of composite type schemas.
//!
//! The registry is an explicit value: construct one per process or connection
//! and pass it to the codec, quoting layer and migration builder. Lookups take
//! a shared lock and hand out `Arc` clones, so a concurrent re-registration
//! never exposes a schema mid-update.
//!
//! Writes (register, unregister, subscribe) are serialized together with the
//! listener notifications they trigger, so every listener sees changes in the
//! order the map saw them.

use crate::error::{CompositeError, Result};
use crate::schema::{CompositeType, TypeSchema, validate_type_name};
use crate::value::FieldValue;
use crate::composite_trace_registry;
use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;

/// Observer notified when type names enter or leave a registry.
///
/// Collaborators that expose per-type behavior (column helpers, quote targets)
/// subscribe instead of being patched at registration time. Callbacks run while
/// the registry's writer lock is held: they may read the registry but must not
/// register, unregister or subscribe.
pub trait RegistryListener: Send + Sync {
    fn on_register(&self, _type_name: &str) {}

    fn on_unregister(&self, _type_name: &str) {}
}

/// Maps type names to their [`TypeSchema`].
pub struct TypeRegistry<V> {
    schemas: RwLock<HashMap<String, Arc<TypeSchema<V>>>>,
    listeners: RwLock<Vec<Arc<dyn RegistryListener>>>,
    // held across a map mutation and its notifications
    writer: Mutex<()>,
}

impl<V> TypeRegistry<V> {
    pub fn new() -> Self {
        Self {
            schemas: RwLock::new(HashMap::new()),
            listeners: RwLock::new(Vec::new()),
            writer: Mutex::new(()),
        }
    }

    /// Adds a listener for future registrations and removals.
    ///
    /// The listener first receives `on_register` for every type already
    /// registered, in sorted order, so it never misses or reorders a change.
    pub fn subscribe(&self, listener: Arc<dyn RegistryListener>) {
        let _writer = self.writer.lock();
        for type_name in self.type_names() {
            listener.on_register(&type_name);
        }
        self.listeners.write().push(listener);
    }

    fn listeners(&self) -> Vec<Arc<dyn RegistryListener>> {
        self.listeners.read().clone()
    }

    /// Inserts or replaces the schema for its type name.
    ///
    /// Replacing a schema affects later lookups only; values decoded earlier
    /// are untouched.
    pub fn register(&self, schema: TypeSchema<V>) -> Result<()> {
        validate_type_name(schema.type_name())?;
        let type_name = schema.type_name().to_string();

        let _writer = self.writer.lock();
        self.schemas
            .write()
            .insert(type_name.clone(), Arc::new(schema));
        composite_trace_registry!("register", type_name);

        for listener in self.listeners() {
            listener.on_register(&type_name);
        }
        Ok(())
    }

    /// Removes a type; returns false (and does nothing) if it was not registered.
    pub fn unregister(&self, type_name: &str) -> bool {
        let _writer = self.writer.lock();
        let removed = self.schemas.write().remove(type_name).is_some();
        if !removed {
            return false;
        }
        composite_trace_registry!("unregister", type_name);

        for listener in self.listeners() {
            listener.on_unregister(type_name);
        }
        true
    }

    /// Removes several types, returning how many were actually registered.
    pub fn unregister_many<I, S>(&self, type_names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        type_names
            .into_iter()
            .filter(|name| self.unregister(name.as_ref()))
            .count()
    }

    /// Removes every registered type.
    pub fn clear(&self) {
        let names = self.type_names();
        self.unregister_many(names);
    }

    /// Returns the schema for `type_name`, or `None` if it is not a custom type.
    pub fn lookup(&self, type_name: &str) -> Option<Arc<TypeSchema<V>>> {
        self.schemas.read().get(type_name).cloned()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.schemas.read().contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }
}

impl<V: FieldValue> TypeRegistry<V> {
    /// Registers the schema declared by a typed composite.
    ///
    /// Fails with [`CompositeError::InvalidTypeName`] when the schema's name
    /// differs from `T::TYPE_NAME`, since typed decoding looks types up by the
    /// latter.
    pub fn register_type<T: CompositeType<V>>(&self) -> Result<()> {
        let schema = T::schema();
        if schema.type_name() != T::TYPE_NAME {
            return Err(CompositeError::InvalidTypeName(schema.type_name().to_string()));
        }
        self.register(schema)
    }
}

impl<V> Default for TypeRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for TypeRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.type_names())
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Registry = TypeRegistry<Option<String>>;

    fn schema(name: &str, fields: usize) -> TypeSchema<Option<String>> {
        (0..fields)
            .fold(TypeSchema::builder(name), |b, i| {
                b.field(format!("f{i}"), "text", |raw| Ok(Some(raw.to_string())))
            })
            .build()
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl RegistryListener for Recorder {
        fn on_register(&self, type_name: &str) {
            self.events.lock().push(format!("+{type_name}"));
        }

        fn on_unregister(&self, type_name: &str) {
            self.events.lock().push(format!("-{type_name}"));
        }
    }

    #[test]
    fn register_and_lookup() {
        let registry = Registry::new();
        assert!(registry.lookup("point").is_none());

        registry.register(schema("point", 2)).unwrap();
        let found = registry.lookup("point").unwrap();
        assert_eq!(found.len(), 2);
        assert!(registry.contains("point"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn reregister_replaces_schema_without_touching_held_arcs() {
        let registry = Registry::new();
        registry.register(schema("point", 2)).unwrap();
        let old = registry.lookup("point").unwrap();

        registry.register(schema("point", 3)).unwrap();
        assert_eq!(registry.lookup("point").unwrap().len(), 3);
        assert_eq!(old.len(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_is_idempotent() {
        let registry = Registry::new();
        assert!(!registry.unregister("never"));

        registry.register(schema("point", 2)).unwrap();
        assert!(registry.unregister("point"));
        assert!(!registry.unregister("point"));
        assert!(registry.lookup("point").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn invalid_names_are_rejected() {
        let registry = Registry::new();
        assert!(registry.register(schema("bad name", 1)).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn listeners_see_changes() {
        let registry = Registry::new();
        let recorder = Arc::new(Recorder::default());
        registry.subscribe(recorder.clone());

        registry.register(schema("a", 1)).unwrap();
        registry.register(schema("b", 1)).unwrap();
        registry.unregister("a");
        registry.unregister("missing");
        registry.clear();

        assert_eq!(*recorder.events.lock(), vec!["+a", "+b", "-a", "-b"]);
    }

    /// Blocks in `on_register` after signalling that it was entered.
    struct SlowListener {
        entered: Mutex<std::sync::mpsc::Sender<()>>,
        inner: Recorder,
    }

    impl RegistryListener for SlowListener {
        fn on_register(&self, type_name: &str) {
            self.inner.on_register(type_name);
            let _ = self.entered.lock().send(());
            std::thread::sleep(std::time::Duration::from_millis(100));
        }

        fn on_unregister(&self, type_name: &str) {
            self.inner.on_unregister(type_name);
        }
    }

    #[test]
    fn unregister_waits_for_register_notifications() {
        let registry = Arc::new(Registry::new());
        let (tx, rx) = std::sync::mpsc::channel();
        let listener = Arc::new(SlowListener {
            entered: Mutex::new(tx),
            inner: Recorder::default(),
        });
        registry.subscribe(listener.clone());

        let writer = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || registry.register(schema("point", 2)).unwrap())
        };

        rx.recv().unwrap();
        assert!(registry.unregister("point"));
        writer.join().unwrap();

        assert!(!registry.contains("point"));
        assert_eq!(*listener.inner.events.lock(), vec!["+point", "-point"]);
    }

    #[test]
    fn subscribe_replays_existing_types() {
        let registry = Registry::new();
        registry.register(schema("b", 1)).unwrap();
        registry.register(schema("a", 1)).unwrap();

        let recorder = Arc::new(Recorder::default());
        registry.subscribe(recorder.clone());
        registry.unregister("a");

        assert_eq!(*recorder.events.lock(), vec!["+a", "+b", "-a"]);
    }

    struct Misnamed;

    impl CompositeType<Option<String>> for Misnamed {
        const TYPE_NAME: &'static str = "point";

        fn schema() -> TypeSchema<Option<String>> {
            schema("pointe", 1)
        }

        fn from_composite(_value: crate::value::CompositeValue<Option<String>>) -> Result<Self> {
            Ok(Misnamed)
        }

        fn to_composite(&self) -> crate::value::CompositeValue<Option<String>> {
            crate::value::CompositeValue::new([None])
        }
    }

    #[test]
    fn register_type_rejects_mismatched_schema_name() {
        let registry = Registry::new();
        assert_eq!(
            registry.register_type::<Misnamed>(),
            Err(CompositeError::InvalidTypeName("pointe".into()))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_many_counts_removed() {
        let registry = Registry::new();
        registry.register(schema("a", 1)).unwrap();
        registry.register(schema("b", 1)).unwrap();

        assert_eq!(registry.unregister_many(["a", "zzz", "b"]), 2);
        assert!(registry.type_names().is_empty());
    }

    #[test]
    fn concurrent_lookups_during_registration() {
        let registry = Arc::new(Registry::new());
        registry.register(schema("point", 2)).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        if i == 0 {
                            registry.register(schema("point", 3)).unwrap();
                            registry.register(schema("point", 2)).unwrap();
                        } else {
                            let found = registry.lookup("point").unwrap();
                            assert!(found.len() == 2 || found.len() == 3);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}

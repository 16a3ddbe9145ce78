//! Thread-safe registry of reflected types and named functions.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;

use super::{Method, Reflect, Reflection, TypeInfo};
use crate::callable::Function;

#[derive(Default)]
struct Entries {
    types: HashMap<String, TypeInfo>,
    names: HashMap<TypeId, String>,
    functions: HashMap<String, Function>,
}

impl Entries {
    /// Drop `name` as the reverse mapping of `type_id`.
    ///
    /// Falls back to another name the type is still registered under.
    fn release_name(&mut self, type_id: TypeId, name: &str) {
        if self.names.get(&type_id).is_none_or(|current| current != name) {
            return;
        }
        let remaining = self
            .types
            .values()
            .filter(|info| info.type_id() == type_id)
            .map(|info| info.name().to_string())
            .min();
        match remaining {
            Some(other) => self.names.insert(type_id, other),
            None => self.names.remove(&type_id),
        };
    }
}

/// Registry for types and free functions that callbacks may name.
///
/// Entries can be added and removed at any time; handlers that refer to
/// them by name see the change on their next call.
#[derive(Default)]
pub struct TypeRegistry {
    entries: RwLock<Entries>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type that describes itself.
    ///
    /// Returns the entry previously registered under the same name.
    pub fn register<T: Reflect>(&self) -> Option<TypeInfo> {
        self.register_info(T::type_info())
    }

    /// Register a hand-built type entry.
    ///
    /// Returns the entry previously registered under the same name.
    pub fn register_info(&self, info: TypeInfo) -> Option<TypeInfo> {
        let mut entries = self.entries.write();
        let name = info.name().to_string();
        let type_id = info.type_id();
        entries.names.insert(type_id, name.clone());
        let replaced = entries.types.insert(name.clone(), info);
        if let Some(old) = &replaced
            && old.type_id() != type_id
        {
            entries.release_name(old.type_id(), &name);
        }
        replaced
    }

    /// Unregister a type by name.
    pub fn unregister(&self, name: &str) -> Option<TypeInfo> {
        let mut entries = self.entries.write();
        let removed = entries.types.remove(name)?;
        entries.release_name(removed.type_id(), name);
        Some(removed)
    }

    /// Register a free function under `name`.
    pub fn register_function(&self, name: impl Into<String>, function: Function) -> Option<Function> {
        self.entries.write().functions.insert(name.into(), function)
    }

    /// Unregister a free function by name.
    pub fn unregister_function(&self, name: &str) -> Option<Function> {
        self.entries.write().functions.remove(name)
    }

    /// Get a copy of a type's entry.
    #[must_use]
    pub fn type_info(&self, name: &str) -> Option<TypeInfo> {
        self.entries.read().types.get(name).cloned()
    }

    /// List all registered type names, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.entries.read().types.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Get the count of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().types.len()
    }

    /// Check if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().types.is_empty()
    }
}

impl Reflection for TypeRegistry {
    fn has_type(&self, type_name: &str) -> bool {
        self.entries.read().types.contains_key(type_name)
    }

    fn method(&self, type_name: &str, method: &str) -> Option<Method> {
        self.entries
            .read()
            .types
            .get(type_name)
            .and_then(|info| info.method(method))
            .cloned()
    }

    fn type_name_of(&self, type_id: TypeId) -> Option<String> {
        self.entries.read().names.get(&type_id).cloned()
    }

    fn function(&self, name: &str) -> Option<Function> {
        self.entries.read().functions.get(name).cloned()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read();
        let mut types: Vec<_> = entries.types.keys().collect();
        types.sort_unstable();
        let mut functions: Vec<_> = entries.functions.keys().collect();
        functions.sort_unstable();
        f.debug_struct("TypeRegistry")
            .field("types", &types)
            .field("functions", &functions)
            .finish()
    }
}

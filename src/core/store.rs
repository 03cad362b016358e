//! SV-002: Variable store: the name → value table placeholders read from.

use super::error::{VarError, VarResult};
use super::resolver::Resolver;
use crate::functions::{builtins, FunctionTable};
use indexmap::IndexMap;

/// Owned name → value table. Values are always text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    entries: IndexMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new variable. Fails if `name` is already defined.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> VarResult<()> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(VarError::duplicate(&name));
        }
        self.entries.insert(name, value.into());
        Ok(())
    }

    /// Set a variable whether or not it exists.
    pub fn replace(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    /// `add` each pair in order, stopping at the first duplicate.
    /// Pairs added before the failure stay in the store.
    pub fn add_all<I, K, V>(&mut self, pairs: I) -> VarResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in pairs {
            self.add(name, value)?;
        }
        Ok(())
    }

    /// Bulk import of the process environment.
    pub fn add_env(&mut self) -> VarResult<()> {
        self.add_all(std::env::vars())
    }

    /// Insert only the pairs whose names are not yet defined.
    /// Returns how many were added.
    pub fn add_missing<I, K, V>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut added = 0;
        for (name, value) in pairs {
            let name = name.into();
            if !self.entries.contains_key(&name) {
                self.entries.insert(name, value.into());
                added += 1;
            }
        }
        added
    }

    /// Environment import that leaves existing definitions untouched.
    pub fn add_env_missing(&mut self) -> usize {
        self.add_missing(std::env::vars())
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Resolve `text` against this store and the builtin functions.
    pub fn resolve(&self, text: &str) -> VarResult<String> {
        self.resolve_with(text, builtins())
    }

    /// Resolve `text` against this store and a caller-supplied function table.
    pub fn resolve_with(&self, text: &str, functions: &FunctionTable) -> VarResult<String> {
        Resolver::new(self, functions).resolve(text)
    }
}

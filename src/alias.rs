//! Path alias registry
//!
//! An alias is a short symbolic name (e.g. `@web`) standing in for a longer
//! path (a filesystem path, a URL prefix, etc.). Alias names:
//! - Must start with `@`
//! - May be followed by a `/`-delimited suffix at lookup time, which is
//!   appended verbatim to the resolved value
//!
//! The registry is an explicit value owned by the application. Hosts that
//! want one registry visible everywhere wrap it in [`SharedAliases`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::CoreError;

/// Registry mapping alias names to path strings
#[derive(Debug, Default, Clone)]
pub struct AliasRegistry {
    aliases: HashMap<String, String>,
}

impl AliasRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path alias, overwriting any previous value.
    ///
    /// # Errors
    /// * `InvalidArgument` if `alias` does not start with `@`
    pub fn set(&mut self, alias: &str, path: &str) -> Result<(), CoreError> {
        if !alias.starts_with('@') {
            return Err(CoreError::invalid("alias must start with the @ character"));
        }

        debug!(alias, path, "alias registered");
        self.aliases.insert(alias.to_string(), path.to_string());
        Ok(())
    }

    /// Translate a path alias into an actual path.
    ///
    /// Input not starting with `@` is treated as a literal path and returned
    /// unchanged. Otherwise the segment before the first `/` is looked up and
    /// the remainder, if any, is appended verbatim to the stored value.
    ///
    /// Returns `None` when the root alias is not registered. An unregistered
    /// alias is not an error; callers decide whether to fall back.
    pub fn resolve(&self, path: &str) -> Option<String> {
        if !path.starts_with('@') {
            return Some(path.to_string());
        }

        let (root, suffix) = match path.find('/') {
            Some(pos) => (&path[..pos], &path[pos..]),
            None => (path, ""),
        };

        self.aliases
            .get(root)
            .map(|base| format!("{}{}", base, suffix))
    }

    /// Check whether an alias root is registered
    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }

    /// Number of registered aliases
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Remove all registered aliases.
    ///
    /// Intended for test isolation and reinitialization, not for steady-state
    /// use.
    pub fn reset(&mut self) {
        self.aliases.clear();
    }
}

/// A lock-guarded alias registry for hosts that share one registry across
/// components.
///
/// Populate during startup, then treat as read-mostly; `resolve` takes a read
/// lock only.
#[derive(Debug, Default)]
pub struct SharedAliases {
    inner: RwLock<AliasRegistry>,
}

impl SharedAliases {
    /// Create a new shared registry wrapped in an `Arc`
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// See [`AliasRegistry::set`]
    pub fn set(&self, alias: &str, path: &str) -> Result<(), CoreError> {
        self.inner.write().set(alias, path)
    }

    /// See [`AliasRegistry::resolve`]
    pub fn resolve(&self, path: &str) -> Option<String> {
        self.inner.read().resolve(path)
    }

    /// See [`AliasRegistry::reset`]
    pub fn reset(&self) {
        self.inner.write().reset();
    }
}

//! Data-model binding and validation
//!
//! A model's bindable attributes are its declared [`Fields`]. Validation
//! never raises: rule violations accumulate as named messages in a
//! [`ValidationErrors`] map inspected through `is_valid` / `errors`.

use std::collections::HashMap;

use crate::fields::{Fields, PropertyMap};

/// Named validation messages for one model instance
#[derive(Debug, Default, Clone)]
pub struct ValidationErrors {
    errors: HashMap<String, String>,
}

impl ValidationErrors {
    /// Create an empty error map
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a message under `name`, overwriting any previous message
    pub fn set(&mut self, name: &str, message: &str) {
        self.errors.insert(name.to_string(), message.to_string());
    }

    /// Message stored under `name`, if any
    pub fn get(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    /// Check whether a message is stored under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.errors.contains_key(name)
    }

    /// Whether no messages are stored
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of stored messages
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Remove all messages
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Iterate over (name, message) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Validate-then-check contract for bindable data models.
///
/// Implementors store a [`ValidationErrors`] and override [`Model::validate`]
/// to report rule violations through it. The error map is cleared at the
/// start of every `is_valid` call, so a re-validation pass never inherits
/// stale entries from a previous one.
pub trait Model: Fields {
    /// The instance's error map
    fn errors(&self) -> &ValidationErrors;

    /// Mutable access to the instance's error map
    fn errors_mut(&mut self) -> &mut ValidationErrors;

    /// Validation hook; the default accepts everything.
    ///
    /// Overrides report violations with `self.errors_mut().set(name, msg)`.
    fn validate(&mut self) {}

    /// Bind external input onto the model's declared fields; unmatched keys
    /// are ignored
    fn bind(&mut self, data: &PropertyMap) {
        self.apply_fields(data);
    }

    /// Current values of all declared fields
    fn to_map(&self) -> PropertyMap {
        self.field_values()
    }

    /// Run validation and report whether the model passed.
    ///
    /// Each call re-runs `validate` against a cleared error map.
    fn is_valid(&mut self) -> bool {
        self.errors_mut().clear();
        self.validate();
        self.errors().is_empty()
    }
}

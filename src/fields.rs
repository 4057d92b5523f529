//! Field binding for configurable objects
//!
//! Property values are JSON-compatible (`serde_json::Value`), matching the
//! descriptors the object factory consumes. Each configurable type declares
//! its bindable fields by implementing [`Fields`] by hand; there is no
//! runtime introspection.

use std::collections::HashMap;

/// Properties are JSON-compatible key-value pairs
pub type PropertyMap = HashMap<String, serde_json::Value>;

/// A type whose public fields can be assigned from a [`PropertyMap`].
///
/// Implementations assign every key that names one of the type's declared
/// fields and silently ignore the rest. Ignoring unmatched keys is part of
/// the contract, not a validation failure: callers may pass a map that
/// configures several objects at once.
pub trait Fields {
    /// Assign matching keys from `data` onto the object's fields
    fn apply_fields(&mut self, data: &PropertyMap);

    /// Current values of all declared fields
    fn field_values(&self) -> PropertyMap;
}

/// Configure an object's fields from a key-value map.
///
/// Standalone form of the factory's post-construction step; keys that match
/// no declared field are ignored.
pub fn configure_object<T: Fields + ?Sized>(object: &mut T, data: &PropertyMap) {
    object.apply_fields(data);
}

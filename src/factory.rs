//! Generic object construction from descriptors
//!
//! A descriptor names a registered component type and optionally carries
//! positional constructor arguments plus a property map applied after
//! construction. Type names follow the same naming rules everywhere:
//! - Start with a letter or underscore
//! - Then letters, digits, underscores and hyphens
//!
//! The factory never caches: every `create` call constructs a fresh
//! instance, so distinct constructor arguments per call always take effect.

use std::any::Any;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::CoreError;
use crate::fields::{Fields, PropertyMap};

/// Type name pattern: starts with a letter or underscore, then alphanumeric,
/// underscores and hyphens
static TYPE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").unwrap());

/// Check that a string is a well-formed component type name
pub fn validate_type_name(name: &str) -> Result<(), CoreError> {
    if TYPE_NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(CoreError::invalid(format!(
            "'{}' is not a valid component type name",
            name
        )))
    }
}

/// An object the factory can build and configure.
///
/// `Any` access allows callers to downcast a built instance back to its
/// concrete type.
pub trait Component: Fields + Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A construction recipe: a type name, optional positional constructor
/// arguments, and a map of field values applied after construction.
///
/// Deserializes from either a bare type name string or a map:
///
/// ```toml
/// view = "view"
///
/// [clock]
/// class = "date-time"
/// construct = ["2019-03-01"]
/// format = "%Y"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Descriptor {
    /// Bare type name, default construction, no properties
    Type(String),
    /// Full map form; `class` is required but validated at build time so a
    /// malformed map is reported as an invalid argument rather than a
    /// deserialization failure
    Spec {
        class: Option<String>,
        #[serde(default)]
        construct: Vec<Value>,
        #[serde(flatten)]
        properties: PropertyMap,
    },
}

impl Descriptor {
    /// Descriptor for default construction of a named type
    pub fn of(class: &str) -> Self {
        Descriptor::Type(class.to_string())
    }

    /// Descriptor with constructor arguments and properties
    pub fn spec(class: &str, construct: Vec<Value>, properties: PropertyMap) -> Self {
        Descriptor::Spec {
            class: Some(class.to_string()),
            construct,
            properties,
        }
    }

    /// The descriptor's type name.
    ///
    /// # Errors
    /// * `InvalidArgument` if the map form carries no `class` key or the
    ///   name is not a well-formed type name
    pub fn class_name(&self) -> Result<&str, CoreError> {
        let name = match self {
            Descriptor::Type(name) => name,
            Descriptor::Spec { class: Some(name), .. } => name,
            Descriptor::Spec { class: None, .. } => {
                return Err(CoreError::invalid("descriptor has no 'class' key"));
            }
        };
        validate_type_name(name)?;
        Ok(name)
    }

    /// Positional constructor arguments (empty in the bare-name form)
    pub fn construct_args(&self) -> &[Value] {
        match self {
            Descriptor::Type(_) => &[],
            Descriptor::Spec { construct, .. } => construct,
        }
    }

    /// Property map applied after construction (empty in the bare-name form)
    pub fn properties(&self) -> Option<&PropertyMap> {
        match self {
            Descriptor::Type(_) => None,
            Descriptor::Spec { properties, .. } => Some(properties),
        }
    }
}

/// Builder callback constructing a component from positional arguments
pub type Builder = Box<dyn Fn(&[Value]) -> Result<Box<dyn Component>, CoreError>>;

/// Registry of named component builders
#[derive(Default)]
pub struct ObjectFactory {
    builders: HashMap<String, Builder>,
}

impl ObjectFactory {
    /// Create an empty factory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder under a type name, overwriting any previous one.
    ///
    /// # Errors
    /// * `InvalidArgument` if `name` is not a well-formed type name
    pub fn register<F>(&mut self, name: &str, builder: F) -> Result<(), CoreError>
    where
        F: Fn(&[Value]) -> Result<Box<dyn Component>, CoreError> + 'static,
    {
        validate_type_name(name)?;
        debug!(name, "component type registered");
        self.builders.insert(name.to_string(), Box::new(builder));
        Ok(())
    }

    /// Check whether a type name has a registered builder
    pub fn is_registered(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    /// Build and configure a component from a descriptor.
    ///
    /// Construction and configuration either fully succeed or abort with an
    /// error; no partially-configured instance is ever returned.
    ///
    /// # Errors
    /// * `InvalidArgument` if the descriptor has no type name, the name is
    ///   malformed, or no builder is registered under it
    /// * Whatever the builder itself raises for bad constructor arguments
    pub fn create(&self, descriptor: &Descriptor) -> Result<Box<dyn Component>, CoreError> {
        let name = descriptor.class_name()?;

        let builder = self.builders.get(name).ok_or_else(|| {
            CoreError::invalid(format!("unknown component type '{}'", name))
        })?;

        let mut object = builder(descriptor.construct_args())?;

        if let Some(properties) = descriptor.properties() {
            object.apply_fields(properties);
        }

        debug!(class = name, "component built");
        Ok(object)
    }
}

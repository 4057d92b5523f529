//! Configuration-driven setup
//!
//! Loads alias definitions and component descriptors from a TOML file,
//! overridable through `ARMATURE_`-prefixed environment variables, so an
//! application can declare its object graph in configuration:
//!
//! ```toml
//! [aliases]
//! "@web" = "/var/www"
//!
//! [components.clock]
//! class = "date-time"
//! construct = ["2019-03-01"]
//! ```

use std::collections::HashMap;
use std::path::Path;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;
use tracing::debug;

use crate::alias::AliasRegistry;
use crate::error::CoreError;
use crate::factory::{Component, Descriptor, ObjectFactory};

/// Declarative aliases and component descriptors
#[derive(Debug, Default, Deserialize)]
pub struct ComponentsConfig {
    /// Alias name to path value
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    /// Component name to construction descriptor
    #[serde(default)]
    pub components: HashMap<String, Descriptor>,
}

impl ComponentsConfig {
    /// Load configuration from a TOML file merged with `ARMATURE_`-prefixed
    /// environment variables.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let config: Self = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("ARMATURE_").split("__"))
            .extract()?;

        debug!(
            aliases = config.aliases.len(),
            components = config.components.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Register every configured alias.
    ///
    /// # Errors
    /// * `InvalidArgument` if any configured alias name lacks the `@` prefix
    pub fn apply_aliases(&self, registry: &mut AliasRegistry) -> Result<(), CoreError> {
        for (alias, path) in &self.aliases {
            registry.set(alias, path)?;
        }
        Ok(())
    }

    /// Build every configured component through `factory`.
    ///
    /// Fails on the first descriptor the factory rejects; nothing is
    /// returned in that case.
    pub fn build_all(
        &self,
        factory: &ObjectFactory,
    ) -> Result<HashMap<String, Box<dyn Component>>, CoreError> {
        let mut built = HashMap::new();
        for (name, descriptor) in &self.components {
            built.insert(name.clone(), factory.create(descriptor)?);
        }
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_aliases_and_descriptors() {
        let file = write_config(
            r#"
            [aliases]
            "@web" = "/var/www"
            "@data" = "/srv/data"

            [components.greeter]
            class = "banner"
            construct = ["hello"]
            repeat = 2
            "#,
        );

        let config = ComponentsConfig::load(file.path()).unwrap();
        assert_eq!(config.aliases.len(), 2);

        let descriptor = config.components.get("greeter").unwrap();
        assert_eq!(descriptor.class_name().unwrap(), "banner");
        assert_eq!(descriptor.construct_args().len(), 1);
    }

    #[test]
    fn test_bare_type_name_descriptor() {
        let file = write_config(
            r#"
            [components]
            view = "view"
            "#,
        );

        let config = ComponentsConfig::load(file.path()).unwrap();
        let descriptor = config.components.get("view").unwrap();
        assert_eq!(descriptor.class_name().unwrap(), "view");
        assert!(descriptor.construct_args().is_empty());
    }

    #[test]
    fn test_apply_aliases() {
        let file = write_config(
            r#"
            [aliases]
            "@web" = "/var/www"
            "#,
        );

        let config = ComponentsConfig::load(file.path()).unwrap();
        let mut registry = AliasRegistry::new();
        config.apply_aliases(&mut registry).unwrap();

        assert_eq!(registry.resolve("@web/index.html"), Some("/var/www/index.html".to_string()));
    }

    #[test]
    fn test_apply_aliases_rejects_bad_name() {
        let file = write_config(
            r#"
            [aliases]
            web = "/var/www"
            "#,
        );

        let config = ComponentsConfig::load(file.path()).unwrap();
        let mut registry = AliasRegistry::new();
        assert!(config.apply_aliases(&mut registry).is_err());
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        // Figment's TOML provider treats a missing file as an empty source
        let config = ComponentsConfig::load(Path::new("/nonexistent/armature.toml")).unwrap();
        assert!(config.aliases.is_empty());
        assert!(config.components.is_empty());
    }
}

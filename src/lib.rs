//! armature - foundational utility layer for a web micro-framework
//!
//! Provides the pieces an application composes on top of:
//! - Path alias registry ([`alias`])
//! - Generic object factory driven by descriptors ([`factory`])
//! - Runtime-attachable named callables ([`behavior`])
//! - Typed and named event dispatch ([`events`])
//! - Data-model binding and validation ([`model`])
//! - Configuration loading for aliases and descriptors ([`config`])
//!
//! Everything is synchronous and runs on the caller's thread. Shared
//! registries ([`alias::SharedAliases`], [`events::SharedChannels`]) carry
//! their own locks for hosts that populate them at startup and read
//! afterward.

pub mod alias;
pub mod behavior;
pub mod config;
pub mod error;
pub mod events;
pub mod factory;
pub mod fields;
pub mod model;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use alias::AliasRegistry;
use config::ComponentsConfig;
use error::CoreError;
use events::SharedChannels;
use factory::{Component, Descriptor, ObjectFactory};

/// Top-level application context.
///
/// Owns the registries the components of one application share: the alias
/// registry, the object factory and the application-wide named-event table.
/// Construct one at startup, register component types, then build the
/// object graph from configuration or ad-hoc descriptors.
#[derive(Default)]
pub struct App {
    pub aliases: AliasRegistry,
    pub factory: ObjectFactory,
    pub channels: Arc<SharedChannels>,
}

impl App {
    /// Create an empty application context
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `path` and register its aliases.
    ///
    /// The returned config still holds the component descriptors, to be
    /// built once the factory knows their types.
    pub fn load_config(&mut self, path: &Path) -> Result<ComponentsConfig, CoreError> {
        let config = ComponentsConfig::load(path)?;
        config.apply_aliases(&mut self.aliases)?;
        info!(aliases = config.aliases.len(), "application configured");
        Ok(config)
    }

    /// Build a single component from a descriptor
    pub fn build(&self, descriptor: &Descriptor) -> Result<Box<dyn Component>, CoreError> {
        self.factory.create(descriptor)
    }

    /// Build every component a config declares
    pub fn build_all(
        &self,
        config: &ComponentsConfig,
    ) -> Result<HashMap<String, Box<dyn Component>>, CoreError> {
        config.build_all(&self.factory)
    }

    /// Drop all registered aliases; teardown hook for tests and reload
    pub fn reset(&mut self) {
        self.aliases.reset();
    }
}

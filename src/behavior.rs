//! Runtime-attachable named callables
//!
//! A behavior is a callable registered under a name on a single instance,
//! invoked explicitly through [`Behaviors::invoke`] rather than through any
//! method-dispatch interception. Arguments and return values are
//! JSON-compatible, the same currency as descriptors and field binding.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::error::CoreError;

/// A behavior callable
pub type BehaviorFn = Box<dyn Fn(&[Value]) -> Value>;

/// Name-to-callable table held by the owning instance
#[derive(Default)]
pub struct Behaviors {
    table: HashMap<String, BehaviorFn>,
}

impl Behaviors {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `name`.
    ///
    /// First registration wins: if the name is already taken the call is a
    /// silent no-op.
    pub fn attach<F>(&mut self, name: &str, callback: F)
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        if !self.table.contains_key(name) {
            debug!(name, "behavior attached");
            self.table.insert(name.to_string(), Box::new(callback));
        }
    }

    /// Remove the registration under `name`, if any
    pub fn detach(&mut self, name: &str) {
        if self.table.remove(name).is_some() {
            debug!(name, "behavior detached");
        }
    }

    /// Check whether a behavior is attached
    pub fn is_attached(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Invoke the behavior registered under `name` with `args`.
    ///
    /// # Errors
    /// * `BehaviorNotRegistered` carrying the attempted name
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, CoreError> {
        match self.table.get(name) {
            Some(callback) => Ok(callback(args)),
            None => Err(CoreError::BehaviorNotRegistered(name.to_string())),
        }
    }
}

/// Capability interface for types that carry a behavior table.
///
/// Implementors supply access to their [`Behaviors`]; the attachment and
/// invocation methods are provided.
pub trait BehaviorHost {
    fn behaviors(&self) -> &Behaviors;
    fn behaviors_mut(&mut self) -> &mut Behaviors;

    /// See [`Behaviors::attach`]
    fn attach_behavior<F>(&mut self, name: &str, callback: F)
    where
        F: Fn(&[Value]) -> Value + 'static,
        Self: Sized,
    {
        self.behaviors_mut().attach(name, callback);
    }

    /// See [`Behaviors::detach`]
    fn detach_behavior(&mut self, name: &str) {
        self.behaviors_mut().detach(name);
    }

    /// Invoke a named behavior; the explicit stand-in for a method call the
    /// type does not declare itself
    fn invoke_named(&self, name: &str, args: &[Value]) -> Result<Value, CoreError> {
        self.behaviors().invoke(name, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Host {
        behaviors: Behaviors,
    }

    impl BehaviorHost for Host {
        fn behaviors(&self) -> &Behaviors {
            &self.behaviors
        }

        fn behaviors_mut(&mut self) -> &mut Behaviors {
            &mut self.behaviors
        }
    }

    #[test]
    fn test_attach_and_invoke() {
        let mut host = Host::default();
        host.attach_behavior("sum", |args| {
            let total: i64 = args.iter().filter_map(Value::as_i64).sum();
            json!(total)
        });

        let result = host.invoke_named("sum", &[json!(10), json!(2)]).unwrap();
        assert_eq!(result, json!(12));
    }

    #[test]
    fn test_detach_then_invoke_fails() {
        let mut host = Host::default();
        host.attach_behavior("sum", |args| {
            let total: i64 = args.iter().filter_map(Value::as_i64).sum();
            json!(total)
        });
        host.detach_behavior("sum");

        let err = host.invoke_named("sum", &[json!(10), json!(2)]).unwrap_err();
        match err {
            CoreError::BehaviorNotRegistered(name) => assert_eq!(name, "sum"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_registration_wins() {
        let mut behaviors = Behaviors::new();
        behaviors.attach("greet", |_| json!("hello"));
        behaviors.attach("greet", |_| json!("goodbye"));

        assert_eq!(behaviors.invoke("greet", &[]).unwrap(), json!("hello"));
    }

    #[test]
    fn test_detach_unknown_is_noop() {
        let mut behaviors = Behaviors::new();
        behaviors.detach("missing");
        assert!(!behaviors.is_attached("missing"));
    }

    #[test]
    fn test_invoke_unregistered_names_behavior() {
        let behaviors = Behaviors::new();
        let err = behaviors.invoke("shout", &[]).unwrap_err();
        assert_eq!(err.to_string(), "behavior 'shout' not registered");
    }
}

//! Event registration and dispatch
//!
//! Two dispatch shapes:
//! - [`EventHub`]: typed events. Listeners register against an event type
//!   and receive `&mut E`, so later listeners observe mutations made by
//!   earlier ones. Explicit priorities run first (higher before lower);
//!   listeners without a priority run afterwards in registration order.
//! - [`Channels`]: named events. Listeners register against an event name,
//!   receive a positional argument list and their return values are
//!   collected in dispatch order. An application-wide [`SharedChannels`]
//!   table can back a `Channels` instance; its listeners run after the
//!   instance-level ones.
//!
//! Dispatch order is fixed before iteration begins; listeners must not
//! register or remove listeners while a dispatch is running.

use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::trace;

/// Marker trait for typed event objects
pub trait Event: Any {}

struct Registration {
    seq: u64,
    priority: Option<i32>,
    callback: Box<dyn FnMut(&mut dyn Any)>,
}

impl Registration {
    /// Higher priority first; no priority sorts after every explicit one;
    /// ties keep registration order
    fn dispatch_order(&self, other: &Self) -> Ordering {
        match (self.priority, other.priority) {
            (Some(a), Some(b)) => b.cmp(&a).then(self.seq.cmp(&other.seq)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.seq.cmp(&other.seq),
        }
    }
}

/// Per-instance dispatcher for typed events
#[derive(Default)]
pub struct EventHub {
    listeners: HashMap<TypeId, Vec<Registration>>,
    next_seq: u64,
}

impl EventHub {
    /// Create an empty hub
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for events of type `E`, appended after all
    /// previously registered listeners of its band
    pub fn on<E, F>(&mut self, callback: F)
    where
        E: Event,
        F: FnMut(&mut E) + 'static,
    {
        self.register::<E, F>(None, callback);
    }

    /// Register a listener with an explicit priority; higher priorities run
    /// earlier
    pub fn on_with_priority<E, F>(&mut self, priority: i32, callback: F)
    where
        E: Event,
        F: FnMut(&mut E) + 'static,
    {
        self.register::<E, F>(Some(priority), callback);
    }

    fn register<E, F>(&mut self, priority: Option<i32>, mut callback: F)
    where
        E: Event,
        F: FnMut(&mut E) + 'static,
    {
        let seq = self.next_seq;
        self.next_seq += 1;

        let erased = Box::new(move |any: &mut dyn Any| {
            if let Some(event) = any.downcast_mut::<E>() {
                callback(event);
            }
        });

        self.listeners
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Registration {
                seq,
                priority,
                callback: erased,
            });
    }

    /// Number of listeners registered for events of type `E`
    pub fn listener_count<E: Event>(&self) -> usize {
        self.listeners
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Dispatch `event` to every listener registered for its type, in
    /// priority order, and return the (possibly mutated) event.
    pub fn trigger<E: Event>(&mut self, mut event: E) -> E {
        if let Some(registrations) = self.listeners.get_mut(&TypeId::of::<E>()) {
            // Order is fixed before the first listener runs
            let mut order: Vec<usize> = (0..registrations.len()).collect();
            order.sort_by(|&a, &b| registrations[a].dispatch_order(&registrations[b]));

            trace!(listeners = order.len(), "dispatching typed event");
            for index in order {
                (registrations[index].callback)(&mut event);
            }
        }
        event
    }
}

/// Listener position for named events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    /// Prepend before all currently registered listeners
    Before,
    /// Append after all currently registered listeners
    #[default]
    After,
}

type NamedListener = Box<dyn FnMut(&[Value]) -> Value>;

/// Per-instance dispatcher for named events
#[derive(Default)]
pub struct Channels {
    listeners: HashMap<String, Vec<NamedListener>>,
    shared: Option<Arc<SharedChannels>>,
}

impl Channels {
    /// Create an empty dispatcher with no shared table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher that also consults an application-wide table
    pub fn with_shared(shared: Arc<SharedChannels>) -> Self {
        Self {
            listeners: HashMap::new(),
            shared: Some(shared),
        }
    }

    /// Register a listener for `event`
    pub fn on<F>(&mut self, event: &str, priority: Priority, callback: F)
    where
        F: FnMut(&[Value]) -> Value + 'static,
    {
        let listeners = self.listeners.entry(event.to_string()).or_default();
        match priority {
            Priority::Before => listeners.insert(0, Box::new(callback)),
            Priority::After => listeners.push(Box::new(callback)),
        }
    }

    /// Dispatch `event` with `args` and collect every listener's return
    /// value in dispatch order: instance-level listeners first, then the
    /// shared table's.
    pub fn trigger(&mut self, event: &str, args: &[Value]) -> Vec<Value> {
        let mut results = Vec::new();

        if let Some(listeners) = self.listeners.get_mut(event) {
            trace!(event, listeners = listeners.len(), "dispatching named event");
            for listener in listeners.iter_mut() {
                results.push(listener(args));
            }
        }

        if let Some(shared) = &self.shared {
            shared.dispatch(event, args, &mut results);
        }

        results
    }
}

type SharedListener = Box<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Application-wide named-event table, shared across component instances.
///
/// Populate during startup; registering from inside a running dispatch
/// deadlocks on the table lock.
#[derive(Default)]
pub struct SharedChannels {
    listeners: RwLock<HashMap<String, Vec<SharedListener>>>,
}

impl SharedChannels {
    /// Create a new table wrapped in an `Arc`
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a listener for `event`
    pub fn on<F>(&self, event: &str, priority: Priority, callback: F)
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let mut table = self.listeners.write();
        let listeners = table.entry(event.to_string()).or_default();
        match priority {
            Priority::Before => listeners.insert(0, Box::new(callback)),
            Priority::After => listeners.push(Box::new(callback)),
        }
    }

    fn dispatch(&self, event: &str, args: &[Value], results: &mut Vec<Value>) {
        let table = self.listeners.read();
        if let Some(listeners) = table.get(event) {
            for listener in listeners {
                results.push(listener(args));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct GreetEvent {
        value: String,
    }

    impl Event for GreetEvent {}

    fn append_bang(event: &mut GreetEvent) {
        event.value.push_str("l !");
    }

    #[test]
    fn test_priority_listener_runs_first() {
        let mut hub = EventHub::new();

        hub.on(|event: &mut GreetEvent| event.value.push('o'));
        hub.on(|event: &mut GreetEvent| event.value.push('o'));
        hub.on(append_bang);
        hub.on_with_priority(10, |event: &mut GreetEvent| event.value.push('C'));

        let event = hub.trigger(GreetEvent::default());
        assert_eq!(event.value, "Cool !");
    }

    #[test]
    fn test_listeners_observe_earlier_mutations() {
        let mut hub = EventHub::new();

        hub.on(|event: &mut GreetEvent| event.value.push('a'));
        hub.on(|event: &mut GreetEvent| {
            assert_eq!(event.value, "a");
            event.value.push('b');
        });

        let event = hub.trigger(GreetEvent::default());
        assert_eq!(event.value, "ab");
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let mut hub = EventHub::new();

        hub.on_with_priority(5, |event: &mut GreetEvent| event.value.push('1'));
        hub.on_with_priority(5, |event: &mut GreetEvent| event.value.push('2'));
        hub.on_with_priority(9, |event: &mut GreetEvent| event.value.push('0'));

        let event = hub.trigger(GreetEvent::default());
        assert_eq!(event.value, "012");
    }

    #[test]
    fn test_trigger_without_listeners_returns_event() {
        let mut hub = EventHub::new();
        let event = hub.trigger(GreetEvent {
            value: "untouched".to_string(),
        });
        assert_eq!(event.value, "untouched");
    }

    #[test]
    fn test_listener_count_is_per_type() {
        struct OtherEvent;
        impl Event for OtherEvent {}

        let mut hub = EventHub::new();
        hub.on(|event: &mut GreetEvent| event.value.clear());

        assert_eq!(hub.listener_count::<GreetEvent>(), 1);
        assert_eq!(hub.listener_count::<OtherEvent>(), 0);
    }

    #[test]
    fn test_named_dispatch_collects_results() {
        let mut channels = Channels::new();
        channels.on("calc", Priority::After, |args| {
            json!(args.iter().filter_map(Value::as_i64).sum::<i64>())
        });
        channels.on("calc", Priority::After, |args| {
            json!(args.iter().filter_map(Value::as_i64).product::<i64>())
        });

        let results = channels.trigger("calc", &[json!(3), json!(4)]);
        assert_eq!(results, vec![json!(7), json!(12)]);
    }

    #[test]
    fn test_named_before_prepends() {
        let mut channels = Channels::new();
        channels.on("greet", Priority::After, |_| json!("second"));
        channels.on("greet", Priority::Before, |_| json!("first"));

        let results = channels.trigger("greet", &[]);
        assert_eq!(results, vec![json!("first"), json!("second")]);
    }

    #[test]
    fn test_shared_listeners_run_after_instance() {
        let shared = SharedChannels::shared();
        shared.on("boot", Priority::After, |_| json!("shared"));

        let mut channels = Channels::with_shared(shared.clone());
        channels.on("boot", Priority::After, |_| json!("instance"));

        let results = channels.trigger("boot", &[]);
        assert_eq!(results, vec![json!("instance"), json!("shared")]);

        // A second instance backed by the same table sees the shared listener
        let mut other = Channels::with_shared(shared);
        assert_eq!(other.trigger("boot", &[]), vec![json!("shared")]);
    }

    #[test]
    fn test_unmatched_event_name_yields_no_results() {
        let mut channels = Channels::new();
        assert!(channels.trigger("nothing", &[]).is_empty());
    }
}

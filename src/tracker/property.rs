// ============================================================================
// spark-props - Property Tracker
// Converts plain object properties into observable-backed accessor pairs
// ============================================================================
//
// Tracking a property replaces its slot with an accessor pair whose getter
// reads an observable handle (registering a dependency when read inside a
// computed) and whose setter writes it. The handle is recorded in the
// observable registry, which makes tracking idempotent and lets callers
// fetch the handle later. Array-valued properties additionally get an array
// watch so in-place mutations notify the property.
// ============================================================================

use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::collections::{Array, Getter, Object, Property, Setter};
use crate::core::value::Value;
use crate::error::{Error, Result};
use crate::primitives::handle::ObservableHandle;
use crate::primitives::observable::Observable;
use crate::primitives::observable_array::ObservableArray;
use crate::tracker::array_bridge::ArrayReactivityBridge;
use crate::tracker::registry::{ObservableRegistry, TrackedProperty};

// =============================================================================
// PROPERTY KIND
// =============================================================================

/// How a property's current value is turned into a handle.
#[derive(Debug, Clone)]
pub enum PropertyKind {
    /// The value already is a reactive cell and is used as-is.
    AlreadyReactive(ObservableHandle),
    /// An array instance, wrapped in an observable array.
    Array(Array),
    /// Anything else, seeded into a plain observable.
    Scalar(Value),
}

impl PropertyKind {
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Reactive(handle) => PropertyKind::AlreadyReactive(handle),
            Value::Array(array) => PropertyKind::Array(array),
            other => PropertyKind::Scalar(other),
        }
    }

    fn into_handle(self) -> ObservableHandle {
        match self {
            PropertyKind::AlreadyReactive(handle) => handle,
            PropertyKind::Array(array) => ObservableHandle::Array(ObservableArray::new(array)),
            PropertyKind::Scalar(value) => ObservableHandle::Scalar(Observable::new(value)),
        }
    }
}

// =============================================================================
// PROPERTY TRACKER
// =============================================================================

/// Orchestrates tracking, untracking and handle lookup.
///
/// Both registries are created with the tracker. Most callers use the
/// thread-local default through the crate-level free functions; an explicit
/// tracker keeps its registrations separate from that default.
///
/// # Example
///
/// ```
/// use spark_props::{object, PropertyTracker, Value};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let tracker = PropertyTracker::new();
/// let person = tracker.track(object! { "name" => "Ada" }).unwrap();
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = seen.clone();
/// let handle = tracker.get_observable(&person, "name").unwrap();
/// handle.subscribe(move |v| sink.borrow_mut().push(v.clone()));
///
/// person.set("name", "Grace");
/// assert_eq!(person.get("name"), Value::from("Grace"));
/// assert_eq!(*seen.borrow(), vec![Value::from("Grace")]);
/// ```
#[derive(Default)]
pub struct PropertyTracker {
    observables: ObservableRegistry,
    arrays: ArrayReactivityBridge,
}

impl PropertyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ObservableRegistry {
        &self.observables
    }

    pub fn array_bridge(&self) -> &ArrayReactivityBridge {
        &self.arrays
    }

    /// Reclaim the records of objects that have been dropped.
    ///
    /// Tracking and untracking sweep dead records as a side effect. A tracker
    /// that sits idle keeps them, with their handles and array watches, until
    /// this is called.
    pub fn prune(&self) -> usize {
        let reclaimed = self.observables.prune();
        if reclaimed > 0 {
            debug!(reclaimed, "pruned dropped objects");
        }
        reclaimed
    }

    // =========================================================================
    // TRACK
    // =========================================================================

    /// Track every own enumerable property `target` has right now.
    ///
    /// Properties added later are untouched until tracked themselves.
    pub fn track(&self, target: impl Into<Value>) -> Result<Object> {
        let object = expect_object(target.into())?;
        let names = object.keys();
        self.track_names(&object, names.iter().map(String::as_str));
        Ok(object)
    }

    /// Track the named properties of `target`. Absent names are tracked as
    /// undefined.
    pub fn track_properties(&self, target: impl Into<Value>, names: &[&str]) -> Result<Object> {
        let object = expect_object(target.into())?;
        self.track_names(&object, names.iter().copied());
        Ok(object)
    }

    fn track_names<'a>(&self, object: &Object, names: impl Iterator<Item = &'a str>) {
        let mut tracked = 0;
        for name in names {
            if self.track_property(object, name) {
                tracked += 1;
            }
        }
        debug!(tracked, total = self.observables.names(object).len(), "tracked properties");
    }

    /// Returns whether a new accessor pair was installed.
    fn track_property(&self, object: &Object, name: &str) -> bool {
        if self.observables.contains(object, name) {
            return false;
        }
        if object.own_property(name).is_some_and(|p| !p.configurable) {
            trace!(property = name, "skipping non-configurable property");
            return false;
        }

        let kind = PropertyKind::classify(object.get(name));
        let watches_array = matches!(kind, PropertyKind::Array(_));
        let handle = kind.into_handle();

        if let Err(err) = object.define_property(name, accessor_for(name, &handle)) {
            trace!(property = name, %err, "could not install accessor");
            return false;
        }

        let mut tracked = TrackedProperty::new(handle);
        if watches_array {
            let watch = self
                .arrays
                .notify_when_present_or_future_array_values_mutate(&tracked.handle);
            tracked = tracked.with_array_watch(watch);
        }
        if let Some(displaced) = self.observables.insert(object, name, tracked) {
            displaced.release();
        }
        true
    }

    // =========================================================================
    // UNTRACK
    // =========================================================================

    /// Forget every tracked property of `target`.
    ///
    /// Accessors stay in place and keep reading their now-orphaned handles.
    pub fn untrack(&self, target: impl Into<Value>) {
        let Value::Object(object) = target.into() else {
            return;
        };
        let removed = self.observables.remove_object(&object);
        release_all(&removed);
        if !removed.is_empty() {
            debug!(untracked = removed.len(), "untracked object");
        }
    }

    /// Forget the named properties of `target`, keeping the rest tracked.
    pub fn untrack_properties(&self, target: impl Into<Value>, names: &[&str]) {
        let Value::Object(object) = target.into() else {
            return;
        };
        let removed = self.observables.remove_properties(&object, names);
        release_all(&removed);
        if !removed.is_empty() {
            debug!(untracked = removed.len(), "untracked properties");
        }
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    /// The handle backing `(target, name)`. Never creates one.
    pub fn get_observable(&self, target: impl Into<Value>, name: &str) -> Option<ObservableHandle> {
        match target.into() {
            Value::Object(object) => self.observables.get(&object, name),
            _ => None,
        }
    }

    /// Make the handle behind `(target, name)` notify with its current value.
    pub fn value_has_mutated(&self, target: impl Into<Value>, name: &str) {
        if let Some(handle) = self.get_observable(target, name) {
            handle.value_has_mutated();
        }
    }

    pub fn is_tracked(&self, target: impl Into<Value>, name: &str) -> bool {
        match target.into() {
            Value::Object(object) => self.observables.contains(&object, name),
            _ => false,
        }
    }

    /// Tracked property names of `target`, in tracking order.
    pub fn tracked_properties(&self, target: impl Into<Value>) -> Vec<String> {
        match target.into() {
            Value::Object(object) => self.observables.names(&object),
            _ => Vec::new(),
        }
    }
}

pub(crate) fn expect_object(value: Value) -> Result<Object> {
    match value {
        Value::Object(object) => Ok(object),
        other => Err(Error::InvalidArgument {
            found: other.type_name(),
        }),
    }
}

/// Enumerable, configurable accessor pair over `handle`. Read-only handles
/// get no setter, so assignments to the property are ignored.
fn accessor_for(name: &str, handle: &ObservableHandle) -> Property {
    let reader = handle.clone();
    let get: Getter = Rc::new(move || reader.get());

    let set: Option<Setter> = handle.is_writable().then(|| {
        let writer = handle.clone();
        let property = name.to_owned();
        Rc::new(move |value: Value| {
            if let Err(err) = writer.set(value) {
                warn!(property = %property, %err, "write to tracked property failed");
            }
        }) as Setter
    });

    Property::accessor(get, set)
}

fn release_all(removed: &[(String, TrackedProperty)]) {
    for (name, tracked) in removed {
        if tracked.array_watch.is_some() {
            trace!(property = %name, "disposing array watch");
        }
        tracked.release();
    }
}

// =============================================================================
// TESTS
// =============================================================================

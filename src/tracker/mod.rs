// ============================================================================
// spark-props - Tracker Module
// Property tracking, array reactivity and computed properties
// ============================================================================
//
// The free functions here operate on a thread-local default tracker, created
// on first use per thread (the same way the reactive context is). Use a
// `PropertyTracker` directly for registrations isolated from that default.
// ============================================================================

pub mod array_bridge;
pub mod computed_property;
pub mod property;
pub mod registry;

pub use array_bridge::{
    ArrayNotifier, ArrayReactivityBridge, ArraySubscribableRegistry, ArrayWatch,
};
pub use computed_property::{ComputedSpec, PropertyRead, PropertyWrite};
pub use property::{PropertyKind, PropertyTracker};
pub use registry::{ObservableRegistry, TrackedProperty};

use crate::collections::Object;
use crate::core::value::Value;
use crate::error::Result;
use crate::primitives::handle::ObservableHandle;

thread_local! {
    static TRACKER: PropertyTracker = PropertyTracker::new();
}

/// Run `f` with the thread's default tracker.
pub fn with_tracker<R>(f: impl FnOnce(&PropertyTracker) -> R) -> R {
    TRACKER.with(f)
}

/// Track every own enumerable property of `target`.
///
/// # Example
///
/// ```
/// use spark_props::{array, get_observable, object, track, Value};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let model = track(object! { "items" => array![1, 2, 3] }).unwrap();
///
/// let hits = Rc::new(Cell::new(0));
/// let sink = hits.clone();
/// get_observable(&model, "items")
///     .unwrap()
///     .subscribe(move |_| sink.set(sink.get() + 1));
///
/// let items = model.get("items");
/// items.as_array().unwrap().push([Value::from(4)]);
///
/// assert_eq!(hits.get(), 1);
/// assert_eq!(items.to_string(), "1,2,3,4");
/// ```
pub fn track(target: impl Into<Value>) -> Result<Object> {
    with_tracker(|tracker| tracker.track(target))
}

/// Track only the named properties of `target`.
pub fn track_properties(target: impl Into<Value>, names: &[&str]) -> Result<Object> {
    with_tracker(|tracker| tracker.track_properties(target, names))
}

/// Forget every tracked property of `target`.
pub fn untrack(target: impl Into<Value>) {
    with_tracker(|tracker| tracker.untrack(target))
}

/// Forget the named tracked properties of `target`.
pub fn untrack_properties(target: impl Into<Value>, names: &[&str]) {
    with_tracker(|tracker| tracker.untrack_properties(target, names))
}

/// The handle backing a tracked property, if any.
pub fn get_observable(target: impl Into<Value>, name: &str) -> Option<ObservableHandle> {
    with_tracker(|tracker| tracker.get_observable(target, name))
}

/// Notify a tracked property's subscribers without changing its value.
pub fn value_has_mutated(target: impl Into<Value>, name: &str) {
    with_tracker(|tracker| tracker.value_has_mutated(target, name))
}

pub fn is_tracked(target: impl Into<Value>, name: &str) -> bool {
    with_tracker(|tracker| tracker.is_tracked(target, name))
}

pub fn tracked_properties(target: impl Into<Value>) -> Vec<String> {
    with_tracker(|tracker| tracker.tracked_properties(target))
}

/// Install and track a computed property on `target`.
pub fn define_computed_property(
    target: impl Into<Value>,
    name: &str,
    spec: ComputedSpec,
) -> Result<Object> {
    with_tracker(|tracker| tracker.define_computed_property(target, name, spec))
}

// ============================================================================
// spark-props - Transparent Property Tracking for Rust
// ============================================================================
//
// Plain records whose property reads and writes become reads and writes of
// observable cells. Tracking an object swaps its properties for accessor
// pairs backed by observables; reads inside a computed register
// dependencies, writes notify subscribers, and in-place mutations of arrays
// held by tracked properties notify those properties.
//
// Layers, leaves first:
//   core         values, the dependency-detection context, weak identity maps
//   collections  Object records and Array lists
//   reactivity   subscribables, dependency frames, equality comparers
//   primitives   Observable, ObservableArray, Computed
//   tracker      property tracking, array bridging, computed properties
// ============================================================================

mod macros;

pub mod collections;
pub mod core;
pub mod error;
pub mod primitives;
pub mod reactivity;
pub mod tracker;

// Re-export the value model at crate root
pub use collections::{Array, Getter, Object, Property, Setter, Slot, WeakObject};
pub use crate::core::context::{is_detecting, with_context, DependencyFrame, ReactiveContext};
pub use crate::core::value::Value;
pub use crate::core::weak_map::WeakKeyMap;
pub use error::{Error, Result};

// Re-export reactive primitives
pub use primitives::{
    is_observable, is_writable_observable, Computed, ComputedOptions, Observable,
    ObservableArray, ObservableHandle, ObservableOptions, ReadFn, WriteFn, DESTROY_MARKER,
};
pub use reactivity::{
    ignore_dependencies, never_equals, primitive_equals, register_dependency, strict_equals,
    with_dependency_frame, EqualsFn, Subscribable, Subscription, WeakSubscribable,
};

// Re-export the tracker API
pub use tracker::{
    define_computed_property, get_observable, is_tracked, track, track_properties,
    tracked_properties, untrack, untrack_properties, value_has_mutated, with_tracker,
    ArrayNotifier, ArrayReactivityBridge, ArraySubscribableRegistry, ArrayWatch, ComputedSpec,
    ObservableRegistry, PropertyKind, PropertyRead, PropertyTracker, PropertyWrite,
    TrackedProperty,
};

// =============================================================================
// TESTS
// =============================================================================

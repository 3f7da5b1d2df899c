// ============================================================================
// spark-props - Observable Registry
// Which handle backs which property of which object
// ============================================================================
//
// Entries are keyed by object identity and hold only a weak reference to the
// object, so tracking never extends an object's lifetime. Per object, the
// tracked property names keep the order in which they were tracked.
//
// Borrows of the registry are always short: nothing here runs user code, and
// removed entries are handed back to the caller to dispose outside the borrow.
// Records of dead objects swept during an insert drop inside the borrow; their
// array watches only touch subscribables, never this registry.
// ============================================================================

use std::cell::RefCell;

use indexmap::IndexMap;

use crate::collections::{Object, ObjectInner};
use crate::core::weak_map::WeakKeyMap;
use crate::primitives::handle::ObservableHandle;
use crate::tracker::array_bridge::ArrayWatch;

/// Registry record for one tracked property.
#[derive(Debug)]
pub struct TrackedProperty {
    pub handle: ObservableHandle,
    pub array_watch: Option<ArrayWatch>,
}

impl TrackedProperty {
    pub fn new(handle: ObservableHandle) -> Self {
        Self {
            handle,
            array_watch: None,
        }
    }

    pub fn with_array_watch(mut self, watch: ArrayWatch) -> Self {
        self.array_watch = Some(watch);
        self
    }

    /// Dispose the array watch, if any.
    pub fn release(&self) {
        if let Some(watch) = &self.array_watch {
            watch.dispose();
        }
    }
}

type PropertyMap = IndexMap<String, TrackedProperty>;

/// Non-owning association from objects to their tracked properties.
#[derive(Default)]
pub struct ObservableRegistry {
    entries: RefCell<WeakKeyMap<ObjectInner, PropertyMap>>,
}

impl ObservableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The handle registered for `(object, name)`.
    pub fn get(&self, object: &Object, name: &str) -> Option<ObservableHandle> {
        self.entries
            .borrow()
            .get(object.inner_rc())
            .and_then(|properties| properties.get(name))
            .map(|tracked| tracked.handle.clone())
    }

    pub fn contains(&self, object: &Object, name: &str) -> bool {
        self.entries
            .borrow()
            .get(object.inner_rc())
            .is_some_and(|properties| properties.contains_key(name))
    }

    /// Record `tracked` under `(object, name)`.
    ///
    /// Returns the record it displaced, if any.
    pub fn insert(
        &self,
        object: &Object,
        name: &str,
        tracked: TrackedProperty,
    ) -> Option<TrackedProperty> {
        self.entries
            .borrow_mut()
            .get_or_insert_with(object.inner_rc(), PropertyMap::new)
            .insert(name.to_owned(), tracked)
    }

    /// Remove every record for `object`.
    pub fn remove_object(&self, object: &Object) -> Vec<(String, TrackedProperty)> {
        self.entries
            .borrow_mut()
            .remove(object.inner_rc())
            .map(|properties| properties.into_iter().collect())
            .unwrap_or_default()
    }

    /// Remove the records for `names`, keeping the object's other entries.
    pub fn remove_properties(
        &self,
        object: &Object,
        names: &[&str],
    ) -> Vec<(String, TrackedProperty)> {
        let mut entries = self.entries.borrow_mut();
        let Some(properties) = entries.get_mut(object.inner_rc()) else {
            return Vec::new();
        };
        names
            .iter()
            .filter_map(|name| properties.shift_remove_entry(*name))
            .collect()
    }

    /// Tracked property names of `object`, in tracking order.
    pub fn names(&self, object: &Object) -> Vec<String> {
        self.entries
            .borrow()
            .get(object.inner_rc())
            .map(|properties| properties.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of live objects with at least one entry.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop records of objects that no longer exist, disposing their array
    /// watches. Returns the number of objects reclaimed.
    pub fn prune(&self) -> usize {
        let dead = self.entries.borrow_mut().prune();
        for properties in &dead {
            for tracked in properties.values() {
                tracked.release();
            }
        }
        dead.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object;
    use crate::primitives::observable::Observable;

    fn scalar(value: i32) -> TrackedProperty {
        TrackedProperty::new(ObservableHandle::from(Observable::new(value)))
    }

    #[test]
    fn insert_and_get() {
        let registry = ObservableRegistry::new();
        let o = object! { "a" => 1 };

        assert!(registry.get(&o, "a").is_none());
        registry.insert(&o, "a", scalar(1));

        assert!(registry.contains(&o, "a"));
        assert!(!registry.contains(&o, "b"));
        assert!(registry.get(&o, "a").is_some());
    }

    #[test]
    fn entries_are_per_object_identity() {
        let registry = ObservableRegistry::new();
        let a = object! { "x" => 1 };
        let b = object! { "x" => 1 };

        registry.insert(&a, "x", scalar(1));
        assert!(!registry.contains(&b, "x"));
    }

    #[test]
    fn names_keep_tracking_order() {
        let registry = ObservableRegistry::new();
        let o = Object::new();
        registry.insert(&o, "z", scalar(1));
        registry.insert(&o, "a", scalar(2));
        registry.insert(&o, "m", scalar(3));

        assert_eq!(registry.names(&o), vec!["z", "a", "m"]);

        let removed = registry.remove_properties(&o, &["a", "missing"]);
        assert_eq!(removed.len(), 1);
        assert_eq!(registry.names(&o), vec!["z", "m"]);
    }

    #[test]
    fn remove_object_clears_everything() {
        let registry = ObservableRegistry::new();
        let o = Object::new();
        registry.insert(&o, "a", scalar(1));
        registry.insert(&o, "b", scalar(2));

        assert_eq!(registry.remove_object(&o).len(), 2);
        assert!(registry.names(&o).is_empty());
        assert!(registry.remove_object(&o).is_empty());
    }

    #[test]
    fn does_not_keep_objects_alive() {
        let registry = ObservableRegistry::new();
        let o = Object::new();
        let weak = o.downgrade();
        registry.insert(&o, "a", scalar(1));
        assert_eq!(registry.len(), 1);

        drop(o);
        assert!(weak.upgrade().is_none());
        assert!(registry.is_empty());
        assert_eq!(registry.prune(), 1);
        assert_eq!(registry.prune(), 0);
    }
}

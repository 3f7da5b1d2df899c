// ============================================================================
// spark-props - Observable Array
// An observable over an array instance, with composite mutators
// ============================================================================
//
// The observable holds the array instance it was created with (not a copy).
// Composite mutators remove elements through the array's own `splice`, so a
// hooked array reports each removal unless its pause flag is set. The
// array's composite methods set that flag and then drive a throwaway
// `ObservableArray` over the same instance, which is how several element
// removals collapse into one notification.
// ============================================================================

use std::cmp::Ordering;
use std::fmt;

use crate::collections::Array;
use crate::core::value::Value;
use crate::primitives::observable::Observable;
use crate::reactivity::subscribable::{Subscribable, Subscription};

/// Property set on items by the `destroy*` mutators.
pub const DESTROY_MARKER: &str = "_destroy";

/// An [`Observable`] whose value is an [`Array`].
///
/// # Example
///
/// ```
/// use spark_props::{array, ObservableArray, Value};
///
/// let list = ObservableArray::new(array![1, 2, 3, 2]);
/// let removed = list.remove(&Value::from(2));
///
/// assert_eq!(removed.len(), 2);
/// assert_eq!(list.to_vec(), vec![Value::from(1), Value::from(3)]);
/// ```
#[derive(Clone)]
pub struct ObservableArray {
    observable: Observable,
}

impl ObservableArray {
    pub fn new(array: impl Into<Array>) -> Self {
        Self {
            observable: Observable::new(Value::Array(array.into())),
        }
    }

    /// Read the current value, registering a dependency when detecting.
    pub fn get(&self) -> Value {
        self.observable.get()
    }

    pub fn peek(&self) -> Value {
        self.observable.peek()
    }

    /// Replace the held value. Writing any array always notifies.
    pub fn set(&self, value: impl Into<Value>) -> bool {
        self.observable.set(value)
    }

    pub fn value_has_mutated(&self) {
        self.observable.value_has_mutated();
    }

    pub fn subscribe(&self, callback: impl Fn(&Value) + 'static) -> Subscription {
        self.observable.subscribe(callback)
    }

    pub fn subscribable(&self) -> &Subscribable {
        self.observable.subscribable()
    }

    pub fn ptr_eq(&self, other: &ObservableArray) -> bool {
        self.observable.ptr_eq(&other.observable)
    }

    /// The array currently held, without registering a dependency.
    pub fn underlying(&self) -> Option<Array> {
        match self.peek() {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Snapshot of the held array's items (empty if not an array).
    pub fn to_vec(&self) -> Vec<Value> {
        self.underlying().map(|a| a.to_vec()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.underlying().map_or(0, |a| a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // FORWARDING MUTATORS
    // =========================================================================

    fn mutate<R: Default>(&self, f: impl FnOnce(&Array) -> R) -> R {
        let Some(array) = self.underlying() else {
            return R::default();
        };
        let result = f(&array);
        self.value_has_mutated();
        result
    }

    pub fn push(&self, items: impl IntoIterator<Item = Value>) -> usize {
        self.mutate(|a| a.push(items))
    }

    pub fn pop(&self) -> Value {
        self.mutate(|a| a.pop())
    }

    pub fn shift(&self) -> Value {
        self.mutate(|a| a.shift())
    }

    pub fn unshift(&self, items: impl IntoIterator<Item = Value>) -> usize {
        self.mutate(|a| a.unshift(items))
    }

    pub fn reverse(&self) {
        self.mutate(|a| {
            a.reverse();
        })
    }

    pub fn sort(&self) {
        self.mutate(|a| {
            a.sort();
        })
    }

    pub fn sort_by(&self, compare: impl FnMut(&Value, &Value) -> Ordering) {
        self.mutate(|a| {
            a.sort_by(compare);
        })
    }

    pub fn splice(
        &self,
        start: usize,
        delete_count: usize,
        items: impl IntoIterator<Item = Value>,
    ) -> Vec<Value> {
        self.mutate(|a| a.splice(start, delete_count, items))
    }

    // =========================================================================
    // COMPOSITE MUTATORS
    // =========================================================================

    /// Remove every item for which `predicate` holds, returning them.
    ///
    /// Notifies once if anything was removed.
    pub fn remove_where(&self, mut predicate: impl FnMut(&Value) -> bool) -> Vec<Value> {
        let Some(array) = self.underlying() else {
            return Vec::new();
        };

        let mut removed = Vec::new();
        let mut index = 0;
        while let Some(item) = array.get(index) {
            if predicate(&item) {
                array.splice(index, 1, []);
                removed.push(item);
            } else {
                index += 1;
            }
        }

        if !removed.is_empty() {
            self.value_has_mutated();
        }
        removed
    }

    /// Remove every item strictly equal to `value`.
    pub fn remove(&self, value: &Value) -> Vec<Value> {
        self.remove_where(|item| item == value)
    }

    /// Remove the listed items, or everything when `values` is `None`.
    pub fn remove_all(&self, values: Option<&[Value]>) -> Vec<Value> {
        match values {
            Some(values) => self.remove_where(|item| values.contains(item)),
            None => self.mutate(|a| a.splice(0, a.len(), [])),
        }
    }

    /// Mark every object item matching `predicate` with `_destroy = true`.
    ///
    /// Items stay in the array; non-object items are skipped. Always notifies.
    pub fn destroy_where(&self, mut predicate: impl FnMut(&Value) -> bool) {
        self.mutate(|a| {
            for item in a.to_vec() {
                if let Value::Object(object) = &item {
                    if predicate(&item) {
                        object.set(DESTROY_MARKER, Value::Bool(true));
                    }
                }
            }
        })
    }

    pub fn destroy(&self, value: &Value) {
        self.destroy_where(|item| item == value)
    }

    /// Mark the listed items, or every item when `values` is `None`.
    pub fn destroy_all(&self, values: Option<&[Value]>) {
        match values {
            Some(values) => self.destroy_where(|item| values.contains(item)),
            None => self.destroy_where(|_| true),
        }
    }

    /// Replace the first item strictly equal to `old` with `new`.
    ///
    /// The slot is overwritten in place (not spliced). Returns true if found.
    pub fn replace(&self, old: &Value, new: Value) -> bool {
        let Some(array) = self.underlying() else {
            return false;
        };
        let Some(index) = array.index_of(old) else {
            return false;
        };
        array.set(index, new);
        self.value_has_mutated();
        true
    }
}

impl fmt::Debug for ObservableArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableArray")
            .field("value", &self.peek())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::Object;
    use crate::{array, object};
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter(list: &ObservableArray) -> Rc<Cell<usize>> {
        let hits = Rc::new(Cell::new(0));
        let sink = hits.clone();
        list.subscribe(move |_| sink.set(sink.get() + 1));
        hits
    }

    #[test]
    fn wraps_the_same_instance() {
        let items = array![1, 2];
        let list = ObservableArray::new(items.clone());
        assert!(list.underlying().is_some_and(|a| a.ptr_eq(&items)));
    }

    #[test]
    fn push_notifies_once() {
        let list = ObservableArray::new(array![1]);
        let hits = counter(&list);

        assert_eq!(list.push([Value::from(2), Value::from(3)]), 3);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn remove_returns_removed_items() {
        let list = ObservableArray::new(array![1, 2, 1, 3]);
        let hits = counter(&list);

        let removed = list.remove(&Value::from(1));
        assert_eq!(removed, vec![Value::from(1), Value::from(1)]);
        assert_eq!(list.to_vec(), vec![Value::from(2), Value::from(3)]);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn remove_nothing_is_silent() {
        let list = ObservableArray::new(array![1, 2]);
        let hits = counter(&list);

        assert!(list.remove(&Value::from(9)).is_empty());
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn remove_where_predicate() {
        let list = ObservableArray::new(array![1, 2, 3, 4]);
        list.remove_where(|v| v.as_number().is_some_and(|n| n > 2.0));
        assert_eq!(list.to_vec(), vec![Value::from(1), Value::from(2)]);
    }

    #[test]
    fn remove_all_variants() {
        let list = ObservableArray::new(array![1, 2, 3]);
        let removed = list.remove_all(Some(&[Value::from(1), Value::from(3)]));
        assert_eq!(removed.len(), 2);
        assert_eq!(list.to_vec(), vec![Value::from(2)]);

        let hits = counter(&list);
        assert_eq!(list.remove_all(None), vec![Value::from(2)]);
        assert!(list.is_empty());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn destroy_marks_objects_without_removing() {
        let a = object! { "id" => 1 };
        let b = object! { "id" => 2 };
        let list = ObservableArray::new(array![a.clone(), b.clone(), 7]);
        let hits = counter(&list);

        list.destroy(&Value::from(&a));
        assert_eq!(a.get(DESTROY_MARKER), Value::Bool(true));
        assert!(b.get(DESTROY_MARKER).is_undefined());
        assert_eq!(list.len(), 3);
        assert_eq!(hits.get(), 1);

        list.destroy_all(None);
        assert_eq!(b.get(DESTROY_MARKER), Value::Bool(true));
    }

    #[test]
    fn destroy_all_with_list() {
        let a = Object::new();
        let b = Object::new();
        let list = ObservableArray::new(array![a.clone(), b.clone()]);

        list.destroy_all(Some(&[Value::from(&b)]));
        assert!(a.get(DESTROY_MARKER).is_undefined());
        assert_eq!(b.get(DESTROY_MARKER), Value::Bool(true));
    }

    #[test]
    fn replace_overwrites_first_match() {
        let list = ObservableArray::new(array!["a", "b", "a"]);
        let hits = counter(&list);

        assert!(list.replace(&Value::from("a"), Value::from("z")));
        assert_eq!(
            list.to_vec(),
            vec![Value::from("z"), Value::from("b"), Value::from("a")]
        );
        assert!(!list.replace(&Value::from("missing"), Value::Null));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn non_array_value_makes_mutators_inert() {
        let list = ObservableArray::new(array![1]);
        list.set(Value::Null);
        assert_eq!(list.push([Value::from(1)]), 0);
        assert!(list.remove_all(None).is_empty());
        assert!(list.is_empty());
    }
}

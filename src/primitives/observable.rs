// ============================================================================
// spark-props - Observable
// The writable scalar reactive cell
// ============================================================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::core::value::Value;
use crate::reactivity::equality::{primitive_equals, EqualsFn};
use crate::reactivity::subscribable::{Subscribable, Subscription};
use crate::reactivity::tracking::register_dependency;

// =============================================================================
// OPTIONS
// =============================================================================

/// Options for creating an observable.
#[derive(Clone, Copy)]
pub struct ObservableOptions {
    /// Decides whether a write is a change. Defaults to [`primitive_equals`].
    pub equals: EqualsFn,
}

impl Default for ObservableOptions {
    fn default() -> Self {
        Self {
            equals: primitive_equals,
        }
    }
}

// =============================================================================
// OBSERVABLE
// =============================================================================

struct ObservableInner {
    value: RefCell<Value>,
    subscribable: Subscribable,
    equals: EqualsFn,
}

/// A reactive cell holding a [`Value`].
///
/// Reading with [`get`](Self::get) inside a computed evaluation registers a
/// dependency; writing with [`set`](Self::set) notifies subscribers unless
/// the comparer reports the old and new values as equal.
///
/// # Example
///
/// ```
/// use spark_props::{Observable, Value};
///
/// let name = Observable::new(Value::from("Ada"));
/// assert_eq!(name.get(), Value::from("Ada"));
///
/// assert!(name.set(Value::from("Grace")));
/// assert!(!name.set(Value::from("Grace")));
/// ```
#[derive(Clone)]
pub struct Observable {
    inner: Rc<ObservableInner>,
}

impl Observable {
    pub fn new(value: impl Into<Value>) -> Self {
        Self::with_options(value, ObservableOptions::default())
    }

    pub fn with_options(value: impl Into<Value>, options: ObservableOptions) -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                value: RefCell::new(value.into()),
                subscribable: Subscribable::new(),
                equals: options.equals,
            }),
        }
    }

    /// Read the value, registering a dependency when detecting.
    pub fn get(&self) -> Value {
        register_dependency(&self.inner.subscribable);
        self.peek()
    }

    /// Read the value without registering a dependency.
    pub fn peek(&self) -> Value {
        self.inner.value.borrow().clone()
    }

    /// Write the value. Returns true if it counted as a change.
    pub fn set(&self, value: impl Into<Value>) -> bool {
        let value = value.into();
        let changed = !(self.inner.equals)(&self.inner.value.borrow(), &value);

        if changed {
            *self.inner.value.borrow_mut() = value.clone();
            self.inner.subscribable.notify_subscribers(&value);
        }
        changed
    }

    /// Notify subscribers with the current value without replacing it.
    ///
    /// For values whose internal state changed in a way the cell cannot see.
    pub fn value_has_mutated(&self) {
        let current = self.peek();
        self.inner.subscribable.notify_subscribers(&current);
    }

    pub fn subscribe(&self, callback: impl Fn(&Value) + 'static) -> Subscription {
        self.inner.subscribable.subscribe(callback)
    }

    pub fn subscribable(&self) -> &Subscribable {
        &self.inner.subscribable
    }

    pub fn ptr_eq(&self, other: &Observable) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.peek())
            .field("subscribers", &self.inner.subscribable.subscriber_count())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::Array;
    use crate::reactivity::equality::strict_equals;
    use std::cell::Cell;

    fn counter(observable: &Observable) -> Rc<Cell<usize>> {
        let hits = Rc::new(Cell::new(0));
        let sink = hits.clone();
        observable.subscribe(move |_| sink.set(sink.get() + 1));
        hits
    }

    #[test]
    fn set_notifies_on_change_only() {
        let count = Observable::new(0);
        let hits = counter(&count);

        assert!(count.set(1));
        assert!(!count.set(1));
        assert_eq!(hits.get(), 1);
        assert_eq!(count.get(), Value::from(1));
    }

    #[test]
    fn writing_same_array_instance_notifies() {
        let items = Array::from(vec![Value::from(1)]);
        let observable = Observable::new(&items);
        let hits = counter(&observable);

        assert!(observable.set(&items));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn strict_comparer_ignores_same_instance() {
        let items = Array::new();
        let observable = Observable::with_options(
            &items,
            ObservableOptions {
                equals: strict_equals,
            },
        );
        let hits = counter(&observable);

        assert!(!observable.set(&items));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn value_has_mutated_keeps_reference() {
        let items = Array::new();
        let observable = Observable::new(&items);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        observable.subscribe(move |v| sink.borrow_mut().push(v.clone()));

        observable.value_has_mutated();

        assert_eq!(*seen.borrow(), vec![Value::from(&items)]);
        assert_eq!(observable.peek(), Value::from(&items));
    }

    #[test]
    fn clones_share_state() {
        let a = Observable::new("x");
        let b = a.clone();
        a.set("y");
        assert_eq!(b.peek(), Value::from("y"));
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn debug_shows_value() {
        let observable = Observable::new(42);
        assert!(format!("{observable:?}").contains("42"));
    }
}

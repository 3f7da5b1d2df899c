// ============================================================================
// spark-props - Observable Handle
// The reactive cell behind one tracked property
// ============================================================================

use std::fmt;

use crate::core::value::Value;
use crate::error::Result;
use crate::primitives::computed::Computed;
use crate::primitives::observable::Observable;
use crate::primitives::observable_array::ObservableArray;
use crate::reactivity::subscribable::{Subscribable, Subscription};

/// Any of the reactive cells a property can be backed by.
#[derive(Clone)]
pub enum ObservableHandle {
    Scalar(Observable),
    Array(ObservableArray),
    Computed(Computed),
}

impl ObservableHandle {
    /// Read the value, registering a dependency when detecting.
    pub fn get(&self) -> Value {
        match self {
            ObservableHandle::Scalar(o) => o.get(),
            ObservableHandle::Array(a) => a.get(),
            ObservableHandle::Computed(c) => c.get(),
        }
    }

    pub fn peek(&self) -> Value {
        match self {
            ObservableHandle::Scalar(o) => o.peek(),
            ObservableHandle::Array(a) => a.peek(),
            ObservableHandle::Computed(c) => c.peek(),
        }
    }

    /// Write the value. Fails only for computeds without a write function.
    pub fn set(&self, value: impl Into<Value>) -> Result<()> {
        match self {
            ObservableHandle::Scalar(o) => {
                o.set(value);
                Ok(())
            }
            ObservableHandle::Array(a) => {
                a.set(value);
                Ok(())
            }
            ObservableHandle::Computed(c) => c.set(value),
        }
    }

    pub fn is_writable(&self) -> bool {
        match self {
            ObservableHandle::Computed(c) => c.is_writable(),
            _ => true,
        }
    }

    /// Notify subscribers without changing the stored value.
    pub fn value_has_mutated(&self) {
        match self {
            ObservableHandle::Scalar(o) => o.value_has_mutated(),
            ObservableHandle::Array(a) => a.value_has_mutated(),
            ObservableHandle::Computed(c) => c.value_has_mutated(),
        }
    }

    pub fn subscribe(&self, callback: impl Fn(&Value) + 'static) -> Subscription {
        match self {
            ObservableHandle::Scalar(o) => o.subscribe(callback),
            ObservableHandle::Array(a) => a.subscribe(callback),
            ObservableHandle::Computed(c) => c.subscribe(callback),
        }
    }

    pub fn subscribable(&self) -> &Subscribable {
        match self {
            ObservableHandle::Scalar(o) => o.subscribable(),
            ObservableHandle::Array(a) => a.subscribable(),
            ObservableHandle::Computed(c) => c.subscribable(),
        }
    }

    /// True if both handles refer to the same cell.
    pub fn ptr_eq(&self, other: &ObservableHandle) -> bool {
        self.subscribable().ptr_eq(other.subscribable())
    }

    pub fn as_array(&self) -> Option<&ObservableArray> {
        match self {
            ObservableHandle::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_computed(&self) -> Option<&Computed> {
        match self {
            ObservableHandle::Computed(c) => Some(c),
            _ => None,
        }
    }
}

impl PartialEq for ObservableHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObservableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservableHandle::Scalar(o) => fmt::Debug::fmt(o, f),
            ObservableHandle::Array(a) => fmt::Debug::fmt(a, f),
            ObservableHandle::Computed(c) => fmt::Debug::fmt(c, f),
        }
    }
}

impl From<Observable> for ObservableHandle {
    fn from(observable: Observable) -> Self {
        ObservableHandle::Scalar(observable)
    }
}

impl From<ObservableArray> for ObservableHandle {
    fn from(array: ObservableArray) -> Self {
        ObservableHandle::Array(array)
    }
}

impl From<Computed> for ObservableHandle {
    fn from(computed: Computed) -> Self {
        ObservableHandle::Computed(computed)
    }
}

// =============================================================================
// PREDICATES
// =============================================================================

/// True if `value` already is a reactive cell.
pub fn is_observable(value: &Value) -> bool {
    matches!(value, Value::Reactive(_))
}

/// True if `value` is a reactive cell that accepts writes.
pub fn is_writable_observable(value: &Value) -> bool {
    matches!(value, Value::Reactive(handle) if handle.is_writable())
}

// =============================================================================
// TESTS
// =============================================================================

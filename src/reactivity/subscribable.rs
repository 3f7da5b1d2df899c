// ============================================================================
// spark-props - Subscribable
// Broadcast of change notifications to registered callbacks
// ============================================================================
//
// Notification uses the collect-then-call pattern: the listener list is
// snapshotted and its borrow released before any callback runs. Callbacks
// may therefore subscribe, dispose (themselves or others) and notify again
// without hitting a RefCell borrow panic. A listener disposed mid-round is
// skipped; one added mid-round first fires on the next notification.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::core::value::Value;

type Callback = Box<dyn Fn(&Value)>;

struct Listener {
    callback: Callback,
    disposed: Cell<bool>,
}

struct SubscribableInner {
    listeners: RefCell<Vec<Rc<Listener>>>,
}

// =============================================================================
// SUBSCRIBABLE
// =============================================================================

/// A change broadcaster.
///
/// Cloning produces another handle to the same listener list.
///
/// # Example
///
/// ```
/// use spark_props::{Subscribable, Value};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let hub = Subscribable::new();
/// let hits = Rc::new(Cell::new(0));
///
/// let counter = hits.clone();
/// let sub = hub.subscribe(move |_| counter.set(counter.get() + 1));
///
/// hub.notify_subscribers(&Value::from(1));
/// sub.dispose();
/// hub.notify_subscribers(&Value::from(2));
///
/// assert_eq!(hits.get(), 1);
/// ```
#[derive(Clone)]
pub struct Subscribable {
    inner: Rc<SubscribableInner>,
}

impl Subscribable {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SubscribableInner {
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register `callback`, returning the subscription that detaches it.
    pub fn subscribe(&self, callback: impl Fn(&Value) + 'static) -> Subscription {
        let listener = Rc::new(Listener {
            callback: Box::new(callback),
            disposed: Cell::new(false),
        });
        self.inner.listeners.borrow_mut().push(listener.clone());
        Subscription {
            listener,
            owner: Rc::downgrade(&self.inner),
        }
    }

    /// Call every live listener with `value`, in registration order.
    pub fn notify_subscribers(&self, value: &Value) {
        let snapshot: Vec<Rc<Listener>> = self.inner.listeners.borrow().clone();
        // Borrow on listeners is released

        for listener in snapshot {
            if !listener.disposed.get() {
                (listener.callback)(value);
            }
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|listener| !listener.disposed.get())
            .count()
    }

    pub fn has_subscribers(&self) -> bool {
        self.subscriber_count() > 0
    }

    /// True if both handles share one listener list.
    pub fn ptr_eq(&self, other: &Subscribable) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// A handle that does not keep the listener list alive.
    pub fn downgrade(&self) -> WeakSubscribable {
        WeakSubscribable {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Non-owning counterpart of [`Subscribable`].
#[derive(Clone)]
pub struct WeakSubscribable {
    inner: Weak<SubscribableInner>,
}

impl WeakSubscribable {
    pub fn upgrade(&self) -> Option<Subscribable> {
        self.inner.upgrade().map(|inner| Subscribable { inner })
    }
}

impl Default for Subscribable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Subscribable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribable")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// A disposable registration on a [`Subscribable`].
///
/// Dropping a subscription does NOT detach it; call [`dispose`](Self::dispose).
pub struct Subscription {
    listener: Rc<Listener>,
    owner: Weak<SubscribableInner>,
}

impl Subscription {
    /// Stop receiving notifications. Idempotent, effective immediately.
    pub fn dispose(&self) {
        if self.listener.disposed.replace(true) {
            return;
        }
        if let Some(owner) = self.owner.upgrade() {
            owner
                .listeners
                .borrow_mut()
                .retain(|listener| !Rc::ptr_eq(listener, &self.listener));
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.listener.disposed.get()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

// ============================================================================
// spark-props - Computed Values
// Derived observables that cache their value and track what they read
// ============================================================================
//
// A Computed evaluates its read function inside a dependency frame, then
// subscribes to every source the read touched (keeping subscriptions for
// sources read again, disposing those no longer read). When any source
// notifies, the computed re-evaluates synchronously and notifies its own
// subscribers if the new value differs under `primitive_equals`.
//
// With `defer_evaluation`, nothing runs until the first read or the first
// subscription. The first evaluation never notifies.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::core::context::DependencyFrame;
use crate::core::value::Value;
use crate::error::{Error, Result};
use crate::reactivity::equality::primitive_equals;
use crate::reactivity::subscribable::{Subscribable, Subscription};
use crate::reactivity::tracking::{register_dependency, with_dependency_frame};

// =============================================================================
// TYPE ALIASES
// =============================================================================

/// Read function of a computed value
pub type ReadFn = Rc<dyn Fn() -> Value>;

/// Write function of a writable computed value
pub type WriteFn = Rc<dyn Fn(Value)>;

// =============================================================================
// OPTIONS
// =============================================================================

/// Construction options for [`Computed`].
#[derive(Clone)]
pub struct ComputedOptions {
    read: ReadFn,
    write: Option<WriteFn>,
    defer_evaluation: bool,
}

impl ComputedOptions {
    pub fn new(read: impl Fn() -> Value + 'static) -> Self {
        Self {
            read: Rc::new(read),
            write: None,
            defer_evaluation: false,
        }
    }

    /// Make the computed writable through `write`.
    pub fn write(mut self, write: impl Fn(Value) + 'static) -> Self {
        self.write = Some(Rc::new(write));
        self
    }

    /// Postpone the first evaluation until the value is read or subscribed.
    pub fn defer_evaluation(mut self, defer: bool) -> Self {
        self.defer_evaluation = defer;
        self
    }
}

// =============================================================================
// COMPUTED INNER
// =============================================================================

struct ComputedInner {
    read: ReadFn,
    write: Option<WriteFn>,
    value: RefCell<Value>,
    evaluated: Cell<bool>,
    evaluating: Cell<bool>,
    disposed: Cell<bool>,
    evaluations: Cell<u64>,
    dependencies: RefCell<Vec<(Subscribable, Subscription)>>,
    subscribable: Subscribable,
    self_ref: Weak<ComputedInner>,
}

struct EvaluatingGuard<'a>(&'a Cell<bool>);

impl Drop for EvaluatingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl ComputedInner {
    fn evaluate(&self) {
        if self.evaluating.get() || self.disposed.get() {
            return;
        }
        self.evaluating.set(true);
        let _guard = EvaluatingGuard(&self.evaluating);

        let frame = Rc::new(DependencyFrame::new());
        let new_value = with_dependency_frame(frame.clone(), || (self.read)());
        self.evaluations.set(self.evaluations.get() + 1);
        self.rebind(frame.take());

        let first = !self.evaluated.replace(true);
        let changed = !primitive_equals(&self.value.borrow(), &new_value);
        if changed {
            *self.value.borrow_mut() = new_value.clone();
            if !first {
                self.subscribable.notify_subscribers(&new_value);
            }
        }
    }

    /// Subscribe to `sources`, reusing existing subscriptions and disposing
    /// the ones no longer read.
    fn rebind(&self, sources: Vec<Subscribable>) {
        let mut previous: Vec<(Subscribable, Subscription)> =
            self.dependencies.borrow_mut().drain(..).collect();
        let mut next = Vec::with_capacity(sources.len());

        for source in sources {
            if source.ptr_eq(&self.subscribable) {
                continue;
            }
            match previous.iter().position(|(known, _)| known.ptr_eq(&source)) {
                Some(pos) => next.push(previous.swap_remove(pos)),
                None => {
                    let weak = self.self_ref.clone();
                    let subscription = source.subscribe(move |_| {
                        if let Some(inner) = weak.upgrade() {
                            inner.evaluate();
                        }
                    });
                    next.push((source, subscription));
                }
            }
        }

        for (_, stale) in previous {
            stale.dispose();
        }
        *self.dependencies.borrow_mut() = next;
    }

    fn ensure_evaluated(&self) {
        if !self.evaluated.get() {
            self.evaluate();
        }
    }
}

// =============================================================================
// COMPUTED
// =============================================================================

/// A derived observable.
///
/// # Example
///
/// ```
/// use spark_props::{Computed, ComputedOptions, Observable, Value};
///
/// let first = Observable::new("Ada");
/// let last = Observable::new("Lovelace");
///
/// let full = {
///     let (first, last) = (first.clone(), last.clone());
///     Computed::new(ComputedOptions::new(move || {
///         Value::from(format!("{} {}", first.get(), last.get()))
///     }))
/// };
///
/// assert_eq!(full.get(), Value::from("Ada Lovelace"));
/// last.set("Byron");
/// assert_eq!(full.get(), Value::from("Ada Byron"));
/// ```
#[derive(Clone)]
pub struct Computed {
    inner: Rc<ComputedInner>,
}

impl Computed {
    pub fn new(options: ComputedOptions) -> Self {
        let ComputedOptions {
            read,
            write,
            defer_evaluation,
        } = options;

        let inner = Rc::new_cyclic(|self_ref| ComputedInner {
            read,
            write,
            value: RefCell::new(Value::Undefined),
            evaluated: Cell::new(false),
            evaluating: Cell::new(false),
            disposed: Cell::new(false),
            evaluations: Cell::new(0),
            dependencies: RefCell::new(Vec::new()),
            subscribable: Subscribable::new(),
            self_ref: self_ref.clone(),
        });

        if !defer_evaluation {
            inner.evaluate();
        }
        Self { inner }
    }

    /// Read the value, evaluating first if it never ran.
    ///
    /// Registers a dependency when read from another computed.
    pub fn get(&self) -> Value {
        if !self.inner.evaluating.get() {
            register_dependency(&self.inner.subscribable);
        }
        self.peek()
    }

    /// Read without registering a dependency (still evaluates if needed).
    pub fn peek(&self) -> Value {
        self.inner.ensure_evaluated();
        self.inner.value.borrow().clone()
    }

    /// Pass `value` to the write function.
    pub fn set(&self, value: impl Into<Value>) -> Result<()> {
        let write = self.inner.write.clone().ok_or(Error::ReadOnlyComputed)?;
        write(value.into());
        Ok(())
    }

    pub fn is_writable(&self) -> bool {
        self.inner.write.is_some()
    }

    /// Subscribe to changes. Evaluates a deferred computed first.
    pub fn subscribe(&self, callback: impl Fn(&Value) + 'static) -> Subscription {
        self.inner.ensure_evaluated();
        self.inner.subscribable.subscribe(callback)
    }

    /// Notify subscribers with the cached value.
    pub fn value_has_mutated(&self) {
        let current = self.peek();
        self.inner.subscribable.notify_subscribers(&current);
    }

    /// Detach from all dependencies. The last value stays readable.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        let dependencies = self.inner.dependencies.take();
        for (_, subscription) in dependencies {
            subscription.dispose();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Whether the read function has run at least once.
    pub fn is_evaluated(&self) -> bool {
        self.inner.evaluated.get()
    }

    /// How many times the read function has run.
    pub fn evaluation_count(&self) -> u64 {
        self.inner.evaluations.get()
    }

    /// Number of sources the last evaluation subscribed to.
    pub fn dependency_count(&self) -> usize {
        self.inner.dependencies.borrow().len()
    }

    pub fn subscribable(&self) -> &Subscribable {
        &self.inner.subscribable
    }

    pub fn ptr_eq(&self, other: &Computed) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Computed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed")
            .field("value", &self.inner.value.borrow())
            .field("evaluated", &self.inner.evaluated.get())
            .field("writable", &self.is_writable())
            .field("dependencies", &self.dependency_count())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

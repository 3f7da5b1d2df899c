// ============================================================================
// spark-props - Array Reactivity Bridge
// Turns in-place array mutations into property change notifications
// ============================================================================
//
// Two pieces cooperate here:
//
// 1. Every array instance that ever becomes the value of a tracked property
//    gets an `ArrayNotifier`: a subscribable plus a pause flag, attached to
//    the instance exactly once. The array's mutators report through it.
//
// 2. Each array-valued property gets an `ArrayWatch`: a watcher computed
//    that reads the property and, whenever its value changes, moves a single
//    subscription onto the notifier of whatever array the property now holds.
//    That subscription forwards mutations to the property's own subscribers.
//
// Neither piece owns the property handle strongly from the array side, so
// an array kept alive elsewhere does not keep a dropped property alive.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::collections::{Array, ArrayInner};
use crate::core::value::Value;
use crate::core::weak_map::WeakKeyMap;
use crate::primitives::computed::{Computed, ComputedOptions};
use crate::primitives::handle::ObservableHandle;
use crate::reactivity::subscribable::{Subscribable, Subscription};

// =============================================================================
// ARRAY NOTIFIER
// =============================================================================

/// Change broadcaster attached to one array instance.
pub struct ArrayNotifier {
    subscribable: Subscribable,
    paused: Cell<bool>,
}

impl ArrayNotifier {
    pub fn new() -> Self {
        Self {
            subscribable: Subscribable::new(),
            paused: Cell::new(false),
        }
    }

    /// Subscribers receive the mutated array instance itself.
    pub fn subscribable(&self) -> &Subscribable {
        &self.subscribable
    }

    /// True while a composite mutator is running.
    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    /// Suppress per-mutation reports until the guard drops.
    pub(crate) fn pause(&self) -> PauseGuard<'_> {
        PauseGuard {
            flag: &self.paused,
            prev: self.paused.replace(true),
        }
    }

    pub(crate) fn notify(&self, array: &Array) {
        self.subscribable
            .notify_subscribers(&Value::Array(array.clone()));
    }

    pub(crate) fn notify_unless_paused(&self, array: &Array) {
        if !self.is_paused() {
            self.notify(array);
        }
    }
}

impl Default for ArrayNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ArrayNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayNotifier")
            .field("subscribers", &self.subscribable.subscriber_count())
            .field("paused", &self.paused.get())
            .finish()
    }
}

/// Restores the pause flag, even if the composite operation panics.
pub(crate) struct PauseGuard<'a> {
    flag: &'a Cell<bool>,
    prev: bool,
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.prev);
    }
}

// =============================================================================
// ARRAY SUBSCRIBABLE REGISTRY
// =============================================================================

/// Non-owning map from array instances to their notifiers.
#[derive(Default)]
pub struct ArraySubscribableRegistry {
    notifiers: RefCell<WeakKeyMap<ArrayInner, Rc<ArrayNotifier>>>,
}

impl ArraySubscribableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The notifier for `array`, hooking the instance on first encounter.
    ///
    /// An array already hooked by another tracker keeps its notifier, so
    /// every instance has exactly one.
    pub fn notifier_for(&self, array: &Array) -> Rc<ArrayNotifier> {
        if let Some(notifier) = self.notifiers.borrow().get(array.inner_rc()) {
            return notifier.clone();
        }

        let notifier = match array.notifier() {
            Some(existing) => existing,
            None => {
                trace!(len = array.len(), "hooking array mutators");
                array.attach_notifier(Rc::new(ArrayNotifier::new()))
            }
        };
        self.notifiers
            .borrow_mut()
            .insert(array.inner_rc(), notifier.clone());
        notifier
    }

    /// The notifier for `array` if this registry has seen it.
    pub fn get(&self, array: &Array) -> Option<Rc<ArrayNotifier>> {
        self.notifiers.borrow().get(array.inner_rc()).cloned()
    }

    /// Number of live array instances known to the registry.
    pub fn len(&self) -> usize {
        self.notifiers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// ARRAY WATCH
// =============================================================================

/// Keeps one property subscribed to mutations of the array it currently holds.
///
/// Dropping the watch disposes it.
pub struct ArrayWatch {
    watcher: Computed,
    current: Rc<RefCell<Option<Subscription>>>,
}

impl ArrayWatch {
    /// Stop following the property and drop the array subscription.
    pub fn dispose(&self) {
        self.watcher.dispose();
        if let Some(subscription) = self.current.borrow_mut().take() {
            subscription.dispose();
        }
    }

    /// True while an array subscription is in place.
    pub fn is_active(&self) -> bool {
        self.current
            .borrow()
            .as_ref()
            .is_some_and(|s| !s.is_disposed())
    }
}

impl Drop for ArrayWatch {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for ArrayWatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayWatch")
            .field("active", &self.is_active())
            .field("disposed", &self.watcher.is_disposed())
            .finish()
    }
}

// =============================================================================
// ARRAY REACTIVITY BRIDGE
// =============================================================================

/// Connects array instances to the properties that hold them.
pub struct ArrayReactivityBridge {
    registry: Rc<ArraySubscribableRegistry>,
}

impl ArrayReactivityBridge {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(ArraySubscribableRegistry::new()),
        }
    }

    pub fn registry(&self) -> &ArraySubscribableRegistry {
        &self.registry
    }

    /// Hook `array` so its mutators notify; idempotent per instance.
    pub fn hook(&self, array: &Array) -> Rc<ArrayNotifier> {
        self.registry.notifier_for(array)
    }

    /// Make `handle` notify whenever the array it holds, now or after any
    /// future reassignment, is mutated in place.
    ///
    /// Each time the handle's value changes the previous array subscription
    /// is disposed before the new one is made. Non-array values leave the
    /// property without an array subscription.
    pub fn notify_when_present_or_future_array_values_mutate(
        &self,
        handle: &ObservableHandle,
    ) -> ArrayWatch {
        let current: Rc<RefCell<Option<Subscription>>> = Rc::default();

        let registry = self.registry.clone();
        let target = handle.clone();
        let slot = current.clone();
        let watcher = Computed::new(ComputedOptions::new(move || {
            if let Some(previous) = slot.borrow_mut().take() {
                previous.dispose();
            }

            if let Value::Array(array) = target.get() {
                let notifier = registry.notifier_for(&array);
                let property = target.subscribable().downgrade();
                let subscription = notifier.subscribable().subscribe(move |mutated| {
                    if let Some(property) = property.upgrade() {
                        property.notify_subscribers(mutated);
                    }
                });
                trace!(len = array.len(), "array watch subscribed");
                *slot.borrow_mut() = Some(subscription);
            }
            Value::Undefined
        }));

        ArrayWatch { watcher, current }
    }
}

impl Default for ArrayReactivityBridge {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

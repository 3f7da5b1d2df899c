// ============================================================================
// spark-props - Array
// A shared, ordered list of values with an optional mutation hook
// ============================================================================
//
// Arrays are plain lists until the tracker hooks them. Hooking installs a
// notifier once per instance; from then on every standard mutator reports
// after it has changed the items, and the composite mutators (remove,
// destroy, replace and their variants) report exactly once in total.
//
// Items are never borrowed while user code runs: comparators, predicates
// and notifier callbacks all see an unborrowed array.
// ============================================================================

use std::cell::{OnceCell, RefCell};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::core::value::Value;
use crate::primitives::observable_array::ObservableArray;
use crate::tracker::array_bridge::ArrayNotifier;

pub struct ArrayInner {
    items: RefCell<Vec<Value>>,
    notifier: OnceCell<Rc<ArrayNotifier>>,
}

/// A shared list of [`Value`]s. Cloning yields another reference to the same list.
///
/// # Example
///
/// ```
/// use spark_props::{array, Value};
///
/// let list = array![3, 1, 2];
/// list.push([Value::from(10)]);
/// list.sort();
///
/// // Default ordering compares string forms, like the scripting-language sort.
/// assert_eq!(list.to_string(), "1,10,2,3");
/// ```
#[derive(Clone)]
pub struct Array {
    inner: Rc<ArrayInner>,
}

impl Array {
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner.items.borrow().get(index).cloned()
    }

    /// Write one slot without reporting a mutation.
    ///
    /// Writing past the end pads with undefined.
    pub fn set(&self, index: usize, value: impl Into<Value>) {
        let mut items = self.inner.items.borrow_mut();
        if index >= items.len() {
            items.resize(index + 1, Value::Undefined);
        }
        items[index] = value.into();
    }

    /// Position of the first item strictly equal to `value`.
    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.inner.items.borrow().iter().position(|item| item == value)
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.index_of(value).is_some()
    }

    /// Snapshot of the items.
    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.items.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn inner_rc(&self) -> &Rc<ArrayInner> {
        &self.inner
    }

    // =========================================================================
    // STANDARD MUTATORS
    // =========================================================================

    /// Append items, returning the new length.
    pub fn push(&self, items: impl IntoIterator<Item = Value>) -> usize {
        let items: Vec<Value> = items.into_iter().collect();
        let len = {
            let mut current = self.inner.items.borrow_mut();
            current.extend(items);
            current.len()
        };
        self.mutated();
        len
    }

    /// Remove the last item; undefined when empty.
    pub fn pop(&self) -> Value {
        let popped = self.inner.items.borrow_mut().pop();
        self.mutated();
        popped.unwrap_or_default()
    }

    /// Remove the first item; undefined when empty.
    pub fn shift(&self) -> Value {
        let shifted = {
            let mut current = self.inner.items.borrow_mut();
            (!current.is_empty()).then(|| current.remove(0))
        };
        self.mutated();
        shifted.unwrap_or_default()
    }

    /// Prepend items, returning the new length.
    pub fn unshift(&self, items: impl IntoIterator<Item = Value>) -> usize {
        let items: Vec<Value> = items.into_iter().collect();
        let len = {
            let mut current = self.inner.items.borrow_mut();
            current.splice(0..0, items);
            current.len()
        };
        self.mutated();
        len
    }

    pub fn reverse(&self) {
        self.inner.items.borrow_mut().reverse();
        self.mutated();
    }

    /// Stable sort by string form, with undefined items last.
    pub fn sort(&self) {
        self.sort_by(default_order);
    }

    /// Stable sort with a caller comparator.
    ///
    /// The comparator sees a snapshot; the array is untouched if it panics.
    pub fn sort_by(&self, compare: impl FnMut(&Value, &Value) -> Ordering) {
        let mut items = self.to_vec();
        items.sort_by(compare);
        *self.inner.items.borrow_mut() = items;
        self.mutated();
    }

    /// Remove `delete_count` items from `start` and insert `items` there.
    ///
    /// Both bounds are clamped to the array. Returns the removed items.
    pub fn splice(
        &self,
        start: usize,
        delete_count: usize,
        items: impl IntoIterator<Item = Value>,
    ) -> Vec<Value> {
        let items: Vec<Value> = items.into_iter().collect();
        let removed = {
            let mut current = self.inner.items.borrow_mut();
            let start = start.min(current.len());
            let end = start.saturating_add(delete_count).min(current.len());
            current.splice(start..end, items).collect()
        };
        self.mutated();
        removed
    }

    // =========================================================================
    // COMPOSITE MUTATORS
    // =========================================================================

    /// Remove every item strictly equal to `value`.
    pub fn remove(&self, value: &Value) -> Vec<Value> {
        self.composite(|list| list.remove(value))
    }

    pub fn remove_where(&self, predicate: impl FnMut(&Value) -> bool) -> Vec<Value> {
        self.composite(|list| list.remove_where(predicate))
    }

    /// Remove the listed items, or everything when `values` is `None`.
    pub fn remove_all(&self, values: Option<&[Value]>) -> Vec<Value> {
        self.composite(|list| list.remove_all(values))
    }

    /// Mark matching object items with `_destroy = true`, keeping them in place.
    pub fn destroy(&self, value: &Value) {
        self.composite(|list| list.destroy(value))
    }

    pub fn destroy_where(&self, predicate: impl FnMut(&Value) -> bool) {
        self.composite(|list| list.destroy_where(predicate))
    }

    pub fn destroy_all(&self, values: Option<&[Value]>) {
        self.composite(|list| list.destroy_all(values))
    }

    /// Overwrite the first item strictly equal to `old`. Returns true if found.
    pub fn replace(&self, old: &Value, new: impl Into<Value>) -> bool {
        let new = new.into();
        self.composite(|list| list.replace(old, new))
    }

    /// Run a composite operation with reporting paused, then report once.
    ///
    /// Nested inside another composite, the report is left to the outer one.
    fn composite<R>(&self, operation: impl FnOnce(&ObservableArray) -> R) -> R {
        let notifier = self.notifier();
        let result = {
            let _paused = notifier.as_ref().map(|n| n.pause());
            operation(&ObservableArray::new(self.clone()))
        };
        if let Some(notifier) = notifier {
            notifier.notify_unless_paused(self);
        }
        result
    }

    // =========================================================================
    // MUTATION HOOK
    // =========================================================================

    /// The notifier installed by the tracker, if any.
    pub fn notifier(&self) -> Option<Rc<ArrayNotifier>> {
        self.inner.notifier.get().cloned()
    }

    pub fn is_hooked(&self) -> bool {
        self.inner.notifier.get().is_some()
    }

    /// Install `notifier` unless one is already present.
    ///
    /// Returns the notifier that ends up attached.
    pub(crate) fn attach_notifier(&self, notifier: Rc<ArrayNotifier>) -> Rc<ArrayNotifier> {
        self.inner.notifier.get_or_init(|| notifier).clone()
    }

    fn mutated(&self) {
        if let Some(notifier) = self.inner.notifier.get().cloned() {
            notifier.notify_unless_paused(self);
        }
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Value>> for Array {
    fn from(items: Vec<Value>) -> Self {
        Self {
            inner: Rc::new(ArrayInner {
                items: RefCell::new(items),
                notifier: OnceCell::new(),
            }),
        }
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.items.try_borrow() {
            Ok(items) => f.debug_list().entries(items.iter()).finish(),
            Err(_) => f.write_str("[<borrowed>]"),
        }
    }
}

/// Items joined with commas; undefined and null print as empty slots.
impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.to_vec().iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if !matches!(item, Value::Undefined | Value::Null) {
                write!(f, "{item}")?;
            }
        }
        Ok(())
    }
}

fn default_order(a: &Value, b: &Value) -> Ordering {
    match (a.is_undefined(), b.is_undefined()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.to_string().cmp(&b.to_string()),
    }
}

// =============================================================================
// TESTS
// =============================================================================

// ============================================================================
// spark-props - Dependency Detection
// Recording which observables a computed value reads
// ============================================================================
//
// Every observable read calls `register_dependency` with the observable's
// subscribable. If a computed value is evaluating (a collecting frame is on
// top of the context stack), the source is recorded there; the computed then
// subscribes to each recorded source once evaluation finishes.
//
// Frames are pushed and popped through guards so that a panicking read
// function never leaves a stale frame behind.
// ============================================================================

use std::rc::Rc;

use crate::core::context::{with_context, DependencyFrame};
use crate::reactivity::subscribable::Subscribable;

// =============================================================================
// REGISTER DEPENDENCY
// =============================================================================

/// Record a read of `source` in the innermost collecting frame, if any.
pub fn register_dependency(source: &Subscribable) {
    if let Some(frame) = with_context(|ctx| ctx.current_frame()) {
        frame.add(source);
    }
}

// =============================================================================
// FRAMES
// =============================================================================

struct FrameGuard;

impl Drop for FrameGuard {
    fn drop(&mut self) {
        with_context(|ctx| ctx.pop_frame());
    }
}

/// Run `f` with `frame` collecting every dependency it reads.
pub fn with_dependency_frame<T>(frame: Rc<DependencyFrame>, f: impl FnOnce() -> T) -> T {
    with_context(|ctx| ctx.push_frame(Some(frame)));
    let _guard = FrameGuard;
    f()
}

/// Read observables without registering dependencies.
///
/// # Example
///
/// ```
/// use spark_props::{ignore_dependencies, Computed, ComputedOptions, Observable, Value};
///
/// let tracked = Observable::new(Value::from(1));
/// let ignored = Observable::new(Value::from(10));
///
/// let sum = {
///     let (tracked, ignored) = (tracked.clone(), ignored.clone());
///     Computed::new(ComputedOptions::new(move || {
///         let a = tracked.get().as_number().unwrap_or(0.0);
///         let b = ignore_dependencies(|| ignored.get()).as_number().unwrap_or(0.0);
///         Value::from(a + b)
///     }))
/// };
///
/// assert_eq!(sum.dependency_count(), 1);
/// ```
pub fn ignore_dependencies<T>(f: impl FnOnce() -> T) -> T {
    with_context(|ctx| ctx.push_frame(None));
    let _guard = FrameGuard;
    f()
}

// =============================================================================
// TESTS
// =============================================================================

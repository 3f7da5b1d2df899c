// ============================================================================
// spark-props - Reactive Context
// Thread-local state for dependency detection
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::reactivity::subscribable::Subscribable;

// =============================================================================
// DEPENDENCY FRAME
// =============================================================================

/// Collects the sources read while a computed value evaluates.
///
/// Sources are deduplicated by identity and kept in first-read order.
#[derive(Default)]
pub struct DependencyFrame {
    sources: RefCell<Vec<Subscribable>>,
}

impl DependencyFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a read of `source`. Repeated reads are ignored.
    pub fn add(&self, source: &Subscribable) {
        let mut sources = self.sources.borrow_mut();
        if !sources.iter().any(|known| known.ptr_eq(source)) {
            sources.push(source.clone());
        }
    }

    /// Number of distinct sources seen so far.
    pub fn len(&self) -> usize {
        self.sources.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain the collected sources.
    pub fn take(&self) -> Vec<Subscribable> {
        self.sources.take()
    }
}

// =============================================================================
// REACTIVE CONTEXT
// =============================================================================

/// Thread-local reactive context.
///
/// Holds a stack of frames. A `Some` frame collects dependencies (a computed
/// is evaluating); a `None` frame suppresses collection (inside
/// `ignore_dependencies`). Reads outside any frame register nothing.
pub struct ReactiveContext {
    frames: RefCell<Vec<Option<Rc<DependencyFrame>>>>,
}

impl ReactiveContext {
    pub fn new() -> Self {
        Self {
            frames: RefCell::new(Vec::new()),
        }
    }

    /// Push a frame, returning the new depth.
    pub fn push_frame(&self, frame: Option<Rc<DependencyFrame>>) -> usize {
        let mut frames = self.frames.borrow_mut();
        frames.push(frame);
        frames.len()
    }

    /// Pop the innermost frame.
    pub fn pop_frame(&self) -> Option<Option<Rc<DependencyFrame>>> {
        self.frames.borrow_mut().pop()
    }

    /// The innermost collecting frame, if the top of the stack collects.
    pub fn current_frame(&self) -> Option<Rc<DependencyFrame>> {
        self.frames.borrow().last().cloned().flatten()
    }

    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }
}

impl Default for ReactiveContext {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// THREAD-LOCAL ACCESS
// =============================================================================

thread_local! {
    static CONTEXT: ReactiveContext = ReactiveContext::new();
}

/// Access the thread-local reactive context.
pub fn with_context<R>(f: impl FnOnce(&ReactiveContext) -> R) -> R {
    CONTEXT.with(f)
}

/// True while a computed value is collecting dependencies on this thread.
pub fn is_detecting() -> bool {
    with_context(|ctx| ctx.current_frame().is_some())
}

// =============================================================================
// TESTS
// =============================================================================

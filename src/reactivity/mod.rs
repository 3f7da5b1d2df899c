// ============================================================================
// spark-props - Reactivity Module
// Change broadcast, dependency detection and equality comparers
// ============================================================================

pub mod equality;
pub mod subscribable;
pub mod tracking;

pub use equality::{never_equals, primitive_equals, strict_equals, EqualsFn};
pub use subscribable::{Subscribable, Subscription, WeakSubscribable};
pub use tracking::{ignore_dependencies, register_dependency, with_dependency_frame};

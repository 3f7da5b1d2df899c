// ============================================================================
// spark-props - Core Module
// Dynamic values, the reactive context, and weak identity maps
// ============================================================================

pub mod context;
pub mod value;
pub mod weak_map;

// Re-export commonly used items
pub use context::{is_detecting, with_context, DependencyFrame, ReactiveContext};
pub use value::Value;
pub use weak_map::WeakKeyMap;

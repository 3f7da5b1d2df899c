// ============================================================================
// spark-props - Primitives Module
// Reactive cells: observable, observable array, computed
// ============================================================================

pub mod computed;
pub mod handle;
pub mod observable;
pub mod observable_array;

// Re-export for convenience
pub use computed::{Computed, ComputedOptions, ReadFn, WriteFn};
pub use handle::{is_observable, is_writable_observable, ObservableHandle};
pub use observable::{Observable, ObservableOptions};
pub use observable_array::{ObservableArray, DESTROY_MARKER};

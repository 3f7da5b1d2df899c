// ============================================================================
// spark-props - Collections
// The shared records and lists that tracked properties live on
// ============================================================================
//
// Objects and arrays are reference types: cloning shares the instance and
// equality is identity. Arrays additionally carry a set-once mutation hook
// that the tracker installs when an array becomes the value of a tracked
// property.
// ============================================================================

mod array;
mod object;

pub use array::{Array, ArrayInner};
pub use object::{Getter, Object, ObjectInner, Property, Setter, Slot, WeakObject};

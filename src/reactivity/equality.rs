// ============================================================================
// spark-props - Equality Functions
// Comparers deciding whether a write counts as a change
// ============================================================================

use crate::core::value::Value;

/// Equality function type for comparing observable values.
pub type EqualsFn = fn(&Value, &Value) -> bool;

// =============================================================================
// PRIMITIVE EQUALITY (Default)
// =============================================================================

/// Default comparer: only equal primitives count as "unchanged".
///
/// Arrays and objects are always considered changed, even when the same
/// instance is written back. That is what lets an in-place mutation be
/// announced by writing the instance to its observable again.
///
/// # Example
/// ```
/// use spark_props::reactivity::equality::primitive_equals;
/// use spark_props::{Array, Value};
///
/// assert!(primitive_equals(&Value::from(1), &Value::from(1)));
/// assert!(!primitive_equals(&Value::from(1), &Value::from(2)));
///
/// let items = Value::from(Array::new());
/// assert!(!primitive_equals(&items, &items));
/// ```
pub fn primitive_equals(a: &Value, b: &Value) -> bool {
    a.is_primitive() && b.is_primitive() && a == b
}

// =============================================================================
// ALTERNATIVES
// =============================================================================

/// Strict equality: references compare by identity, primitives by value.
///
/// Writing the same array instance back is a no-op with this comparer.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    a == b
}

/// Never equal - every write notifies.
pub fn never_equals(_: &Value, _: &Value) -> bool {
    false
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::{Array, Object};

    #[test]
    fn primitives_compare_by_value() {
        assert!(primitive_equals(&Value::from("a"), &Value::from("a")));
        assert!(primitive_equals(&Value::Null, &Value::Null));
        assert!(!primitive_equals(&Value::Null, &Value::Undefined));
        assert!(!primitive_equals(
            &Value::Number(f64::NAN),
            &Value::Number(f64::NAN)
        ));
    }

    #[test]
    fn references_are_never_primitive_equal() {
        let object = Value::from(Object::new());
        assert!(!primitive_equals(&object, &object));
        assert!(strict_equals(&object, &object));

        let array = Value::from(Array::new());
        assert!(!primitive_equals(&array, &array));
        assert!(strict_equals(&array, &array));
    }

    #[test]
    fn never_equals_always_false() {
        assert!(!never_equals(&Value::from(1), &Value::from(1)));
    }
}

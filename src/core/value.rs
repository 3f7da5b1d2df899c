// ============================================================================
// spark-props - Dynamic Values
// The loosely typed value stored in record properties and array slots
// ============================================================================

use std::fmt;
use std::rc::Rc;

use crate::collections::{Array, Object};
use crate::primitives::{Computed, Observable, ObservableArray, ObservableHandle};

// =============================================================================
// VALUE
// =============================================================================

/// A dynamically typed value.
///
/// Equality is strict: primitives compare by value (so `NaN != NaN`), while
/// arrays, objects and reactive handles compare by reference identity.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Array),
    Object(Object),
    /// An observable-like value stored directly in a property.
    Reactive(ObservableHandle),
}

impl Value {
    /// Short type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Reactive(_) => "observable",
        }
    }

    /// True for undefined, null, booleans, numbers and strings.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Undefined | Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
        )
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_reactive(&self) -> Option<&ObservableHandle> {
        match self {
            Value::Reactive(handle) => Some(handle),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Reactive(a), Value::Reactive(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Display follows the loose string conversion used by the default array
/// sort: arrays join their items with commas, objects print a placeholder.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) if n.is_nan() => f.write_str("NaN"),
            Value::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Array(array) => fmt::Display::fmt(array, f),
            Value::Object(_) => f.write_str("[object Object]"),
            Value::Reactive(_) => f.write_str("[observable]"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(array) => f.debug_tuple("Array").field(array).finish(),
            Value::Object(object) => f.debug_tuple("Object").field(object).finish(),
            Value::Reactive(handle) => f.debug_tuple("Reactive").field(handle).finish(),
        }
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl From<&Array> for Value {
    fn from(array: &Array) -> Self {
        Value::Array(array.clone())
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<&Object> for Value {
    fn from(object: &Object) -> Self {
        Value::Object(object.clone())
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Array::from(items))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<ObservableHandle> for Value {
    fn from(handle: ObservableHandle) -> Self {
        Value::Reactive(handle)
    }
}

impl From<Observable> for Value {
    fn from(observable: Observable) -> Self {
        Value::Reactive(ObservableHandle::Scalar(observable))
    }
}

impl From<ObservableArray> for Value {
    fn from(array: ObservableArray) -> Self {
        Value::Reactive(ObservableHandle::Array(array))
    }
}

impl From<Computed> for Value {
    fn from(computed: Computed) -> Self {
        Value::Reactive(ObservableHandle::Computed(computed))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_equality() {
        assert_eq!(Value::from(1), Value::from(1.0));
        assert_eq!(Value::from("a"), Value::from(String::from("a")));
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_ne!(Value::Undefined, Value::Null);
    }

    #[test]
    fn references_compare_by_identity() {
        let a = Array::from(vec![Value::from(1)]);
        let b = Array::from(vec![Value::from(1)]);
        assert_eq!(Value::from(&a), Value::from(&a));
        assert_ne!(Value::from(&a), Value::from(&b));

        let o = Object::new();
        assert_eq!(Value::from(&o), Value::from(o.clone()));
        assert_ne!(Value::from(&o), Value::from(Object::new()));
    }

    #[test]
    fn display_matches_loose_string_conversion() {
        assert_eq!(Value::from(4).to_string(), "4");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Null.to_string(), "null");

        let array = Array::from(vec![Value::from(1), Value::Null, Value::from("x")]);
        assert_eq!(Value::from(array).to_string(), "1,,x");
        assert_eq!(Value::from(Object::new()).to_string(), "[object Object]");
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(3)), Value::from(3));
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
        assert_eq!(Value::from(7).as_number(), Some(7.0));
        assert!(Value::from(Object::new()).as_object().is_some());
        assert!(Value::Undefined.is_primitive());
        assert!(!Value::from(Array::new()).is_primitive());
        assert_eq!(Value::from(Array::new()).type_name(), "array");
    }
}

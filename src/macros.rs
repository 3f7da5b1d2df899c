// ============================================================================
// spark-props - Ergonomic Macros
// ============================================================================

/// Helper macro to clone variables into a move closure.
///
/// This reduces the boilerplate of manually cloning `Object` or
/// `Observable` handles before moving them into a closure.
///
/// # Usage
///
/// ```rust
/// use spark_props::{cloned, Computed, ComputedOptions, Observable, Value};
///
/// let a = Observable::new(1);
/// let b = Observable::new(2);
///
/// let sum = Computed::new(ComputedOptions::new(cloned!(a, b => move || {
///     let total = a.get().as_number().unwrap_or(0.0) + b.get().as_number().unwrap_or(0.0);
///     Value::from(total)
/// })));
/// assert_eq!(sum.get(), Value::from(3));
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}

/// Create a read-only computed with automatic variable capturing.
///
/// Wraps `Computed::new(ComputedOptions::new(cloned!(... => move || ...)))`.
/// The body may evaluate to anything convertible into a `Value`.
///
/// # Usage
///
/// ```rust
/// use spark_props::{computed, Observable, Value};
///
/// let name = Observable::new("Ada");
/// let greeting = computed!(name => format!("Hello, {}", name.get()));
///
/// name.set("Grace");
/// assert_eq!(greeting.get(), Value::from("Hello, Grace"));
/// ```
#[macro_export]
macro_rules! computed {
    // Case 1: With dependencies
    ($($deps:ident),+ => $body:expr) => {
        $crate::Computed::new($crate::ComputedOptions::new(
            $crate::cloned!($($deps),+ => move || $crate::Value::from($body))
        ))
    };
    // Case 2: No dependencies
    ($body:expr) => {
        $crate::Computed::new($crate::ComputedOptions::new(move || $crate::Value::from($body)))
    };
}

/// Build an [`Object`](crate::Object) from `name => value` pairs.
///
/// Properties are added in order as enumerable, configurable data
/// properties; values go through `Value::from`.
///
/// ```rust
/// use spark_props::{object, Value};
///
/// let point = object! { "x" => 1, "y" => 2 };
/// assert_eq!(point.keys(), vec!["x", "y"]);
/// assert_eq!(point.get("y"), Value::from(2));
/// ```
#[macro_export]
macro_rules! object {
    () => {
        $crate::Object::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let object = $crate::Object::new();
        $( object.set($name, $crate::Value::from($value)); )+
        object
    }};
}

/// Build an [`Array`](crate::Array) from items convertible into `Value`.
///
/// ```rust
/// use spark_props::{array, Value};
///
/// let mixed = array![1, "two", Value::Null];
/// assert_eq!(mixed.len(), 3);
/// ```
#[macro_export]
macro_rules! array {
    () => {
        $crate::Array::new()
    };
    ($($item:expr),+ $(,)?) => {
        $crate::Array::from(vec![$($crate::Value::from($item)),+])
    };
}

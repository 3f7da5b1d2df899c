// ============================================================================
// spark-props - Computed Properties
// Derived accessor properties whose value is computed from other properties
// ============================================================================
//
// A computed property is a deferred `Computed` stored into the object and
// then tracked like any other reactive value. Read and write functions get
// the owning object; the computed only holds it weakly, so the object and
// its computed properties do not keep each other alive.
// ============================================================================

use std::fmt;
use std::rc::Rc;

use crate::collections::Object;
use crate::core::value::Value;
use crate::error::{Error, Result};
use crate::primitives::computed::{Computed, ComputedOptions};
use crate::primitives::handle::ObservableHandle;
use crate::tracker::property::{expect_object, PropertyTracker};

/// Read function of a computed property
pub type PropertyRead = Rc<dyn Fn(&Object) -> Value>;

/// Write function of a writable computed property
pub type PropertyWrite = Rc<dyn Fn(&Object, Value)>;

/// Definition of a computed property.
///
/// [`ComputedSpec::read`] is the shorthand for a read-only property;
/// [`ComputedSpec::new`] followed by [`get`](Self::get) and
/// [`set`](Self::set) builds a writable one.
///
/// # Example
///
/// ```
/// use spark_props::{object, ComputedSpec, PropertyTracker, Value};
///
/// let tracker = PropertyTracker::new();
/// let person = tracker.track(object! { "first" => "Ada", "last" => "Byron" }).unwrap();
///
/// tracker
///     .define_computed_property(
///         &person,
///         "full",
///         ComputedSpec::read(|p| Value::from(format!("{} {}", p.get("first"), p.get("last")))),
///     )
///     .unwrap();
///
/// assert_eq!(person.get("full"), Value::from("Ada Byron"));
/// person.set("last", "Lovelace");
/// assert_eq!(person.get("full"), Value::from("Ada Lovelace"));
/// ```
#[derive(Clone, Default)]
pub struct ComputedSpec {
    get: Option<PropertyRead>,
    set: Option<PropertyWrite>,
    value: Option<Value>,
}

impl ComputedSpec {
    /// An empty definition; it needs a [`get`](Self::get) before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// A read-only property computed by `read`.
    pub fn read(read: impl Fn(&Object) -> Value + 'static) -> Self {
        Self::new().get(read)
    }

    pub fn get(mut self, read: impl Fn(&Object) -> Value + 'static) -> Self {
        self.get = Some(Rc::new(read));
        self
    }

    /// Make the property writable.
    pub fn set(mut self, write: impl Fn(&Object, Value) + 'static) -> Self {
        self.set = Some(Rc::new(write));
        self
    }

    /// A fixed initial value. Computed properties cannot have one, so
    /// defining a property with this set fails.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    fn into_options(self, owner: &Object, property: &str) -> Result<ComputedOptions> {
        if self.value.is_some() {
            return Err(Error::Configuration {
                property: property.to_owned(),
                reason: "a computed property cannot have an initial value",
            });
        }
        let Some(read) = self.get else {
            return Err(Error::Configuration {
                property: property.to_owned(),
                reason: "a `get` function is required",
            });
        };

        let reader = owner.downgrade();
        let mut options = ComputedOptions::new(move || {
            reader
                .upgrade()
                .map(|owner| read(&owner))
                .unwrap_or_default()
        })
        .defer_evaluation(true);

        if let Some(write) = self.set {
            let writer = owner.downgrade();
            options = options.write(move |value| {
                if let Some(owner) = writer.upgrade() {
                    write(&owner, value);
                }
            });
        }
        Ok(options)
    }
}

impl fmt::Debug for ComputedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedSpec")
            .field("get", &self.get.is_some())
            .field("set", &self.set.is_some())
            .field("value", &self.value)
            .finish()
    }
}

impl PropertyTracker {
    /// Install a computed property on `target` and track it.
    ///
    /// The computed is assigned through the property's current slot and the
    /// name is then tracked, so a property without a write function ignores
    /// assignments. Evaluation is deferred until the first read.
    pub fn define_computed_property(
        &self,
        target: impl Into<Value>,
        name: &str,
        spec: ComputedSpec,
    ) -> Result<Object> {
        let object = expect_object(target.into())?;
        let computed = Computed::new(spec.into_options(&object, name)?);
        object.set(name, Value::Reactive(ObservableHandle::Computed(computed)));
        self.track_properties(&object, &[name])
    }
}

// =============================================================================
// TESTS
// =============================================================================

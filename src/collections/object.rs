// ============================================================================
// spark-props - Object
// A record of named property slots whose shape can change at runtime
// ============================================================================
//
// Each property is either a data slot or an accessor pair, and is tagged
// enumerable/hidden and configurable/fixed. Accessor getters and setters run
// with no borrow of the property map held, so they are free to read or
// write the same object.
// ============================================================================

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::core::value::Value;
use crate::error::{Error, Result};

// =============================================================================
// PROPERTY
// =============================================================================

/// Accessor getter
pub type Getter = Rc<dyn Fn() -> Value>;

/// Accessor setter
pub type Setter = Rc<dyn Fn(Value)>;

/// Storage of one property.
#[derive(Clone)]
pub enum Slot {
    Data(Value),
    Accessor { get: Getter, set: Option<Setter> },
}

/// A property descriptor.
#[derive(Clone)]
pub struct Property {
    pub slot: Slot,
    pub enumerable: bool,
    pub configurable: bool,
}

impl Property {
    /// An enumerable, configurable data property.
    pub fn data(value: impl Into<Value>) -> Self {
        Self {
            slot: Slot::Data(value.into()),
            enumerable: true,
            configurable: true,
        }
    }

    /// An enumerable, configurable accessor property.
    pub fn accessor(get: Getter, set: Option<Setter>) -> Self {
        Self {
            slot: Slot::Accessor { get, set },
            enumerable: true,
            configurable: true,
        }
    }

    /// Mark the property non-configurable.
    pub fn fixed(mut self) -> Self {
        self.configurable = false;
        self
    }

    /// Mark the property non-enumerable.
    pub fn hidden(mut self) -> Self {
        self.enumerable = false;
        self
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self.slot, Slot::Accessor { .. })
    }

    /// True for data properties and accessors with a setter.
    pub fn is_assignable(&self) -> bool {
        match &self.slot {
            Slot::Data(_) => true,
            Slot::Accessor { set, .. } => set.is_some(),
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Property");
        match &self.slot {
            Slot::Data(value) => s.field("value", value),
            Slot::Accessor { set, .. } => s.field("accessor", &if set.is_some() { "get/set" } else { "get" }),
        };
        s.field("enumerable", &self.enumerable)
            .field("configurable", &self.configurable)
            .finish()
    }
}

// =============================================================================
// OBJECT
// =============================================================================

pub struct ObjectInner {
    properties: RefCell<IndexMap<String, Property>>,
}

/// A shared, dynamically shaped record.
///
/// Cloning yields another reference to the same record; identity is by
/// reference.
///
/// # Example
///
/// ```
/// use spark_props::{object, Object, Value};
///
/// let person = object! { "name" => "Ada", "born" => 1815 };
/// assert_eq!(person.get("name"), Value::from("Ada"));
/// assert_eq!(person.keys(), vec!["name", "born"]);
///
/// person.set("name", "Grace");
/// assert_eq!(person.get("name"), Value::from("Grace"));
/// assert!(person.get("missing").is_undefined());
/// ```
#[derive(Clone)]
pub struct Object {
    inner: Rc<ObjectInner>,
}

impl Object {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ObjectInner {
                properties: RefCell::new(IndexMap::new()),
            }),
        }
    }

    /// Read a property. Accessors run their getter; absent names are undefined.
    pub fn get(&self, name: &str) -> Value {
        let getter = {
            let properties = self.inner.properties.borrow();
            match properties.get(name).map(|p| &p.slot) {
                None => return Value::Undefined,
                Some(Slot::Data(value)) => return value.clone(),
                Some(Slot::Accessor { get, .. }) => get.clone(),
            }
        };
        getter()
    }

    /// Assign a property.
    ///
    /// Data slots are overwritten, accessors receive the value through their
    /// setter, getter-only accessors ignore the write, and absent names are
    /// added as enumerable, configurable data properties.
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        let setter = {
            let mut properties = self.inner.properties.borrow_mut();
            match properties.get_mut(name).map(|p| &mut p.slot) {
                Some(Slot::Data(slot)) => {
                    *slot = value;
                    return;
                }
                Some(Slot::Accessor { set: Some(set), .. }) => set.clone(),
                Some(Slot::Accessor { set: None, .. }) => return,
                None => {
                    properties.insert(name.to_owned(), Property::data(value));
                    return;
                }
            }
        };
        setter(value);
    }

    /// Add or replace a property descriptor.
    ///
    /// Fails if an existing property with this name is fixed.
    pub fn define_property(&self, name: &str, property: Property) -> Result<()> {
        let mut properties = self.inner.properties.borrow_mut();
        if properties.get(name).is_some_and(|p| !p.configurable) {
            return Err(Error::NonConfigurable(name.to_owned()));
        }
        properties.insert(name.to_owned(), property);
        Ok(())
    }

    /// Shorthand for installing an accessor pair.
    pub fn define_accessor(&self, name: &str, get: Getter, set: Option<Setter>) -> Result<()> {
        self.define_property(name, Property::accessor(get, set))
    }

    /// Delete a property. Returns whether it existed.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let mut properties = self.inner.properties.borrow_mut();
        match properties.get(name) {
            None => Ok(false),
            Some(p) if !p.configurable => Err(Error::NonConfigurable(name.to_owned())),
            Some(_) => {
                properties.shift_remove(name);
                Ok(true)
            }
        }
    }

    /// Snapshot of a property's descriptor.
    pub fn own_property(&self, name: &str) -> Option<Property> {
        self.inner.properties.borrow().get(name).cloned()
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.inner.properties.borrow().contains_key(name)
    }

    /// Own enumerable property names, in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .properties
            .borrow()
            .iter()
            .filter(|(_, p)| p.enumerable)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Every own property name, enumerable or not.
    pub fn own_property_names(&self) -> Vec<String> {
        self.inner.properties.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.properties.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakObject {
        WeakObject {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub(crate) fn inner_rc(&self) -> &Rc<ObjectInner> {
        &self.inner
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let object = Object::new();
        {
            let mut properties = object.inner.properties.borrow_mut();
            for (name, value) in iter {
                properties.insert(name.into(), Property::data(value));
            }
        }
        object
    }
}

/// Data properties print their value; accessors are not invoked.
impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(properties) = self.inner.properties.try_borrow() else {
            return f.write_str("{<borrowed>}");
        };
        let mut map = f.debug_map();
        for (name, property) in properties.iter() {
            match &property.slot {
                Slot::Data(value) => map.entry(name, value),
                Slot::Accessor { .. } => map.entry(name, &format_args!("<accessor>")),
            };
        }
        map.finish()
    }
}

// =============================================================================
// WEAK OBJECT
// =============================================================================

/// A non-owning reference to an [`Object`].
#[derive(Clone)]
pub struct WeakObject {
    inner: Weak<ObjectInner>,
}

impl WeakObject {
    pub fn upgrade(&self) -> Option<Object> {
        self.inner.upgrade().map(|inner| Object { inner })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn set_adds_missing_properties_in_order() {
        let o = Object::new();
        o.set("b", 1);
        o.set("a", 2);
        assert_eq!(o.keys(), vec!["b", "a"]);
        assert_eq!(o.get("a"), Value::from(2));
    }

    #[test]
    fn accessor_pair() {
        let o = Object::new();
        let store = Rc::new(RefCell::new(Value::from(0)));

        let (r, w) = (store.clone(), store.clone());
        o.define_accessor(
            "x",
            Rc::new(move || r.borrow().clone()),
            Some(Rc::new(move |v: Value| *w.borrow_mut() = v)),
        )
        .unwrap();

        o.set("x", 5);
        assert_eq!(*store.borrow(), Value::from(5));
        assert_eq!(o.get("x"), Value::from(5));
        assert!(o.own_property("x").is_some_and(|p| p.is_accessor()));
    }

    #[test]
    fn getter_only_ignores_writes() {
        let o = Object::new();
        o.define_accessor("answer", Rc::new(|| Value::from(42)), None)
            .unwrap();

        o.set("answer", 0);
        assert_eq!(o.get("answer"), Value::from(42));
        assert!(!o.own_property("answer").unwrap().is_assignable());
    }

    #[test]
    fn fixed_properties_cannot_be_redefined_or_removed() {
        let o = Object::new();
        o.define_property("id", Property::data(1).fixed()).unwrap();

        assert_eq!(
            o.define_property("id", Property::data(2)),
            Err(Error::NonConfigurable("id".into()))
        );
        assert!(o.remove("id").is_err());

        // Data writes still go through.
        o.set("id", 3);
        assert_eq!(o.get("id"), Value::from(3));
    }

    #[test]
    fn hidden_properties_are_not_keys() {
        let o = Object::new();
        o.set("shown", 1);
        o.define_property("secret", Property::data(2).hidden())
            .unwrap();

        assert_eq!(o.keys(), vec!["shown"]);
        assert_eq!(o.own_property_names(), vec!["shown", "secret"]);
    }

    #[test]
    fn getter_may_reenter_the_object() {
        let o = Object::new();
        o.set("base", 2);
        let this = o.downgrade();
        o.define_accessor(
            "double",
            Rc::new(move || {
                let base = this.upgrade().map(|o| o.get("base")).unwrap_or_default();
                Value::from(base.as_number().unwrap_or(0.0) * 2.0)
            }),
            None,
        )
        .unwrap();

        assert_eq!(o.get("double"), Value::from(4));
    }

    #[test]
    fn setter_may_reenter_the_object() {
        let o = Object::new();
        let this = o.downgrade();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        o.define_accessor(
            "alias",
            Rc::new(|| Value::Undefined),
            Some(Rc::new(move |v: Value| {
                counter.set(counter.get() + 1);
                if let Some(o) = this.upgrade() {
                    o.set("target", v);
                }
            })),
        )
        .unwrap();

        o.set("alias", "x");
        assert_eq!(o.get("target"), Value::from("x"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn remove_configurable() {
        let o: Object = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(o.remove("a"), Ok(true));
        assert_eq!(o.remove("a"), Ok(false));
        assert_eq!(o.keys(), vec!["b"]);
    }

    #[test]
    fn weak_reference() {
        let o = Object::new();
        let weak = o.downgrade();
        assert!(weak.upgrade().is_some_and(|u| u.ptr_eq(&o)));
        drop(o);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn debug_does_not_invoke_getters() {
        let o = Object::new();
        o.set("plain", 1);
        o.define_accessor("lazy", Rc::new(|| -> Value { panic!("getter invoked") }), None)
            .unwrap();
        let text = format!("{o:?}");
        assert!(text.contains("plain"));
        assert!(text.contains("<accessor>"));
    }
}

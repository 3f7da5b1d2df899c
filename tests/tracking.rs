use spark_props::{
    get_observable, is_tracked, object, track, track_properties, tracked_properties, untrack,
    untrack_properties, value_has_mutated, Computed, ComputedOptions, Error, Object,
    Observable, ObservableHandle, Property, PropertyTracker, Value,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn count_notifications(handle: &ObservableHandle) -> Rc<Cell<usize>> {
    let hits = Rc::new(Cell::new(0));
    let sink = hits.clone();
    handle.subscribe(move |_| sink.set(sink.get() + 1));
    hits
}

#[test]
fn track_converts_properties_present_at_call_time() {
    let o = object! { "a" => 1, "b" => "two" };
    track(&o).unwrap();
    o.set("late", true);

    assert!(is_tracked(&o, "a"));
    assert!(is_tracked(&o, "b"));
    assert!(!is_tracked(&o, "late"));
    assert_eq!(tracked_properties(&o), vec!["a", "b"]);

    // Accessors stay enumerable
    assert_eq!(o.keys(), vec!["a", "b", "late"]);
}

#[test]
fn track_returns_the_same_object() {
    let o = Object::new();
    let returned = track(&o).unwrap();
    assert!(returned.ptr_eq(&o));
}

#[test]
fn hidden_properties_are_not_tracked_by_default() {
    let o = object! { "shown" => 1 };
    o.define_property("internal", Property::data(2).hidden())
        .unwrap();
    track(&o).unwrap();

    assert!(is_tracked(&o, "shown"));
    assert!(!is_tracked(&o, "internal"));

    // Naming it explicitly tracks it.
    track_properties(&o, &["internal"]).unwrap();
    assert!(is_tracked(&o, "internal"));
}

#[test]
fn tracking_twice_yields_the_identical_handle() {
    let o = object! { "x" => 1 };
    track_properties(&o, &["x"]).unwrap();
    let first = get_observable(&o, "x").unwrap();
    track_properties(&o, &["x"]).unwrap();
    let second = get_observable(&o, "x").unwrap();

    assert!(first.ptr_eq(&second));
}

#[test]
fn writes_round_trip_through_the_accessor() {
    let o = object! { "x" => 0 };
    track(&o).unwrap();

    for value in [Value::from(5), Value::from("text"), Value::Null, Value::Undefined] {
        o.set("x", value.clone());
        assert_eq!(o.get("x"), value);
    }

    let shared = Object::new();
    o.set("x", &shared);
    assert!(o.get("x").as_object().is_some_and(|v| v.ptr_eq(&shared)));
}

#[test]
fn writes_notify_subscribers_with_the_new_value() {
    let o = object! { "name" => "Ada" };
    track(&o).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    get_observable(&o, "name")
        .unwrap()
        .subscribe(move |v| sink.borrow_mut().push(v.clone()));

    o.set("name", "Ada");
    o.set("name", "Grace");
    assert_eq!(*seen.borrow(), vec![Value::from("Grace")]);
}

#[test]
fn object_values_always_notify() {
    let nested = Object::new();
    let o = object! { "config" => nested.clone() };
    track(&o).unwrap();
    let hits = count_notifications(&get_observable(&o, "config").unwrap());

    o.set("config", &nested);
    assert_eq!(hits.get(), 1);
}

#[test]
fn non_object_targets() {
    assert_eq!(
        track(Value::Null).unwrap_err(),
        Error::InvalidArgument { found: "null" }
    );
    assert!(matches!(
        track_properties(3, &["x"]),
        Err(Error::InvalidArgument { found: "number" })
    ));
    assert!(get_observable("string", "len").is_none());

    // Silent no-ops
    untrack(1);
    untrack_properties(Value::Undefined, &["x"]);
    value_has_mutated(true, "x");
}

#[test]
fn get_observable_never_creates_handles() {
    let o = object! { "x" => 1 };
    assert!(get_observable(&o, "x").is_none());

    track(&o).unwrap();
    assert!(get_observable(&o, "nonexistent").is_none());
    assert!(!is_tracked(&o, "nonexistent"));
}

#[test]
fn value_has_mutated_keeps_identity() {
    let list = spark_props::array![1, 2];
    let o = object! { "list" => list.clone() };
    track(&o).unwrap();
    let hits = count_notifications(&get_observable(&o, "list").unwrap());

    value_has_mutated(&o, "list");
    assert_eq!(hits.get(), 1);
    assert!(o.get("list").as_array().is_some_and(|a| a.ptr_eq(&list)));

    value_has_mutated(&o, "untracked");
    assert_eq!(hits.get(), 1);
}

#[test]
fn untrack_then_retrack_yields_an_independent_handle() {
    let o = object! { "x" => 1 };
    track(&o).unwrap();
    let old = get_observable(&o, "x").unwrap();
    let old_hits = count_notifications(&old);

    untrack(&o);
    assert!(get_observable(&o, "x").is_none());

    // The orphaned accessor still reads the old handle until re-tracked.
    o.set("x", 2);
    assert_eq!(old.peek(), Value::from(2));
    assert_eq!(old_hits.get(), 1);

    track(&o).unwrap();
    let new = get_observable(&o, "x").unwrap();
    assert!(!new.ptr_eq(&old));
    assert_eq!(new.peek(), Value::from(2));

    o.set("x", 3);
    assert_eq!(old_hits.get(), 1);
    assert_eq!(old.peek(), Value::from(2));
    assert_eq!(o.get("x"), Value::from(3));
}

#[test]
fn untrack_properties_is_selective() {
    let o = object! { "a" => 1, "b" => 2, "c" => 3 };
    track(&o).unwrap();

    untrack_properties(&o, &["b", "missing"]);
    assert_eq!(tracked_properties(&o), vec!["a", "c"]);
}

#[test]
fn existing_observables_are_adopted() {
    let counter = Observable::new(10);
    let o = object! { "count" => counter.clone() };
    track(&o).unwrap();

    assert_eq!(o.get("count"), Value::from(10));
    counter.set(11);
    assert_eq!(o.get("count"), Value::from(11));
    o.set("count", 12);
    assert_eq!(counter.peek(), Value::from(12));
}

#[test]
fn read_only_reactive_values_ignore_assignment() {
    let answer = Computed::new(ComputedOptions::new(|| Value::from(42)));
    let o = object! { "answer" => answer };
    track(&o).unwrap();

    o.set("answer", 0);
    assert_eq!(o.get("answer"), Value::from(42));
}

#[test]
fn non_configurable_properties_are_left_alone() {
    let o = object! { "free" => 1 };
    o.define_property("locked", Property::data(2).fixed())
        .unwrap();
    track(&o).unwrap();

    assert!(is_tracked(&o, "free"));
    assert!(!is_tracked(&o, "locked"));
    assert!(!o.own_property("locked").unwrap().is_accessor());
}

#[test]
fn reads_inside_computeds_register_dependencies() {
    let o = object! { "first" => "Ada", "last" => "Byron" };
    track(&o).unwrap();

    let owner = o.clone();
    let full = Computed::new(ComputedOptions::new(move || {
        Value::from(format!("{} {}", owner.get("first"), owner.get("last")))
    }));
    assert_eq!(full.dependency_count(), 2);

    o.set("last", "Lovelace");
    assert_eq!(full.peek(), Value::from("Ada Lovelace"));
}

#[test]
fn separate_trackers_keep_separate_registries() {
    let o = object! { "x" => 1 };
    let a = PropertyTracker::new();
    let b = PropertyTracker::new();

    a.track(&o).unwrap();
    assert!(a.is_tracked(&o, "x"));
    assert!(!b.is_tracked(&o, "x"));

    // Tracking again from another tracker adopts nothing: it wraps the
    // current value in a fresh handle of its own.
    b.track(&o).unwrap();
    let (ha, hb) = (a.get_observable(&o, "x").unwrap(), b.get_observable(&o, "x").unwrap());
    assert!(!ha.ptr_eq(&hb));
    assert_eq!(hb.peek(), Value::from(1));
}

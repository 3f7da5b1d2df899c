use spark_props::{
    array, define_computed_property, get_observable, object, with_tracker, ComputedSpec, Object,
    Observable, PropertyTracker, Subscribable, Value,
};
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn tracked_objects_are_not_kept_alive() {
    let tracker = PropertyTracker::new();
    let weak = {
        let o = object! { "a" => 1, "list" => array![1, 2] };
        tracker.track(&o).unwrap();
        assert_eq!(tracker.registry().len(), 1);
        o.downgrade()
    };

    assert!(weak.upgrade().is_none(), "registry must not own the object");
    assert!(tracker.registry().is_empty());
}

#[test]
fn hooked_arrays_are_not_kept_alive() {
    let tracker = PropertyTracker::new();
    let list = array![1, 2, 3];
    let o = object! { "list" => list.clone() };
    tracker.track(&o).unwrap();
    assert_eq!(tracker.array_bridge().registry().len(), 1);

    // Moving the property to another array releases the first one.
    o.set("list", array![]);
    drop(list);
    assert_eq!(tracker.array_bridge().registry().len(), 1);

    // Records of a dropped object are released when the registry prunes.
    drop(o);
    tracker.registry().prune();
    assert!(tracker.array_bridge().registry().is_empty());
}

#[test]
fn array_kept_elsewhere_does_not_pin_its_property() {
    let tracker = PropertyTracker::new();
    let list = array![1];
    let handle = {
        let o = object! { "list" => list.clone() };
        tracker.track(&o).unwrap();
        tracker.get_observable(&o, "list").unwrap()
    };
    let hits = Rc::new(Cell::new(0));
    let sink = hits.clone();
    handle.subscribe(move |_| sink.set(sink.get() + 1));

    // The handle is still held here, so mutations still reach it.
    list.push([Value::from(2)]);
    assert_eq!(hits.get(), 1);

    // Once the last holder lets go, the array alone cannot revive it.
    let subscribable = handle.subscribable().downgrade();
    drop(handle);
    tracker.registry().prune();
    assert!(subscribable.upgrade().is_none());
    list.push([Value::from(3)]);
    assert_eq!(hits.get(), 1);
}

#[test]
fn dropped_objects_release_their_array_listeners() {
    let tracker = PropertyTracker::new();
    let shared = array![1];

    let holders: Vec<Object> = (0..50)
        .map(|_| tracker.track(object! { "items" => shared.clone() }).unwrap())
        .collect();
    let notifier = shared.notifier().unwrap();
    assert_eq!(notifier.subscribable().subscriber_count(), 50);

    // An idle tracker keeps the records until asked to prune.
    drop(holders);
    assert_eq!(notifier.subscribable().subscriber_count(), 50);

    assert_eq!(tracker.prune(), 50);
    assert_eq!(notifier.subscribable().subscriber_count(), 0);
    assert!(tracker.registry().is_empty());
}

#[test]
fn tracking_sweeps_listeners_of_dropped_objects() {
    let tracker = PropertyTracker::new();
    let shared = array![1];
    {
        let o = object! { "items" => shared.clone() };
        tracker.track(&o).unwrap();
    }

    let survivor = object! { "items" => shared.clone() };
    tracker.track(&survivor).unwrap();
    let hits = Rc::new(Cell::new(0));
    let sink = hits.clone();
    tracker
        .get_observable(&survivor, "items")
        .unwrap()
        .subscribe(move |_| sink.set(sink.get() + 1));

    let notifier = shared.notifier().unwrap();
    assert_eq!(notifier.subscribable().subscriber_count(), 1);
    shared.push([Value::from(2)]);
    assert_eq!(hits.get(), 1);
}

#[test]
fn computed_properties_do_not_form_cycles() {
    let weak = {
        let o = object! { "n" => 2 };
        with_tracker(|t| t.track(&o)).unwrap();
        define_computed_property(
            &o,
            "double",
            ComputedSpec::read(|o| Value::from(o.get("n").as_number().unwrap_or(0.0) * 2.0)),
        )
        .unwrap();
        assert_eq!(o.get("double"), Value::from(4));
        o.downgrade()
    };
    assert!(weak.upgrade().is_none());
}

#[test]
fn handles_outlive_their_object_when_held() {
    let tracker = PropertyTracker::new();
    let handle = {
        let o = object! { "x" => 1 };
        tracker.track(&o).unwrap();
        tracker.get_observable(&o, "x").unwrap()
    };

    assert_eq!(handle.peek(), Value::from(1));
    handle.set(2).unwrap();
    assert_eq!(handle.peek(), Value::from(2));
}

#[test]
fn dropping_a_subscription_keeps_it_active() {
    let o: Object = object! { "x" => 1 };
    let tracker = PropertyTracker::new();
    tracker.track(&o).unwrap();

    let hits = Rc::new(Cell::new(0));
    {
        let sink = hits.clone();
        let _subscription = tracker
            .get_observable(&o, "x")
            .unwrap()
            .subscribe(move |_| sink.set(sink.get() + 1));
    }

    o.set("x", 2);
    assert_eq!(hits.get(), 1);
}

#[test]
fn disposed_subscription_is_detached() {
    let hub = Subscribable::new();
    let subscription = hub.subscribe(|_| {});
    assert_eq!(hub.subscriber_count(), 1);

    subscription.dispose();
    subscription.dispose();
    assert_eq!(hub.subscriber_count(), 0);
}

#[test]
fn explicit_tracker_registrations_are_not_global() {
    let tracker = PropertyTracker::new();
    let cell = Observable::new(1);
    let o = object! { "cell" => cell.clone() };
    tracker.track(&o).unwrap();

    let handle = get_observable(&o, "cell");
    // The default tracker never saw this object.
    assert!(handle.is_none());
    assert!(tracker.get_observable(&o, "cell").is_some());
}

//! End-to-end use of a store the way a host drives an effect instance.

use std::sync::Arc;
use std::thread;

use knobkit::prelude::*;

const EPS: f64 = 1e-9;

struct Crossfade;

impl Interpolator<String> for Crossfade {
    fn interpolate(&self, before: &Keyframe<String>, after: &Keyframe<String>, time: Time) -> String {
        let t = (time - before.time) / (after.time - before.time);
        format!("{}>{}@{:.2}", before.value, after.value, t)
    }
}

fn descriptors() -> Vec<ParameterDescriptor> {
    vec![
        ParameterDescriptor::group("main").with_tab().with_label("Main"),
        ParameterDescriptor::double("radius", 2.0, Bounds::new(0.0, 50.0).with_display(0.0, 10.0))
            .with_parent("main"),
        ParameterDescriptor::vec2_double("center", [0.5, 0.5], Bounds::unbounded()).with_parent("main"),
        ParameterDescriptor::custom("gradient", "black").with_interpolator(Arc::new(Crossfade)),
        ParameterDescriptor::group("render").with_tab().with_label("Render"),
        ParameterDescriptor::string("output", StringMode::OutputFilePath, "out/frame_####.exr")
            .with_parent("render"),
        ParameterDescriptor::string("about", StringMode::Label, "v1"),
        ParameterDescriptor::push_button("bake"),
    ]
}

#[test]
fn test_animate_and_scrub() {
    let clock = Arc::new(ManualClock::new(0.0));
    let store = ParameterStore::instantiate(descriptors(), clock.clone(), StoreConfig::new()).unwrap();

    let radius = store.lookup("radius").unwrap();
    radius.set_at(0, 0.0, Value::Double(0.0)).unwrap();
    radius.set_at(0, 10.0, Value::Double(10.0)).unwrap();

    for frame in 0..=10 {
        clock.set_time(frame as f64);
        let v = radius.get(0).unwrap().as_f64().unwrap();
        assert!((v - frame as f64).abs() < EPS);
    }

    let output = store.lookup("output").unwrap();
    clock.set_time(7.0);
    assert_eq!(output.get(0).unwrap(), Value::String("out/frame_0007.exr".to_string()));
    assert!(store.is_output());
}

#[test]
fn test_custom_interpolation_through_store() {
    let clock = Arc::new(ManualClock::new(0.0));
    let store = ParameterStore::instantiate(descriptors(), clock, StoreConfig::new()).unwrap();

    let gradient = store.lookup("gradient").unwrap();
    assert!(gradient.animates());
    gradient.set_at(0, 0.0, Value::String("black".to_string())).unwrap();
    gradient.set_at(0, 4.0, Value::String("white".to_string())).unwrap();
    assert_eq!(
        gradient.get_at(0, 1.0).unwrap(),
        Value::String("black>white@0.25".to_string())
    );
}

#[test]
fn test_flags_and_grouping() {
    let clock = Arc::new(ManualClock::default());
    let store = ParameterStore::instantiate(descriptors(), clock, StoreConfig::new()).unwrap();

    assert!(!store.lookup("about").unwrap().enabled());
    let bake = store.lookup("bake").unwrap();
    bake.set_enabled(false);
    bake.set_secret(true);
    assert!(!bake.enabled());
    assert!(bake.secret());

    let tabs = store.tab_container().unwrap();
    let pages = tabs.pages();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].children.len(), 2);
    assert_eq!(pages[1].children, vec![store.lookup("output").unwrap().id()]);
}

#[test]
fn test_writes_visible_across_threads() {
    let clock = Arc::new(ManualClock::default());
    let store = Arc::new(ParameterStore::instantiate(descriptors(), clock, StoreConfig::new()).unwrap());

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            let center = store.lookup("center").unwrap();
            center
                .set_values(&[Value::Double(0.25), Value::Double(0.75)])
                .unwrap();
            store.lookup("bake").unwrap().set_secret(true);
        })
    };
    writer.join().unwrap();

    let reader = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            (
                store.lookup("center").unwrap().get_values().unwrap(),
                store.lookup("bake").unwrap().secret(),
            )
        })
    };
    let (center, secret) = reader.join().unwrap();
    assert_eq!(center, vec![Value::Double(0.25), Value::Double(0.75)]);
    assert!(secret);
}

#[test]
fn test_project_round_trip() {
    let clock = Arc::new(ManualClock::default());
    let source = ParameterStore::instantiate(descriptors(), clock.clone(), StoreConfig::new()).unwrap();
    source
        .lookup("center")
        .unwrap()
        .set_values_at(5.0, &[Value::Double(1.0), Value::Double(2.0)])
        .unwrap();
    source
        .lookup("output")
        .unwrap()
        .set(0, Value::String("final_##.png".to_string()))
        .unwrap();

    let saved = source.snapshot();
    let target = ParameterStore::instantiate(descriptors(), clock, StoreConfig::new()).unwrap();
    assert_eq!(target.restore(&saved), saved.len());
    assert_eq!(target.lookup("center").unwrap().keyframe_times(1).unwrap(), vec![5.0]);
    assert_eq!(
        target.lookup("output").unwrap().resolve_path(3),
        Some("final_03.png".to_string())
    );
}

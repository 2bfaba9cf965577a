//! Tests for `#[derive(ChoiceEnum)]`.

use std::sync::Arc;

use knobkit::prelude::*;

#[derive(Copy, Clone, PartialEq, Debug, ChoiceEnum)]
enum Blend {
    Over,
    #[default]
    #[name = "Screen"]
    #[help = "Inverse multiply of the inverted inputs"]
    Screen,
    #[name = "Multiply"]
    Mul,
}

#[derive(Copy, Clone, PartialEq, Debug, ChoiceEnum)]
enum Single {
    Only,
}

#[test]
fn test_count_and_default() {
    assert_eq!(Blend::COUNT, 3);
    assert_eq!(Blend::DEFAULT_INDEX, 1);
    assert_eq!(Blend::default_value(), Blend::Screen);

    assert_eq!(Single::COUNT, 1);
    assert_eq!(Single::DEFAULT_INDEX, 0);
}

#[test]
fn test_index_mapping() {
    assert_eq!(Blend::from_index(0), Some(Blend::Over));
    assert_eq!(Blend::from_index(2), Some(Blend::Mul));
    assert_eq!(Blend::from_index(3), None);
    assert_eq!(Blend::Mul.to_index(), 2);
}

#[test]
fn test_entries() {
    let entries = Blend::entries();
    assert_eq!(entries[0], ("Over", ""));
    assert_eq!(entries[1], ("Screen", "Inverse multiply of the inverted inputs"));
    assert_eq!(entries[2].0, "Multiply");
}

#[test]
fn test_choice_parameter_from_enum() {
    let clock = Arc::new(ManualClock::default());
    let store = ParameterStore::instantiate(
        vec![ParameterDescriptor::choice_from::<Blend>("blend")],
        clock,
        StoreConfig::new(),
    )
    .unwrap();

    let blend = store.lookup("blend").unwrap();
    assert_eq!(blend.choice_entries().len(), 3);
    assert_eq!(blend.choice_value::<Blend>().unwrap(), Blend::Screen);

    blend.set_choice_value(Blend::Mul).unwrap();
    assert_eq!(blend.get(0).unwrap(), Value::Choice(2));
    assert_eq!(blend.display(0).unwrap(), "Multiply");
    assert_eq!(blend.parse(0, "over"), Some(Value::Choice(0)));
}

use super::*;
use crate::buffer::{AreaMeta, Buffer};

fn area(n: u16) -> Area {
    Area::new(n)
}

#[test]
fn analog_deadband_ignores_small_moves() {
    assert!(!analog_should_process(100, 110));
    assert!(analog_should_process(100, 126));
    assert!(analog_should_process(100, 74));
}

#[test]
fn polarity_flips_only_when_area_is_reversed() {
    let mut buf = Buffer::new();
    buf.define(area(1), AreaMeta::new("normal"));
    buf.define(area(2), AreaMeta::new("reversed").reverse(true));

    assert_eq!(apply_polarity(&buf, area(1), 1), 1);
    assert_eq!(apply_polarity(&buf, area(2), 1), 0);
    assert_eq!(apply_polarity(&buf, area(2), 0), 1);
}

#[test]
fn no_toggle_passes_through_on_any_difference() {
    let mut toggles = Toggles::new();
    let buf = Buffer::new();
    assert_eq!(toggles.evaluate_digital(area(1), 1, 0, &buf), Some(1));
    assert_eq!(toggles.evaluate_digital(area(1), 1, 1, &buf), None);
}

#[test]
fn toggle_without_forwards_flips_on_rising_edge_of_input() {
    let mut toggles = Toggles::new();
    toggles.register(area(1), vec![]);
    let buf = Buffer::new();

    assert_eq!(toggles.evaluate_digital(area(1), 0, 0, &buf), None);
    assert_eq!(toggles.evaluate_digital(area(1), 1, 0, &buf), Some(1));
    // holding the input high should not flip again.
    assert_eq!(toggles.evaluate_digital(area(1), 1, 1, &buf), None);
}

#[test]
fn toggle_with_forwards_is_driven_by_the_forward_source() {
    let mut toggles = Toggles::new();
    toggles.register(area(1), vec![area(50)]);

    let mut buf = Buffer::new();
    buf.define(area(50), AreaMeta::new("fwd"));

    // forward source is low -> falls back to the direct reading, no edge yet.
    assert_eq!(toggles.evaluate_digital(area(1), 0, 0, &buf), None);

    // forward source goes high -> toggle flips even though the direct
    // reading never changed.
    buf.write(crate::area::View::Field, area(50), 1, false).unwrap();
    assert_eq!(toggles.evaluate_digital(area(1), 0, 0, &buf), Some(1));
}

#[test]
fn is_toggle_reports_registration() {
    let mut toggles = Toggles::new();
    assert!(!toggles.is_toggle(area(1)));
    toggles.register(area(1), vec![]);
    assert!(toggles.is_toggle(area(1)));
}

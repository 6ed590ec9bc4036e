use super::*;
use crate::buffer::AreaMeta;

fn area(n: u16) -> Area {
    Area::new(n)
}

#[test]
fn push_drains_changed_to_panel_areas_and_arms_echo_suppression() {
    let mut buf = Buffer::new();
    buf.define(area(1), AreaMeta::new("cmd"));
    buf.write(View::ToPanel, area(1), 1, false).unwrap();

    let writes = push_to_panel(&mut buf, &[area(1)]);
    assert_eq!(writes, vec![PanelWrite { area: area(1), value: 1 }]);
    assert!(!buf.has_changed(View::ToPanel, area(1)));
    // silently mirrored so the pull pass won't re-report this echo.
    assert_eq!(buf.read(View::FromPanel, area(1)), 1);
    assert!(!buf.has_changed(View::FromPanel, area(1)));
}

#[test]
fn pull_ignores_values_matching_what_is_already_buffered() {
    let mut buf = Buffer::new();
    buf.define(area(1), AreaMeta::new("cmd"));
    buf.write(View::FromPanel, area(1), 1, false).unwrap();
    buf.reset_changed(View::FromPanel, area(1));

    pull_from_panel(&mut buf, &[(area(1), 1)]);
    assert!(!buf.has_changed(View::FromPanel, area(1)));
    assert_eq!(buf.read(View::Field, area(1)), 0);
}

#[test]
fn pull_mirrors_a_changed_panel_value_into_field_and_clears_from_panel() {
    let mut buf = Buffer::new();
    buf.define(area(1), AreaMeta::new("cmd"));

    pull_from_panel(&mut buf, &[(area(1), 1)]);

    assert_eq!(buf.read(View::FromPanel, area(1)), 1);
    assert_eq!(buf.read(View::Field, area(1)), 1);
    // Field mirror changed something, so FromPanel's flag was cleared.
    assert!(!buf.has_changed(View::FromPanel, area(1)));
}

#[test]
fn pull_leaves_from_panel_flagged_when_field_mirror_is_a_no_op() {
    let mut buf = Buffer::new();
    buf.define(area(1), AreaMeta::new("cmd"));
    // Field already holds 1 from a prior field-side write.
    buf.write(View::Field, area(1), 1, false).unwrap();
    buf.reset_changed(View::Field, area(1));

    pull_from_panel(&mut buf, &[(area(1), 1)]);

    assert_eq!(buf.read(View::FromPanel, area(1)), 1);
    // Field write was a no-op (already 1), so FromPanel stays flagged.
    assert!(buf.has_changed(View::FromPanel, area(1)));
}

#[test]
fn pull_mirrors_to_panel_only_when_permitted() {
    let mut buf = Buffer::new();
    buf.define(area(1), AreaMeta::new("mirrored").can_write_to_panel(true));
    buf.define(area(2), AreaMeta::new("not-mirrored"));

    pull_from_panel(&mut buf, &[(area(1), 1), (area(2), 1)]);

    assert_eq!(buf.read(View::ToPanel, area(1)), 1);
    assert!(!buf.has_changed(View::ToPanel, area(1)));
    assert_eq!(buf.read(View::ToPanel, area(2)), 0);
}

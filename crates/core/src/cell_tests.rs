use super::*;

#[test]
fn set_if_diff_only_flags_on_an_actual_change() {
    let mut c = Cell::new(1);
    c.set_if_diff(1);
    assert!(!c.has_changed());
    c.set_if_diff(2);
    assert!(c.has_changed());
}

#[test]
fn get_reads_and_clears_the_flag() {
    let mut c = Cell::new(false);
    c.set(true);
    assert!(c.has_changed());
    assert_eq!(c.get(), true);
    assert!(!c.has_changed());
}

#[test]
fn preserve_get_does_not_clear_the_flag() {
    let mut c = Cell::new(0);
    c.set(5);
    assert_eq!(c.preserve_get(), 5);
    assert!(c.has_changed());
}

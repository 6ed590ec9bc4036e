use super::*;

#[test]
fn set_tracks_changes_independently_per_field() {
    let mut flags = SystemFlags::new();
    assert!(!flags.has_changed());
    flags.set(SystemField::SmokeAlarm, true);
    assert!(flags.has_changed());
}

#[test]
fn bitmask_follows_declaration_order_and_clears_changed() {
    let mut flags = SystemFlags::new();
    flags.set(SystemField::IntrusionAlarm, true);
    flags.set(SystemField::DevicesInAlarm, true);

    let mask = flags.bitmask();
    assert_eq!(mask, (1 << 0) | (1 << 9));
    assert!(!flags.has_changed());
}

#[test]
fn set_if_diff_semantics_ignore_redundant_writes() {
    let mut flags = SystemFlags::new();
    flags.set(SystemField::DoorsOpen, false);
    assert!(!flags.has_changed());
}

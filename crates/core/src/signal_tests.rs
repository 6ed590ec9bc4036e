use super::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn on_delay_fires_after_preset() {
    let t0 = Instant::now();
    let mut ton = OnDelay::new(ms(50));
    ton.run(true, t0);
    assert!(!ton.q());
    ton.run(true, t0 + ms(40));
    assert!(!ton.q());
    ton.run(true, t0 + ms(60));
    assert!(ton.q());
}

#[test]
fn on_delay_resets_immediately_on_input_drop() {
    let t0 = Instant::now();
    let mut ton = OnDelay::new(ms(50));
    ton.run(true, t0);
    ton.run(true, t0 + ms(60));
    assert!(ton.q());
    ton.run(false, t0 + ms(61));
    assert!(!ton.q());
}

#[test]
fn off_delay_holds_true_for_preset_after_drop() {
    let t0 = Instant::now();
    let mut tof = OffDelay::new(ms(50));
    tof.run(true, t0);
    assert!(tof.q());
    tof.run(false, t0 + ms(10));
    assert!(tof.q());
    tof.run(false, t0 + ms(60));
    assert!(!tof.q());
}

#[test]
fn pulse_is_high_for_exactly_preset_regardless_of_input_hold() {
    let t0 = Instant::now();
    let mut tp = Pulse::new(ms(30));
    tp.run(true, t0);
    assert!(tp.q());
    tp.run(true, t0 + ms(20));
    assert!(tp.q());
    tp.run(true, t0 + ms(40));
    assert!(!tp.q());
}

#[test]
fn debounce_ignores_chatter_shorter_than_preset() {
    let t0 = Instant::now();
    let mut d = Debounce::new(ms(20));
    assert!(!d.run(true, t0));
    assert!(!d.run(true, t0 + ms(5)));
    assert!(!d.run(false, t0 + ms(8)));
    assert!(!d.run(true, t0 + ms(10)));
    assert!(d.run(true, t0 + ms(35)));
}

#[test]
fn edge_rising_fires_once_per_transition() {
    let mut e = Edge::default();
    assert!(!e.rising(false));
    assert!(e.rising(true));
    assert!(!e.rising(true));
    assert!(!e.rising(false));
    assert!(e.rising(true));
}

#[test]
fn edge_falling_and_change() {
    let mut falling = Edge::default();
    falling.rising(true);
    assert!(falling.falling(false));

    let mut change = Edge::default();
    assert!(change.change(true));
    assert!(!change.change(true));
    assert!(change.change(false));
}

#[test]
fn toggle_latch_flips_only_on_rising_edge() {
    let mut latch = ToggleLatch::new();
    assert_eq!(latch.apply(0, 0), None);
    assert_eq!(latch.apply(1, 0), Some(1));
    assert_eq!(latch.apply(1, 1), None);
    assert_eq!(latch.apply(0, 1), None);
    assert_eq!(latch.apply(1, 1), Some(0));
}

#[test]
fn toggle_latch_tracks_last_observed_input() {
    let mut latch = ToggleLatch::new();
    latch.apply(1, 0);
    assert_eq!(latch.old_input(), 1);
    latch.apply(0, 1);
    assert_eq!(latch.old_input(), 0);
}

use super::*;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

fn test_device(items: u16) -> Device {
    let channel = Channel {
        kind: ChannelKind::AnalogInput,
        hw: HwKind::Hold,
        starting_addr: 100,
        items,
        items_per_call: 2,
    };
    Device::new(
        "plc1",
        IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)),
        1,
        Priority::Normal,
        vec![channel],
        vec![],
        ErrorBudget::new(3, Duration::from_secs(30)),
    )
}

#[test]
fn small_channel_reads_in_one_call_without_banking() {
    let mut dev = test_device(4);
    let plan = dev.next_bank(&dev.channels[0].clone());
    assert_eq!(
        plan,
        BankPlan { start_index: 0, starting_addr: 100, items: 4 }
    );
    // repeated calls never advance the bank for a channel under the cap.
    let plan2 = dev.next_bank(&dev.channels[0].clone());
    assert_eq!(plan2, plan);
}

#[test]
fn large_channel_banks_across_multiple_calls() {
    let mut dev = test_device(20);
    let channel = dev.channels[0];

    let first = dev.next_bank(&channel);
    assert_eq!(first, BankPlan { start_index: 0, starting_addr: 100, items: 8 });

    let second = dev.next_bank(&channel);
    assert_eq!(second, BankPlan { start_index: 8, starting_addr: 108, items: 8 });

    // 20 items, two banks of 8 consumed -> 4 remain, cursor resets after.
    let third = dev.next_bank(&channel);
    assert_eq!(third, BankPlan { start_index: 16, starting_addr: 116, items: 4 });

    let fourth = dev.next_bank(&channel);
    assert_eq!(fourth, BankPlan { start_index: 0, starting_addr: 100, items: 8 });
}

#[test]
fn area_for_indexes_flat_io_areas_by_channel_stride() {
    let mut dev = test_device(4);
    dev.io_areas = vec![Area::new(1), Area::new(2), Area::new(3), Area::new(4)];
    assert_eq!(dev.area_for(0, 0), Some(Area::new(1)));
    assert_eq!(dev.area_for(0, 3), Some(Area::new(4)));
    assert_eq!(dev.area_for(0, 9), None);
}

#[test]
fn priority_jump_values_match_the_original_mapping() {
    assert_eq!(Priority::Low.jump(), 1);
    assert_eq!(Priority::Medium.jump(), 2);
    assert_eq!(Priority::Normal.jump(), 3);
    assert_eq!(Priority::High.jump(), 0);
}

#[test]
fn decode_float_uses_first_read_word_as_high_bits() {
    let value: f32 = 123.5;
    let bits = value.to_bits();
    let high = (bits >> 16) as u16;
    let low = (bits & 0xFFFF) as u16;
    assert_eq!(decode_float([high, low]), value);
}

use super::*;

fn sample_json() -> &'static str {
    r#"{
        "areas": [
            { "area": 10, "name": "lamp", "can_write_to_panel": true },
            { "area": 50, "name": "lamp_redirect", "redirect_to": null },
            { "area": 60, "name": "relay_out" }
        ],
        "toggles": [
            { "area": 10, "forwards": [60] }
        ],
        "devices": [
            {
                "name": "plc1",
                "ip": "192.168.1.10",
                "unit_id": 1,
                "priority": "normal",
                "channels": [
                    { "kind": "digital_input", "hw": "discrete", "starting_addr": 0, "items": 4 }
                ],
                "io_areas": [10, 50, 60, 61]
            },
            {
                "name": "plc2",
                "ip": "192.168.1.10",
                "unit_id": 2,
                "priority": "high",
                "channels": [
                    { "kind": "digital_output", "hw": "coil", "starting_addr": 0, "items": 2 }
                ],
                "io_areas": [70, 71]
            }
        ]
    }"#
}

#[test]
fn loads_and_parses_a_well_formed_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("field.json");
    std::fs::write(&path, sample_json()).unwrap();

    let config = FieldConfig::load(&path).unwrap();
    assert_eq!(config.areas.len(), 3);
    assert_eq!(config.devices.len(), 2);
    assert_eq!(config.toggles.len(), 1);
}

#[test]
fn load_surfaces_a_missing_file_as_an_error() {
    let result = FieldConfig::load("/nonexistent/path/field.json");
    assert!(result.is_err());
}

#[test]
fn apply_areas_defines_and_finalizes_the_buffer() {
    let config: FieldConfig = serde_json::from_str(sample_json()).unwrap();
    let mut buffer = Buffer::new();
    config.apply_areas(&mut buffer);

    assert_eq!(buffer.name(Area::new(10)), "lamp");
    assert!(buffer.can_write_to_panel(Area::new(10)));
    assert_eq!(buffer.area_to_write(Area::new(10)), None);
}

#[test]
fn build_toggles_registers_configured_forwards() {
    let config: FieldConfig = serde_json::from_str(sample_json()).unwrap();
    let toggles = config.build_toggles();
    assert!(toggles.is_toggle(Area::new(10)));
    assert!(!toggles.is_toggle(Area::new(60)));
}

#[test]
fn build_devices_carries_channel_and_priority_fields() {
    let config: FieldConfig = serde_json::from_str(sample_json()).unwrap();
    let devices = config.build_devices();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].name, "plc1");
    assert_eq!(devices[0].priority, Priority::Normal);
    assert_eq!(devices[1].priority, Priority::High);
    assert_eq!(devices[0].channels[0].items, 4);
}

#[test]
fn build_gateways_groups_devices_sharing_an_ip_and_buckets_by_priority() {
    let config: FieldConfig = serde_json::from_str(sample_json()).unwrap();
    let devices = config.build_devices();
    let gateways = config.build_gateways(&devices);

    assert_eq!(gateways.len(), 1);
    let mut gw = gateways.into_iter().next().unwrap();
    let first_round = gw.next_round();
    assert!(!first_round.is_empty());
}

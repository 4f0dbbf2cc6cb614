// Integration tests for netinventory
//
// These tests drive the public API end to end with probe records written as
// JSON, the way the hardware detection subsystem emits them.

use netinventory::{
    build, read_hardware, DeviceKind, Hotplug, InstallInf, InventoryBuilder, InventoryConfig,
    ProbeBucket, ProbeSnapshot, RawProbeRecord,
};
use serde_json::{json, Value};
use std::fs;

fn record(value: Value) -> RawProbeRecord {
    serde_json::from_value(value).expect("fixture should deserialize")
}

fn records(values: Vec<Value>) -> Vec<RawProbeRecord> {
    values.into_iter().map(record).collect()
}

/// A laptop-ish machine: wired NIC, wireless card, a bogus bridge and a
/// paravirtual NIC without a device file.
fn laptop_netcards() -> Vec<RawProbeRecord> {
    records(vec![
        json!({
            "class_id": 2,
            "sub_class_id": 0,
            "device": "Ethernet Connection I219-LM",
            "vendor": "Intel Corporation",
            "dev_name": "enp0s31f6",
            "driver": "e1000e",
            "drivers": [{"active": true, "modprobe": true, "modules": [["e1000e", ""]]}],
            "bus_hwcfg": "pci",
            "bus": "PCI",
            "sysfs_bus_id": "0000:00:1f.6",
            "sysfs_id": "/devices/pci0000:00/0000:00:1f.6",
            "unique_key": "AmfR.pKHfpk1FwP7",
            "resource": {
                "hwaddr": [{"addr": "54:e1:ad:11:22:33"}],
                "phwaddr": [{"addr": "54:e1:ad:11:22:33"}],
                "link": [{"state": false}]
            }
        }),
        json!({
            "class_id": 6,
            "sub_class_id": 4,
            "device": "PCI bridge"
        }),
        json!({
            "class_id": 2,
            "sub_class_id": 130,
            "device": "Wireless 8265 / 8275",
            "dev_name": "wlp4s0",
            "driver": "iwlwifi",
            "drivers": [{"active": true, "modprobe": true, "modules": [["iwlwifi", ""]]}],
            "bus": "PCI",
            "sysfs_bus_id": "0000:04:00.0",
            "sysfs_id": "/devices/pci0000:00/0000:00:1c.6/0000:04:00.0",
            "resource": {
                "hwaddr": [{"addr": "f8:59:71:aa:bb:cc"}],
                "wlan": [{
                    "channels": ["1", "2", "3", "36", "40"],
                    "bitrates": ["1", "2", "5.5", "11"],
                    "auth_modes": ["open", "sharedkey", "wpa-psk", "wpa-eap"],
                    "enc_modes": ["WEP40", "WEP104", "TKIP", "CCMP"]
                }]
            }
        }),
        json!({
            "class_id": 2,
            "sub_class_id": 0,
            "device": "Virtio network device",
            "dev_name": "",
            "drivers": [{"active": true, "modprobe": true, "modules": [["virtio_pci", ""]]}],
            "sysfs_bus_id": "virtio0"
        }),
    ])
}

#[test]
fn test_laptop_inventory() {
    let inventory = build(&laptop_netcards(), &[]);

    assert_eq!(inventory.len(), 2);

    let wlan = inventory.get(0).unwrap();
    assert_eq!(wlan.kind, DeviceKind::Wlan);
    assert_eq!(wlan.num, 0);
    assert_eq!(wlan.dev_name, "wlp4s0");
    let wlan_card = wlan.netcard().unwrap();
    assert_eq!(wlan_card.bus, "pci");
    assert_eq!(wlan_card.mac, "f8:59:71:aa:bb:cc");
    assert_eq!(wlan_card.link, None);
    assert_eq!(
        wlan_card.wl_enc_modes,
        Some(json!(["WEP40", "WEP104", "TKIP", "CCMP"]))
    );

    let eth = inventory.get(1).unwrap();
    assert_eq!(eth.kind, DeviceKind::Eth);
    assert_eq!(eth.num, 1);
    assert_eq!(eth.name, "Ethernet Connection I219-LM");
    assert_eq!(eth.unique, "AmfR.pKHfpk1FwP7");
    let eth_card = eth.netcard().unwrap();
    // bus_hwcfg wins over bus and is passed through as is
    assert_eq!(eth_card.bus, "pci");
    assert_eq!(eth_card.busid, "0000:00:1f.6");
    assert_eq!(eth_card.link, Some(false));
    assert_eq!(eth_card.active_driver.as_ref().unwrap().module, "e1000e");
}

#[test]
fn test_promotion_leaves_tail_untouched() {
    let input = records(vec![
        json!({"class_id": 2, "sub_class_id": 0, "dev_name": "eth0"}),
        json!({"class_id": 2, "sub_class_id": 130, "dev_name": "wlan0"}),
        json!({"class_id": 2, "sub_class_id": 1, "dev_name": "tr0"}),
    ]);
    let inventory = build(&input, &[]);

    let got: Vec<(DeviceKind, usize, &str)> = inventory
        .iter()
        .map(|d| (d.kind, d.num, d.dev_name.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![
            (DeviceKind::Wlan, 0, "wlan0"),
            (DeviceKind::Eth, 1, "eth0"),
            (DeviceKind::Tr, 2, "tr0"),
        ]
    );
}

#[test]
fn test_build_is_idempotent() {
    let input = laptop_netcards();
    let broken = vec!["iwlwifi".to_string()];

    let first = build(&input, &broken);
    let second = build(&input, &broken);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_all_drivers_broken_device_retained() {
    let input = records(vec![json!({
        "class_id": 2,
        "sub_class_id": 0,
        "dev_name": "eth0",
        "drivers": [
            {"active": false, "modules": [["tg3", ""]]},
            {"active": false, "modules": [["bcm_sf2", ""]]}
        ]
    })]);
    let inventory = build(&input, &["tg3".to_string(), "bcm_sf2".to_string()]);

    assert_eq!(inventory.len(), 1);
    let card = inventory.get(0).unwrap().netcard().unwrap();
    assert!(card.drivers.is_empty());
    assert!(card.active_driver.is_none());
}

#[test]
fn test_exclusion_rules_end_to_end() {
    let input = records(vec![
        json!({"class_id": 2, "sub_class_id": 0, "dev_name": "eth0", "storageonly": true}),
        json!({
            "class_id": 2, "sub_class_id": 0, "dev_name": "",
            "drivers": [{"modules": [["cxgb4", ""]]}]
        }),
        json!({
            "class_id": 2, "sub_class_id": 144, "device": "IUCV",
            "sysfs_bus_id": "iucv"
        }),
        json!({
            "class_id": 2, "sub_class_id": 144, "device": "IUCV",
            "sysfs_bus_id": "netiucv", "dev_name": "iucv0"
        }),
    ]);
    let inventory = build(&input, &[]);

    assert_eq!(inventory.len(), 1);
    let iucv = inventory.get(0).unwrap();
    assert_eq!(iucv.kind, DeviceKind::Iucv);
    assert_eq!(iucv.num, 0);
}

#[test]
fn test_modem_isdn_dsl_payloads() {
    let input = records(vec![
        json!({
            "class_id": 7, "sub_class_id": 3, "dev_name": "/dev/ttyS1",
            "resource": {"baud": [{"speed": 12000000}]}
        }),
        json!({
            "subclass": "ISDN", "bus": "PCI",
            "isdn": [{"name": "AVM FRITZ!Card PCI", "type": 27}],
            "resource": {"io": [{"start": 4096}], "irq": [{"irq": 5}]}
        }),
        json!({"class_id": 276, "dsl": [{"mode": "capiadsl"}]}),
    ]);
    let inventory = build(&input, &[]);
    assert_eq!(inventory.len(), 3);

    let modem = inventory.get(0).unwrap().modem().unwrap();
    assert_eq!(modem.speed, 57_600);
    assert_eq!(modem.device_name, "/dev/ttyS1");

    let isdn = inventory.get(1).unwrap().isdn().unwrap();
    assert_eq!(isdn.io, 4096);
    assert_eq!(isdn.irq, 5);
    assert_eq!(isdn.bus, "PCI");

    let dsl = inventory.get(2).unwrap().dsl().unwrap();
    assert_eq!(dsl.mode, "capi-adsl");
}

#[test]
fn test_virtio_busid_rewrite() {
    let input = records(vec![json!({
        "class_id": 2,
        "sub_class_id": 0,
        "dev_name": "eth0",
        "hotplug": "cardbus",
        "bus": "Virtual IO",
        "sysfs_bus_id": "virtio3",
        "sysfs_id": "/devices/pci0000:00/0000:00:05.0/virtio3"
    })]);
    let inventory = build(&input, &[]);
    let card = inventory.get(0).unwrap().netcard().unwrap();

    assert_eq!(card.sub_device_busid.as_deref(), Some("virtio3"));
    assert_eq!(card.busid, "0000:00:05.0");
    assert_eq!(card.bus, "vio");
    assert_eq!(card.hotplug, Some(Hotplug::Pcmcia));
}

#[test]
fn test_snapshot_file_with_install_inf() {
    let dir = tempfile::tempdir().unwrap();
    let probe_path = dir.path().join("probe.json");
    let inf_path = dir.path().join("install.inf");

    let snapshot = json!({
        "netcard": [
            {
                "class_id": 2, "sub_class_id": 130, "dev_name": "wlan0",
                "drivers": [
                    {"active": true, "modules": [["b43", ""]]},
                    {"active": false, "modules": [["wl", ""]]}
                ]
            }
        ],
        "modem": null
    });
    fs::write(&probe_path, snapshot.to_string()).unwrap();
    fs::write(&inf_path, "Manual: 0\nBrokenModules: b43\n").unwrap();

    let source = ProbeSnapshot::load(&probe_path).unwrap();
    let inf = InstallInf::load(&inf_path).unwrap();

    let inventory = read_hardware(&source, ProbeBucket::Netcard, &inf);
    let driver = inventory.get(0).unwrap().netcard().unwrap().active_driver.clone();
    assert_eq!(driver.unwrap().module, "wl");

    // An unreadable bucket yields nothing
    assert!(read_hardware(&source, ProbeBucket::Modem, &inf).is_empty());
    // ...and fails the combined read as a whole
    assert!(read_hardware(&source, ProbeBucket::All, &inf).is_empty());
}

#[test]
fn test_config_driven_run() {
    let dir = tempfile::tempdir().unwrap();
    let probe_path = dir.path().join("probe.json");
    let config_path = dir.path().join("config.json");

    fs::write(
        &probe_path,
        json!({
            "netcard": [{
                "class_id": 2, "sub_class_id": 134, "device": "OSA Express",
                "dev_name": "eth0", "sysfs_bus_id": "0.0.0700",
                "drivers": [{"modules": [["qeth", ""]]}]
            }]
        })
        .to_string(),
    )
    .unwrap();

    let config = InventoryConfig {
        probe_file: probe_path,
        bucket: ProbeBucket::Netcard,
        broken_modules: vec!["ctcm".to_string()],
        distinguished_names: true,
        ..InventoryConfig::new()
    };
    config.save_to_file(&config_path).unwrap();

    let loaded = InventoryConfig::load_from_file(&config_path).unwrap();
    loaded.validate().unwrap();

    let snapshot = ProbeSnapshot::load(&loaded.probe_file).unwrap();
    let inventory = InventoryBuilder::new(loaded.resolve_broken_modules().unwrap())
        .distinguished_names(loaded.distinguished_names)
        .read_hardware(&snapshot, loaded.bucket);

    let device = inventory.get(0).unwrap();
    assert_eq!(device.kind, DeviceKind::Qeth);
    assert_eq!(device.name, "OSA Express (0.0.0700)");
}

#[test]
fn test_inventory_serializes_as_list() {
    let input = records(vec![json!({"class_id": 2, "sub_class_id": 0, "dev_name": "eth0"})]);
    let value = serde_json::to_value(build(&input, &[])).unwrap();

    let list = value.as_array().expect("inventory should serialize as an array");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["kind"], json!("eth"));
    assert_eq!(list[0]["num"], json!(0));
    assert!(list[0]["payload"]["netcard"].is_object());
}

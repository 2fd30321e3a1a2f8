use dispatch_core::{
    config::DispatchConfig,
    lookup::{LookupTables, DISTANCES_FILE, SPEEDS_FILE},
    DispatchError,
};
use std::fs;

#[test]
fn partial_config_file_fills_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");
    fs::write(&path, r#"{ "seed": 1234, "num_couriers": 12, "epoch": "2025-06-02T08:00:00" }"#).unwrap();

    let config = DispatchConfig::load(&path).unwrap();
    assert_eq!(config.seed, 1234);
    assert_eq!(config.num_couriers, 12);
    assert_eq!(config.num_orders, DispatchConfig::default().num_orders);
    assert_eq!(config.zone_ids.len(), 263);
    assert_eq!(config.epoch.features_at(0.0).unwrap().hour, 8);
    assert_eq!(config.lookup_defaults().speed_kmh, 20.0);
}

#[test]
fn invalid_values_are_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{ "order_interval_secs": -5.0 }"#).unwrap();

    let err = DispatchConfig::load(&path).unwrap_err();
    assert!(matches!(err, DispatchError::InvalidConfig { .. }), "got {err}");
}

#[test]
fn start_time_outside_the_calendar_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    for body in [
        r#"{ "start_time": -1e300 }"#,
        r#"{ "start_time": -60.0 }"#,
        r#"{ "start_time": 1e300 }"#,
    ] {
        let path = dir.path().join("start.json");
        fs::write(&path, body).unwrap();
        let err = DispatchConfig::load(&path).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidConfig { .. }), "{body}: got {err}");
    }
}

#[test]
fn order_window_past_the_calendar_is_rejected() {
    let config = DispatchConfig { order_interval_secs: 1e16, num_orders: 10, ..DispatchConfig::default() };
    assert!(matches!(config.validate(), Err(DispatchError::InvalidConfig { .. })));
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(DispatchConfig::load(dir.path().join("absent.json")).is_err());
}

#[test]
fn lookup_tables_load_from_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(DISTANCES_FILE),
        r#"[{ "pickup_zone": 1, "dropoff_zone": 2, "great_circle_km": 2.5 }]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join(SPEEDS_FILE),
        r#"[
            { "pickup_zone": 1, "dropoff_zone": 2, "pickup_hour": 8, "historical_speed_kmh": 10.0 },
            { "pickup_zone": 1, "dropoff_zone": 2, "pickup_hour": 8, "historical_speed_kmh": 20.0 },
            { "pickup_zone": 1, "dropoff_zone": 2, "pickup_hour": 8, "historical_speed_kmh": 60.0 }
        ]"#,
    )
    .unwrap();

    let tables = LookupTables::load(dir.path()).unwrap();
    assert_eq!(tables.distances.get(1, 2), Some(2.5));
    assert_eq!(tables.speeds.get(1, 2, 8), Some(20.0));
}

#[test]
fn missing_tables_degrade_to_empty() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(SPEEDS_FILE), "[]").unwrap();

    let tables = LookupTables::load(dir.path()).unwrap();
    assert!(tables.distances.is_empty());
    assert!(tables.speeds.is_empty());
}

#[test]
fn malformed_table_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(DISTANCES_FILE), "{ not json").unwrap();
    let err = LookupTables::load(dir.path()).unwrap_err();
    assert!(matches!(err, DispatchError::Serialization(_)));
}

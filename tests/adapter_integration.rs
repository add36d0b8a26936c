// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for device adapters using wiremock.

use std::time::Duration;

use thermobridge::accessory::DeviceAdapter;
use thermobridge::config::{AccessoryType, Device, EndpointConfig};
use thermobridge::types::{Characteristic, CharacteristicValue};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoints(server: &MockServer) -> EndpointConfig {
    EndpointConfig::default()
        .with_base_url(server.uri())
        .with_request_timeout(Duration::from_secs(2))
}

fn adapter(server: &MockServer, device: &Device) -> DeviceAdapter {
    DeviceAdapter::from_device(device, &endpoints(server)).unwrap()
}

async fn mount_json(server: &MockServer, at: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_failure(server: &MockServer, at: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

// ============================================================================
// Heat pump
// ============================================================================

mod heatpump {
    use super::*;

    fn device() -> Device {
        Device::new("Living Room", AccessoryType::Heatpump, "HP-1")
    }

    #[tokio::test]
    async fn auto_mode_above_setpoint_reports_cooling() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/state",
            serde_json::json!({"mode": "AUTO", "targetTemperature": 21}),
        )
        .await;
        mount_json(
            &server,
            "/temperature-and-humidity",
            serde_json::json!({"temperature": 22.0, "humidity": 45.0}),
        )
        .await;

        let hp = adapter(&server, &device());

        assert_eq!(hp.get_mode().await, 3);
        assert_eq!(hp.get_operating_state().await, 2);
        assert!((hp.get_current_temperature().await - 22.0).abs() < f64::EPSILON);
        assert_eq!(hp.get_current_humidity().await, Some(45.0));
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/state"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"mode": "HEAT", "targetTemperature": 20.5}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let hp = adapter(&server, &device());
        let (mode, setpoint, again) = tokio::join!(
            hp.get_mode(),
            hp.get_target_temperature(),
            hp.read(Characteristic::TargetHeatingCoolingState)
        );

        assert_eq!(mode, 1);
        assert!((setpoint - 20.5).abs() < f64::EPSILON);
        assert_eq!(again, Some(CharacteristicValue::Int(1)));
    }

    #[tokio::test]
    async fn sequential_reads_are_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/state"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"mode": "COOL", "targetTemperature": 24})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let hp = adapter(&server, &device());
        assert_eq!(hp.get_mode().await, 2);
        assert_eq!(hp.get_mode().await, 2);
    }

    #[tokio::test]
    async fn failed_read_serves_last_known_value() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/state",
            serde_json::json!({"mode": "HEAT", "targetTemperature": 19.0}),
        )
        .await;

        let hp = adapter(&server, &device());
        assert!((hp.get_target_temperature().await - 19.0).abs() < f64::EPSILON);

        server.reset().await;
        mount_failure(&server, "/state").await;

        assert!((hp.get_target_temperature().await - 19.0).abs() < f64::EPSILON);
        assert_eq!(hp.get_mode().await, 1);
    }

    #[tokio::test]
    async fn failed_read_without_history_serves_defaults() {
        let server = MockServer::start().await;
        mount_failure(&server, "/state").await;
        mount_failure(&server, "/temperature-and-humidity").await;

        let hp = adapter(&server, &device());

        assert_eq!(hp.get_mode().await, 0);
        assert_eq!(hp.get_operating_state().await, 0);
        assert!(hp.get_current_temperature().await.abs() < f64::EPSILON);
        assert_eq!(hp.get_current_humidity().await, Some(0.0));
    }

    #[tokio::test]
    async fn unknown_mode_symbol_reads_as_off() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/state",
            serde_json::json!({"mode": "DEFROST", "targetTemperature": 21.0}),
        )
        .await;

        assert_eq!(adapter(&server, &device()).get_mode().await, 0);
    }
}

// ============================================================================
// Thermostat
// ============================================================================

mod thermostat {
    use super::*;

    fn device() -> Device {
        Device::new("Hall", AccessoryType::Thermostat, "TS-001")
            .with_device_id("hall")
            .with_temperature_range(15.0, 28.0)
            .with_humidity(true)
    }

    #[tokio::test]
    async fn reads_reported_state() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/current-state/hall",
            serde_json::json!({
                "operatingState": "HEATING",
                "currentTemperature": 18.5,
                "currentHumidity": 41.0
            }),
        )
        .await;

        let ts = adapter(&server, &device());

        assert_eq!(ts.get_operating_state().await, 1);
        assert!((ts.get_current_temperature().await - 18.5).abs() < f64::EPSILON);
        assert_eq!(ts.get_current_humidity().await, Some(41.0));
    }

    #[tokio::test]
    async fn missing_fields_read_as_idle_and_zero() {
        let server = MockServer::start().await;
        mount_json(&server, "/current-state/hall", serde_json::json!({})).await;

        let ts = adapter(&server, &device());

        assert_eq!(ts.get_operating_state().await, 0);
        assert!(ts.get_current_temperature().await.abs() < f64::EPSILON);
        assert_eq!(ts.get_current_humidity().await, Some(0.0));
    }

    #[tokio::test]
    async fn write_posts_partial_update() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/target-state/hall"))
            .and(body_json(serde_json::json!({"mode": "AUTO"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/target-state/hall"))
            .and(body_json(serde_json::json!({"targetTemperature": 22.0})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let ts = adapter(&server, &device());
        assert!(
            ts.write(
                Characteristic::TargetHeatingCoolingState,
                CharacteristicValue::Int(3)
            )
            .await
        );
        assert!(
            ts.write(
                Characteristic::TargetTemperature,
                CharacteristicValue::Float(22.0)
            )
            .await
        );
    }

    #[tokio::test]
    async fn out_of_range_mode_number_posts_off() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/target-state/hall"))
            .and(body_json(serde_json::json!({"mode": "OFF"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        adapter(&server, &device()).set_mode(9).await;
    }

    #[tokio::test]
    async fn fractional_mode_number_posts_off() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/target-state/hall"))
            .and(body_json(serde_json::json!({"mode": "OFF"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        assert!(
            adapter(&server, &device())
                .write(
                    Characteristic::TargetHeatingCoolingState,
                    CharacteristicValue::Float(2.7)
                )
                .await
        );
    }

    #[tokio::test]
    async fn failed_write_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/target-state/hall"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let ts = adapter(&server, &device());
        ts.set_target_temperature(21.0).await;
    }

    #[tokio::test]
    async fn read_only_characteristics_reject_writes() {
        let server = MockServer::start().await;
        let ts = adapter(&server, &device());

        assert!(
            !ts.write(
                Characteristic::CurrentTemperature,
                CharacteristicValue::Float(30.0)
            )
            .await
        );
    }

    #[tokio::test]
    async fn slow_device_times_out_to_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/current-state/hall"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"currentTemperature": 20.0}))
                    .set_delay(Duration::from_millis(800)),
            )
            .mount(&server)
            .await;

        let endpoints = endpoints(&server).with_request_timeout(Duration::from_millis(100));
        let ts = DeviceAdapter::from_device(&device(), &endpoints).unwrap();

        assert!(ts.get_current_temperature().await.abs() < f64::EPSILON);
    }
}

// ============================================================================
// Thermofridge
// ============================================================================

mod thermofridge {
    use super::*;

    fn device() -> Device {
        Device::new("Garage Fridge", AccessoryType::Thermofridge, "TF-001")
    }

    #[tokio::test]
    async fn reads_by_serial_number() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/target-state/TF-001",
            serde_json::json!({"mode": "COOL", "targetTemperature": 4}),
        )
        .await;
        mount_json(
            &server,
            "/current-state/TF-001",
            serde_json::json!({"operatingState": "COOLING", "currentTemperature": 7.0}),
        )
        .await;

        let tf = adapter(&server, &device());

        assert_eq!(tf.get_mode().await, 2);
        assert!((tf.get_target_temperature().await - 4.0).abs() < f64::EPSILON);
        assert_eq!(tf.get_operating_state().await, 2);
        assert!((tf.get_current_temperature().await - 7.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn humidity_is_not_exposed() {
        let server = MockServer::start().await;
        let tf = adapter(&server, &device());

        assert_eq!(tf.get_current_humidity().await, None);
        assert_eq!(tf.read(Characteristic::CurrentRelativeHumidity).await, None);
        assert!(
            tf.characteristics()
                .iter()
                .all(|s| s.characteristic != Characteristic::CurrentRelativeHumidity)
        );
    }

    #[tokio::test]
    async fn setpoint_range_is_fixed() {
        let server = MockServer::start().await;
        let tf = adapter(&server, &device().with_temperature_range(-20.0, -10.0));

        let props = tf
            .characteristics()
            .into_iter()
            .find_map(|s| s.props)
            .unwrap();
        assert!(props.min_value.abs() < f64::EPSILON);
        assert!((props.max_value - 30.0).abs() < f64::EPSILON);
        assert!((props.min_step - 1.0).abs() < f64::EPSILON);
    }
}

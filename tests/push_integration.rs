// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the thermostat push channel against a local
//! WebSocket server.

#![cfg(feature = "push")]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use thermobridge::accessory::DeviceAdapter;
use thermobridge::config::{AccessoryType, Device, EndpointConfig};
use thermobridge::event::RegistryEvent;
use thermobridge::protocol::PushChannel;
use thermobridge::registry::{AccessoryHost, AccessoryUuid, DeviceRegistry, PlatformAccessory};
use thermobridge::types::{Characteristic, CharacteristicValue};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Default)]
struct PushHost {
    updates: Mutex<Vec<(AccessoryUuid, Characteristic, CharacteristicValue)>>,
}

impl AccessoryHost for PushHost {
    fn attach(&self, _: &PlatformAccessory, _: &Arc<DeviceAdapter>) {}

    fn register_accessories(&self, _: &[PlatformAccessory]) {}

    fn unregister_accessories(&self, _: &[PlatformAccessory]) {}

    fn update_characteristic(
        &self,
        uuid: AccessoryUuid,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) {
        self.updates.lock().push((uuid, characteristic, value));
    }
}

/// Serves one WebSocket client: sends `frames`, then reports when the
/// client goes away.
async fn serve_frames(frames: Vec<&'static str>) -> (SocketAddr, oneshot::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for frame in frames {
            ws.send(Message::Text(frame.into())).await.unwrap();
        }
        // Drain until the client disconnects.
        while let Some(Ok(_)) = ws.next().await {}
        let _ = closed_tx.send(());
    });

    (addr, closed_rx)
}

async fn next_push(
    rx: &mut broadcast::Receiver<RegistryEvent>,
) -> (Characteristic, CharacteristicValue) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let RegistryEvent::CharacteristicPushed {
                characteristic,
                value,
                ..
            } = rx.recv().await.unwrap()
            {
                return (characteristic, value);
            }
        }
    })
    .await
    .expect("no pushed characteristic")
}

fn thermostat(addr: SocketAddr) -> Device {
    Device::new("Hall", AccessoryType::Thermostat, "TS-PUSH")
        .with_humidity(true)
        .with_push_url(format!("ws://{addr}/"))
}

#[tokio::test]
async fn channel_forwards_text_frames() {
    let (addr, _closed) = serve_frames(vec![r#"{"mode":"HEAT"}"#, r#"{"mode":"OFF"}"#]).await;

    let (mut frames, _reader) = PushChannel::spawn(format!("ws://{addr}/")).into_parts();

    assert_eq!(frames.recv().await.unwrap(), r#"{"mode":"HEAT"}"#);
    assert_eq!(frames.recv().await.unwrap(), r#"{"mode":"OFF"}"#);
}

#[tokio::test]
async fn unreachable_server_closes_channel() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (mut frames, reader) = PushChannel::spawn(format!("ws://{addr}/")).into_parts();

    assert!(frames.recv().await.is_none());
    reader.await.unwrap();
}

#[tokio::test]
async fn pushed_snapshot_reaches_host() {
    let (addr, _closed) = serve_frames(vec![
        "garbage",
        r#"{"operatingState":"COOLING","currentTemperature":23.5}"#,
    ])
    .await;

    let host = Arc::new(PushHost::default());
    let mut registry = DeviceRegistry::new(
        Arc::clone(&host),
        EndpointConfig::default().with_base_url("http://127.0.0.1:9/api/v1"),
    );
    let mut rx = registry.subscribe();
    let device = thermostat(addr);
    registry.reconcile(std::slice::from_ref(&device));

    assert_eq!(
        next_push(&mut rx).await,
        (
            Characteristic::CurrentHeatingCoolingState,
            CharacteristicValue::Int(2)
        )
    );
    assert_eq!(
        next_push(&mut rx).await,
        (
            Characteristic::CurrentTemperature,
            CharacteristicValue::Float(23.5)
        )
    );

    let updates = host.updates.lock().clone();
    assert_eq!(updates.len(), 2);
    assert!(updates.iter().all(|(uuid, _, _)| *uuid == device.uuid()));

    // Pushed values become the stale fallback for failed reads.
    let adapter = registry.adapter(device.uuid()).unwrap();
    assert!((adapter.get_current_temperature().await - 23.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn retiring_accessory_closes_its_channel() {
    let (addr, closed) = serve_frames(vec![]).await;

    let host = Arc::new(PushHost::default());
    let mut registry = DeviceRegistry::new(host, EndpointConfig::default());
    registry.reconcile(&[thermostat(addr)]);

    // Give the reader time to connect before retiring.
    tokio::time::sleep(Duration::from_millis(200)).await;
    registry.reconcile(&[]);

    tokio::time::timeout(Duration::from_secs(5), closed)
        .await
        .expect("push channel still open")
        .unwrap();
}

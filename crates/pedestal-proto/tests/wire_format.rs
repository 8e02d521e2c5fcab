//! Wire format tests.
//!
//! Snapshots pin the exact JSON the device server expects. Property tests
//! check that arbitrary input never panics the decoder.

use insta::assert_snapshot;
use pedestal_proto::{
    ClientMessage, ConnectionResponse, Device, DeviceId, Direction, ServerMessage, codec,
};
use proptest::prelude::*;

fn json<T: serde::Serialize>(message: &T) -> String {
    serde_json::to_string(message).unwrap()
}

#[test]
fn request_device_list_has_no_payload() {
    assert_snapshot!(json(&ClientMessage::RequestDeviceList), @r#"{"event":"get_usb_devices"}"#);
}

#[test]
fn connect_request_carries_connect_message() {
    let message = ClientMessage::connect(DeviceId::new("/dev/ttyUSB0"));
    assert_snapshot!(
        json(&message),
        @r#"{"event":"connect_to_device","data":{"device":"/dev/ttyUSB0","message":"connect"}}"#
    );
}

#[test]
fn directional_command_uses_send_data() {
    let message = ClientMessage::directional(DeviceId::new("/dev/ttyUSB0"), Direction::Down);
    assert_snapshot!(
        json(&message),
        @r#"{"event":"send_data","data":{"device":"/dev/ttyUSB0","message":"down"}}"#
    );
}

#[test]
fn release_uses_opaque_marker() {
    assert_snapshot!(json(&ClientMessage::release()), @r#"{"event":"disconnect","data":1}"#);
}

#[test]
fn failure_response_omits_absent_fields() {
    let message = ServerMessage::ConnectionResponse(ConnectionResponse::failure("busy"));
    assert_snapshot!(
        json(&message),
        @r#"{"event":"connection_response","data":{"status":"failure","message":"busy"}}"#
    );
}

#[test]
fn device_list_decodes_from_server_line() {
    let line = r#"{"event":"usb_devices","data":[{"device":"/dev/ttyUSB0","name":"Arduino"}]}"#;
    let message: ServerMessage = codec::decode(line).unwrap();
    assert_eq!(message, ServerMessage::DeviceList(vec![Device::new("Arduino", "/dev/ttyUSB0")]));
}

#[test]
fn server_error_response_decodes() {
    let line = concat!(
        r#"{"event":"connection_response","#,
        r#""data":{"status":"error","message":"could not open port"}}"#,
    );
    let message: ServerMessage = codec::decode(line).unwrap();

    let ServerMessage::ConnectionResponse(response) = message else {
        panic!("expected connection response");
    };
    assert!(!response.is_ready());
    assert_eq!(response.message.as_deref(), Some("could not open port"));
}

proptest! {
    #[test]
    fn prop_decode_never_panics(line in ".{0,256}") {
        let _ = codec::decode::<ServerMessage>(&line);
        let _ = codec::decode::<ClientMessage>(&line);
    }

    #[test]
    fn prop_device_names_survive_framing(
        names in prop::collection::vec("[ -~]{0,32}", 0..8),
    ) {
        let devices: Vec<Device> = names
            .iter()
            .enumerate()
            .map(|(i, name)| Device::new(name.clone(), format!("/dev/ttyUSB{i}")))
            .collect();

        let line = codec::encode(&ServerMessage::DeviceList(devices.clone())).unwrap();
        let decoded: ServerMessage = codec::decode(&line).unwrap();
        prop_assert_eq!(decoded, ServerMessage::DeviceList(devices));
    }
}

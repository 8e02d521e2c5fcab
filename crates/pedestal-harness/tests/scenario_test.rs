//! End-to-end scenarios through the production Runtime.
//!
//! Each test drives `Runtime<SimDriver, SimEnv>` step by step against the
//! in-memory device server, advancing the virtual clock explicitly, and
//! checks the standard invariants after every step.

use std::time::Duration;

use pedestal_app::{KeyInput, Runtime, RuntimeConfig};
use pedestal_core::{
    FirstEmission, SessionConfig, SessionStatus, StatusKind, StreamConfig,
};
use pedestal_harness::{
    ControllerSnapshot, InvariantRegistry, SharedSimServer, SimDriver, SimEnv, SimServer,
    create_shared_server,
};
use pedestal_proto::{ClientMessage, CommandMessage, Device, DeviceId, Direction, codec};

type SimRuntime = Runtime<SimDriver, SimEnv>;

struct World {
    runtime: SimRuntime,
    driver: SimDriver,
    env: SimEnv,
    server: SharedSimServer,
    invariants: InvariantRegistry,
}

impl World {
    async fn new(server: SimServer) -> Self {
        Self::with_config(server, RuntimeConfig::default()).await
    }

    async fn with_config(server: SimServer, config: RuntimeConfig) -> Self {
        let server = create_shared_server(server);
        let driver = SimDriver::new().with_server(server.clone());
        let env = SimEnv::new();
        let mut runtime =
            Runtime::new(driver.clone(), env.clone(), "sim:5000".into(), config).unwrap();

        assert!(!runtime.start().await.unwrap());

        let mut world =
            Self { runtime, driver, env, server, invariants: InvariantRegistry::standard() };
        // Deliver the device list requested on channel open.
        world.step().await;
        world
    }

    async fn step(&mut self) -> bool {
        let quit = self.runtime.step().await.unwrap();
        let snapshot =
            ControllerSnapshot::capture(self.runtime.app(), self.runtime.bridge().session());
        self.invariants.assert_all(&snapshot, "after step");
        quit
    }

    async fn press(&mut self, key: KeyInput) {
        self.driver.press(key);
        self.step().await;
    }

    async fn release(&mut self, key: KeyInput) {
        self.driver.release(key);
        self.step().await;
    }

    /// Advance the clock 1ms at a time, stepping after each.
    async fn hold_for(&mut self, ms: u64) {
        for _ in 0..ms {
            self.env.advance(Duration::from_millis(1));
            self.step().await;
        }
    }

    fn status(&self) -> SessionStatus {
        self.runtime.app().session_status()
    }

    fn status_text(&self) -> Option<String> {
        self.runtime.app().status_line().map(|line| line.text.clone())
    }

    fn commands_received(&self, message: CommandMessage) -> usize {
        self.server.lock().unwrap().commands().iter().filter(|c| c.message == message).count()
    }
}

fn arduino() -> SimServer {
    SimServer::new(vec![Device::new("Arduino", "/dev/ttyUSB0")])
}

async fn connected_world() -> World {
    let mut world = World::new(arduino()).await;
    world.press(KeyInput::Enter).await;
    assert_eq!(world.status(), SessionStatus::Connected);
    world
}

#[tokio::test]
async fn startup_fetches_device_list() {
    let world = World::new(arduino()).await;

    assert_eq!(world.driver.take_sent(), vec![ClientMessage::RequestDeviceList]);
    assert_eq!(world.runtime.app().devices(), &[Device::new("Arduino", "/dev/ttyUSB0")]);
    assert_eq!(
        world.runtime.app().highlighted().map(Device::label).as_deref(),
        Some("Arduino (/dev/ttyUSB0)")
    );
}

#[tokio::test]
async fn select_then_connected_enables_controls() {
    let mut world = World::new(arduino()).await;

    world.press(KeyInput::Enter).await;

    let app = world.runtime.app();
    assert_eq!(app.session_status(), SessionStatus::Connected);
    assert!(app.controls_enabled());
    assert_eq!(app.status_line().map(|l| l.kind), Some(StatusKind::Success));
    assert_eq!(world.server.lock().unwrap().open().map(DeviceId::as_str), Some("/dev/ttyUSB0"));
}

#[tokio::test]
async fn refused_connect_shows_server_reason() {
    let mut world = World::new(arduino().with_refusal("busy")).await;

    world.press(KeyInput::Enter).await;

    assert_eq!(world.status(), SessionStatus::Failed);
    assert!(!world.runtime.app().controls_enabled());
    assert_eq!(world.status_text().as_deref(), Some("Error: busy"));
}

#[tokio::test]
async fn failed_session_recovers_by_reselecting() {
    let mut world = World::new(arduino().with_refusal("busy")).await;
    world.press(KeyInput::Enter).await;

    world.server.lock().unwrap().set_refusal(None);
    world.press(KeyInput::Enter).await;

    assert_eq!(world.status(), SessionStatus::Connected);
}

#[tokio::test]
async fn held_up_streams_within_cadence_band() {
    let mut world = connected_world().await;

    world.press(KeyInput::Char('u')).await;
    world.hold_for(10).await;

    let ups = world.commands_received(CommandMessage::Up);
    assert!((4..=6).contains(&ups), "received {ups} up commands");

    world.release(KeyInput::Char('u')).await;
    world.hold_for(2).await;

    assert_eq!(world.commands_received(CommandMessage::Up), ups);
    assert_eq!(world.runtime.app().streaming(), None);
}

#[tokio::test]
async fn delayed_first_emission_waits_one_period() {
    let config = RuntimeConfig {
        session: SessionConfig {
            stream: StreamConfig {
                cadence: Duration::from_millis(2),
                first_emission: FirstEmission::AfterPeriod,
            },
        },
        ..RuntimeConfig::default()
    };
    let mut world = World::with_config(arduino(), config).await;
    world.press(KeyInput::Enter).await;

    world.press(KeyInput::Char('d')).await;
    assert_eq!(world.commands_received(CommandMessage::Down), 0);

    world.hold_for(10).await;
    assert_eq!(world.commands_received(CommandMessage::Down), 5);
}

#[tokio::test]
async fn space_stops_stream() {
    let mut world = connected_world().await;
    world.press(KeyInput::Char('d')).await;

    world.press(KeyInput::Char(' ')).await;
    let downs = world.commands_received(CommandMessage::Down);
    world.hold_for(6).await;

    assert_eq!(world.commands_received(CommandMessage::Down), downs);
}

#[tokio::test]
async fn reset_sends_one_command() {
    let mut world = connected_world().await;

    world.press(KeyInput::Char('r')).await;
    world.hold_for(4).await;

    assert_eq!(world.commands_received(CommandMessage::Reset), 1);
}

#[tokio::test]
async fn press_before_connect_warns_only() {
    let mut world = World::new(arduino()).await;

    world.press(KeyInput::Char('u')).await;
    world.hold_for(4).await;

    assert_eq!(world.server.lock().unwrap().commands().len(), 0);
    assert_eq!(
        world.status_text().as_deref(),
        Some("Please ensure the device is connected first.")
    );
}

#[tokio::test]
async fn channel_loss_releases_once_and_stops_stream() {
    let mut world = connected_world().await;
    world.press(KeyInput::Char('u')).await;
    let ups = world.commands_received(CommandMessage::Up);
    let _ = world.driver.take_sent();

    world.driver.drop_channel();
    world.step().await;
    world.hold_for(6).await;

    let releases = world
        .driver
        .dropped()
        .into_iter()
        .chain(world.driver.take_sent())
        .filter(|m| matches!(m, ClientMessage::ReleaseDevice(_)))
        .count();
    assert_eq!(releases, 1);

    let app = world.runtime.app();
    assert_eq!(app.session_status(), SessionStatus::Disconnected);
    assert!(!app.controls_enabled());
    assert!(!app.channel_open());
    assert_eq!(world.runtime.bridge().session().selected_device(), None);
    assert_eq!(world.status_text().as_deref(), Some("Disconnected from device."));
    assert_eq!(world.commands_received(CommandMessage::Up), ups);
}

#[tokio::test]
async fn select_lose_select_sends_two_connects() {
    let driver = SimDriver::new();
    let env = SimEnv::new();
    let mut runtime: SimRuntime =
        Runtime::new(driver.clone(), env, "sim:5000".into(), RuntimeConfig::default()).unwrap();
    let _ = runtime.start().await.unwrap();
    driver.inject_message(pedestal_proto::ServerMessage::DeviceList(vec![Device::new(
        "Arduino",
        "/dev/ttyUSB0",
    )]));
    let _ = runtime.step().await.unwrap();

    driver.press(KeyInput::Enter);
    let _ = runtime.step().await.unwrap();
    driver.drop_channel();
    let _ = runtime.step().await.unwrap();
    driver.press(KeyInput::Char('c'));
    let _ = runtime.step().await.unwrap();
    driver.press(KeyInput::Enter);
    let _ = runtime.step().await.unwrap();

    let connects: Vec<_> = driver
        .take_sent()
        .into_iter()
        .filter(|m| matches!(m, ClientMessage::Connect(_)))
        .collect();
    let expected = ClientMessage::connect(DeviceId::new("/dev/ttyUSB0"));
    assert_eq!(connects, vec![expected.clone(), expected]);
    assert_eq!(runtime.app().session_status(), SessionStatus::Connecting);
    assert_eq!(driver.connect_attempts(), 2);
}

#[tokio::test]
async fn unreachable_server_is_reported_and_retryable() {
    let driver = SimDriver::new();
    driver.refuse_connect(true);
    let mut runtime: SimRuntime =
        Runtime::new(driver.clone(), SimEnv::new(), "sim:5000".into(), RuntimeConfig::default())
            .unwrap();

    assert!(!runtime.start().await.unwrap());
    let line = runtime.app().status_line().cloned().unwrap();
    assert_eq!(line.kind, StatusKind::Error);
    assert!(line.text.starts_with("Error: "));
    assert!(!runtime.app().channel_open());

    driver.refuse_connect(false);
    driver.press(KeyInput::Char('c'));
    let _ = runtime.step().await.unwrap();

    assert!(runtime.app().channel_open());
    assert_eq!(driver.take_sent(), vec![ClientMessage::RequestDeviceList]);
}

#[tokio::test]
async fn quit_releases_device() {
    let mut world = connected_world().await;

    world.driver.press(KeyInput::Char('q'));
    assert!(world.step().await);
    world.runtime.shutdown().await;

    let server = world.server.lock().unwrap();
    assert_eq!(server.releases(), 1);
    assert!(server.open().is_none());
}

#[tokio::test]
async fn run_loop_paces_stream_with_virtual_clock() {
    let server = create_shared_server(arduino());
    let driver = SimDriver::new().with_server(server.clone());
    let env = SimEnv::new();
    let runtime: SimRuntime =
        Runtime::new(driver.clone(), env.clone(), "sim:5000".into(), RuntimeConfig::default())
            .unwrap();

    driver.inject_event(pedestal_app::AppEvent::Tick);
    driver.press(KeyInput::Enter);
    driver.press(KeyInput::Char('u'));
    driver.press(KeyInput::Char('q'));
    runtime.run().await.unwrap();

    let server = server.lock().unwrap();
    assert_eq!(server.connects().len(), 1);
    assert!(!server.commands().is_empty());
    assert!(server.commands().iter().all(|c| c.message == CommandMessage::from(Direction::Up)));
    assert_eq!(server.releases(), 1);
    assert_eq!(server.stray_commands(), 0);
}

#[tokio::test]
async fn reset_and_quit_wire_transcript() {
    let mut world = connected_world().await;

    world.press(KeyInput::Char('r')).await;
    world.driver.press(KeyInput::Char('q'));
    assert!(world.step().await);
    world.runtime.shutdown().await;

    let server = world.server.lock().unwrap();
    let transcript: String = server
        .received()
        .iter()
        .map(|message| codec::encode(message).unwrap())
        .collect();
    insta::assert_snapshot!(transcript.trim_end(), @r#"
    {"event":"get_usb_devices"}
    {"event":"connect_to_device","data":{"device":"/dev/ttyUSB0","message":"connect"}}
    {"event":"send_data","data":{"device":"/dev/ttyUSB0","message":"reset"}}
    {"event":"disconnect","data":1}
    "#);
}

#[tokio::test]
async fn loss_is_handled_before_later_press() {
    let mut world = connected_world().await;
    let _ = world.driver.take_sent();

    world.driver.drop_channel();
    world.driver.press(KeyInput::Char('u'));
    world.step().await;
    world.hold_for(4).await;

    let after_loss: Vec<_> =
        world.driver.dropped().into_iter().chain(world.driver.take_sent()).collect();
    assert_eq!(after_loss, vec![ClientMessage::release()]);
    assert_eq!(world.commands_received(CommandMessage::Up), 0);
    assert_eq!(world.runtime.app().streaming(), None);
    assert_eq!(
        world.status_text().as_deref(),
        Some("Please ensure the device is connected first.")
    );
}

#[tokio::test]
async fn refetch_replaces_device_list() {
    let mut world = World::new(arduino()).await;
    let replacement =
        vec![Device::new("CP2102", "/dev/ttyUSB1"), Device::new("CH340", "/dev/ttyACM0")];

    world.server.lock().unwrap().set_devices(replacement.clone());
    world.press(KeyInput::Char('l')).await;
    assert_eq!(world.runtime.app().devices(), replacement.as_slice());

    world.server.lock().unwrap().set_devices(Vec::new());
    world.press(KeyInput::Char('l')).await;
    assert!(world.runtime.app().devices().is_empty());
    assert!(world.runtime.app().highlighted().is_none());
}

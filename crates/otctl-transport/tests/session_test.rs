//! Session behaviour against scripted in-memory devices.

use otctl_cli_protocol::{CliDialect, Command};
use otctl_transport::mock::{MockDevice, MockPortFactory};
use otctl_transport::{PortFactory, PortSettings, Session, TransportError};

const PATH: &str = "/dev/ttyACM1";

fn factory_with(device: MockDevice) -> MockPortFactory {
    let factory = MockPortFactory::new();
    factory.add_device(PATH, device);
    factory
}

#[test]
fn test_write_then_read_discards_echo() {
    let factory = factory_with(MockDevice::with_replies(
        [("ot platform", "Zephyr\r\nDone\r\n> ")],
        "",
    ));

    let mut session = Session::open(&factory, PATH, &PortSettings::standard()).unwrap();
    let reply = session.write_then_read("ot platform").unwrap();

    assert_eq!(reply, "Zephyr\r\nDone\r\n> ");
    assert_eq!(factory.received(PATH), vec!["ot platform".to_string()]);
}

#[test]
fn test_exchange_renders_dialect() {
    let factory = factory_with(MockDevice::with_replies([("state", "leader\r\nDone\r\n")], ""));

    let mut session = Session::open(&factory, PATH, &PortSettings::standard()).unwrap();
    let reply = session.exchange(&Command::State, CliDialect::Native).unwrap();

    assert!(reply.contains("leader"));
    assert_eq!(factory.received(PATH), vec!["state".to_string()]);
}

#[test]
fn test_read_available_is_bounded() {
    let factory = factory_with(MockDevice::silent().with_pending_output(&"x".repeat(500)));

    let mut session = Session::open(&factory, PATH, &PortSettings::standard()).unwrap();
    assert_eq!(session.read_available(200).unwrap().len(), 200);
    assert_eq!(session.read_available(1000).unwrap().len(), 300);
    assert!(session.read_available(10).unwrap().is_empty());
}

#[test]
fn test_flush_input_drops_boot_banner() {
    let factory = factory_with(
        MockDevice::with_replies([("ot state", "detached\r\nDone\r\n")], "")
            .with_pending_output("*** Booting Zephyr OS ***\r\n"),
    );

    let mut session = Session::open(&factory, PATH, &PortSettings::standard()).unwrap();
    session.flush_input().unwrap();
    let reply = session.write_then_read("ot state").unwrap();

    assert_eq!(reply, "detached\r\nDone\r\n");
}

#[test]
fn test_read_line_times_out_on_silence() {
    let factory = factory_with(MockDevice::silent().without_echo());

    let mut session = Session::open(&factory, PATH, &PortSettings::standard()).unwrap();
    let err = session.write_then_read("ot state").unwrap_err();

    assert!(matches!(err, TransportError::ReadTimeout { .. }));
    assert!(err.is_timeout());
}

#[test]
fn test_write_timeout_is_typed() {
    let factory = factory_with(MockDevice::silent().fail_on_write(1));

    let mut session = Session::open(&factory, PATH, &PortSettings::standard()).unwrap();
    let err = session.write_line("ot ifconfig up").unwrap_err();

    assert!(matches!(err, TransportError::WriteTimeout { ref path } if path == PATH));
}

#[test]
fn test_open_missing_path_is_unavailable() {
    let factory = MockPortFactory::new();
    let err = Session::open(&factory, "/dev/ttyACM9", &PortSettings::standard()).unwrap_err();
    assert!(matches!(err, TransportError::Unavailable { .. }));
}

#[test]
fn test_session_releases_on_every_exit_path() {
    let factory = factory_with(MockDevice::silent().without_echo());

    fn failing_exchange(factory: &MockPortFactory) -> Result<String, TransportError> {
        let mut session = Session::open(factory, PATH, &PortSettings::standard())?;
        session.write_then_read("ot state")
    }

    assert!(failing_exchange(&factory).is_err());
    assert!(!factory.is_held(PATH));

    let session = Session::open(&factory, PATH, &PortSettings::standard()).unwrap();
    assert!(factory.is_held(PATH));
    assert!(Session::open(&factory, PATH, &PortSettings::standard()).is_err());
    session.close();
    assert!(!factory.is_held(PATH));
    assert!(factory.exists(PATH));
}

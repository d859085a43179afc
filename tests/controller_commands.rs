use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use maestro::{
    ChannelConfig, FakeTransport, FakeTransportConfig, HomeMode, RecordedTransfer,
    ServoController, Settings, status_payload_len,
};

const SET_TARGET: u8 = 0x85;
const SET_VARIABLE: u8 = 0x84;
const CLEAR_ERRORS: u8 = 0x86;
const GET_VARIABLES: u8 = 0x83;

fn firmware_payload(major: u8, minor: u8) -> Vec<u8> {
    let mut payload = vec![0u8; 14];
    payload[12] = major;
    payload[13] = minor;
    payload
}

fn transport_with_reads(read_payloads: Vec<Vec<u8>>) -> FakeTransport {
    FakeTransport::new(
        FakeTransportConfig::builder()
            .read_payloads(read_payloads)
            .build(),
    )
}

fn commands_after_open(transfers: &[RecordedTransfer]) -> Vec<&RecordedTransfer> {
    // Skip the firmware read and the settings push issued by `open`.
    transfers
        .iter()
        .filter(|transfer| transfer.request() != 0x06 && transfer.request() != 0x82)
        .collect()
}

#[test]
fn open_captures_identity_from_the_device() -> anyhow::Result<()> {
    let transport = transport_with_reads(vec![firmware_payload(0x01, 0x04)]);

    let controller = ServoController::open(transport)?;
    assert_eq!("1.4", controller.firmware_version().to_string());
    assert_eq!("00000001", controller.serial_number());
    Ok(())
}

#[test]
fn targets_are_clamped_to_the_channel_limits() -> anyhow::Result<()> {
    let transport = transport_with_reads(Vec::new());
    let journal = transport.journal();

    let mut controller = ServoController::open(transport)?;
    controller.set_target(0, 2000)?;
    controller.set_target(0, 6000)?;
    controller.set_target(0, 9000)?;

    let transfers = journal.transfers();
    let commands = commands_after_open(&transfers);
    assert_eq!(3, commands.len());
    // The default channel limits are 3968..=8000 qus.
    assert_eq!(3968, commands[0].value());
    assert_eq!(6000, commands[1].value());
    assert_eq!(8000, commands[2].value());
    assert!(commands.iter().all(|command| {
        command.request() == SET_TARGET && command.index() == 0
    }));
    Ok(())
}

#[test]
fn reset_target_returns_to_the_effective_home() -> anyhow::Result<()> {
    let transport = transport_with_reads(Vec::new());
    let journal = transport.journal();

    let settings = Settings::default().with_channel(
        2,
        ChannelConfig::builder()
            .home_mode(HomeMode::Goto)
            .home(5500)
            .build(),
    );
    let mut controller = ServoController::open_with_settings(transport, settings)?;
    controller.reset_target(2)?;
    // Channel 0 keeps the default Off home, which clamps up to the minimum.
    controller.reset_target(0)?;

    let transfers = journal.transfers();
    let commands = commands_after_open(&transfers);
    assert_eq!(2, commands.len());
    assert_eq!(SET_TARGET, commands[0].request());
    assert_eq!(5500, commands[0].value());
    assert_eq!(2, commands[0].index());
    assert_eq!(3968, commands[1].value());
    assert_eq!(0, commands[1].index());
    Ok(())
}

#[test]
fn speed_and_acceleration_differ_only_in_the_index_high_bit() -> anyhow::Result<()> {
    let transport = transport_with_reads(Vec::new());
    let journal = transport.journal();

    let mut controller = ServoController::open(transport)?;
    controller.set_speed(3, 40)?;
    controller.set_acceleration(3, 9)?;

    let transfers = journal.transfers();
    let commands = commands_after_open(&transfers);
    assert_eq!(2, commands.len());
    assert_eq!(SET_VARIABLE, commands[0].request());
    assert_eq!(40, commands[0].value());
    assert_eq!(0x0003, commands[0].index());
    assert_eq!(SET_VARIABLE, commands[1].request());
    assert_eq!(9, commands[1].value());
    assert_eq!(0x0083, commands[1].index());
    Ok(())
}

#[test]
fn clear_errors_sends_a_bare_request() -> anyhow::Result<()> {
    let transport = transport_with_reads(Vec::new());
    let journal = transport.journal();

    let mut controller = ServoController::open(transport)?;
    controller.clear_errors()?;

    let transfers = journal.transfers();
    let commands = commands_after_open(&transfers);
    assert_eq!(1, commands.len());
    assert_eq!(CLEAR_ERRORS, commands[0].request());
    assert_eq!(0, commands[0].value());
    assert_eq!(0, commands[0].index());
    Ok(())
}

#[test]
fn status_polls_decode_one_record_per_channel() -> anyhow::Result<()> {
    let mut status_payload = vec![0u8; status_payload_len(6)];
    // Channel 0 record: position 6000, target 6020, speed 10, acceleration 3.
    let record_start = status_payload.len() - 6 * 7;
    status_payload[record_start..record_start + 2].copy_from_slice(&6000u16.to_le_bytes());
    status_payload[record_start + 2..record_start + 4].copy_from_slice(&6020u16.to_le_bytes());
    status_payload[record_start + 4..record_start + 6].copy_from_slice(&10u16.to_le_bytes());
    status_payload[record_start + 6] = 3;

    let transport =
        transport_with_reads(vec![firmware_payload(0x01, 0x00), status_payload]);
    let journal = transport.journal();

    let mut controller = ServoController::open(transport)?;
    let status = controller.status()?;

    assert_eq!(6, status.len());
    assert_eq!(6000, status[0].position());
    assert_eq!(6020, status[0].target());
    assert_eq!(10, status[0].speed());
    assert_eq!(3, status[0].acceleration());
    assert_eq!(0, status[5].position());

    let transfers = journal.transfers();
    let poll = transfers
        .last()
        .expect("the poll should be recorded");
    assert_eq!(GET_VARIABLES, poll.request());
    assert_eq!(0xC0, poll.request_type());
    assert_eq!(Some(status_payload_len(6)), poll.read_length());
    Ok(())
}

#[test]
fn close_releases_the_transport() {
    let transport = transport_with_reads(Vec::new());
    let journal = transport.journal();

    let controller = ServoController::open(transport).expect("open should succeed");
    let transfers_at_close = journal.transfers().len();
    controller.close();

    // Closing performs no further transfers.
    assert_eq!(transfers_at_close, journal.transfers().len());
}

#[test]
fn transport_failures_surface_to_the_caller() {
    let transport = transport_with_reads(vec![vec![0u8; 2]]);

    let result = ServoController::open(transport);
    assert_matches!(result, Err(maestro::MaestroError::Connection(_)));
}

use serde::Serialize;
use thiserror::Error;

/// Size of the micro-controller variable block preceding per-channel data:
/// stack pointer, call-stack pointer, error register, script counters, three
/// timers, the 32-slot data stack, the 10-slot call stack, and two script
/// flags. The block is skipped, not interpreted.
pub const VARIABLE_BLOCK_LEN: usize = 1 + 1 + 2 + 2 + (2 * 3) + (2 * 32) + (2 * 10) + 1 + 1;

/// Size of one per-channel record: position, target, speed (u16 each) plus
/// acceleration (u8).
pub const CHANNEL_RECORD_LEN: usize = 2 + 2 + 2 + 1;

/// Errors returned while decoding a status poll.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum StatusError {
    /// The payload does not cover the variable block plus every channel record.
    #[error(
        "status payload too short: {ports} channels need {expected} bytes, got {actual}"
    )]
    PayloadTooShort {
        ports: u8,
        expected: usize,
        actual: usize,
    },
}

/// Runtime state of one channel, decoded from a status poll.
///
/// Values are produced fresh on every poll and never cached.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct ChannelStatus {
    position: u16,
    target: u16,
    speed: u16,
    acceleration: u8,
}

impl ChannelStatus {
    /// Creates a status record from its decoded fields.
    #[must_use]
    pub fn new(position: u16, target: u16, speed: u16, acceleration: u8) -> Self {
        Self {
            position,
            target,
            speed,
            acceleration,
        }
    }

    /// Returns the current pulse width in qus.
    #[must_use]
    pub fn position(self) -> u16 {
        self.position
    }

    /// Returns the commanded target pulse width in qus.
    #[must_use]
    pub fn target(self) -> u16 {
        self.target
    }

    /// Returns the current speed in qus per update.
    #[must_use]
    pub fn speed(self) -> u16 {
        self.speed
    }

    /// Returns the current acceleration limit.
    #[must_use]
    pub fn acceleration(self) -> u8 {
        self.acceleration
    }
}

/// Returns the payload length a status poll must request for `ports` channels.
#[must_use]
pub fn status_payload_len(ports: u8) -> usize {
    VARIABLE_BLOCK_LEN + usize::from(ports) * CHANNEL_RECORD_LEN
}

/// Decodes a status poll payload into one record per channel, index-aligned.
///
/// The fixed variable block is skipped, then `ports` seven-byte records are
/// read in channel order. Multi-byte fields use the device's little-endian
/// wire encoding.
///
/// # Errors
///
/// Returns an error when the payload is shorter than the computed length.
pub fn decode_status(ports: u8, payload: &[u8]) -> Result<Vec<ChannelStatus>, StatusError> {
    let expected = status_payload_len(ports);
    if payload.len() < expected {
        return Err(StatusError::PayloadTooShort {
            ports,
            expected,
            actual: payload.len(),
        });
    }

    let mut channels = Vec::with_capacity(usize::from(ports));
    for channel in 0..usize::from(ports) {
        let record = &payload[VARIABLE_BLOCK_LEN + channel * CHANNEL_RECORD_LEN..];
        channels.push(ChannelStatus {
            position: u16::from_le_bytes([record[0], record[1]]),
            target: u16::from_le_bytes([record[2], record[3]]),
            speed: u16::from_le_bytes([record[4], record[5]]),
            acceleration: record[6],
        });
    }

    Ok(channels)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    fn payload_with_records(records: &[ChannelStatus]) -> Vec<u8> {
        let mut payload = vec![0u8; VARIABLE_BLOCK_LEN];
        for record in records {
            payload.extend_from_slice(&record.position().to_le_bytes());
            payload.extend_from_slice(&record.target().to_le_bytes());
            payload.extend_from_slice(&record.speed().to_le_bytes());
            payload.push(record.acceleration());
        }
        payload
    }

    #[test]
    fn variable_block_is_ninety_bytes() {
        assert_eq!(90, VARIABLE_BLOCK_LEN);
        assert_eq!(90 + 6 * 7, status_payload_len(6));
    }

    #[test]
    fn records_round_trip_in_channel_order() {
        let records = vec![
            ChannelStatus::new(6000, 6004, 10, 2),
            ChannelStatus::new(3968, 3968, 0, 0),
            ChannelStatus::new(0xFFFF, 0x1234, 0x00FF, 0xFF),
        ];
        let payload = payload_with_records(&records);

        let decoded = decode_status(3, &payload).expect("well-formed payload should decode");
        assert_eq!(records, decoded);
    }

    #[test]
    fn zeroed_payload_decodes_to_zeroed_records() {
        let payload = vec![0u8; status_payload_len(6)];
        let decoded = decode_status(6, &payload).expect("zeroed payload should decode");

        assert_eq!(6, decoded.len());
        assert!(decoded.iter().all(|record| *record == ChannelStatus::new(0, 0, 0, 0)));
    }

    #[test]
    fn short_payloads_are_rejected() {
        let payload = vec![0u8; status_payload_len(6) - 1];
        let result = decode_status(6, &payload);

        assert_matches!(
            result,
            Err(StatusError::PayloadTooShort {
                ports: 6,
                expected,
                actual,
            }) if expected == status_payload_len(6) && actual == expected - 1
        );
    }

    #[test]
    fn status_serialises_for_reporting() {
        let record = ChannelStatus::new(6000, 6000, 0, 0);
        let json = serde_json::to_value(record).expect("status should serialise");
        assert_eq!(
            serde_json::json!({
                "position": 6000,
                "target": 6000,
                "speed": 0,
                "acceleration": 0
            }),
            json
        );
    }
}

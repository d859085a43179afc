use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::transport::{Transport, TransportError};
use crate::protocol::RequestId;
use crate::utils::format_hex;

/// Fixed per-transfer timeout. There is no retry and no cancellation; a
/// timed-out call returns once the transport's own timeout elapses.
pub const REQUEST_TIMEOUT_MS: u32 = 5000;

/// Length of the firmware version payload.
const FIRMWARE_PAYLOAD_LEN: usize = 14;
/// Offset of the packed-decimal minor version byte.
const FIRMWARE_MINOR_OFFSET: usize = 13;
/// Offset of the packed-decimal major version byte.
const FIRMWARE_MAJOR_OFFSET: usize = 12;
/// `wValue` selecting the version block of the firmware descriptor.
const FIRMWARE_DESCRIPTOR_VALUE: u16 = 0x0100;

/// Errors returned by request/response exchanges over a transport.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ConnectionError {
    /// The transport itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The transfer moved a different byte count than the protocol expects.
    #[error("control transfer moved {actual} bytes, expected {expected}")]
    TransferLength { expected: usize, actual: usize },
}

/// Firmware revision decoded from the device's version descriptor.
#[derive(Debug, Clone, Copy, Eq, PartialEq, derive_more::Display, Serialize)]
#[display("{major}.{minor}")]
pub struct FirmwareVersion {
    major: u8,
    minor: u8,
}

impl FirmwareVersion {
    /// Returns the major revision.
    #[must_use]
    pub fn major(self) -> u8 {
        self.major
    }

    /// Returns the minor revision.
    #[must_use]
    pub fn minor(self) -> u8 {
        self.minor
    }
}

/// Decodes one packed-decimal byte: low nibble is ones, high nibble is tens.
const fn packed_decimal(byte: u8) -> u8 {
    (byte & 0xF) + 10 * ((byte >> 4) & 0xF)
}

/// A request/response session over one transport handle.
///
/// Every operation is a single blocking control transfer; transfers that
/// move an unexpected byte count fail hard rather than returning partial
/// data.
#[derive(Debug)]
pub struct DeviceConnection<T: Transport> {
    transport: T,
    timeout_ms: u32,
}

impl<T: Transport> DeviceConnection<T> {
    /// Wraps a transport with the fixed request timeout.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout_ms: REQUEST_TIMEOUT_MS,
        }
    }

    /// Returns the device serial string.
    #[must_use]
    pub fn serial_number(&self) -> String {
        self.transport.serial()
    }

    /// Issues a zero-payload write request.
    ///
    /// # Errors
    ///
    /// Fails on transport errors or if the device unexpectedly returns data.
    pub fn send(&mut self, request: RequestId, value: u16, index: u16) -> Result<(), ConnectionError> {
        debug!(request = %request, value, index, "sending control request");
        let transferred = self.transport.control_transfer(
            request.class().code(),
            request.code(),
            value,
            index,
            None,
            self.timeout_ms,
        )?;
        if transferred != 0 {
            return Err(ConnectionError::TransferLength {
                expected: 0,
                actual: transferred,
            });
        }

        Ok(())
    }

    /// Issues a read request and returns exactly `length` payload bytes.
    ///
    /// # Errors
    ///
    /// Fails on transport errors or when the device returns a different byte
    /// count (short and long reads are both protocol violations).
    pub fn request(
        &mut self,
        request: RequestId,
        value: u16,
        index: u16,
        length: usize,
    ) -> Result<Vec<u8>, ConnectionError> {
        let mut buffer = self.transport.allocate_buffer(length);
        let transferred = self.transport.control_transfer(
            request.class().code(),
            request.code(),
            value,
            index,
            Some(&mut buffer),
            self.timeout_ms,
        )?;
        if transferred != length {
            return Err(ConnectionError::TransferLength {
                expected: length,
                actual: transferred,
            });
        }

        debug!(request = %request, payload = %format_hex(&buffer), "received payload");
        Ok(buffer)
    }

    /// Reads and decodes the firmware version descriptor.
    ///
    /// The two revision bytes at fixed offsets are packed decimal, not
    /// binary.
    ///
    /// # Errors
    ///
    /// Fails on transport errors or a mis-sized descriptor payload.
    pub fn firmware_version(&mut self) -> Result<FirmwareVersion, ConnectionError> {
        let payload = self.request(
            RequestId::GetFirmwareVersion,
            FIRMWARE_DESCRIPTOR_VALUE,
            0x0000,
            FIRMWARE_PAYLOAD_LEN,
        )?;

        Ok(FirmwareVersion {
            major: packed_decimal(payload[FIRMWARE_MAJOR_OFFSET]),
            minor: packed_decimal(payload[FIRMWARE_MINOR_OFFSET]),
        })
    }

    /// Releases the underlying transport.
    pub fn close(&mut self) {
        self.transport.close();
    }
}

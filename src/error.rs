use thiserror::Error;

use crate::encoder::EncodeError;
use crate::hw::{ConnectionError, TransportError};
use crate::status::StatusError;

/// Top-level errors for controller sessions, wrapping module-specific types.
///
/// Every failure is reported synchronously to the caller of the operation
/// that triggered it; nothing is retried automatically.
#[derive(Debug, Error)]
pub enum MaestroError {
    /// No transport device matched the requested vendor/product id pair.
    #[error("no device matching {vendor_id:#06x}:{product_id:#06x} was found")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },
    /// A bound transport's ids match no known hardware variant.
    #[error("device {vendor_id:#06x}:{product_id:#06x} is not a recognised controller variant")]
    UnrecognizedDevice { vendor_id: u16, product_id: u16 },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Status(#[from] StatusError),
}

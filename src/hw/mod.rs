mod connection;
mod fake;
mod transport;

pub use self::connection::{ConnectionError, DeviceConnection, FirmwareVersion, REQUEST_TIMEOUT_MS};
pub use self::fake::{FakeTransport, FakeTransportConfig, RecordedTransfer, TransferJournal};
pub use self::transport::{Transport, TransportError};

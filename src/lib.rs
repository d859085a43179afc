mod channel;
mod controller;
mod encoder;
mod error;
mod hw;
mod parameter;
mod product;
mod protocol;
mod settings;
mod status;
mod utils;

pub use channel::{ChannelConfig, ChannelMode, HomeMode, exponential_speed};
pub use controller::ServoController;
pub use encoder::{
    CommandRequest, EncodeError, ParameterWrite, acceleration_command, bps_to_wire_rate,
    clear_errors_command, settings_writes, speed_command, target_command,
};
pub use error::MaestroError;
pub use hw::{
    ConnectionError, DeviceConnection, FakeTransport, FakeTransportConfig, FirmwareVersion,
    REQUEST_TIMEOUT_MS, RecordedTransfer, TransferJournal, Transport, TransportError,
};
pub use parameter::Parameter;
pub use product::{DeviceVariant, POLOLU_VENDOR_ID};
pub use protocol::{RequestClass, RequestId};
pub use settings::{SerialMode, Settings};
pub use status::{
    CHANNEL_RECORD_LEN, ChannelStatus, StatusError, VARIABLE_BLOCK_LEN, decode_status,
    status_payload_len,
};

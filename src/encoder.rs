use thiserror::Error;

use crate::channel::{ChannelConfig, ChannelMode};
use crate::parameter::Parameter;
use crate::product::DeviceVariant;
use crate::protocol::RequestId;
use crate::settings::Settings;

/// Device instruction clock in hertz, used to derive the baud-rate divisor.
const INSTRUCTION_FREQUENCY: f64 = 12_000_000.0;

/// Errors returned while encoding a settings push.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum EncodeError {
    /// The settings layout for this family is incomplete upstream.
    #[error(
        "settings encoding for {variant} is not implemented; only the 6-channel layout is supported"
    )]
    UnsupportedVariant { variant: DeviceVariant },
    /// The channel cannot be represented in the 6-channel mode masks.
    #[error("channel {channel} does not fit the 6-channel mode masks (valid channels are 0..=5)")]
    ChannelOutOfRange { channel: u8 },
}

/// One parameter write in a settings push: a `SET_PARAMETER` transfer with
/// `wValue` carrying the value and `wIndex` packing `(width << 8) | code`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ParameterWrite {
    index: u16,
    value: u16,
}

impl ParameterWrite {
    fn global(parameter: Parameter, value: i32) -> Self {
        Self {
            index: parameter.wire_index(),
            value: value as u16,
        }
    }

    fn channel(parameter: Parameter, channel: u8, value: i32) -> Self {
        Self {
            index: parameter.channel_wire_index(channel),
            value: value as u16,
        }
    }

    /// Returns the packed `wIndex` word.
    #[must_use]
    pub fn index(self) -> u16 {
        self.index
    }

    /// Returns the `wValue` word.
    #[must_use]
    pub fn value(self) -> u16 {
        self.value
    }
}

/// A runtime motion command ready to send as a zero-payload control transfer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CommandRequest {
    request: RequestId,
    value: u16,
    index: u16,
}

impl CommandRequest {
    /// Returns the vendor request to issue.
    #[must_use]
    pub fn request(self) -> RequestId {
        self.request
    }

    /// Returns the `wValue` word.
    #[must_use]
    pub fn value(self) -> u16 {
        self.value
    }

    /// Returns the `wIndex` word.
    #[must_use]
    pub fn index(self) -> u16 {
        self.index
    }
}

/// Converts a baud rate in bits per second to the device's divisor register.
///
/// ```
/// use maestro::bps_to_wire_rate;
///
/// assert_eq!(0, bps_to_wire_rate(0));
/// assert_eq!(1249, bps_to_wire_rate(9600));
/// ```
#[must_use]
pub fn bps_to_wire_rate(bps: u32) -> u16 {
    if bps == 0 {
        return 0;
    }

    ((INSTRUCTION_FREQUENCY - f64::from(bps) / 2.0) / f64::from(bps)) as u16
}

/// I/O and output bit masks accumulated over the 6-channel family's ports.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
struct ModeMasks {
    io: u8,
    output: u8,
}

impl ModeMasks {
    /// Folds one channel's mode into the masks.
    ///
    /// Outputs appear in both masks; inputs only in the I/O mask; servo
    /// channels in neither.
    fn with_channel(self, channel: u8, mode: ChannelMode) -> Result<Self, EncodeError> {
        match mode {
            ChannelMode::Output => {
                let bit = mask_bit(channel)?;
                Ok(Self {
                    io: self.io | bit,
                    output: self.output | bit,
                })
            }
            ChannelMode::Input => {
                let bit = mask_bit(channel)?;
                Ok(Self {
                    io: self.io | bit,
                    output: self.output,
                })
            }
            ChannelMode::Servo | ChannelMode::ServoMultiplied => Ok(self),
        }
    }
}

/// Maps a 6-channel family channel index to its mask bit.
///
/// Channels 4 and 5 sit at bit positions 6 and 7 on this hardware.
fn mask_bit(channel: u8) -> Result<u8, EncodeError> {
    let position = match channel {
        0..=3 => channel,
        4..=5 => channel + 2,
        _ => return Err(EncodeError::ChannelOutOfRange { channel }),
    };

    Ok(1 << position)
}

/// Encodes a full settings push as an ordered sequence of parameter writes.
///
/// The device applies parameters incrementally, so the order is part of the
/// contract: global serial parameters first, then the family period block,
/// then seven writes per channel, then the mode masks.
///
/// Only the 6-channel family is encoded; the Mini families use period,
/// multiplier, and channel-mode-byte parameters whose layout is incomplete
/// upstream, and fail fast here rather than misconfigure hardware.
pub fn settings_writes(
    variant: DeviceVariant,
    settings: &Settings,
) -> Result<Vec<ParameterWrite>, EncodeError> {
    if !variant.supports_full_configuration() {
        return Err(EncodeError::UnsupportedVariant { variant });
    }

    let mut writes = vec![
        ParameterWrite::global(Parameter::SerialMode, i32::from(settings.serial_mode().code())),
        ParameterWrite::global(
            Parameter::SerialFixedBaudRate,
            i32::from(bps_to_wire_rate(settings.baud_rate())),
        ),
        ParameterWrite::global(Parameter::SerialEnableCrc, i32::from(settings.enable_crc())),
        ParameterWrite::global(
            Parameter::SerialNeverSuspend,
            i32::from(settings.never_suspend()),
        ),
        ParameterWrite::global(
            Parameter::SerialDeviceNumber,
            i32::from(settings.device_number()),
        ),
        ParameterWrite::global(
            Parameter::SerialMiniSscOffset,
            i32::from(settings.mini_ssc_offset()),
        ),
        ParameterWrite::global(Parameter::SerialTimeout, i32::from(settings.timeout())),
        ParameterWrite::global(Parameter::ScriptDone, i32::from(settings.script_done())),
        ParameterWrite::global(
            Parameter::ServosAvailable,
            i32::from(settings.servos_available()),
        ),
        ParameterWrite::global(Parameter::ServoPeriod, i32::from(settings.servo_period())),
    ];

    let mut masks = ModeMasks::default();
    for channel in 0..variant.ports() {
        let config = settings.channel(channel);
        masks = masks.with_channel(channel, config.mode())?;
        writes.extend_from_slice(&channel_writes(channel, &config));
    }

    writes.push(ParameterWrite::global(
        Parameter::IoMaskC,
        i32::from(masks.io),
    ));
    writes.push(ParameterWrite::global(
        Parameter::OutputMaskC,
        i32::from(masks.output),
    ));

    Ok(writes)
}

/// Builds the seven-per-channel write group in its fixed order.
fn channel_writes(channel: u8, config: &ChannelConfig) -> [ParameterWrite; 7] {
    [
        ParameterWrite::channel(Parameter::ServoHome, channel, config.effective_home()),
        ParameterWrite::channel(Parameter::ServoMin, channel, config.scaled_minimum()),
        ParameterWrite::channel(Parameter::ServoMax, channel, config.scaled_maximum()),
        ParameterWrite::channel(Parameter::ServoNeutral, channel, config.neutral()),
        ParameterWrite::channel(Parameter::ServoRange, channel, config.scaled_range()),
        ParameterWrite::channel(
            Parameter::ServoSpeed,
            channel,
            i32::from(config.exponential_speed()),
        ),
        ParameterWrite::channel(Parameter::ServoAcceleration, channel, config.acceleration()),
    ]
}

/// Builds a clamped set-target command.
///
/// The pulse width is clamped into the channel's configured
/// `[minimum, maximum]` before encoding, so a runaway caller cannot push a
/// servo past its mechanical limits.
#[must_use]
pub fn target_command(config: &ChannelConfig, channel: u8, quarter_us: i32) -> CommandRequest {
    let clamped = quarter_us.max(config.minimum()).min(config.maximum());

    CommandRequest {
        request: RequestId::SetTarget,
        value: clamped as u16,
        index: u16::from(channel),
    }
}

/// Builds a set-speed command.
#[must_use]
pub fn speed_command(channel: u8, value: u16) -> CommandRequest {
    CommandRequest {
        request: RequestId::SetVariable,
        value,
        index: u16::from(channel),
    }
}

/// Builds a set-acceleration command.
///
/// Speed and acceleration share the `SET_VARIABLE` opcode; the firmware
/// distinguishes acceleration purely by the high bit of the index byte.
#[must_use]
pub fn acceleration_command(channel: u8, value: u16) -> CommandRequest {
    CommandRequest {
        request: RequestId::SetVariable,
        value,
        index: u16::from(channel) | 0x80,
    }
}

/// Builds a clear-errors command.
#[must_use]
pub fn clear_errors_command() -> CommandRequest {
    CommandRequest {
        request: RequestId::ClearErrors,
        value: 0,
        index: 0,
    }
}

use strum_macros::Display;

/// Stride between consecutive channels in the per-channel parameter space.
const CHANNEL_STRIDE: u8 = 9;

/// Named configuration parameters stored on the device.
///
/// Each parameter occupies a fixed-size slot addressed by its wire code. The
/// per-channel servo parameters repeat every [`CHANNEL_STRIDE`] codes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display)]
pub enum Parameter {
    /// 0 until first configuration, 0xFF afterwards.
    #[strum(to_string = "initialized")]
    Initialized,
    /// Number of channels driven as servos (Micro family).
    #[strum(to_string = "servos_available")]
    ServosAvailable,
    /// Time allotted to each servo slot, in ticks / 256 (Micro family).
    #[strum(to_string = "servo_period")]
    ServoPeriod,
    /// Serial routing mode, one of the four `SerialMode` codes.
    #[strum(to_string = "serial_mode")]
    SerialMode,
    /// Fixed baud rate in wire units; 0 means autodetect.
    #[strum(to_string = "serial_fixed_baud_rate")]
    SerialFixedBaudRate,
    /// Serial timeout in units of 10 ms; 0 disables the timeout error.
    #[strum(to_string = "serial_timeout")]
    SerialTimeout,
    /// Whether serial commands must carry a 7-bit CRC byte.
    #[strum(to_string = "serial_enable_crc")]
    SerialEnableCrc,
    /// Whether the device refuses USB suspend.
    #[strum(to_string = "serial_never_suspend")]
    SerialNeverSuspend,
    /// Pololu-protocol device number, 0-127.
    #[strum(to_string = "serial_device_number")]
    SerialDeviceNumber,
    /// Baud-rate detection type.
    #[strum(to_string = "serial_baud_detect_type")]
    SerialBaudDetectType,
    /// Channel-number offset for Mini SSC commands, 0-254.
    #[strum(to_string = "serial_mini_ssc_offset")]
    SerialMiniSscOffset,
    /// Mini-family servo period, low byte (quarter-microsecond units).
    #[strum(to_string = "mini_servo_period_l")]
    MiniServoPeriodL,
    /// Mini-family servo period, high/upper bytes.
    #[strum(to_string = "mini_servo_period_hu")]
    MiniServoPeriodHu,
    /// Input pull-up enable (Mini 18/24 only).
    #[strum(to_string = "enable_pullups")]
    EnablePullups,
    /// Bit mask of ports used for digital I/O instead of servo output.
    #[strum(to_string = "io_mask_c")]
    IoMaskC,
    /// Bit mask of I/O ports driven as outputs.
    #[strum(to_string = "output_mask_c")]
    OutputMaskC,
    /// Copied to the script-done flag at startup.
    #[strum(to_string = "script_done")]
    ScriptDone,
    /// Per-channel startup position (0 = off, 1 = ignore).
    #[strum(to_string = "servo_home")]
    ServoHome,
    /// Per-channel minimum pulse width, wire units of 16 us.
    #[strum(to_string = "servo_min")]
    ServoMin,
    /// Per-channel maximum pulse width, wire units of 16 us.
    #[strum(to_string = "servo_max")]
    ServoMax,
    /// Per-channel neutral position for 8-bit commands.
    #[strum(to_string = "servo_neutral")]
    ServoNeutral,
    /// Per-channel 8-bit command range, wire units of 31.75 us.
    #[strum(to_string = "servo_range")]
    ServoRange,
    /// Per-channel speed limit in the 5-bit-mantissa/3-bit-exponent format.
    #[strum(to_string = "servo_speed")]
    ServoSpeed,
    /// Per-channel acceleration limit.
    #[strum(to_string = "servo_acceleration")]
    ServoAcceleration,
}

impl Parameter {
    /// Returns the wire code addressing this parameter's slot.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Initialized => 0,
            Self::ServosAvailable => 1,
            Self::ServoPeriod => 2,
            Self::SerialMode => 3,
            Self::SerialFixedBaudRate => 4,
            Self::SerialTimeout => 6,
            Self::SerialEnableCrc => 8,
            Self::SerialNeverSuspend => 9,
            Self::SerialDeviceNumber => 10,
            Self::SerialBaudDetectType => 11,
            Self::IoMaskC => 16,
            Self::OutputMaskC => 17,
            Self::MiniServoPeriodL => 18,
            Self::MiniServoPeriodHu => 19,
            Self::EnablePullups => 21,
            Self::ScriptDone => 24,
            Self::SerialMiniSscOffset => 25,
            Self::ServoHome => 30,
            Self::ServoMin => 32,
            Self::ServoMax => 33,
            Self::ServoNeutral => 34,
            Self::ServoRange => 36,
            Self::ServoSpeed => 37,
            Self::ServoAcceleration => 38,
        }
    }

    /// Returns the slot width in bytes.
    #[must_use]
    pub const fn width(self) -> u8 {
        match self {
            Self::SerialFixedBaudRate
            | Self::SerialTimeout
            | Self::ServoHome
            | Self::ServoNeutral => 2,
            Self::MiniServoPeriodL | Self::MiniServoPeriodHu => 3,
            _ => 1,
        }
    }

    /// Returns the documented inclusive value range.
    ///
    /// The range is declared for reference only; values are not masked or
    /// clamped against it before encoding, matching device-side behaviour.
    #[must_use]
    pub const fn valid_range(self) -> (i32, i32) {
        match self {
            Self::SerialMode => (0, 3),
            Self::SerialEnableCrc
            | Self::SerialNeverSuspend
            | Self::SerialBaudDetectType
            | Self::EnablePullups
            | Self::ScriptDone => (0, 1),
            Self::SerialDeviceNumber => (0, 127),
            Self::SerialMiniSscOffset => (0, 254),
            Self::SerialFixedBaudRate | Self::SerialTimeout => (0, 0xFFFF),
            Self::MiniServoPeriodL | Self::MiniServoPeriodHu => (0, 0xFF_FFFF),
            Self::ServoHome | Self::ServoNeutral => (0, 32440),
            Self::ServoRange => (1, 50),
            Self::Initialized
            | Self::ServosAvailable
            | Self::ServoPeriod
            | Self::IoMaskC
            | Self::OutputMaskC
            | Self::ServoMin
            | Self::ServoMax
            | Self::ServoSpeed
            | Self::ServoAcceleration => (0, 0xFF),
        }
    }

    /// Returns the wire code addressing this parameter on a specific channel.
    #[must_use]
    pub const fn channel_code(self, channel: u8) -> u8 {
        self.code() + channel * CHANNEL_STRIDE
    }

    /// Returns the `wIndex` word for a parameter write: `(width << 8) | code`.
    ///
    /// The width/code packing is defined by the firmware, not an artefact of
    /// this implementation.
    ///
    /// ```
    /// use maestro::Parameter;
    ///
    /// assert_eq!(0x0204, Parameter::SerialFixedBaudRate.wire_index());
    /// assert_eq!(0x0103, Parameter::SerialMode.wire_index());
    /// ```
    #[must_use]
    pub const fn wire_index(self) -> u16 {
        ((self.width() as u16) << 8) | self.code() as u16
    }

    /// Returns the `wIndex` word for a per-channel parameter write.
    #[must_use]
    pub const fn channel_wire_index(self, channel: u8) -> u16 {
        ((self.width() as u16) << 8) | self.channel_code(channel) as u16
    }
}

use bon::Builder;
use strum_macros::Display;

/// Wire unit for stored minimum/maximum limits: 16 us = 64 quarter-microseconds.
const LIMIT_WIRE_UNIT_QUS: i32 = 64;
/// Wire unit for the stored 8-bit command range: 31.75 us = 127 quarter-microseconds.
const RANGE_WIRE_UNIT_QUS: i32 = 127;
/// Largest mantissa representable by the exponential speed format.
const SPEED_MANTISSA_LIMIT: i32 = 32;
/// Largest exponent representable by the exponential speed format.
const SPEED_EXPONENT_LIMIT: u8 = 7;

/// How a channel's pin is driven.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display)]
pub enum ChannelMode {
    /// Standard servo pulse output.
    #[strum(to_string = "servo")]
    Servo,
    /// Servo output with the pulse-width multiplier applied (Mini families).
    #[strum(to_string = "servo_multiplied")]
    ServoMultiplied,
    /// Digital output.
    #[strum(to_string = "output")]
    Output,
    /// Digital input.
    #[strum(to_string = "input")]
    Input,
}

impl ChannelMode {
    /// Returns the two-bit mode code used by the Mini channel-mode bytes.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Servo => 0,
            Self::ServoMultiplied => 1,
            Self::Output => 2,
            Self::Input => 3,
        }
    }
}

/// What a channel does on device startup.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display)]
pub enum HomeMode {
    /// No pulses until the first command (stored home value 0).
    #[strum(to_string = "off")]
    Off,
    /// Keep whatever position the device was in (stored home value 1).
    #[strum(to_string = "ignore")]
    Ignore,
    /// Move to the configured home position.
    #[strum(to_string = "goto")]
    Goto,
}

/// Configuration for a single servo/IO channel.
///
/// Pulse-width fields are in quarter-microseconds (qus); 4 qus = 1 us. The
/// value is immutable once built; a new configuration replaces the old one
/// wholesale.
///
/// ```
/// use maestro::{ChannelConfig, ChannelMode};
///
/// let config = ChannelConfig::builder()
///     .mode(ChannelMode::Servo)
///     .minimum(4000)
///     .maximum(8000)
///     .build();
/// assert_eq!(4000, config.minimum());
/// assert_eq!(8000, config.maximum());
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq, Builder)]
pub struct ChannelConfig {
    /// Pin mode.
    #[builder(default = ChannelMode::Servo)]
    mode: ChannelMode,
    /// Startup behaviour.
    #[builder(default = HomeMode::Off)]
    home_mode: HomeMode,
    /// Startup position in qus, used only when `home_mode` is `Goto`.
    #[builder(default = 6000)]
    home: i32,
    /// Minimum pulse width in qus.
    #[builder(default = 3968)]
    minimum: i32,
    /// Maximum pulse width in qus.
    #[builder(default = 8000)]
    maximum: i32,
    /// Centre of the 8-bit command scale, in qus.
    #[builder(default = 6000)]
    neutral: i32,
    /// Half-extent of the 8-bit command scale, in qus.
    #[builder(default = 1905)]
    range: i32,
    /// Speed limit in qus per update; 0 means unlimited.
    #[builder(default = 0)]
    speed: i32,
    /// Acceleration limit; 0 means unlimited.
    #[builder(default = 0)]
    acceleration: i32,
}

impl ChannelConfig {
    /// Returns the pin mode.
    #[must_use]
    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    /// Returns the startup behaviour in effect.
    ///
    /// Inputs cannot be homed, so the stored mode is overridden to `Ignore`
    /// whenever the channel is an input.
    #[must_use]
    pub fn effective_home_mode(&self) -> HomeMode {
        if self.mode == ChannelMode::Input {
            return HomeMode::Ignore;
        }

        self.home_mode
    }

    /// Returns the home value written to the device.
    ///
    /// The wire encoding reserves 0 for "off" and 1 for "ignore"; only a
    /// `Goto` channel stores a real position.
    #[must_use]
    pub fn effective_home(&self) -> i32 {
        match self.effective_home_mode() {
            HomeMode::Off => 0,
            HomeMode::Ignore => 1,
            HomeMode::Goto => self.home,
        }
    }

    /// Returns the minimum pulse width in qus.
    #[must_use]
    pub fn minimum(&self) -> i32 {
        self.minimum
    }

    /// Returns the maximum pulse width in qus.
    #[must_use]
    pub fn maximum(&self) -> i32 {
        self.maximum
    }

    /// Returns the neutral position in qus.
    #[must_use]
    pub fn neutral(&self) -> i32 {
        self.neutral
    }

    /// Returns the acceleration limit.
    #[must_use]
    pub fn acceleration(&self) -> i32 {
        self.acceleration
    }

    /// Returns the minimum limit in its 16 us wire unit (truncating).
    #[must_use]
    pub fn scaled_minimum(&self) -> i32 {
        self.minimum / LIMIT_WIRE_UNIT_QUS
    }

    /// Returns the maximum limit in its 16 us wire unit (truncating).
    #[must_use]
    pub fn scaled_maximum(&self) -> i32 {
        self.maximum / LIMIT_WIRE_UNIT_QUS
    }

    /// Returns the command range in its 31.75 us wire unit (truncating).
    #[must_use]
    pub fn scaled_range(&self) -> i32 {
        self.range / RANGE_WIRE_UNIT_QUS
    }

    /// Returns the speed limit in the device's exponential byte format.
    #[must_use]
    pub fn exponential_speed(&self) -> u8 {
        exponential_speed(self.speed)
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Compresses a speed limit into the 5-bit-mantissa/3-bit-exponent byte.
///
/// The conversion halves the mantissa until it fits in 5 bits, counting
/// halvings in the exponent. Values that would need an exponent above 7
/// saturate to `0xFF`, which the device treats as unlimited. The encoding is
/// lossy but monotonic over its representable range.
///
/// ```
/// use maestro::exponential_speed;
///
/// assert_eq!(0x00, exponential_speed(0));
/// assert_eq!(31 << 3, exponential_speed(31));
/// assert_eq!(0xCA, exponential_speed(100)); // 25 << 3 | exponent 2
/// assert_eq!(0xFF, exponential_speed(4096));
/// ```
#[must_use]
pub fn exponential_speed(mantissa: i32) -> u8 {
    let mut mantissa = mantissa;
    let mut exponent: u8 = 0;

    loop {
        if mantissa < SPEED_MANTISSA_LIMIT {
            return (exponent & 0x7) | ((mantissa as u8) << 3);
        }

        if exponent == SPEED_EXPONENT_LIMIT {
            // Too big to express; the device reads 0xFF as no limit.
            return 0xFF;
        }

        exponent += 1;
        mantissa >>= 1;
    }
}

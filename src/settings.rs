use std::collections::BTreeMap;

use bon::Builder;
use strum_macros::Display;

use crate::channel::ChannelConfig;

/// Servo-period ticks per unit: the device stores the period in units of
/// 256/12 us, which is not a multiple of a quarter-microsecond.
const PERIOD_UNIT_NUMERATOR: f64 = 256.0;
const PERIOD_UNIT_DENOMINATOR: f64 = 12.0;

/// How serial bytes flow between the USB COM ports, the TTL port, and the
/// device's serial command processor.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display)]
pub enum SerialMode {
    /// Commands on the USB command port; the TTL port acts as a
    /// USB-to-serial adapter.
    #[strum(to_string = "usb_dual_port")]
    UsbDualPort,
    /// Commands on the USB command port, chained onto the UART TX/RX lines.
    #[strum(to_string = "usb_chained")]
    UsbChained,
    /// Commands on the UART after baud-rate detection via a leading 0xAA byte.
    #[strum(to_string = "uart_detect_baud_rate")]
    UartDetectBaudRate,
    /// Commands on the UART at the configured fixed baud rate.
    #[strum(to_string = "uart_fixed_baud_rate")]
    UartFixedBaudRate,
}

impl SerialMode {
    /// Returns the wire code for the serial-mode parameter.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::UsbDualPort => 0,
            Self::UsbChained => 1,
            Self::UartDetectBaudRate => 2,
            Self::UartFixedBaudRate => 3,
        }
    }
}

/// Full controller configuration: global serial behaviour plus per-channel
/// settings.
///
/// A `Settings` value is immutable once built; updating a session means
/// building a new value and handing it to the settings encoder wholesale.
/// Channels without an explicit entry resolve to [`ChannelConfig::default`].
///
/// ```
/// use maestro::{ChannelConfig, ChannelMode, Settings};
///
/// let settings = Settings::builder()
///     .device_number(3)
///     .build()
///     .with_channel(0, ChannelConfig::builder().mode(ChannelMode::Input).build());
/// assert_eq!(3, settings.device_number());
/// assert_eq!(ChannelMode::Input, settings.channel(0).mode());
/// assert_eq!(ChannelMode::Servo, settings.channel(1).mode());
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Builder)]
pub struct Settings {
    /// Number of channels driven as servos; with `servo_period` this sets the
    /// maximum pulse width.
    #[builder(default = 6)]
    servos_available: u8,
    /// Time allotted to each servo slot in 256/12 us units. The default of
    /// 156 gives ~20 ms between pulses with six servos (50 Hz).
    #[builder(default = 156)]
    servo_period: u8,
    /// Serial routing mode.
    #[builder(default = SerialMode::UsbDualPort)]
    serial_mode: SerialMode,
    /// Fixed UART baud rate in bits per second; 0 means autodetect.
    #[builder(default = 9600)]
    baud_rate: u32,
    /// Whether serial commands must carry a 7-bit CRC byte.
    #[builder(default = false)]
    enable_crc: bool,
    /// Whether the device should refuse USB suspend.
    #[builder(default = false)]
    never_suspend: bool,
    /// Pololu-protocol device number, 0-127.
    #[builder(default = 12)]
    device_number: u8,
    /// Servo-number offset applied to Mini SSC commands, 0-254.
    #[builder(default = 0)]
    mini_ssc_offset: u8,
    /// Serial timeout in 10 ms units; 0 disables the timeout error.
    #[builder(default = 0)]
    timeout: u16,
    /// True if the on-device script should not start at power-up.
    #[builder(default = true)]
    script_done: bool,
    /// Input pull-up enable (Mini 18/24 families only).
    #[builder(default = false)]
    enable_pullups: bool,
    /// Explicit per-channel configuration, keyed by channel index.
    #[builder(default)]
    channels: BTreeMap<u8, ChannelConfig>,
}

impl Settings {
    /// Converts a pulse frequency in hertz to the stored servo-period value.
    #[must_use]
    pub fn frequency_to_period(hertz: f64, servos: u8) -> u8 {
        (hertz / (f64::from(servos) * (PERIOD_UNIT_NUMERATOR / PERIOD_UNIT_DENOMINATOR))) as u8
    }

    /// Converts a stored servo-period value back to a pulse frequency.
    #[must_use]
    pub fn period_to_frequency(period: u8, servos: u8) -> f64 {
        (PERIOD_UNIT_NUMERATOR / PERIOD_UNIT_DENOMINATOR) * f64::from(period) * f64::from(servos)
    }

    /// Returns a copy with one channel's configuration replaced.
    #[must_use]
    pub fn with_channel(mut self, channel: u8, config: ChannelConfig) -> Self {
        self.channels.insert(channel, config);
        self
    }

    /// Resolves a channel's configuration, falling back to the default.
    #[must_use]
    pub fn channel(&self, channel: u8) -> ChannelConfig {
        self.channels.get(&channel).copied().unwrap_or_default()
    }

    /// Returns the number of servo slots.
    #[must_use]
    pub fn servos_available(&self) -> u8 {
        self.servos_available
    }

    /// Returns the stored servo period.
    #[must_use]
    pub fn servo_period(&self) -> u8 {
        self.servo_period
    }

    /// Returns the serial routing mode.
    #[must_use]
    pub fn serial_mode(&self) -> SerialMode {
        self.serial_mode
    }

    /// Returns the fixed baud rate in bits per second.
    #[must_use]
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Returns whether serial CRC checking is enabled.
    #[must_use]
    pub fn enable_crc(&self) -> bool {
        self.enable_crc
    }

    /// Returns whether USB suspend is refused.
    #[must_use]
    pub fn never_suspend(&self) -> bool {
        self.never_suspend
    }

    /// Returns the Pololu-protocol device number.
    #[must_use]
    pub fn device_number(&self) -> u8 {
        self.device_number
    }

    /// Returns the Mini SSC servo-number offset.
    #[must_use]
    pub fn mini_ssc_offset(&self) -> u8 {
        self.mini_ssc_offset
    }

    /// Returns the serial timeout in 10 ms units.
    #[must_use]
    pub fn timeout(&self) -> u16 {
        self.timeout
    }

    /// Returns whether the script stays stopped at power-up.
    #[must_use]
    pub fn script_done(&self) -> bool {
        self.script_done
    }

    /// Returns whether input pull-ups are enabled.
    #[must_use]
    pub fn enable_pullups(&self) -> bool {
        self.enable_pullups
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::channel::ChannelMode;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(6, settings.servos_available());
        assert_eq!(156, settings.servo_period());
        assert_eq!(SerialMode::UsbDualPort, settings.serial_mode());
        assert_eq!(9600, settings.baud_rate());
        assert!(!settings.enable_crc());
        assert!(!settings.never_suspend());
        assert_eq!(12, settings.device_number());
        assert_eq!(0, settings.mini_ssc_offset());
        assert_eq!(0, settings.timeout());
        assert!(settings.script_done());
        assert!(!settings.enable_pullups());
    }

    #[test]
    fn unset_channels_resolve_to_the_default_config() {
        let custom = ChannelConfig::builder().mode(ChannelMode::Output).build();
        let settings = Settings::default().with_channel(2, custom);

        assert_eq!(custom, settings.channel(2));
        assert_eq!(ChannelConfig::default(), settings.channel(0));
        assert_eq!(ChannelConfig::default(), settings.channel(5));
    }

    #[rstest]
    #[case(SerialMode::UsbDualPort, 0)]
    #[case(SerialMode::UsbChained, 1)]
    #[case(SerialMode::UartDetectBaudRate, 2)]
    #[case(SerialMode::UartFixedBaudRate, 3)]
    fn serial_mode_codes_match_firmware(#[case] mode: SerialMode, #[case] code: u8) {
        assert_eq!(code, mode.code());
    }

    #[test]
    fn period_round_trips_through_frequency() {
        // 156 with 6 servos is the stock 50 Hz configuration.
        let frequency = Settings::period_to_frequency(156, 6);
        assert_eq!(156, Settings::frequency_to_period(frequency, 6));
    }
}

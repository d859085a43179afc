use strum_macros::{Display, EnumIter};

/// USB control-transfer request classes understood by Maestro firmware.
///
/// The class byte is the `bmRequestType` field of the transfer: `GET` reads
/// from the device, `SET` writes to it, and `BIDIRECTIONAL` requests carry a
/// response payload for a vendor request.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display)]
pub enum RequestClass {
    /// Device-to-host vendor request (`0x80`).
    #[strum(to_string = "get")]
    Get,
    /// Host-to-device vendor request (`0x40`).
    #[strum(to_string = "set")]
    Set,
    /// Vendor request with a device-to-host data stage (`0xC0`).
    #[strum(to_string = "bidirectional")]
    Bidirectional,
}

impl RequestClass {
    /// Returns the raw `bmRequestType` byte.
    ///
    /// ```
    /// use maestro::RequestClass;
    ///
    /// assert_eq!(0x80, RequestClass::Get.code());
    /// assert_eq!(0x40, RequestClass::Set.code());
    /// assert_eq!(0xC0, RequestClass::Bidirectional.code());
    /// ```
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Get => 0x80,
            Self::Set => 0x40,
            Self::Bidirectional => 0xC0,
        }
    }
}

/// Vendor requests in the Maestro native USB protocol.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, EnumIter, Display)]
pub enum RequestId {
    /// Reads the 14-byte firmware version block.
    #[strum(to_string = "get_firmware_version")]
    GetFirmwareVersion,
    /// Reads a single configuration parameter.
    #[strum(to_string = "get_parameter")]
    GetParameter,
    /// Writes a single configuration parameter.
    #[strum(to_string = "set_parameter")]
    SetParameter,
    /// Reads the runtime variable block including per-channel state.
    #[strum(to_string = "get_variables")]
    GetVariables,
    /// Writes a runtime variable (speed, or acceleration via the index high bit).
    #[strum(to_string = "set_variable")]
    SetVariable,
    /// Sets a channel target pulse width.
    #[strum(to_string = "set_target")]
    SetTarget,
    /// Clears the device error register.
    #[strum(to_string = "clear_errors")]
    ClearErrors,
    /// Reads the full settings block.
    #[strum(to_string = "get_settings")]
    GetSettings,
    /// Reads the script data stack.
    #[strum(to_string = "get_stack")]
    GetStack,
    /// Reads the script call stack.
    #[strum(to_string = "get_call_stack")]
    GetCallStack,
    /// Drives a channel with raw PWM.
    #[strum(to_string = "set_pwm")]
    SetPwm,
}

impl RequestId {
    /// Returns the vendor request opcode.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::GetFirmwareVersion => 0x06,
            Self::GetParameter => 0x81,
            Self::SetParameter => 0x82,
            Self::GetVariables => 0x83,
            Self::SetVariable => 0x84,
            Self::SetTarget => 0x85,
            Self::ClearErrors => 0x86,
            Self::GetSettings => 0x87,
            Self::GetStack => 0x88,
            Self::GetCallStack => 0x89,
            Self::SetPwm => 0x8A,
        }
    }

    /// Returns the control-transfer class this request uses.
    #[must_use]
    pub const fn class(self) -> RequestClass {
        match self {
            Self::GetFirmwareVersion => RequestClass::Get,
            Self::GetParameter
            | Self::GetVariables
            | Self::GetSettings
            | Self::GetStack
            | Self::GetCallStack => RequestClass::Bidirectional,
            Self::SetParameter
            | Self::SetVariable
            | Self::SetTarget
            | Self::ClearErrors
            | Self::SetPwm => RequestClass::Set,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case(RequestId::GetFirmwareVersion, 0x06, RequestClass::Get)]
    #[case(RequestId::GetParameter, 0x81, RequestClass::Bidirectional)]
    #[case(RequestId::SetParameter, 0x82, RequestClass::Set)]
    #[case(RequestId::GetVariables, 0x83, RequestClass::Bidirectional)]
    #[case(RequestId::SetVariable, 0x84, RequestClass::Set)]
    #[case(RequestId::SetTarget, 0x85, RequestClass::Set)]
    #[case(RequestId::ClearErrors, 0x86, RequestClass::Set)]
    #[case(RequestId::GetSettings, 0x87, RequestClass::Bidirectional)]
    #[case(RequestId::GetStack, 0x88, RequestClass::Bidirectional)]
    #[case(RequestId::GetCallStack, 0x89, RequestClass::Bidirectional)]
    #[case(RequestId::SetPwm, 0x8A, RequestClass::Set)]
    fn request_codes_match_firmware(
        #[case] request: RequestId,
        #[case] code: u8,
        #[case] class: RequestClass,
    ) {
        assert_eq!(code, request.code());
        assert_eq!(class, request.class());
    }

    #[test]
    fn request_opcodes_are_unique() {
        let codes: std::collections::BTreeSet<u8> =
            RequestId::iter().map(RequestId::code).collect();
        assert_eq!(RequestId::iter().count(), codes.len());
    }

    #[test]
    fn readable_requests_set_the_device_to_host_bit() {
        for request in RequestId::iter() {
            match request.class() {
                RequestClass::Get | RequestClass::Bidirectional => {
                    assert_eq!(0x80, request.class().code() & 0x80, "{request}");
                }
                RequestClass::Set => {
                    assert_eq!(0, request.class().code() & 0x80, "{request}");
                }
            }
        }
    }
}

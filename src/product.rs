use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Pololu's USB vendor id, shared by every Maestro family.
pub const POLOLU_VENDOR_ID: u16 = 0x1FFB;

/// Known Maestro hardware families.
///
/// The variant identity drives every per-family branch in the settings
/// encoder, so the set is deliberately closed.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, EnumIter, Display)]
pub enum DeviceVariant {
    /// Micro Maestro 6-channel controller.
    #[strum(to_string = "micro-maestro-6")]
    Micro6,
    /// Mini Maestro 12-channel controller.
    #[strum(to_string = "mini-maestro-12")]
    Mini12,
    /// Mini Maestro 18-channel controller.
    #[strum(to_string = "mini-maestro-18")]
    Mini18,
    /// Mini Maestro 24-channel controller.
    #[strum(to_string = "mini-maestro-24")]
    Mini24,
}

impl DeviceVariant {
    /// Looks up the variant matching a USB vendor/product id pair.
    ///
    /// ```
    /// use maestro::DeviceVariant;
    ///
    /// assert_eq!(
    ///     Some(DeviceVariant::Micro6),
    ///     DeviceVariant::from_ids(0x1FFB, 0x0089)
    /// );
    /// assert_eq!(None, DeviceVariant::from_ids(0x1FFB, 0xFFFF));
    /// ```
    #[must_use]
    pub fn from_ids(vendor_id: u16, product_id: u16) -> Option<Self> {
        Self::iter().find(|variant| {
            variant.vendor_id() == vendor_id && variant.product_id() == product_id
        })
    }

    /// Returns the USB vendor id.
    #[must_use]
    pub const fn vendor_id(self) -> u16 {
        POLOLU_VENDOR_ID
    }

    /// Returns the USB product id.
    #[must_use]
    pub const fn product_id(self) -> u16 {
        match self {
            Self::Micro6 => 0x0089,
            Self::Mini12 => 0x008A,
            Self::Mini18 => 0x008B,
            Self::Mini24 => 0x008C,
        }
    }

    /// Returns the number of servo/IO ports on this family.
    #[must_use]
    pub const fn ports(self) -> u8 {
        match self {
            Self::Micro6 => 6,
            Self::Mini12 => 12,
            Self::Mini18 => 18,
            Self::Mini24 => 24,
        }
    }

    /// Returns the script memory size in bytes.
    #[must_use]
    pub const fn max_script_length(self) -> u32 {
        match self {
            Self::Micro6 => 1024,
            Self::Mini12 | Self::Mini18 | Self::Mini24 => 8192,
        }
    }

    /// Returns whether the settings encoder implements this family in full.
    ///
    /// The Mini families use a distinct servo-period/multiplier and
    /// channel-mode-byte layout that is not implemented; encoding settings for
    /// them fails loudly instead of sending wrong bytes.
    #[must_use]
    pub const fn supports_full_configuration(self) -> bool {
        matches!(self, Self::Micro6)
    }

    /// Returns whether this family exposes the input pull-up parameter.
    #[must_use]
    pub const fn has_input_pullups(self) -> bool {
        matches!(self, Self::Mini18 | Self::Mini24)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DeviceVariant::Micro6, 0x0089, 6, 1024)]
    #[case(DeviceVariant::Mini12, 0x008A, 12, 8192)]
    #[case(DeviceVariant::Mini18, 0x008B, 18, 8192)]
    #[case(DeviceVariant::Mini24, 0x008C, 24, 8192)]
    fn catalog_entries_match_hardware(
        #[case] variant: DeviceVariant,
        #[case] product_id: u16,
        #[case] ports: u8,
        #[case] max_script_length: u32,
    ) {
        assert_eq!(POLOLU_VENDOR_ID, variant.vendor_id());
        assert_eq!(product_id, variant.product_id());
        assert_eq!(ports, variant.ports());
        assert_eq!(max_script_length, variant.max_script_length());
        assert_eq!(Some(variant), DeviceVariant::from_ids(0x1FFB, product_id));
    }

    #[test]
    fn unknown_ids_resolve_to_none() {
        assert_eq!(None, DeviceVariant::from_ids(0x1FFB, 0x0001));
        assert_eq!(None, DeviceVariant::from_ids(0x046D, 0x0089));
    }

    #[test]
    fn only_the_micro_family_is_fully_configurable() {
        assert!(DeviceVariant::Micro6.supports_full_configuration());
        assert!(!DeviceVariant::Mini12.supports_full_configuration());
        assert!(!DeviceVariant::Mini18.supports_full_configuration());
        assert!(!DeviceVariant::Mini24.supports_full_configuration());
    }

    #[test]
    fn pullups_exist_on_the_larger_minis_only() {
        assert!(!DeviceVariant::Micro6.has_input_pullups());
        assert!(!DeviceVariant::Mini12.has_input_pullups());
        assert!(DeviceVariant::Mini18.has_input_pullups());
        assert!(DeviceVariant::Mini24.has_input_pullups());
    }
}

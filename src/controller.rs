use tracing::{debug, info};

use crate::encoder::{
    CommandRequest, acceleration_command, clear_errors_command, settings_writes, speed_command,
    target_command,
};
use crate::error::MaestroError;
use crate::hw::{DeviceConnection, FirmwareVersion, Transport};
use crate::product::DeviceVariant;
use crate::protocol::RequestId;
use crate::settings::Settings;
use crate::status::{ChannelStatus, decode_status, status_payload_len};

/// A session with one connected Maestro controller.
///
/// The session is synchronous and single-threaded: every operation is one
/// blocking request/response over the transport, and callers serialise
/// concurrent access themselves. Settings are owned by the session and
/// replaced wholesale; there is no partial in-place mutation.
///
/// ```no_run
/// # fn open_transport() -> maestro::FakeTransport { unimplemented!() }
/// # fn demo() -> Result<(), maestro::MaestroError> {
/// use maestro::ServoController;
///
/// let mut controller = ServoController::open(open_transport())?;
/// controller.set_target(0, 6000)?;
/// let status = controller.status()?;
/// println!("channel 0 at {} qus", status[0].position());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ServoController<T: Transport> {
    variant: DeviceVariant,
    connection: DeviceConnection<T>,
    serial_number: String,
    firmware_version: FirmwareVersion,
    settings: Settings,
}

impl<T: Transport> ServoController<T> {
    /// Opens a session and applies the default settings.
    ///
    /// # Errors
    ///
    /// Fails when the transport's ids match no known variant, when the
    /// initial exchanges fail, or when the settings push fails.
    pub fn open(transport: T) -> Result<Self, MaestroError> {
        Self::open_with_settings(transport, Settings::default())
    }

    /// Opens a session and applies the given settings.
    ///
    /// The variant is resolved from the transport's vendor/product ids, the
    /// serial number and firmware version are captured, and the settings are
    /// pushed to the device before the session is handed back.
    ///
    /// # Errors
    ///
    /// Fails on unrecognised ids, transport failures, or settings that do
    /// not encode for the resolved variant.
    pub fn open_with_settings(transport: T, settings: Settings) -> Result<Self, MaestroError> {
        let vendor_id = transport.vendor_id();
        let product_id = transport.product_id();
        let variant = DeviceVariant::from_ids(vendor_id, product_id).ok_or(
            MaestroError::UnrecognizedDevice {
                vendor_id,
                product_id,
            },
        )?;

        let mut connection = DeviceConnection::new(transport);
        let serial_number = connection.serial_number();
        let firmware_version = connection.firmware_version()?;
        info!(
            variant = %variant,
            serial = %serial_number,
            firmware = %firmware_version,
            "opened controller session"
        );

        let mut controller = Self {
            variant,
            connection,
            serial_number,
            firmware_version,
            settings: Settings::default(),
        };
        controller.apply_settings(settings)?;

        Ok(controller)
    }

    /// Pushes a new configuration to the device and stores it on the session.
    ///
    /// Writes are sent in the encoder's fixed order. The wire protocol has no
    /// transactions: a transport failure aborts the remaining writes and
    /// leaves the device in whatever partial state the sent writes produced.
    ///
    /// # Errors
    ///
    /// Fails when the settings do not encode for this variant (the stored
    /// settings are untouched) or on the first transport failure.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<(), MaestroError> {
        let writes = settings_writes(self.variant, &settings)?;
        info!(variant = %self.variant, writes = writes.len(), "applying settings");
        self.settings = settings;

        for write in writes {
            debug!(
                index = write.index(),
                value = write.value(),
                "writing parameter"
            );
            self.connection
                .send(RequestId::SetParameter, write.value(), write.index())?;
        }

        Ok(())
    }

    /// Commands a channel to a target pulse width in qus, clamped to the
    /// channel's configured limits.
    ///
    /// # Errors
    ///
    /// Fails on transport errors.
    pub fn set_target(&mut self, channel: u8, quarter_us: i32) -> Result<(), MaestroError> {
        let config = self.settings.channel(channel);
        self.send_command(target_command(&config, channel, quarter_us))
    }

    /// Commands a channel back to its effective home position.
    ///
    /// # Errors
    ///
    /// Fails on transport errors.
    pub fn reset_target(&mut self, channel: u8) -> Result<(), MaestroError> {
        let home = self.settings.channel(channel).effective_home();
        self.set_target(channel, home)
    }

    /// Sets a channel's speed limit.
    ///
    /// # Errors
    ///
    /// Fails on transport errors.
    pub fn set_speed(&mut self, channel: u8, value: u16) -> Result<(), MaestroError> {
        self.send_command(speed_command(channel, value))
    }

    /// Sets a channel's acceleration limit.
    ///
    /// # Errors
    ///
    /// Fails on transport errors.
    pub fn set_acceleration(&mut self, channel: u8, value: u16) -> Result<(), MaestroError> {
        self.send_command(acceleration_command(channel, value))
    }

    /// Clears the device error register.
    ///
    /// # Errors
    ///
    /// Fails on transport errors.
    pub fn clear_errors(&mut self) -> Result<(), MaestroError> {
        self.send_command(clear_errors_command())
    }

    /// Polls the device and decodes one status record per channel.
    ///
    /// # Errors
    ///
    /// Fails on transport errors or a malformed status payload.
    pub fn status(&mut self) -> Result<Vec<ChannelStatus>, MaestroError> {
        let length = status_payload_len(self.variant.ports());
        let payload = self
            .connection
            .request(RequestId::GetVariables, 0x0000, 0x0000, length)?;

        Ok(decode_status(self.variant.ports(), &payload)?)
    }

    /// Returns the resolved hardware variant.
    #[must_use]
    pub fn variant(&self) -> DeviceVariant {
        self.variant
    }

    /// Returns the device serial number.
    #[must_use]
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// Returns the device firmware version.
    #[must_use]
    pub fn firmware_version(&self) -> FirmwareVersion {
        self.firmware_version
    }

    /// Returns the settings currently stored on the session.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Closes the session and releases the transport handle.
    pub fn close(mut self) {
        self.connection.close();
    }

    fn send_command(&mut self, command: CommandRequest) -> Result<(), MaestroError> {
        debug!(
            request = %command.request(),
            value = command.value(),
            index = command.index(),
            "sending command"
        );
        self.connection
            .send(command.request(), command.value(), command.index())?;

        Ok(())
    }
}

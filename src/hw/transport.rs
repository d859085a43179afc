use thiserror::Error;

/// Failures reported by a USB transport backend.
///
/// Backends map their native error codes onto these variants; the protocol
/// layer never retries, it surfaces the failure to the caller as-is.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum TransportError {
    /// The control transfer did not complete within its timeout.
    #[error("control transfer timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u32 },
    /// The operating system denied access to the device handle.
    #[error("access to the device was denied")]
    PermissionDenied,
    /// The device disappeared from the bus.
    #[error("the device was disconnected")]
    Disconnected,
    /// The device stalled the request.
    #[error("the device stalled the request")]
    Stall,
    /// Any other backend failure.
    #[error("USB transfer failed: {message}")]
    Failed { message: String },
}

/// A blocking USB control-transfer channel to one device.
///
/// Implementations wrap a platform USB stack and an open device handle.
/// Device discovery and permission negotiation happen before a transport is
/// constructed. A transport is not safe for concurrent transfers; callers
/// serialise access, typically with one exclusive lock per handle.
pub trait Transport {
    /// Returns the device's USB vendor id.
    fn vendor_id(&self) -> u16;

    /// Returns the device's USB product id.
    fn product_id(&self) -> u16;

    /// Returns the device's serial string.
    fn serial(&self) -> String;

    /// Allocates a read buffer of the given length.
    ///
    /// Backends that need specially-allocated buffers override this.
    fn allocate_buffer(&self, length: usize) -> Vec<u8> {
        vec![0; length]
    }

    /// Performs one blocking control transfer and returns the byte count
    /// moved in the data stage.
    ///
    /// `buffer` is `Some` for transfers with a device-to-host data stage and
    /// `None` for zero-payload writes. The call is atomic from the protocol
    /// layer's perspective: it either completes or fails, with no partial
    /// retry.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on timeout, stall, permission denial, or
    /// any other backend failure.
    fn control_transfer(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buffer: Option<&mut [u8]>,
        timeout_ms: u32,
    ) -> Result<usize, TransportError>;

    /// Releases the device handle.
    fn close(&mut self);
}

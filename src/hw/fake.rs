use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bon::Builder;

use super::transport::{Transport, TransportError};
use crate::product::DeviceVariant;

/// One control transfer observed by a fake transport.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RecordedTransfer {
    request_type: u8,
    request: u8,
    value: u16,
    index: u16,
    read_length: Option<usize>,
}

impl RecordedTransfer {
    /// Returns the `bmRequestType` byte.
    #[must_use]
    pub fn request_type(&self) -> u8 {
        self.request_type
    }

    /// Returns the vendor request opcode.
    #[must_use]
    pub fn request(&self) -> u8 {
        self.request
    }

    /// Returns the `wValue` word.
    #[must_use]
    pub fn value(&self) -> u16 {
        self.value
    }

    /// Returns the `wIndex` word.
    #[must_use]
    pub fn index(&self) -> u16 {
        self.index
    }

    /// Returns the requested read length, or `None` for zero-payload writes.
    #[must_use]
    pub fn read_length(&self) -> Option<usize> {
        self.read_length
    }
}

/// Shareable log of every transfer a [`FakeTransport`] performed.
///
/// Clone the journal before handing the transport to a controller; the clone
/// keeps observing transfers after the move.
#[derive(Debug, Clone, Default)]
pub struct TransferJournal {
    inner: Arc<Mutex<Vec<RecordedTransfer>>>,
}

impl TransferJournal {
    /// Returns a snapshot of all recorded transfers, oldest first.
    #[must_use]
    pub fn transfers(&self) -> Vec<RecordedTransfer> {
        self.lock().clone()
    }

    fn record(&self, transfer: RecordedTransfer) {
        self.lock().push(transfer);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RecordedTransfer>> {
        // A poisoned journal only means a test thread panicked mid-record;
        // the data is still a plain Vec.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Settings for constructing a fake transport.
#[derive(Debug, Builder)]
pub struct FakeTransportConfig {
    /// Vendor id the fake reports; defaults to the 6-channel family.
    #[builder(default = DeviceVariant::Micro6.vendor_id())]
    vendor_id: u16,
    /// Product id the fake reports; defaults to the 6-channel family.
    #[builder(default = DeviceVariant::Micro6.product_id())]
    product_id: u16,
    /// Serial string the fake reports.
    #[builder(default = String::from("00000001"))]
    serial: String,
    /// Scripted payloads served to read requests, in order. Once exhausted,
    /// reads are satisfied with zero-filled buffers of the requested length.
    #[builder(default)]
    read_payloads: Vec<Vec<u8>>,
}

/// In-memory transport used in tests and non-hardware environments.
///
/// Writes always succeed with an empty data stage; reads are served from the
/// scripted payload queue. Every transfer is recorded in the journal.
#[derive(Debug)]
pub struct FakeTransport {
    vendor_id: u16,
    product_id: u16,
    serial: String,
    read_payloads: VecDeque<Vec<u8>>,
    journal: TransferJournal,
    closed: bool,
}

impl FakeTransport {
    /// Creates a fake transport from explicit settings.
    #[must_use]
    pub fn new(config: FakeTransportConfig) -> Self {
        Self {
            vendor_id: config.vendor_id,
            product_id: config.product_id,
            serial: config.serial,
            read_payloads: config.read_payloads.into(),
            journal: TransferJournal::default(),
            closed: false,
        }
    }

    /// Returns a journal handle that outlives the transport move.
    #[must_use]
    pub fn journal(&self) -> TransferJournal {
        self.journal.clone()
    }

    /// Returns whether `close` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Transport for FakeTransport {
    fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    fn product_id(&self) -> u16 {
        self.product_id
    }

    fn serial(&self) -> String {
        self.serial.clone()
    }

    fn control_transfer(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buffer: Option<&mut [u8]>,
        _timeout_ms: u32,
    ) -> Result<usize, TransportError> {
        self.journal.record(RecordedTransfer {
            request_type,
            request,
            value,
            index,
            read_length: buffer.as_ref().map(|buffer| buffer.len()),
        });

        let Some(buffer) = buffer else {
            return Ok(0);
        };

        match self.read_payloads.pop_front() {
            Some(payload) => {
                let transferred = payload.len().min(buffer.len());
                buffer[..transferred].copy_from_slice(&payload[..transferred]);
                Ok(transferred)
            }
            None => {
                buffer.fill(0);
                Ok(buffer.len())
            }
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_report_the_six_channel_family() {
        let transport = FakeTransport::new(FakeTransportConfig::builder().build());
        assert_eq!(0x1FFB, transport.vendor_id());
        assert_eq!(0x0089, transport.product_id());
        assert_eq!("00000001", transport.serial());
        assert!(!transport.is_closed());
    }

    #[test]
    fn journal_observes_transfers_after_the_move() {
        let mut transport = FakeTransport::new(FakeTransportConfig::builder().build());
        let journal = transport.journal();

        transport
            .control_transfer(0x40, 0x85, 6000, 2, None, 5000)
            .expect("fake writes always succeed");

        let transfers = journal.transfers();
        assert_eq!(1, transfers.len());
        assert_eq!(0x40, transfers[0].request_type());
        assert_eq!(0x85, transfers[0].request());
        assert_eq!(6000, transfers[0].value());
        assert_eq!(2, transfers[0].index());
        assert_eq!(None, transfers[0].read_length());
    }

    #[test]
    fn reads_drain_the_scripted_queue_then_zero_fill() {
        let mut transport = FakeTransport::new(
            FakeTransportConfig::builder()
                .read_payloads(vec![vec![0xAA, 0xBB]])
                .build(),
        );

        let mut first = [0u8; 2];
        let transferred = transport
            .control_transfer(0xC0, 0x83, 0, 0, Some(&mut first), 5000)
            .expect("scripted read should succeed");
        assert_eq!(2, transferred);
        assert_eq!([0xAA, 0xBB], first);

        let mut second = [0xFFu8; 3];
        let transferred = transport
            .control_transfer(0xC0, 0x83, 0, 0, Some(&mut second), 5000)
            .expect("zero-filled read should succeed");
        assert_eq!(3, transferred);
        assert_eq!([0, 0, 0], second);
    }

    #[test]
    fn close_marks_the_transport_closed() {
        let mut transport = FakeTransport::new(FakeTransportConfig::builder().build());
        transport.close();
        assert!(transport.is_closed());
    }
}

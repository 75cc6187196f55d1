//! Walking a range of ROM one read cycle at a time.

use crate::addr::{Bank, RomAddress, RomRange, Words};
use crate::bus::CartBus;
use crate::error::{DumpError, DumpResult};
use crate::gpio::Gpio;
use log::{debug, info, trace};
use std::fmt;

mod sink;

pub use sink::{BinarySink, RecordSink, TextSink};

//===========================================================================//

/// One word read from the cartridge, together with its address.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DumpRecord {
    /// The address the word was read from.
    pub address: RomAddress,
    /// The word the cartridge drove onto the bus.
    pub word: u16,
}

impl fmt::Display for DumpRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "0x{:06X}: 0x{:04X}", self.address.as_u32(), self.word)
    }
}

//===========================================================================//

impl<G: Gpio> CartBus<G> {
    /// Starts dumping `range`, returning a lazy sequence with one record per
    /// word, in increasing address order.
    ///
    /// The range is checked before anything touches the bus: it must start
    /// on a word boundary, end within ROM, and only need banks that the bank
    /// selector can reach.
    pub fn dump(&mut self, range: RomRange) -> DumpResult<DumpRecords<'_, G>> {
        range.check()?;
        if let Some(bank) = range.banks().last() {
            let bank_count = self.bank_count();
            if bank.index() >= bank_count {
                return Err(DumpError::UnsupportedBank { bank, bank_count });
            }
        }
        info!("dumping {range} ({} words)", range.word_count());
        Ok(DumpRecords {
            bus: self,
            words: range.words(),
            current_bank: None,
            finished: false,
        })
    }
}

//===========================================================================//

/// The records of an in-progress dump.  See [`CartBus::dump`].
///
/// Each item is either a record for a completed read cycle or the error that
/// ended the dump; after an error the sequence is over.  The sequence cannot
/// be rewound: dumping again means resetting the cartridge and calling
/// [`CartBus::dump`] anew.
pub struct DumpRecords<'a, G: Gpio> {
    bus: &'a mut CartBus<G>,
    words: Words,
    current_bank: Option<Bank>,
    finished: bool,
}

impl<G: Gpio> DumpRecords<'_, G> {
    /// Returns the number of records that have not been produced yet.
    pub fn remaining(&self) -> usize {
        if self.finished { 0 } else { self.words.len() }
    }
}

impl<G: Gpio> Iterator for DumpRecords<'_, G> {
    type Item = DumpResult<DumpRecord>;

    fn next(&mut self) -> Option<DumpResult<DumpRecord>> {
        if self.finished {
            return None;
        }
        let Some(address) = self.words.next() else {
            self.finished = true;
            info!("dump complete");
            return None;
        };
        if self.current_bank != Some(address.bank()) {
            debug!("entering {} at {address}", address.bank());
            self.current_bank = Some(address.bank());
        }
        match self.bus.read_word_at(address) {
            Ok(word) => {
                let record = DumpRecord { address, word };
                trace!("{record}");
                Some(Ok(record))
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

impl<G: Gpio> std::iter::FusedIterator for DumpRecords<'_, G> {}

//===========================================================================//

/// Drains `records` into `sink`, then finishes the sink.  Returns the number
/// of records written.
///
/// Only complete records ever reach the sink.  If the dump fails part-way,
/// the records before the failure are flushed and the error is returned.
pub fn write_records<I>(
    records: I,
    sink: &mut dyn RecordSink,
) -> DumpResult<u64>
where
    I: IntoIterator<Item = DumpResult<DumpRecord>>,
{
    let mut count = 0u64;
    for record in records {
        match record {
            Ok(record) => {
                sink.write_record(&record)?;
                count += 1;
            }
            Err(err) => {
                sink.finish()?;
                return Err(err);
            }
        }
    }
    sink.finish()?;
    Ok(count)
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{DumpRecord, TextSink, write_records};
    use crate::addr::{RomAddress, RomRange};
    use crate::bus::{CartBus, PinMap, SingleBank, Timing};
    use crate::error::DumpError;
    use crate::gpio::{GpioError, MockGpio};

    fn open_bus(gpio: MockGpio) -> CartBus<MockGpio> {
        CartBus::open(
            gpio,
            PinMap::default(),
            Timing::default(),
            Box::new(SingleBank),
        )
        .unwrap()
    }

    #[test]
    fn record_display() {
        let record = DumpRecord {
            address: RomAddress::try_from(0x1234u32).unwrap(),
            word: 0xbeef,
        };
        assert_eq!(record.to_string(), "0x001234: 0xBEEF");
    }

    #[test]
    fn dump_is_lazy() {
        let mut bus = open_bus(MockGpio::new());
        bus.gpio_mut().clear_events();
        let mut records = bus.dump(RomRange::new(0, 0x10)).unwrap();
        assert_eq!(records.remaining(), 8);
        assert!(records.next().is_some());
        assert_eq!(records.remaining(), 7);
        drop(records);
        let latch_low = 16 + 3;
        let latch_high = 8 + 3;
        let read = 16 + 2 + 16 + 1 + 16;
        assert_eq!(
            bus.gpio().events().len(),
            latch_low + latch_high + read
        );
    }

    #[test]
    fn dump_rejects_bad_ranges_up_front() {
        let mut bus = open_bus(MockGpio::new());
        bus.gpio_mut().clear_events();
        assert!(matches!(
            bus.dump(RomRange::new(0, 0x4000002)).err(),
            Some(DumpError::AddressOutOfRange { address: 0x4000000 })
        ));
        assert!(matches!(
            bus.dump(RomRange::new(3, 0x10)).err(),
            Some(DumpError::UnalignedAddress { address: 3 })
        ));
        assert!(matches!(
            bus.dump(RomRange::new(0x20, 0x10)).err(),
            Some(DumpError::InvalidRange { start: 0x20, end: 0x10 })
        ));
        assert!(matches!(
            bus.dump(RomRange::for_banks(2)).err(),
            Some(DumpError::UnsupportedBank { bank_count: 1, .. })
        ));
        assert!(bus.gpio().events().is_empty());
    }

    #[test]
    fn dump_stops_after_error() {
        let pins = PinMap::default();
        let gpio = MockGpio::new().fail_reads_from(pins.bus_line(3));
        let mut bus = open_bus(gpio);
        let mut records = bus.dump(RomRange::new(0, 0x10)).unwrap();
        assert!(matches!(records.next(), Some(Err(DumpError::Io(_)))));
        assert!(records.next().is_none());
        assert_eq!(records.remaining(), 0);
    }

    #[test]
    fn write_records_counts() {
        let mut bus = open_bus(MockGpio::new());
        let mut sink = TextSink::new(Vec::new());
        let records = bus.dump(RomRange::new(0, 0x8)).unwrap();
        assert_eq!(write_records(records, &mut sink).unwrap(), 4);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "0x000000: 0xAAAA\n0x000002: 0xAAAA\n\
             0x000004: 0xAAAA\n0x000006: 0xAAAA\n"
        );
    }

    #[test]
    fn write_records_keeps_completed_records() {
        let record = |address: u32| DumpRecord {
            address: RomAddress::try_from(address).unwrap(),
            word: 0x1234,
        };
        let records = vec![
            Ok(record(0)),
            Ok(record(2)),
            Err(DumpError::Io(GpioError::new("fault"))),
            Ok(record(6)),
        ];
        let mut sink = TextSink::new(Vec::new());
        let result = write_records(records, &mut sink);
        assert!(matches!(result, Err(DumpError::Io(_))));
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "0x000000: 0x1234\n0x000002: 0x1234\n");
    }
}

//===========================================================================//

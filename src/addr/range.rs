use super::{Bank, MAX_ROM_SIZE, ROM_BANK_SIZE, RomAddress, WORD_SIZE};
use std::fmt;

//===========================================================================//

/// Represents a half-open range `[start, end)` of ROM byte addresses.
///
/// The bounds are kept as plain integers so that a range can describe an
/// out-of-bounds request; [`RomRange::check`] reports whether it is one.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct RomRange {
    start: u32,
    end: u32,
}

impl RomRange {
    /// A range that covers the whole addressable ROM.
    pub const FULL: RomRange = RomRange { start: 0, end: MAX_ROM_SIZE };

    /// Returns the range `[start, end)`.  An `end` before `start` is kept as
    /// given, and rejected by [`RomRange::check`].
    pub fn new(start: u32, end: u32) -> RomRange {
        RomRange { start, end }
    }

    /// Returns the range from `start` up to the end of the bank that
    /// `start` falls in.
    pub fn to_bank_end(start: u32) -> RomRange {
        let end = (start / ROM_BANK_SIZE + 1).saturating_mul(ROM_BANK_SIZE);
        RomRange::new(start, end)
    }

    /// Returns the range covering the first `count` banks.
    pub fn for_banks(count: u8) -> RomRange {
        RomRange::new(0, u32::from(count).saturating_mul(ROM_BANK_SIZE))
    }

    /// Returns the first address in the range.
    pub fn start(self) -> u32 {
        self.start
    }

    /// Returns the address one past the end of the range.
    pub fn end(self) -> u32 {
        self.end
    }

    /// Returns true if the range contains no addresses.
    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// Returns the number of read cycles needed to cover this range.
    pub fn word_count(self) -> u32 {
        self.end.saturating_sub(self.start).div_ceil(WORD_SIZE)
    }

    /// Returns an error if this range does not start on a word boundary,
    /// ends before it starts, or reaches past [`MAX_ROM_SIZE`].
    pub fn check(self) -> Result<(), RangeFault> {
        if self.start % WORD_SIZE != 0 {
            Err(RangeFault::Unaligned(self.start))
        } else if self.end < self.start {
            Err(RangeFault::Reversed { start: self.start, end: self.end })
        } else if self.end > MAX_ROM_SIZE {
            Err(RangeFault::OutOfRange(self.start.max(MAX_ROM_SIZE)))
        } else {
            Ok(())
        }
    }

    /// Returns the banks that this range touches, in increasing order.
    pub fn banks(self) -> impl Iterator<Item = Bank> {
        let (first, last) = if self.is_empty() {
            (1, 0)
        } else {
            (self.start / ROM_BANK_SIZE, (self.end - 1) / ROM_BANK_SIZE)
        };
        (first..=last).map(|index| Bank(index as u8))
    }

    /// Returns an iterator over the word-aligned addresses in this range, in
    /// increasing order.  The range must already have passed
    /// [`RomRange::check`].
    pub fn words(self) -> Words {
        debug_assert!(self.check().is_ok());
        Words { next: self.start, end: self.end }
    }
}

impl fmt::Display for RomRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "[0x{:06X}, 0x{:06X})", self.start, self.end)
    }
}

//===========================================================================//

/// The reason a [`RomRange`] cannot be dumped.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RangeFault {
    /// The range starts in the middle of a word.
    Unaligned(u32),
    /// The range ends before it starts.
    Reversed {
        /// The requested start address.
        start: u32,
        /// The requested end address.
        end: u32,
    },
    /// The range reaches the given address, which is beyond the end of ROM.
    OutOfRange(u32),
}

//===========================================================================//

/// An iterator over the word addresses of a [`RomRange`].
pub struct Words {
    next: u32,
    end: u32,
}

impl Iterator for Words {
    type Item = RomAddress;

    fn next(&mut self) -> Option<RomAddress> {
        if self.next < self.end {
            let addr = RomAddress(self.next);
            self.next += WORD_SIZE;
            Some(addr)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining =
            (self.end.saturating_sub(self.next)).div_ceil(WORD_SIZE) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Words {}

impl std::iter::FusedIterator for Words {}

//===========================================================================//


//===========================================================================//

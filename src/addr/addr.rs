use super::{Bank, MAX_ROM_SIZE, ROM_BANK_SIZE, WORD_SIZE};
use std::fmt;

//===========================================================================//

/// Represents a linear byte offset into cartridge ROM.
///
/// A `RomAddress` is always less than [`MAX_ROM_SIZE`].  On the wire it is
/// split into a 16-bit low half and an 8-bit high half, which are latched
/// into the cartridge in two separate phases; any bits above bit 23 select
/// the [`Bank`] instead.
#[derive(
    Clone, Copy, Debug, Default, Hash, Eq, Ord, PartialEq, PartialOrd,
)]
pub struct RomAddress(pub(super) u32);

impl RomAddress {
    /// The smallest address value (0).
    pub const MIN: RomAddress = RomAddress(0);

    /// The largest address value (`MAX_ROM_SIZE - 1`).
    pub const MAX: RomAddress = RomAddress(MAX_ROM_SIZE - 1);

    /// The number of address bits carried by the low latch phase.
    pub const LOW_BITS: u32 = 16;

    /// The number of address bits carried by the high latch phase.
    pub const HIGH_BITS: u32 = 8;

    /// Returns the address as a plain integer.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns bits 0-15 of the address, as latched in the low phase.
    pub fn low_half(self) -> u16 {
        self.0 as u16
    }

    /// Returns bits 16-23 of the address, as latched in the high phase.
    pub fn high_half(self) -> u8 {
        (self.0 >> RomAddress::LOW_BITS) as u8
    }

    /// Reassembles an in-bank address from the two latched halves.
    pub fn from_halves(bank: Bank, high: u8, low: u16) -> RomAddress {
        RomAddress(
            bank.first_address().0
                | (u32::from(high) << RomAddress::LOW_BITS)
                | u32::from(low),
        )
    }

    /// Returns the bank that this address falls in.
    pub fn bank(self) -> Bank {
        Bank((self.0 / ROM_BANK_SIZE) as u8)
    }

    /// Returns the offset of this address from the start of its bank.
    pub fn offset_in_bank(self) -> u32 {
        self.0 % ROM_BANK_SIZE
    }

    /// Returns true if this address falls on a word boundary.
    pub fn is_word_aligned(self) -> bool {
        self.0 % WORD_SIZE == 0
    }

    /// Returns the address of the next word, or `None` if that would reach
    /// [`MAX_ROM_SIZE`].
    pub fn next_word(self) -> Option<RomAddress> {
        RomAddress::try_from(self.0 + WORD_SIZE).ok()
    }
}

impl TryFrom<u32> for RomAddress {
    type Error = ();

    fn try_from(value: u32) -> Result<RomAddress, ()> {
        if value < MAX_ROM_SIZE { Ok(RomAddress(value)) } else { Err(()) }
    }
}

impl From<RomAddress> for u32 {
    fn from(value: RomAddress) -> u32 {
        value.0
    }
}

impl fmt::Display for RomAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "0x{:06X}", self.0)
    }
}

impl fmt::LowerHex for RomAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.0.fmt(f)
    }
}

//===========================================================================//


//===========================================================================//

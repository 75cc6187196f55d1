use super::{MAX_ROM_SIZE, ROM_BANK_SIZE, RomAddress};
use std::fmt;

//===========================================================================//

/// Identifies one `ROM_BANK_SIZE`-sized window of cartridge ROM.
#[derive(
    Clone, Copy, Debug, Default, Hash, Eq, Ord, PartialEq, PartialOrd,
)]
pub struct Bank(pub(super) u8);

impl Bank {
    /// The number of banks needed to cover [`MAX_ROM_SIZE`].
    pub const COUNT: u8 = (MAX_ROM_SIZE / ROM_BANK_SIZE) as u8;

    /// The first bank, which is the only one the reference wiring can reach
    /// without a bank selector.
    pub const FIRST: Bank = Bank(0);

    /// Returns the bank with the given index, or `None` if it lies beyond
    /// [`MAX_ROM_SIZE`].
    pub fn new(index: u8) -> Option<Bank> {
        if index < Bank::COUNT { Some(Bank(index)) } else { None }
    }

    /// Returns the zero-based index of this bank.
    pub fn index(self) -> u8 {
        self.0
    }

    /// Returns the lowest address in this bank.
    pub fn first_address(self) -> RomAddress {
        RomAddress(u32::from(self.0) * ROM_BANK_SIZE)
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "bank {}", self.0)
    }
}

//===========================================================================//


//===========================================================================//

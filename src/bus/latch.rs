use super::CartBus;
use crate::addr::RomAddress;
use crate::error::DumpResult;
use crate::gpio::{Gpio, Level};

//===========================================================================//

/// Which half of a 24-bit address a latch phase transmits.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AddressHalf {
    /// Bits 0-15, on bus lines 0-15, committed by ALE_L.
    Low,
    /// Bits 16-23, on bus lines 0-7, committed by ALE_H.
    High,
}

impl AddressHalf {
    /// The number of bus lines this half is driven onto.
    pub fn bit_count(self) -> u32 {
        match self {
            AddressHalf::Low => RomAddress::LOW_BITS,
            AddressHalf::High => RomAddress::HIGH_BITS,
        }
    }

    /// The position within the address of this half's lowest bit.
    pub fn bit_shift(self) -> u32 {
        match self {
            AddressHalf::Low => 0,
            AddressHalf::High => RomAddress::LOW_BITS,
        }
    }
}

//===========================================================================//

impl<G: Gpio> CartBus<G> {
    /// Drives one half of `address` onto the bus and pulses the matching
    /// latch line, committing those bits to the cartridge's address
    /// register.
    ///
    /// The bus must be in output mode; this does not change its direction.
    /// The low half must be latched before the high half.  If a pin-level
    /// operation fails, the bus is returned to its safe state before the
    /// error is reported.
    pub fn latch(
        &mut self,
        address: RomAddress,
        half: AddressHalf,
    ) -> DumpResult<()> {
        self.latch_steps(address, half).map_err(|err| self.abort_cycle(err))
    }

    fn latch_steps(
        &mut self,
        address: RomAddress,
        half: AddressHalf,
    ) -> DumpResult<()> {
        self.lines.drive_bits(
            &mut self.gpio,
            address.as_u32(),
            half.bit_count(),
            half.bit_shift(),
        )?;
        let pin = self.pins.latch(half);
        self.gpio.write_pin(pin, Level::High)?;
        self.settle(self.timing.latch_pulse_us)?;
        self.gpio.write_pin(pin, Level::Low)?;
        Ok(())
    }
}

//===========================================================================//


//===========================================================================//

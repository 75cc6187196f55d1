use super::AddressHalf;
use crate::error::{DumpError, DumpResult};
use std::ops;

//===========================================================================//

/// The fixed pin assignment of the cartridge interface.
///
/// Everything is laid out relative to the first bus line `B`:
///
/// | Role                           | Pins           |
/// |--------------------------------|----------------|
/// | Address/data bus AD0-AD15      | `B` .. `B+15`  |
/// | Low-address latch (ALE_L)      | `B+16`         |
/// | High-address latch (ALE_H)     | `B+17`         |
/// | Read strobe, active low        | `B+18`         |
/// | Write strobe, active low       | `B+19`         |
/// | Reset, active low              | `B+20`         |
/// | Bank select BS0-BS1            | `B+21`, `B+22` |
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PinMap {
    bus_base: u32,
}

impl PinMap {
    /// The number of multiplexed address/data lines.
    pub const BUS_WIDTH: u32 = 16;

    /// The number of bank-select lines.
    pub const BANK_SELECT_LINES: u32 = 2;

    /// The first bus line on the reference wiring (GPIO2).
    pub const DEFAULT_BUS_BASE: u32 = 2;

    /// Returns the pin map whose first bus line is `bus_base`.
    pub fn new(bus_base: u32) -> PinMap {
        PinMap { bus_base }
    }

    /// Returns the pin of bus line AD0.
    pub fn bus_base(self) -> u32 {
        self.bus_base
    }

    /// Returns the pin of bus line `bit`.
    pub fn bus_line(self, bit: u32) -> u32 {
        debug_assert!(bit < PinMap::BUS_WIDTH);
        self.bus_base + bit
    }

    /// Returns the pins of all bus lines, AD0 first.
    pub fn bus_lines(self) -> ops::Range<u32> {
        self.bus_base..(self.bus_base + PinMap::BUS_WIDTH)
    }

    /// Returns the latch pin for the given half of the address.
    pub fn latch(self, half: AddressHalf) -> u32 {
        match half {
            AddressHalf::Low => self.latch_low(),
            AddressHalf::High => self.latch_high(),
        }
    }

    /// Returns the low-address latch pin.
    pub fn latch_low(self) -> u32 {
        self.bus_base + 16
    }

    /// Returns the high-address latch pin.
    pub fn latch_high(self) -> u32 {
        self.bus_base + 17
    }

    /// Returns the read strobe pin.
    pub fn read_strobe(self) -> u32 {
        self.bus_base + 18
    }

    /// Returns the write strobe pin.
    pub fn write_strobe(self) -> u32 {
        self.bus_base + 19
    }

    /// Returns the reset pin.
    pub fn reset(self) -> u32 {
        self.bus_base + 20
    }

    /// Returns bank-select line `bit`.
    pub fn bank_select(self, bit: u32) -> u32 {
        debug_assert!(bit < PinMap::BANK_SELECT_LINES);
        self.bus_base + 21 + bit
    }
}

impl Default for PinMap {
    fn default() -> PinMap {
        PinMap::new(PinMap::DEFAULT_BUS_BASE)
    }
}

//===========================================================================//

/// Delay durations of the bus protocol, in microseconds.
///
/// The minimums are part of the cartridge's electrical timing and are
/// enforced by [`Timing::validate`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Timing {
    /// How long a latch line is held active.
    pub latch_pulse_us: u32,
    /// How long the read strobe is held before the bus is sampled.
    pub read_settle_us: u32,
    /// How long to wait after configuring the pins.
    pub init_settle_us: u32,
    /// How long the reset line is held active.
    pub reset_pulse_us: u32,
    /// The longest any single settle delay may actually take.
    pub settle_timeout_us: u32,
}

impl Timing {
    /// The shortest allowed latch pulse.
    pub const MIN_LATCH_PULSE_US: u32 = 1;
    /// The shortest allowed read settle delay.
    pub const MIN_READ_SETTLE_US: u32 = 1;
    /// The shortest allowed settle delay after pin setup.
    pub const MIN_INIT_SETTLE_US: u32 = 100;
    /// The shortest allowed reset pulse.
    pub const MIN_RESET_PULSE_US: u32 = 1;

    /// Returns an error describing the first parameter that violates the
    /// protocol minimums, if any.
    pub fn validate(&self) -> DumpResult<()> {
        let minimums = [
            ("latch pulse", self.latch_pulse_us, Timing::MIN_LATCH_PULSE_US),
            ("read settle", self.read_settle_us, Timing::MIN_READ_SETTLE_US),
            ("init settle", self.init_settle_us, Timing::MIN_INIT_SETTLE_US),
            ("reset pulse", self.reset_pulse_us, Timing::MIN_RESET_PULSE_US),
        ];
        for (name, value, minimum) in minimums {
            if value < minimum {
                return Err(DumpError::InvalidTiming(format!(
                    "{name} of {value}us is below the minimum of {minimum}us"
                )));
            }
            if value > self.settle_timeout_us {
                return Err(DumpError::InvalidTiming(format!(
                    "{name} of {value}us exceeds the settle timeout of {}us",
                    self.settle_timeout_us
                )));
            }
        }
        Ok(())
    }
}

impl Default for Timing {
    fn default() -> Timing {
        Timing {
            latch_pulse_us: 1,
            read_settle_us: 1,
            init_settle_us: 100,
            reset_pulse_us: 100,
            settle_timeout_us: 10_000,
        }
    }
}

//===========================================================================//


//===========================================================================//

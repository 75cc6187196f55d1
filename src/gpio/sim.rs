use super::{Gpio, GpioError, GpioResult, Level, PinMode};
use crate::addr::{Bank, RomAddress};
use crate::bus::PinMap;
use byteorder::{BigEndian, ByteOrder};
use std::collections::HashMap;

//===========================================================================//

/// A GPIO driver wired to a simulated cartridge.
///
/// The cartridge captures the bus into its address register on the falling
/// edge of each latch line, reads the bank from the bank-select lines, and
/// drives the big-endian word at the latched address onto the bus while the
/// read strobe is low.  Reads beyond the ROM image are mirrored.
pub struct SimCartridge {
    rom: Box<[u8]>,
    pins: PinMap,
    modes: HashMap<u32, PinMode>,
    levels: HashMap<u32, Level>,
    latched_low: u16,
    latched_high: u8,
    read_cycles: u64,
    bus_conflicts: u64,
}

impl SimCartridge {
    /// Returns a simulated cartridge holding `rom`, wired according to
    /// `pins`.  Panics if `rom` is empty.
    pub fn new(rom: Box<[u8]>, pins: PinMap) -> SimCartridge {
        assert!(!rom.is_empty());
        SimCartridge {
            rom,
            pins,
            modes: HashMap::new(),
            levels: HashMap::new(),
            latched_low: 0,
            latched_high: 0,
            read_cycles: 0,
            bus_conflicts: 0,
        }
    }

    /// Returns the address currently held in the cartridge's address
    /// register, including the selected bank.
    pub fn latched_address(&self) -> RomAddress {
        RomAddress::from_halves(
            self.selected_bank(),
            self.latched_high,
            self.latched_low,
        )
    }

    /// Returns the number of times the read strobe has been asserted.
    pub fn read_cycles(&self) -> u64 {
        self.read_cycles
    }

    /// Returns the number of times the controller and the cartridge have
    /// both driven the bus at once.
    pub fn bus_conflicts(&self) -> u64 {
        self.bus_conflicts
    }

    fn level(&self, pin: u32) -> Level {
        self.levels.get(&pin).copied().unwrap_or_default()
    }

    fn controller_drives_bus(&self) -> bool {
        self.pins
            .bus_lines()
            .any(|pin| self.modes.get(&pin) == Some(&PinMode::Output))
    }

    fn cartridge_drives_bus(&self) -> bool {
        self.modes.get(&self.pins.read_strobe()) == Some(&PinMode::Output)
            && self.level(self.pins.read_strobe()) == Level::Low
    }

    fn bus_value(&self, width: u32) -> u16 {
        (0..width).fold(0u16, |value, bit| {
            let level = self.level(self.pins.bus_line(bit));
            value | (u16::from(level.is_high()) << bit)
        })
    }

    fn selected_bank(&self) -> Bank {
        let index = (0..PinMap::BANK_SELECT_LINES).fold(0u8, |index, bit| {
            let level = self.level(self.pins.bank_select(bit));
            index | (u8::from(level.is_high()) << bit)
        });
        Bank::new(index).unwrap_or(Bank::FIRST)
    }

    fn current_word(&self) -> u16 {
        let addr = self.latched_address().as_u32() as usize;
        let len = self.rom.len();
        let bytes = [self.rom[addr % len], self.rom[(addr + 1) % len]];
        BigEndian::read_u16(&bytes)
    }
}

impl Gpio for SimCartridge {
    fn description(&self) -> String {
        let size = self.rom.len();
        if size < 1024 {
            format!("simulated cartridge with {size}B ROM")
        } else if size < 1024 * 1024 {
            format!("simulated cartridge with {}kB ROM", size >> 10)
        } else {
            format!("simulated cartridge with {}MB ROM", size >> 20)
        }
    }

    fn set_pin_mode(&mut self, pin: u32, mode: PinMode) -> GpioResult<()> {
        self.modes.insert(pin, mode);
        if mode == PinMode::Output
            && self.pins.bus_lines().contains(&pin)
            && self.cartridge_drives_bus()
        {
            self.bus_conflicts += 1;
        }
        Ok(())
    }

    fn write_pin(&mut self, pin: u32, level: Level) -> GpioResult<()> {
        if self.modes.get(&pin) != Some(&PinMode::Output) {
            return Err(GpioError::on_pin(pin, "write to a non-output pin"));
        }
        let previous = self.levels.insert(pin, level).unwrap_or_default();
        let falling = previous == Level::High && level == Level::Low;
        if pin == self.pins.latch_low() && falling {
            self.latched_low = self.bus_value(RomAddress::LOW_BITS);
        } else if pin == self.pins.latch_high() && falling {
            self.latched_high = self.bus_value(RomAddress::HIGH_BITS) as u8;
        } else if pin == self.pins.read_strobe() && falling {
            self.read_cycles += 1;
            if self.controller_drives_bus() {
                self.bus_conflicts += 1;
            }
        } else if pin == self.pins.reset() && level == Level::Low {
            self.latched_low = 0;
            self.latched_high = 0;
        }
        Ok(())
    }

    fn read_pin(&mut self, pin: u32) -> GpioResult<Level> {
        if let Some(bit) = pin.checked_sub(self.pins.bus_base())
            && bit < PinMap::BUS_WIDTH
            && self.modes.get(&pin) == Some(&PinMode::Input)
        {
            // Undriven bus lines are pulled down.
            if !self.cartridge_drives_bus() {
                return Ok(Level::Low);
            }
            return Ok(Level::from_bit((self.current_word() >> bit) & 1 == 1));
        }
        Ok(self.level(pin))
    }

    fn sleep_micros(&mut self, micros: u32) -> GpioResult<u32> {
        Ok(micros)
    }
}

//===========================================================================//


//===========================================================================//

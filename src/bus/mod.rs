//! The cartridge bus protocol: address latching, read cycles, and bank
//! selection over a multiplexed 16-line address/data bus.

use crate::addr::{Bank, RomAddress};
use crate::error::{DumpError, DumpResult};
use crate::gpio::{Gpio, GpioError, GpioResult, Level, PinMode};
use log::{debug, error, info, warn};

mod bank;
mod config;
mod latch;
mod lines;
mod read;

pub use bank::{BankSelector, LineBankSelector, SingleBank};
pub use config::{PinMap, Timing};
pub use latch::AddressHalf;
pub use lines::BusLineSet;

//===========================================================================//

/// Exclusive control of a cartridge connected through a GPIO driver.
///
/// A `CartBus` owns the driver and every pin of the interface.  Between
/// operations the bus is always in output mode with all strobes and latches
/// inactive.
pub struct CartBus<G: Gpio> {
    gpio: G,
    pins: PinMap,
    timing: Timing,
    lines: BusLineSet,
    selector: Box<dyn BankSelector>,
    bank: Option<Bank>,
}

impl<G: Gpio> CartBus<G> {
    /// Initializes the driver and puts every pin of the interface into its
    /// idle state: bus lines driven as outputs, latches low, read and write
    /// strobes high, reset high.  Then waits for the pins to settle.
    pub fn open(
        mut gpio: G,
        pins: PinMap,
        timing: Timing,
        selector: Box<dyn BankSelector>,
    ) -> DumpResult<CartBus<G>> {
        timing.validate()?;
        gpio.initialize().map_err(DumpError::DriverInit)?;
        info!(
            "initialized {} (bus on GPIO{}-{}, {})",
            gpio.description(),
            pins.bus_line(0),
            pins.bus_line(PinMap::BUS_WIDTH - 1),
            selector.description()
        );
        let mut bus = CartBus {
            gpio,
            pins,
            timing,
            lines: BusLineSet::new(pins),
            selector,
            bank: None,
        };
        if let Err(err) = bus.configure_pins() {
            bus.gpio.terminate();
            return Err(err);
        }
        Ok(bus)
    }

    fn configure_pins(&mut self) -> DumpResult<()> {
        self.lines.set_direction(&mut self.gpio, PinMode::Output)?;
        let idle_levels = [
            (self.pins.latch_low(), Level::Low),
            (self.pins.latch_high(), Level::Low),
            (self.pins.read_strobe(), Level::High),
            (self.pins.write_strobe(), Level::High),
            (self.pins.reset(), Level::High),
        ];
        for (pin, _) in idle_levels {
            self.gpio.set_pin_mode(pin, PinMode::Output)?;
        }
        for (pin, level) in idle_levels {
            self.gpio.write_pin(pin, level)?;
        }
        self.selector.configure(&mut self.gpio, self.pins)?;
        self.settle(self.timing.init_settle_us)?;
        debug!("pins configured");
        Ok(())
    }

    /// Pulses the reset line, clearing the cartridge's latched address.
    /// The next read re-selects its bank.
    pub fn reset(&mut self) -> DumpResult<()> {
        info!("resetting cartridge");
        let reset = self.pins.reset();
        self.gpio.write_pin(reset, Level::Low)?;
        let pulse = self.settle(self.timing.reset_pulse_us);
        self.gpio.write_pin(reset, Level::High)?;
        pulse?;
        self.bank = None;
        self.settle(self.timing.init_settle_us)
    }

    /// Returns the bus to its idle state and releases the driver, returning
    /// it to the caller.
    pub fn close(mut self) -> G {
        if let Err(err) = self.restore_safe_state() {
            error!("failed to idle the bus before closing: {err}");
        }
        self.gpio.terminate();
        info!("released {}", self.gpio.description());
        self.gpio
    }

    /// Returns the GPIO driver.
    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    /// Returns the GPIO driver mutably.  Touching any interface pin through
    /// this reference breaks the bus's idle-state guarantees.
    pub fn gpio_mut(&mut self) -> &mut G {
        &mut self.gpio
    }

    /// Returns the pin assignment of this bus.
    pub fn pins(&self) -> PinMap {
        self.pins
    }

    /// Returns the current direction of the bus lines, if known.
    pub fn bus_direction(&self) -> Option<PinMode> {
        self.lines.direction()
    }

    /// Returns the bank that is currently selected, if any.
    pub fn selected_bank(&self) -> Option<Bank> {
        self.bank
    }

    /// Returns the number of banks the bank selector can reach.
    pub fn bank_count(&self) -> u8 {
        self.selector.bank_count()
    }

    /// Makes `bank` the active bank for all later reads.
    pub fn select_bank(&mut self, bank: Bank) -> DumpResult<()> {
        let bank_count = self.selector.bank_count();
        if bank.index() >= bank_count {
            return Err(DumpError::UnsupportedBank { bank, bank_count });
        }
        debug!("selecting {bank}");
        self.bank = None;
        self.selector.select_bank(&mut self.gpio, self.pins, bank)?;
        self.bank = Some(bank);
        Ok(())
    }

    /// Reads the word at `address`: selects its bank if that changed,
    /// latches the low then the high half of the address, and performs a
    /// read cycle.  `address` must be word-aligned; otherwise nothing
    /// touches the bus.
    pub fn read_word_at(&mut self, address: RomAddress) -> DumpResult<u16> {
        if !address.is_word_aligned() {
            return Err(DumpError::UnalignedAddress {
                address: address.as_u32(),
            });
        }
        if self.bank != Some(address.bank()) {
            self.select_bank(address.bank())?;
        }
        self.latch(address, AddressHalf::Low)?;
        self.latch(address, AddressHalf::High)?;
        self.read()
    }

    fn settle(&mut self, micros: u32) -> DumpResult<()> {
        let elapsed = self.gpio.sleep_micros(micros)?;
        if elapsed > self.timing.settle_timeout_us {
            return Err(DumpError::SettleTimeout {
                requested_us: micros,
                elapsed_us: elapsed,
            });
        }
        Ok(())
    }

    fn abort_cycle(&mut self, err: DumpError) -> DumpError {
        warn!("aborting bus cycle: {err}");
        if let Err(cleanup) = self.restore_safe_state() {
            error!("failed to return the bus to its idle state: {cleanup}");
        }
        err
    }

    // Every step is attempted even if an earlier one fails.  The read strobe
    // goes first so the cartridge releases the bus before we drive it.
    fn restore_safe_state(&mut self) -> GpioResult<()> {
        let mut first_err: Option<GpioError> = None;
        let mut note = |result: GpioResult<()>| {
            if let Err(err) = result
                && first_err.is_none()
            {
                first_err = Some(err);
            }
        };
        note(self.gpio.write_pin(self.pins.read_strobe(), Level::High));
        note(self.gpio.write_pin(self.pins.write_strobe(), Level::High));
        note(self.lines.set_direction(&mut self.gpio, PinMode::Output));
        note(self.gpio.write_pin(self.pins.latch_low(), Level::Low));
        note(self.gpio.write_pin(self.pins.latch_high(), Level::Low));
        first_err.map_or(Ok(()), Err)
    }
}

//===========================================================================//


//===========================================================================//

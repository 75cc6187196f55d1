use super::PinMap;
use crate::addr::Bank;
use crate::gpio::{Gpio, GpioResult, Level, PinMode};

//===========================================================================//

/// A mechanism for choosing which bank of ROM the cartridge maps onto the
/// 24-bit latched address space.
///
/// The bus calls [`BankSelector::select_bank`] before the first read of a
/// dump and whenever the bank changes between consecutive addresses, always
/// before that address is latched.  The selected bank must stay in effect
/// until the next call.
pub trait BankSelector {
    /// Returns a human-readable description of this selector.
    fn description(&self) -> String;

    /// Returns the number of banks this selector can reach.
    fn bank_count(&self) -> u8;

    /// Configures any pins the selector needs.  Called once while the bus is
    /// being opened.
    fn configure(&mut self, gpio: &mut dyn Gpio, pins: PinMap)
    -> GpioResult<()>;

    /// Makes `bank` the active bank.  `bank` is always less than
    /// `bank_count()`.
    fn select_bank(
        &mut self,
        gpio: &mut dyn Gpio,
        pins: PinMap,
        bank: Bank,
    ) -> GpioResult<()>;
}

//===========================================================================//

/// The reference wiring, which has no bank-select mechanism and can only
/// reach the first bank.
pub struct SingleBank;

impl BankSelector for SingleBank {
    fn description(&self) -> String {
        "single bank".to_string()
    }

    fn bank_count(&self) -> u8 {
        1
    }

    fn configure(
        &mut self,
        _gpio: &mut dyn Gpio,
        _pins: PinMap,
    ) -> GpioResult<()> {
        Ok(())
    }

    fn select_bank(
        &mut self,
        _gpio: &mut dyn Gpio,
        _pins: PinMap,
        bank: Bank,
    ) -> GpioResult<()> {
        debug_assert_eq!(bank, Bank::FIRST);
        Ok(())
    }
}

//===========================================================================//

/// Selects banks by driving the bank index, least significant bit first,
/// onto the dedicated bank-select lines `B+21` and `B+22`.
pub struct LineBankSelector;

impl BankSelector for LineBankSelector {
    fn description(&self) -> String {
        format!("{} bank-select lines", PinMap::BANK_SELECT_LINES)
    }

    fn bank_count(&self) -> u8 {
        1 << PinMap::BANK_SELECT_LINES
    }

    fn configure(
        &mut self,
        gpio: &mut dyn Gpio,
        pins: PinMap,
    ) -> GpioResult<()> {
        for bit in 0..PinMap::BANK_SELECT_LINES {
            gpio.set_pin_mode(pins.bank_select(bit), PinMode::Output)?;
            gpio.write_pin(pins.bank_select(bit), Level::Low)?;
        }
        Ok(())
    }

    fn select_bank(
        &mut self,
        gpio: &mut dyn Gpio,
        pins: PinMap,
        bank: Bank,
    ) -> GpioResult<()> {
        for bit in 0..PinMap::BANK_SELECT_LINES {
            let level = Level::from_bit((bank.index() >> bit) & 1 == 1);
            gpio.write_pin(pins.bank_select(bit), level)?;
        }
        Ok(())
    }
}

//===========================================================================//


//===========================================================================//

use super::{Gpio, GpioError, GpioResult, Level, PinMode};
use std::collections::{HashMap, HashSet};

//===========================================================================//

/// One call made against a [`MockGpio`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GpioEvent {
    /// `set_pin_mode(pin, mode)`
    SetMode(u32, PinMode),
    /// `write_pin(pin, level)`
    Write(u32, Level),
    /// `read_pin(pin)`
    Read(u32),
    /// `sleep_micros(micros)`
    Sleep(u32),
}

//===========================================================================//

/// A recording GPIO driver for tests.
///
/// Every call is appended to an event log, and the most recent mode and level
/// of each pin are tracked.  By default, reading pin `n` returns `n % 2`.
pub struct MockGpio {
    events: Vec<GpioEvent>,
    modes: HashMap<u32, PinMode>,
    levels: HashMap<u32, Level>,
    reader: Box<dyn FnMut(u32) -> Level>,
    fail_initialize: bool,
    failing_reads: HashSet<u32>,
    failing_writes: HashSet<u32>,
    sleep_overrun: u32,
    terminated: bool,
}

impl MockGpio {
    /// Returns a new mock whose reads return the parity of the pin index.
    pub fn new() -> MockGpio {
        MockGpio::with_reader(|pin| Level::from_bit(pin % 2 == 1))
    }

    /// Returns a new mock whose reads are answered by `reader`.
    pub fn with_reader<F>(reader: F) -> MockGpio
    where
        F: FnMut(u32) -> Level + 'static,
    {
        MockGpio {
            events: Vec::new(),
            modes: HashMap::new(),
            levels: HashMap::new(),
            reader: Box::new(reader),
            fail_initialize: false,
            failing_reads: HashSet::new(),
            failing_writes: HashSet::new(),
            sleep_overrun: 0,
            terminated: false,
        }
    }

    /// Makes `initialize` report a driver fault.
    pub fn fail_initialize(mut self) -> MockGpio {
        self.fail_initialize = true;
        self
    }

    /// Makes every read of `pin` report a driver fault.
    pub fn fail_reads_from(mut self, pin: u32) -> MockGpio {
        self.failing_reads.insert(pin);
        self
    }

    /// Makes every later write to `pin` report a driver fault.  A failed
    /// write leaves the pin's level unchanged.
    pub fn fail_writes_to(&mut self, pin: u32) {
        self.failing_writes.insert(pin);
    }

    /// Makes every later sleep report that it took `extra` microseconds
    /// longer than requested.
    pub fn set_sleep_overrun(&mut self, extra: u32) {
        self.sleep_overrun = extra;
    }

    /// Returns every call made so far, in order.
    pub fn events(&self) -> &[GpioEvent] {
        &self.events
    }

    /// Forgets the calls made so far, keeping pin state.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Returns the most recently set mode of `pin`, if any.
    pub fn mode(&self, pin: u32) -> Option<PinMode> {
        self.modes.get(&pin).copied()
    }

    /// Returns the most recently written level of `pin`, if any.
    pub fn level(&self, pin: u32) -> Option<Level> {
        self.levels.get(&pin).copied()
    }

    /// Returns every level written to `pin`, in order.
    pub fn writes_to(&self, pin: u32) -> Vec<Level> {
        self.events
            .iter()
            .filter_map(|event| match *event {
                GpioEvent::Write(p, level) if p == pin => Some(level),
                _ => None,
            })
            .collect()
    }

    /// Returns true once `terminate` has been called.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl Default for MockGpio {
    fn default() -> MockGpio {
        MockGpio::new()
    }
}

impl Gpio for MockGpio {
    fn description(&self) -> String {
        "mock GPIO".to_string()
    }

    fn initialize(&mut self) -> GpioResult<()> {
        if self.fail_initialize {
            Err(GpioError::new("mock driver refused to initialize"))
        } else {
            Ok(())
        }
    }

    fn terminate(&mut self) {
        self.terminated = true;
    }

    fn set_pin_mode(&mut self, pin: u32, mode: PinMode) -> GpioResult<()> {
        self.events.push(GpioEvent::SetMode(pin, mode));
        self.modes.insert(pin, mode);
        Ok(())
    }

    fn write_pin(&mut self, pin: u32, level: Level) -> GpioResult<()> {
        self.events.push(GpioEvent::Write(pin, level));
        if self.failing_writes.contains(&pin) {
            return Err(GpioError::on_pin(pin, "mock write fault"));
        }
        self.levels.insert(pin, level);
        Ok(())
    }

    fn read_pin(&mut self, pin: u32) -> GpioResult<Level> {
        self.events.push(GpioEvent::Read(pin));
        if self.failing_reads.contains(&pin) {
            return Err(GpioError::on_pin(pin, "mock read fault"));
        }
        Ok((self.reader)(pin))
    }

    fn sleep_micros(&mut self, micros: u32) -> GpioResult<u32> {
        self.events.push(GpioEvent::Sleep(micros));
        Ok(micros.saturating_add(self.sleep_overrun))
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{GpioEvent, MockGpio};
    use crate::gpio::{Gpio, Level, PinMode};

    #[test]
    fn records_calls() {
        let mut gpio = MockGpio::new();
        gpio.set_pin_mode(18, PinMode::Output).unwrap();
        gpio.write_pin(18, Level::High).unwrap();
        assert_eq!(gpio.read_pin(3), Ok(Level::High));
        assert_eq!(gpio.read_pin(4), Ok(Level::Low));
        assert_eq!(gpio.sleep_micros(7), Ok(7));
        assert_eq!(
            gpio.events(),
            &[
                GpioEvent::SetMode(18, PinMode::Output),
                GpioEvent::Write(18, Level::High),
                GpioEvent::Read(3),
                GpioEvent::Read(4),
                GpioEvent::Sleep(7),
            ]
        );
        assert_eq!(gpio.mode(18), Some(PinMode::Output));
        assert_eq!(gpio.level(18), Some(Level::High));
        assert_eq!(gpio.mode(19), None);
    }

    #[test]
    fn injected_faults() {
        let mut gpio = MockGpio::new().fail_initialize().fail_reads_from(5);
        assert!(gpio.initialize().is_err());
        assert!(gpio.read_pin(5).is_err());
        assert!(gpio.read_pin(6).is_ok());
        gpio.write_pin(7, Level::High).unwrap();
        gpio.fail_writes_to(7);
        assert!(gpio.write_pin(7, Level::Low).is_err());
        assert_eq!(gpio.level(7), Some(Level::High));
    }
}

//===========================================================================//

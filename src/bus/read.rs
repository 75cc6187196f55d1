use super::CartBus;
use crate::error::DumpResult;
use crate::gpio::{Gpio, Level, PinMode};

//===========================================================================//

impl<G: Gpio> CartBus<G> {
    /// Performs one read cycle and returns the word the cartridge drove onto
    /// the bus for the currently latched address.
    ///
    /// The bus is switched to input, the read strobe is asserted for the
    /// read settle delay, all sixteen lines are sampled, the strobe is
    /// released, and the bus is switched back to output.  Whether or not the
    /// cycle succeeds, the bus is left in output mode with the read strobe
    /// inactive.
    pub fn read(&mut self) -> DumpResult<u16> {
        self.read_steps().map_err(|err| self.abort_cycle(err))
    }

    fn read_steps(&mut self) -> DumpResult<u16> {
        let strobe = self.pins.read_strobe();
        self.lines.set_direction(&mut self.gpio, PinMode::Input)?;
        self.gpio.write_pin(strobe, Level::Low)?;
        self.settle(self.timing.read_settle_us)?;
        let word = self.lines.sample_bits(&mut self.gpio)?;
        self.gpio.write_pin(strobe, Level::High)?;
        self.lines.set_direction(&mut self.gpio, PinMode::Output)?;
        Ok(word)
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use crate::bus::{CartBus, PinMap, SingleBank, Timing};
    use crate::error::DumpError;
    use crate::gpio::{GpioEvent, Level, MockGpio, PinMode};

    fn open_bus(gpio: MockGpio, timing: Timing) -> CartBus<MockGpio> {
        let mut bus = CartBus::open(
            gpio,
            PinMap::default(),
            timing,
            Box::new(SingleBank),
        )
        .unwrap();
        bus.gpio_mut().clear_events();
        bus
    }

    fn assert_safe_state(bus: &CartBus<MockGpio>) {
        let pins = PinMap::default();
        assert_eq!(bus.bus_direction(), Some(PinMode::Output));
        for pin in pins.bus_lines() {
            assert_eq!(bus.gpio().mode(pin), Some(PinMode::Output));
        }
        assert_eq!(bus.gpio().level(pins.read_strobe()), Some(Level::High));
    }

    #[test]
    fn read_samples_parity_pattern() {
        let mut bus = open_bus(MockGpio::new(), Timing::default());
        assert_eq!(bus.read().unwrap(), 0xaaaa);
        assert_safe_state(&bus);
    }

    #[test]
    fn read_cycle_order() {
        let pins = PinMap::default();
        let mut bus = open_bus(MockGpio::new(), Timing::default());
        bus.read().unwrap();
        let events = bus.gpio().events();
        assert_eq!(events.len(), 16 + 1 + 1 + 16 + 1 + 16);
        assert!(
            events[..16]
                .iter()
                .all(|e| matches!(e, GpioEvent::SetMode(_, PinMode::Input)))
        );
        assert_eq!(events[16], GpioEvent::Write(pins.read_strobe(), Level::Low));
        assert_eq!(events[17], GpioEvent::Sleep(1));
        assert!(events[18..34].iter().all(|e| matches!(e, GpioEvent::Read(_))));
        assert_eq!(
            events[34],
            GpioEvent::Write(pins.read_strobe(), Level::High)
        );
        assert!(
            events[35..]
                .iter()
                .all(|e| matches!(e, GpioEvent::SetMode(_, PinMode::Output)))
        );
    }

    #[test]
    fn read_restores_bus_after_fault() {
        let pins = PinMap::default();
        let gpio = MockGpio::new().fail_reads_from(pins.bus_line(7));
        let mut bus = open_bus(gpio, Timing::default());
        let result = bus.read();
        assert!(matches!(result, Err(DumpError::Io(_))));
        assert_safe_state(&bus);
    }

    #[test]
    fn read_restores_bus_after_timeout() {
        let pins = PinMap::default();
        let mut bus = open_bus(MockGpio::new(), Timing::default());
        bus.gpio_mut().set_sleep_overrun(20_000);
        let result = bus.read();
        assert!(matches!(
            result,
            Err(DumpError::SettleTimeout { requested_us: 1, elapsed_us: 20_001 })
        ));
        assert_safe_state(&bus);
        let sampled = GpioEvent::Read(pins.bus_line(0));
        assert!(!bus.gpio().events().contains(&sampled));
    }
}

//===========================================================================//

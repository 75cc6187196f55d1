use super::PinMap;
use crate::gpio::{Gpio, GpioResult, Level, PinMode};

//===========================================================================//

/// The sixteen multiplexed address/data lines, switched as one unit.
///
/// All sixteen lines always share one direction.  While a direction change
/// is in progress (or after one failed part-way) the direction is unknown,
/// and only another `set_direction` call is allowed.
pub struct BusLineSet {
    pins: PinMap,
    direction: Option<PinMode>,
}

impl BusLineSet {
    /// Returns the bus lines of `pins`, in an unknown direction.
    pub fn new(pins: PinMap) -> BusLineSet {
        BusLineSet { pins, direction: None }
    }

    /// Returns the current direction of the bus, or `None` if it is unknown.
    pub fn direction(&self) -> Option<PinMode> {
        self.direction
    }

    /// Switches every bus line to `mode`.
    pub fn set_direction<G: Gpio + ?Sized>(
        &mut self,
        gpio: &mut G,
        mode: PinMode,
    ) -> GpioResult<()> {
        self.direction = None;
        for pin in self.pins.bus_lines() {
            gpio.set_pin_mode(pin, mode)?;
        }
        self.direction = Some(mode);
        Ok(())
    }

    /// Drives bus line `i` with bit `bit_shift + i` of `value`, for each `i`
    /// in `0..bit_count`.  Lines at and above `bit_count` are left alone.
    ///
    /// Panics if the bus is not in output mode.
    pub fn drive_bits<G: Gpio + ?Sized>(
        &self,
        gpio: &mut G,
        value: u32,
        bit_count: u32,
        bit_shift: u32,
    ) -> GpioResult<()> {
        self.expect_direction(PinMode::Output);
        assert!(bit_count <= PinMap::BUS_WIDTH);
        for bit in 0..bit_count {
            let level = Level::from_bit((value >> (bit_shift + bit)) & 1 == 1);
            gpio.write_pin(self.pins.bus_line(bit), level)?;
        }
        Ok(())
    }

    /// Samples all sixteen bus lines; line `i` becomes bit `i` of the result.
    ///
    /// Panics if the bus is not in input mode.
    pub fn sample_bits<G: Gpio + ?Sized>(
        &self,
        gpio: &mut G,
    ) -> GpioResult<u16> {
        self.expect_direction(PinMode::Input);
        let mut word = 0u16;
        for bit in 0..PinMap::BUS_WIDTH {
            if gpio.read_pin(self.pins.bus_line(bit))?.is_high() {
                word |= 1 << bit;
            }
        }
        Ok(word)
    }

    fn expect_direction(&self, expected: PinMode) {
        match self.direction {
            Some(mode) if mode == expected => {}
            Some(mode) => panic!(
                "invalid bus mode transition: operation needs {expected} \
                 mode, but the bus is in {mode} mode"
            ),
            None => panic!(
                "invalid bus mode transition: operation needs {expected} \
                 mode, but the bus direction is unknown"
            ),
        }
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::BusLineSet;
    use crate::bus::PinMap;
    use crate::gpio::{GpioEvent, Level, MockGpio, PinMode};

    #[test]
    fn set_direction_is_uniform() {
        let pins = PinMap::default();
        let mut gpio = MockGpio::new();
        let mut lines = BusLineSet::new(pins);
        assert_eq!(lines.direction(), None);
        for mode in [PinMode::Output, PinMode::Input, PinMode::Output] {
            lines.set_direction(&mut gpio, mode).unwrap();
            assert_eq!(lines.direction(), Some(mode));
            for pin in pins.bus_lines() {
                assert_eq!(gpio.mode(pin), Some(mode));
            }
        }
    }

    #[test]
    fn drive_bits_with_shift() {
        let pins = PinMap::default();
        let mut gpio = MockGpio::new();
        let mut lines = BusLineSet::new(pins);
        lines.set_direction(&mut gpio, PinMode::Output).unwrap();
        gpio.clear_events();
        lines.drive_bits(&mut gpio, 0x00a50000, 8, 16).unwrap();
        assert_eq!(gpio.events().len(), 8);
        let driven: Vec<Level> =
            (0..8).filter_map(|bit| gpio.level(pins.bus_line(bit))).collect();
        assert_eq!(
            driven,
            [true, false, true, false, false, true, false, true]
                .map(Level::from_bit)
        );
        assert_eq!(gpio.level(pins.bus_line(8)), None);
    }

    #[test]
    fn sample_bits_packs_lines() {
        let pins = PinMap::default();
        let mut gpio = MockGpio::new();
        let mut lines = BusLineSet::new(pins);
        lines.set_direction(&mut gpio, PinMode::Input).unwrap();
        gpio.clear_events();
        assert_eq!(lines.sample_bits(&mut gpio), Ok(0xaaaa));
        assert_eq!(gpio.events()[0], GpioEvent::Read(pins.bus_line(0)));
        assert_eq!(gpio.events().len(), 16);
    }

    #[test]
    #[should_panic(expected = "invalid bus mode transition")]
    fn drive_while_input_panics() {
        let mut gpio = MockGpio::new();
        let mut lines = BusLineSet::new(PinMap::default());
        lines.set_direction(&mut gpio, PinMode::Input).unwrap();
        let _ = lines.drive_bits(&mut gpio, 0, 16, 0);
    }

    #[test]
    #[should_panic(expected = "invalid bus mode transition")]
    fn sample_before_direction_panics() {
        let mut gpio = MockGpio::new();
        let lines = BusLineSet::new(PinMap::default());
        let _ = lines.sample_bits(&mut gpio);
    }
}

//===========================================================================//

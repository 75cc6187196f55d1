use super::{Gpio, GpioError, GpioResult, Level, PinMode};
use rppal::gpio as pi;
use std::collections::HashMap;
use std::time::{Duration, Instant};

//===========================================================================//

// Waits shorter than this busy-spin instead of sleeping.
const SPIN_LIMIT_MICROS: u32 = 200;

//===========================================================================//

/// The Raspberry Pi GPIO driver, addressing pins by BCM number.
pub struct RpiGpio {
    gpio: Option<pi::Gpio>,
    pins: HashMap<u32, pi::IoPin>,
}

impl RpiGpio {
    /// Returns a driver that has not been initialized yet.
    pub fn new() -> RpiGpio {
        RpiGpio { gpio: None, pins: HashMap::new() }
    }

    fn pin_mut(&mut self, pin: u32) -> GpioResult<&mut pi::IoPin> {
        self.pins
            .get_mut(&pin)
            .ok_or_else(|| GpioError::on_pin(pin, "pin was never configured"))
    }
}

impl Default for RpiGpio {
    fn default() -> RpiGpio {
        RpiGpio::new()
    }
}

fn to_rppal_mode(mode: PinMode) -> pi::Mode {
    match mode {
        PinMode::Input => pi::Mode::Input,
        PinMode::Output => pi::Mode::Output,
    }
}

impl Gpio for RpiGpio {
    fn description(&self) -> String {
        "Raspberry Pi GPIO".to_string()
    }

    fn initialize(&mut self) -> GpioResult<()> {
        let gpio =
            pi::Gpio::new().map_err(|err| GpioError::new(err.to_string()))?;
        self.gpio = Some(gpio);
        Ok(())
    }

    fn terminate(&mut self) {
        self.pins.clear();
        self.gpio = None;
    }

    fn set_pin_mode(&mut self, pin: u32, mode: PinMode) -> GpioResult<()> {
        if let Some(io_pin) = self.pins.get_mut(&pin) {
            io_pin.set_mode(to_rppal_mode(mode));
            return Ok(());
        }
        let gpio = self
            .gpio
            .as_ref()
            .ok_or_else(|| GpioError::new("driver is not initialized"))?;
        let bcm = u8::try_from(pin)
            .map_err(|_| GpioError::on_pin(pin, "no such pin"))?;
        let io_pin = gpio
            .get(bcm)
            .map_err(|err| GpioError::on_pin(pin, err.to_string()))?
            .into_io(to_rppal_mode(mode));
        self.pins.insert(pin, io_pin);
        Ok(())
    }

    fn write_pin(&mut self, pin: u32, level: Level) -> GpioResult<()> {
        let level = match level {
            Level::Low => pi::Level::Low,
            Level::High => pi::Level::High,
        };
        self.pin_mut(pin)?.write(level);
        Ok(())
    }

    fn read_pin(&mut self, pin: u32) -> GpioResult<Level> {
        match self.pin_mut(pin)?.read() {
            pi::Level::Low => Ok(Level::Low),
            pi::Level::High => Ok(Level::High),
        }
    }

    fn sleep_micros(&mut self, micros: u32) -> GpioResult<u32> {
        let start = Instant::now();
        let duration = Duration::from_micros(u64::from(micros));
        if micros >= SPIN_LIMIT_MICROS {
            std::thread::sleep(duration);
        }
        while start.elapsed() < duration {
            std::hint::spin_loop();
        }
        Ok(u32::try_from(start.elapsed().as_micros()).unwrap_or(u32::MAX))
    }
}

//===========================================================================//

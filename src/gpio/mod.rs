//! The pin-level I/O boundary between the bus protocol and the platform.

use std::error;
use std::fmt;

mod mock;
#[cfg(feature = "rpi")]
mod rpi;
mod sim;

pub use mock::{GpioEvent, MockGpio};
#[cfg(feature = "rpi")]
pub use rpi::RpiGpio;
pub use sim::SimCartridge;

//===========================================================================//

/// The electrical direction of a single pin.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PinMode {
    /// The pin is sampled by the controller.
    Input,
    /// The pin is driven by the controller.
    Output,
}

impl fmt::Display for PinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            PinMode::Input => f.write_str("input"),
            PinMode::Output => f.write_str("output"),
        }
    }
}

//===========================================================================//

/// The logic level of a single pin.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Level {
    /// Logic 0.
    #[default]
    Low,
    /// Logic 1.
    High,
}

impl Level {
    /// Returns `High` for a set bit and `Low` for a clear bit.
    pub fn from_bit(bit: bool) -> Level {
        if bit { Level::High } else { Level::Low }
    }

    /// Returns true if this is `High`.
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

//===========================================================================//

/// A specialized `Result` type for pin-level operations.
pub type GpioResult<T> = Result<T, GpioError>;

/// A fault reported by the platform GPIO driver.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GpioError {
    /// The pin that the failing operation addressed, if any.
    pub pin: Option<u32>,
    /// A human-readable description of the fault.
    pub message: String,
}

impl GpioError {
    /// Constructs an error that is not tied to any one pin.
    pub fn new(message: impl Into<String>) -> GpioError {
        GpioError { pin: None, message: message.into() }
    }

    /// Constructs an error for an operation on the given pin.
    pub fn on_pin(pin: u32, message: impl Into<String>) -> GpioError {
        GpioError { pin: Some(pin), message: message.into() }
    }
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.pin {
            Some(pin) => write!(f, "GPIO{pin}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl error::Error for GpioError {}

//===========================================================================//

/// A platform GPIO driver.
///
/// Pins are identified by their driver-level index (for a Raspberry Pi, the
/// BCM GPIO number).  The bus protocol only ever talks to hardware through
/// this trait, so any implementation (including a recording test double) can
/// stand in for the real driver.
pub trait Gpio {
    /// Returns a human-readable description of this driver.
    fn description(&self) -> String;

    /// Prepares the driver for use.  Called once, before any pin is
    /// configured.
    fn initialize(&mut self) -> GpioResult<()> {
        Ok(())
    }

    /// Releases the driver.  No other method may be called afterwards.
    fn terminate(&mut self) {}

    /// Sets the direction of a single pin.
    fn set_pin_mode(&mut self, pin: u32, mode: PinMode) -> GpioResult<()>;

    /// Drives an output pin to the given level.
    fn write_pin(&mut self, pin: u32, level: Level) -> GpioResult<()>;

    /// Samples the current level of a pin.
    fn read_pin(&mut self, pin: u32) -> GpioResult<Level>;

    /// Blocks the calling thread for at least `micros` microseconds, and
    /// returns the number of microseconds that actually elapsed.
    fn sleep_micros(&mut self, micros: u32) -> GpioResult<u32>;
}

impl<G: Gpio + ?Sized> Gpio for Box<G> {
    fn description(&self) -> String {
        (**self).description()
    }

    fn initialize(&mut self) -> GpioResult<()> {
        (**self).initialize()
    }

    fn terminate(&mut self) {
        (**self).terminate()
    }

    fn set_pin_mode(&mut self, pin: u32, mode: PinMode) -> GpioResult<()> {
        (**self).set_pin_mode(pin, mode)
    }

    fn write_pin(&mut self, pin: u32, level: Level) -> GpioResult<()> {
        (**self).write_pin(pin, level)
    }

    fn read_pin(&mut self, pin: u32) -> GpioResult<Level> {
        (**self).read_pin(pin)
    }

    fn sleep_micros(&mut self, micros: u32) -> GpioResult<u32> {
        (**self).sleep_micros(micros)
    }
}

//===========================================================================//


//===========================================================================//

//! Errors that can end a dump.

use crate::addr::{Bank, RangeFault};
use crate::gpio::GpioError;
use std::error;
use std::fmt;
use std::io;

//===========================================================================//

/// A specialized `Result` type for bus and dump operations.
pub type DumpResult<T> = Result<T, DumpError>;

//===========================================================================//

/// An error that terminates a dump.
///
/// Every variant is fatal to the current dump; a record is only produced for
/// a read cycle that completed without any of these.
#[derive(Debug)]
pub enum DumpError {
    /// The GPIO driver could not be initialized.  No pin was configured.
    DriverInit(GpioError),
    /// The requested range reaches an address beyond the end of ROM.  No
    /// latch or read was issued.
    AddressOutOfRange {
        /// The first requested address that lies beyond the end of ROM.
        address: u32,
    },
    /// The requested range ends before it starts.
    InvalidRange {
        /// The requested start address.
        start: u32,
        /// The requested end address.
        end: u32,
    },
    /// The requested address does not lie on a word boundary.
    UnalignedAddress {
        /// The misaligned address.
        address: u32,
    },
    /// The requested range needs a bank that the configured bank selector
    /// cannot reach.
    UnsupportedBank {
        /// The unreachable bank.
        bank: Bank,
        /// The number of banks the selector can reach.
        bank_count: u8,
    },
    /// A pin-level operation failed mid-cycle.  The bus was returned to
    /// output mode with its strobes inactive before this was reported.
    Io(GpioError),
    /// A settle delay overran its timeout.
    SettleTimeout {
        /// The delay that was requested, in microseconds.
        requested_us: u32,
        /// The delay that actually elapsed, in microseconds.
        elapsed_us: u32,
    },
    /// A timing parameter is below the minimum that the bus protocol needs.
    InvalidTiming(String),
    /// Writing a record to the output sink failed.
    Sink(io::Error),
}

impl fmt::Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DumpError::DriverInit(err) => {
                write!(f, "failed to initialize GPIO driver: {err}")
            }
            DumpError::AddressOutOfRange { address } => {
                write!(f, "address 0x{address:06X} is beyond the end of ROM")
            }
            DumpError::InvalidRange { start, end } => write!(
                f,
                "range end 0x{end:06X} is before its start 0x{start:06X}"
            ),
            DumpError::UnalignedAddress { address } => {
                write!(f, "address 0x{address:06X} is not word-aligned")
            }
            DumpError::UnsupportedBank { bank, bank_count } => write!(
                f,
                "{bank} cannot be selected (bank selector reaches {bank_count})"
            ),
            DumpError::Io(err) => write!(f, "GPIO failure: {err}"),
            DumpError::SettleTimeout { requested_us, elapsed_us } => write!(
                f,
                "settle delay of {requested_us}us took {elapsed_us}us"
            ),
            DumpError::InvalidTiming(message) => {
                write!(f, "invalid timing: {message}")
            }
            DumpError::Sink(err) => write!(f, "failed to write output: {err}"),
        }
    }
}

impl error::Error for DumpError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            DumpError::DriverInit(err) | DumpError::Io(err) => Some(err),
            DumpError::Sink(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GpioError> for DumpError {
    fn from(err: GpioError) -> DumpError {
        DumpError::Io(err)
    }
}

impl From<io::Error> for DumpError {
    fn from(err: io::Error) -> DumpError {
        DumpError::Sink(err)
    }
}

impl From<RangeFault> for DumpError {
    fn from(fault: RangeFault) -> DumpError {
        match fault {
            RangeFault::Unaligned(address) => {
                DumpError::UnalignedAddress { address }
            }
            RangeFault::Reversed { start, end } => {
                DumpError::InvalidRange { start, end }
            }
            RangeFault::OutOfRange(address) => {
                DumpError::AddressOutOfRange { address }
            }
        }
    }
}

//===========================================================================//


//===========================================================================//

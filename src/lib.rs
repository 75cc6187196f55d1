//! Dumps cartridge ROMs over a multiplexed 16-line address/data bus driven
//! through general-purpose I/O pins.

#![warn(missing_docs)]

pub mod addr;
pub mod bus;
pub mod dump;
pub mod error;
pub mod gpio;

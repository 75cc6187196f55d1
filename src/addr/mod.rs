//! Types for representing cartridge ROM addresses.

#[allow(clippy::module_inception)]
mod addr;
mod bank;
mod range;

pub use addr::RomAddress;
pub use bank::Bank;
pub use range::{RangeFault, RomRange, Words};

//===========================================================================//

/// The total addressable size of a cartridge ROM, in bytes (64 MB).
pub const MAX_ROM_SIZE: u32 = 0x400_0000;

/// The size of one bank of cartridge ROM, in bytes (16 MB).  This is the span
/// that the 24-bit latched address can reach without a bank change.
pub const ROM_BANK_SIZE: u32 = 0x100_0000;

/// The number of bytes transferred by one read cycle.
pub const WORD_SIZE: u32 = 2;

//===========================================================================//

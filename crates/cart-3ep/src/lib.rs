//! Bus-cycle-accurate emulator for the 3E+ cartridge bankswitching scheme.
//!
//! 3E+ (by Thomas Jentzsch, derived from Andrew Davie's DASH scheme) splits
//! the 4 KiB cartridge window into four 1 KiB banks, each independently
//! mapped to a 1 KiB ROM page or a 512-byte RAM page. RAM banks expose a
//! read area in the low half of the bank and a write alias in the high
//! half:
//!
//! - read `$x000`, write `$x200`
//! - read `$x400`, write `$x600`
//! - read `$x800`, write `$xA00`
//! - read `$xC00`, write `$xE00`
//!
//! Writes to hotspot `$3E` map a RAM page into a bank, writes to `$3F` a
//! ROM page; both are gated behind a one-way unlock latch armed by the
//! address sequence `$1FFC, $1FFD`.
//!
//! The driver stands in for the cartridge itself: it runs a hard real-time
//! polling loop against a [`cart_bus::CartridgeBus`], answering every read
//! within the console's own bus timing. There is no scheduler slack — the
//! loop holds interrupts disabled and busy-waits on the address lines.

mod bank;
mod cartridge;
mod driver;
mod unlock;

pub use bank::{BANK_COUNT, BankSlot, BankTable};
pub use cartridge::{
    CartridgeImage, CartridgeRam, RAM_PAGE_COUNT, RAM_PAGE_SIZE, RAM_SIZE, ROM_PAGE_SIZE,
};
pub use driver::ThreeEPlus;
pub use unlock::UnlockLatch;

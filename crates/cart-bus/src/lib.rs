//! Platform capability traits for cartridge bus emulation.
//!
//! A cartridge emulator answers the console from the far side of the
//! expansion connector: it samples the address and data lines, and drives
//! the data lines while serving a read. Everything register-specific lives
//! behind the [`CartridgeBus`] trait so the same scheme driver runs against
//! real GPIO banks or against a scripted [`TraceBus`] on the host.

mod bus;
mod critical;
mod trace;

pub use bus::CartridgeBus;
pub use critical::{InterruptControl, with_interrupts_disabled};
pub use trace::{BusEvent, TraceBus, TraceStep};

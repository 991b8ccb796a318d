//! The real-time bus-serving loop.
//!
//! One bus cycle: debounce the address lines until two consecutive samples
//! agree, feed the transition to the unlock latch, then either serve the
//! cartridge-data window (A12 high) or decode a hotspot write (A12 low,
//! banking unlocked). Reads are answered by driving the data lines until
//! the address changes; writes are captured by latching the last
//! fully-sampled data byte before the address changes.
//!
//! The loop runs with interrupts disabled for its whole lifetime. A delay
//! of more than a few bus cycles inside a serve window corrupts the
//! transfer, so the only suspension points are the busy-wait spins on the
//! address lines themselves.

use cart_bus::{CartridgeBus, InterruptControl, with_interrupts_disabled};

use crate::bank::{BankSlot, BankTable};
use crate::cartridge::{CartridgeImage, CartridgeRam};
use crate::unlock::UnlockLatch;

/// A12: set for the cartridge-data window, clear for the control region.
const DATA_WINDOW: u16 = 0x1000;

/// Address bits 10-11 select the bank slot.
const BANK_SHIFT: u16 = 10;

/// Within a RAM bank, this bit selects the write alias over the read area.
const WRITE_ALIAS: u16 = 0x0200;

/// Offset mask within a 512-byte RAM page.
const RAM_OFFSET: u16 = 0x01FF;

/// Offset mask within a 1 KiB ROM page.
const ROM_OFFSET: u16 = 0x03FF;

/// Hotspot: map a RAM page into a bank.
const HOTSPOT_RAM: u16 = 0x003E;

/// Hotspot: map a ROM page into a bank.
const HOTSPOT_ROM: u16 = 0x003F;

/// The 3E+ scheme emulator.
///
/// Owns the backing buffers and the banking state; consumes the bus
/// through the injected [`CartridgeBus`] capability.
pub struct ThreeEPlus {
    image: CartridgeImage,
    ram: CartridgeRam,
    banks: BankTable,
    unlock: UnlockLatch,
    /// Previous raw address sample, carried across bus cycles.
    addr_prev: u16,
    /// Previous stable address, for the unlock sequence check.
    last_addr: u16,
    /// Two-stage data latch: `data_latch` always holds the last
    /// fully-sampled byte, one sample behind `data_sample`.
    data_sample: u8,
    data_latch: u8,
}

impl ThreeEPlus {
    /// All four banks start on ROM page 0, banking locked.
    #[must_use]
    pub fn new(image: CartridgeImage, ram: CartridgeRam) -> Self {
        let banks = BankTable::new(image.page_count());
        Self {
            image,
            ram,
            banks,
            unlock: UnlockLatch::new(),
            addr_prev: 0,
            last_addr: 0,
            data_sample: 0,
            data_latch: 0,
        }
    }

    #[must_use]
    pub fn bank_table(&self) -> &BankTable {
        &self.banks
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.unlock.is_locked()
    }

    #[must_use]
    pub fn ram(&self) -> &[u8] {
        self.ram.as_bytes()
    }

    /// Serve the bus until power-down (or, in simulation, a halt request).
    ///
    /// Interrupts stay disabled for the whole run; the halt flag is
    /// consulted only between bus cycles, never inside a latch or drive
    /// window.
    pub fn run<B>(&mut self, bus: &mut B)
    where
        B: CartridgeBus + InterruptControl,
    {
        with_interrupts_disabled(bus, |bus| self.serve(bus));
    }

    fn serve<B: CartridgeBus>(&mut self, bus: &mut B) {
        loop {
            let Some(addr) = self.stable_address(bus) else {
                break;
            };

            self.unlock.observe(self.last_addr, addr);
            self.last_addr = addr;

            if addr & DATA_WINDOW != 0 {
                self.serve_data_window(bus, addr);
            } else if !self.unlock.is_locked() {
                self.hotspot_write(bus, addr);
            }
        }
    }

    /// Debounce the address lines: accept a value once two consecutive
    /// samples agree. Physical address transitions are not instantaneous,
    /// so a single sample may catch the lines mid-flight.
    ///
    /// Returns `None` on a halt request; on hardware this spins forever if
    /// the bus never settles, there being no other work to do.
    fn stable_address<B: CartridgeBus>(&mut self, bus: &mut B) -> Option<u16> {
        if bus.halt_requested() {
            return None;
        }
        let mut addr = bus.sample_address();
        while addr != self.addr_prev {
            if bus.halt_requested() {
                return None;
            }
            self.addr_prev = addr;
            addr = bus.sample_address();
        }
        Some(addr)
    }

    /// A read or RAM write inside the cartridge-data window.
    fn serve_data_window<B: CartridgeBus>(&mut self, bus: &mut B, addr: u16) {
        let bank = usize::from((addr >> BANK_SHIFT) & 0b11);
        match self.banks.slot(bank) {
            BankSlot::Ram { base } if addr & WRITE_ALIAS != 0 => {
                let value = self.latch_data(bus, addr);
                self.ram.as_bytes_mut()[base + usize::from(addr & RAM_OFFSET)] = value;
            }
            BankSlot::Ram { base } => {
                let value = self.ram.as_bytes()[base + usize::from(addr & RAM_OFFSET)];
                self.drive_until_change(bus, addr, value);
            }
            BankSlot::Rom { base } => {
                let value = self.image.as_bytes()[base + usize::from(addr & ROM_OFFSET)];
                self.drive_until_change(bus, addr, value);
            }
        }
    }

    /// A control write below the data window, reaching a hotspot or not.
    ///
    /// The data byte splits as `bbpp_pppp`: bits 6-7 select the bank, bits
    /// 0-5 the page. Non-hotspot addresses still consume the cycle.
    fn hotspot_write<B: CartridgeBus>(&mut self, bus: &mut B, addr: u16) {
        let value = self.latch_data(bus, addr);
        let bank = usize::from((value >> 6) & 0b11);
        let page = value & 0x3F;
        match addr {
            HOTSPOT_RAM => self.banks.select_ram(bank, page),
            HOTSPOT_ROM => self.banks.select_rom(bank, page),
            _ => {}
        }
    }

    /// Capture the data bus for a write.
    ///
    /// The data lines are only valid for part of the address window, so
    /// keep sampling until the address changes and use the second-to-last
    /// sample — the last one fully taken before the transition. The latch
    /// registers persist across cycles, matching the hardware loop.
    fn latch_data<B: CartridgeBus>(&mut self, bus: &mut B, addr: u16) -> u8 {
        while bus.sample_address() == addr {
            self.data_latch = self.data_sample;
            self.data_sample = bus.sample_data();
        }
        self.data_latch
    }

    /// Answer a read: drive the byte while the address holds, then release
    /// the bus. Releasing before the next cycle is mandatory — leaving the
    /// drivers on conflicts with the console once it drives the same lines.
    fn drive_until_change<B: CartridgeBus>(&mut self, bus: &mut B, addr: u16, value: u8) {
        bus.drive_data(value);
        while bus.sample_address() == addr {}
        bus.release_data();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_bus::{TraceBus, TraceStep};

    const HOLD: u32 = 6;

    /// Image where every byte carries its page number.
    fn paged_image(pages: usize) -> CartridgeImage {
        let data = (0..pages * 1024).map(|i| (i / 1024) as u8).collect();
        CartridgeImage::new(data).unwrap()
    }

    fn driver(pages: usize) -> ThreeEPlus {
        ThreeEPlus::new(paged_image(pages), CartridgeRam::new())
    }

    fn unlock_steps() -> Vec<TraceStep> {
        vec![
            TraceStep::new(0x1FFC, 0x00, HOLD),
            TraceStep::new(0x1FFD, 0x00, HOLD),
        ]
    }

    #[test]
    fn serves_rom_page_zero_reads_at_reset() {
        let mut cart = driver(8);
        let mut bus = TraceBus::new(vec![
            TraceStep::new(0x1000, 0x00, HOLD),
            TraceStep::new(0x1400, 0x00, HOLD),
            TraceStep::new(0x1800, 0x00, HOLD),
            TraceStep::new(0x1C00, 0x00, HOLD),
        ]);
        cart.run(&mut bus);
        // All four banks map ROM page 0.
        assert_eq!(bus.driven_bytes(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn rom_reads_use_the_full_kilobyte_offset() {
        // $1FFC is bank 3, offset $3FC within the page.
        let mut image = vec![0u8; 8 * 1024];
        image[0x3FC] = 0x5A;
        let mut cart = ThreeEPlus::new(CartridgeImage::new(image).unwrap(), CartridgeRam::new());
        let mut bus = TraceBus::new(vec![TraceStep::new(0x1FFC, 0x00, HOLD)]);
        cart.run(&mut bus);
        assert_eq!(bus.driven_bytes(), vec![0x5A]);
    }

    #[test]
    fn hotspot_rom_write_switches_a_bank_after_unlock() {
        let mut cart = driver(8);
        let mut steps = unlock_steps();
        steps.push(TraceStep::new(0x003F, 0b0100_0011, HOLD));
        steps.push(TraceStep::new(0x1400, 0x00, HOLD));
        let mut bus = TraceBus::new(steps);
        cart.run(&mut bus);

        assert_eq!(cart.bank_table().slot(1), BankSlot::Rom { base: 3 * 1024 });
        // Two unlock-address reads from page 0, then the bank 1 read.
        assert_eq!(bus.driven_bytes(), vec![0, 0, 3]);
    }

    #[test]
    fn ram_write_alias_then_read_round_trips() {
        let mut cart = driver(8);
        let mut steps = unlock_steps();
        steps.push(TraceStep::new(0x003E, 0b0000_0010, HOLD));
        steps.push(TraceStep::new(0x1205, 0x7F, HOLD));
        steps.push(TraceStep::new(0x1005, 0x00, HOLD));
        let mut bus = TraceBus::new(steps);
        cart.run(&mut bus);

        assert_eq!(cart.bank_table().slot(0), BankSlot::Ram { base: 2 * 512 });
        assert_eq!(cart.ram()[2 * 512 + 5], 0x7F);
        assert_eq!(bus.driven_bytes(), vec![0, 0, 0x7F]);
    }

    #[test]
    fn hotspots_are_ignored_while_locked() {
        let mut cart = driver(8);
        let before = *cart.bank_table();
        let mut bus = TraceBus::new(vec![
            TraceStep::new(0x003F, 0b0100_0011, HOLD),
            TraceStep::new(0x003E, 0b0000_0010, HOLD),
        ]);
        cart.run(&mut bus);

        assert!(cart.is_locked());
        assert_eq!(*cart.bank_table(), before);
        assert!(bus.events().is_empty());
    }

    #[test]
    fn rom_page_selection_wraps_modulo_page_count() {
        let mut cart = driver(8);
        let mut steps = unlock_steps();
        // Page 8 + 3 behaves exactly like page 3.
        steps.push(TraceStep::new(0x003F, 0b0100_1011, HOLD));
        let mut bus = TraceBus::new(steps);
        cart.run(&mut bus);
        assert_eq!(cart.bank_table().slot(1), BankSlot::Rom { base: 3 * 1024 });
    }

    #[test]
    fn interrupts_masked_for_the_whole_run() {
        let mut cart = driver(1);
        let mut bus = TraceBus::new(vec![TraceStep::new(0x1000, 0x00, HOLD)]);
        cart.run(&mut bus);
        assert!(bus.interrupts_were_masked());
        assert!(!bus.interrupts_masked());
    }

    #[test]
    fn reads_release_the_bus_before_the_next_drive() {
        use cart_bus::BusEvent;

        let mut cart = driver(8);
        let mut bus = TraceBus::new(vec![
            TraceStep::new(0x1000, 0x00, HOLD),
            TraceStep::new(0x1400, 0x00, HOLD),
            TraceStep::new(0x1800, 0x00, HOLD),
        ]);
        cart.run(&mut bus);

        let events = bus.events();
        assert_eq!(events.len(), 6);
        for pair in events.chunks(2) {
            assert!(matches!(pair[0], BusEvent::Drive(_)));
            assert_eq!(pair[1], BusEvent::Release);
        }
    }
}

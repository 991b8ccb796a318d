//! The bank table: four slots mapping the cartridge window into ROM or RAM.

use crate::cartridge::{RAM_PAGE_COUNT, RAM_PAGE_SIZE, ROM_PAGE_SIZE};

/// Number of bank slots in the cartridge window.
pub const BANK_COUNT: usize = 4;

/// One bank slot: a page base offset into the ROM image or the RAM buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankSlot {
    Rom { base: usize },
    Ram { base: usize },
}

/// The four bank slots plus the image geometry needed to wrap page numbers.
///
/// Page selections out of range are wrapped by modulo, not rejected — the
/// hardware has no channel to report a fault, so a wild control write lands
/// on a valid page instead. Bank indices wrap to the four slots the same
/// way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankTable {
    slots: [BankSlot; BANK_COUNT],
    rom_page_count: usize,
}

impl BankTable {
    /// All slots start on ROM page 0.
    #[must_use]
    pub fn new(rom_page_count: usize) -> Self {
        Self {
            slots: [BankSlot::Rom { base: 0 }; BANK_COUNT],
            rom_page_count,
        }
    }

    #[must_use]
    pub fn slot(&self, bank: usize) -> BankSlot {
        self.slots[bank & (BANK_COUNT - 1)]
    }

    #[must_use]
    pub fn slots(&self) -> [BankSlot; BANK_COUNT] {
        self.slots
    }

    /// Map `bank` to ROM page `page % rom_page_count`.
    pub fn select_rom(&mut self, bank: usize, page: u8) {
        let page = usize::from(page) % self.rom_page_count;
        self.slots[bank & (BANK_COUNT - 1)] = BankSlot::Rom {
            base: page * ROM_PAGE_SIZE,
        };
    }

    /// Map `bank` to RAM page `page % 64`.
    pub fn select_ram(&mut self, bank: usize, page: u8) {
        let page = usize::from(page) % RAM_PAGE_COUNT;
        self.slots[bank & (BANK_COUNT - 1)] = BankSlot::Ram {
            base: page * RAM_PAGE_SIZE,
        };
    }
}

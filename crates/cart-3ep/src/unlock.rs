//! The one-way unlock latch gating hotspot writes.

/// Low 13 bits of the first address in the unlock sequence.
const UNLOCK_FIRST: u16 = 0x1FFC;

/// Low 13 bits of the second address in the unlock sequence.
const UNLOCK_SECOND: u16 = 0x1FFD;

/// Only 13 address bits reach the cartridge connector.
const ADDRESS_MASK: u16 = 0x1FFF;

/// Banking starts locked and unlocks at most once per session.
///
/// The latch watches every stable address transition, including ones
/// produced by ordinary reads. A program whose execution happens to touch
/// `$1FFC` then `$1FFD` unlocks banking exactly as a deliberate unlock
/// sequence would. That is faithful hardware behavior, not a bug to fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockLatch {
    locked: bool,
}

impl UnlockLatch {
    #[must_use]
    pub fn new() -> Self {
        Self { locked: true }
    }

    /// Feed one stable address transition into the latch.
    pub fn observe(&mut self, previous: u16, current: u16) {
        if previous & ADDRESS_MASK == UNLOCK_FIRST && current & ADDRESS_MASK == UNLOCK_SECOND {
            self.locked = false;
        }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Default for UnlockLatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_locked() {
        assert!(UnlockLatch::new().is_locked());
    }

    #[test]
    fn unlocks_on_the_sequence() {
        let mut latch = UnlockLatch::new();
        latch.observe(0x1FFC, 0x1FFD);
        assert!(!latch.is_locked());
    }

    #[test]
    fn compares_only_the_low_thirteen_bits() {
        let mut latch = UnlockLatch::new();
        latch.observe(0xFFFC, 0xFFFD);
        assert!(!latch.is_locked());
    }

    #[test]
    fn ignores_the_pair_out_of_order() {
        let mut latch = UnlockLatch::new();
        latch.observe(0x1FFD, 0x1FFC);
        assert!(latch.is_locked());
    }

    #[test]
    fn requires_consecutive_addresses() {
        let mut latch = UnlockLatch::new();
        latch.observe(0x1FFC, 0x1234);
        latch.observe(0x1234, 0x1FFD);
        assert!(latch.is_locked());
    }

    #[test]
    fn never_relocks() {
        let mut latch = UnlockLatch::new();
        latch.observe(0x1FFC, 0x1FFD);
        latch.observe(0x1FFD, 0x0000);
        latch.observe(0x0000, 0x1FFC);
        assert!(!latch.is_locked());
    }
}

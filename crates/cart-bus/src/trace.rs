//! Scripted bus for host-side simulation.
//!
//! A trace is a sequence of bus states, each held on the lines for a fixed
//! number of address samples. The driver's debounce needs two consecutive
//! equal samples to accept an address, and its latch needs two loop
//! iterations to capture a data byte, so meaningful steps should be held
//! for at least 5 samples (one is consumed by the previous cycle's
//! wait-for-change spin).

use crate::bus::CartridgeBus;
use crate::critical::InterruptControl;

/// One bus state: the console holds `address` (and, for writes, `data`) on
/// the lines for `hold` consecutive address samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceStep {
    pub address: u16,
    pub data: u8,
    pub hold: u32,
}

impl TraceStep {
    #[must_use]
    pub const fn new(address: u16, data: u8, hold: u32) -> Self {
        Self {
            address,
            data,
            hold,
        }
    }
}

/// A data-bus direction event recorded by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// Output drivers enabled with this value on the lines.
    Drive(u8),
    /// Output drivers disabled.
    Release,
}

/// Replays a synthetic bus trace and records what the emulator drives.
///
/// Address sampling paces the simulation: every `sample_address` call
/// consumes one sample of the current step; `sample_data` reads the current
/// step without advancing. Once the trace is exhausted, `halt_requested`
/// turns true and the address lines alternate between two values so any
/// in-flight wait-for-change spin terminates.
pub struct TraceBus {
    steps: Vec<TraceStep>,
    index: usize,
    remaining: u32,
    settle_toggle: bool,
    events: Vec<BusEvent>,
    driving: Option<u8>,
    interrupts_masked: bool,
    interrupts_were_masked: bool,
}

impl TraceBus {
    /// Build a bus from a trace.
    ///
    /// A quiet trailing step (address `0x0000`, a hotspot no-op in every
    /// lock state) is appended so that trace exhaustion never lands inside
    /// a latch window that would have a side effect.
    ///
    /// # Panics
    ///
    /// Panics if any step has a zero hold count.
    #[must_use]
    pub fn new(mut steps: Vec<TraceStep>) -> Self {
        assert!(
            steps.iter().all(|step| step.hold > 0),
            "every trace step must be held for at least one sample"
        );
        steps.push(TraceStep::new(0x0000, 0x00, 8));
        let remaining = steps[0].hold;
        Self {
            steps,
            index: 0,
            remaining,
            settle_toggle: false,
            events: Vec::new(),
            driving: None,
            interrupts_masked: false,
            interrupts_were_masked: false,
        }
    }

    /// Every direction event in the order it happened.
    #[must_use]
    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    /// Just the driven bytes, in order.
    #[must_use]
    pub fn driven_bytes(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|event| match event {
                BusEvent::Drive(value) => Some(*value),
                BusEvent::Release => None,
            })
            .collect()
    }

    /// Whether the emulator is currently driving the data lines.
    #[must_use]
    pub fn is_driving(&self) -> bool {
        self.driving.is_some()
    }

    /// Whether interrupts were ever masked during the run.
    #[must_use]
    pub fn interrupts_were_masked(&self) -> bool {
        self.interrupts_were_masked
    }

    /// Whether interrupts are masked right now.
    #[must_use]
    pub fn interrupts_masked(&self) -> bool {
        self.interrupts_masked
    }
}

impl CartridgeBus for TraceBus {
    fn sample_address(&mut self) -> u16 {
        if self.index >= self.steps.len() {
            // Alternate so wait-for-change spins terminate.
            self.settle_toggle = !self.settle_toggle;
            return u16::from(self.settle_toggle);
        }

        let address = self.steps[self.index].address;
        self.remaining -= 1;
        if self.remaining == 0 {
            self.index += 1;
            self.remaining = self.steps.get(self.index).map_or(0, |step| step.hold);
        }
        address
    }

    fn sample_data(&mut self) -> u8 {
        self.steps.get(self.index).map_or(0, |step| step.data)
    }

    fn drive_data(&mut self, value: u8) {
        self.driving = Some(value);
        self.events.push(BusEvent::Drive(value));
    }

    fn release_data(&mut self) {
        self.driving = None;
        self.events.push(BusEvent::Release);
    }

    fn halt_requested(&self) -> bool {
        self.index >= self.steps.len()
    }
}

impl InterruptControl for TraceBus {
    fn disable_interrupts(&mut self) {
        self.interrupts_masked = true;
        self.interrupts_were_masked = true;
    }

    fn enable_interrupts(&mut self) {
        self.interrupts_masked = false;
    }
}

//! The hardware bus capability.

/// Access to the console-side expansion bus.
///
/// The scheme driver observes the bus through this trait and never touches
/// registers directly. The platform layer decides how the address and data
/// lines map onto GPIO banks; a simulation harness replays a synthetic
/// trace instead.
///
/// The data bus is bidirectional: it floats as an input until
/// [`drive_data`](Self::drive_data) turns the output drivers on, and
/// [`release_data`](Self::release_data) must turn them off again before the
/// console drives the same lines. At most one side drives at any instant.
pub trait CartridgeBus {
    /// Sample the address lines once. Raw, undebounced.
    fn sample_address(&mut self) -> u16;

    /// Sample the data lines once (valid while the console drives a write).
    fn sample_data(&mut self) -> u8;

    /// Drive `value` onto the data lines and enable the output drivers.
    fn drive_data(&mut self, value: u8);

    /// Disable the data output drivers, returning the lines to inputs.
    fn release_data(&mut self);

    /// Cooperative stop flag for host-side simulation.
    ///
    /// Real hardware runs until power-down and always returns `false` (the
    /// default). A simulation bus raises this once its trace is exhausted.
    /// The driver consults it only between bus cycles, never inside a latch
    /// or drive window.
    fn halt_requested(&self) -> bool {
        false
    }
}

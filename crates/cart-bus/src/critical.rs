//! Scoped interrupt masking.

/// Interrupt masking capability of the platform.
///
/// The bus-serving loop holds interrupts disabled for its whole lifetime:
/// any delay of more than a few bus cycles corrupts a read or write, so
/// nothing may preempt the sampling and latching windows. A simulation
/// platform implements this as bookkeeping only.
pub trait InterruptControl {
    fn disable_interrupts(&mut self);
    fn enable_interrupts(&mut self);
}

/// Run `body` with interrupts disabled, re-enabling them on exit.
///
/// The scoped form keeps the disable/enable bracket next to the code it
/// protects; the loop inside `body` is expected to run until power-down or
/// a cooperative halt.
pub fn with_interrupts_disabled<T, R>(platform: &mut T, body: impl FnOnce(&mut T) -> R) -> R
where
    T: InterruptControl,
{
    platform.disable_interrupts();
    let result = body(platform);
    platform.enable_interrupts();
    result
}

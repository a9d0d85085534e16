//! Fault-injection hooks.
//!
//! A [`FaultInjector`] observes (and may corrupt) line data around cache
//! accesses for reliability experiments. The cache calls:
//! 1. **`pre_read`:** before a load copies data out of a line.
//! 2. **`post_write`:** after a store copies data into a line, and after a fill.
//!
//! Evicted data gets no read callback. Errors are modeled as occurring in the
//! array, so hooks receive the line storage itself rather than the caller's buffer.

use std::fmt;

/// Observer of line reads and writes.
///
/// Implementations must be safe to call from any thread; the cache does not
/// serialize calls across sets.
pub trait FaultInjector: fmt::Debug + Send + Sync {
    /// Called before `data.len()` bytes of a line are read.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address of the access.
    /// * `slot` - Global slot id (`set_index * associativity + way`).
    /// * `data` - Line storage about to be read.
    /// * `now` - Simulated time of the access.
    fn pre_read(&self, addr: u64, slot: usize, data: &mut [u8], now: u64);

    /// Called after `data.len()` bytes of a line were written.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address of the access (line address for fills).
    /// * `slot` - Global slot id (`set_index * associativity + way`).
    /// * `data` - Line storage that was just written.
    /// * `now` - Simulated time of the access.
    fn post_write(&self, addr: u64, slot: usize, data: &mut [u8], now: u64);
}

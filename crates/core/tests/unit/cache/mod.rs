//! Cache unit tests.




/// Fault-injector callbacks.
pub mod fault_injection;


/// Access/hit counters and set usage.
pub mod counters;

/// Per-set locking from multiple threads.
pub mod concurrency;

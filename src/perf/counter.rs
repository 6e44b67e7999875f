use std::time::Instant;

/// A monotonically increasing tick source used to bracket benchmark invocations.
pub trait CycleCounter {
    fn read(&self) -> u64;

    /// Unit of one tick, for reports.
    fn unit(&self) -> &'static str;
}

/// Ticks elapsed between two reads, tolerant of counter wrap-around.
pub fn elapsed(start: u64, end: u64) -> u64 {
    end.wrapping_sub(start)
}

/// The x86_64 time-stamp counter.
#[cfg(target_arch = "x86_64")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TscCounter;

#[cfg(target_arch = "x86_64")]
impl CycleCounter for TscCounter {
    #[allow(unsafe_code)]
    fn read(&self) -> u64 {
        // SAFETY: rdtsc has no memory operands and is available on every x86_64 CPU.
        unsafe { std::arch::x86_64::_rdtsc() }
    }

    fn unit(&self) -> &'static str {
        "cycles"
    }
}

/// Nanoseconds since construction, for targets without an accessible cycle counter.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicCounter {
    origin: Instant,
}

impl MonotonicCounter {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleCounter for MonotonicCounter {
    fn read(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }

    fn unit(&self) -> &'static str {
        "ns"
    }
}

/// The best counter for this target.
pub fn default_counter() -> Box<dyn CycleCounter> {
    #[cfg(target_arch = "x86_64")]
    {
        Box::new(TscCounter)
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        Box::new(MonotonicCounter::new())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/perf/counter.rs"]
mod tests;

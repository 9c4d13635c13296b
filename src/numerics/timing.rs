//! Wall-clock accounting of Jacobian/residual assembly and tridiagonal
//! solves, compiled in with the `timing` feature. Without it every hook is a
//! pass-through.

#[cfg(feature = "timing")]
use log::info;
#[cfg(feature = "timing")]
use std::cell::RefCell;
use std::time::Duration;

/// Which part of a Newton iteration a measurement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Assembly,
    LinearSolve,
}

/// Running aggregate of one phase.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct PhaseStats {
    pub calls: usize,
    pub total: Duration,
    pub slowest: Duration,
}

impl PhaseStats {
    pub fn add(&mut self, elapsed: Duration) {
        self.calls += 1;
        self.total += elapsed;
        self.slowest = self.slowest.max(elapsed);
    }

    pub fn mean(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total / self.calls as u32
        }
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct TimingStats {
    pub assembly: PhaseStats,
    pub linear_solve: PhaseStats,
    pub total_time: Duration,
}

impl TimingStats {
    pub fn phase_mut(&mut self, phase: Phase) -> &mut PhaseStats {
        match phase {
            Phase::Assembly => &mut self.assembly,
            Phase::LinearSolve => &mut self.linear_solve,
        }
    }

    /// Wall time outside assembly and linear solves.
    pub fn overhead(&self) -> Duration {
        self.total_time
            .saturating_sub(self.assembly.total + self.linear_solve.total)
    }

    #[cfg(feature = "timing")]
    pub fn log_summary(&self) {
        if self.assembly.calls == 0 {
            return;
        }
        let ms = |d: Duration| d.as_secs_f64() * 1e3;

        info!("[Timing] run {:.3} s", self.total_time.as_secs_f64());
        for (label, stats) in [("assembly", &self.assembly), ("linear solve", &self.linear_solve)] {
            info!(
                "[Timing] {:<12} {:>6} calls, {:>9.3} ms total, {:>8.4} ms mean, {:>8.4} ms max",
                label,
                stats.calls,
                ms(stats.total),
                ms(stats.mean()),
                ms(stats.slowest)
            );
        }
        info!("[Timing] other        {:>9.3} ms", ms(self.overhead()));
    }

    #[cfg(not(feature = "timing"))]
    pub fn log_summary(&self) {}
}

#[cfg(feature = "timing")]
thread_local! {
    static STATS: RefCell<TimingStats> = RefCell::new(TimingStats::default());
}

#[cfg(feature = "timing")]
fn record<F, R>(phase: Phase, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = std::time::Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    STATS.with(|stats| stats.borrow_mut().phase_mut(phase).add(elapsed));
    result
}

#[cfg(not(feature = "timing"))]
#[inline(always)]
fn record<F, R>(_phase: Phase, f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}

pub fn reset_timing() {
    #[cfg(feature = "timing")]
    STATS.with(|stats| *stats.borrow_mut() = TimingStats::default());
}

pub fn record_assembly<F: FnOnce() -> R, R>(f: F) -> R {
    record(Phase::Assembly, f)
}

pub fn record_linear_solve<F: FnOnce() -> R, R>(f: F) -> R {
    record(Phase::LinearSolve, f)
}

pub fn finalize_timing(total_time: Duration) -> TimingStats {
    #[cfg(feature = "timing")]
    let mut stats = STATS.with(|stats| stats.borrow().clone());
    #[cfg(not(feature = "timing"))]
    let mut stats = TimingStats::default();
    stats.total_time = total_time;
    stats
}

pub fn finalize_and_log(total_time: Duration) {
    finalize_timing(total_time).log_summary();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hooks_return_the_wrapped_value() {
        reset_timing();
        assert_eq!(record_assembly(|| 2 + 2), 4);
        assert_eq!(record_linear_solve(|| "solved"), "solved");
        let stats = finalize_timing(Duration::from_millis(5));
        assert_eq!(stats.total_time, Duration::from_millis(5));
        #[cfg(feature = "timing")]
        {
            assert_eq!(stats.assembly.calls, 1);
            assert_eq!(stats.linear_solve.calls, 1);
        }
    }

    #[test]
    fn phase_aggregates() {
        let mut stats = TimingStats::default();
        stats.phase_mut(Phase::Assembly).add(Duration::from_millis(2));
        stats.phase_mut(Phase::Assembly).add(Duration::from_millis(4));
        stats.total_time = Duration::from_millis(10);

        assert_eq!(stats.assembly.calls, 2);
        assert_eq!(stats.assembly.mean(), Duration::from_millis(3));
        assert_eq!(stats.assembly.slowest, Duration::from_millis(4));
        assert_eq!(stats.linear_solve.mean(), Duration::ZERO);
        assert_eq!(stats.overhead(), Duration::from_millis(4));
    }
}

//! Independent-cadence timers for display refresh and network reporting.
//!
//! The control loop samples at its own tick rate; the display redraw and
//! the brightness report each run on their own wall-clock interval.  Each
//! `due_*` call that returns `true` consumes (resets) only its own timer,
//! so a slow render can never delay or skip a report and vice versa.

/// One check-and-consume interval timer.
#[derive(Debug, Clone)]
struct Cadence {
    last_fired_ms: u32,
    interval_ms: u32,
}

impl Cadence {
    /// A fresh timer is immediately due, matching the reference behaviour
    /// of firing on the first operating iteration.
    fn new(interval_ms: u32, now_ms: u32) -> Self {
        Self {
            last_fired_ms: now_ms.wrapping_sub(interval_ms),
            interval_ms,
        }
    }

    /// `true` at most once per interval; a `true` result resets the timer.
    fn due(&mut self, now_ms: u32) -> bool {
        if now_ms.wrapping_sub(self.last_fired_ms) >= self.interval_ms {
            self.last_fired_ms = now_ms;
            true
        } else {
            false
        }
    }
}

/// The two independent timers driving the loop's optional work.
#[derive(Debug, Clone)]
pub struct CadenceTimers {
    display: Cadence,
    report: Cadence,
}

impl CadenceTimers {
    pub fn new(display_interval_ms: u32, report_interval_ms: u32, now_ms: u32) -> Self {
        Self {
            display: Cadence::new(display_interval_ms, now_ms),
            report: Cadence::new(report_interval_ms, now_ms),
        }
    }

    /// Check-and-consume the display refresh timer.
    pub fn due_display(&mut self, now_ms: u32) -> bool {
        self.display.due(now_ms)
    }

    /// Check-and-consume the report timer.
    pub fn due_report(&mut self, now_ms: u32) -> bool {
        self.report.due(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_immediately_after_construction() {
        let mut timers = CadenceTimers::new(100, 1000, 0);
        assert!(timers.due_display(0));
        assert!(timers.due_report(0));
    }

    #[test]
    fn fires_at_most_once_per_interval() {
        let mut timers = CadenceTimers::new(100, 1000, 0);
        assert!(timers.due_display(0));
        assert!(!timers.due_display(50));
        assert!(!timers.due_display(99));
        assert!(timers.due_display(100));
        assert!(!timers.due_display(199));
        assert!(timers.due_display(200));
    }

    #[test]
    fn timers_are_independent() {
        let mut timers = CadenceTimers::new(100, 1000, 0);
        // Burn through ten display firings; the report timer must be
        // unaffected by any of them.
        for t in (0..1000).step_by(100) {
            timers.due_display(t);
        }
        assert!(timers.due_report(1000));
        assert!(!timers.due_report(1999));
        assert!(timers.due_report(2000));
    }

    #[test]
    fn consume_resets_from_fire_time() {
        let mut timers = CadenceTimers::new(100, 1000, 0);
        assert!(timers.due_display(0));
        // Checked late: fires at 130, next window counts from 130.
        assert!(timers.due_display(130));
        assert!(!timers.due_display(229));
        assert!(timers.due_display(230));
    }

    #[test]
    fn survives_clock_wrap() {
        let mut timers = CadenceTimers::new(100, 1000, u32::MAX - 50);
        assert!(timers.due_display(u32::MAX - 50));
        assert!(!timers.due_display(u32::MAX - 1));
        assert!(timers.due_display(49)); // wrapped, 100 ms elapsed
    }
}

//! Recurring-cadence timers.
//!
//! The run loop owns a handful of fixed-interval jobs (telemetry sampling,
//! buzzer pulsing). Each is modelled as a [`Cadence`]: "run this every
//! `period_ms`, starting now". A cadence reschedules itself unconditionally
//! on every fire, so a stalled loop iteration can delay a job but never
//! drop it from the schedule.
//!
//! Timestamps are caller-supplied monotonic milliseconds (from
//! [`MonotonicClock`](crate::adapters::time::MonotonicClock)), which keeps
//! this module free of any platform time source and trivially testable.

/// A self-rearming fixed-interval timer.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    period_ms: u64,
    /// Next fire deadline; `None` while disarmed.
    deadline_ms: Option<u64>,
}

impl Cadence {
    /// Create a disarmed cadence with the given period.
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            deadline_ms: None,
        }
    }

    /// Arm (or re-arm) so the first fire happens immediately at `now_ms`.
    pub fn arm_now(&mut self, now_ms: u64) {
        self.deadline_ms = Some(now_ms);
    }

    /// Arm (or re-arm) so the first fire is one full period away.
    pub fn arm_after_period(&mut self, now_ms: u64) {
        self.deadline_ms = Some(now_ms + self.period_ms);
    }

    /// Stop firing until re-armed.
    pub fn disarm(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Check whether the cadence is due; if so, reschedule and return `true`.
    ///
    /// Rescheduling is anchored to `now_ms` rather than the missed deadline,
    /// so a long stall produces one catch-up fire, not a burst.
    pub fn fire_due(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = Some(now_ms + self.period_ms);
                true
            }
            _ => false,
        }
    }

    /// Milliseconds until the next fire, saturating at zero.
    /// `None` while disarmed.
    pub fn until_due_ms(&self, now_ms: u64) -> Option<u64> {
        self.deadline_ms.map(|d| d.saturating_sub(now_ms))
    }
}

//! Named one-shot and periodic timers on the monitor timeline.
//!
//! Each timer holds at most one pending deadline, like a hardware ticker or
//! timeout object: attaching replaces whatever was pending, detaching clears
//! it. Handlers never run here; `pop_due` hands the next expired timer back to
//! the caller so dispatch order stays explicit.

use std::time::Duration;

/// Shortest period a periodic timer may have; keeps `pop_due` from spinning.
const MIN_PERIOD: Duration = Duration::from_micros(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    /// Recurring start of a dual-sample cycle.
    SampleStart,
    /// Delayed second read of the current cycle.
    SampleEnd,
    /// Vibration alarm colour.
    VibrationVisual,
    /// Temperature alarm colour and tone.
    TemperatureEffect,
    /// Alarm digital pin assertion.
    DigitalPin,
}

impl TimerId {
    pub const ALL: [TimerId; 5] = [
        TimerId::SampleStart,
        TimerId::SampleEnd,
        TimerId::VibrationVisual,
        TimerId::TemperatureEffect,
        TimerId::DigitalPin,
    ];

    #[inline]
    const fn index(self) -> usize {
        match self {
            TimerId::SampleStart => 0,
            TimerId::SampleEnd => 1,
            TimerId::VibrationVisual => 2,
            TimerId::TemperatureEffect => 3,
            TimerId::DigitalPin => 4,
        }
    }
}

/// A scheduling request produced by a state machine, applied by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Attach {
        timer: TimerId,
        delay: Duration,
        period: Option<Duration>,
    },
    Detach(TimerId),
}

impl TimerCommand {
    /// Fire once after `delay`.
    pub fn once(timer: TimerId, delay: Duration) -> Self {
        TimerCommand::Attach {
            timer,
            delay,
            period: None,
        }
    }

    /// Fire every `period`, first after one period.
    pub fn every(timer: TimerId, period: Duration) -> Self {
        TimerCommand::Attach {
            timer,
            delay: period,
            period: Some(period),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    due: Duration,
    period: Option<Duration>,
    seq: u64,
}

#[derive(Debug, Default, Clone)]
pub struct Timers {
    slots: [Option<Slot>; 5],
    seq: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, now: Duration, cmd: TimerCommand) {
        match cmd {
            TimerCommand::Attach {
                timer,
                delay,
                period,
            } => self.attach(now, timer, delay, period),
            TimerCommand::Detach(timer) => self.detach(timer),
        }
    }

    pub fn attach(
        &mut self,
        now: Duration,
        timer: TimerId,
        delay: Duration,
        period: Option<Duration>,
    ) {
        self.seq = self.seq.wrapping_add(1);
        self.slots[timer.index()] = Some(Slot {
            due: now.saturating_add(delay),
            period: period.map(|p| p.max(MIN_PERIOD)),
            seq: self.seq,
        });
        tracing::trace!(?timer, ?delay, ?period, "timer attached");
    }

    pub fn detach(&mut self, timer: TimerId) {
        if self.slots[timer.index()].take().is_some() {
            tracing::trace!(?timer, "timer detached");
        }
    }

    pub fn is_attached(&self, timer: TimerId) -> bool {
        self.slots[timer.index()].is_some()
    }

    /// Repeat period of an attached periodic timer.
    pub fn period(&self, timer: TimerId) -> Option<Duration> {
        self.slots[timer.index()].and_then(|s| s.period)
    }

    /// Pending deadline of `timer`, if attached.
    pub fn due(&self, timer: TimerId) -> Option<Duration> {
        self.slots[timer.index()].map(|s| s.due)
    }

    /// Earliest pending deadline across all timers.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.slots.iter().flatten().map(|s| s.due).min()
    }

    /// Take the earliest timer whose deadline is at or before `now`.
    ///
    /// Returns the timer and the instant it was due. Ties go to the timer
    /// attached (or last rescheduled) first. Periodic timers are re-armed at
    /// the first `due + k·period` after `now`, so periods missed during a
    /// stall fire once rather than back to back; one-shot timers are cleared.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, Duration)> {
        let (idx, slot) = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|s| (i, s)))
            .filter(|(_, s)| s.due <= now)
            .min_by_key(|(_, s)| (s.due, s.seq))?;
        let id = TimerId::ALL[idx];
        self.slots[idx] = match slot.period {
            Some(period) => {
                self.seq = self.seq.wrapping_add(1);
                let next = next_after(slot.due, period, now);
                if next > slot.due.saturating_add(period) {
                    tracing::debug!(
                        timer = ?id,
                        late = ?now.saturating_sub(slot.due),
                        "missed periods coalesced"
                    );
                }
                Some(Slot {
                    due: next,
                    period: Some(period),
                    seq: self.seq,
                })
            }
            None => None,
        };
        Some((id, slot.due))
    }
}

/// First `due + k·period` (k ≥ 1) strictly after `now`.
fn next_after(due: Duration, period: Duration, now: Duration) -> Duration {
    let k = now.saturating_sub(due).as_nanos() / period.as_nanos() + 1;
    let step = u64::try_from(period.as_nanos().saturating_mul(k)).unwrap_or(u64::MAX);
    due.saturating_add(Duration::from_nanos(step))
}

//! Dual-sample vibration estimator.
//!
//! A cycle reads the accelerometer twice, `second_read_delay` apart, and
//! reports the per-axis change and its Euclidean magnitude. Reads are gated by
//! a [`SampleDebouncer`]; a skipped or failed read leaves the previous buffer in
//! place and the delta is computed against that stale value.
//!
//! ```text
//!   SampleStart fire            SampleEnd fire
//! Idle ──────► AwaitingFirstSample ──► AwaitingSecondSample ──────► Idle
//!              (read start, reset        (wait second_read_delay)   (read end,
//!               debounce, schedule end)                              compute sample)
//! ```

use std::time::Duration;

use vibewatch_traits::{Accelerometer, Axes};

use crate::debounce::SampleDebouncer;
use crate::hw_error::map_hw_error;
use crate::timers::{TimerCommand, TimerId};

/// Change in acceleration over one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VibrationSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// sqrt(x² + y² + z²)
    pub total: f32,
}

impl VibrationSample {
    pub fn from_delta(delta: Axes) -> Self {
        let [x, y, z] = delta;
        Self {
            x,
            y,
            z,
            total: magnitude(delta),
        }
    }

    pub fn axes(&self) -> Axes {
        [self.x, self.y, self.z]
    }
}

#[inline]
pub fn magnitude([x, y, z]: Axes) -> f32 {
    (x * x + y * y + z * z).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EstimatorPhase {
    #[default]
    Idle,
    AwaitingFirstSample,
    AwaitingSecondSample,
}

#[derive(Debug, Clone)]
pub struct DualSampleVibrationEstimator {
    phase: EstimatorPhase,
    debouncer: SampleDebouncer,
    second_read_delay: Duration,
    start: Axes,
    end: Axes,
    sample: VibrationSample,
    debounced_reads: u64,
    failed_reads: u64,
}

impl DualSampleVibrationEstimator {
    pub fn new(debounce: Duration, second_read_delay: Duration) -> Self {
        Self {
            phase: EstimatorPhase::Idle,
            debouncer: SampleDebouncer::new(debounce),
            second_read_delay,
            start: [0.0; 3],
            end: [0.0; 3],
            sample: VibrationSample::default(),
            debounced_reads: 0,
            failed_reads: 0,
        }
    }

    /// Start a cycle: take the first reading and ask for the delayed second one.
    ///
    /// Returns `None` when the previous cycle has not completed yet; that fire
    /// is dropped so cycles never overlap.
    pub fn begin_cycle(
        &mut self,
        now: Duration,
        accel: &mut dyn Accelerometer,
    ) -> Option<TimerCommand> {
        if self.phase == EstimatorPhase::AwaitingSecondSample {
            tracing::debug!(?now, "sample start while a cycle is in flight; skipped");
            return None;
        }
        self.phase = EstimatorPhase::AwaitingFirstSample;
        if let Some(axes) = self.acquire(now, accel) {
            self.start = axes;
        }
        self.debouncer.reset(now);
        self.phase = EstimatorPhase::AwaitingSecondSample;
        Some(TimerCommand::once(
            TimerId::SampleEnd,
            self.second_read_delay,
        ))
    }

    /// Finish the cycle: take the second reading and compute the sample.
    ///
    /// Returns `None` if no cycle was in progress.
    pub fn complete_cycle(
        &mut self,
        now: Duration,
        accel: &mut dyn Accelerometer,
    ) -> Option<VibrationSample> {
        if self.phase != EstimatorPhase::AwaitingSecondSample {
            tracing::debug!(?now, phase = ?self.phase, "sample end without a cycle; ignored");
            return None;
        }
        if let Some(axes) = self.acquire(now, accel) {
            self.end = axes;
            self.debouncer.reset(now);
        }
        let delta = [
            self.end[0] - self.start[0],
            self.end[1] - self.start[1],
            self.end[2] - self.start[2],
        ];
        self.sample = VibrationSample::from_delta(delta);
        self.phase = EstimatorPhase::Idle;
        tracing::trace!(
            x = self.sample.x,
            y = self.sample.y,
            z = self.sample.z,
            total = self.sample.total,
            "vibration sample"
        );
        Some(self.sample)
    }

    /// Read the accelerometer if the debouncer allows it.
    ///
    /// `None` means the buffer keeps its previous value.
    fn acquire(&mut self, now: Duration, accel: &mut dyn Accelerometer) -> Option<Axes> {
        if !self.debouncer.permits(now) {
            self.debounced_reads = self.debounced_reads.saturating_add(1);
            tracing::trace!(?now, "accelerometer read debounced");
            return None;
        }
        match accel.read_axes() {
            Ok(axes) => Some(axes),
            Err(e) => {
                self.failed_reads = self.failed_reads.saturating_add(1);
                let err = map_hw_error(&*e);
                tracing::warn!(error = %err, "accelerometer read failed; keeping previous reading");
                None
            }
        }
    }

    pub fn phase(&self) -> EstimatorPhase {
        self.phase
    }

    /// Most recent completed sample.
    pub fn sample(&self) -> VibrationSample {
        self.sample
    }

    /// Reads skipped by the debouncer so far.
    pub fn debounced_reads(&self) -> u64 {
        self.debounced_reads
    }

    /// Reads that returned an error so far.
    pub fn failed_reads(&self) -> u64 {
        self.failed_reads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct SeqAccel {
        seq: VecDeque<Axes>,
        reads: usize,
    }
    impl SeqAccel {
        fn new(seq: impl IntoIterator<Item = Axes>) -> Self {
            Self {
                seq: seq.into_iter().collect(),
                reads: 0,
            }
        }
    }
    impl Accelerometer for SeqAccel {
        fn read_axes(&mut self) -> Result<Axes, Box<dyn std::error::Error + Send + Sync>> {
            self.reads += 1;
            self.seq.pop_front().ok_or_else(|| "exhausted".into())
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn estimator() -> DualSampleVibrationEstimator {
        DualSampleVibrationEstimator::new(ms(10), ms(15))
    }

    #[test]
    fn magnitude_of_3_4_0_is_5() {
        let s = VibrationSample::from_delta([3.0, 4.0, 0.0]);
        assert!((s.total - 5.0).abs() < 1e-6);
        assert_eq!(VibrationSample::from_delta([0.0; 3]).total, 0.0);
    }

    #[test]
    fn full_cycle_computes_end_minus_start() {
        let mut est = estimator();
        let mut accel = SeqAccel::new([[0.0, 0.0, 1.0], [0.3, -0.4, 1.0]]);
        let cmd = est.begin_cycle(ms(33), &mut accel);
        assert_eq!(cmd, Some(TimerCommand::once(TimerId::SampleEnd, ms(15))));
        assert_eq!(est.phase(), EstimatorPhase::AwaitingSecondSample);

        let s = est.complete_cycle(ms(48), &mut accel).unwrap();
        assert!((s.x - 0.3).abs() < 1e-6);
        assert!((s.y + 0.4).abs() < 1e-6);
        assert!(s.z.abs() < 1e-6);
        assert!((s.total - 0.5).abs() < 1e-6);
        assert_eq!(est.phase(), EstimatorPhase::Idle);
        assert_eq!(accel.reads, 2);
    }

    #[test]
    fn debounced_second_read_uses_stale_buffer() {
        let mut est = estimator();
        let mut accel = SeqAccel::new([[1.0, 1.0, 1.0], [2.0, 2.0, 2.0]]);
        est.begin_cycle(ms(0), &mut accel);
        // Only 5 ms after the first read: second read is skipped.
        let s = est.complete_cycle(ms(5), &mut accel).unwrap();
        // end buffer is still zero, start is [1,1,1].
        assert_eq!(s.axes(), [-1.0, -1.0, -1.0]);
        assert_eq!(accel.reads, 1);
        assert_eq!(est.debounced_reads(), 1);
    }

    #[test]
    fn failed_read_keeps_previous_value() {
        let mut est = estimator();
        let mut accel = SeqAccel::new([[0.5, 0.0, 0.0]]);
        est.begin_cycle(ms(0), &mut accel);
        let s = est.complete_cycle(ms(15), &mut accel).unwrap();
        assert_eq!(s.axes(), [-0.5, 0.0, 0.0]);
        assert_eq!(est.failed_reads(), 1);
    }

    #[test]
    fn overlapping_start_is_dropped() {
        let mut est = estimator();
        let mut accel = SeqAccel::new([[0.0; 3]; 4]);
        assert!(est.begin_cycle(ms(0), &mut accel).is_some());
        assert!(est.begin_cycle(ms(12), &mut accel).is_none());
        assert_eq!(accel.reads, 1);
    }

    #[test]
    fn end_without_start_is_ignored() {
        let mut est = estimator();
        let mut accel = SeqAccel::new([]);
        assert!(est.complete_cycle(ms(15), &mut accel).is_none());
        assert_eq!(accel.reads, 0);
    }
}

//! Real-time driver for a [`Monitor`]: bring-up, then the cooperative loop.
//!
//! The runner owns the clock. It converts clock readings into monitor timeline
//! positions, drains input edges between dispatches, runs the control tick on
//! its own period and sleeps until the next deadline.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use vibewatch_traits::clock::Clock;
use vibewatch_traits::{InputEdge, StatusLed};

use crate::error::{MonitorError, Report, Result};
use crate::monitor::Monitor;
use crate::status::{RunSummary, StartupReport};

/// Longest single sleep, so edges and shutdown are noticed promptly.
pub const MAX_IDLE: Duration = Duration::from_millis(20);

pub struct Runner<C: Clock> {
    monitor: Monitor,
    clock: C,
    epoch: Instant,
    edges: Option<Receiver<InputEdge>>,
    shutdown: Option<Arc<AtomicBool>>,
    max_runtime: Option<Duration>,
}

impl<C: Clock> Runner<C> {
    /// The runner timeline starts now.
    pub fn new(monitor: Monitor, clock: C) -> Self {
        let epoch = clock.now();
        Self {
            monitor,
            clock,
            epoch,
            edges: None,
            shutdown: None,
            max_runtime: None,
        }
    }

    pub fn with_edges(mut self, edges: Receiver<InputEdge>) -> Self {
        self.edges = Some(edges);
        self
    }

    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    /// Stop after this much time, bring-up included. A storage wait still
    /// pending at the limit fails with `StorageUnavailable`.
    pub fn with_max_runtime(mut self, limit: Duration) -> Self {
        self.max_runtime = Some(limit);
        self
    }

    fn now(&self) -> Duration {
        self.clock.since(self.epoch)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|f| f.load(Ordering::Relaxed))
    }

    fn past_deadline(&self, now: Duration) -> bool {
        self.max_runtime.is_some_and(|limit| now >= limit)
    }

    /// Wait for storage, probe the accelerometer, light the ready LED and hold
    /// the startup messages on screen for the splash period.
    pub fn bring_up(&mut self) -> Result<StartupReport> {
        let retry = self.monitor.timing().storage_retry;
        let splash = self.monitor.timing().splash;

        self.monitor.show_message("Connect storage");
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            match self.monitor.open_storage() {
                Ok(()) => break,
                Err(e) => {
                    if attempts == 1 {
                        tracing::warn!(error = %e, "storage not available; waiting");
                    } else {
                        tracing::debug!(attempts, error = %e, "storage still unavailable");
                    }
                    if self.shutdown_requested() {
                        return Err(Report::new(MonitorError::Shutdown));
                    }
                    if self.past_deadline(self.now()) {
                        return Err(Report::new(MonitorError::StorageUnavailable(
                            e.to_string(),
                        )));
                    }
                    self.clock.sleep(retry);
                }
            }
        }
        self.monitor.show_message("Storage connected");
        tracing::info!(attempts, "storage connected");

        let accelerometer_connected = self.monitor.probe_accelerometer();
        if accelerometer_connected {
            self.monitor.show_message("Accelerometer connected");
        } else {
            tracing::warn!("accelerometer did not answer probe");
            self.monitor.show_message("Accelerometer not connected");
        }
        self.monitor.set_status_led(StatusLed::Ready, true);
        self.clock.sleep(splash);

        Ok(StartupReport {
            storage_attempts: attempts,
            accelerometer_connected,
        })
    }

    fn drain_edges(&mut self) {
        let Some(rx) = self.edges.as_ref() else {
            return;
        };
        let pending: Vec<InputEdge> = rx.try_iter().collect();
        for edge in pending {
            self.monitor.on_edge(edge);
        }
    }

    /// Bring the monitor up and run it until shutdown or the runtime limit.
    pub fn run(&mut self) -> Result<RunSummary> {
        let startup = self.bring_up()?;

        let period = self.monitor.timing().control_period;
        let started_at = self.now();
        self.monitor.start(started_at);
        let mut next_control = started_at;
        let mut control_ticks: u64 = 0;

        loop {
            if self.shutdown_requested() {
                tracing::info!("shutdown requested");
                break;
            }
            let now = self.now();
            if self.past_deadline(now) {
                tracing::info!(?now, "runtime limit reached");
                break;
            }

            self.drain_edges();
            self.monitor.advance_to(now);

            if now >= next_control {
                self.monitor.control_tick(now);
                control_ticks = control_ticks.saturating_add(1);
                next_control = next_control.saturating_add(period);
                if next_control <= now {
                    tracing::debug!(?now, "control tick overran its period");
                    next_control = now.saturating_add(period);
                }
            }

            let mut wake = next_control;
            if let Some(due) = self.monitor.next_deadline() {
                wake = wake.min(due);
            }
            if let Some(limit) = self.max_runtime {
                wake = wake.min(limit);
            }
            let wait = wake.saturating_sub(self.now()).min(MAX_IDLE);
            self.clock.sleep(wait);
        }

        self.monitor.shutdown();
        let elapsed = self.now().saturating_sub(started_at);
        let snap = self.monitor.snapshot();
        let summary = RunSummary {
            startup,
            elapsed,
            cycles: self.monitor.cycles(),
            control_ticks,
            records_written: self.monitor.gate().records_written(),
            write_failures: self.monitor.gate().write_failures(),
            failed_reads: self.monitor.failed_reads(),
            vibration_alarm: snap.vibration_alarm.is_triggered(),
            temperature_alarm: snap.temperature_alarm.is_triggered(),
            activation_vibration: snap.activation_vibration,
            log_closed: snap.log_state == crate::logging_gate::LogState::Closed,
        };
        tracing::info!(
            cycles = summary.cycles,
            records = summary.records_written,
            vibration_alarm = summary.vibration_alarm,
            temperature_alarm = summary.temperature_alarm,
            "monitor stopped"
        );
        Ok(summary)
    }
}

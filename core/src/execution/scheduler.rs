//! Cancellable automatic-run scheduling
//!
//! Automatic runs alternate algorithm steps with a fixed inter-step delay.
//! Continuations are scheduled on the frame clock and carry the run
//! generation that was current when they were created; toggling the run
//! bumps the generation so a stale continuation can never resurrect a
//! cancelled run.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, trace};

/// Permission to execute one automatic step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
    generation: u64,
}

impl RunTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Continuation {
    generation: u64,
    due_ms: f64,
}

/// Run flag, generation counter and pending continuation of an automatic run
#[derive(Debug, Clone)]
pub struct AutoRunner {
    enabled: bool,
    generation: u64,
    pending: Option<Continuation>,
    in_flight: Option<u64>,
    delay_ms: f64,
}

impl AutoRunner {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            enabled: false,
            generation: 0,
            pending: None,
            in_flight: None,
            delay_ms: delay_ms.max(0.0),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Flips the run flag; returns the new state
    pub fn toggle(&mut self, now_ms: f64) -> bool {
        if self.enabled {
            self.stop();
        } else {
            self.start(now_ms);
        }
        self.enabled
    }

    /// Enables the run with an immediate first continuation
    pub fn start(&mut self, now_ms: f64) {
        self.generation += 1;
        self.enabled = true;
        self.in_flight = None;
        self.pending = Some(Continuation {
            generation: self.generation,
            due_ms: now_ms,
        });
        debug!("auto-run started (generation {})", self.generation);
    }

    /// Cancels the run and discards any scheduled continuation
    pub fn stop(&mut self) {
        if self.enabled {
            debug!("auto-run stopped (generation {})", self.generation);
        }
        self.generation += 1;
        self.enabled = false;
        self.pending = None;
        self.in_flight = None;
    }

    /// Hands out a ticket when a continuation is due
    ///
    /// Nothing is returned while `busy` (the engine is mid-animation), while
    /// another ticket is outstanding, or when the pending continuation
    /// belongs to an older generation.
    pub fn poll(&mut self, now_ms: f64, busy: bool) -> Option<RunTicket> {
        if !self.enabled || busy || self.in_flight.is_some() {
            return None;
        }
        let pending = self.pending?;
        if pending.generation != self.generation {
            trace!("discarding stale continuation of generation {}", pending.generation);
            self.pending = None;
            return None;
        }
        if now_ms < pending.due_ms {
            return None;
        }
        self.pending = None;
        self.in_flight = Some(self.generation);
        Some(RunTicket {
            generation: self.generation,
        })
    }

    /// Completes a step; schedules the next one when `keep_going`
    ///
    /// `ready_at_ms` is when the step's own animation settles; the next
    /// continuation is due one inter-step delay after that. Tickets from a
    /// cancelled generation are ignored.
    pub fn finish(&mut self, ticket: RunTicket, ready_at_ms: f64, keep_going: bool) {
        if ticket.generation != self.generation {
            trace!("ignoring completion of stale generation {}", ticket.generation);
            return;
        }
        self.in_flight = None;
        if keep_going {
            self.pending = Some(Continuation {
                generation: self.generation,
                due_ms: ready_at_ms + self.delay_ms,
            });
        } else {
            debug!("auto-run finished (generation {})", self.generation);
            self.enabled = false;
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_step_runs_immediately() {
        let mut runner = AutoRunner::new(500.0);
        assert!(runner.toggle(0.0));
        assert!(runner.poll(0.0, false).is_some());
    }

    #[test]
    fn test_no_reentrant_tickets() {
        let mut runner = AutoRunner::new(500.0);
        runner.start(0.0);
        let ticket = runner.poll(0.0, false).unwrap();
        assert!(runner.poll(10.0, false).is_none());
        runner.finish(ticket, 100.0, true);
        assert!(runner.poll(599.0, false).is_none());
        assert!(runner.poll(600.0, false).is_some());
    }

    #[test]
    fn test_busy_engine_defers_step() {
        let mut runner = AutoRunner::new(0.0);
        runner.start(0.0);
        assert!(runner.poll(5.0, true).is_none());
        assert!(runner.poll(6.0, false).is_some());
    }

    #[test]
    fn test_cancelled_generation_cannot_resume() {
        let mut runner = AutoRunner::new(500.0);
        runner.start(0.0);
        let ticket = runner.poll(0.0, false).unwrap();

        // Toggled off and on again while the step was running
        runner.toggle(10.0);
        runner.toggle(20.0);
        runner.finish(ticket, 30.0, true);

        // Only the fresh generation's immediate continuation exists
        let fresh = runner.poll(20.0, false).unwrap();
        assert_ne!(fresh.generation(), ticket.generation());
    }

    #[test]
    fn test_finish_without_continuation_disables() {
        let mut runner = AutoRunner::new(500.0);
        runner.start(0.0);
        let ticket = runner.poll(0.0, false).unwrap();
        runner.finish(ticket, 0.0, false);
        assert!(!runner.is_enabled());
        assert!(runner.poll(10_000.0, false).is_none());
    }
}

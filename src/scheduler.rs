//! Single-threaded scheduler with virtual time.
//!
//! Timers, debounces and deferred work are jobs in this queue instead of
//! real timers. Time only moves when the owner calls [`Scheduler::pop_due`]
//! or [`Scheduler::advance_to`], so tests step it deterministically and the
//! demo binary drives it from a tokio interval.

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to a scheduled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Scheduled<J> {
    id: TimerId,
    job: J,
    repeat: Option<Duration>,
}

/// Virtual-time job queue. Jobs due at the same instant run in scheduling order.
#[derive(Debug, Clone)]
pub struct Scheduler<J> {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Scheduled<J>>,
}

impl<J: Clone + PartialEq> Default for Scheduler<J> {
    fn default() -> Self {
        Self::new()
    }
}

impl<J: Clone + PartialEq> Scheduler<J> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: BTreeMap::new(),
        }
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run `job` once, `delay` from now.
    pub fn schedule(&mut self, delay: Duration, job: J) -> TimerId {
        self.insert(self.now + delay, job, None)
    }

    /// Run `job` every `interval`, first after one interval.
    pub fn schedule_repeating(&mut self, interval: Duration, job: J) -> TimerId {
        let interval = interval.max(Duration::from_millis(1));
        self.insert(self.now + interval, job, Some(interval))
    }

    /// Schedule `job` after `delay`, cancelling any pending one-shot equal to it.
    pub fn debounce(&mut self, delay: Duration, job: J) -> TimerId {
        self.queue
            .retain(|_, s| s.repeat.is_some() || s.job != job);
        self.schedule(delay, job)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self
            .queue
            .iter()
            .find(|(_, s)| s.id == id)
            .map(|(k, _)| *k);
        match key {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    /// Whether a job equal to `job` is waiting.
    pub fn is_scheduled(&self, job: &J) -> bool {
        self.queue.values().any(|s| &s.job == job)
    }

    /// Number of waiting jobs.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// When the next job is due, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Remove and return the earliest job due at or before `deadline`,
    /// moving virtual time to its due instant. Repeating jobs are re-armed.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<J> {
        let (&(due, seq), _) = self.queue.iter().next()?;
        if due > deadline {
            return None;
        }
        let scheduled = self.queue.remove(&(due, seq))?;
        self.now = self.now.max(due);
        if let Some(interval) = scheduled.repeat {
            let job = scheduled.job.clone();
            let seq = self.bump();
            self.queue.insert(
                (due + interval, seq),
                Scheduled {
                    id: scheduled.id,
                    job,
                    repeat: Some(interval),
                },
            );
        }
        Some(scheduled.job)
    }

    /// Move virtual time forward to `instant` without running anything.
    pub fn advance_to(&mut self, instant: Duration) {
        self.now = self.now.max(instant);
    }

    /// Pop every job due within `by` from now, in order, then move time to
    /// the end of the window. Jobs scheduled by the caller while handling the
    /// returned jobs are not included; use [`Scheduler::pop_due`] in a loop
    /// for that.
    pub fn advance(&mut self, by: Duration) -> Vec<J> {
        let deadline = self.now + by;
        let mut due = Vec::new();
        while let Some(job) = self.pop_due(deadline) {
            due.push(job);
        }
        self.advance_to(deadline);
        due
    }

    fn insert(&mut self, due: Duration, job: J, repeat: Option<Duration>) -> TimerId {
        let id = TimerId(self.bump());
        let seq = self.bump();
        self.queue.insert((due, seq), Scheduled { id, job, repeat });
        id
    }

    fn bump(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

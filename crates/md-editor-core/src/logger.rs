use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::Display;
use std::time::Instant;

pub const LOG_TARGET: &str = "md_editor";

/// Debug trace sink shared by the dispatcher and every plugin.
///
/// Each call is checked against `enabled` before anything is emitted, so a
/// disabled logger costs a flag read. Events go to `tracing` under
/// [`LOG_TARGET`]; installing a subscriber is up to the host.
#[derive(Debug, Default)]
pub struct Logger {
    enabled: Cell<bool>,
    depth: Cell<usize>,
    counters: RefCell<HashMap<String, u64>>,
    timers: RefCell<HashMap<String, Instant>>,
}

impl Logger {
    pub fn new(enabled: bool) -> Self {
        let logger = Self::default();
        logger.enabled.set(enabled);
        logger
    }

    pub fn enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub fn trace(&self, message: impl Display) {
        if !self.enabled() {
            return;
        }
        tracing::trace!(target: LOG_TARGET, depth = self.depth(), "{message}");
    }

    pub fn debug(&self, message: impl Display) {
        if !self.enabled() {
            return;
        }
        tracing::debug!(target: LOG_TARGET, depth = self.depth(), "{message}");
    }

    pub fn info(&self, message: impl Display) {
        if !self.enabled() {
            return;
        }
        tracing::info!(target: LOG_TARGET, depth = self.depth(), "{message}");
    }

    pub fn log(&self, message: impl Display) {
        self.info(message);
    }

    pub fn warn(&self, message: impl Display) {
        if !self.enabled() {
            return;
        }
        tracing::warn!(target: LOG_TARGET, depth = self.depth(), "{message}");
    }

    pub fn error(&self, message: impl Display) {
        if !self.enabled() {
            return;
        }
        tracing::error!(target: LOG_TARGET, depth = self.depth(), "{message}");
    }

    pub fn assert(&self, condition: bool, message: impl Display) {
        if !self.enabled() || condition {
            return;
        }
        tracing::error!(target: LOG_TARGET, depth = self.depth(), "Assertion failed: {message}");
    }

    /// Returns the new count, or `None` when disabled.
    pub fn count(&self, label: &str) -> Option<u64> {
        if !self.enabled() {
            return None;
        }
        let mut counters = self.counters.borrow_mut();
        let count = counters.entry(label.to_string()).or_insert(0);
        *count += 1;
        tracing::debug!(target: LOG_TARGET, depth = self.depth(), "{label}: {count}");
        Some(*count)
    }

    pub fn count_reset(&self, label: &str) {
        if !self.enabled() {
            return;
        }
        if self.counters.borrow_mut().remove(label).is_none() {
            tracing::warn!(target: LOG_TARGET, "Count for '{label}' does not exist");
        }
    }

    pub fn time(&self, label: &str) {
        if !self.enabled() {
            return;
        }
        let mut timers = self.timers.borrow_mut();
        if timers.contains_key(label) {
            tracing::warn!(target: LOG_TARGET, "Timer '{label}' already exists");
            return;
        }
        timers.insert(label.to_string(), Instant::now());
    }

    /// Returns the elapsed milliseconds, or `None` when disabled or unknown.
    pub fn time_end(&self, label: &str) -> Option<f64> {
        if !self.enabled() {
            return None;
        }
        let Some(started) = self.timers.borrow_mut().remove(label) else {
            tracing::warn!(target: LOG_TARGET, "Timer '{label}' does not exist");
            return None;
        };
        let elapsed = started.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(target: LOG_TARGET, depth = self.depth(), "{label}: {elapsed:.3}ms");
        Some(elapsed)
    }

    pub fn group(&self, label: impl Display) {
        if !self.enabled() {
            return;
        }
        tracing::debug!(target: LOG_TARGET, depth = self.depth(), "{label}");
        self.depth.set(self.depth() + 1);
    }

    pub fn group_end(&self) {
        if !self.enabled() {
            return;
        }
        self.depth.set(self.depth().saturating_sub(1));
    }
}

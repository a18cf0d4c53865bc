//! Call gates for the completion service
//!
//! A gate is asked before each completion call and told how the call went.
//! The advisor holds gates as an injected capability; nothing here is global.
//!
//! - [`RateLimiter`] - sliding window, at most N calls per window
//! - [`ResourceMonitor`] - counts outcomes and stops calling after repeated
//!   failures until a recovery wait has passed
//! - [`GateChain`] - all gates must agree

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::ThrottleSettings;

/// How a completion call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Success,
    Failure,
    Timeout,
}

/// Capability deciding whether the completion service may be called
pub trait CallGate: Send + Sync {
    /// Ask permission for one call; a granted permit counts as a call
    fn try_acquire(&self) -> bool;

    /// Report how a granted call ended
    fn record_call(&self, outcome: CallOutcome);
}

/// Sliding-window rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    /// Calls granted within the current window
    pub fn in_window(&self) -> usize {
        let now = Instant::now();
        match self.calls.lock() {
            Ok(mut calls) => {
                self.evict(&mut calls, now);
                calls.len()
            }
            Err(_) => 0,
        }
    }

    fn evict(&self, calls: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = calls.front() {
            if now.duration_since(oldest) >= self.window {
                calls.pop_front();
            } else {
                break;
            }
        }
    }
}

impl CallGate for RateLimiter {
    fn try_acquire(&self) -> bool {
        let now = Instant::now();
        // A poisoned lock denies the call, the advisor then falls back
        let Ok(mut calls) = self.calls.lock() else {
            return false;
        };
        self.evict(&mut calls, now);

        if calls.len() >= self.max_calls {
            tracing::debug!(
                max_calls = self.max_calls,
                window_secs = self.window.as_secs(),
                "Rate limit reached"
            );
            return false;
        }
        calls.push_back(now);
        true
    }

    fn record_call(&self, _outcome: CallOutcome) {}
}

#[derive(Debug, Default)]
struct Health {
    consecutive_failures: u32,
    open_since: Option<Instant>,
    /// A half-open probe is in flight; cleared when its outcome is recorded
    probing: bool,
}

/// Snapshot of what a [`ResourceMonitor`] has seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorStats {
    pub calls: u64,
    pub failures: u64,
    pub timeouts: u64,
    pub consecutive_failures: u32,
    pub open: bool,
}

/// Outcome counter with a circuit breaker
///
/// After `failure_threshold` consecutive failures or timeouts the monitor
/// denies calls until `recovery_wait` has elapsed; then one call is let
/// through, and a success closes the circuit again.
#[derive(Debug)]
pub struct ResourceMonitor {
    failure_threshold: u32,
    recovery_wait: Duration,
    calls: AtomicU64,
    failures: AtomicU64,
    timeouts: AtomicU64,
    health: Mutex<Health>,
}

impl ResourceMonitor {
    pub fn new(failure_threshold: u32, recovery_wait: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            recovery_wait,
            calls: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            health: Mutex::new(Health::default()),
        }
    }

    pub fn stats(&self) -> MonitorStats {
        let (consecutive_failures, open) = match self.health.lock() {
            Ok(health) => (
                health.consecutive_failures,
                health.open_since.is_some() || health.probing,
            ),
            Err(_) => (0, true),
        };
        MonitorStats {
            calls: self.calls.load(Ordering::SeqCst),
            failures: self.failures.load(Ordering::SeqCst),
            timeouts: self.timeouts.load(Ordering::SeqCst),
            consecutive_failures,
            open,
        }
    }
}

impl CallGate for ResourceMonitor {
    fn try_acquire(&self) -> bool {
        let Ok(mut health) = self.health.lock() else {
            return false;
        };

        if health.probing {
            return false;
        }

        if let Some(since) = health.open_since {
            if since.elapsed() < self.recovery_wait {
                return false;
            }
            // Half-open: allow a single probe, one more failure reopens immediately
            tracing::info!("Completion circuit half-open, allowing probe call");
            health.open_since = None;
            health.probing = true;
            health.consecutive_failures = self.failure_threshold.saturating_sub(1);
        }

        self.calls.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn record_call(&self, outcome: CallOutcome) {
        let Ok(mut health) = self.health.lock() else {
            return;
        };
        health.probing = false;

        match outcome {
            CallOutcome::Success => {
                health.consecutive_failures = 0;
                health.open_since = None;
                return;
            }
            CallOutcome::Failure => {
                self.failures.fetch_add(1, Ordering::SeqCst);
            }
            CallOutcome::Timeout => {
                self.timeouts.fetch_add(1, Ordering::SeqCst);
            }
        }

        health.consecutive_failures += 1;
        if health.consecutive_failures >= self.failure_threshold && health.open_since.is_none() {
            tracing::warn!(
                failures = health.consecutive_failures,
                recovery_wait_secs = self.recovery_wait.as_secs(),
                "Completion service marked unhealthy"
            );
            health.open_since = Some(Instant::now());
        }
    }
}

/// Every gate must grant the call
#[derive(Clone, Default)]
pub struct GateChain {
    gates: Vec<Arc<dyn CallGate>>,
}

impl GateChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, gate: Arc<dyn CallGate>) -> Self {
        self.gates.push(gate);
        self
    }

    /// Rate limiter and resource monitor from config
    pub fn from_settings(settings: &ThrottleSettings) -> Self {
        Self::new()
            .with(Arc::new(RateLimiter::new(settings.max_calls, settings.window)))
            .with(Arc::new(ResourceMonitor::new(
                settings.failure_threshold,
                settings.recovery_wait,
            )))
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

impl CallGate for GateChain {
    fn try_acquire(&self) -> bool {
        // Later gates are not asked once one denies, so no permit is wasted
        self.gates.iter().all(|gate| gate.try_acquire())
    }

    fn record_call(&self, outcome: CallOutcome) {
        for gate in &self.gates {
            gate.record_call(outcome);
        }
    }
}

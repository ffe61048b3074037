//! Cooperative cancellation for search.
//!
//! A single global "time limit" may be set before entering iterative
//! deepening (spec §5). Every node polls an [`AtomicBool`] rather than
//! being interrupted: a positive poll unwinds the current recursion by
//! returning the static evaluation without further TT writes. Grounded on
//! the teacher's `sync::StopFlag` / `timer::DeadlineTimer` pair, collapsed
//! into one type since this crate has no UCI layer that needs them split.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Shared stop flag plus a node counter, handed to every search frame.
/// Cloning is cheap (both fields are `Arc`-backed) so parallel workers can
/// each hold their own handle to the same underlying state.
#[derive(Clone)]
pub struct SearchControl {
    stop: Arc<AtomicBool>,
    nodes: Arc<AtomicU64>,
    generation: Arc<AtomicU64>,
}

impl SearchControl {
    pub fn new() -> SearchControl {
        SearchControl {
            stop: Arc::new(AtomicBool::new(false)),
            nodes: Arc::new(AtomicU64::new(0)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Resets stop/node state for a new search and bumps the generation
    /// counter, so a [`DeadlineTimer`] left over from a prior search on this
    /// same `SearchControl` can tell it is stale and not stop the new one.
    pub fn reset(&self) {
        self.stop.store(false, Ordering::Relaxed);
        self.nodes.store(0, Ordering::Relaxed);
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn count_node(&self) {
        self.nodes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }
}

impl Default for SearchControl {
    fn default() -> Self {
        SearchControl::new()
    }
}

/// Starts a background thread that flips `control`'s stop flag once
/// `duration` elapses. This is a hard backstop on top of the per-iteration
/// soft deadline the root driver already checks; most searches finish (or
/// get cancelled by the soft check) before it ever fires.
///
/// `EngineContext` keeps one `SearchControl` alive across calls and clones
/// it into a fresh timer on every timed search. `cancel` only drops this
/// struct's `JoinHandle` — it cannot reach into the OS thread and kill the
/// sleep early — so a timer from a just-finished search can still be
/// sleeping when a later, unrelated search starts on the same context. The
/// spawned thread captures `control`'s generation at spawn time and checks
/// it again after waking; `reset` bumps the generation on every new search,
/// so a stale timer's `stop()` becomes a no-op instead of cutting off a
/// search it was never timing.
pub struct DeadlineTimer {
    handle: Option<JoinHandle<()>>,
}

impl DeadlineTimer {
    pub fn start(duration: Duration, control: SearchControl) -> Option<DeadlineTimer> {
        if duration.is_zero() {
            control.stop();
            return None;
        }
        let generation = control.generation();
        let handle = thread::spawn(move || {
            thread::sleep(duration);
            if control.generation() == generation {
                control.stop();
            }
        });
        Some(DeadlineTimer {
            handle: Some(handle),
        })
    }

    pub fn cancel(mut self) {
        self.handle.take();
    }
}

/// Returns `true` once `fraction` of `(start, limit)` has elapsed. Used by
/// the root driver to refuse starting a new iterative-deepening depth once
/// 85-90% of the time budget is spent (spec §5).
pub fn budget_mostly_spent(start: Instant, limit: Duration, fraction: f64) -> bool {
    let elapsed = start.elapsed();
    elapsed.as_secs_f64() >= limit.as_secs_f64() * fraction
}

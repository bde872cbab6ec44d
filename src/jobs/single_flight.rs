//! Single-flight guard
//!
//! Small reusable primitive ensuring only one instance of an operation runs
//! at a time; concurrent acquisition attempts fail fast instead of queueing.
//! The flag is released on guard drop, so it clears even when the guarded
//! work panics.

use std::sync::atomic::{AtomicBool, Ordering};

/// One-at-a-time execution gate
pub struct SingleFlight {
    running: AtomicBool,
}

impl SingleFlight {
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
        }
    }

    /// Try to enter the guarded section. Returns `None` when another holder
    /// is already running.
    pub fn begin(&self) -> Option<SingleFlightGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()?;
        Some(SingleFlightGuard { owner: self })
    }

    /// Whether the guarded section is currently held
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Default for SingleFlight {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases the gate on drop
pub struct SingleFlightGuard<'a> {
    owner: &'a SingleFlight,
}

impl Drop for SingleFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_fails_while_held() {
        let gate = SingleFlight::new();
        let guard = gate.begin().unwrap();
        assert!(gate.begin().is_none());
        assert!(gate.is_running());
        drop(guard);
        assert!(gate.begin().is_some());
    }

    #[test]
    fn test_released_on_panic() {
        let gate = SingleFlight::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = gate.begin().unwrap();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(!gate.is_running());
    }

    #[test]
    fn test_only_one_winner_under_contention() {
        use std::sync::{Arc, Barrier};

        let gate = Arc::new(SingleFlight::new());
        let start = Arc::new(Barrier::new(8));
        let hold = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = gate.clone();
                let start = start.clone();
                let hold = hold.clone();
                std::thread::spawn(move || {
                    start.wait();
                    let guard = gate.begin();
                    let won = guard.is_some();
                    // Keep the winner's guard held until everyone has tried
                    hold.wait();
                    won
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(!gate.is_running());
    }
}

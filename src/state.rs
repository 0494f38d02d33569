// actimon — Shared activity state
//
// Written once per inference cycle, read once per transmit tick. The label,
// confidence and validity flag live behind one lock so a reader can never pair
// a new label with an old confidence.

use parking_lot::Mutex;

use crate::confidence::ResolvedActivity;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Snapshot {
    pub resolved: ResolvedActivity,
    /// False until the first successful inference cycle; never reverts.
    pub valid: bool,
}

#[derive(Debug, Default)]
pub struct ActivityState {
    inner: Mutex<Snapshot>,
}

impl ActivityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a freshly resolved activity. Inference task only.
    pub fn update(&self, resolved: ResolvedActivity) {
        *self.inner.lock() = Snapshot {
            resolved,
            valid: true,
        };
    }

    /// Consistent copy of the current state. Transmit task only.
    pub fn snapshot(&self) -> Snapshot {
        *self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Activity;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_starts_invalid() {
        let state = ActivityState::new();
        assert!(!state.snapshot().valid);
    }

    #[test]
    fn test_update_sets_valid_for_good() {
        let state = ActivityState::new();
        state.update(ResolvedActivity::new(Activity::Sitting, 0.9));
        state.update(ResolvedActivity::new(Activity::Jogging, 0.4));

        let snap = state.snapshot();
        assert!(snap.valid);
        assert_eq!(snap.resolved, ResolvedActivity::new(Activity::Jogging, 0.4));
    }

    #[test]
    fn test_concurrent_snapshots_are_never_torn() {
        // Each label is always written with its own fixed confidence, so a
        // mismatched pair can only come from a torn read.
        fn confidence_for(activity: Activity) -> f32 {
            0.1 + activity.index() as f32 * 0.1
        }

        let state = Arc::new(ActivityState::new());
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let state = Arc::clone(&state);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                for i in 0..20_000 {
                    let label = Activity::ALL[i % Activity::COUNT];
                    state.update(ResolvedActivity::new(label, confidence_for(label)));
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        while !done.load(Ordering::SeqCst) {
            let snap = state.snapshot();
            if snap.valid {
                assert_eq!(snap.resolved.confidence, confidence_for(snap.resolved.label));
            }
        }
        writer.join().unwrap();

        let last = state.snapshot();
        assert!(last.valid);
        assert_eq!(last.resolved.confidence, confidence_for(last.resolved.label));
    }
}

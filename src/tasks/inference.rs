// actimon — Inference Task
//
// Every INFERENCE_INTERVAL_MS: acquire one frame, classify it, resolve the
// label and publish it to the shared activity state. Runs whether or not a
// peer is connected so the serial log keeps showing activity.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::classifier::Classifier;
use crate::clock::{Clock, Ticker};
use crate::confidence::ResolvedActivity;
use crate::error::{Error, Result};
use crate::resolver::Resolver;
use crate::sampler::SampleSource;
use crate::state::ActivityState;

pub struct InferenceTask<S, K> {
    source: S,
    classifier: K,
    resolver: Resolver,
    state: Arc<ActivityState>,
    frame_samples: usize,
}

impl<S: SampleSource, K: Classifier> InferenceTask<S, K> {
    pub fn new(source: S, classifier: K, state: Arc<ActivityState>, frame_samples: usize) -> Self {
        Self {
            source,
            classifier,
            resolver: Resolver::new(),
            state,
            frame_samples,
        }
    }

    /// One acquire-classify-resolve cycle. On any error the shared state is
    /// left exactly as it was.
    pub fn run_cycle(&mut self) -> Result<ResolvedActivity> {
        let frame = self.source.read_frame(self.frame_samples)?;
        let confidences = self.classifier.classify(&frame)?;
        let resolved = self.resolver.resolve(&confidences)?;
        self.state.update(resolved);
        Ok(resolved)
    }
}

pub fn inference_task<S, K, C>(
    mut task: InferenceTask<S, K>,
    clock: C,
    period: Duration,
    shutdown: Arc<AtomicBool>,
) where
    S: SampleSource,
    K: Classifier,
    C: Clock,
{
    log::info!("Inference task started");

    let mut ticker = Ticker::new(period, clock.now());

    loop {
        let skipped = ticker.wait(&clock);
        if shutdown.load(Ordering::SeqCst) {
            log::info!("Inference task stopping");
            return;
        }
        if skipped > 0 {
            log::debug!("Inference cycle overran its period; {} tick(s) dropped", skipped);
        }

        match task.run_cycle() {
            Ok(resolved) => {
                log::info!(
                    "Activity: {} ({:.1}%)",
                    resolved.label,
                    resolved.confidence * 100.0
                );
            }
            Err(Error::InvalidInput(reason)) => {
                log::error!("Classifier produced an unusable confidence map: {}", reason);
            }
            Err(e) => {
                log::warn!("Inference cycle skipped: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::confidence::ConfidenceMap;
    use crate::error::ClassifierError;
    use crate::events::Activity;
    use crate::sampler::Frame;
    use parking_lot::Mutex;

    /// Frame source that takes a fixed amount of virtual time per frame.
    struct TimedSource {
        clock: ManualClock,
        cost: Duration,
        fail: bool,
    }

    impl SampleSource for TimedSource {
        fn read_frame(&mut self, len: usize) -> std::result::Result<Frame, ClassifierError> {
            self.clock.sleep(self.cost);
            if self.fail {
                return Err(ClassifierError::Sensor("i2c nack".into()));
            }
            Ok(vec![0.0; len * 3])
        }
    }

    /// Replays canned maps in order, repeating the last one.
    struct Scripted(Vec<ConfidenceMap>);

    impl Classifier for Scripted {
        fn classify(&mut self, _frame: &[f32]) -> std::result::Result<ConfidenceMap, ClassifierError> {
            if self.0.len() > 1 {
                Ok(self.0.remove(0))
            } else {
                Ok(self.0[0].clone())
            }
        }
    }

    fn source(clock: &ManualClock) -> TimedSource {
        TimedSource { clock: clock.clone(), cost: Duration::from_secs(4), fail: false }
    }

    #[test]
    fn test_cycle_publishes_resolved_activity() {
        let clock = ManualClock::new();
        let state = Arc::new(ActivityState::new());
        let map = ConfidenceMap::new()
            .with(Activity::Walking, 0.5)
            .with(Activity::Upstairs, 0.6);
        let mut task = InferenceTask::new(source(&clock), Scripted(vec![map]), Arc::clone(&state), 80);

        let resolved = task.run_cycle().unwrap();

        assert_eq!(resolved, ResolvedActivity::new(Activity::Walking, 0.5));
        let snap = state.snapshot();
        assert!(snap.valid);
        assert_eq!(snap.resolved, resolved);
    }

    #[test]
    fn test_empty_map_leaves_state_untouched() {
        let clock = ManualClock::new();
        let state = Arc::new(ActivityState::new());
        let maps = vec![
            ConfidenceMap::new().with(Activity::Sitting, 0.9),
            ConfidenceMap::new(),
        ];
        let mut task = InferenceTask::new(source(&clock), Scripted(maps), Arc::clone(&state), 80);

        task.run_cycle().unwrap();
        let before = state.snapshot();

        assert!(matches!(task.run_cycle(), Err(Error::InvalidInput(_))));
        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn test_acquisition_failure_keeps_state_invalid() {
        let clock = ManualClock::new();
        let state = Arc::new(ActivityState::new());
        let failing = TimedSource { clock: clock.clone(), cost: Duration::ZERO, fail: true };
        let map = ConfidenceMap::new().with(Activity::Jogging, 0.9);
        let mut task = InferenceTask::new(failing, Scripted(vec![map]), Arc::clone(&state), 80);

        assert!(matches!(task.run_cycle(), Err(Error::Classifier(_))));
        assert!(!state.snapshot().valid);
    }

    /// Records when each frame started and requests shutdown after `limit`.
    struct Recording {
        inner: TimedSource,
        starts: Arc<Mutex<Vec<Duration>>>,
        limit: usize,
        shutdown: Arc<AtomicBool>,
    }

    impl SampleSource for Recording {
        fn read_frame(&mut self, len: usize) -> std::result::Result<Frame, ClassifierError> {
            let mut starts = self.starts.lock();
            starts.push(self.inner.clock.now());
            if starts.len() >= self.limit {
                self.shutdown.store(true, Ordering::SeqCst);
            }
            drop(starts);
            self.inner.read_frame(len)
        }
    }

    #[test]
    fn test_overrunning_cycles_are_deferred_not_overlapped() {
        let clock = ManualClock::new();
        let state = Arc::new(ActivityState::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let starts = Arc::new(Mutex::new(Vec::new()));

        // 12 s of acquisition against a 5 s period.
        let source = Recording {
            inner: TimedSource { clock: clock.clone(), cost: Duration::from_secs(12), fail: false },
            starts: Arc::clone(&starts),
            limit: 3,
            shutdown: Arc::clone(&shutdown),
        };
        let map = ConfidenceMap::new().with(Activity::Standing, 0.8);
        let task = InferenceTask::new(source, Scripted(vec![map]), Arc::clone(&state), 80);

        inference_task(task, clock.clone(), Duration::from_secs(5), shutdown);

        let secs: Vec<u64> = starts.lock().iter().map(|d| d.as_secs()).collect();
        // Each cycle starts the moment the previous one ends.
        assert_eq!(secs, vec![0, 12, 24]);
        assert_eq!(state.snapshot().resolved.label, Activity::Standing);
    }

    #[test]
    fn test_on_time_cycles_follow_the_period() {
        let clock = ManualClock::new();
        let state = Arc::new(ActivityState::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let starts = Arc::new(Mutex::new(Vec::new()));

        let source = Recording {
            inner: source(&clock),
            starts: Arc::clone(&starts),
            limit: 3,
            shutdown: Arc::clone(&shutdown),
        };
        let map = ConfidenceMap::new().with(Activity::Sitting, 0.8);
        let task = InferenceTask::new(source, Scripted(vec![map]), state, 80);

        inference_task(task, clock, Duration::from_secs(5), shutdown);

        let secs: Vec<u64> = starts.lock().iter().map(|d| d.as_secs()).collect();
        assert_eq!(secs, vec![0, 5, 10]);
    }
}

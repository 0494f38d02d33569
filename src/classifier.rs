// actimon — Activity Classifier Interface
//
// Two back-ends sit behind the `Classifier` trait:
//   1. STUB (default) — an energy/orientation heuristic over the frame, so the
//      whole pipeline runs on a host or a board without the model linked in.
//   2. FFI — enable the `edge-impulse` feature; build.rs then compiles the
//      Edge Impulse C++ SDK and `EdgeImpulseClassifier` calls `run_classifier`.
//
// Both take a frame of interleaved x/y/z acceleration in m/s² and return the
// raw per-label confidences. Picking a winner is the resolver's job.

use crate::config::*;
use crate::confidence::ConfidenceMap;
use crate::error::ClassifierError;

pub trait Classifier: Send {
    fn classify(&mut self, frame: &[f32]) -> Result<ConfidenceMap, ClassifierError>;
}

impl<T: Classifier + ?Sized> Classifier for Box<T> {
    fn classify(&mut self, frame: &[f32]) -> Result<ConfidenceMap, ClassifierError> {
        (**self).classify(frame)
    }
}

fn check_len(frame: &[f32], expected: usize) -> Result<(), ClassifierError> {
    if frame.len() != expected {
        return Err(ClassifierError::FrameLength {
            expected,
            actual: frame.len(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Stub back-end
// ---------------------------------------------------------------------------

/// Standard deviation of |a| above which the wearer is considered moving.
const STILL_STD_MS2: f32 = 0.6;
const WALKING_STD_MS2: f32 = 2.5;
const UPSTAIRS_STD_MS2: f32 = 3.35;
const DOWNSTAIRS_STD_MS2: f32 = 5.0;

/// Heuristic classifier: buckets the spread of the acceleration magnitude and,
/// when still, looks at which axis carries gravity. The walking bucket is
/// deliberately a near-tie between the three gait classes, which is how the
/// real model behaves on level ground.
#[derive(Debug, Clone)]
pub struct StubClassifier {
    frame_len: usize,
}

impl StubClassifier {
    pub fn new(frame_samples: usize) -> Self {
        Self {
            frame_len: frame_samples * RAW_SAMPLES_PER_FRAME,
        }
    }
}

impl Default for StubClassifier {
    fn default() -> Self {
        Self::new(FRAME_SAMPLES)
    }
}

impl Classifier for StubClassifier {
    fn classify(&mut self, frame: &[f32]) -> Result<ConfidenceMap, ClassifierError> {
        check_len(frame, self.frame_len)?;
        if frame.is_empty() {
            return Err(ClassifierError::FrameLength { expected: 1, actual: 0 });
        }

        let samples = frame.len() / RAW_SAMPLES_PER_FRAME;
        let n = samples as f32;

        let magnitudes: Vec<f32> = frame
            .chunks_exact(RAW_SAMPLES_PER_FRAME)
            .map(|v| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt())
            .collect();
        let mean = magnitudes.iter().sum::<f32>() / n;
        let std = (magnitudes.iter().map(|m| (m - mean) * (m - mean)).sum::<f32>() / n).sqrt();

        // Order: Walking, Jogging, Sitting, Standing, Upstairs, Downstairs
        let preds = if std < STILL_STD_MS2 {
            let mean_abs = |axis: usize| {
                frame.iter().skip(axis).step_by(RAW_SAMPLES_PER_FRAME).map(|v| v.abs()).sum::<f32>() / n
            };
            if mean_abs(2) > mean_abs(1) {
                [0.02, 0.01, 0.90, 0.05, 0.01, 0.01] // sitting (thigh horizontal)
            } else {
                [0.03, 0.01, 0.08, 0.86, 0.01, 0.01] // standing
            }
        } else if std < WALKING_STD_MS2 {
            [0.31, 0.05, 0.01, 0.02, 0.34, 0.30] // level walking, gait classes tied
        } else if std < UPSTAIRS_STD_MS2 {
            [0.28, 0.04, 0.01, 0.01, 0.58, 0.10]
        } else if std < DOWNSTAIRS_STD_MS2 {
            [0.12, 0.06, 0.01, 0.01, 0.08, 0.74]
        } else {
            [0.06, 0.90, 0.01, 0.01, 0.02, 0.02] // jogging
        };

        log::debug!("STUB inference — std |a| = {:.2} m/s², preds = {:?}", std, preds);
        Ok(ConfidenceMap::from_scores(preds))
    }
}

// ---------------------------------------------------------------------------
// Real FFI back-end — calls the C++ Edge Impulse compiled library
// ---------------------------------------------------------------------------
#[cfg(feature = "edge-impulse")]
mod ffi {
    use std::ffi::c_char;

    #[repr(C)]
    pub struct EiSignal {
        pub get_data: Option<unsafe extern "C" fn(usize, usize, *mut f32) -> i32>,
        pub total_length: usize,
    }

    #[repr(C)]
    pub struct EiClassification {
        pub label: *const c_char,
        pub value: f32,
    }

    // The full struct has more fields; we only access `classification`.
    #[repr(C)]
    pub struct EiImpulseResult {
        pub classification: [EiClassification; crate::events::Activity::COUNT],
        pub anomaly: f32,
    }

    extern "C" {
        pub fn run_classifier(
            signal: *mut EiSignal,
            result: *mut EiImpulseResult,
            debug: bool,
        ) -> i32;
    }
}

/// Edge Impulse model linked in by build.rs. Only one instance may run
/// inference at a time; the inference task owns it.
#[cfg(feature = "edge-impulse")]
#[derive(Debug, Default)]
pub struct EdgeImpulseClassifier;

#[cfg(feature = "edge-impulse")]
impl Classifier for EdgeImpulseClassifier {
    fn classify(&mut self, frame: &[f32]) -> Result<ConfidenceMap, ClassifierError> {
        use std::ffi::CStr;

        use crate::events::Activity;

        check_len(frame, FRAME_LEN)?;

        // The SDK pulls the signal through a C callback, so the frame is
        // parked in statics for the duration of the call.
        static mut SIGNAL_BUF: *const f32 = std::ptr::null();
        static mut SIGNAL_LEN: usize = 0;

        unsafe extern "C" fn get_data(offset: usize, length: usize, out: *mut f32) -> i32 {
            unsafe {
                if SIGNAL_BUF.is_null() || offset + length > SIGNAL_LEN {
                    return -1;
                }
                core::ptr::copy_nonoverlapping(SIGNAL_BUF.add(offset), out, length);
            }
            0
        }

        let mut map = ConfidenceMap::new();

        // SAFETY: `&mut self` guarantees a single caller; the statics are reset
        // before returning.
        unsafe {
            SIGNAL_BUF = frame.as_ptr();
            SIGNAL_LEN = frame.len();

            let mut signal = ffi::EiSignal {
                get_data: Some(get_data),
                total_length: frame.len(),
            };
            let mut result: ffi::EiImpulseResult = core::mem::zeroed();
            let err = ffi::run_classifier(&mut signal, &mut result, false);

            SIGNAL_BUF = std::ptr::null();
            SIGNAL_LEN = 0;

            if err != 0 {
                return Err(ClassifierError::Backend(err));
            }

            for class in result.classification.iter() {
                let label = CStr::from_ptr(class.label).to_str().unwrap_or("?");
                match Activity::from_label(label) {
                    Some(activity) => map.insert(activity, class.value),
                    None => log::warn!("Model emitted unknown label {:?}", label),
                }
                log::debug!("{}: {:.4}", label, class.value);
            }
        }

        Ok(map)
    }
}

/// The classifier this build was compiled with.
pub fn default_classifier() -> Box<dyn Classifier> {
    #[cfg(feature = "edge-impulse")]
    {
        Box::new(EdgeImpulseClassifier)
    }

    #[cfg(not(feature = "edge-impulse"))]
    {
        Box::new(StubClassifier::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Activity;
    use crate::resolver::Resolver;

    fn frame_of(samples: usize, f: impl Fn(usize) -> [f32; 3]) -> Vec<f32> {
        (0..samples).flat_map(f).collect()
    }

    #[test]
    fn test_rejects_wrong_frame_length() {
        let mut classifier = StubClassifier::new(10);
        let err = classifier.classify(&[0.0; 9]).unwrap_err();
        assert!(matches!(err, ClassifierError::FrameLength { expected: 30, actual: 9 }));
    }

    #[test]
    fn test_still_frame_uses_gravity_axis() {
        let mut classifier = StubClassifier::new(20);

        let flat = frame_of(20, |_| [0.1, 0.2, 9.8]);
        let map = classifier.classify(&flat).unwrap();
        assert_eq!(Resolver::new().resolve(&map).unwrap().label, Activity::Sitting);

        let upright = frame_of(20, |_| [0.1, 9.8, 0.2]);
        let map = classifier.classify(&upright).unwrap();
        assert_eq!(Resolver::new().resolve(&map).unwrap().label, Activity::Standing);
    }

    #[test]
    fn test_vigorous_frame_is_jogging() {
        let mut classifier = StubClassifier::new(20);
        let frame = frame_of(20, |i| if i % 2 == 0 { [0.0, 19.6, 0.0] } else { [0.0, 0.0, 0.0] });
        let map = classifier.classify(&frame).unwrap();
        assert_eq!(Resolver::new().resolve(&map).unwrap().label, Activity::Jogging);
    }

    #[test]
    fn test_walking_bucket_is_a_gait_near_tie() {
        let mut classifier = StubClassifier::new(20);
        // |a| alternates 8.0 / 12.0 -> std 2.0
        let frame = frame_of(20, |i| if i % 2 == 0 { [0.0, 8.0, 0.0] } else { [0.0, 12.0, 0.0] });
        let map = classifier.classify(&frame).unwrap();

        let raw = crate::resolver::raw_argmax(&map).unwrap();
        assert_eq!(raw.label, Activity::Upstairs);
        assert_eq!(Resolver::new().resolve(&map).unwrap().label, Activity::Walking);
    }
}

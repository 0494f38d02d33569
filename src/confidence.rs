// actimon — Classifier output types

use crate::events::Activity;

/// Per-label scores from one inference cycle.
///
/// Scores are conventionally in [0, 1] but need not sum to 1. A label may be
/// missing entirely; iteration always follows [`Activity`] declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfidenceMap {
    scores: [Option<f32>; Activity::COUNT],
}

impl ConfidenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from a full score vector laid out in declaration order.
    pub fn from_scores(scores: [f32; Activity::COUNT]) -> Self {
        Self {
            scores: scores.map(Some),
        }
    }

    pub fn insert(&mut self, activity: Activity, confidence: f32) {
        self.scores[activity.index()] = Some(confidence);
    }

    pub fn with(mut self, activity: Activity, confidence: f32) -> Self {
        self.insert(activity, confidence);
        self
    }

    pub fn get(&self, activity: Activity) -> Option<f32> {
        self.scores[activity.index()]
    }

    /// Confidence for `activity`, treating a missing entry as 0.
    pub fn score(&self, activity: Activity) -> f32 {
        self.get(activity).unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.scores.iter().all(Option::is_none)
    }

    pub fn len(&self) -> usize {
        self.scores.iter().filter(|s| s.is_some()).count()
    }

    /// Present entries in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (Activity, f32)> + '_ {
        Activity::ALL
            .iter()
            .zip(self.scores.iter())
            .filter_map(|(&activity, score)| score.map(|s| (activity, s)))
    }
}

impl FromIterator<(Activity, f32)> for ConfidenceMap {
    fn from_iter<I: IntoIterator<Item = (Activity, f32)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (activity, confidence) in iter {
            map.insert(activity, confidence);
        }
        map
    }
}

/// The label reported for a cycle, after bias correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedActivity {
    pub label: Activity,
    pub confidence: f32,
}

impl ResolvedActivity {
    pub fn new(label: Activity, confidence: f32) -> Self {
        Self { label, confidence }
    }
}

impl Default for ResolvedActivity {
    fn default() -> Self {
        Self::new(Activity::Standing, 0.0)
    }
}

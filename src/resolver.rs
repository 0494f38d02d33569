// actimon — Activity Resolver
//
// Turns the classifier's raw confidence map into the single reported activity.
// The classifier regularly confuses level walking with stair climbing, so the
// raw arg-max is passed through an ordered pipeline of correction stages that
// pull near-ties back towards Walking.

use crate::config::*;
use crate::confidence::{ConfidenceMap, ResolvedActivity};
use crate::error::{Error, Result};
use crate::events::Activity;

/// One bias-correction step.
///
/// A stage sees the full raw map plus the candidate produced by the stages
/// before it, and returns the next candidate. Stages must be pure.
pub trait Correction: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, confidences: &ConfidenceMap, candidate: ResolvedActivity) -> ResolvedActivity;
}

/// Strictly greatest entry in scan order; the first seen wins an exact tie.
pub fn raw_argmax(confidences: &ConfidenceMap) -> Option<ResolvedActivity> {
    let mut best: Option<ResolvedActivity> = None;
    for (label, confidence) in confidences.iter() {
        match best {
            Some(b) if confidence <= b.confidence => {}
            _ => best = Some(ResolvedActivity::new(label, confidence)),
        }
    }
    best
}

/// Case 1: a stair winner is replaced by Walking when Walking trails it by
/// less than [`MARGIN_WINDOW`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MarginOverride;

impl Correction for MarginOverride {
    fn name(&self) -> &'static str {
        "margin"
    }

    fn apply(&self, confidences: &ConfidenceMap, candidate: ResolvedActivity) -> ResolvedActivity {
        let walking = confidences.score(Activity::Walking);
        if candidate.label.is_stairs()
            && walking > MARGIN_MIN_WALKING
            && walking > candidate.confidence - MARGIN_WINDOW
        {
            ResolvedActivity::new(Activity::Walking, walking)
        } else {
            candidate
        }
    }
}

/// Case 2: when Walking, Upstairs and Downstairs all sit within
/// [`NEAR_TIE_SPREAD`] of each other, Walking wins regardless of the candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearTieOverride;

impl Correction for NearTieOverride {
    fn name(&self) -> &'static str {
        "near-tie"
    }

    fn apply(&self, confidences: &ConfidenceMap, candidate: ResolvedActivity) -> ResolvedActivity {
        let walking = confidences.score(Activity::Walking);
        let up = confidences.score(Activity::Upstairs);
        let down = confidences.score(Activity::Downstairs);

        let tied = (walking - up).abs() < NEAR_TIE_SPREAD
            && (walking - down).abs() < NEAR_TIE_SPREAD
            && (up - down).abs() < NEAR_TIE_SPREAD;

        if tied && walking > NEAR_TIE_MIN_WALKING {
            ResolvedActivity::new(Activity::Walking, walking)
        } else {
            candidate
        }
    }
}

pub struct Resolver {
    stages: Vec<Box<dyn Correction>>,
}

impl Default for Resolver {
    /// Margin override first, then the near-tie override, so a near-tie has
    /// the final say.
    fn default() -> Self {
        Self::with_stages(vec![Box::new(MarginOverride), Box::new(NearTieOverride)])
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stages(stages: Vec<Box<dyn Correction>>) -> Self {
        Self { stages }
    }

    /// Resolve a confidence map into the reported activity.
    ///
    /// Fails with [`Error::InvalidInput`] for an empty map or a non-finite
    /// score; otherwise always returns a label.
    pub fn resolve(&self, confidences: &ConfidenceMap) -> Result<ResolvedActivity> {
        if let Some((label, score)) = confidences.iter().find(|(_, s)| !s.is_finite()) {
            return Err(Error::InvalidInput(format!("non-finite confidence {score} for {label}")));
        }

        let raw = raw_argmax(confidences)
            .ok_or_else(|| Error::InvalidInput("confidence map is empty".into()))?;

        let resolved = self.stages.iter().fold(raw, |candidate, stage| {
            let next = stage.apply(confidences, candidate);
            if next != candidate {
                log::debug!(
                    "{} override: {} ({:.3}) -> {} ({:.3})",
                    stage.name(),
                    candidate.label,
                    candidate.confidence,
                    next.label,
                    next.confidence
                );
            }
            next
        });

        Ok(resolved)
    }
}

//! Operand-pair samplers.
//!
//! The generator only needs one capability from a pipeline: "give me a
//! candidate `(a, b)` for this slot". [`PairSampler`] is that seam. Lessons use
//! [`FocusSampler`], whose distribution is skewed by the lesson's focus rule;
//! mode presets use [`CarrySampler`], a uniform rejection sampler with a
//! carry policy.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::drill_engine::{
    models::{Constraints, Focus, LessonDefinition, OperandPair},
    rng::Mulberry32,
};

/// Draws per `FocusSampler::sample_operand_pair` call.
pub const PAIR_ATTEMPTS: usize = 200;
/// Draws per `CarrySampler::sample_operand_pair` call before the fallback pair.
pub const MODE_PAIR_ATTEMPTS: usize = 2000;

/// The focus sampler ran out of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerExhausted {
    pub attempts: usize,
}

pub trait PairSampler {
    fn sample_operand_pair(&self, rng: &mut Mulberry32) -> Result<OperandPair, SamplerExhausted>;
}

// ---------------------------------------------------------------------------
// Focus-rule sampler (lesson pipeline)
// ---------------------------------------------------------------------------

pub struct FocusSampler<'a> {
    lesson: &'a LessonDefinition,
    constraints: Constraints,
}

impl<'a> FocusSampler<'a> {
    pub fn new(lesson: &'a LessonDefinition, constraints: Constraints) -> Self {
        FocusSampler { lesson, constraints }
    }

    /// One draw following the focus rule. No validity checks.
    fn draw(&self, rng: &mut Mulberry32) -> OperandPair {
        let max_sum = self.lesson.max_sum;
        match &self.lesson.focus {
            Focus::Zero => {
                let a = rng.scaled(max_sum.saturating_add(1));
                OperandPair::new(a, 0)
            }
            Focus::One => {
                let a = rng.scaled(max_sum);
                OperandPair::new(a, 1)
            }
            Focus::ZeroOneMix | Focus::MixWithOne => {
                let b = if rng.chance(0.5) { 0 } else { 1 };
                let a = rng.scaled(max_sum.saturating_sub(b).saturating_add(1));
                OperandPair::new(a, b)
            }
            Focus::Small23 | Focus::Small45 | Focus::MixWith23 => {
                let preferred = self.lesson.preferred_small.as_deref().unwrap_or(&[]);
                let b = match rng.pick_one(preferred) {
                    Some(&small) => small,
                    None => 2 + rng.scaled(2),
                };
                let a = rng.scaled(max_sum.saturating_sub(b).saturating_add(1));
                OperandPair::new(a, b)
            }
            Focus::SumLe(_) | Focus::Review | Focus::Mix | Focus::Capstone | Focus::Other(_) => {
                let span = max_sum.saturating_add(1);
                let a = rng.scaled(span);
                let b = rng.scaled(span);
                OperandPair::new(a, b)
            }
        }
    }

    fn accepts(&self, pair: OperandPair) -> bool {
        let c = &self.constraints;
        i64::from(pair.a) + i64::from(pair.b) <= i64::from(self.lesson.max_sum)
            && (c.min..=c.max).contains(&pair.a)
            && (c.min..=c.max).contains(&pair.b)
    }
}

impl PairSampler for FocusSampler<'_> {
    fn sample_operand_pair(&self, rng: &mut Mulberry32) -> Result<OperandPair, SamplerExhausted> {
        for _ in 0..PAIR_ATTEMPTS {
            let pair = self.draw(rng);
            if self.accepts(pair) {
                return Ok(pair);
            }
        }
        Err(SamplerExhausted { attempts: PAIR_ATTEMPTS })
    }
}

// ---------------------------------------------------------------------------
// Carry-policy sampler (mode pipeline)
// ---------------------------------------------------------------------------

/// Whether adding the units digits must, must not, or may reach ten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarryPolicy {
    None,
    Must,
    Any,
}

impl CarryPolicy {
    pub fn allows(self, pair: OperandPair) -> bool {
        let carry = pair.a % 10 + pair.b % 10 >= 10;
        match self {
            CarryPolicy::None => !carry,
            CarryPolicy::Must => carry,
            CarryPolicy::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarrySampler {
    pub min: i32,
    pub max: i32,
    pub sum_max: i32,
    pub carry: CarryPolicy,
}

impl PairSampler for CarrySampler {
    /// Never fails: after [`MODE_PAIR_ATTEMPTS`] misses it returns `(min, min)`.
    fn sample_operand_pair(&self, rng: &mut Mulberry32) -> Result<OperandPair, SamplerExhausted> {
        let span = self.max.saturating_sub(self.min).saturating_add(1);
        for _ in 0..MODE_PAIR_ATTEMPTS {
            let a = self.min.saturating_add(rng.scaled(span));
            let b = self.min.saturating_add(rng.scaled(span));
            let pair = OperandPair::new(a, b);
            if i64::from(a) + i64::from(b) > i64::from(self.sum_max) {
                continue;
            }
            if self.carry.allows(pair) {
                return Ok(pair);
            }
        }
        warn!(
            min = self.min,
            max = self.max,
            sum_max = self.sum_max,
            carry = ?self.carry,
            "mode sampler fell back to the smallest pair"
        );
        Ok(OperandPair::new(self.min, self.min))
    }
}

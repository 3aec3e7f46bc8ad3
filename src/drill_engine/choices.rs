//! Multiple-choice option builder.
//!
//! Produces the answer plus three distractors, escalating through four
//! tiers until three distractors exist:
//!
//! 1. configured candidate expressions (`ans-1`, `abs(a-b)`, …), clamped
//!    into the distractor range, shuffled;
//! 2. any other value of the distractor range, shuffled;
//! 3. the range widened by 5 on each side (floor 0), shuffled;
//! 4. `answer ± 0..=5` clamped into the range, duplicates tolerated.
//!
//! Tier 4 cannot fail, so the builder is infallible. With a valid
//! configuration (`min <= max`) tier 3 always yields enough values and
//! tier 4 is never reached.

use tracing::debug;

use crate::drill_engine::{
    models::{GeneratorParameters, CHOICE_COUNT},
    rng::Mulberry32,
};

const DISTRACTORS: usize = CHOICE_COUNT - 1;
const WIDEN_BY: i32 = 5;

fn clamp(v: i32, min: i32, max: i32) -> i32 {
    v.min(max).max(min)
}

/// Shuffle `pool` and append entries until `out` holds enough distractors.
fn fill_from(out: &mut Vec<i32>, pool: &[i32], rng: &mut Mulberry32) {
    for v in rng.shuffle(pool) {
        if out.len() >= DISTRACTORS {
            break;
        }
        out.push(v);
    }
}

fn range_pool(lo: i32, hi: i32, answer: i32, taken: &[i32]) -> Vec<i32> {
    (lo..=hi).filter(|v| *v != answer && !taken.contains(v)).collect()
}

/// Answer plus three distractors, in shuffled display order.
pub fn build_choice_options(
    a: i32,
    b: i32,
    answer: i32,
    params: &GeneratorParameters,
    rng: &mut Mulberry32,
) -> [i32; CHOICE_COUNT] {
    let cfg = &params.choice_distractors;
    let (min, max) = (cfg.min, cfg.max);

    // tier 1
    let mut candidates: Vec<i32> = Vec::with_capacity(cfg.candidates.len());
    for expr in &cfg.candidates {
        let v = clamp(expr.eval(a, b, answer), min, max);
        if v != answer && !candidates.contains(&v) {
            candidates.push(v);
        }
    }
    let mut distractors: Vec<i32> = Vec::with_capacity(DISTRACTORS);
    fill_from(&mut distractors, &candidates, rng);

    // tier 2
    if distractors.len() < DISTRACTORS {
        debug!(answer, have = distractors.len(), "choice builder: filling from range");
        let pool = range_pool(min, max, answer, &distractors);
        fill_from(&mut distractors, &pool, rng);
    }

    // tier 3
    if distractors.len() < DISTRACTORS {
        debug!(answer, have = distractors.len(), "choice builder: widening range");
        let lo = min.saturating_sub(WIDEN_BY).max(0);
        let pool = range_pool(lo, max.saturating_add(WIDEN_BY), answer, &distractors);
        fill_from(&mut distractors, &pool, rng);
    }

    // tier 4
    while distractors.len() < DISTRACTORS {
        let offset = rng.scaled(2 * WIDEN_BY + 1) - WIDEN_BY;
        let v = clamp(answer.saturating_add(offset), min, max);
        distractors.push(if v != answer { v } else { clamp(answer.saturating_add(1), min, max) });
    }

    let mut options = [answer; CHOICE_COUNT];
    options[1..].copy_from_slice(&distractors);
    let shuffled = rng.shuffle(&options);
    options.copy_from_slice(&shuffled);
    options
}

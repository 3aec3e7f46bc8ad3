//! Lesson orchestration.
//!
//! Both pipelines run through the same slot loop in [`Orchestrator::run`].
//! They differ only in data:
//!
//! - the [`PairSampler`] that proposes `(a, b)` candidates,
//! - the [`RenderSchedule`] deciding which slots become counting problems,
//! - whether an [`AntiRepeatGate`] filters candidates.
//!
//! ## RNG ordering
//!
//! Lesson-driven: one render coin (only when `renderMix.enabled`), one slot
//! index draw if the coin hit, then per slot either the render draws
//! (count, color, layout, choices) or, per attempt, the sampler draws
//! followed by the choice draws of the accepted attempt. Mode-driven: per
//! slot one render roll, then the same draws. Changing this order changes
//! every lesson for every seed.

use tracing::{debug, warn};

use crate::drill_engine::{
    anti_repeat::{AntiRepeatGate, RecentWindow},
    choices::build_choice_options,
    config::validate_lesson,
    error::{DrillError, SlotContext},
    models::{
        ColorToken, GeneratorParameters, LessonDefinition, Op, Problem, ProblemUi, RenderKind,
    },
    modes::ModePreset,
    render::{pick_color, pick_render_spec},
    rng::Mulberry32,
    sampler::{CarrySampler, FocusSampler, PairSampler},
};

/// Attempts per slot before the slot (and the call) fails.
pub const SLOT_ATTEMPTS: usize = 400;
/// Attempts across a whole generation call.
pub const MAX_TOTAL_ATTEMPTS: usize = 20_000;
/// Visual counts never exceed this, whatever the configuration says.
pub const RENDER_COUNT_CEILING: i32 = 10;

/// Attempt bookkeeping for one generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Arithmetic attempts across all slots.
    pub total_attempts: usize,
    /// Attempts spent per slot; zero for counting slots.
    pub slot_attempts: Vec<usize>,
    /// Slots placed after de-duplication was relaxed.
    pub relaxed_slots: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLesson {
    pub problems: Vec<Problem>,
    pub stats: GenerationStats,
}

/// Which slots become counting problems.
#[derive(Debug, Clone)]
enum RenderSchedule<'a> {
    None,
    /// At most one pre-drawn slot (lesson pipeline).
    Reserved {
        slot: usize,
        count_min: i32,
        count_max: i32,
        kinds: &'a [RenderKind],
    },
    /// Every slot rolls independently (mode pipeline).
    PerSlot {
        rate: f64,
        count_min: i32,
        count_max: i32,
    },
}

impl RenderSchedule<'_> {
    fn count_range(&self) -> Option<(i32, i32)> {
        match *self {
            RenderSchedule::None => None,
            RenderSchedule::Reserved { count_min, count_max, .. }
            | RenderSchedule::PerSlot { count_min, count_max, .. } => Some((count_min, count_max)),
        }
    }

    /// Whether `slot` is a counting slot. Draws once per slot for `PerSlot`.
    fn is_render_slot(&self, slot: usize, rng: &mut Mulberry32) -> bool {
        match *self {
            RenderSchedule::None => false,
            RenderSchedule::Reserved { slot: reserved, .. } => slot == reserved,
            RenderSchedule::PerSlot { rate, .. } => rng.chance(rate),
        }
    }
}

struct Orchestrator<'a, S> {
    unit_id: &'a str,
    params: &'a GeneratorParameters,
    sampler: S,
    schedule: RenderSchedule<'a>,
    /// Mode pipeline avoids repeating the previous counting slot's color.
    avoid_last_color: bool,
    /// Arithmetic slots below this index are multiple choice, the rest keypad.
    choice_slots: usize,
    context: Box<dyn Fn(usize) -> SlotContext + 'a>,
}

impl<S: PairSampler> Orchestrator<'_, S> {
    fn run(
        &self,
        rng: &mut Mulberry32,
        mut gate: Option<AntiRepeatGate<'_>>,
    ) -> Result<GeneratedLesson, DrillError> {
        let count = self.params.lesson.problem_count;
        let mut problems = Vec::with_capacity(count);
        let mut stats = GenerationStats { slot_attempts: Vec::with_capacity(count), ..Default::default() };
        let mut last_color: Option<ColorToken> = None;

        for slot in 0..count {
            if self.schedule.is_render_slot(slot, rng) {
                let avoid = if self.avoid_last_color { last_color } else { None };
                let problem = self.render_problem(rng, avoid, &mut last_color);
                problems.push(problem);
                stats.slot_attempts.push(0);
                continue;
            }

            let mut placed = false;
            for attempt in 0..SLOT_ATTEMPTS {
                stats.total_attempts += 1;
                if stats.total_attempts > MAX_TOTAL_ATTEMPTS {
                    return Err(DrillError::GenerationExhausted {
                        context: (self.context)(slot),
                        total: MAX_TOTAL_ATTEMPTS,
                    });
                }

                let pair = self.sampler.sample_operand_pair(rng).map_err(|e| {
                    DrillError::ExhaustedRetries { context: (self.context)(slot), attempts: e.attempts }
                })?;
                let key = pair.key();

                if let Some(gate) = gate.as_mut() {
                    if !gate.accepts(&key, attempt) {
                        continue;
                    }
                    gate.record(key);
                    if AntiRepeatGate::relaxed(attempt) {
                        warn!(slot, attempt, key = %key, "anti-repeat relaxed for slot");
                        stats.relaxed_slots.push(slot);
                    }
                }

                let answer = pair.sum();
                let problem = if slot < self.choice_slots {
                    Problem::ArithChoice {
                        unit_id: self.unit_id.to_string(),
                        op: Op::Add,
                        a: pair.a,
                        b: pair.b,
                        answer,
                        ui: ProblemUi::Choice,
                        choices: build_choice_options(pair.a, pair.b, answer, self.params, rng),
                    }
                } else {
                    Problem::ArithKeypad {
                        unit_id: self.unit_id.to_string(),
                        op: Op::Add,
                        a: pair.a,
                        b: pair.b,
                        answer,
                        ui: ProblemUi::Keypad,
                    }
                };
                problems.push(problem);
                stats.slot_attempts.push(attempt + 1);
                placed = true;
                break;
            }

            if !placed {
                return Err(DrillError::SlotExhausted { context: (self.context)(slot) });
            }
        }

        Ok(GeneratedLesson { problems, stats })
    }

    fn render_problem(
        &self,
        rng: &mut Mulberry32,
        avoid: Option<ColorToken>,
        last_color: &mut Option<ColorToken>,
    ) -> Problem {
        let (lo, hi) = self.schedule.count_range().unwrap_or((1, RENDER_COUNT_CEILING));
        let answer = lo + rng.scaled(hi - lo + 1);
        let fill = pick_color(rng, avoid);
        *last_color = Some(fill);
        let kinds: &[RenderKind] = match &self.schedule {
            RenderSchedule::Reserved { kinds, .. } => kinds,
            _ => &[],
        };
        let render_spec = pick_render_spec(answer.unsigned_abs(), rng, fill, kinds);
        let choices = build_choice_options(0, 0, answer, self.params, rng);
        Problem::RenderChoiceCount {
            unit_id: self.unit_id.to_string(),
            render_spec,
            answer,
            ui: ProblemUi::Choice,
            choices,
        }
    }
}

/// Generate one lesson and report how many attempts it took.
///
/// `recent` is the session's anti-repeat window; accepted pairs are pushed
/// into it so later lessons avoid them. Its capacity is reset to
/// `params.antiRepeat.recentProblemCacheSize`.
pub fn generate_lesson_report(
    unit_id: &str,
    lesson: &LessonDefinition,
    params: &GeneratorParameters,
    rng: &mut Mulberry32,
    recent: &mut RecentWindow,
) -> Result<GeneratedLesson, DrillError> {
    params.validate()?;
    validate_lesson(lesson)?;

    let count = params.lesson.problem_count;
    let schedule = match &params.render_mix {
        Some(rm) if rm.enabled && rng.chance(rm.rate) => {
            let slot = rng.index(count);
            if rm.max_per_lesson > 0 {
                let count_min = rm.count_min.clamp(1, RENDER_COUNT_CEILING);
                let count_max = rm
                    .count_max
                    .min(lesson.max_sum.max(1))
                    .min(RENDER_COUNT_CEILING)
                    .max(count_min);
                RenderSchedule::Reserved { slot, count_min, count_max, kinds: &rm.types }
            } else {
                RenderSchedule::None
            }
        }
        _ => RenderSchedule::None,
    };

    let orchestrator = Orchestrator {
        unit_id,
        params,
        sampler: FocusSampler::new(lesson, params.constraints),
        schedule,
        avoid_last_color: false,
        choice_slots: params.lesson.choice_count,
        context: Box::new(|slot| SlotContext::for_lesson(lesson, slot)),
    };
    let gate = AntiRepeatGate::new(params.anti_repeat, recent);
    let generated = orchestrator.run(rng, Some(gate))?;

    debug!(
        unit_id,
        lesson_id = %lesson.lesson_id,
        problems = generated.problems.len(),
        total_attempts = generated.stats.total_attempts,
        relaxed = generated.stats.relaxed_slots.len(),
        "lesson generated"
    );
    Ok(generated)
}

/// Generate one lesson: exactly `params.lesson.problemCount` problems.
pub fn generate_lesson(
    unit_id: &str,
    lesson: &LessonDefinition,
    params: &GeneratorParameters,
    rng: &mut Mulberry32,
    recent: &mut RecentWindow,
) -> Result<Vec<Problem>, DrillError> {
    generate_lesson_report(unit_id, lesson, params, rng, recent).map(|g| g.problems)
}

/// Mode-driven pipeline: each slot independently rolls against the mode's
/// render rate; sums come from uniform rejection sampling with a carry policy.
/// Every arithmetic slot is multiple choice, whatever `lesson.choiceCount` says.
pub fn generate_by_mode(
    unit_id: &str,
    mode: &ModePreset,
    params: &GeneratorParameters,
    rng: &mut Mulberry32,
) -> Result<Vec<Problem>, DrillError> {
    params.validate()?;

    let count_min = mode.count_min.clamp(1, RENDER_COUNT_CEILING);
    let orchestrator = Orchestrator {
        unit_id,
        params,
        sampler: CarrySampler {
            min: mode.min,
            max: mode.max,
            sum_max: mode.sum_max,
            carry: mode.carry,
        },
        schedule: RenderSchedule::PerSlot {
            rate: mode.render_rate,
            count_min,
            count_max: mode.count_max.min(RENDER_COUNT_CEILING).max(count_min),
        },
        avoid_last_color: true,
        choice_slots: usize::MAX,
        context: Box::new(|slot| SlotContext::for_mode(mode.id.as_str(), slot)),
    };
    let generated = orchestrator.run(rng, None)?;

    debug!(unit_id, mode = %mode.id, problems = generated.problems.len(), "mode lesson generated");
    Ok(generated.problems)
}

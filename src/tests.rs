//! Unit tests for the `sansu_drill_gen` crate.
//!
//! Included from `lib.rs` under `#[cfg(test)]`.
//!
//! # Coverage
//!
//! | Group | What is tested |
//! |-------|----------------|
//! | Determinism | Same seed → identical lesson; reference sequences for known seeds |
//! | Count | Every catalogue lesson yields `problemCount` problems for seeds 1..=200 |
//! | Arithmetic | `a + b == answer`, operands within constraints, sum within lesson `maxSum` |
//! | Choices | Four distinct options containing the answer, inside the configured range |
//! | Edge cases | `maxSum = 0` lessons still produce four valid options |
//! | Render | Illustration item count equals the answer; count within `[1, min(10, maxSum)]` |
//! | Anti-repeat | No repeated pair key unless the slot was placed under relaxation |
//! | Latency | Adversarial configurations fail with `GenerationExhausted` |

use std::collections::HashMap;

use crate::drill_engine::{
    generate_by_mode, generate_lesson, generate_lesson_report, mode_by_id, ColorToken, Curriculum,
    DrillError, GeneratorParameters, LessonDefinition, Mulberry32, Problem, RecentWindow,
    RenderSpec, Stage,
};

// ── helpers ──────────────────────────────────────────────────────────────────

fn curriculum() -> Curriculum {
    Curriculum::builtin().expect("built-in curriculum must validate")
}

/// Generate `lesson` with a fresh stream and an empty window.
fn run(lesson: &LessonDefinition, params: &GeneratorParameters, seed: u32) -> Vec<Problem> {
    let mut rng = Mulberry32::new(seed);
    let mut recent = RecentWindow::default();
    generate_lesson("U1-1", lesson, params, &mut rng, &mut recent)
        .unwrap_or_else(|e| panic!("{} seed={seed} failed: {e}", lesson.lesson_id))
}

fn ad_hoc(focus: &str, max_sum: i32) -> LessonDefinition {
    LessonDefinition {
        lesson_id: "TEST".into(),
        stage: Stage::A,
        focus: focus.to_string().into(),
        max_sum,
        preferred_small: None,
    }
}

fn assert_choices(p: &Problem, min: i32, max: i32) {
    let choices = p.choices().expect("choice problem");
    assert!(choices.contains(&p.answer()), "answer missing from {choices:?}");
    for (i, c) in choices.iter().enumerate() {
        assert!(
            (min..=max).contains(c),
            "choice {c} outside [{min},{max}] in {p:?}"
        );
        assert!(!choices[i + 1..].contains(c), "duplicate choice {c} in {p:?}");
    }
}

/// Compact view used by the reference-sequence tests.
#[derive(Debug, PartialEq)]
enum Shape {
    Sum(i32, i32, [i32; 4]),
    Grid(u32, u32, ColorToken, i32, [i32; 4]),
    Dots(u32, u32, ColorToken, i32, [i32; 4]),
}

fn shape(p: &Problem) -> Shape {
    match p {
        Problem::ArithChoice { a, b, choices, .. } => Shape::Sum(*a, *b, *choices),
        Problem::RenderChoiceCount { render_spec, answer, choices, .. } => match *render_spec {
            RenderSpec::GridRect { rows, cols, fill, .. } => Shape::Grid(rows, cols, fill, *answer, *choices),
            RenderSpec::ArrayDots { count, per_row, fill, .. } => {
                Shape::Dots(count, per_row, fill, *answer, *choices)
            }
        },
        Problem::ArithKeypad { .. } => panic!("unexpected keypad problem"),
    }
}

// ── determinism ──────────────────────────────────────────────────────────────

#[test]
fn same_seed_produces_identical_lessons() {
    let c = curriculum();
    for lesson in &c.catalogue.lessons {
        for seed in [1u32, 42, 999, 0xDEAD_BEEF] {
            assert_eq!(
                run(lesson, &c.params, seed),
                run(lesson, &c.params, seed),
                "{} seed={seed} is not reproducible",
                lesson.lesson_id
            );
        }
    }
}

#[test]
fn different_seeds_produce_varied_lessons() {
    let c = curriculum();
    let lesson = &c.catalogue.lessons[11];
    let mut same = 0;
    for seed in 0..40u32 {
        if run(lesson, &c.params, seed) == run(lesson, &c.params, seed + 500) {
            same += 1;
        }
    }
    assert!(same < 4, "too many identical lessons across seeds ({same}/40)");
}

#[test]
fn zero_focus_reference_sequence() {
    let c = curriculum();
    let got: Vec<Shape> = run(c.catalogue.lesson("U1-1-L01").unwrap(), &c.params, 12345)
        .iter()
        .map(shape)
        .collect();
    assert_eq!(
        got,
        vec![
            Shape::Sum(1, 0, [2, 1, 0, 3]),
            Shape::Sum(4, 0, [4, 3, 2, 5]),
            Shape::Sum(2, 0, [2, 1, 0, 4]),
            Shape::Sum(3, 0, [4, 0, 3, 5]),
            Shape::Sum(0, 0, [0, 1, 8, 2]),
            Shape::Sum(5, 0, [5, 4, 6, 0]),
        ]
    );
}

#[test]
fn small_focus_reference_sequence_with_render_slot() {
    let c = curriculum();
    let got: Vec<Shape> = run(c.catalogue.lesson("U1-1-L04").unwrap(), &c.params, 7)
        .iter()
        .map(shape)
        .collect();
    assert_eq!(
        got,
        vec![
            Shape::Grid(1, 7, ColorToken::C6, 7, [0, 8, 7, 9]),
            Shape::Sum(0, 3, [2, 1, 3, 5]),
            Shape::Sum(0, 2, [3, 0, 2, 4]),
            Shape::Sum(3, 3, [5, 7, 8, 6]),
            Shape::Sum(4, 2, [5, 6, 8, 4]),
            Shape::Sum(5, 2, [7, 9, 2, 3]),
        ]
    );
}

#[test]
fn capstone_reference_sequence() {
    let c = curriculum();
    let got: Vec<Shape> = run(c.catalogue.lesson("U1-1-L12").unwrap(), &c.params, 42)
        .iter()
        .map(shape)
        .collect();
    assert_eq!(
        got,
        vec![
            Shape::Sum(7, 1, [1, 10, 8, 7]),
            Shape::Sum(2, 5, [5, 8, 2, 7]),
            Shape::Sum(2, 0, [3, 4, 0, 2]),
            Shape::Sum(3, 4, [8, 9, 3, 7]),
            Shape::Sum(2, 3, [2, 1, 5, 7]),
            Shape::Sum(1, 1, [0, 2, 3, 4]),
        ]
    );
}

#[test]
fn carry_mode_reference_sequence() {
    let c = curriculum();
    let mut rng = Mulberry32::new(99);
    let got: Vec<Shape> = generate_by_mode("U1-1", mode_by_id(Some("add10_carry")), &c.params, &mut rng)
        .unwrap()
        .iter()
        .map(shape)
        .collect();
    assert_eq!(
        got,
        vec![
            Shape::Sum(8, 5, [5, 3, 10, 13]),
            Shape::Sum(4, 7, [3, 7, 11, 4]),
            Shape::Sum(4, 7, [10, 9, 4, 11]),
            Shape::Sum(7, 4, [11, 9, 3, 7]),
            Shape::Sum(6, 7, [13, 7, 10, 6]),
            Shape::Sum(7, 8, [15, 7, 8, 10]),
        ]
    );
}

#[test]
fn counting_mode_reference_sequence() {
    let c = curriculum();
    let mut rng = Mulberry32::new(5);
    let got: Vec<Shape> = generate_by_mode("U1-1", mode_by_id(Some("count10")), &c.params, &mut rng)
        .unwrap()
        .iter()
        .map(shape)
        .collect();
    assert_eq!(
        got,
        vec![
            Shape::Grid(2, 4, ColorToken::C2, 8, [9, 7, 10, 8]),
            Shape::Dots(1, 5, ColorToken::C5, 1, [2, 1, 0, 3]),
            Shape::Dots(8, 4, ColorToken::C2, 8, [10, 6, 0, 8]),
            Shape::Dots(10, 5, ColorToken::C3, 10, [10, 0, 9, 8]),
            Shape::Sum(6, 2, [7, 4, 2, 8]),
            Shape::Dots(9, 5, ColorToken::C2, 9, [8, 10, 7, 9]),
        ]
    );
}

// ── structural invariants across the catalogue ───────────────────────────────

#[test]
fn every_lesson_every_seed_keeps_count_constraints_and_choices() {
    let c = curriculum();
    let p = &c.params;
    let (cmin, cmax) = (p.choice_distractors.min, p.choice_distractors.max);

    for seed in 1..=200u32 {
        for lesson in &c.catalogue.lessons {
            let problems = run(lesson, p, seed);
            assert_eq!(
                problems.len(),
                p.lesson.problem_count,
                "{} seed={seed}",
                lesson.lesson_id
            );

            for prob in &problems {
                assert_eq!(prob.unit_id(), "U1-1");
                assert_choices(prob, cmin, cmax);
                match prob {
                    Problem::ArithChoice { a, b, answer, .. } => {
                        assert_eq!(a + b, *answer);
                        assert!((p.constraints.min..=p.constraints.max).contains(a));
                        assert!((p.constraints.min..=p.constraints.max).contains(b));
                        assert!(
                            a + b <= lesson.max_sum,
                            "{a}+{b} exceeds maxSum {} in {}",
                            lesson.max_sum,
                            lesson.lesson_id
                        );
                    }
                    Problem::RenderChoiceCount { render_spec, answer, .. } => {
                        assert_eq!(render_spec.item_count() as i32, *answer);
                        let ceiling = lesson.max_sum.max(1).min(10);
                        assert!(
                            (1..=ceiling).contains(answer),
                            "count {answer} outside [1,{ceiling}] in {}",
                            lesson.lesson_id
                        );
                    }
                    Problem::ArithKeypad { .. } => panic!("default params are all-choice"),
                }
            }
        }
    }
}

#[test]
fn render_slots_appear_somewhere_in_the_catalogue() {
    let c = curriculum();
    let lesson = &c.catalogue.lessons[9];
    let with_render = (1..=100u32)
        .filter(|&seed| run(lesson, &c.params, seed).iter().any(|p| p.render_spec().is_some()))
        .count();
    assert!(with_render > 10, "render mix rate 0.35 gave only {with_render}/100 lessons");
}

// ── edge cases ───────────────────────────────────────────────────────────────

#[test]
fn zero_answer_still_gets_four_valid_options() {
    let c = curriculum();
    let p = &c.params;
    let problems = run(&ad_hoc("ZERO", 0), p, 12345);
    assert_eq!(problems.len(), p.lesson.problem_count);
    for prob in &problems {
        if let Some((a, b)) = prob.operands().map(|o| (o.a, o.b)) {
            assert_eq!((a, b), (0, 0));
        }
        if prob.render_spec().is_some() {
            assert_eq!(prob.answer(), 1, "count ceiling is max(1, maxSum)");
        } else {
            assert_eq!(prob.answer(), 0);
        }
        assert_choices(prob, p.choice_distractors.min, p.choice_distractors.max);
    }
}

// ── anti-repeat ──────────────────────────────────────────────────────────────

#[test]
fn tiny_pair_space_only_repeats_after_relaxation() {
    // maxSum 2 has four keys (0+0, 1+0, 2+0, 1+1) for six slots.
    let c = curriculum();
    let mut params = c.params.clone();
    params.render_mix = None;
    let lesson = ad_hoc("SUM_LE_2", 2);

    let mut relaxed_total = 0;
    for seed in 1..=50u32 {
        let mut rng = Mulberry32::new(seed);
        let mut recent = RecentWindow::default();
        let report = generate_lesson_report("U1-1", &lesson, &params, &mut rng, &mut recent).unwrap();
        assert_eq!(report.problems.len(), 6);

        let mut first_slot = HashMap::new();
        for (slot, prob) in report.problems.iter().enumerate() {
            let key = prob.operands().expect("arithmetic slot").key();
            if first_slot.insert(key, slot).is_some() {
                assert!(
                    report.stats.relaxed_slots.contains(&slot),
                    "seed={seed}: slot {slot} repeats {key} without relaxation"
                );
            }
        }
        for &slot in &report.stats.relaxed_slots {
            assert!(report.stats.slot_attempts[slot] > 250);
        }
        relaxed_total += report.stats.relaxed_slots.len();
    }
    assert!(relaxed_total >= 100, "six slots over four keys must relax at least twice per lesson");
}

#[test]
fn roomy_lessons_never_repeat_within_a_lesson() {
    let c = curriculum();
    for lesson in c.catalogue.lessons.iter().filter(|l| l.max_sum >= 9) {
        for seed in 1..=50u32 {
            let problems = run(lesson, &c.params, seed);
            let mut keys: Vec<_> = problems.iter().filter_map(|p| p.operands()).map(|o| o.key()).collect();
            let n = keys.len();
            keys.sort();
            keys.dedup();
            assert_eq!(keys.len(), n, "{} seed={seed} repeated a pair", lesson.lesson_id);
        }
    }
}

// ── bounded latency ──────────────────────────────────────────────────────────

#[test]
fn adversarial_config_fails_fast_with_generation_exhausted() {
    // Only 0+0 exists, so every slot after the first burns 251 attempts.
    let c = curriculum();
    let mut params = c.params.clone();
    params.render_mix = None;
    params.lesson.problem_count = 100;
    params.lesson.choice_count = 100;

    let mut rng = Mulberry32::new(1);
    let mut recent = RecentWindow::default();
    let err = generate_lesson("U1-1", &ad_hoc("ZERO", 0), &params, &mut rng, &mut recent)
        .expect_err("must hit the global cap");
    match err {
        DrillError::GenerationExhausted { ref context, total } => {
            assert_eq!(total, 20_000);
            assert_eq!(context.slot, 80);
            assert_eq!(context.lesson_id, "TEST");
        }
        other => panic!("expected GenerationExhausted, got {other}"),
    }
}

#[test]
fn constraints_excluding_every_pair_fail_with_exhausted_retries() {
    let c = curriculum();
    let mut params = c.params.clone();
    params.constraints.min = 8;
    let lesson = ad_hoc("SUM_LE_5", 5);
    let mut rng = Mulberry32::new(3);
    let mut recent = RecentWindow::default();
    let err = generate_lesson("U1-1", &lesson, &params, &mut rng, &mut recent).unwrap_err();
    assert!(
        matches!(err, DrillError::ExhaustedRetries { attempts: 200, .. }),
        "unexpected error: {err}"
    );
}

//! # sansu_drill_gen
//!
//! A deterministic generator for early-arithmetic practice lessons.
//!
//! Lessons are short sequences of two-operand addition problems, each with
//! four multiple-choice options, occasionally replaced by a "count the dots"
//! illustration. The same `(lesson, seed)` pair always yields the same
//! sequence, so a lesson can be replayed from a URL or a test.
//!
//! ## How it works
//!
//! 1. Load a [`Curriculum`] (lesson catalogue + generator parameters) from
//!    JSON, or use [`Curriculum::builtin`].
//! 2. Seed a [`Mulberry32`] stream and keep a [`RecentWindow`] for the session
//!    (or let [`PlaySession`] hold both).
//! 3. Call [`generate_lesson`]: for each slot the engine samples an operand
//!    pair according to the lesson's focus rule, skips pairs seen recently,
//!    builds four distinct options, and occasionally swaps in a counting
//!    problem with a dot-array or grid layout.
//!
//! ## Key properties
//!
//! - **Deterministic**: same seed, same problems, same option order.
//! - **Bounded**: 200 draws per pair, 400 attempts per slot, 20 000 per
//!   lesson. Configurations that cannot be satisfied fail with a typed
//!   [`DrillError`] instead of hanging.
//! - **Always four options**: the option builder never fails, even for
//!   degenerate ranges such as an answer of 0.
//!
//! ## Quick start
//!
//! ```rust
//! use sansu_drill_gen::{generate_lesson, Curriculum, Mulberry32, RecentWindow};
//!
//! let curriculum = Curriculum::builtin().expect("built-in curriculum is valid");
//! let lesson = &curriculum.catalogue.lessons[0];
//!
//! let mut rng = Mulberry32::new(12345);
//! let mut recent = RecentWindow::default();
//! let problems = generate_lesson(
//!     curriculum.unit_id(),
//!     lesson,
//!     &curriculum.params,
//!     &mut rng,
//!     &mut recent,
//! )
//! .expect("built-in lessons always generate");
//!
//! assert_eq!(problems.len(), curriculum.params.lesson.problem_count);
//! for p in &problems {
//!     println!("{p}");
//! }
//! ```

pub mod drill_engine;

// Convenience re-exports so callers can use `sansu_drill_gen::generate_lesson`
// directly without reaching into `drill_engine::`.
pub use drill_engine::{
    build_choice_options, generate_by_mode, generate_lesson, generate_lesson_report, mode_by_id,
    try_mode_by_id, CarryPolicy, ColorToken, ConfigError, Curriculum, DrillError, Focus,
    GeneratedLesson, GenerationStats, GeneratorParameters, LessonCatalogue, LessonDefinition,
    ModeId, ModePreset, Mulberry32, OperandPair, PairKey, PlaySession, Problem, ProblemUi,
    RecentWindow, RenderKind, RenderSpec, Stage, MODES,
};

#[cfg(test)]
mod tests;

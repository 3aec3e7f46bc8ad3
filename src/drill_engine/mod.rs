//! Core drill engine: seeded sampling, distractors, counting illustrations
//! and the lesson orchestrator.
//!
//! ## Module overview
//!
//! | Module        | Purpose |
//! |---------------|---------|
//! | `models`      | Shared types: lesson definitions, parameters, problems, render specs |
//! | `rng`         | Mulberry32 stream with `pick_one` / Fisher-Yates `shuffle` |
//! | `config`      | JSON loading and validation; the built-in U1-1 curriculum |
//! | `error`       | `DrillError` / `ConfigError` |
//! | `sampler`     | Operand-pair samplers: focus rules (lessons), carry policy (modes) |
//! | `anti_repeat` | Recent-pair window and per-lesson de-duplication gate |
//! | `choices`     | Four-option builder with tiered distractor fallback |
//! | `render`      | Dot-array / grid layouts for counting problems |
//! | `modes`       | Mode presets for the mode-driven pipeline |
//! | `generator`   | `generate_lesson()` / `generate_by_mode()` |
//! | `session`     | `PlaySession`: seed + stream + window for one learner |

pub mod anti_repeat;
pub mod choices;
pub mod config;
pub mod error;
pub mod generator;
pub mod models;
pub mod modes;
pub mod render;
pub mod rng;
pub mod sampler;
pub mod session;

// Re-export the public API surface so callers can use
// `drill_engine::generate_lesson` without reaching into sub-modules.
pub use anti_repeat::RecentWindow;
pub use choices::build_choice_options;
pub use config::{Curriculum, LessonCatalogue, MAX_CONFIG_VALUE};
pub use error::{ConfigError, DrillError, SlotContext};
pub use generator::{
    generate_by_mode, generate_lesson, generate_lesson_report, GeneratedLesson, GenerationStats,
};
pub use models::{
    ColorToken, Constraints, DistractorExpr, Focus, GeneratorParameters, LessonDefinition,
    OperandPair, PairKey, Problem, ProblemUi, RenderKind, RenderSpec, Stage, CHOICE_COUNT,
};
pub use modes::{mode_by_id, try_mode_by_id, ModeId, ModePreset, MODES};
pub use render::pick_render_spec;
pub use rng::Mulberry32;
pub use sampler::CarryPolicy;
pub use session::PlaySession;

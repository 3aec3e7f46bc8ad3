//! Loading and validating the lesson catalogue and generator parameters.
//!
//! Both documents are JSON. `from_json_str` parses and then validates, so a
//! value that comes back `Ok` is safe to hand to the generator. Values built
//! in code should go through `validate()` before use.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::drill_engine::{
    error::ConfigError,
    models::{GeneratorParameters, LessonDefinition},
};

const BUILTIN_LESSONS: &str = include_str!("../../specs/u1-1/lesson_defs.json");
const BUILTIN_PARAMS: &str = include_str!("../../specs/u1-1/generator_params.json");

/// Largest magnitude accepted for any configured number (sums, operand and
/// distractor bounds, render counts).
pub const MAX_CONFIG_VALUE: i32 = 100_000;

fn check_bounded(field: impl Into<String>, value: i32) -> Result<(), ConfigError> {
    if (-MAX_CONFIG_VALUE..=MAX_CONFIG_VALUE).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::field(
            field,
            format!("must be within ±{MAX_CONFIG_VALUE} (got {value})"),
        ))
    }
}

/// Ordered list of lessons for one unit, in authoring sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonCatalogue {
    pub unit_id: String,
    pub lessons: Vec<LessonDefinition>,
}

impl LessonCatalogue {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let catalogue: LessonCatalogue = serde_json::from_str(json)?;
        catalogue.validate()?;
        Ok(catalogue)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unit_id.trim().is_empty() {
            return Err(ConfigError::field("unitId", "must not be empty"));
        }
        if self.lessons.is_empty() {
            return Err(ConfigError::field("lessons", "catalogue needs at least one lesson"));
        }
        let mut seen = HashSet::new();
        for lesson in &self.lessons {
            validate_lesson(lesson)?;
            if !seen.insert(lesson.lesson_id.as_str()) {
                return Err(ConfigError::field(
                    format!("lessons[{}].lessonId", lesson.lesson_id),
                    "duplicate lesson id",
                ));
            }
        }
        Ok(())
    }

    pub fn lesson(&self, lesson_id: &str) -> Result<&LessonDefinition, ConfigError> {
        self.lessons
            .iter()
            .find(|l| l.lesson_id == lesson_id)
            .ok_or_else(|| ConfigError::UnknownLesson(lesson_id.to_string()))
    }
}

/// Field-level checks for a single lesson.
pub fn validate_lesson(lesson: &LessonDefinition) -> Result<(), ConfigError> {
    if lesson.lesson_id.trim().is_empty() {
        return Err(ConfigError::field("lessonId", "must not be empty"));
    }
    if lesson.max_sum < 0 {
        return Err(ConfigError::field(
            format!("{}.maxSum", lesson.lesson_id),
            format!("must be non-negative (got {})", lesson.max_sum),
        ));
    }
    check_bounded(format!("{}.maxSum", lesson.lesson_id), lesson.max_sum)?;
    if let Some(small) = &lesson.preferred_small {
        if let Some(bad) = small.iter().find(|&&v| v < 0) {
            return Err(ConfigError::field(
                format!("{}.preferredSmall", lesson.lesson_id),
                format!("entries must be non-negative (got {bad})"),
            ));
        }
        for &v in small {
            check_bounded(format!("{}.preferredSmall", lesson.lesson_id), v)?;
        }
    }
    Ok(())
}

impl GeneratorParameters {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let params: GeneratorParameters = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.constraints;
        check_bounded("constraints.min", c.min)?;
        check_bounded("constraints.max", c.max)?;
        check_bounded("constraints.maxSum", c.max_sum)?;
        if c.min > c.max {
            return Err(ConfigError::field(
                "constraints",
                format!("min {} exceeds max {}", c.min, c.max),
            ));
        }
        if c.max_sum < 0 {
            return Err(ConfigError::field("constraints.maxSum", "must be non-negative"));
        }

        if self.lesson.problem_count == 0 {
            return Err(ConfigError::field("lesson.problemCount", "must be positive"));
        }

        let d = &self.choice_distractors;
        if d.candidates.is_empty() {
            return Err(ConfigError::field("choiceDistractors.candidates", "must not be empty"));
        }
        check_bounded("choiceDistractors.min", d.min)?;
        check_bounded("choiceDistractors.max", d.max)?;
        if d.min > d.max {
            return Err(ConfigError::field(
                "choiceDistractors",
                format!("min {} exceeds max {}", d.min, d.max),
            ));
        }

        if let Some(rm) = &self.render_mix {
            if !rm.rate.is_finite() || !(0.0..=1.0).contains(&rm.rate) {
                return Err(ConfigError::field(
                    "renderMix.rate",
                    format!("must be a finite probability (got {})", rm.rate),
                ));
            }
            check_bounded("renderMix.countMin", rm.count_min)?;
            check_bounded("renderMix.countMax", rm.count_max)?;
            if rm.count_min > rm.count_max {
                return Err(ConfigError::field(
                    "renderMix",
                    format!("countMin {} exceeds countMax {}", rm.count_min, rm.count_max),
                ));
            }
        }
        Ok(())
    }
}

/// A catalogue together with the parameters used to generate its lessons.
#[derive(Debug, Clone, PartialEq)]
pub struct Curriculum {
    pub catalogue: LessonCatalogue,
    pub params: GeneratorParameters,
}

impl Curriculum {
    pub fn new(catalogue: LessonCatalogue, params: GeneratorParameters) -> Result<Self, ConfigError> {
        catalogue.validate()?;
        params.validate()?;
        if let Some(unit) = &params.unit_id {
            if *unit != catalogue.unit_id {
                return Err(ConfigError::UnitMismatch {
                    catalogue: catalogue.unit_id.clone(),
                    params: unit.clone(),
                });
            }
        }
        for lesson in &catalogue.lessons {
            if lesson.max_sum > params.constraints.max_sum {
                warn!(
                    lesson_id = %lesson.lesson_id,
                    lesson_max_sum = lesson.max_sum,
                    constraints_max_sum = params.constraints.max_sum,
                    "lesson maxSum exceeds constraints.maxSum"
                );
            }
        }
        Ok(Curriculum { catalogue, params })
    }

    pub fn from_json_strs(lessons_json: &str, params_json: &str) -> Result<Self, ConfigError> {
        Curriculum::new(
            LessonCatalogue::from_json_str(lessons_json)?,
            GeneratorParameters::from_json_str(params_json)?,
        )
    }

    /// The U1-1 "addition within 10" unit bundled with the crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Curriculum::from_json_strs(BUILTIN_LESSONS, BUILTIN_PARAMS)
    }

    pub fn unit_id(&self) -> &str {
        &self.catalogue.unit_id
    }
}

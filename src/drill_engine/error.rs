use std::fmt;

use thiserror::Error;

use crate::drill_engine::models::{Focus, LessonDefinition, Stage};

/// Where a generation call gave up: enough to spot a misconfigured lesson.
///
/// Mode-driven calls have no stage or focus; `lesson_id` then holds the mode id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotContext {
    pub lesson_id: String,
    pub stage: Option<Stage>,
    pub focus: Option<Focus>,
    pub slot: usize,
}

impl SlotContext {
    pub fn for_lesson(lesson: &LessonDefinition, slot: usize) -> Self {
        SlotContext {
            lesson_id: lesson.lesson_id.clone(),
            stage: Some(lesson.stage),
            focus: Some(lesson.focus.clone()),
            slot,
        }
    }

    pub fn for_mode(mode_id: &str, slot: usize) -> Self {
        SlotContext { lesson_id: mode_id.to_string(), stage: None, focus: None, slot }
    }
}

impl fmt::Display for SlotContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lesson={}", self.lesson_id)?;
        if let Some(stage) = self.stage {
            write!(f, ", stage={stage}")?;
        }
        if let Some(focus) = &self.focus {
            write!(f, ", focus={focus}")?;
        }
        write!(f, ", i={}", self.slot)
    }
}

/// Configuration rejected before any generation is attempted.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("malformed configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid {field}: {reason}")]
    Field { field: String, reason: String },

    #[error("unit mismatch: lesson catalogue is '{catalogue}', generator parameters are '{params}'")]
    UnitMismatch { catalogue: String, params: String },

    #[error("no lesson with id '{0}'")]
    UnknownLesson(String),

    #[error("no mode with id '{0}'")]
    UnknownMode(String),
}

impl ConfigError {
    pub(crate) fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Field { field: field.into(), reason: reason.into() }
    }
}

/// Failure of one generation call. No partial problem list is ever returned.
#[derive(Error, Debug)]
pub enum DrillError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("failed to pick an operand pair in {attempts} attempts ({context})")]
    ExhaustedRetries { context: SlotContext, attempts: usize },

    #[error("could not place problem ({context})")]
    SlotExhausted { context: SlotContext },

    #[error("exceeded {total} total attempts ({context})")]
    GenerationExhausted { context: SlotContext, total: usize },
}

impl DrillError {
    /// Slot context for the retry-budget failures.
    pub fn context(&self) -> Option<&SlotContext> {
        match self {
            DrillError::InvalidConfiguration(_) => None,
            DrillError::ExhaustedRetries { context, .. }
            | DrillError::SlotExhausted { context }
            | DrillError::GenerationExhausted { context, .. } => Some(context),
        }
    }
}

//! Parameter presets for the mode-driven pipeline.
//!
//! A mode fixes the operand range, the sum ceiling, a carry policy and how
//! often a slot becomes a counting illustration instead of a sum.

use serde::{Deserialize, Serialize};

use crate::drill_engine::{error::ConfigError, sampler::CarryPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeId {
    #[serde(rename = "add10_nocarry")]
    Add10NoCarry,
    #[serde(rename = "add10_carry")]
    Add10Carry,
    #[serde(rename = "add20_nocarry")]
    Add20NoCarry,
    #[serde(rename = "count10")]
    Count10,
}

impl ModeId {
    pub fn as_str(self) -> &'static str {
        match self {
            ModeId::Add10NoCarry => "add10_nocarry",
            ModeId::Add10Carry   => "add10_carry",
            ModeId::Add20NoCarry => "add20_nocarry",
            ModeId::Count10      => "count10",
        }
    }
}

impl std::fmt::Display for ModeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModePreset {
    pub id: ModeId,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub min: i32,
    pub max: i32,
    pub sum_max: i32,
    pub carry: CarryPolicy,
    /// Per-slot probability of a counting illustration.
    pub render_rate: f64,
    pub count_min: i32,
    pub count_max: i32,
}

pub static MODES: [ModePreset; 4] = [
    ModePreset {
        id: ModeId::Add10NoCarry,
        title: "Addition to 10",
        subtitle: "no carrying",
        min: 1,
        max: 9,
        sum_max: 9,
        carry: CarryPolicy::None,
        render_rate: 0.2,
        count_min: 1,
        count_max: 10,
    },
    ModePreset {
        id: ModeId::Add10Carry,
        title: "Carrying addition",
        subtitle: "ones place past 10",
        min: 1,
        max: 9,
        sum_max: 18,
        carry: CarryPolicy::Must,
        render_rate: 0.2,
        count_min: 1,
        count_max: 10,
    },
    ModePreset {
        id: ModeId::Add20NoCarry,
        title: "Addition to 20",
        subtitle: "no carrying",
        min: 1,
        max: 19,
        sum_max: 20,
        carry: CarryPolicy::None,
        render_rate: 0.25,
        count_min: 1,
        count_max: 10,
    },
    ModePreset {
        id: ModeId::Count10,
        title: "Counting",
        subtitle: "1 to 10",
        min: 1,
        max: 9,
        sum_max: 9,
        carry: CarryPolicy::Any,
        render_rate: 0.8,
        count_min: 1,
        count_max: 10,
    },
];

/// Look a mode up by id.
pub fn try_mode_by_id(id: &str) -> Result<&'static ModePreset, ConfigError> {
    MODES
        .iter()
        .find(|m| m.id.as_str() == id)
        .ok_or_else(|| ConfigError::UnknownMode(id.to_string()))
}

/// Like [`try_mode_by_id`] but unknown or missing ids fall back to the first mode.
pub fn mode_by_id(id: Option<&str>) -> &'static ModePreset {
    id.and_then(|id| try_mode_by_id(id).ok()).unwrap_or(&MODES[0])
}

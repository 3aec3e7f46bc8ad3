use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::drill_engine::error::ConfigError;

/// Number of options shown for every multiple-choice problem.
pub const CHOICE_COUNT: usize = 4;

// ---------------------------------------------------------------------------
// Lesson definitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    A,
    B,
    C,
    D,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::A => write!(f, "A"),
            Stage::B => write!(f, "B"),
            Stage::C => write!(f, "C"),
            Stage::D => write!(f, "D"),
        }
    }
}

/// Named sampling bias attached to a lesson.
///
/// Parsed from the configuration string; anything not listed here samples
/// both operands uniformly, same as the `SUM_LE_*` / `REVIEW` / `MIX` /
/// `CAPSTONE` family.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Focus {
    Zero,
    One,
    ZeroOneMix,
    MixWithOne,
    Small23,
    Small45,
    MixWith23,
    SumLe(u32),
    Review,
    Mix,
    Capstone,
    Other(String),
}

impl FromStr for Focus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ZERO"         => Focus::Zero,
            "ONE"          => Focus::One,
            "ZERO_ONE_MIX" => Focus::ZeroOneMix,
            "MIX_WITH_ONE" => Focus::MixWithOne,
            "SMALL_2_3"    => Focus::Small23,
            "SMALL_4_5"    => Focus::Small45,
            "MIX_WITH_2_3" => Focus::MixWith23,
            "REVIEW"       => Focus::Review,
            "MIX"          => Focus::Mix,
            "CAPSTONE"     => Focus::Capstone,
            other => match other.strip_prefix("SUM_LE_").and_then(|n| n.parse().ok()) {
                Some(limit) => Focus::SumLe(limit),
                None => Focus::Other(other.to_string()),
            },
        })
    }
}

impl From<String> for Focus {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(focus) => focus,
            Err(never) => match never {},
        }
    }
}

impl From<Focus> for String {
    fn from(f: Focus) -> Self {
        f.to_string()
    }
}

impl fmt::Display for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Focus::Zero       => write!(f, "ZERO"),
            Focus::One        => write!(f, "ONE"),
            Focus::ZeroOneMix => write!(f, "ZERO_ONE_MIX"),
            Focus::MixWithOne => write!(f, "MIX_WITH_ONE"),
            Focus::Small23    => write!(f, "SMALL_2_3"),
            Focus::Small45    => write!(f, "SMALL_4_5"),
            Focus::MixWith23  => write!(f, "MIX_WITH_2_3"),
            Focus::SumLe(n)   => write!(f, "SUM_LE_{n}"),
            Focus::Review     => write!(f, "REVIEW"),
            Focus::Mix        => write!(f, "MIX"),
            Focus::Capstone   => write!(f, "CAPSTONE"),
            Focus::Other(s)   => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDefinition {
    pub lesson_id: String,
    pub stage: Stage,
    pub focus: Focus,
    pub max_sum: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_small: Option<Vec<i32>>,
}

// ---------------------------------------------------------------------------
// Generator parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    pub min: i32,
    pub max: i32,
    pub max_sum: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonShape {
    pub problem_count: usize,
    pub choice_count: usize,
    pub keypad_count: usize,
}

/// Closed set of distractor expressions, evaluated against `{a, b, answer}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistractorExpr {
    #[serde(rename = "ans-1")]
    AnswerMinusOne,
    #[serde(rename = "ans+1")]
    AnswerPlusOne,
    #[serde(rename = "ans-2")]
    AnswerMinusTwo,
    #[serde(rename = "ans+2")]
    AnswerPlusTwo,
    #[serde(rename = "abs(a-b)")]
    AbsDifference,
    #[serde(rename = "a")]
    FirstOperand,
    #[serde(rename = "b")]
    SecondOperand,
}

impl DistractorExpr {
    pub const ALL: [DistractorExpr; 7] = [
        DistractorExpr::AnswerMinusOne,
        DistractorExpr::AnswerPlusOne,
        DistractorExpr::AnswerMinusTwo,
        DistractorExpr::AnswerPlusTwo,
        DistractorExpr::AbsDifference,
        DistractorExpr::FirstOperand,
        DistractorExpr::SecondOperand,
    ];

    pub fn eval(self, a: i32, b: i32, answer: i32) -> i32 {
        match self {
            DistractorExpr::AnswerMinusOne => answer.saturating_sub(1),
            DistractorExpr::AnswerPlusOne  => answer.saturating_add(1),
            DistractorExpr::AnswerMinusTwo => answer.saturating_sub(2),
            DistractorExpr::AnswerPlusTwo  => answer.saturating_add(2),
            DistractorExpr::AbsDifference  => i32::try_from(a.abs_diff(b)).unwrap_or(i32::MAX),
            DistractorExpr::FirstOperand   => a,
            DistractorExpr::SecondOperand  => b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceDistractors {
    pub candidates: Vec<DistractorExpr>,
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntiRepeat {
    pub no_duplicate_in_lesson: bool,
    pub recent_problem_cache_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderKind {
    ArrayDots,
    GridRect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderMix {
    pub enabled: bool,
    pub rate: f64,
    pub max_per_lesson: usize,
    pub count_min: i32,
    pub count_max: i32,
    /// An explicitly empty list means "coin flip between both kinds".
    #[serde(default = "RenderMix::all_kinds")]
    pub types: Vec<RenderKind>,
}

impl RenderMix {
    fn all_kinds() -> Vec<RenderKind> {
        vec![RenderKind::ArrayDots, RenderKind::GridRect]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub constraints: Constraints,
    pub lesson: LessonShape,
    pub choice_distractors: ChoiceDistractors,
    pub anti_repeat: AntiRepeat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_mix: Option<RenderMix>,
}

// ---------------------------------------------------------------------------
// Operand pairs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandPair {
    pub a: i32,
    pub b: i32,
}

impl OperandPair {
    pub fn new(a: i32, b: i32) -> Self {
        OperandPair { a, b }
    }

    /// Saturates at the `i32` bounds.
    pub fn sum(self) -> i32 {
        self.a.saturating_add(self.b)
    }

    /// Order-insensitive de-duplication key.
    pub fn key(self) -> PairKey {
        PairKey {
            hi: self.a.max(self.b),
            lo: self.a.min(self.b),
        }
    }
}

/// `max(a,b) + "+" + min(a,b)`; `(3,5)` and `(5,3)` collide.
///
/// Serializes as that string, so a window persisted by the presentation layer
/// (`["5+3", "2+2"]`) can be read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PairKey {
    hi: i32,
    lo: i32,
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.hi, self.lo)
    }
}

impl FromStr for PairKey {
    type Err = ConfigError;

    /// Accepts either operand order; `"3+5"` parses to the key `5+3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = s
            .split_once('+')
            .and_then(|(a, b)| Some((a.trim().parse().ok()?, b.trim().parse().ok()?)));
        match parsed {
            Some((a, b)) => Ok(OperandPair::new(a, b).key()),
            None => Err(ConfigError::field("recentKeys", format!("malformed pair key '{s}'"))),
        }
    }
}

impl TryFrom<String> for PairKey {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PairKey> for String {
    fn from(k: PairKey) -> Self {
        k.to_string()
    }
}

// ---------------------------------------------------------------------------
// Render specs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    C1,
    C2,
    C3,
    C4,
    C5,
    C6,
    C7,
    C8,
}

impl ColorToken {
    pub const PALETTE: [ColorToken; 8] = [
        ColorToken::C1,
        ColorToken::C2,
        ColorToken::C3,
        ColorToken::C4,
        ColorToken::C5,
        ColorToken::C6,
        ColorToken::C7,
        ColorToken::C8,
    ];
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self {
            ColorToken::C1 => 1,
            ColorToken::C2 => 2,
            ColorToken::C3 => 3,
            ColorToken::C4 => 4,
            ColorToken::C5 => 5,
            ColorToken::C6 => 6,
            ColorToken::C7 => 7,
            ColorToken::C8 => 8,
        };
        write!(f, "c{n}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderSpec {
    #[serde(rename_all = "camelCase")]
    GridRect {
        rows: u32,
        cols: u32,
        gap: u32,
        radius: u32,
        fill: ColorToken,
    },
    #[serde(rename_all = "camelCase")]
    ArrayDots {
        count: u32,
        per_row: u32,
        gap: u32,
        dot_size: u32,
        fill: ColorToken,
    },
}

impl RenderSpec {
    /// Number of items the illustration shows.
    pub fn item_count(&self) -> u32 {
        match *self {
            RenderSpec::GridRect { rows, cols, .. } => rows * cols,
            RenderSpec::ArrayDots { count, .. } => count,
        }
    }

    pub fn kind(&self) -> RenderKind {
        match self {
            RenderSpec::GridRect { .. } => RenderKind::GridRect,
            RenderSpec::ArrayDots { .. } => RenderKind::ArrayDots,
        }
    }

    pub fn fill(&self) -> ColorToken {
        match *self {
            RenderSpec::GridRect { fill, .. } | RenderSpec::ArrayDots { fill, .. } => fill,
        }
    }
}

// ---------------------------------------------------------------------------
// Problems
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    #[serde(rename = "+")]
    Add,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Add => write!(f, "+"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemUi {
    Choice,
    Keypad,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Problem {
    #[serde(rename_all = "camelCase")]
    ArithChoice {
        unit_id: String,
        op: Op,
        a: i32,
        b: i32,
        answer: i32,
        ui: ProblemUi,
        choices: [i32; CHOICE_COUNT],
    },
    #[serde(rename_all = "camelCase")]
    ArithKeypad {
        unit_id: String,
        op: Op,
        a: i32,
        b: i32,
        answer: i32,
        ui: ProblemUi,
    },
    #[serde(rename_all = "camelCase")]
    RenderChoiceCount {
        unit_id: String,
        render_spec: RenderSpec,
        answer: i32,
        ui: ProblemUi,
        choices: [i32; CHOICE_COUNT],
    },
}

impl Problem {
    pub fn answer(&self) -> i32 {
        match *self {
            Problem::ArithChoice { answer, .. }
            | Problem::ArithKeypad { answer, .. }
            | Problem::RenderChoiceCount { answer, .. } => answer,
        }
    }

    pub fn choices(&self) -> Option<&[i32; CHOICE_COUNT]> {
        match self {
            Problem::ArithChoice { choices, .. } | Problem::RenderChoiceCount { choices, .. } => {
                Some(choices)
            }
            Problem::ArithKeypad { .. } => None,
        }
    }

    pub fn operands(&self) -> Option<OperandPair> {
        match *self {
            Problem::ArithChoice { a, b, .. } | Problem::ArithKeypad { a, b, .. } => {
                Some(OperandPair::new(a, b))
            }
            Problem::RenderChoiceCount { .. } => None,
        }
    }

    pub fn render_spec(&self) -> Option<&RenderSpec> {
        match self {
            Problem::RenderChoiceCount { render_spec, .. } => Some(render_spec),
            _ => None,
        }
    }

    /// How the answer is entered: tap an option or type on a keypad.
    pub fn ui(&self) -> ProblemUi {
        match *self {
            Problem::ArithChoice { ui, .. }
            | Problem::ArithKeypad { ui, .. }
            | Problem::RenderChoiceCount { ui, .. } => ui,
        }
    }

    pub fn unit_id(&self) -> &str {
        match self {
            Problem::ArithChoice { unit_id, .. }
            | Problem::ArithKeypad { unit_id, .. }
            | Problem::RenderChoiceCount { unit_id, .. } => unit_id,
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::ArithChoice { op, a, b, choices, .. } => {
                write!(f, "{a} {op} {b} = ?  {choices:?}")
            }
            Problem::ArithKeypad { op, a, b, .. } => write!(f, "{a} {op} {b} = ?  [keypad]"),
            Problem::RenderChoiceCount { render_spec, choices, .. } => {
                write!(f, "count the {:?} ({})  {choices:?}", render_spec.kind(), render_spec.fill())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_is_order_insensitive() {
        assert_eq!(OperandPair::new(3, 5).key(), OperandPair::new(5, 3).key());
        assert_eq!(OperandPair::new(3, 5).key().to_string(), "5+3");
        assert_ne!(OperandPair::new(3, 5).key(), OperandPair::new(4, 4).key());
    }

    #[test]
    fn pair_keys_parse_from_window_strings() {
        let k: PairKey = "3+5".parse().unwrap();
        assert_eq!(k, OperandPair::new(5, 3).key());
        assert_eq!(k.to_string(), "5+3");
        for bad in ["", "5", "5+", "+3", "a+b", "1+2+3"] {
            assert!(bad.parse::<PairKey>().is_err(), "{bad:?} parsed");
        }

        let keys: Vec<PairKey> = serde_json::from_str(r#"["5+3","2+2"]"#).unwrap();
        assert_eq!(keys[1], OperandPair::new(2, 2).key());
        assert_eq!(serde_json::to_string(&keys).unwrap(), r#"["5+3","2+2"]"#);
        assert!(serde_json::from_str::<PairKey>(r#""x""#).is_err());
    }

    #[test]
    fn focus_round_trips_through_strings() {
        for s in ["ZERO", "SMALL_2_3", "SUM_LE_7", "CAPSTONE", "SOMETHING_NEW"] {
            let focus: Focus = s.to_string().into();
            assert_eq!(focus.to_string(), s);
        }
        assert_eq!(Focus::from("SUM_LE_7".to_string()), Focus::SumLe(7));
        assert_eq!(Focus::from("SUM_LE_X".to_string()), Focus::Other("SUM_LE_X".into()));
    }

    #[test]
    fn distractor_expressions_use_config_spelling() {
        let parsed: Vec<DistractorExpr> =
            serde_json::from_str(r#"["ans-1","ans+1","ans-2","ans+2","abs(a-b)","a","b"]"#)
                .unwrap();
        assert_eq!(parsed, DistractorExpr::ALL.to_vec());
        assert!(serde_json::from_str::<DistractorExpr>(r#""ans*2""#).is_err());
    }

    #[test]
    fn distractor_eval() {
        assert_eq!(DistractorExpr::AbsDifference.eval(2, 7, 9), 5);
        assert_eq!(DistractorExpr::AnswerMinusTwo.eval(2, 7, 9), 7);
        assert_eq!(DistractorExpr::SecondOperand.eval(2, 7, 9), 7);
    }

    #[test]
    fn keypad_records_carry_their_ui() {
        let p = Problem::ArithKeypad {
            unit_id: "U1-1".into(),
            op: Op::Add,
            a: 2,
            b: 3,
            answer: 5,
            ui: ProblemUi::Keypad,
        };
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["kind"], "ARITH_KEYPAD");
        assert_eq!(v["ui"], "keypad");
        assert_eq!(v["op"], "+");
        let back: Problem = serde_json::from_value(v).unwrap();
        assert_eq!(back.ui(), ProblemUi::Keypad);
        assert!(back.choices().is_none());
    }

    #[test]
    fn problem_serializes_with_kind_tag() {
        let p = Problem::RenderChoiceCount {
            unit_id: "U1-1".into(),
            render_spec: RenderSpec::GridRect { rows: 2, cols: 3, gap: 6, radius: 10, fill: ColorToken::C4 },
            answer: 6,
            ui: ProblemUi::Choice,
            choices: [6, 5, 7, 4],
        };
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["kind"], "RENDER_CHOICE_COUNT");
        assert_eq!(v["ui"], "choice");
        assert_eq!(v["unitId"], "U1-1");
        assert_eq!(v["renderSpec"]["type"], "gridRect");
        assert_eq!(v["renderSpec"]["fill"], "c4");
        assert_eq!(p.render_spec().map(|s| s.item_count()), Some(6));
    }
}

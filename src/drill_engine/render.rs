//! Counting illustrations: a dot array or a near-square grid that shows
//! exactly `answer` items.

use crate::drill_engine::{
    models::{ColorToken, RenderKind, RenderSpec},
    rng::Mulberry32,
};

const GRID_GAP: u32 = 6;
const GRID_RADIUS: u32 = 10;
const DOT_GAP: u32 = 12;
const DOT_SIZE: u32 = 18;

/// Uniform palette pick, optionally skipping the previous token.
pub fn pick_color(rng: &mut Mulberry32, avoid: Option<ColorToken>) -> ColorToken {
    let pool: Vec<ColorToken> = ColorToken::PALETTE
        .iter()
        .copied()
        .filter(|c| Some(*c) != avoid)
        .collect();
    rng.pick_one(&pool).copied().unwrap_or(ColorToken::C1)
}

/// All `(rows, cols)` with `rows * cols == n`, rows ascending.
pub fn factor_pairs(n: u32) -> Vec<(u32, u32)> {
    (1..=n).filter(|r| n % r == 0).map(|r| (r, n / r)).collect()
}

/// Lower is better: near-square wins, `1 x n` strips are penalised.
fn grid_score((rows, cols): (u32, u32)) -> u32 {
    rows.abs_diff(cols) + if rows.min(cols) == 1 { 2 } else { 0 }
}

fn dots_per_row(count: u32) -> u32 {
    match count {
        0..=5 => 5,
        6..=8 => 4,
        _ => 5,
    }
}

/// Pick a render spec for `answer > 0` items.
///
/// With an empty `allowed` list the layout is a coin flip; otherwise one of
/// the allowed kinds is picked uniformly.
pub fn pick_render_spec(
    answer: u32,
    rng: &mut Mulberry32,
    fill: ColorToken,
    allowed: &[RenderKind],
) -> RenderSpec {
    let kind = match rng.pick_one(allowed) {
        Some(&kind) => kind,
        None if rng.chance(0.5) => RenderKind::ArrayDots,
        None => RenderKind::GridRect,
    };

    if kind == RenderKind::ArrayDots {
        return RenderSpec::ArrayDots {
            count: answer,
            per_row: dots_per_row(answer),
            gap: DOT_GAP,
            dot_size: DOT_SIZE,
            fill,
        };
    }

    let mut scored = factor_pairs(answer);
    scored.sort_by_key(|&p| grid_score(p));
    let best = scored.len().min(3);
    let (rows, cols) = scored
        .get(rng.index(best))
        .or_else(|| scored.first())
        .copied()
        .unwrap_or((1, answer));
    RenderSpec::GridRect { rows, cols, gap: GRID_GAP, radius: GRID_RADIUS, fill }
}

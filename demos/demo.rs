//! Walk through the built-in U1-1 curriculum.
//!
//! Run with: `cargo run --example demo`
//!
//! Set `RUST_LOG=sansu_drill_gen=debug` to see per-lesson attempt counts and
//! relaxed anti-repeat slots.
//!
//! ## What it shows
//!
//! - `PlaySession::new(Some(seed))` threads one random stream and one
//!   anti-repeat window through all twelve lessons; the same seed replays the
//!   same session.
//! - Counting slots (`RENDER_CHOICE_COUNT`) print their illustration instead
//!   of an equation.
//! - Mode presets skip the catalogue and sample sums with a carry policy.

use sansu_drill_gen::{Curriculum, PlaySession, Problem, RenderSpec, MODES};
use tracing_subscriber::EnvFilter;

fn print_problem(slot: usize, problem: &Problem) {
    let choices = match problem.choices() {
        Some(c) => format!("{c:?}"),
        None => "keypad".to_string(),
    };
    match problem.render_spec() {
        Some(RenderSpec::GridRect { rows, cols, fill, .. }) => {
            println!("  {slot}. count the {rows}x{cols} grid ({fill})  = {:<2}  {choices}", problem.answer());
        }
        Some(RenderSpec::ArrayDots { count, per_row, fill, .. }) => {
            println!("  {slot}. count {count} dots, {per_row} per row ({fill})  = {:<2}  {choices}", problem.answer());
        }
        None => println!("  {slot}. {problem}"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let curriculum = Curriculum::builtin()?;
    let mut session = PlaySession::new(Some(12345));

    println!();
    println!("══ Unit {}  seed {} ══", curriculum.unit_id(), session.seed());
    for lesson in &curriculum.catalogue.lessons {
        let generated = session.next_lesson(&curriculum, &lesson.lesson_id)?;
        println!();
        println!(
            "── {}  stage {}  focus {}  maxSum {}  ({} attempts)",
            lesson.lesson_id, lesson.stage, lesson.focus, lesson.max_sum, generated.stats.total_attempts
        );
        for (slot, problem) in generated.problems.iter().enumerate() {
            print_problem(slot + 1, problem);
        }
    }

    println!();
    println!("══ Modes ══");
    for mode in &MODES {
        let problems = session.next_mode_lesson(&curriculum, mode)?;
        println!();
        println!("── {} ({})  {}", mode.title, mode.id, mode.subtitle);
        for (slot, problem) in problems.iter().enumerate() {
            print_problem(slot + 1, problem);
        }
    }

    println!();
    println!("Recent window holds {} pairs.", session.recent().len());
    Ok(())
}

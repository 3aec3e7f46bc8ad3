use crate::drill_engine::{
    anti_repeat::RecentWindow,
    config::Curriculum,
    error::DrillError,
    generator::{generate_by_mode, generate_lesson_report, GeneratedLesson},
    models::Problem,
    modes::ModePreset,
    rng::Mulberry32,
};

/// One learner's play session: a seed, the random stream derived from it,
/// and the anti-repeat window threaded through every lesson of the session.
///
/// Calls are sequential by construction (`&mut self`), so the window is never
/// shared between two generation calls.
#[derive(Debug, Clone)]
pub struct PlaySession {
    seed: u32,
    rng: Mulberry32,
    recent: RecentWindow,
}

impl PlaySession {
    /// `None` draws a seed from entropy; read it back with [`PlaySession::seed`]
    /// to replay the session later.
    pub fn new(seed: Option<u32>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        PlaySession {
            seed,
            rng: Mulberry32::new(seed),
            recent: RecentWindow::default(),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn recent(&self) -> &RecentWindow {
        &self.recent
    }

    /// Generate the catalogue lesson `lesson_id`.
    pub fn next_lesson(
        &mut self,
        curriculum: &Curriculum,
        lesson_id: &str,
    ) -> Result<GeneratedLesson, DrillError> {
        let lesson = curriculum.catalogue.lesson(lesson_id)?;
        generate_lesson_report(
            curriculum.unit_id(),
            lesson,
            &curriculum.params,
            &mut self.rng,
            &mut self.recent,
        )
    }

    /// Generate a mode-driven lesson. Mode lessons do not touch the window.
    pub fn next_mode_lesson(
        &mut self,
        curriculum: &Curriculum,
        mode: &ModePreset,
    ) -> Result<Vec<Problem>, DrillError> {
        generate_by_mode(curriculum.unit_id(), mode, &curriculum.params, &mut self.rng)
    }

    /// Restart from the session seed with an empty window.
    pub fn restart(&mut self) {
        self.rng = Mulberry32::new(self.seed);
        self.recent.clear();
    }
}

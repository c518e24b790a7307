use crate::stage::Stage;

/// Score and countdown for the stage in play.
#[derive(Debug, Clone)]
pub struct ScoreKeeper {
    score: i32,
    elapsed: f64,
    duration: f64,
    target_score: i32,
}

impl ScoreKeeper {
    pub fn new(stage: &Stage) -> Self {
        Self {
            score: 0,
            elapsed: 0.0,
            duration: stage.duration,
            target_score: stage.target_score,
        }
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn target_score(&self) -> i32 {
        self.target_score
    }

    #[cfg(test)]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Decoys subtract, so the score can dip below zero.
    pub fn add(&mut self, points: i32) {
        self.score += points;
    }

    pub fn tick(&mut self, dt: f64) {
        if self.elapsed < self.duration {
            self.elapsed += dt;
        }
    }

    /// Whole seconds remaining, rounded up.
    pub fn time_left(&self) -> u32 {
        (self.duration - self.elapsed).max(0.0).ceil() as u32
    }

    pub fn is_time_up(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn is_success(&self) -> bool {
        self.score >= self.target_score
    }

    pub fn reset(&mut self, stage: &Stage) {
        *self = Self::new(stage);
    }
}

//! The game loop core: spawning, movement, hit-testing and the
//! RUNNING / PAUSED / END state machine.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::bird::{Bird, BirdKind};
use crate::geom::Rect;
use crate::layout;
use crate::score::ScoreKeeper;
use crate::stage::{self, Stage};

/// Seconds for the end-of-stage fade.
pub const FADE_DURATION: f64 = 1.0;
/// The result panel accepts taps once the fade is this far along.
pub const RESULT_DELAY: f64 = 0.5;
/// Lifetime of the flash drawn where a bird was hit.
pub const FLASH_DURATION: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Running,
    Paused,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Cleared,
    FinalVictory,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    StageStarted(usize),
    Hit { kind: BirdKind, points: i32 },
    Miss,
    StageCleared,
    FinalVictory,
    StageFailed,
    NewHighScore(i32),
}

#[derive(Debug, Clone, Copy)]
pub struct Flash {
    pub x: f64,
    pub y: f64,
    pub ttl: f64,
    pub points: i32,
}

pub struct Engine<R> {
    width: f64,
    height: f64,
    scale: f64,
    stage_index: usize,
    state: GameState,
    keeper: ScoreKeeper,
    birds: Vec<Bird>,
    flashes: Vec<Flash>,
    spawn_timer: f64,
    end_timer: f64,
    success: bool,
    high_score: i32,
    high_score_dirty: bool,
    events: Vec<GameEvent>,
    rng: R,
}

impl<R: Rng> Engine<R> {
    pub fn new(width: usize, height: usize, stage_index: usize, high_score: i32, rng: R) -> Self {
        let stage = stage::stage(stage_index);
        let mut engine = Engine {
            width: width as f64,
            height: height as f64,
            scale: scale_for(height),
            stage_index: stage.index,
            state: GameState::Running,
            keeper: ScoreKeeper::new(stage),
            birds: Vec::new(),
            flashes: Vec::new(),
            spawn_timer: 0.0,
            end_timer: 0.0,
            success: false,
            high_score,
            high_score_dirty: false,
            events: Vec::new(),
            rng,
        };
        engine.restart();
        engine
    }

    pub fn update(&mut self, dt: f64) {
        if self.state == GameState::End {
            if self.end_timer < FADE_DURATION {
                self.end_timer = (self.end_timer + dt).min(FADE_DURATION);
            }
            return;
        }

        if self.state == GameState::Running {
            self.keeper.tick(dt);
            if self.keeper.is_time_up() {
                self.state = GameState::End;
                self.birds.clear();
                self.flashes.clear();
                self.end_timer = 0.0;
                self.process_result();
                return;
            }
        }

        if self.state != GameState::Running {
            return;
        }

        let stage = self.stage();
        self.spawn_timer += dt;
        if self.spawn_timer >= stage.spawn_interval {
            self.spawn_timer -= stage.spawn_interval;
            self.spawn(BirdKind::Sparrow);
            if self.rng.gen_bool(stage.decoy_chance) {
                self.spawn_decoy();
            }
        }

        let bounds = self.bounds();
        for bird in &mut self.birds {
            bird.update(dt, bounds);
        }
        self.birds
            .retain(|b| !b.is_expired() && !b.is_off_screen(bounds));

        for flash in &mut self.flashes {
            flash.ttl -= dt;
        }
        self.flashes.retain(|f| f.ttl > 0.0);
    }

    /// Handles a tap at canvas coordinates.
    pub fn tap(&mut self, x: f64, y: f64) {
        match self.state {
            GameState::Running => self.shoot(x, y),
            GameState::Paused => {}
            GameState::End => {
                if !self.result_visible() {
                    return;
                }
                let (restart, next) = layout::end_buttons(self.width, self.height);
                if restart.contains(x, y) {
                    self.restart();
                } else if next.contains(x, y) {
                    self.advance();
                }
            }
        }
    }

    fn shoot(&mut self, x: f64, y: f64) {
        // Topmost first: later birds are drawn over earlier ones
        let Some(i) = self.birds.iter().rposition(|b| b.check_hit(x, y)) else {
            self.events.push(GameEvent::Miss);
            return;
        };
        let bird = self.birds.remove(i);
        let points = bird.score_value();
        self.keeper.add(points);
        self.flashes.push(Flash {
            x: bird.x,
            y: bird.y,
            ttl: FLASH_DURATION,
            points,
        });
        self.events.push(GameEvent::Hit {
            kind: bird.kind,
            points,
        });
        debug!(kind = ?bird.kind, points, score = self.keeper.score(), "bird hit");
    }

    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            GameState::Running => GameState::Paused,
            GameState::Paused => GameState::Running,
            GameState::End => return,
        };
        info!(state = ?self.state, "pause toggled");
    }

    /// Replays the current stage from scratch.
    pub fn restart(&mut self) {
        let stage = self.stage();
        self.keeper.reset(stage);
        self.birds.clear();
        self.flashes.clear();
        self.state = GameState::Running;
        self.success = false;
        self.spawn_timer = 0.0;
        self.end_timer = 0.0;

        self.spawn(BirdKind::Sparrow);
        self.spawn(BirdKind::Sparrow);

        self.events.push(GameEvent::StageStarted(self.stage_index));
        info!(stage = self.stage_index, name = stage.name, "stage started");
    }

    /// Moves on from the result panel: next stage on success, a new run
    /// after the last stage, otherwise a retry.
    pub fn advance(&mut self) {
        if self.state != GameState::End {
            return;
        }
        if self.success {
            self.stage_index = stage::next_stage(self.stage_index).map_or(1, |s| s.index);
        }
        self.restart();
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width as f64;
        self.height = height as f64;
        self.scale = scale_for(height);
        let bounds = self.bounds();
        self.birds.retain(|b| !b.is_off_screen(bounds));
    }

    fn spawn(&mut self, kind: BirdKind) -> bool {
        if self.count(kind) >= kind.max_count() {
            return false;
        }
        let speed = self.stage().sprite_speed * self.speed_scale();
        let bird = Bird::spawn(kind, self.bounds(), speed, self.scale, &mut self.rng);
        debug!(kind = ?kind, x = bird.x, y = bird.y, "spawned");
        self.birds.push(bird);
        true
    }

    fn spawn_decoy(&mut self) -> bool {
        let available: Vec<BirdKind> = BirdKind::ALL
            .into_iter()
            .filter(|k| k.is_decoy() && self.count(*k) < k.max_count())
            .collect();
        match available.choose(&mut self.rng) {
            Some(&kind) => self.spawn(kind),
            None => false,
        }
    }

    fn process_result(&mut self) {
        self.success = self.keeper.is_success();
        let score = self.keeper.score();
        let event = match self.outcome() {
            Some(Outcome::FinalVictory) => GameEvent::FinalVictory,
            Some(Outcome::Cleared) => GameEvent::StageCleared,
            _ => GameEvent::StageFailed,
        };
        self.events.push(event);
        info!(
            stage = self.stage_index,
            score,
            target = self.keeper.target_score(),
            success = self.success,
            "stage over"
        );

        if score > self.high_score {
            self.high_score = score;
            self.high_score_dirty = true;
            self.events.push(GameEvent::NewHighScore(score));
            info!(score, "new high score");
        }
    }

    fn count(&self, kind: BirdKind) -> usize {
        self.birds.iter().filter(|b| b.kind == kind).count()
    }

    fn speed_scale(&self) -> f64 {
        (self.width / 80.0).max(0.8)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// True once after the high score improves.
    pub fn take_high_score_dirty(&mut self) -> bool {
        std::mem::take(&mut self.high_score_dirty)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        if self.state != GameState::End {
            return None;
        }
        Some(match (self.success, stage::is_last_stage(self.stage_index)) {
            (true, true) => Outcome::FinalVictory,
            (true, false) => Outcome::Cleared,
            (false, _) => Outcome::Failed,
        })
    }

    pub fn result_visible(&self) -> bool {
        self.state == GameState::End && self.end_timer > RESULT_DELAY
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn stage(&self) -> &'static Stage {
        stage::stage(self.stage_index)
    }

    pub fn keeper(&self) -> &ScoreKeeper {
        &self.keeper
    }

    pub fn birds(&self) -> &[Bird] {
        &self.birds
    }

    pub fn flashes(&self) -> &[Flash] {
        &self.flashes
    }

    pub fn high_score(&self) -> i32 {
        self.high_score
    }

    pub fn end_timer(&self) -> f64 {
        self.end_timer
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

fn scale_for(height: usize) -> f64 {
    (height as f64 / 48.0).max(0.75)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn new_engine(stage: usize) -> Engine<ChaCha8Rng> {
        Engine::new(160, 96, stage, 0, ChaCha8Rng::seed_from_u64(12345))
    }

    fn still_bird(kind: BirdKind, x: f64, y: f64) -> Bird {
        Bird {
            kind,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            w: 6.0,
            h: 4.0,
            age: 0.0,
        }
    }

    /// Runs the clock out without spawning anything new.
    fn finish_stage(engine: &mut Engine<ChaCha8Rng>) {
        engine.birds.clear();
        engine.keeper.tick(engine.stage().duration);
        engine.update(0.0);
        assert_eq!(engine.state(), GameState::End);
    }

    #[test]
    fn test_starts_running_with_two_sparrows() {
        let mut engine = new_engine(1);
        assert_eq!(engine.state(), GameState::Running);
        assert_eq!(engine.birds().len(), 2);
        assert!(engine.birds().iter().all(|b| b.kind == BirdKind::Sparrow));
        assert_eq!(engine.drain_events(), vec![GameEvent::StageStarted(1)]);
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_invalid_stage_falls_back_to_first() {
        let engine = new_engine(42);
        assert_eq!(engine.stage().index, 1);
    }

    #[test]
    fn test_spawns_on_interval() {
        let mut engine = new_engine(1);
        engine.birds.clear();
        engine.update(0.5);
        assert!(engine.birds().is_empty());
        engine.update(0.5);
        assert!(engine.birds().iter().any(|b| b.kind == BirdKind::Sparrow));
    }

    #[test]
    fn test_spawn_timer_keeps_overshoot() {
        let mut engine = new_engine(1);
        engine.birds.clear();
        let sparrows = |e: &Engine<ChaCha8Rng>| {
            e.birds().iter().filter(|b| b.kind == BirdKind::Sparrow).count()
        };

        engine.update(0.75);
        engine.update(0.75);
        assert_eq!(sparrows(&engine), 1);
        assert_eq!(engine.spawn_timer, 0.5);

        // Only half an interval later, thanks to the carried 0.5 s
        engine.update(0.5);
        assert_eq!(sparrows(&engine), 2);
    }

    #[test]
    fn test_spawn_respects_kind_cap() {
        let mut engine = new_engine(4);
        engine.birds.clear();
        for _ in 0..BirdKind::Sparrow.max_count() {
            assert!(engine.spawn(BirdKind::Sparrow));
        }
        assert!(!engine.spawn(BirdKind::Sparrow));
        assert_eq!(engine.count(BirdKind::Sparrow), BirdKind::Sparrow.max_count());
    }

    #[test]
    fn test_decoys_appear_and_stay_capped() {
        let mut engine = new_engine(4);
        for _ in 0..400 {
            engine.update(0.05);
            for kind in BirdKind::ALL {
                assert!(engine.count(kind) <= kind.max_count());
            }
        }
        assert_eq!(engine.state(), GameState::Running);
        // Sanity: a long stretch at 55% decoy chance produces some decoys
        engine.birds.clear();
        let mut saw_decoy = false;
        for _ in 0..40 {
            engine.update(0.5);
            saw_decoy |= engine.birds().iter().any(|b| b.kind.is_decoy());
        }
        assert!(saw_decoy);
    }

    #[test]
    fn test_birds_expire() {
        let mut engine = new_engine(1);
        engine.birds = vec![still_bird(BirdKind::Sparrow, 50.0, 50.0)];
        engine.spawn_timer = f64::MIN;
        engine.update(2.0);
        assert_eq!(engine.birds().len(), 1);
        engine.update(1.0);
        assert!(engine.birds().is_empty());
    }

    #[test]
    fn test_tap_hits_and_scores() {
        let mut engine = new_engine(1);
        engine.birds = vec![still_bird(BirdKind::Sparrow, 50.0, 50.0)];
        engine.drain_events();
        engine.tap(51.0, 49.0);
        assert!(engine.birds().is_empty());
        assert_eq!(engine.keeper().score(), 5);
        assert_eq!(engine.flashes().len(), 1);
        assert_eq!(engine.flashes()[0].points, 5);
        assert_eq!(
            engine.drain_events(),
            vec![GameEvent::Hit {
                kind: BirdKind::Sparrow,
                points: 5
            }]
        );
    }

    #[test]
    fn test_tap_hits_only_topmost() {
        let mut engine = new_engine(1);
        engine.birds = vec![
            still_bird(BirdKind::Sparrow, 50.0, 50.0),
            still_bird(BirdKind::Magpie, 51.0, 50.0),
        ];
        engine.tap(50.5, 50.0);
        assert_eq!(engine.birds().len(), 1);
        assert_eq!(engine.birds()[0].kind, BirdKind::Sparrow);
        assert_eq!(engine.keeper().score(), -3);
    }

    #[test]
    fn test_tap_miss() {
        let mut engine = new_engine(1);
        engine.birds = vec![still_bird(BirdKind::Sparrow, 50.0, 50.0)];
        engine.drain_events();
        engine.tap(10.0, 10.0);
        assert_eq!(engine.birds().len(), 1);
        assert_eq!(engine.keeper().score(), 0);
        assert_eq!(engine.drain_events(), vec![GameEvent::Miss]);
    }

    #[test]
    fn test_pause_freezes_world() {
        let mut engine = new_engine(1);
        engine.birds = vec![Bird {
            vx: 10.0,
            ..still_bird(BirdKind::Sparrow, 50.0, 50.0)
        }];
        engine.toggle_pause();
        assert_eq!(engine.state(), GameState::Paused);
        engine.update(1.0);
        assert_eq!(engine.birds()[0].x, 50.0);
        assert_eq!(engine.keeper().elapsed(), 0.0);

        engine.tap(50.0, 50.0);
        assert_eq!(engine.birds().len(), 1);

        engine.toggle_pause();
        assert_eq!(engine.state(), GameState::Running);
        engine.update(0.5);
        assert_eq!(engine.birds()[0].x, 55.0);
    }

    #[test]
    fn test_time_up_ends_stage_as_failure() {
        let mut engine = new_engine(1);
        engine.drain_events();
        engine.update(59.0);
        assert_eq!(engine.state(), GameState::Running);
        engine.update(1.0);
        assert_eq!(engine.state(), GameState::End);
        assert!(engine.birds().is_empty());
        assert_eq!(engine.outcome(), Some(Outcome::Failed));
        assert!(engine.drain_events().contains(&GameEvent::StageFailed));
        engine.toggle_pause();
        assert_eq!(engine.state(), GameState::End);
    }

    #[test]
    fn test_clear_and_high_score() {
        let mut engine = new_engine(1);
        engine.keeper.add(150);
        finish_stage(&mut engine);
        assert_eq!(engine.outcome(), Some(Outcome::Cleared));
        assert_eq!(engine.high_score(), 150);
        assert!(engine.take_high_score_dirty());
        assert!(!engine.take_high_score_dirty());
        let events = engine.drain_events();
        assert!(events.contains(&GameEvent::StageCleared));
        assert!(events.contains(&GameEvent::NewHighScore(150)));
    }

    #[test]
    fn test_lower_score_keeps_high_score() {
        let mut engine = Engine::new(160, 96, 1, 500, ChaCha8Rng::seed_from_u64(1));
        engine.keeper.add(200);
        finish_stage(&mut engine);
        assert_eq!(engine.high_score(), 500);
        assert!(!engine.take_high_score_dirty());
    }

    #[test]
    fn test_final_victory_on_last_stage() {
        let mut engine = new_engine(4);
        engine.keeper.add(450);
        finish_stage(&mut engine);
        assert_eq!(engine.outcome(), Some(Outcome::FinalVictory));
        assert!(engine.drain_events().contains(&GameEvent::FinalVictory));
    }

    #[test]
    fn test_end_fade_is_capped() {
        let mut engine = new_engine(1);
        finish_stage(&mut engine);
        assert!(!engine.result_visible());
        engine.update(0.75);
        assert!(engine.result_visible());
        engine.update(5.0);
        assert_eq!(engine.end_timer(), FADE_DURATION);
    }

    #[test]
    fn test_buttons_ignored_during_fade() {
        let mut engine = new_engine(1);
        finish_stage(&mut engine);
        let (restart, _) = layout::end_buttons(160.0, 96.0);
        let (x, y) = restart.center();
        engine.tap(x, y);
        assert_eq!(engine.state(), GameState::End);
    }

    #[test]
    fn test_restart_button_replays_stage() {
        let mut engine = new_engine(2);
        engine.keeper.add(300);
        finish_stage(&mut engine);
        engine.update(FADE_DURATION);
        let (restart, _) = layout::end_buttons(160.0, 96.0);
        let (x, y) = restart.center();
        engine.tap(x, y);
        assert_eq!(engine.state(), GameState::Running);
        assert_eq!(engine.stage().index, 2);
        assert_eq!(engine.keeper().score(), 0);
        assert_eq!(engine.birds().len(), 2);
    }

    #[test]
    fn test_next_button_advances_on_success() {
        let mut engine = new_engine(2);
        engine.keeper.add(250);
        finish_stage(&mut engine);
        engine.update(FADE_DURATION);
        let (_, next) = layout::end_buttons(160.0, 96.0);
        let (x, y) = next.center();
        engine.drain_events();
        engine.tap(x, y);
        assert_eq!(engine.stage().index, 3);
        assert_eq!(engine.keeper().target_score(), 350);
        assert_eq!(engine.drain_events(), vec![GameEvent::StageStarted(3)]);
    }

    #[test]
    fn test_next_after_failure_retries() {
        let mut engine = new_engine(3);
        finish_stage(&mut engine);
        engine.advance();
        assert_eq!(engine.stage().index, 3);
        assert_eq!(engine.state(), GameState::Running);
    }

    #[test]
    fn test_next_after_final_victory_starts_new_run() {
        let mut engine = new_engine(4);
        engine.keeper.add(600);
        finish_stage(&mut engine);
        engine.advance();
        assert_eq!(engine.stage().index, 1);
    }

    #[test]
    fn test_advance_ignored_while_running() {
        let mut engine = new_engine(1);
        engine.keeper.add(10);
        engine.advance();
        assert_eq!(engine.keeper().score(), 10);
    }

    #[test]
    fn test_resize_drops_off_screen_birds() {
        let mut engine = new_engine(1);
        engine.birds = vec![
            still_bird(BirdKind::Sparrow, 20.0, 20.0),
            still_bird(BirdKind::Sparrow, 150.0, 20.0),
        ];
        engine.resize(80, 48);
        assert_eq!(engine.birds().len(), 1);
        assert_eq!(engine.bounds(), Rect::new(0.0, 0.0, 80.0, 48.0));
        assert_eq!(engine.scale(), 1.0);
    }
}

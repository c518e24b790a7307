//! Stage table: one difficulty configuration per time of day.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Morning,
    HighNoon,
    Evening,
    Dawn,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    /// 1-based.
    pub index: usize,
    pub name: &'static str,
    /// Seconds.
    pub duration: f64,
    pub target_score: i32,
    /// Seconds between spawns.
    pub spawn_interval: f64,
    /// Pixels per second on an 80 pixel wide canvas.
    pub sprite_speed: f64,
    /// Chance that a spawn also releases a decoy.
    pub decoy_chance: f64,
    pub background: Background,
}

static STAGES: [Stage; 4] = [
    Stage {
        index: 1,
        name: "MORNING",
        duration: 60.0,
        target_score: 150,
        spawn_interval: 1.0,
        sprite_speed: 20.0,
        decoy_chance: 0.25,
        background: Background::Morning,
    },
    Stage {
        index: 2,
        name: "HIGH NOON",
        duration: 60.0,
        target_score: 250,
        spawn_interval: 0.8,
        sprite_speed: 26.0,
        decoy_chance: 0.35,
        background: Background::HighNoon,
    },
    Stage {
        index: 3,
        name: "EVENING",
        duration: 60.0,
        target_score: 350,
        spawn_interval: 0.6,
        sprite_speed: 32.0,
        decoy_chance: 0.45,
        background: Background::Evening,
    },
    Stage {
        index: 4,
        name: "DAWN",
        duration: 60.0,
        target_score: 450,
        spawn_interval: 0.5,
        sprite_speed: 40.0,
        decoy_chance: 0.55,
        background: Background::Dawn,
    },
];

/// Looks up a stage by its 1-based index, falling back to the first stage.
pub fn stage(index: usize) -> &'static Stage {
    index
        .checked_sub(1)
        .and_then(|i| STAGES.get(i))
        .unwrap_or(&STAGES[0])
}

/// The stage after `index`, or `None` when `index` is the last one.
pub fn next_stage(index: usize) -> Option<&'static Stage> {
    STAGES.get(index)
}

pub fn is_last_stage(index: usize) -> bool {
    index >= STAGES.len()
}

pub fn total_stages() -> usize {
    STAGES.len()
}

use std::f64::consts::TAU;

use rand::Rng;

use crate::geom::Rect;

/// Seconds a bird stays on screen before flying off.
pub const BIRD_LIFETIME: f64 = 3.0;

/// Sprite size at scale 1.0, in pixels.
pub const BIRD_W: f64 = 7.0;
pub const BIRD_H: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BirdKind {
    /// The target. Worth points.
    Sparrow,
    /// Small decoy, costs a point.
    Bunting,
    /// Large decoy, costs three.
    Magpie,
}

impl BirdKind {
    pub const ALL: [BirdKind; 3] = [BirdKind::Sparrow, BirdKind::Bunting, BirdKind::Magpie];

    pub fn score(self) -> i32 {
        match self {
            BirdKind::Sparrow => 5,
            BirdKind::Bunting => -1,
            BirdKind::Magpie => -3,
        }
    }

    pub fn size_factor(self) -> f64 {
        match self {
            BirdKind::Sparrow | BirdKind::Bunting => 1.0,
            BirdKind::Magpie => 1.4,
        }
    }

    /// Cap on how many of this kind may be alive at once.
    pub fn max_count(self) -> usize {
        match self {
            BirdKind::Sparrow => 6,
            BirdKind::Bunting => 2,
            BirdKind::Magpie => 3,
        }
    }

    pub fn is_decoy(self) -> bool {
        self.score() < 0
    }
}

/// A single bird sprite. `x`/`y` is the center of its bounding box.
#[derive(Debug, Clone)]
pub struct Bird {
    pub kind: BirdKind,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub w: f64,
    pub h: f64,
    pub age: f64,
}

impl Bird {
    /// Places a bird fully inside `bounds`, heading in a random direction.
    pub fn spawn<R: Rng>(kind: BirdKind, bounds: Rect, speed: f64, scale: f64, rng: &mut R) -> Self {
        let w = (BIRD_W * scale * kind.size_factor()).round().max(4.0);
        let h = (BIRD_H * scale * kind.size_factor()).round().max(3.0);
        let x = random_between(rng, bounds.left + w / 2.0, bounds.right - w / 2.0);
        let y = random_between(rng, bounds.top + h / 2.0, bounds.bottom - h / 2.0);
        let angle = rng.gen_range(0.0..TAU);
        let speed = speed * rng.gen_range(0.8..1.2);

        Bird {
            kind,
            x,
            y,
            vx: speed * angle.cos(),
            vy: speed * angle.sin(),
            w,
            h,
            age: 0.0,
        }
    }

    pub fn update(&mut self, dt: f64, bounds: Rect) {
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.age += dt;

        // Bounce off the canvas edges
        let (hw, hh) = (self.w / 2.0, self.h / 2.0);
        if self.x < bounds.left + hw {
            self.x = bounds.left + hw;
            self.vx = self.vx.abs();
        } else if self.x > bounds.right - hw {
            self.x = bounds.right - hw;
            self.vx = -self.vx.abs();
        }
        if self.y < bounds.top + hh {
            self.y = bounds.top + hh;
            self.vy = self.vy.abs();
        } else if self.y > bounds.bottom - hh {
            self.y = bounds.bottom - hh;
            self.vy = -self.vy.abs();
        }
    }

    /// Bounding box snapped to the pixel grid, matching the drawn sprite.
    pub fn rect(&self) -> Rect {
        let left = (self.x - self.w / 2.0).floor();
        let top = (self.y - self.h / 2.0).floor();
        Rect::new(left, top, left + self.w, top + self.h)
    }

    pub fn check_hit(&self, x: f64, y: f64) -> bool {
        self.rect().contains(x, y)
    }

    pub fn is_expired(&self) -> bool {
        self.age >= BIRD_LIFETIME
    }

    pub fn is_off_screen(&self, bounds: Rect) -> bool {
        self.x < bounds.left - self.w
            || self.x > bounds.right + self.w
            || self.y < bounds.top - self.h
            || self.y > bounds.bottom + self.h
    }

    pub fn score_value(&self) -> i32 {
        self.kind.score()
    }
}

fn random_between<R: Rng>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        (lo + hi) / 2.0
    }
}

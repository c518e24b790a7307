use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use rand::Rng;
use std::io::{self, Write};

use crate::bird::{Bird, BirdKind};
use crate::engine::{Engine, FADE_DURATION, FLASH_DURATION, GameState, Outcome};
use crate::geom::Rect;
use crate::layout;
use crate::stage::Background;

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    /// Scales each channel by `keep_256 / 256`.
    const fn dim(self, keep_256: u16) -> Rgb {
        Rgb::lerp(Rgb(0, 0, 0), self, keep_256)
    }
}

struct Palette {
    sky_top: Rgb,
    sky_bot: Rgb,
    hill_far: Rgb,
    hill_near: Rgb,
    sun: Rgb,
    /// Sun position as fractions of the canvas.
    sun_at: (f64, f64),
}

fn palette(bg: Background) -> Palette {
    match bg {
        Background::Morning => Palette {
            sky_top: Rgb(120, 170, 220),
            sky_bot: Rgb(250, 215, 170),
            hill_far: Rgb(120, 175, 95),
            hill_near: Rgb(85, 150, 65),
            sun: Rgb(255, 220, 140),
            sun_at: (0.18, 0.55),
        },
        Background::HighNoon => Palette {
            sky_top: Rgb(70, 180, 200),
            sky_bot: Rgb(190, 232, 245),
            hill_far: Rgb(120, 195, 75),
            hill_near: Rgb(95, 175, 55),
            sun: Rgb(255, 250, 200),
            sun_at: (0.5, 0.15),
        },
        Background::Evening => Palette {
            sky_top: Rgb(80, 60, 130),
            sky_bot: Rgb(245, 140, 80),
            hill_far: Rgb(95, 80, 90),
            hill_near: Rgb(65, 55, 70),
            sun: Rgb(255, 120, 60),
            sun_at: (0.82, 0.6),
        },
        Background::Dawn => Palette {
            sky_top: Rgb(20, 25, 60),
            sky_bot: Rgb(110, 95, 150),
            hill_far: Rgb(45, 60, 75),
            hill_near: Rgb(30, 40, 50),
            sun: Rgb(225, 225, 240),
            sun_at: (0.75, 0.2),
        },
    }
}

struct BirdColors {
    body: Rgb,
    hi: Rgb,
    wing: Rgb,
    beak: Rgb,
}

fn bird_colors(kind: BirdKind) -> BirdColors {
    match kind {
        BirdKind::Sparrow => BirdColors {
            body: Rgb(160, 110, 65),
            hi: Rgb(205, 160, 105),
            wing: Rgb(105, 70, 40),
            beak: Rgb(235, 190, 70),
        },
        BirdKind::Bunting => BirdColors {
            body: Rgb(70, 105, 200),
            hi: Rgb(120, 160, 235),
            wing: Rgb(40, 60, 130),
            beak: Rgb(60, 60, 60),
        },
        BirdKind::Magpie => BirdColors {
            body: Rgb(30, 30, 38),
            hi: Rgb(235, 235, 240),
            wing: Rgb(45, 70, 140),
            beak: Rgb(20, 20, 20),
        },
    }
}

const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);
const GOLD: Rgb = Rgb(245, 200, 66);
const RED: Rgb = Rgb(225, 60, 50);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
const PANEL_EDGE: Rgb = Rgb(210, 185, 110);
const PANEL_FILL: Rgb = Rgb(90, 70, 45);
const BTN_RESTART: Rgb = Rgb(200, 55, 45);
const BTN_NEXT: Rgb = Rgb(35, 135, 225);
const BTN_RETRY: Rgb = Rgb(240, 150, 0);

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![SHADOW; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SHADOW);
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn dim_all(&mut self, keep_256: u16) {
        for p in &mut self.px {
            *p = p.dim(keep_256);
        }
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = Rgb(0, 0, 0);
        let mut prev_bg = Rgb(0, 0, 0);
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(out, style::SetBackgroundColor(to_color(top)))?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(out, style::SetForegroundColor(to_color(top)))?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(out, style::SetBackgroundColor(to_color(bot)))?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn to_color(c: Rgb) -> CColor {
    CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── 3x5 bitmap font ────────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

#[rustfmt::skip]
const LETTERS: [[u8; 15]; 26] = [
    [0,1,0, 1,0,1, 1,1,1, 1,0,1, 1,0,1], // A
    [1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,1,0], // B
    [0,1,1, 1,0,0, 1,0,0, 1,0,0, 0,1,1], // C
    [1,1,0, 1,0,1, 1,0,1, 1,0,1, 1,1,0], // D
    [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,1,1], // E
    [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,0,0], // F
    [0,1,1, 1,0,0, 1,0,1, 1,0,1, 0,1,1], // G
    [1,0,1, 1,0,1, 1,1,1, 1,0,1, 1,0,1], // H
    [1,1,1, 0,1,0, 0,1,0, 0,1,0, 1,1,1], // I
    [0,0,1, 0,0,1, 0,0,1, 1,0,1, 0,1,0], // J
    [1,0,1, 1,0,1, 1,1,0, 1,0,1, 1,0,1], // K
    [1,0,0, 1,0,0, 1,0,0, 1,0,0, 1,1,1], // L
    [1,0,1, 1,1,1, 1,1,1, 1,0,1, 1,0,1], // M
    [1,1,0, 1,0,1, 1,0,1, 1,0,1, 1,0,1], // N
    [0,1,0, 1,0,1, 1,0,1, 1,0,1, 0,1,0], // O
    [1,1,0, 1,0,1, 1,1,0, 1,0,0, 1,0,0], // P
    [0,1,0, 1,0,1, 1,0,1, 1,1,0, 0,1,1], // Q
    [1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,0,1], // R
    [0,1,1, 1,0,0, 0,1,0, 0,0,1, 1,1,0], // S
    [1,1,1, 0,1,0, 0,1,0, 0,1,0, 0,1,0], // T
    [1,0,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // U
    [1,0,1, 1,0,1, 1,0,1, 1,0,1, 0,1,0], // V
    [1,0,1, 1,0,1, 1,1,1, 1,1,1, 1,0,1], // W
    [1,0,1, 1,0,1, 0,1,0, 1,0,1, 1,0,1], // X
    [1,0,1, 1,0,1, 0,1,0, 0,1,0, 0,1,0], // Y
    [1,1,1, 0,0,1, 0,1,0, 1,0,0, 1,1,1], // Z
];

#[rustfmt::skip]
const PLUS: [u8; 15] = [0,0,0, 0,1,0, 1,1,1, 0,1,0, 0,0,0];
#[rustfmt::skip]
const MINUS: [u8; 15] = [0,0,0, 0,0,0, 1,1,1, 0,0,0, 0,0,0];
#[rustfmt::skip]
const SLASH: [u8; 15] = [0,0,1, 0,0,1, 0,1,0, 1,0,0, 1,0,0];
#[rustfmt::skip]
const BANG: [u8; 15] = [0,1,0, 0,1,0, 0,1,0, 0,0,0, 0,1,0];

fn glyph(ch: char) -> Option<&'static [u8; 15]> {
    match ch {
        '0'..='9' => Some(&DIGITS[ch as usize - '0' as usize]),
        'A'..='Z' => Some(&LETTERS[ch as usize - 'A' as usize]),
        'a'..='z' => Some(&LETTERS[ch as usize - 'a' as usize]),
        '+' => Some(&PLUS),
        '-' => Some(&MINUS),
        '/' => Some(&SLASH),
        '!' => Some(&BANG),
        _ => None,
    }
}

/// Width in pixels: 3px per glyph + 1px spacing.
fn text_width(text: &str) -> i32 {
    (text.chars().count() as i32 * 4 - 1).max(0)
}

fn draw_glyph(buf: &mut PixelBuf, x: i32, y: i32, glyph: &[u8; 15], fg: Rgb) {
    for row in 0..5 {
        for col in 0..3 {
            if glyph[row * 3 + col] == 1 {
                let px = x + col as i32;
                let py = y + row as i32;
                buf.set(px + 1, py + 1, SHADOW);
                buf.set(px, py, fg);
            }
        }
    }
}

fn draw_text(buf: &mut PixelBuf, x: i32, y: i32, text: &str, fg: Rgb) {
    for (i, ch) in text.chars().enumerate() {
        if let Some(g) = glyph(ch) {
            draw_glyph(buf, x + i as i32 * 4, y, g, fg);
        }
    }
}

fn draw_text_centered(buf: &mut PixelBuf, cx: i32, y: i32, text: &str, fg: Rgb) {
    draw_text(buf, cx - text_width(text) / 2, y, text, fg);
}

// ── Scene ───────────────────────────────────────────────────────────────────

/// Everything the frame needs besides the engine.
pub struct View {
    pub aim: Option<(f64, f64)>,
    pub frame: u64,
}

pub fn draw<R: Rng>(engine: &Engine<R>, view: &View, buf: &mut PixelBuf) {
    let pal = palette(engine.stage().background);
    draw_sky(buf, &pal);
    draw_hills(buf, &pal, view.frame, engine.scale());

    for bird in engine.birds() {
        draw_bird(buf, bird);
    }
    for flash in engine.flashes() {
        let t = flash.ttl / FLASH_DURATION;
        let r = ((1.0 - t) * 4.0 * engine.scale()) as i32 + 1;
        let c = if flash.points < 0 { RED } else { GOLD };
        let (x, y) = (flash.x as i32, flash.y as i32);
        for d in [r, -r] {
            buf.set(x + d, y, c);
            buf.set(x, y + d, c);
            buf.set(x + d, y + d, c);
            buf.set(x + d, y - d, c);
        }
        let label = format!("{:+}", flash.points);
        draw_text_centered(buf, x, y - r - 6, &label, c);
    }

    match engine.state() {
        GameState::Running => {
            if let Some(aim) = view.aim {
                draw_crosshair(buf, aim);
            }
            draw_hud(buf, engine);
        }
        GameState::Paused => {
            draw_hud(buf, engine);
            buf.dim_all(128);
            let (cx, cy) = (buf.w as i32 / 2, buf.h as i32 / 2);
            draw_text_centered(buf, cx, cy - 6, "PAUSED", WHITE);
            draw_text_centered(buf, cx, cy + 2, "P TO RESUME", GOLD);
        }
        GameState::End => {
            draw_hud(buf, engine);
            draw_end(buf, engine);
        }
    }
}

fn draw_sky(buf: &mut PixelBuf, pal: &Palette) {
    let h = buf.h;
    for y in 0..h {
        let t = ((y * 256) / h.max(1)) as u16;
        let c = Rgb::lerp(pal.sky_top, pal.sky_bot, t);
        for x in 0..buf.w {
            buf.set(x as i32, y as i32, c);
        }
    }

    let cx = (buf.w as f64 * pal.sun_at.0) as i32;
    let cy = (h as f64 * pal.sun_at.1) as i32;
    let r = (h as f64 / 12.0).max(2.0) as i32;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                buf.set(cx + dx, cy + dy, pal.sun);
            }
        }
    }
}

fn draw_hills(buf: &mut PixelBuf, pal: &Palette, frame: u64, scale: f64) {
    let base = buf.h as i32;
    let drift = frame as f64 * 0.1;
    // Far hills
    for x in 0..buf.w as i32 {
        let fx = (x as f64 + drift * 0.2) * 0.04;
        let h = (fx.sin() * 6.0 + (fx * 1.7).sin() * 3.0) * scale;
        let top = base - h as i32 - (10.0 * scale) as i32;
        for y in top..base {
            buf.set(x, y, pal.hill_far);
        }
    }
    // Near hills
    for x in 0..buf.w as i32 {
        let fx = (x as f64 + drift * 0.4) * 0.06;
        let h = (fx.sin() * 4.0 + (fx * 2.3).sin() * 2.0) * scale;
        let top = base - h as i32 - (5.0 * scale) as i32;
        for y in top..base {
            buf.set(x, y, pal.hill_near);
        }
    }
}

/// Draws sprite parts in local coordinates, mirrored when flying left.
struct Sprite {
    left: i32,
    top: i32,
    w: i32,
    facing_right: bool,
}

impl Sprite {
    fn fill(&self, buf: &mut PixelBuf, dx: i32, dy: i32, w: i32, h: i32, c: Rgb) {
        for y in dy..dy + h {
            for x in dx..dx + w {
                let sx = if self.facing_right { x } else { self.w - 1 - x };
                buf.set(self.left + sx, self.top + y, c);
            }
        }
    }
}

fn draw_bird(buf: &mut PixelBuf, bird: &Bird) {
    let r: Rect = bird.rect();
    let w = r.width() as i32;
    let h = r.height() as i32;
    let sprite = Sprite {
        left: r.left as i32,
        top: r.top as i32,
        w,
        facing_right: bird.vx >= 0.0,
    };
    let colors = bird_colors(bird.kind);

    let tail_w = (w / 5).max(1);
    let beak_w = (w / 5).max(1);
    let body_w = w - tail_w - beak_w;

    // Body core
    sprite.fill(buf, tail_w, 0, body_w, h, colors.body);
    // Highlight (top of body)
    sprite.fill(buf, tail_w + 1, 0, body_w - 2, 1, colors.hi);

    // Wing flaps a few times a second
    let wing_up = (bird.age * 8.0) as u64 % 2 == 0;
    let wing_y = if wing_up { 1 } else { h / 2 };
    sprite.fill(buf, tail_w + 1, wing_y, (body_w / 2).max(1), (h / 3).max(1), colors.wing);

    // Eye
    let ex = w - beak_w - 2;
    sprite.fill(buf, ex, 1, 1, 1, BIRD_EYE);
    sprite.fill(buf, ex + 1, 1, 1, 1, BIRD_PUPIL);

    // Beak
    sprite.fill(buf, w - beak_w, (h / 2 - 1).max(0), beak_w, 2, colors.beak);

    // Tail
    sprite.fill(buf, 0, (h / 2 - 1).max(0), tail_w, 2, colors.wing);
}

fn draw_crosshair(buf: &mut PixelBuf, (x, y): (f64, f64)) {
    let (x, y) = (x as i32, y as i32);
    for d in 2..=3 {
        buf.set(x + d, y, WHITE);
        buf.set(x - d, y, WHITE);
        buf.set(x, y + d, WHITE);
        buf.set(x, y - d, WHITE);
    }
    buf.set(x, y, RED);
}

fn draw_hud<R: Rng>(buf: &mut PixelBuf, engine: &Engine<R>) {
    let keeper = engine.keeper();
    let w = buf.w as i32;

    draw_text(buf, 2, 1, &format!("SCORE {}", keeper.score()), WHITE);

    let time = format!("TIME {}", keeper.time_left());
    let time_color = if keeper.time_left() <= 10 { RED } else { WHITE };
    draw_text(buf, w - text_width(&time) - 3, 1, &time, time_color);

    let stage = engine.stage();
    let goal = format!("STAGE {} GOAL {}", stage.index, keeper.target_score());
    draw_text_centered(buf, w / 2, 8, &goal, GOLD);
}

fn draw_end<R: Rng>(buf: &mut PixelBuf, engine: &Engine<R>) {
    // Fade towards 70% darkness
    let progress = (engine.end_timer() / FADE_DURATION).clamp(0.0, 1.0);
    buf.dim_all(256 - (progress * 180.0) as u16);

    if !engine.result_visible() {
        return;
    }

    let (fw, fh) = (buf.w as f64, buf.h as f64);
    let panel = layout::end_panel(fw, fh);
    let (px, py) = (panel.left as i32, panel.top as i32);
    let (pw, ph) = (panel.width() as i32, panel.height() as i32);
    let cx = buf.w as i32 / 2;

    buf.fill_rect(px - 1, py - 1, pw + 2, ph + 2, SHADOW);
    buf.fill_rect(px, py, pw, ph, PANEL_EDGE);
    buf.fill_rect(px + 1, py + 1, pw - 2, ph - 2, PANEL_FILL);

    let outcome = engine.outcome();
    let (title, title_color) = match outcome {
        Some(Outcome::FinalVictory) => ("VICTORY!", GOLD),
        Some(Outcome::Cleared) => ("CLEAR!", GOLD),
        _ => ("FAILED", RED),
    };
    draw_text_centered(buf, cx, py + 4, title, title_color);

    let keeper = engine.keeper();
    let score = format!("SCORE {}/{}", keeper.score(), keeper.target_score());
    draw_text_centered(buf, cx, py + 12, &score, WHITE);
    let best = format!("BEST {}", engine.high_score());
    draw_text_centered(buf, cx, py + 20, &best, GOLD);

    let (restart, next) = layout::end_buttons(fw, fh);
    let (next_label, next_color) = match outcome {
        Some(Outcome::Cleared) => ("NEXT", BTN_NEXT),
        Some(Outcome::FinalVictory) => ("AGAIN", BTN_NEXT),
        _ => ("RETRY", BTN_RETRY),
    };
    draw_button(buf, restart, "RESTART", BTN_RESTART);
    draw_button(buf, next, next_label, next_color);
}

fn draw_button(buf: &mut PixelBuf, rect: Rect, label: &str, c: Rgb) {
    let (x, y) = (rect.left as i32, rect.top as i32);
    let (w, h) = (rect.width() as i32, rect.height() as i32);
    buf.fill_rect(x, y, w, h, c);
    buf.fill_rect(x, y, w, 1, Rgb::lerp(c, WHITE, 96));
    let (cx, cy) = rect.center();
    draw_text_centered(buf, cx as i32, cy as i32 - 2, label, WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn count(buf: &PixelBuf, c: Rgb) -> usize {
        buf.px.iter().filter(|p| **p == c).count()
    }

    #[test]
    fn test_set_ignores_out_of_bounds() {
        let mut buf = PixelBuf::new(4, 4);
        buf.set(-1, 0, WHITE);
        buf.set(0, 4, WHITE);
        buf.set(3, 3, WHITE);
        assert_eq!(count(&buf, WHITE), 1);
    }

    #[test]
    fn test_glyph_lookup() {
        assert_eq!(glyph('7'), Some(&DIGITS[7]));
        assert_eq!(glyph('S'), glyph('s'));
        assert!(glyph('-').is_some());
        assert!(glyph(' ').is_none());
        assert_eq!(text_width("SCORE"), 19);
        assert_eq!(text_width(""), 0);
    }

    #[test]
    fn test_render_uses_half_blocks() {
        let mut buf = PixelBuf::new(2, 2);
        buf.set(0, 0, WHITE);
        let mut out = Vec::new();
        buf.render(&mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert_eq!(s.matches('\u{2580}').count(), 1);
    }

    #[test]
    fn test_bird_mirrors_with_heading() {
        let bird = Bird {
            kind: BirdKind::Sparrow,
            x: 10.0,
            y: 10.0,
            vx: 5.0,
            vy: 0.0,
            w: 10.0,
            h: 6.0,
            age: 0.0,
        };
        let beak = bird_colors(BirdKind::Sparrow).beak;

        let mut right = PixelBuf::new(20, 20);
        draw_bird(&mut right, &bird);
        let mut left = PixelBuf::new(20, 20);
        draw_bird(&mut left, &Bird { vx: -5.0, ..bird.clone() });

        // Beak leads in the direction of flight
        assert_eq!(right.get(14, 10), beak);
        assert_eq!(left.get(5, 10), beak);
    }

    #[test]
    fn test_clicks_land_where_the_bird_is_drawn() {
        let bird = Bird {
            kind: BirdKind::Sparrow,
            x: 10.0,
            y: 10.0,
            vx: 5.0,
            vy: 0.0,
            w: 7.0,
            h: 5.0,
            age: 0.0,
        };
        let mut buf = PixelBuf::new(20, 20);
        draw_bird(&mut buf, &bird);
        let r = bird.rect();

        for row in 0..10u16 {
            for col in 0..20u16 {
                let (x, y) = crate::cell_to_canvas(col, row);
                let (px, py) = (col as usize, row as usize * 2);
                let shows_bird = buf.get(px, py) != SHADOW || buf.get(px, py + 1) != SHADOW;
                let in_box = (col as f64) >= r.left
                    && (col as f64) < r.right
                    && (py as f64 + 1.0) >= r.top
                    && (py as f64) < r.bottom;
                if shows_bird {
                    assert!(bird.check_hit(x, y), "cell ({col}, {row}) shows the bird but misses");
                }
                assert_eq!(bird.check_hit(x, y), in_box, "cell ({col}, {row})");
            }
        }
    }

    #[test]
    fn test_draw_full_frame_in_every_state() {
        let mut engine = Engine::new(80, 48, 1, 0, ChaCha8Rng::seed_from_u64(7));
        let mut buf = PixelBuf::new(80, 48);
        let view = View {
            aim: Some((40.0, 24.0)),
            frame: 3,
        };
        draw(&engine, &view, &mut buf);
        assert_eq!(buf.get(40, 24), RED);

        engine.toggle_pause();
        draw(&engine, &view, &mut buf);

        engine.toggle_pause();
        engine.update(60.0);
        engine.update(FADE_DURATION);
        draw(&engine, &view, &mut buf);
        let (restart, _) = layout::end_buttons(80.0, 48.0);
        assert_eq!(buf.get(restart.left as usize, restart.bottom as usize - 1), BTN_RESTART);
    }
}

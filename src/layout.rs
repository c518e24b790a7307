//! Placement of the end-of-stage panel, shared by drawing and tap handling.

use crate::geom::Rect;

pub const BUTTON_H: f64 = 9.0;
const BUTTON_GAP: f64 = 4.0;
const PANEL_H: f64 = 46.0;

fn button_w(width: f64) -> f64 {
    (width * 0.3).clamp(32.0, 48.0)
}

/// The result panel behind the text and buttons.
pub fn end_panel(width: f64, height: f64) -> Rect {
    let w = button_w(width) * 2.0 + BUTTON_GAP + 8.0;
    Rect::from_center(width / 2.0, height / 2.0, w, PANEL_H)
}

/// Restart and Next buttons, left to right.
pub fn end_buttons(width: f64, height: f64) -> (Rect, Rect) {
    let cx = width / 2.0;
    let panel = end_panel(width, height);
    let bottom = panel.bottom - 4.0;
    let top = bottom - BUTTON_H;
    let bw = button_w(width);

    let restart = Rect::new(cx - BUTTON_GAP / 2.0 - bw, top, cx - BUTTON_GAP / 2.0, bottom);
    let next = Rect::new(cx + BUTTON_GAP / 2.0, top, cx + BUTTON_GAP / 2.0 + bw, bottom);
    (restart, next)
}

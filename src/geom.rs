/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_center(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Inclusive on every edge, so a tap exactly on the border counts.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_center_is_symmetric() {
        let r = Rect::from_center(10.0, 20.0, 6.0, 4.0);
        assert_eq!(r, Rect::new(7.0, 18.0, 13.0, 22.0));
        assert_eq!(r.center(), (10.0, 20.0));
        assert_eq!(r.width(), 6.0);
        assert_eq!(r.height(), 4.0);
    }

    #[test]
    fn contains_includes_edges() {
        let r = Rect::new(0.0, 0.0, 4.0, 2.0);
        assert!(r.contains(0.0, 0.0));
        assert!(r.contains(4.0, 2.0));
        assert!(r.contains(2.0, 1.0));
        assert!(!r.contains(4.01, 1.0));
        assert!(!r.contains(2.0, -0.01));
    }
}

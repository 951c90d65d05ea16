//! Normalized pivot point inside an entity's bounds.

/// Pivot in normalized coordinates; both axes are clamped to `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pivot {
    x: f32,
    y: f32,
}

impl Pivot {
    pub const CENTER: Pivot = Pivot { x: 0.5, y: 0.5 };
    pub const TOP_LEFT: Pivot = Pivot { x: 0.0, y: 0.0 };
    pub const TOP_CENTER: Pivot = Pivot { x: 0.5, y: 0.0 };
    pub const TOP_RIGHT: Pivot = Pivot { x: 1.0, y: 0.0 };
    pub const CENTER_LEFT: Pivot = Pivot { x: 0.0, y: 0.5 };
    pub const CENTER_RIGHT: Pivot = Pivot { x: 1.0, y: 0.5 };
    pub const BOTTOM_LEFT: Pivot = Pivot { x: 0.0, y: 1.0 };
    pub const BOTTOM_CENTER: Pivot = Pivot { x: 0.5, y: 1.0 };
    pub const BOTTOM_RIGHT: Pivot = Pivot { x: 1.0, y: 1.0 };

    pub fn new(x: f32, y: f32) -> Self {
        let mut pivot = Self::TOP_LEFT;
        pivot.set(Some(x), Some(y));
        pivot
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Update either axis; `None` keeps the current value. NaN maps to 0.
    pub fn set(&mut self, x: Option<f32>, y: Option<f32>) {
        if let Some(x) = x {
            self.x = clamp_unit(x);
        }
        if let Some(y) = y {
            self.y = clamp_unit(y);
        }
    }

    pub fn top(&mut self) {
        self.y = 0.0;
    }

    pub fn bottom(&mut self) {
        self.y = 1.0;
    }

    pub fn left(&mut self) {
        self.x = 0.0;
    }

    pub fn right(&mut self) {
        self.x = 1.0;
    }
}

impl Default for Pivot {
    fn default() -> Self {
        Self::TOP_LEFT
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_both_axes() {
        let p = Pivot::new(-2.0, 3.5);
        assert_eq!(p, Pivot::BOTTOM_LEFT);
    }

    #[test]
    fn set_keeps_missing_axis() {
        let mut p = Pivot::CENTER;
        p.set(None, Some(0.25));
        assert_eq!(p.x(), 0.5);
        assert_eq!(p.y(), 0.25);
    }

    #[test]
    fn edge_mutators() {
        let mut p = Pivot::CENTER;
        p.bottom();
        p.right();
        assert_eq!(p, Pivot::BOTTOM_RIGHT);
        p.top();
        p.left();
        assert_eq!(p, Pivot::TOP_LEFT);
    }
}

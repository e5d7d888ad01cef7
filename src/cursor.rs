//! Custom cursor state: position, hover mode and a short fading trail.

use std::collections::VecDeque;

pub const TRAIL_CAPACITY: usize = 8;
pub const TRAIL_LIFETIME_MS: f64 = 500.0;

/// Elements that switch the cursor into its enlarged "pointer" mode.
pub const INTERACTIVE_SELECTOR: &str = "a, button, [role=\"button\"], input, textarea, select, label";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    pub x: f64,
    pub y: f64,
    pub recorded_at_ms: f64,
}

/// Owned by the app and shared with the cursor component through context.
#[derive(Clone, Debug, PartialEq)]
pub struct CursorState {
    x: f64,
    y: f64,
    is_pointer: bool,
    is_hidden: bool,
    trail: VecDeque<TrailPoint>,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            is_pointer: false,
            is_hidden: true,
            trail: VecDeque::with_capacity(TRAIL_CAPACITY),
        }
    }
}

impl CursorState {
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn is_pointer(&self) -> bool {
        self.is_pointer
    }

    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    pub fn trail(&self) -> impl Iterator<Item = &TrailPoint> {
        self.trail.iter()
    }

    pub fn on_move(&mut self, x: f64, y: f64, over_interactive: bool, now_ms: f64) {
        self.x = x;
        self.y = y;
        self.is_pointer = over_interactive;
        self.is_hidden = false;

        if self.trail.len() == TRAIL_CAPACITY {
            self.trail.pop_front();
        }
        self.trail.push_back(TrailPoint {
            x,
            y,
            recorded_at_ms: now_ms,
        });
        self.prune(now_ms);
    }

    /// Drops trail points older than [`TRAIL_LIFETIME_MS`]. Returns whether
    /// anything was removed.
    pub fn prune(&mut self, now_ms: f64) -> bool {
        let before = self.trail.len();
        self.trail
            .retain(|point| now_ms - point.recorded_at_ms < TRAIL_LIFETIME_MS);
        self.trail.len() != before
    }

    pub fn on_leave(&mut self) {
        self.is_hidden = true;
        self.is_pointer = false;
        self.trail.clear();
    }
}

/// Opacity and scale for a trail dot, `index` counting back from the newest point.
pub fn trail_dot_style(index: usize) -> (f64, f64) {
    let fade = 0.1 * index as f64;
    ((0.8 - fade).max(0.0), (1.0 - fade).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_starts_hidden_until_the_first_move() {
        let mut cursor = CursorState::default();
        assert!(cursor.is_hidden());

        cursor.on_move(12.0, 34.0, false, 0.0);
        assert!(!cursor.is_hidden());
        assert_eq!(cursor.position(), (12.0, 34.0));
    }

    #[test]
    fn trail_is_capped_at_eight_points() {
        let mut cursor = CursorState::default();

        for step in 0..20 {
            cursor.on_move(f64::from(step), 0.0, false, f64::from(step));
        }

        let xs: Vec<f64> = cursor.trail().map(|point| point.x).collect();
        assert_eq!(xs, (12..20).map(f64::from).collect::<Vec<_>>());
    }

    #[test]
    fn trail_points_expire_after_lifetime() {
        let mut cursor = CursorState::default();
        cursor.on_move(1.0, 1.0, false, 1_000.0);
        cursor.on_move(2.0, 2.0, false, 1_300.0);

        assert!(!cursor.prune(1_499.0));
        assert!(cursor.prune(1_500.0));
        assert_eq!(cursor.trail().count(), 1);
        assert!(cursor.prune(1_800.0));
        assert_eq!(cursor.trail().count(), 0);
    }

    #[test]
    fn leaving_hides_and_clears_pointer_mode() {
        let mut cursor = CursorState::default();
        cursor.on_move(5.0, 5.0, true, 0.0);
        assert!(cursor.is_pointer());

        cursor.on_leave();
        assert!(cursor.is_hidden());
        assert!(!cursor.is_pointer());
        assert_eq!(cursor.trail().count(), 0);
    }

    #[test]
    fn trail_dots_fade_with_index() {
        assert_eq!(trail_dot_style(0), (0.8, 1.0));
        let (opacity, scale) = trail_dot_style(7);
        assert!(opacity < 0.15 && scale < 0.35);
        assert_eq!(trail_dot_style(12), (0.0, 0.0));
    }
}

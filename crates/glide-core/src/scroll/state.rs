//! Engine-owned scroll position and its per-frame smoothing step

use serde::{Deserialize, Serialize};

use super::timing::{approach, is_converged};

/// Who owns the scroll position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// The engine interpolates toward a target and translates elements itself
    Smooth,
    /// The browser scrollbar drives the position; the engine only reacts
    Native,
}

impl Mode {
    pub fn from_smooth(smooth: bool) -> Self {
        if smooth {
            Mode::Smooth
        } else {
            Mode::Native
        }
    }

    #[inline]
    pub fn is_smooth(&self) -> bool {
        matches!(self, Mode::Smooth)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// +1 when moving down the page, -1 when moving up
    #[inline]
    pub fn sign(&self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Virtual scroll position
///
/// In Smooth mode `target` and `current` stay inside `[0, bound]`; in Native
/// mode they mirror whatever the browser reports.
#[derive(Debug, Clone)]
pub struct ScrollState {
    mode: Mode,
    target: f64,
    current: f64,
    previous: f64,
    direction: Direction,
    elasticity: f64,
    velocity: f64,
    bound: f64,
    disabled: bool,
}

impl ScrollState {
    pub fn new(mode: Mode, elasticity: f64, velocity: f64) -> Self {
        Self {
            mode,
            target: 0.0,
            current: 0.0,
            previous: 0.0,
            direction: Direction::Forward,
            elasticity: elasticity.clamp(f64::MIN_POSITIVE, 1.0),
            velocity,
            bound: 0.0,
            disabled: false,
        }
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.clamp_to_bound();
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    #[inline]
    pub fn previous(&self) -> f64 {
        self.previous
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    #[inline]
    pub fn elasticity(&self) -> f64 {
        self.elasticity
    }

    #[inline]
    pub fn bound(&self) -> f64 {
        self.bound
    }

    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Set the maximum scroll extent; negative extents collapse to zero
    pub fn set_bound(&mut self, bound: f64) {
        self.bound = bound.max(0.0);
        self.clamp_to_bound();
    }

    /// Set the interpolation target, clamped into `[0, bound]` in Smooth mode
    pub fn set_target(&mut self, value: f64) {
        self.target = self.clamp(value);
    }

    /// Move both target and current position without interpolating
    pub fn jump_to(&mut self, value: f64) {
        let value = self.clamp(value);
        self.target = value;
        self.current = value;
    }

    /// Record a position reported by the browser (Native mode)
    pub fn sync_native(&mut self, value: f64) {
        self.current = value;
        self.target = value;
    }

    /// Snap the current position onto the target
    pub fn settle(&mut self) {
        self.current = self.target;
    }

    /// Translate a wheel delta (positive = down) into a target change
    ///
    /// Only Smooth mode consumes wheel input, and only while enabled.
    /// Returns whether the target moved.
    pub fn apply_wheel(&mut self, delta_y: f64) -> bool {
        if !self.mode.is_smooth() || self.disabled {
            return false;
        }
        let before = self.target;
        self.set_target(self.target + delta_y * self.velocity);
        (self.target - before).abs() > f64::EPSILON
    }

    /// Advance one frame of first-order smoothing
    ///
    /// Returns true once `|current - target| < epsilon`. Once converged it
    /// leaves the position untouched; `settle` does the final snap.
    pub fn step(&mut self, epsilon: f64) -> bool {
        if is_converged(self.current, self.target, epsilon) {
            return true;
        }
        self.current = approach(self.current, self.target, self.elasticity);
        is_converged(self.current, self.target, epsilon)
    }

    #[inline]
    pub fn is_converged(&self, epsilon: f64) -> bool {
        is_converged(self.current, self.target, epsilon)
    }

    /// Recompute the direction from the last committed frame
    ///
    /// A frame that did not move keeps the previous direction.
    pub fn update_direction(&mut self) -> Direction {
        if self.current > self.previous {
            self.direction = Direction::Forward;
        } else if self.current < self.previous {
            self.direction = Direction::Backward;
        }
        self.direction
    }

    /// Mark the end of a frame pass
    pub fn commit_frame(&mut self) {
        self.previous = self.current;
    }

    fn clamp(&self, value: f64) -> f64 {
        if self.mode.is_smooth() {
            value.clamp(0.0, self.bound)
        } else {
            value
        }
    }

    fn clamp_to_bound(&mut self) {
        if self.mode.is_smooth() {
            self.target = self.target.clamp(0.0, self.bound);
            self.current = self.current.clamp(0.0, self.bound);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smooth(bound: f64) -> ScrollState {
        let mut state = ScrollState::new(Mode::Smooth, 0.075, 0.5);
        state.set_bound(bound);
        state
    }

    #[test]
    fn test_set_target_clamps_in_smooth_mode() {
        let mut state = smooth(1000.0);
        state.set_target(1500.0);
        assert_eq!(state.target(), 1000.0);
        state.set_target(-20.0);
        assert_eq!(state.target(), 0.0);
    }

    #[test]
    fn test_set_target_unclamped_in_native_mode() {
        let mut state = ScrollState::new(Mode::Native, 0.075, 0.5);
        state.set_bound(100.0);
        state.set_target(1500.0);
        assert_eq!(state.target(), 1500.0);
    }

    #[test]
    fn test_negative_bound_collapses_to_zero() {
        let mut state = smooth(-300.0);
        assert_eq!(state.bound(), 0.0);
        state.set_target(50.0);
        assert_eq!(state.target(), 0.0);
    }

    #[test]
    fn test_convergence_is_bounded_and_final() {
        for elasticity in [0.01, 0.075, 0.3, 0.9, 1.0] {
            let mut state = ScrollState::new(Mode::Smooth, elasticity, 0.5);
            state.set_bound(10_000.0);
            state.set_target(7_531.0);

            let mut steps = 0;
            while !state.step(0.1) {
                steps += 1;
                assert!(steps < 10_000, "no convergence for elasticity {}", elasticity);
            }
            assert!((state.current() - 7_531.0).abs() < 0.1);

            let settled = state.current();
            assert!(state.step(0.1));
            assert_eq!(state.current(), settled);
        }
    }

    #[test]
    fn test_wheel_never_leaves_bounds() {
        let mut state = smooth(800.0);
        let deltas = [400.0, 900.0, -3000.0, 120.0, 5000.0, -1.0, 2200.0, -7000.0];
        for delta in deltas {
            state.apply_wheel(delta);
            assert!(state.target() >= 0.0 && state.target() <= 800.0);
        }
    }

    #[test]
    fn test_wheel_scaled_by_velocity() {
        let mut state = smooth(1000.0);
        assert!(state.apply_wheel(100.0));
        assert_eq!(state.target(), 50.0);
    }

    #[test]
    fn test_wheel_ignored_when_disabled_or_native() {
        let mut state = smooth(1000.0);
        state.set_disabled(true);
        assert!(!state.apply_wheel(100.0));
        assert_eq!(state.target(), 0.0);

        let mut native = ScrollState::new(Mode::Native, 0.075, 0.5);
        native.set_bound(1000.0);
        assert!(!native.apply_wheel(100.0));
    }

    #[test]
    fn test_direction_tracks_sign_of_motion() {
        let mut state = smooth(1000.0);
        state.jump_to(100.0);
        assert_eq!(state.update_direction(), Direction::Forward);
        state.commit_frame();

        state.jump_to(40.0);
        assert_eq!(state.update_direction(), Direction::Backward);
        state.commit_frame();

        assert_eq!(state.update_direction(), Direction::Backward);
    }

    #[test]
    fn test_shrinking_bound_reclamps_position() {
        let mut state = smooth(1000.0);
        state.jump_to(900.0);
        state.set_bound(500.0);
        assert_eq!(state.target(), 500.0);
        assert_eq!(state.current(), 500.0);
    }
}

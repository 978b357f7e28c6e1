//! Path Simplifier
//!
//! Elides linear moves whose deviation from the last emitted point stays
//! below the minimum distance. Distances are accumulated across consecutive
//! skipped moves, so the total deferred motion is bounded by the threshold
//! rather than by the threshold per segment.

use super::state::{ResolvedCommand, TrackedState};

#[derive(Debug, Clone, Copy)]
pub struct PathSimplifier {
    pub min_distance: f64,
    /// Fold z into the distance instead of never eliding z changes
    pub vase_mode: bool,
}

impl PathSimplifier {
    pub fn new(min_distance: f64, vase_mode: bool) -> Self {
        Self {
            min_distance,
            vase_mode,
        }
    }

    /// Decide whether `resolved` can be elided. Only call this for genuine
    /// linear motions; it updates the accumulator in `state`.
    pub fn should_skip(&self, resolved: &ResolvedCommand, state: &mut TrackedState) -> bool {
        let Some(anchor) = state.last_emitted else {
            return false;
        };
        let target = resolved.target;

        let distance = if self.vase_mode {
            target.distance(&anchor)
        } else {
            // z changes are plane changes and always explicit
            if target.z != anchor.z {
                state.skipped_distance = 0.0;
                return false;
            }
            target.planar_distance(&anchor)
        };

        if state.skipped_distance + distance < self.min_distance {
            state.skipped_distance += distance;
            true
        } else {
            state.skipped_distance = 0.0;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::state::{Point, PositionTracker};
    use crate::parser::MotionCommand;

    fn state_at(point: Point) -> TrackedState {
        let mut state = TrackedState::at(point);
        state.mark_emitted(point);
        state
    }

    fn resolve(state: &mut TrackedState, x: f64, y: f64, z: f64) -> ResolvedCommand {
        PositionTracker::default().resolve(MotionCommand::linear().at(x, y, z), state)
    }

    #[test]
    fn test_accumulates_until_threshold() {
        let simplifier = PathSimplifier::new(2.0, false);
        let mut state = state_at(Point::default());

        let r = resolve(&mut state, 0.5, 0.0, 0.0);
        assert!(simplifier.should_skip(&r, &mut state));
        assert_eq!(state.skipped_distance, 0.5);

        let r = resolve(&mut state, 1.0, 0.0, 0.0);
        assert!(simplifier.should_skip(&r, &mut state));
        assert_eq!(state.skipped_distance, 1.5);

        // 1.5 accumulated + 1.2 from the anchor reaches the threshold
        let r = resolve(&mut state, 1.2, 0.0, 0.0);
        assert!(!simplifier.should_skip(&r, &mut state));
        assert_eq!(state.skipped_distance, 0.0);
    }

    #[test]
    fn test_z_change_never_skipped() {
        let simplifier = PathSimplifier::new(100.0, false);
        let mut state = state_at(Point::default());

        let r = resolve(&mut state, 0.0, 0.0, 0.2);
        assert!(!simplifier.should_skip(&r, &mut state));
    }

    #[test]
    fn test_vase_mode_folds_z() {
        let simplifier = PathSimplifier::new(1.0, true);
        let mut state = state_at(Point::default());

        let r = resolve(&mut state, 0.0, 0.0, 0.2);
        assert!(simplifier.should_skip(&r, &mut state));

        let r = resolve(&mut state, 0.0, 0.0, 1.5);
        assert!(!simplifier.should_skip(&r, &mut state));
    }

    #[test]
    fn test_nothing_emitted_never_skips() {
        let simplifier = PathSimplifier::new(10.0, false);
        let mut state = TrackedState::default();
        let r = resolve(&mut state, 0.1, 0.0, 0.0);
        assert!(!simplifier.should_skip(&r, &mut state));
    }

    #[test]
    fn test_zero_distance_threshold_keeps_everything() {
        let simplifier = PathSimplifier::new(0.0, false);
        let mut state = state_at(Point::default());
        let r = resolve(&mut state, 0.001, 0.0, 0.0);
        assert!(!simplifier.should_skip(&r, &mut state));
    }
}

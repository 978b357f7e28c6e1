//! Tracked machine state and the position tracker.

use serde::Serialize;

use crate::parser::MotionCommand;

/// An absolute Cartesian point in the robot's base frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Distance in the XY plane
    pub fn planar_distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Full 3-D distance
    pub fn distance(&self, other: &Point) -> f64 {
        let dz = self.z - other.z;
        (self.planar_distance(other).powi(2) + dz * dz).sqrt()
    }
}

/// Counters accumulated during a run and returned with the result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Commands consumed from the source stream
    pub commands: usize,
    /// Statements in the output
    pub emitted: usize,
    /// Motion commands elided by the path simplifier
    pub omitted: usize,
    /// Commands dropped because they cannot be translated
    pub skipped: usize,
}

/// The engine's running machine state
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedState {
    /// Last resolved position
    pub position: Point,
    /// Last resolved feed rate, `None` until the source sets one
    pub feed: Option<f64>,
    /// Last seen tool amount (E)
    pub amount: f64,
    /// Tool activation flag (extruder or laser)
    pub tool_on: bool,
    /// Last point a motion statement was emitted for
    pub last_emitted: Option<Point>,
    /// Last feed a speed statement was emitted for
    pub emitted_feed: Option<f64>,
    /// Distance deferred by elided moves since the last emitted motion
    pub skipped_distance: f64,
    pub stats: ConversionStats,
}

impl Default for TrackedState {
    fn default() -> Self {
        Self::at(Point::default())
    }
}

impl TrackedState {
    /// A fresh state with the tool parked at `position`
    pub fn at(position: Point) -> Self {
        Self {
            position,
            feed: None,
            amount: 0.0,
            tool_on: false,
            last_emitted: None,
            emitted_feed: None,
            skipped_distance: 0.0,
            stats: ConversionStats::default(),
        }
    }

    /// Record that a motion statement was emitted for `point`
    pub fn mark_emitted(&mut self, point: Point) {
        self.last_emitted = Some(point);
        self.skipped_distance = 0.0;
    }
}

/// A command together with its effective absolute target
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCommand {
    pub command: MotionCommand,
    pub target: Point,
    pub previous: Point,
    /// Effective feed rate after inheritance
    pub feed: Option<f64>,
    /// True for a genuine motion: coordinates present, and either the target
    /// changed or nothing has been emitted yet
    pub moved: bool,
}

/// Resolves partial coordinates against the tracked state
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionTracker {
    /// Negate every z before use (inverted build)
    pub inverted: bool,
}

impl PositionTracker {
    pub fn new(inverted: bool) -> Self {
        Self { inverted }
    }

    pub fn resolve(&self, command: MotionCommand, state: &mut TrackedState) -> ResolvedCommand {
        let previous = state.position;
        let z = command.z.map(|z| if self.inverted { -z } else { z });

        let target = Point {
            x: command.x.unwrap_or(previous.x),
            y: command.y.unwrap_or(previous.y),
            z: z.unwrap_or(previous.z),
        };
        if command.feed.is_some() {
            state.feed = command.feed;
        }
        state.position = target;

        let moved =
            command.has_coordinates() && (target != previous || state.last_emitted.is_none());

        ResolvedCommand {
            feed: state.feed,
            command,
            target,
            previous,
            moved,
        }
    }
}

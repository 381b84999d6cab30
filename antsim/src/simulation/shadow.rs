use shared::Coordinate;
use shared::coordinate::{normalize_direction, shortest_turn};
use shared::video::EntityInsert;

/// The pose a video reader has reconstructed so far, in steps.
///
/// Entities diff their live coordinate against the shadow when they are
/// recorded, so the deltas written always sum to what the reader holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoseShadow {
    pub x: i32,
    pub y: i32,
    pub direction: i32,
}

/// Deltas of one recorded tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoseDelta {
    pub x: Option<i8>,
    pub y: Option<i8>,
    pub direction: Option<i16>,
}

impl PoseShadow {
    pub fn from_insert(pose: &EntityInsert) -> Self {
        Self {
            x: pose.x.into(),
            y: pose.y.into(),
            direction: pose.direction.into(),
        }
    }

    /// Moves the shadow toward `coordinate`. Position steps beyond the `i8`
    /// range stay pending for the next tick.
    pub fn step_toward(&mut self, coordinate: &Coordinate) -> PoseDelta {
        let x = clamp_step(coordinate.x_steps() - self.x);
        let y = clamp_step(coordinate.y_steps() - self.y);
        let turn = shortest_turn(self.direction, coordinate.direction());

        self.x += x as i32;
        self.y += y as i32;
        self.direction = normalize_direction(self.direction + turn);

        PoseDelta {
            x: (x != 0).then_some(x),
            y: (y != 0).then_some(y),
            direction: (turn != 0).then_some(turn as i16),
        }
    }
}

fn clamp_step(delta: i32) -> i8 {
    delta.clamp(i8::MIN as i32, i8::MAX as i32) as i8
}

/// Last recorded value of an absolute field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tracked<T> {
    last: Option<T>,
}

impl<T: Copy + PartialEq> Tracked<T> {
    /// Returns `now` if the reader does not hold it yet, and remembers it.
    pub fn diff(&mut self, now: T) -> Option<T> {
        if self.last == Some(now) {
            return None;
        }
        self.last = Some(now);
        Some(now)
    }
}

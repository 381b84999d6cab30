//! Pose of a playground entity in internal fixed-point units.
//!
//! All simulation geometry runs on [`Coordinate`]: positions, radii and
//! directions are integers, and every query rounds to the nearest integer so
//! that runs are reproducible.

use crate::unit::{UnitScale, PLAYGROUND_UNIT};
use crate::util::{fixed_sin_cos, scale_by_trig};

/// Anything that occupies a spot on the playground.
pub trait HasCoordinate {
    fn coordinate(&self) -> &Coordinate;
}

impl HasCoordinate for Coordinate {
    fn coordinate(&self) -> &Coordinate {
        self
    }
}

/// Position, radius and direction of an item on the playground.
///
/// `radius` is never negative and `direction` is always in `[0, 360)` degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coordinate {
    x: i32,
    y: i32,
    radius: i32,
    direction: i32,
}

impl Coordinate {
    /// A point without radius or direction, in playground steps.
    pub fn new(x: i32, y: i32) -> Self {
        Self::scaled(UnitScale::PLAYGROUND, x, y, 0, 0)
    }

    /// A circle without direction, in playground steps.
    pub fn with_radius(x: i32, y: i32, radius: i32) -> Self {
        Self::scaled(UnitScale::PLAYGROUND, x, y, radius, 0)
    }

    /// A circle with a direction in degrees, in playground steps.
    pub fn with_direction(x: i32, y: i32, radius: i32, direction: i32) -> Self {
        Self::scaled(UnitScale::PLAYGROUND, x, y, radius, direction)
    }

    /// Builds a coordinate from external values; `x`, `y` and `radius` are
    /// multiplied by `scale`, `direction` is only normalized.
    pub fn scaled(scale: UnitScale, x: i32, y: i32, radius: i32, direction: i32) -> Self {
        let mut coordinate = Self {
            x: scale.to_internal(x),
            y: scale.to_internal(y),
            radius: 0,
            direction: 0,
        };
        coordinate.set_radius(scale.to_internal(radius));
        coordinate.set_direction(direction);
        coordinate
    }

    /// A coordinate next to `base`, sharing its radius and direction.
    ///
    /// `delta_x` and `delta_y` are already internal units and are not rescaled.
    pub fn relative_to(base: &Coordinate, delta_x: i32, delta_y: i32) -> Self {
        Self {
            x: base.x + delta_x,
            y: base.y + delta_y,
            radius: base.radius,
            direction: base.direction,
        }
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn radius(&self) -> i32 {
        self.radius
    }

    #[inline]
    pub fn direction(&self) -> i32 {
        self.direction
    }

    pub fn set_x(&mut self, x: i32) {
        self.x = x;
    }

    pub fn set_y(&mut self, y: i32) {
        self.y = y;
    }

    /// Stores the absolute value of `radius`.
    pub fn set_radius(&mut self, radius: i32) {
        self.radius = radius.saturating_abs();
    }

    /// Stores `direction` wrapped into `[0, 360)`.
    pub fn set_direction(&mut self, direction: i32) {
        self.direction = normalize_direction(direction);
    }

    /// Turns by `degrees`; positive values turn toward +y.
    pub fn turn_by(&mut self, degrees: i32) {
        self.set_direction(self.direction + normalize_direction(degrees));
    }

    /// Moves `distance` internal units along the current direction.
    pub fn advance(&mut self, distance: i32) {
        let (sin, cos) = fixed_sin_cos(self.direction);
        self.x += scale_by_trig(distance, cos);
        self.y += scale_by_trig(distance, sin);
    }

    pub fn x_steps(&self) -> i32 {
        UnitScale::PLAYGROUND.to_steps(self.x)
    }

    pub fn y_steps(&self) -> i32 {
        UnitScale::PLAYGROUND.to_steps(self.y)
    }

    pub fn radius_steps(&self) -> i32 {
        UnitScale::PLAYGROUND.to_steps(self.radius)
    }

    /// Gap between the two circles in internal units; 0 when they touch or overlap.
    pub fn distance(&self, other: &Coordinate) -> i32 {
        let gap = self.distance_to_center(other) as i64 - self.radius as i64 - other.radius as i64;
        gap.max(0) as i32
    }

    /// Distance between the two centers in internal units, rounded to nearest.
    pub fn distance_to_center(&self, other: &Coordinate) -> i32 {
        let delta_x = self.x as f64 - other.x as f64;
        let delta_y = self.y as f64 - other.y as f64;
        (delta_x * delta_x + delta_y * delta_y).sqrt().round() as i32
    }

    /// Direction in degrees from this coordinate to `other`, in `[0, 360)`.
    pub fn direction_to(&self, other: &Coordinate) -> i32 {
        let delta_x = other.x as f64 - self.x as f64;
        let delta_y = other.y as f64 - self.y as f64;
        normalize_direction(delta_y.atan2(delta_x).to_degrees().round() as i32)
    }
}

/// Wraps any angle in degrees into `[0, 360)`.
#[inline]
pub fn normalize_direction(direction: i32) -> i32 {
    direction.rem_euclid(360)
}

/// Signed turn in `(-180, 180]` that rotates `from` onto `to`.
pub fn shortest_turn(from: i32, to: i32) -> i32 {
    let turn = normalize_direction(to - from);
    if turn > 180 {
        turn - 360
    } else {
        turn
    }
}

/// Surface gap between two items in internal units.
pub fn distance<A, B>(a: &A, b: &B) -> i32
where
    A: HasCoordinate + ?Sized,
    B: HasCoordinate + ?Sized,
{
    a.coordinate().distance(b.coordinate())
}

/// Surface gap between two items in whole playground steps.
pub fn distance_in_steps<A, B>(a: &A, b: &B) -> i32
where
    A: HasCoordinate + ?Sized,
    B: HasCoordinate + ?Sized,
{
    distance(a, b) / PLAYGROUND_UNIT
}

/// Center-to-center distance between two items in internal units.
pub fn distance_to_center<A, B>(a: &A, b: &B) -> i32
where
    A: HasCoordinate + ?Sized,
    B: HasCoordinate + ?Sized,
{
    a.coordinate().distance_to_center(b.coordinate())
}

/// Direction in degrees from one item to another.
pub fn direction<A, B>(from: &A, to: &B) -> i32
where
    A: HasCoordinate + ?Sized,
    B: HasCoordinate + ?Sized,
{
    from.coordinate().direction_to(to.coordinate())
}

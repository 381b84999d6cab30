use rand::Rng;
use shared::Coordinate;
use shared::UnitScale;

/// Rectangular playground with its origin in the top-left corner.
#[derive(Debug, Clone)]
pub struct Playground {
    width: i32,  // internal units
    height: i32, // internal units
}

impl Playground {
    /// Creates a playground measured in steps.
    pub fn new(width_steps: i32, height_steps: i32) -> Self {
        let scale = UnitScale::PLAYGROUND;
        Self {
            width: scale.to_internal(width_steps.max(1)),
            height: scale.to_internal(height_steps.max(1)),
        }
    }

    pub fn center(&self, radius_steps: i32) -> Coordinate {
        let scale = UnitScale::PLAYGROUND;
        Coordinate::with_radius(
            scale.to_steps(self.width / 2),
            scale.to_steps(self.height / 2),
            radius_steps,
        )
    }

    /// Random spot where a circle of `radius_steps` fits, facing a random direction.
    pub fn random_coordinate<R: Rng>(&self, rng: &mut R, radius_steps: i32) -> Coordinate {
        let scale = UnitScale::PLAYGROUND;
        let x = random_axis(rng, scale.to_steps(self.width), radius_steps);
        let y = random_axis(rng, scale.to_steps(self.height), radius_steps);
        Coordinate::with_direction(x, y, radius_steps, rng.random_range(0..360))
    }

    /// Keeps the circle inside the playground, mirroring the direction on the
    /// axis it hit. Returns whether it bounced.
    pub fn bounce(&self, coordinate: &mut Coordinate) -> bool {
        let radius = coordinate.radius();
        let mut bounced = false;

        let (min_x, max_x) = axis_bounds(self.width, radius);
        if coordinate.x() < min_x || coordinate.x() > max_x {
            coordinate.set_x(coordinate.x().clamp(min_x, max_x));
            coordinate.set_direction(180 - coordinate.direction());
            bounced = true;
        }

        let (min_y, max_y) = axis_bounds(self.height, radius);
        if coordinate.y() < min_y || coordinate.y() > max_y {
            coordinate.set_y(coordinate.y().clamp(min_y, max_y));
            coordinate.set_direction(-coordinate.direction());
            bounced = true;
        }

        bounced
    }
}

/// Smallest and largest center position on one axis.
fn axis_bounds(length: i32, radius: i32) -> (i32, i32) {
    if 2 * radius >= length {
        (length / 2, length / 2)
    } else {
        (radius, length - radius)
    }
}

fn random_axis<R: Rng>(rng: &mut R, length_steps: i32, radius_steps: i32) -> i32 {
    let (min, max) = axis_bounds(length_steps, radius_steps);
    rng.random_range(min..=max)
}

use super::{
    BUG_MAX_TURN, BUG_MAX_VITALITY, BUG_RADIUS, BUG_REGENERATION, BUG_SPEED, BUG_TURN_INTERVAL,
    Playground, PoseShadow, Timer, Tracked,
};

use rand::Rng;
use shared::update::BugUpdate;
use shared::video::EntityInsert;
use shared::{Coordinate, HasCoordinate};
use slotmap::new_key_type;

new_key_type! {
    /// Key for bug slotmap.
    pub struct BugKey;
}

/// State of a bug.
pub struct Bug {
    pub id: u16,
    pub coordinate: Coordinate,
    pub vitality: u16,
    pub turn_timer: Timer,

    shadow: Option<PoseShadow>, // None until the bug is inserted into the video
    recorded_vitality: Tracked<u16>,
}

impl Bug {
    /// Create a new bug at a random spot.
    pub fn new<R: Rng>(id: u16, playground: &Playground, rng: &mut R) -> Self {
        Self {
            id,
            coordinate: playground.random_coordinate(rng, BUG_RADIUS),
            vitality: BUG_MAX_VITALITY,
            // Start turn timer with a random value
            turn_timer: Timer::new(BUG_TURN_INTERVAL, rng.random_range(0..BUG_TURN_INTERVAL)),
            shadow: None,
            recorded_vitality: Tracked::default(),
        }
    }

    /// Wander one tick: turn now and then, walk, bounce off the edges.
    pub fn update<R: Rng>(&mut self, playground: &Playground, rng: &mut R) {
        if self.is_dead() {
            return;
        }

        self.turn_timer.update(1);
        if self.turn_timer.is_ready() {
            self.turn_timer.wrap();
            self.coordinate
                .turn_by(rng.random_range(-BUG_MAX_TURN..=BUG_MAX_TURN));
        }

        self.coordinate.advance(BUG_SPEED);
        if playground.bounce(&mut self.coordinate) {
            // Pick a fresh heading right after hitting an edge
            self.turn_timer.force_ready();
        }

        self.vitality = (self.vitality + BUG_REGENERATION).min(BUG_MAX_VITALITY);
    }

    pub fn take_damage(&mut self, damage: u16) {
        self.vitality = self.vitality.saturating_sub(damage);
    }

    pub fn is_dead(&self) -> bool {
        self.vitality == 0
    }

    pub fn is_inserted(&self) -> bool {
        self.shadow.is_some()
    }

    /// Marks the bug as inserted with `pose`.
    pub fn inserted(&mut self, pose: &EntityInsert) {
        self.shadow = Some(PoseShadow::from_insert(pose));
    }

    /// Recorded pose so far, if inserted.
    #[cfg(test)]
    pub fn shadow(&self) -> Option<&PoseShadow> {
        self.shadow.as_ref()
    }

    /// Changes since the last recorded tick.
    pub fn take_update(&mut self) -> BugUpdate {
        let mut update = BugUpdate::new();
        if let Some(shadow) = self.shadow.as_mut() {
            let delta = shadow.step_toward(&self.coordinate);
            if let Some(x) = delta.x {
                update.set_delta_x(x);
            }
            if let Some(y) = delta.y {
                update.set_delta_y(y);
            }
            if let Some(direction) = delta.direction {
                update.set_delta_direction(direction);
            }
        }
        if let Some(vitality) = self.recorded_vitality.diff(self.vitality) {
            update.set_vitality(vitality);
        }
        update
    }
}

impl HasCoordinate for Bug {
    fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use shared::EntityUpdate;
    use shared::update::BugField;

    fn bug() -> (Bug, Playground, StdRng) {
        let playground = Playground::new(200, 200);
        let mut rng = StdRng::seed_from_u64(1);
        let bug = Bug::new(0, &playground, &mut rng);
        (bug, playground, rng)
    }

    #[test]
    fn test_first_update_carries_vitality() {
        let (mut bug, _, _) = bug();
        let pose = EntityInsert::from_coordinate(&bug.coordinate);
        bug.inserted(&pose);

        let update = bug.take_update();
        assert!(update.has_changed(BugField::Vitality));
        assert_eq!(update.vitality(), BUG_MAX_VITALITY);
        assert!(!update.has_changed(BugField::PositionX));
        assert!(bug.take_update().is_empty(), "nothing changed since");
    }

    #[test]
    fn test_wandering_bug_reports_its_moves() {
        let (mut bug, playground, mut rng) = bug();
        bug.inserted(&EntityInsert::from_coordinate(&bug.coordinate));
        bug.take_update();

        let mut x = bug.shadow().map(|shadow| shadow.x).unwrap_or_default();
        for _ in 0..100 {
            bug.update(&playground, &mut rng);
            x += bug.take_update().delta_x() as i32;
        }
        assert_eq!(x, bug.coordinate.x_steps());
    }

    #[test]
    fn test_damage_and_regeneration() {
        let (mut bug, playground, mut rng) = bug();
        bug.take_damage(BUG_MAX_VITALITY - 10);
        assert_eq!(bug.vitality, 10);
        bug.update(&playground, &mut rng);
        assert_eq!(bug.vitality, 10 + BUG_REGENERATION);

        bug.take_damage(u16::MAX);
        assert!(bug.is_dead());
        let before = bug.coordinate;
        bug.update(&playground, &mut rng);
        assert_eq!(bug.coordinate, before, "dead bugs do not move");
    }
}

use super::bug::BugKey;
use super::sugar::{Sugar, SugarKey};
use super::{
    ANT_MAX_LOAD, ANT_MAX_VITALITY, ANT_RADIUS, ANT_SPEED, ANT_VIEW_RANGE, ANT_WANDER_TURN,
    Playground, PoseShadow, Tracked,
};

use rand::Rng;
use shared::coordinate::distance;
use shared::update::{AntUpdate, LoadType, TargetType};
use shared::video::EntityInsert;
use shared::{Coordinate, HasCoordinate, UnitScale};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Key for ant slotmap.
    pub struct AntKey;
}

/// What an ant is heading for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    None,
    Sugar(SugarKey),
    Nest,
    Bug(BugKey),
}

impl Target {
    pub fn target_type(&self) -> TargetType {
        match self {
            Target::None => TargetType::None,
            Target::Sugar(_) => TargetType::Sugar,
            Target::Nest => TargetType::Nest,
            Target::Bug(_) => TargetType::Bug,
        }
    }
}

/// Last values written for the absolute ant fields.
#[derive(Debug, Default)]
struct RecordedAnt {
    vitality: Tracked<u16>,
    load: Tracked<u8>,
    load_type: Tracked<LoadType>,
    target_type: Tracked<TargetType>,
    target_x: Tracked<u16>,
    target_y: Tracked<u16>,
    view_range: Tracked<u16>,
}

/// State of an ant.
pub struct Ant {
    pub id: u16,
    pub coordinate: Coordinate,
    pub vitality: u16,
    pub load: u8,
    pub view_range: i32, // in steps
    pub target: Target,
    pub target_position: Option<Coordinate>,

    shadow: Option<PoseShadow>, // None until the ant is inserted into the video
    recorded: RecordedAnt,
}

impl Ant {
    /// Create a new ant on the nest, facing a random direction.
    pub fn new<R: Rng>(id: u16, nest: &Coordinate, rng: &mut R) -> Self {
        let mut coordinate = Coordinate::relative_to(nest, 0, 0);
        coordinate.set_radius(UnitScale::PLAYGROUND.to_internal(ANT_RADIUS));
        coordinate.set_direction(rng.random_range(0..360));

        Self {
            id,
            coordinate,
            vitality: ANT_MAX_VITALITY,
            load: 0,
            view_range: ANT_VIEW_RANGE,
            target: Target::None,
            target_position: None,
            shadow: None,
            recorded: RecordedAnt::default(),
        }
    }

    /// Update ant state and behavior. Returns the sugar delivered to the nest.
    pub fn update<R: Rng>(
        &mut self,
        nest: &Coordinate,
        sugar: &mut SlotMap<SugarKey, Sugar>,
        playground: &Playground,
        rng: &mut R,
    ) -> u16 {
        if self.is_dead() {
            return 0;
        }

        if self.load > 0 {
            self.set_target(Target::Nest, nest);
            if self.coordinate.distance(nest) == 0 {
                let delivered = self.load as u16;
                self.load = 0;
                self.set_target(Target::None, nest);
                return delivered;
            }
            self.walk_toward(nest, playground);
            return 0;
        }

        match self.nearest_sugar(sugar) {
            Some(key) => {
                let Some(heap) = sugar.get_mut(key) else {
                    return 0;
                };
                let heap_coordinate = heap.coordinate;
                self.set_target(Target::Sugar(key), &heap_coordinate);
                if self.coordinate.distance(&heap_coordinate) == 0 {
                    self.load = heap.take(ANT_MAX_LOAD as u16) as u8;
                    self.set_target(Target::Nest, nest);
                } else {
                    self.walk_toward(&heap_coordinate, playground);
                }
            }
            None => {
                self.target = Target::None;
                self.target_position = None;
                self.coordinate
                    .turn_by(rng.random_range(-ANT_WANDER_TURN..=ANT_WANDER_TURN));
                self.coordinate.advance(ANT_SPEED);
                playground.bounce(&mut self.coordinate);
            }
        }
        0
    }

    /// Closest non-empty heap within view range.
    fn nearest_sugar(&self, sugar: &SlotMap<SugarKey, Sugar>) -> Option<SugarKey> {
        let range = UnitScale::PLAYGROUND.to_internal(self.view_range);
        sugar
            .iter()
            .filter(|(_, heap)| !heap.is_empty())
            .map(|(key, heap)| (key, distance(self, heap)))
            .filter(|&(_, gap)| gap <= range)
            .min_by_key(|&(_, gap)| gap)
            .map(|(key, _)| key)
    }

    /// Heads straight for `target`, stopping once the two touch.
    fn walk_toward(&mut self, target: &Coordinate, playground: &Playground) {
        let remaining = self.coordinate.distance(target);
        self.coordinate
            .set_direction(self.coordinate.direction_to(target));
        // Overshoot by a hair so rounding cannot leave a one-unit gap.
        let step = if remaining <= ANT_SPEED {
            remaining + 2
        } else {
            ANT_SPEED
        };
        self.coordinate.advance(step);
        playground.bounce(&mut self.coordinate);
    }

    pub fn set_target(&mut self, target: Target, position: &Coordinate) {
        self.target = target;
        self.target_position = match target {
            Target::None => None,
            _ => Some(*position),
        };
    }

    pub fn take_damage(&mut self, damage: u16) {
        self.vitality = self.vitality.saturating_sub(damage);
    }

    pub fn is_dead(&self) -> bool {
        self.vitality == 0
    }

    pub fn load_type(&self) -> LoadType {
        if self.load > 0 {
            LoadType::Sugar
        } else {
            LoadType::None
        }
    }

    pub fn is_inserted(&self) -> bool {
        self.shadow.is_some()
    }

    pub fn inserted(&mut self, pose: &EntityInsert) {
        self.shadow = Some(PoseShadow::from_insert(pose));
    }

    /// Changes since the last recorded tick.
    pub fn take_update(&mut self) -> AntUpdate {
        let mut update = AntUpdate::new();
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

        let load_type = self.load_type();
        let recorded = &mut self.recorded;
        if let Some(vitality) = recorded.vitality.diff(self.vitality) {
            update.set_vitality(vitality);
        }
        if let Some(load) = recorded.load.diff(self.load) {
            update.set_load(load);
        }
        if let Some(load_type) = recorded.load_type.diff(load_type) {
            update.set_load_type(load_type);
        }
        if let Some(target_type) = recorded.target_type.diff(self.target.target_type()) {
            update.set_target_type(target_type);
        }
        if let Some(position) = self.target_position {
            if let Some(x) = recorded.target_x.diff(to_wire_steps(position.x_steps())) {
                update.set_target_x(x);
            }
            if let Some(y) = recorded.target_y.diff(to_wire_steps(position.y_steps())) {
                update.set_target_y(y);
            }
        }
        if let Some(range) = recorded.view_range.diff(to_wire_steps(self.view_range)) {
            update.set_view_range(range);
        }
        update
    }
}

fn to_wire_steps(steps: i32) -> u16 {
    steps.clamp(0, u16::MAX as i32) as u16
}

impl HasCoordinate for Ant {
    fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::NEST_RADIUS;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use shared::EntityUpdate;
    use shared::update::AntField;

    struct World {
        playground: Playground,
        nest: Coordinate,
        sugar: SlotMap<SugarKey, Sugar>,
        rng: StdRng,
    }

    fn world() -> World {
        let playground = Playground::new(400, 400);
        World {
            nest: playground.center(NEST_RADIUS),
            playground,
            sugar: SlotMap::with_key(),
            rng: StdRng::seed_from_u64(11),
        }
    }

    fn place_sugar(world: &mut World, x: i32, y: i32, amount: u16) -> SugarKey {
        let mut heap = Sugar::new(0, amount, &world.playground, &mut world.rng);
        let radius = crate::simulation::sugar::heap_radius(amount);
        heap.coordinate = Coordinate::with_radius(x, y, radius);
        world.sugar.insert(heap)
    }

    fn tick(ant: &mut Ant, world: &mut World) -> u16 {
        ant.update(
            &world.nest,
            &mut world.sugar,
            &world.playground,
            &mut world.rng,
        )
    }

    #[test]
    fn test_ant_fetches_sugar_and_delivers_it() {
        let mut world = world();
        let key = place_sugar(&mut world, 250, 200, 100);
        let mut ant = Ant::new(0, &world.nest, &mut world.rng);

        let mut delivered = 0;
        for _ in 0..400 {
            delivered += tick(&mut ant, &mut world);
            if delivered > 0 {
                break;
            }
        }
        assert_eq!(delivered, ANT_MAX_LOAD as u16);
        assert_eq!(world.sugar[key].amount, 100 - ANT_MAX_LOAD as u16);
        assert_eq!(ant.load, 0);
        assert_eq!(ant.target, Target::None);
    }

    #[test]
    fn test_ant_heads_for_visible_sugar() {
        let mut world = world();
        let key = place_sugar(&mut world, 260, 200, 50);
        let mut ant = Ant::new(0, &world.nest, &mut world.rng);

        tick(&mut ant, &mut world);
        assert_eq!(ant.target, Target::Sugar(key));
        assert_eq!(ant.coordinate.direction(), 0);
    }

    #[test]
    fn test_ant_ignores_sugar_out_of_view() {
        let mut world = world();
        place_sugar(&mut world, 395, 395, 50);
        let mut ant = Ant::new(0, &world.nest, &mut world.rng);

        tick(&mut ant, &mut world);
        assert_eq!(ant.target, Target::None);
        assert_eq!(ant.target_position, None);
    }

    #[test]
    fn test_first_update_describes_the_whole_ant() {
        let mut world = world();
        let mut ant = Ant::new(0, &world.nest, &mut world.rng);
        ant.inserted(&EntityInsert::from_coordinate(&ant.coordinate));

        let update = ant.take_update();
        assert_eq!(update.vitality(), ANT_MAX_VITALITY);
        assert!(update.has_changed(AntField::Load));
        assert_eq!(update.load_type(), LoadType::None);
        assert_eq!(update.target_type(), TargetType::None);
        assert!(!update.has_changed(AntField::TargetX));
        assert_eq!(update.view_range(), ANT_VIEW_RANGE as u16);
        assert!(ant.take_update().is_empty());
    }

    #[test]
    fn test_damage_kills() {
        let mut world = world();
        let mut ant = Ant::new(0, &world.nest, &mut world.rng);
        ant.take_damage(ANT_MAX_VITALITY);
        assert!(ant.is_dead());
        let before = ant.coordinate;
        assert_eq!(tick(&mut ant, &mut world), 0);
        assert_eq!(ant.coordinate, before);
    }
}

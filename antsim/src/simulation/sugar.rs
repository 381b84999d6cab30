use super::{Playground, Tracked};

use rand::Rng;
use shared::update::SugarUpdate;
use shared::{Coordinate, HasCoordinate, UnitScale};
use slotmap::new_key_type;

new_key_type! {
    /// Key for sugar slotmap.
    pub struct SugarKey;
}

/// A heap of sugar. Its radius shrinks as ants carry it off.
pub struct Sugar {
    pub id: u16,
    pub coordinate: Coordinate,
    pub amount: u16,

    inserted: bool,
    recorded_amount: Tracked<u16>,
    recorded_radius: Tracked<u16>,
}

/// Radius in steps of a heap holding `amount`.
pub fn heap_radius(amount: u16) -> i32 {
    (amount as u32).isqrt().max(1) as i32
}

impl Sugar {
    pub fn new<R: Rng>(id: u16, amount: u16, playground: &Playground, rng: &mut R) -> Self {
        let mut coordinate = playground.random_coordinate(rng, heap_radius(amount));
        coordinate.set_direction(0);
        Self {
            id,
            coordinate,
            amount,
            inserted: false,
            recorded_amount: Tracked::default(),
            recorded_radius: Tracked::default(),
        }
    }

    /// Removes up to `wanted` units and returns how many were taken.
    pub fn take(&mut self, wanted: u16) -> u16 {
        let taken = wanted.min(self.amount);
        self.amount -= taken;
        self.coordinate
            .set_radius(UnitScale::PLAYGROUND.to_internal(heap_radius(self.amount)));
        taken
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }

    pub fn is_inserted(&self) -> bool {
        self.inserted
    }

    pub fn inserted(&mut self) {
        self.inserted = true;
    }

    pub fn take_update(&mut self) -> SugarUpdate {
        let mut update = SugarUpdate::new();
        if let Some(amount) = self.recorded_amount.diff(self.amount) {
            update.set_amount(amount);
        }
        let radius = self.coordinate.radius_steps().clamp(0, u16::MAX as i32) as u16;
        if let Some(radius) = self.recorded_radius.diff(radius) {
            update.set_radius(radius);
        }
        update
    }
}

impl HasCoordinate for Sugar {
    fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }
}

use super::{ChangeSet, EntityKind, EntityUpdate, Field, WireType};
use crate::cursor::{Deserializer, Serializer};
use crate::error::DecodeResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SugarField {
    Amount = 0,
    Radius = 1,
}

impl Field for SugarField {
    const KIND: EntityKind = EntityKind::Sugar;
    const ALL: &'static [Self] = &[SugarField::Amount, SugarField::Radius];

    fn bit(self) -> u32 {
        self as u32
    }

    fn wire_type(self) -> WireType {
        WireType::U16
    }
}

/// Per-tick changes of a sugar heap. Both fields are absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SugarUpdate {
    changes: ChangeSet<SugarField>,
    amount: u16,
    radius: u16,
}

impl SugarUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_changed(&self, field: SugarField) -> bool {
        self.changes.has_changed(field)
    }

    pub fn set_amount(&mut self, amount: u16) {
        self.amount = amount;
        self.changes.mark_changed(SugarField::Amount);
    }

    /// Radius in playground steps.
    pub fn set_radius(&mut self, radius: u16) {
        self.radius = radius;
        self.changes.mark_changed(SugarField::Radius);
    }

    pub fn amount(&self) -> u16 {
        self.amount
    }

    pub fn radius(&self) -> u16 {
        self.radius
    }
}

impl EntityUpdate for SugarUpdate {
    type Field = SugarField;

    fn changes(&self) -> &ChangeSet<SugarField> {
        &self.changes
    }

    fn serialize(&self, serializer: &mut Serializer) {
        self.changes.serialize(serializer);
        if self.has_changed(SugarField::Amount) {
            serializer.write_u16(self.amount);
        }
        if self.has_changed(SugarField::Radius) {
            serializer.write_u16(self.radius);
        }
    }

    fn deserialize(deserializer: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let mut update = SugarUpdate {
            changes: ChangeSet::deserialize(deserializer)?,
            ..Default::default()
        };
        if update.has_changed(SugarField::Amount) {
            update.amount = deserializer.read_u16()?;
        }
        if update.has_changed(SugarField::Radius) {
            update.radius = deserializer.read_u16()?;
        }
        Ok(update)
    }
}

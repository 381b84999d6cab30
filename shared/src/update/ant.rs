use super::{ChangeSet, EntityKind, EntityUpdate, Field, WireType};
use crate::cursor::{Deserializer, Serializer};
use crate::error::{DecodeError, DecodeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AntField {
    PositionX = 0,
    PositionY = 1,
    Direction = 2,
    Vitality = 3,
    Load = 4,
    LoadType = 5,
    TargetType = 6,
    TargetX = 7,
    TargetY = 8,
    ViewRange = 9,
}

impl Field for AntField {
    const KIND: EntityKind = EntityKind::Ant;
    const ALL: &'static [Self] = &[
        AntField::PositionX,
        AntField::PositionY,
        AntField::Direction,
        AntField::Vitality,
        AntField::Load,
        AntField::LoadType,
        AntField::TargetType,
        AntField::TargetX,
        AntField::TargetY,
        AntField::ViewRange,
    ];

    fn bit(self) -> u32 {
        self as u32
    }

    fn wire_type(self) -> WireType {
        match self {
            AntField::PositionX | AntField::PositionY => WireType::I8,
            AntField::Direction => WireType::I16,
            AntField::Load | AntField::LoadType | AntField::TargetType => WireType::U8,
            AntField::Vitality | AntField::TargetX | AntField::TargetY | AntField::ViewRange => {
                WireType::U16
            }
        }
    }
}

/// What an ant is carrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum LoadType {
    #[default]
    None = 0,
    Sugar = 1,
}

impl TryFrom<u8> for LoadType {
    type Error = DecodeError;

    fn try_from(value: u8) -> DecodeResult<Self> {
        match value {
            0 => Ok(LoadType::None),
            1 => Ok(LoadType::Sugar),
            other => Err(DecodeError::InvalidValue {
                field: "load type",
                value: other as u32,
            }),
        }
    }
}

/// What an ant is heading for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TargetType {
    #[default]
    None = 0,
    Sugar = 1,
    Nest = 2,
    Bug = 3,
}

impl TryFrom<u8> for TargetType {
    type Error = DecodeError;

    fn try_from(value: u8) -> DecodeResult<Self> {
        match value {
            0 => Ok(TargetType::None),
            1 => Ok(TargetType::Sugar),
            2 => Ok(TargetType::Nest),
            3 => Ok(TargetType::Bug),
            other => Err(DecodeError::InvalidValue {
                field: "target type",
                value: other as u32,
            }),
        }
    }
}

/// Per-tick changes of an ant. Ten fields, so the change set takes two bytes.
///
/// Position and direction are deltas; everything else is absolute.
/// Target coordinates and view range are in playground steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AntUpdate {
    changes: ChangeSet<AntField>,
    delta_x: i8,
    delta_y: i8,
    delta_direction: i16,
    vitality: u16,
    load: u8,
    load_type: LoadType,
    target_type: TargetType,
    target_x: u16,
    target_y: u16,
    view_range: u16,
}

impl AntUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn change(&mut self, field: AntField) {
        self.changes.mark_changed(field);
    }

    pub fn has_changed(&self, field: AntField) -> bool {
        self.changes.has_changed(field)
    }

    pub fn set_delta_x(&mut self, delta: i8) {
        self.delta_x = delta;
        self.change(AntField::PositionX);
    }

    pub fn set_delta_y(&mut self, delta: i8) {
        self.delta_y = delta;
        self.change(AntField::PositionY);
    }

    pub fn set_delta_direction(&mut self, delta: i16) {
        self.delta_direction = delta;
        self.change(AntField::Direction);
    }

    pub fn set_vitality(&mut self, vitality: u16) {
        self.vitality = vitality;
        self.change(AntField::Vitality);
    }

    pub fn set_load(&mut self, load: u8) {
        self.load = load;
        self.change(AntField::Load);
    }

    pub fn set_load_type(&mut self, load_type: LoadType) {
        self.load_type = load_type;
        self.change(AntField::LoadType);
    }

    pub fn set_target_type(&mut self, target_type: TargetType) {
        self.target_type = target_type;
        self.change(AntField::TargetType);
    }

    pub fn set_target_x(&mut self, x: u16) {
        self.target_x = x;
        self.change(AntField::TargetX);
    }

    pub fn set_target_y(&mut self, y: u16) {
        self.target_y = y;
        self.change(AntField::TargetY);
    }

    pub fn set_view_range(&mut self, range: u16) {
        self.view_range = range;
        self.change(AntField::ViewRange);
    }

    pub fn delta_x(&self) -> i8 {
        self.delta_x
    }

    pub fn delta_y(&self) -> i8 {
        self.delta_y
    }

    pub fn delta_direction(&self) -> i16 {
        self.delta_direction
    }

    pub fn vitality(&self) -> u16 {
        self.vitality
    }

    pub fn load(&self) -> u8 {
        self.load
    }

    pub fn load_type(&self) -> LoadType {
        self.load_type
    }

    pub fn target_type(&self) -> TargetType {
        self.target_type
    }

    pub fn target_x(&self) -> u16 {
        self.target_x
    }

    pub fn target_y(&self) -> u16 {
        self.target_y
    }

    pub fn view_range(&self) -> u16 {
        self.view_range
    }
}

impl EntityUpdate for AntUpdate {
    type Field = AntField;

    fn changes(&self) -> &ChangeSet<AntField> {
        &self.changes
    }

    fn serialize(&self, serializer: &mut Serializer) {
        self.changes.serialize(serializer);
        for field in self.changes.iter() {
            match field {
                AntField::PositionX => serializer.write_i8(self.delta_x),
                AntField::PositionY => serializer.write_i8(self.delta_y),
                AntField::Direction => serializer.write_i16(self.delta_direction),
                AntField::Vitality => serializer.write_u16(self.vitality),
                AntField::Load => serializer.write_u8(self.load),
                AntField::LoadType => serializer.write_u8(self.load_type as u8),
                AntField::TargetType => serializer.write_u8(self.target_type as u8),
                AntField::TargetX => serializer.write_u16(self.target_x),
                AntField::TargetY => serializer.write_u16(self.target_y),
                AntField::ViewRange => serializer.write_u16(self.view_range),
            }
        }
    }

    fn deserialize(deserializer: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let changes = ChangeSet::deserialize(deserializer)?;
        let mut update = AntUpdate {
            changes,
            ..Default::default()
        };
        for field in changes.iter() {
            match field {
                AntField::PositionX => update.delta_x = deserializer.read_i8()?,
                AntField::PositionY => update.delta_y = deserializer.read_i8()?,
                AntField::Direction => update.delta_direction = deserializer.read_i16()?,
                AntField::Vitality => update.vitality = deserializer.read_u16()?,
                AntField::Load => update.load = deserializer.read_u8()?,
                AntField::LoadType => {
                    update.load_type = LoadType::try_from(deserializer.read_u8()?)?
                }
                AntField::TargetType => {
                    update.target_type = TargetType::try_from(deserializer.read_u8()?)?
                }
                AntField::TargetX => update.target_x = deserializer.read_u16()?,
                AntField::TargetY => update.target_y = deserializer.read_u16()?,
                AntField::ViewRange => update.view_range = deserializer.read_u16()?,
            }
        }
        Ok(update)
    }
}

use super::{ChangeSet, EntityKind, EntityUpdate, Field, WireType};
use crate::cursor::{Deserializer, Serializer};
use crate::error::DecodeResult;

/// Fields of a bug record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BugField {
    PositionX = 0,
    PositionY = 1,
    Direction = 2,
    Vitality = 3,
}

impl Field for BugField {
    const KIND: EntityKind = EntityKind::Bug;
    const ALL: &'static [Self] = &[
        BugField::PositionX,
        BugField::PositionY,
        BugField::Direction,
        BugField::Vitality,
    ];

    fn bit(self) -> u32 {
        self as u32
    }

    fn wire_type(self) -> WireType {
        match self {
            BugField::PositionX | BugField::PositionY => WireType::I8,
            BugField::Direction => WireType::I16,
            BugField::Vitality => WireType::U16,
        }
    }
}

/// Per-tick changes of a bug.
///
/// Block layout:
/// - change set (1 byte)
/// - `i8` position x, delta in steps
/// - `i8` position y, delta in steps
/// - `i16` direction, delta in degrees
/// - `u16` vitality, absolute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BugUpdate {
    changes: ChangeSet<BugField>,
    delta_x: i8,
    delta_y: i8,
    delta_direction: i16,
    vitality: u16,
}

impl BugUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a field without touching its value.
    pub fn change(&mut self, field: BugField) {
        self.changes.mark_changed(field);
    }

    pub fn has_changed(&self, field: BugField) -> bool {
        self.changes.has_changed(field)
    }

    pub fn set_delta_x(&mut self, delta: i8) {
        self.delta_x = delta;
        self.change(BugField::PositionX);
    }

    pub fn set_delta_y(&mut self, delta: i8) {
        self.delta_y = delta;
        self.change(BugField::PositionY);
    }

    pub fn set_delta_direction(&mut self, delta: i16) {
        self.delta_direction = delta;
        self.change(BugField::Direction);
    }

    pub fn set_vitality(&mut self, vitality: u16) {
        self.vitality = vitality;
        self.change(BugField::Vitality);
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
}

impl EntityUpdate for BugUpdate {
    type Field = BugField;

    fn changes(&self) -> &ChangeSet<BugField> {
        &self.changes
    }

    fn serialize(&self, serializer: &mut Serializer) {
        self.changes.serialize(serializer);
        if self.has_changed(BugField::PositionX) {
            serializer.write_i8(self.delta_x);
        }
        if self.has_changed(BugField::PositionY) {
            serializer.write_i8(self.delta_y);
        }
        if self.has_changed(BugField::Direction) {
            serializer.write_i16(self.delta_direction);
        }
        if self.has_changed(BugField::Vitality) {
            serializer.write_u16(self.vitality);
        }
    }

    fn deserialize(deserializer: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let mut update = BugUpdate {
            changes: ChangeSet::deserialize(deserializer)?,
            ..Default::default()
        };
        if update.has_changed(BugField::PositionX) {
            update.delta_x = deserializer.read_i8()?;
        }
        if update.has_changed(BugField::PositionY) {
            update.delta_y = deserializer.read_i8()?;
        }
        if update.has_changed(BugField::Direction) {
            update.delta_direction = deserializer.read_i16()?;
        }
        if update.has_changed(BugField::Vitality) {
            update.vitality = deserializer.read_u16()?;
        }
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use proptest::prelude::*;

    fn encode(update: &BugUpdate) -> Vec<u8> {
        let mut serializer = Serializer::new();
        update.serialize(&mut serializer);
        serializer.into_inner()
    }

    fn decode(bytes: &[u8]) -> DecodeResult<BugUpdate> {
        let mut deserializer = Deserializer::new(bytes);
        let update = BugUpdate::deserialize(&mut deserializer)?;
        assert!(deserializer.is_at_end(), "record left trailing bytes");
        Ok(update)
    }

    #[test]
    fn test_vitality_only_record() {
        let mut update = BugUpdate::new();
        update.set_vitality(500);

        let bytes = encode(&update);
        assert_eq!(bytes, vec![0b0000_1000, 0xF4, 0x01]);

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.vitality(), 500);
        assert_eq!(decoded.delta_x(), 0);
        assert_eq!(decoded.delta_y(), 0);
        assert_eq!(decoded.delta_direction(), 0);
        assert!(!decoded.has_changed(BugField::PositionX));
        assert_eq!(decoded, update);
    }

    #[test]
    fn test_empty_record_is_mask_only() {
        let update = BugUpdate::new();
        let bytes = encode(&update);
        assert_eq!(bytes, vec![0]);
        assert_eq!(decode(&bytes).unwrap(), BugUpdate::default());
    }

    #[test]
    fn test_full_record_layout() {
        let mut update = BugUpdate::new();
        update.set_delta_x(-3);
        update.set_delta_y(127);
        update.set_delta_direction(-180);
        update.set_vitality(u16::MAX);

        let bytes = encode(&update);
        assert_eq!(bytes, vec![0b0000_1111, 0xFD, 0x7F, 0x4C, 0xFF, 0xFF, 0xFF]);
        assert_eq!(bytes.len(), update.encoded_len());
        assert_eq!(decode(&bytes).unwrap(), update);
    }

    #[test]
    fn test_marked_field_keeps_its_value_slot() {
        let mut update = BugUpdate::new();
        update.change(BugField::Direction);
        let bytes = encode(&update);
        assert_eq!(bytes, vec![0b0000_0100, 0x00, 0x00]);
        assert_eq!(decode(&bytes).unwrap(), update);
    }

    #[test]
    fn test_every_subset_round_trips_with_exact_length() {
        for mask in 0u32..16 {
            let mut update = BugUpdate::new();
            if mask & 1 != 0 {
                update.set_delta_x(-7);
            }
            if mask & 2 != 0 {
                update.set_delta_y(9);
            }
            if mask & 4 != 0 {
                update.set_delta_direction(300);
            }
            if mask & 8 != 0 {
                update.set_vitality(1234);
            }
            let bytes = encode(&update);
            assert_eq!(bytes.len(), update.encoded_len(), "mask {mask:#06b}");
            assert_eq!(decode(&bytes).unwrap(), update, "mask {mask:#06b}");
        }
    }

    #[test]
    fn test_truncated_record_fails() {
        let mut update = BugUpdate::new();
        update.set_delta_direction(45);
        update.set_vitality(10);
        let bytes = encode(&update);
        assert!(matches!(
            decode(&bytes[..bytes.len() - 1]),
            Err(DecodeError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_unknown_bit_is_rejected() {
        assert!(matches!(
            decode(&[0b0001_0000]),
            Err(DecodeError::UnknownFields {
                kind: EntityKind::Bug,
                bits: 0b0001_0000,
            })
        ));
    }

    proptest! {
        #[test]
        fn proptest_any_bug_record_round_trips(
            mask in 0u32..16,
            delta_x in any::<i8>(),
            delta_y in any::<i8>(),
            delta_direction in any::<i16>(),
            vitality in any::<u16>(),
        ) {
            let mut update = BugUpdate::new();
            if mask & 1 != 0 {
                update.set_delta_x(delta_x);
            }
            if mask & 2 != 0 {
                update.set_delta_y(delta_y);
            }
            if mask & 4 != 0 {
                update.set_delta_direction(delta_direction);
            }
            if mask & 8 != 0 {
                update.set_vitality(vitality);
            }

            let bytes = encode(&update);
            prop_assert_eq!(bytes.len(), update.encoded_len());
            prop_assert_eq!(bytes[0] as u32, mask);

            let mut deserializer = Deserializer::new(&bytes);
            prop_assert_eq!(BugUpdate::deserialize(&mut deserializer), Ok(update));
            prop_assert!(deserializer.is_at_end());
        }
    }
}

//! # Entity updates
//!
//! One record per dirty entity per tick:
//!
//! ```text
//! ┌──────────────────────────┬──────────────────────────────────────────┐
//! │ change set               │ payload                                  │
//! │ ceil(fields / 8) bytes   │ each marked field, in bit order,         │
//! │ bit i = field i present  │ at its declared width and signedness     │
//! └──────────────────────────┴──────────────────────────────────────────┘
//! ```
//!
//! Records carry no lengths, so writer and reader must agree on every field
//! table. Tables are append-only: a new field takes the next free bit, and an
//! existing bit is never moved or resized.

mod ant;
mod bug;
mod sugar;

pub use ant::{AntField, AntUpdate, LoadType, TargetType};
pub use bug::{BugField, BugUpdate};
pub use sugar::{SugarField, SugarUpdate};

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::cursor::{Deserializer, Serializer};
use crate::error::{DecodeError, DecodeResult};

/// The kinds of entity that appear in a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum EntityKind {
    Bug = 1,
    Ant = 2,
    Sugar = 3,
}

impl TryFrom<u8> for EntityKind {
    type Error = DecodeError;

    fn try_from(value: u8) -> DecodeResult<Self> {
        match value {
            1 => Ok(EntityKind::Bug),
            2 => Ok(EntityKind::Ant),
            3 => Ok(EntityKind::Sugar),
            other => Err(DecodeError::UnknownKind(other)),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Bug => "bug",
            EntityKind::Ant => "ant",
            EntityKind::Sugar => "sugar",
        };
        f.write_str(name)
    }
}

/// Width and signedness of a field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    I8,
    U8,
    I16,
    U16,
}

impl WireType {
    /// Bytes the value occupies.
    pub const fn size(self) -> usize {
        match self {
            WireType::I8 | WireType::U8 => 1,
            WireType::I16 | WireType::U16 => 2,
        }
    }
}

/// The field table of one entity kind.
pub trait Field: Copy + Eq + Hash + fmt::Debug + 'static {
    const KIND: EntityKind;

    /// Every field, in bit order. Encoders and decoders walk this order.
    const ALL: &'static [Self];

    /// Bit position in the change set.
    fn bit(self) -> u32;

    fn wire_type(self) -> WireType;
}

/// The fields of one entity that changed this tick.
///
/// Stored in a `u32`, so a kind can declare at most 32 fields.
pub struct ChangeSet<F: Field> {
    flags: u32,
    _field: PhantomData<F>,
}

impl<F: Field> ChangeSet<F> {
    /// Bytes the change set occupies on the wire. Never less than one, so a
    /// record with no fields still has a mask to read.
    pub const MASK_WIDTH: usize = if F::ALL.is_empty() {
        1
    } else {
        F::ALL.len().div_ceil(8)
    };

    /// Fails the build for a kind with more fields than the `u32` holds.
    const FITS_IN_FLAGS: () = assert!(F::ALL.len() <= 32, "a change set holds at most 32 fields");

    /// Bits a valid mask may carry.
    const KNOWN_BITS: u32 = if F::ALL.len() >= 32 {
        u32::MAX
    } else {
        (1u32 << F::ALL.len()) - 1
    };

    pub const fn new() -> Self {
        let () = Self::FITS_IN_FLAGS;
        Self {
            flags: 0,
            _field: PhantomData,
        }
    }

    /// Builds a change set from raw bits, rejecting bits with no field.
    pub fn from_bits(bits: u32) -> DecodeResult<Self> {
        let () = Self::FITS_IN_FLAGS;
        if bits & !Self::KNOWN_BITS != 0 {
            return Err(DecodeError::UnknownFields {
                kind: F::KIND,
                bits: bits & !Self::KNOWN_BITS,
            });
        }
        Ok(Self {
            flags: bits,
            _field: PhantomData,
        })
    }

    /// Marks `field` as changed. Marking twice is the same as marking once.
    #[inline]
    pub fn mark_changed(&mut self, field: F) {
        self.flags |= 1 << field.bit();
    }

    #[inline]
    pub fn has_changed(&self, field: F) -> bool {
        self.flags & (1 << field.bit()) != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flags == 0
    }

    /// Number of changed fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.flags.count_ones() as usize
    }

    #[inline]
    pub fn bits(&self) -> u32 {
        self.flags
    }

    pub fn clear(&mut self) {
        self.flags = 0;
    }

    /// Changed fields in bit order.
    pub fn iter(&self) -> impl Iterator<Item = F> + '_ {
        F::ALL
            .iter()
            .copied()
            .filter(|field| self.has_changed(*field))
    }

    /// Size of the mask plus every marked field's payload.
    pub fn encoded_len(&self) -> usize {
        let payload: usize = self.iter().map(|field| field.wire_type().size()).sum();
        Self::MASK_WIDTH + payload
    }

    pub fn serialize(&self, serializer: &mut Serializer) {
        for byte in 0..Self::MASK_WIDTH {
            serializer.write_u8((self.flags >> (8 * byte)) as u8);
        }
    }

    /// Reads the mask. Must run before any field of the record is read.
    pub fn deserialize(deserializer: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let mut bits = 0u32;
        for byte in 0..Self::MASK_WIDTH {
            bits |= (deserializer.read_u8()? as u32) << (8 * byte);
        }
        Self::from_bits(bits)
    }
}

impl<F: Field> Default for ChangeSet<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Field> Clone for ChangeSet<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: Field> Copy for ChangeSet<F> {}

impl<F: Field> PartialEq for ChangeSet<F> {
    fn eq(&self, other: &Self) -> bool {
        self.flags == other.flags
    }
}

impl<F: Field> Eq for ChangeSet<F> {}

impl<F: Field> Hash for ChangeSet<F> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.flags.hash(state);
    }
}

impl<F: Field> fmt::Debug for ChangeSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A per-kind update record built on a [`ChangeSet`].
pub trait EntityUpdate: Sized {
    type Field: Field;

    fn changes(&self) -> &ChangeSet<Self::Field>;

    /// Writes the change set, then every marked field in bit order.
    fn serialize(&self, serializer: &mut Serializer);

    /// Reads the change set, then exactly the fields it marks.
    fn deserialize(deserializer: &mut Deserializer<'_>) -> DecodeResult<Self>;

    fn kind(&self) -> EntityKind {
        <Self::Field as Field>::KIND
    }

    fn is_empty(&self) -> bool {
        self.changes().is_empty()
    }

    fn encoded_len(&self) -> usize {
        self.changes().encoded_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Wide {
        F0,
        F1,
        F2,
        F3,
        F4,
        F5,
        F6,
        F7,
        F8,
    }

    impl Field for Wide {
        const KIND: EntityKind = EntityKind::Ant;
        const ALL: &'static [Self] = &[
            Wide::F0,
            Wide::F1,
            Wide::F2,
            Wide::F3,
            Wide::F4,
            Wide::F5,
            Wide::F6,
            Wide::F7,
            Wide::F8,
        ];

        fn bit(self) -> u32 {
            self as u32
        }

        fn wire_type(self) -> WireType {
            WireType::U8
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Bare {}

    impl Field for Bare {
        const KIND: EntityKind = EntityKind::Sugar;
        const ALL: &'static [Self] = &[];

        fn bit(self) -> u32 {
            match self {}
        }

        fn wire_type(self) -> WireType {
            match self {}
        }
    }

    #[test]
    fn test_kind_without_fields_keeps_one_mask_byte() {
        assert_eq!(ChangeSet::<Bare>::MASK_WIDTH, 1);

        let changes = ChangeSet::<Bare>::new();
        assert_eq!(changes.encoded_len(), 1);
        let mut serializer = Serializer::new();
        changes.serialize(&mut serializer);
        assert_eq!(serializer.as_slice(), &[0]);

        let decoded = ChangeSet::<Bare>::deserialize(&mut Deserializer::new(&[0])).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(
            ChangeSet::<Bare>::deserialize(&mut Deserializer::new(&[0b0000_0100])),
            Err(DecodeError::UnknownFields {
                kind: EntityKind::Sugar,
                bits: 0b0000_0100,
            })
        );
    }

    #[test]
    fn test_mask_width_grows_past_eight_fields() {
        assert_eq!(ChangeSet::<BugField>::MASK_WIDTH, 1);
        assert_eq!(ChangeSet::<SugarField>::MASK_WIDTH, 1);
        assert_eq!(ChangeSet::<Wide>::MASK_WIDTH, 2);
        assert_eq!(ChangeSet::<AntField>::MASK_WIDTH, 2);
    }

    #[test]
    fn test_mark_changed_is_idempotent() {
        let mut changes = ChangeSet::<Wide>::new();
        changes.mark_changed(Wide::F3);
        changes.mark_changed(Wide::F3);
        assert_eq!(changes.len(), 1);
        assert!(changes.has_changed(Wide::F3));
        assert!(!changes.has_changed(Wide::F2));
    }

    #[test]
    fn test_iter_follows_bit_order() {
        let mut changes = ChangeSet::<Wide>::new();
        changes.mark_changed(Wide::F8);
        changes.mark_changed(Wide::F1);
        changes.mark_changed(Wide::F4);
        assert_eq!(
            changes.iter().collect::<Vec<_>>(),
            vec![Wide::F1, Wide::F4, Wide::F8]
        );
    }

    #[test]
    fn test_two_byte_mask_round_trip() {
        let mut changes = ChangeSet::<Wide>::new();
        changes.mark_changed(Wide::F0);
        changes.mark_changed(Wide::F8);

        let mut serializer = Serializer::new();
        changes.serialize(&mut serializer);
        assert_eq!(serializer.as_slice(), &[0b0000_0001, 0b0000_0001]);

        let bytes = serializer.into_inner();
        let decoded = ChangeSet::<Wide>::deserialize(&mut Deserializer::new(&bytes)).unwrap();
        assert_eq!(decoded, changes);
    }

    #[test]
    fn test_unknown_bits_are_rejected() {
        let bytes = [0b0000_0001, 0b0000_0010];
        let result = ChangeSet::<Wide>::deserialize(&mut Deserializer::new(&bytes));
        assert_eq!(
            result,
            Err(DecodeError::UnknownFields {
                kind: EntityKind::Ant,
                bits: 1 << 9,
            })
        );
    }

    #[test]
    fn test_truncated_mask_fails() {
        let bytes = [0b0000_0001];
        assert!(matches!(
            ChangeSet::<Wide>::deserialize(&mut Deserializer::new(&bytes)),
            Err(DecodeError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_encoded_len_counts_marked_fields() {
        let mut changes = ChangeSet::<Wide>::new();
        assert_eq!(changes.encoded_len(), 2);
        changes.mark_changed(Wide::F5);
        changes.mark_changed(Wide::F6);
        assert_eq!(changes.encoded_len(), 4);
    }

    #[test]
    fn test_entity_kind_codes() {
        for kind in [EntityKind::Bug, EntityKind::Ant, EntityKind::Sugar] {
            assert_eq!(EntityKind::try_from(kind as u8), Ok(kind));
        }
        assert_eq!(EntityKind::try_from(0), Err(DecodeError::UnknownKind(0)));
        assert_eq!(EntityKind::Sugar.to_string(), "sugar");
    }

    fn assert_bits_ascend<F: Field>() {
        for (index, field) in F::ALL.iter().enumerate() {
            assert_eq!(field.bit(), index as u32, "{:?} is out of order", field);
        }
    }

    #[test]
    fn test_field_tables_are_dense_and_ordered() {
        assert_bits_ascend::<BugField>();
        assert_bits_ascend::<AntField>();
        assert_bits_ascend::<SugarField>();
    }
}

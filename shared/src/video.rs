//! # Video stream
//!
//! A recording is a header followed by one frame per recorded tick:
//!
//! ```text
//! "AVID" | version: u16
//! FrameStart(tick: u32)
//!   Insert(kind: u8, id: u16, x: i16, y: i16, radius: u16, direction: u16)
//!   Update(kind: u8, id: u16, <update record of kind>)
//!   Remove(kind: u8, id: u16)
//! FrameEnd
//! ...
//! ```
//!
//! Positions in `Insert` are playground steps. Every block starts with a
//! one-byte [`BlockType`] tag.

use std::collections::HashSet;
use std::fmt;
use std::io::Write;

use tracing::{debug, warn};

use crate::coordinate::Coordinate;
use crate::cursor::{Deserializer, Serializer};
use crate::error::{DecodeError, DecodeResult, VideoError};
use crate::update::{AntUpdate, BugUpdate, EntityKind, EntityUpdate, SugarUpdate};

pub const VIDEO_MAGIC: [u8; 4] = *b"AVID";
pub const VIDEO_VERSION: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockType {
    FrameStart = 0x01,
    FrameEnd = 0x02,
    Insert = 0x10,
    Update = 0x11,
    Remove = 0x12,
}

impl TryFrom<u8> for BlockType {
    type Error = DecodeError;

    fn try_from(value: u8) -> DecodeResult<Self> {
        match value {
            0x01 => Ok(BlockType::FrameStart),
            0x02 => Ok(BlockType::FrameEnd),
            0x10 => Ok(BlockType::Insert),
            0x11 => Ok(BlockType::Update),
            0x12 => Ok(BlockType::Remove),
            other => Err(DecodeError::UnknownBlock(other)),
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockType::FrameStart => "frame start",
            BlockType::FrameEnd => "frame end",
            BlockType::Insert => "insert",
            BlockType::Update => "update",
            BlockType::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// Initial pose of an entity, in playground steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityInsert {
    pub x: i16,
    pub y: i16,
    pub radius: u16,
    pub direction: u16,
}

impl EntityInsert {
    /// Truncates the coordinate to whole steps, saturating at the wire range.
    pub fn from_coordinate(coordinate: &Coordinate) -> Self {
        Self {
            x: coordinate.x_steps().clamp(i16::MIN as i32, i16::MAX as i32) as i16,
            y: coordinate.y_steps().clamp(i16::MIN as i32, i16::MAX as i32) as i16,
            radius: coordinate.radius_steps().min(u16::MAX as i32) as u16,
            direction: coordinate.direction() as u16,
        }
    }

    pub fn to_coordinate(&self) -> Coordinate {
        Coordinate::with_direction(
            self.x.into(),
            self.y.into(),
            self.radius.into(),
            self.direction.into(),
        )
    }

    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_i16(self.x);
        serializer.write_i16(self.y);
        serializer.write_u16(self.radius);
        serializer.write_u16(self.direction);
    }

    fn deserialize(deserializer: &mut Deserializer<'_>) -> DecodeResult<Self> {
        Ok(Self {
            x: deserializer.read_i16()?,
            y: deserializer.read_i16()?,
            radius: deserializer.read_u16()?,
            direction: deserializer.read_u16()?,
        })
    }
}

/// An update record of any kind, as read back from a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRecord {
    Bug(BugUpdate),
    Ant(AntUpdate),
    Sugar(SugarUpdate),
}

impl UpdateRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            UpdateRecord::Bug(_) => EntityKind::Bug,
            UpdateRecord::Ant(_) => EntityKind::Ant,
            UpdateRecord::Sugar(_) => EntityKind::Sugar,
        }
    }

    /// Reads the record layout that belongs to `kind`.
    pub fn deserialize(
        kind: EntityKind,
        deserializer: &mut Deserializer<'_>,
    ) -> DecodeResult<Self> {
        Ok(match kind {
            EntityKind::Bug => UpdateRecord::Bug(BugUpdate::deserialize(deserializer)?),
            EntityKind::Ant => UpdateRecord::Ant(AntUpdate::deserialize(deserializer)?),
            EntityKind::Sugar => UpdateRecord::Sugar(SugarUpdate::deserialize(deserializer)?),
        })
    }
}

/// One decoded block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    FrameStart { tick: u32 },
    FrameEnd,
    Insert {
        kind: EntityKind,
        id: u16,
        pose: EntityInsert,
    },
    Update { id: u16, record: UpdateRecord },
    Remove { kind: EntityKind, id: u16 },
}

impl Block {
    pub fn block_type(&self) -> BlockType {
        match self {
            Block::FrameStart { .. } => BlockType::FrameStart,
            Block::FrameEnd => BlockType::FrameEnd,
            Block::Insert { .. } => BlockType::Insert,
            Block::Update { .. } => BlockType::Update,
            Block::Remove { .. } => BlockType::Remove,
        }
    }
}

/// Records frames into a byte sink.
///
/// A frame is staged in memory and handed to the sink with a single
/// `write_all` on [`end_frame`](Self::end_frame), so a reader never sees a
/// half-written entity.
pub struct VideoWriter<W: Write> {
    sink: W,
    frame: Serializer,
    open_tick: Option<u32>,
    last_tick: Option<u32>,
    flushed: HashSet<(EntityKind, u16, BlockType)>,
    frames_written: u32,
}

impl<W: Write> VideoWriter<W> {
    /// Writes the stream header to `sink`.
    pub fn new(mut sink: W) -> Result<Self, VideoError> {
        let mut header = Serializer::with_capacity(6);
        header.write_bytes(&VIDEO_MAGIC);
        header.write_u16(VIDEO_VERSION);
        sink.write_all(header.as_slice())?;

        Ok(Self {
            sink,
            frame: Serializer::with_capacity(1024),
            open_tick: None,
            last_tick: None,
            flushed: HashSet::new(),
            frames_written: 0,
        })
    }

    /// Opens the frame for `tick`. Ticks must strictly increase.
    pub fn begin_frame(&mut self, tick: u32) -> Result<(), VideoError> {
        if let Some(open) = self.open_tick {
            return Err(VideoError::FrameAlreadyOpen(open));
        }
        if let Some(last) = self.last_tick {
            if tick <= last {
                return Err(VideoError::TickNotAdvancing { last, tick });
            }
        }

        self.frame.clear();
        self.flushed.clear();
        self.frame.write_u8(BlockType::FrameStart as u8);
        self.frame.write_u32(tick);
        self.open_tick = Some(tick);
        Ok(())
    }

    pub fn insert(
        &mut self,
        kind: EntityKind,
        id: u16,
        coordinate: &Coordinate,
    ) -> Result<(), VideoError> {
        self.claim(kind, id, BlockType::Insert)?;
        self.write_block_head(BlockType::Insert, kind, id);
        EntityInsert::from_coordinate(coordinate).serialize(&mut self.frame);
        Ok(())
    }

    /// Stages the update of entity `id`. Returns `false` when the update marks
    /// no field, in which case nothing is written.
    pub fn update<U: EntityUpdate>(&mut self, id: u16, update: &U) -> Result<bool, VideoError> {
        self.require_open_frame()?;
        if update.is_empty() {
            return Ok(false);
        }

        let kind = update.kind();
        self.claim(kind, id, BlockType::Update)?;
        self.write_block_head(BlockType::Update, kind, id);
        update.serialize(&mut self.frame);
        Ok(true)
    }

    pub fn remove(&mut self, kind: EntityKind, id: u16) -> Result<(), VideoError> {
        self.claim(kind, id, BlockType::Remove)?;
        self.write_block_head(BlockType::Remove, kind, id);
        Ok(())
    }

    /// Closes the open frame and writes it to the sink.
    ///
    /// If the sink fails, the frame stays open with its blocks staged, so the
    /// call can be retried.
    pub fn end_frame(&mut self) -> Result<(), VideoError> {
        let tick = self.require_open_frame()?;
        let staged = self.frame.len();
        self.frame.write_u8(BlockType::FrameEnd as u8);
        if let Err(error) = self.sink.write_all(self.frame.as_slice()) {
            self.frame.truncate(staged);
            warn!(tick, %error, "frame write failed");
            return Err(error.into());
        }

        debug!(
            tick,
            bytes = self.frame.len(),
            entities = self.flushed.len(),
            "frame written"
        );

        self.open_tick = None;
        self.last_tick = Some(tick);
        self.frames_written += 1;
        self.frame.clear();
        Ok(())
    }

    pub fn frames_written(&self) -> u32 {
        self.frames_written
    }

    pub fn flush(&mut self) -> Result<(), VideoError> {
        self.sink.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn require_open_frame(&self) -> Result<u32, VideoError> {
        self.open_tick.ok_or(VideoError::NoOpenFrame)
    }

    fn claim(&mut self, kind: EntityKind, id: u16, block: BlockType) -> Result<(), VideoError> {
        let tick = self.require_open_frame()?;
        if !self.flushed.insert((kind, id, block)) {
            warn!(tick, %kind, id, %block, "rejected second flush in one frame");
            return Err(VideoError::DuplicateFlush { kind, id, block });
        }
        Ok(())
    }

    fn write_block_head(&mut self, block: BlockType, kind: EntityKind, id: u16) {
        self.frame.write_u8(block as u8);
        self.frame.write_u8(kind as u8);
        self.frame.write_u16(id);
    }
}

/// Reads blocks back from a complete recording.
pub struct VideoReader<'a> {
    deserializer: Deserializer<'a>,
    version: u16,
    failed: bool,
}

impl<'a> VideoReader<'a> {
    /// Validates the stream header.
    pub fn new(bytes: &'a [u8]) -> DecodeResult<Self> {
        let mut deserializer = Deserializer::new(bytes);
        let magic = deserializer.read_array::<4>()?;
        if magic != VIDEO_MAGIC {
            return Err(DecodeError::BadMagic(magic));
        }
        let version = deserializer.read_u16()?;
        if version != VIDEO_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }

        Ok(Self {
            deserializer,
            version,
            failed: false,
        })
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    /// Offset of the next unread byte in the stream.
    pub fn position(&self) -> usize {
        self.deserializer.position()
    }

    /// Reads the next block, or `None` at the end of the stream.
    pub fn next_block(&mut self) -> DecodeResult<Option<Block>> {
        if self.deserializer.is_at_end() {
            return Ok(None);
        }

        let d = &mut self.deserializer;
        let block = match BlockType::try_from(d.read_u8()?)? {
            BlockType::FrameStart => Block::FrameStart {
                tick: d.read_u32()?,
            },
            BlockType::FrameEnd => Block::FrameEnd,
            BlockType::Insert => {
                let kind = EntityKind::try_from(d.read_u8()?)?;
                let id = d.read_u16()?;
                let pose = EntityInsert::deserialize(d)?;
                Block::Insert { kind, id, pose }
            }
            BlockType::Update => {
                let kind = EntityKind::try_from(d.read_u8()?)?;
                let id = d.read_u16()?;
                let record = UpdateRecord::deserialize(kind, d)?;
                Block::Update { id, record }
            }
            BlockType::Remove => {
                let kind = EntityKind::try_from(d.read_u8()?)?;
                let id = d.read_u16()?;
                Block::Remove { kind, id }
            }
        };
        Ok(Some(block))
    }
}

/// Yields blocks until the end of the stream or the first error.
impl Iterator for VideoReader<'_> {
    type Item = DecodeResult<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_block() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => None,
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }
}

//! Errors raised while writing or reading a video stream.

use thiserror::Error;

use crate::update::EntityKind;
use crate::video::BlockType;

/// A record or stream that cannot be decoded. Always fatal for the record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ended in the middle of a value.
    #[error("unexpected end of stream at byte {offset}: needed {needed} bytes, {remaining} left")]
    UnexpectedEnd {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// The change set has bits above the last field this build knows for the kind.
    #[error("{kind} change set carries unknown field bits {bits:#x}")]
    UnknownFields { kind: EntityKind, bits: u32 },

    /// A field holds a discriminant outside its enumeration.
    #[error("invalid {field} value {value}")]
    InvalidValue { field: &'static str, value: u32 },

    #[error("unknown block tag {0:#04x}")]
    UnknownBlock(u8),

    #[error("unknown entity kind {0:#04x}")]
    UnknownKind(u8),

    #[error("not a video stream (magic {0:?})")]
    BadMagic([u8; 4]),

    #[error("unsupported video format version {0}")]
    UnsupportedVersion(u16),
}

/// Result type for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors that can occur while recording a video.
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("failed to write video stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("no frame is open")]
    NoOpenFrame,

    #[error("frame for tick {0} is still open")]
    FrameAlreadyOpen(u32),

    #[error("tick {tick} does not advance past {last}")]
    TickNotAdvancing { last: u32, tick: u32 },

    /// The same entity was flushed twice in one frame.
    #[error("{kind} {id} already has a {block} block in this frame")]
    DuplicateFlush {
        kind: EntityKind,
        id: u16,
        block: BlockType,
    },
}

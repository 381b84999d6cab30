pub mod coordinate;
pub mod cursor;
pub mod error;
pub mod unit;
pub mod update;
pub mod util;
pub mod video;

pub use coordinate::{Coordinate, HasCoordinate};
pub use error::{DecodeError, DecodeResult, VideoError};
pub use unit::{UnitScale, PLAYGROUND_UNIT};
pub use update::{ChangeSet, EntityKind, EntityUpdate, Field};
pub use video::{Block, VideoReader, VideoWriter};

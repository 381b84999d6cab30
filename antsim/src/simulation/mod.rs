pub mod ant;
pub mod bug;
mod ids;
mod playground;
mod shadow;
mod sim;
pub mod sugar;
mod timer;

// Re-export key types for easier imports
pub use ids::IdPool;
pub use playground::Playground;
pub use shadow::{PoseShadow, Tracked};
pub use sim::Simulation;
pub use timer::Timer;

// Nest constants (steps)
pub const NEST_RADIUS: i32 = 12;

// Bug behavior constants. Speeds are internal units per tick, radii are steps.
pub const BUG_RADIUS: i32 = 4;
pub const BUG_SPEED: i32 = 48;
pub const BUG_MAX_VITALITY: u16 = 1000;
pub const BUG_REGENERATION: u16 = 1; // Vitality regained per tick
pub const BUG_BITE_DAMAGE: u16 = 30;
pub const BUG_TURN_INTERVAL: u32 = 25; // How often a bug picks a new heading (ticks)
pub const BUG_MAX_TURN: i32 = 60;
pub const BUG_RESPAWN_INTERVAL: u32 = 50;

// Ant behavior constants
pub const ANT_RADIUS: i32 = 2;
pub const ANT_SPEED: i32 = 64;
pub const ANT_MAX_VITALITY: u16 = 100;
pub const ANT_BITE_DAMAGE: u16 = 10;
pub const ANT_VIEW_RANGE: i32 = 80; // in steps
pub const ANT_MAX_LOAD: u8 = 5;
pub const ANT_WANDER_TURN: i32 = 15; // Max random turn per tick while searching
pub const ANT_RESPAWN_INTERVAL: u32 = 10;

// Sugar constants
pub const SUGAR_AMOUNT: u16 = 250;
pub const SUGAR_RESPAWN_INTERVAL: u32 = 100;

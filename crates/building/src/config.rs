pub const DEFAULT_GRID_WIDTH: u32 = 64;
pub const DEFAULT_GRID_LENGTH: u32 = 64;
pub const DEFAULT_CELL_SIZE: f32 = 2.0;
pub const DEFAULT_LAYER_COUNT: u32 = 2;

/// Vertical distance between two stacked grid layers in world units.
pub const DEFAULT_LAYER_HEIGHT: f32 = 3.0;

/// Delay in seconds between two batches of a drag placement sequence.
pub const DEFAULT_PLACEMENT_INTERVAL: f32 = 0.05;
pub const DEFAULT_BATCH_SIZE: u32 = 1;

/// Maximum number of commands kept in the undo stack.
pub const MAX_HISTORY: usize = 100;

pub const DEFAULT_SEED: u64 = 42;


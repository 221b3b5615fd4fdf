// src/generator/mod.rs
pub mod loader;
pub mod placement;

pub use loader::{load_tile_set, TileRole, TileSet};
pub use placement::{GenerationReport, LevelGenerator, Occupancy};

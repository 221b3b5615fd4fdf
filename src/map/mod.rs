// src/map/mod.rs
pub mod direction;
pub mod door;
pub mod mend;
pub mod navmesh;
pub mod portal;
pub mod tile;

#[cfg(test)]
pub(crate) mod fixtures;

pub use direction::Direction;
pub use door::{Connection, Door, DoorId, DoorRegistry};
pub use mend::CloseSummary;
pub use navmesh::navmesh_script;
pub use portal::Alignment;
pub use tile::Tile;

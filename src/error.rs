// src/error.rs

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::map::Direction;
use crate::utils::geometry::Bounds;

/// Every fatal condition the generator can run into.
///
/// Recoverable search failures (no connection, collision, unattached finale)
/// are not errors; callers see them as `Ok(false)` or `None`.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("VMF parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("{0} contains no brush geometry")]
    EmptyTile(String),

    #[error("a portal solid in {0} has no numeric id")]
    MissingSolidId(String),

    #[error("unknown direction \"{0}\"")]
    UnknownDirection(String),

    #[error("invalid portal plane {portal}: {reason} (tile bounds {tile})")]
    InvalidPortal {
        portal: Bounds,
        tile: Bounds,
        reason: &'static str,
    },

    #[error("door {id} is not registered under {direction}")]
    MissingDoor { direction: Direction, id: u64 },

    #[error("solid {0} does not carry a portal (no side textured with the marker material)")]
    MissingPortal(u64),

    #[error("portals of solids {own} and {other} differ in size ({own_size} vs {other_size})")]
    PortalSizeMismatch {
        own: u64,
        other: u64,
        own_size: String,
        other_size: String,
    },

    #[error("no {0} tiles found")]
    EmptyTileSet(&'static str),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl GenError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;

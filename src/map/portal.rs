// src/map/portal.rs
// Finding the marked faces of portal solids and deciding which way they face.

use crate::document::Node;
use crate::error::{GenError, Result};
use crate::map::door::DoorId;
use crate::map::Direction;
use crate::utils::geometry::{Bounds, Vec3};

/// The material that marks a portal face.
pub const PORTAL_MATERIAL: &str = "DEV/DEV_BLENDMEASURE";

pub fn is_portal_side(side: &Node) -> bool {
    side.name == "side"
        && side
            .get("material")
            .is_some_and(|m| m.eq_ignore_ascii_case(PORTAL_MATERIAL))
}

/// Bounds of the first marked side of `solid`, if any.
pub fn find_portal_on_solid(solid: &Node) -> Option<Bounds> {
    let side = solid.children.iter().find(|child| is_portal_side(child))?;
    let points = side.plane_points()?;
    Bounds::from_points(points.iter())
}

/// Decides which side of the tile a (planar) portal sits on.
pub fn portal_direction(portal: &Bounds, tile: &Bounds) -> Result<Direction> {
    let size = portal.size();
    let flat: Vec<usize> = (0..3).filter(|&axis| size.axis(axis) == 0.0).collect();
    let invalid = |reason| GenError::InvalidPortal {
        portal: *portal,
        tile: *tile,
        reason,
    };

    let axis = match flat.as_slice() {
        [axis] => *axis,
        [] => return Err(invalid("portal is not planar")),
        _ => return Err(invalid("portal is flat on more than one axis")),
    };
    let (positive, negative) = match axis {
        0 => (Direction::East, Direction::West),
        1 => (Direction::North, Direction::South),
        _ => (Direction::Up, Direction::Down),
    };

    let position = portal.min.axis(axis);
    if position == tile.max.axis(axis) {
        Ok(positive)
    } else if position == tile.min.axis(axis) {
        Ok(negative)
    } else {
        Err(invalid("portal lies on neither bound of the tile"))
    }
}

/// The portal's width along the horizontal axis of its plane.
pub fn portal_span(portal: &Bounds, direction: Direction) -> f64 {
    portal.size().axis(direction.span_axis()).abs()
}

/// Everything a merge needs besides the connection itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    /// Moves the other tile so its portal lands on ours.
    pub vector: Vec3,
    pub own_portal: Bounds,
    pub other_portal: Bounds,
}

impl Alignment {
    /// Aligns `other_portal` onto `own_portal`. Both must have identical size.
    pub fn between(
        own: DoorId,
        own_portal: Bounds,
        other: DoorId,
        other_portal: Bounds,
    ) -> Result<Alignment> {
        let own_size = own_portal.size();
        let other_size = other_portal.size();
        if own_size != other_size {
            return Err(GenError::PortalSizeMismatch {
                own,
                other,
                own_size: own_size.to_string(),
                other_size: other_size.to_string(),
            });
        }
        Ok(Alignment {
            vector: own_portal.min - other_portal.min,
            own_portal,
            other_portal,
        })
    }
}

// src/map/mend.rs
// Fusing tiles together through a pair of portals.

use log::{debug, info, warn};

use crate::document::Node;
use crate::error::{GenError, Result};
use crate::map::door::{Connection, DoorId};
use crate::map::portal::{is_portal_side, Alignment};
use crate::map::{Direction, Tile};
use crate::utils::geometry::{near_plane, Bounds};

pub const PLAYER_START_CLASS: &str = "info_player_start";
pub const HINGED_DOOR_CLASS: &str = "prop_door_rotating";
pub const DETAIL_CLASS: &str = "func_detail";

/// What [`Tile::close`] did to the level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloseSummary {
    pub loops_closed: usize,
    pub doors_removed: usize,
    pub portals_sealed: usize,
}

fn is_entity_near(node: &Node, classname: &str, portal: &Bounds) -> bool {
    node.name == "entity"
        && node.has_classname(classname)
        && node.origin().is_some_and(|origin| near_plane(&origin, portal))
}

impl Tile {
    /// Clones `other` and mends the copy into this tile; pool tiles stay untouched.
    pub fn append(&mut self, other: &Tile, connection: &Connection, alignment: &Alignment) -> Result<()> {
        self.mend(other.clone(), connection, alignment)
    }

    /// Merges `other` into this tile through `connection`.
    ///
    /// Consumes exactly one door on each side. Every other open door of
    /// `other` survives, re-keyed past this tile's ids.
    pub fn mend(&mut self, mut other: Tile, connection: &Connection, alignment: &Alignment) -> Result<()> {
        let Connection { direction, own, other: other_id } = *connection;
        self.check_door(direction, own)?;
        other.check_door(direction.opposite(), other_id)?;

        let removed = other
            .document_mut()
            .root
            .delete_recurse(|n| n.name == "entity" && n.has_classname(PLAYER_START_CLASS));
        debug!("Removed {} {} from {}", removed, PLAYER_START_CLASS, other.source());
        let removed = other
            .document_mut()
            .root
            .delete_recurse(|n| is_entity_near(n, HINGED_DOOR_CLASS, &alignment.other_portal));
        debug!("Removed {} doors from {}", removed, other.source());

        let removed = other.document_mut().remove_solid(other_id);
        debug!("Removed {} portal solids from {}", removed, other.source());
        other.doors_mut().consume(direction.opposite(), other_id)?;

        self.open_portal(direction, own, &alignment.own_portal)?;

        let offset = self.document().max_id();
        other.document_mut().increase_ids(offset);
        debug!("Increased ids in {} by {}", other.source(), offset);

        debug!("Translating {} by ({})", other.source(), alignment.vector);
        other.translate(alignment.vector);

        let merged_bounds = self.bounds().union(&other.bounds());
        self.set_bounds(merged_bounds);
        let source = other.source().to_string();
        let (document, doors) = other.into_parts();
        self.document_mut().absorb(document);
        self.doors_mut().absorb(doors, offset);
        info!("Merged {} through {} door {}", source, direction, own);
        Ok(())
    }

    /// Closes a cycle by joining two open doors of this very tile.
    ///
    /// Nothing moves and no ids change: both portal solids go away and both
    /// registry entries are consumed.
    pub fn mend_loop(&mut self, connection: &Connection, alignment: &Alignment) -> Result<()> {
        let Connection { direction, own, other } = *connection;
        self.check_door(direction, own)?;
        self.check_door(direction.opposite(), other)?;

        let removed = self.document_mut().remove_solid(other);
        debug!("Removed {} portal solids closing a loop", removed);
        self.doors_mut().consume(direction.opposite(), other)?;
        self.open_portal(direction, own, &alignment.own_portal)?;
        info!("Closed loop between doors {} and {}", own, other);
        Ok(())
    }

    /// Joins every pair of open doors that already coincide.
    ///
    /// A door whose portal exactly overlaps more than one opposite portal is
    /// joined with the lowest id among them. Returns the number of joins.
    pub fn close_loops(&mut self) -> Result<usize> {
        info!("Detecting loops...");
        let snapshot: Vec<(Direction, DoorId)> =
            self.doors().iter().map(|d| (d.direction, d.id)).collect();

        let mut closed = 0;
        for (direction, id) in snapshot {
            if !self.doors().contains(direction, id) {
                continue;
            }
            let portal = self.portal_bounds(id)?;
            let mut candidates = Vec::new();
            for door in self.doors().doors(direction.opposite()) {
                if door.id != id && self.portal_bounds(door.id)? == portal {
                    candidates.push(door.id);
                }
            }
            let Some(&other) = candidates.iter().min() else {
                continue;
            };
            if candidates.len() > 1 {
                warn!(
                    "Door {} coincides with {} opposite doors {:?}; joining {}",
                    id,
                    candidates.len(),
                    candidates,
                    other
                );
            }
            let connection = Connection::new(direction, id, other);
            let alignment = Alignment::between(id, portal, other, portal)?;
            self.mend_loop(&connection, &alignment)?;
            closed += 1;
        }
        Ok(closed)
    }

    /// Makes the level compilable: closes loops, then shuts every door that
    /// is still open and replaces its portal marker with `seal_material`.
    pub fn close(&mut self, seal_material: &str) -> Result<CloseSummary> {
        let loops_closed = self.close_loops()?;

        let mut doors_removed = 0;
        let mut portals_sealed = 0;
        let open: Vec<DoorId> = self.doors().iter().map(|d| d.id).collect();
        for id in open {
            let portal = self.portal_bounds(id)?;
            doors_removed += self
                .document_mut()
                .root
                .delete_recurse(|n| is_entity_near(n, HINGED_DOOR_CLASS, &portal));
            let is_door_solid = |n: &Node| n.is_solid() && n.id() == Some(id);
            self.document_mut()
                .root
                .for_each_matching_mut(&is_door_solid, &mut |solid: &mut Node| {
                    for side in solid.children.iter_mut().filter(|s| is_portal_side(s)) {
                        side.set("material", seal_material);
                        portals_sealed += 1;
                    }
                });
        }
        self.doors_mut().clear();
        info!(
            "Removed {} doors and sealed {} portals to close the map",
            doors_removed, portals_sealed
        );
        Ok(CloseSummary {
            loops_closed,
            doors_removed,
            portals_sealed,
        })
    }

    /// Removes our half of a joined portal: editor annotations of nearby
    /// entities, the portal solid and its registry entry.
    fn open_portal(&mut self, direction: Direction, id: DoorId, portal: &Bounds) -> Result<()> {
        let mut stripped = 0;
        let is_nearby_entity = |n: &Node| {
            n.name == "entity"
                && !n.has_classname(DETAIL_CLASS)
                && n.origin().is_some_and(|origin| near_plane(&origin, portal))
        };
        self.document_mut()
            .root
            .for_each_matching_mut(&is_nearby_entity, &mut |entity: &mut Node| {
                stripped += entity.delete_recurse(|n| n.name == "editor");
            });
        debug!("Removed {} editor blocks near door {}", stripped, id);

        let removed = self.document_mut().remove_solid(id);
        debug!("Removed {} portal solids from base", removed);
        self.doors_mut().consume(direction, id)?;
        Ok(())
    }

    fn check_door(&self, direction: Direction, id: DoorId) -> Result<()> {
        if self.doors().contains(direction, id) {
            Ok(())
        } else {
            Err(GenError::MissingDoor { direction, id })
        }
    }
}

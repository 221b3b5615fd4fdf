// src/map/tile.rs

use std::path::Path;

use log::{debug, info};

use crate::document::Document;
use crate::error::{GenError, Result};
use crate::map::door::{Connection, DoorId, DoorRegistry};
use crate::map::portal::{self, Alignment};
use crate::utils::geometry::{Bounds, Vec3};

/// A prefabricated piece of level plus what we know about its portals.
#[derive(Debug, Clone)]
pub struct Tile {
    document: Document,
    bounds: Bounds,
    doors: DoorRegistry,
    source: String,
    once: bool,
}

impl Tile {
    /// Wraps a parsed document and catalogs its portals.
    pub fn from_document(document: Document, source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let Some(bounds) = document.bounds() else {
            return Err(GenError::EmptyTile(source));
        };
        let mut tile = Tile {
            document,
            bounds,
            doors: DoorRegistry::new(),
            source,
            once: false,
        };
        tile.analyze_portals()?;
        Ok(tile)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let document = Document::from_file(path)?;
        let source = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self::from_document(document, source)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub(crate) fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub(crate) fn into_parts(self) -> (Document, DoorRegistry) {
        (self.document, self.doors)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn doors(&self) -> &DoorRegistry {
        &self.doors
    }

    pub(crate) fn doors_mut(&mut self) -> &mut DoorRegistry {
        &mut self.doors
    }

    pub(crate) fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_once(&self) -> bool {
        self.once
    }

    pub fn set_once(&mut self, once: bool) {
        self.once = once;
    }

    pub fn translate(&mut self, vector: Vec3) {
        self.document.translate(vector);
        self.bounds = self.bounds.translate(vector);
    }

    /// Rebuilds the door registry from the portal solids in the document.
    pub fn analyze_portals(&mut self) -> Result<()> {
        let mut doors = DoorRegistry::new();
        for solid in self.document.solids() {
            let Some(portal) = portal::find_portal_on_solid(solid) else {
                continue;
            };
            let id = solid
                .id()
                .ok_or_else(|| GenError::MissingSolidId(self.source.clone()))?;
            let direction = portal::portal_direction(&portal, &self.bounds)?;
            doors.insert(direction, id, portal::portal_span(&portal, direction));
        }
        debug!("{}: {} open doors", self.source, doors.len());
        self.doors = doors;
        Ok(())
    }

    /// Bounds of the portal carried by solid `id`.
    pub fn portal_bounds(&self, id: DoorId) -> Result<Bounds> {
        self.document
            .find_solid(id)
            .and_then(portal::find_portal_on_solid)
            .ok_or(GenError::MissingPortal(id))
    }

    /// Every way `other` could be attached to this tile.
    ///
    /// With a `tail_length`, only that many of our doors (highest ids first)
    /// are considered, which keeps growth near the newest part of the level.
    pub fn find_connections(&self, other: &Tile, tail_length: Option<usize>) -> Vec<Connection> {
        let tail;
        let own = match tail_length {
            Some(length) => {
                tail = self.doors.restrict_to_tail(length);
                &tail
            }
            None => &self.doors,
        };

        let mut connections = Vec::new();
        for door in own.iter() {
            for other_door in other.doors.doors(door.direction.opposite()) {
                if door.span == other_door.span {
                    let connection = Connection::new(door.direction, door.id, other_door.id);
                    debug!("Adding connection {:?}", connection);
                    connections.push(connection);
                }
            }
        }
        info!("Total: {} connections to {}", connections.len(), other.source);
        connections
    }

    /// Portals and translation for joining `other` through `connection`.
    pub fn portals_and_vector(&self, other: &Tile, connection: &Connection) -> Result<Alignment> {
        let own_portal = self.portal_bounds(connection.own)?;
        let other_portal = other.portal_bounds(connection.other)?;
        Alignment::between(connection.own, own_portal, connection.other, other_portal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::fixtures::room_tile;
    use crate::map::Direction;

    fn origin_room(doors: &[(u64, Direction, f64)]) -> Tile {
        room_tile("room.vmf", Vec3::ZERO, Vec3::new(256.0, 256.0, 128.0), doors)
    }

    #[test]
    fn test_analyze_portals() {
        let tile = origin_room(&[
            (10, Direction::East, 128.0),
            (11, Direction::North, 64.0),
            (12, Direction::Down, 32.0),
        ]);
        assert_eq!(tile.bounds(), Bounds::new(Vec3::ZERO, Vec3::new(256.0, 256.0, 128.0)));
        assert_eq!(tile.doors().len(), 3);
        assert!(tile.doors().contains(Direction::East, 10));
        assert!(tile.doors().contains(Direction::North, 11));
        assert!(tile.doors().contains(Direction::Down, 12));
        assert_eq!(tile.doors().get(10).map(|d| d.span), Some(128.0));
        assert_eq!(tile.doors().get(12).map(|d| d.span), Some(32.0));
    }

    #[test]
    fn test_single_matching_connection() {
        let a = origin_room(&[(1, Direction::North, 4.0)]);
        let b = origin_room(&[(2, Direction::South, 4.0)]);
        assert_eq!(
            a.find_connections(&b, None),
            vec![Connection::new(Direction::North, 1, 2)]
        );
    }

    #[test]
    fn test_spans_must_match() {
        let a = origin_room(&[(1, Direction::East, 3.0)]);
        let b = origin_room(&[(2, Direction::West, 4.0)]);
        assert!(a.find_connections(&b, None).is_empty());
    }

    #[test]
    fn test_all_pairs_in_discovery_order() {
        let a = origin_room(&[(4, Direction::East, 64.0), (5, Direction::East, 64.0), (6, Direction::North, 64.0)]);
        let b = origin_room(&[(7, Direction::West, 64.0), (8, Direction::West, 128.0), (9, Direction::West, 64.0)]);
        let connections = a.find_connections(&b, None);
        assert_eq!(
            connections,
            vec![
                Connection::new(Direction::East, 4, 7),
                Connection::new(Direction::East, 4, 9),
                Connection::new(Direction::East, 5, 7),
                Connection::new(Direction::East, 5, 9),
            ]
        );
        for connection in connections {
            assert_eq!(
                a.doors().get(connection.own).map(|d| d.span),
                b.doors().get(connection.other).map(|d| d.span)
            );
        }
    }

    #[test]
    fn test_tail_restricts_candidates() {
        let a = origin_room(&[(5, Direction::North, 4.0), (9, Direction::East, 4.0)]);
        let b = origin_room(&[(20, Direction::South, 4.0), (21, Direction::West, 4.0)]);
        assert_eq!(a.find_connections(&b, None).len(), 2);
        assert_eq!(
            a.find_connections(&b, Some(1)),
            vec![Connection::new(Direction::East, 9, 21)]
        );
    }

    #[test]
    fn test_portals_and_vector() {
        let a = origin_room(&[(10, Direction::East, 128.0)]);
        let b = origin_room(&[(20, Direction::West, 128.0)]);
        let connection = Connection::new(Direction::East, 10, 20);
        let alignment = a.portals_and_vector(&b, &connection).unwrap();
        assert_eq!(alignment.vector, Vec3::new(256.0, 0.0, 0.0));

        let missing = Connection::new(Direction::East, 10, 99);
        assert!(matches!(
            a.portals_and_vector(&b, &missing),
            Err(GenError::MissingPortal(99))
        ));
    }

    #[test]
    fn test_translate_moves_bounds_and_document() {
        let mut tile = origin_room(&[(10, Direction::East, 128.0)]);
        tile.translate(Vec3::new(0.0, -256.0, 0.0));
        let expected = Bounds::new(Vec3::new(0.0, -256.0, 0.0), Vec3::new(256.0, 0.0, 128.0));
        assert_eq!(tile.bounds(), expected);
        assert_eq!(tile.document().bounds(), Some(expected));
    }

    #[test]
    fn test_unclassifiable_portal_is_fatal() {
        use crate::map::fixtures::{box_solid, room_document};
        let mut document = room_document(Vec3::ZERO, Vec3::new(256.0, 256.0, 128.0), &[]);
        // A portal face in the middle of the room.
        let stray = box_solid(40, Vec3::new(100.0, 0.0, 0.0), Vec3::new(120.0, 64.0, 64.0), Some(Direction::East));
        document.root.children[1].children.push(stray);
        let err = Tile::from_document(document, "broken.vmf").unwrap_err();
        assert!(matches!(err, GenError::InvalidPortal { .. }));
    }

    #[test]
    fn test_tile_needs_geometry_and_numbered_portals() {
        use crate::document::Node;
        use crate::map::fixtures::room_document;
        let empty = Document::new(Node::default().with_child(Node::new("world")));
        let err = Tile::from_document(empty, "empty.vmf").unwrap_err();
        assert!(matches!(err, GenError::EmptyTile(ref s) if s == "empty.vmf"));

        let mut document = room_document(Vec3::ZERO, Vec3::new(256.0, 256.0, 128.0), &[(10, Direction::East, 128.0)]);
        document.root.children[1].children[2].properties.retain(|(k, _)| k != "id");
        let err = Tile::from_document(document, "anonymous.vmf").unwrap_err();
        assert!(matches!(err, GenError::MissingSolidId(ref s) if s == "anonymous.vmf"));
    }
}

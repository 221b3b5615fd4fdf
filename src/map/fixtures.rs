// src/map/fixtures.rs
// Hand-built tiles for unit tests.

use crate::document::{Document, Node};
use crate::map::portal::PORTAL_MATERIAL;
use crate::map::{Direction, Tile};
use crate::utils::geometry::Vec3;

fn side(points: [Vec3; 3], material: &str) -> Node {
    let plane = points
        .iter()
        .map(|p| format!("({})", p))
        .collect::<Vec<_>>()
        .join(" ");
    Node::new("side")
        .with("plane", plane)
        .with("material", material)
        .with("uaxis", "[1 0 0 0] 0.25")
        .with("vaxis", "[0 -1 0 0] 0.25")
}

/// An axis-aligned box brush; the face looking towards `portal` gets the
/// portal material.
pub fn box_solid(id: u64, min: Vec3, max: Vec3, portal: Option<Direction>) -> Node {
    let v = Vec3::new;
    let faces = [
        (Direction::Up, [v(min.x, max.y, max.z), v(max.x, max.y, max.z), v(max.x, min.y, max.z)]),
        (Direction::Down, [v(min.x, min.y, min.z), v(max.x, min.y, min.z), v(max.x, max.y, min.z)]),
        (Direction::West, [v(min.x, max.y, max.z), v(min.x, min.y, max.z), v(min.x, min.y, min.z)]),
        (Direction::East, [v(max.x, max.y, min.z), v(max.x, min.y, min.z), v(max.x, min.y, max.z)]),
        (Direction::North, [v(max.x, max.y, max.z), v(min.x, max.y, max.z), v(min.x, max.y, min.z)]),
        (Direction::South, [v(max.x, min.y, min.z), v(min.x, min.y, min.z), v(min.x, min.y, max.z)]),
    ];
    let mut solid = Node::new("solid").with("id", id.to_string());
    for (direction, points) in faces {
        let material = if portal == Some(direction) {
            PORTAL_MATERIAL
        } else {
            "TOOLS/TOOLSNODRAW"
        };
        solid.children.push(side(points, material));
    }
    solid.with_child(Node::new("editor").with("color", "0 180 0"))
}

/// A thin slab on the `direction` face of the room, `span` wide along the
/// face's horizontal axis, marked as a portal.
pub fn door_solid(id: u64, min: Vec3, max: Vec3, direction: Direction, span: f64) -> Node {
    const DEPTH: f64 = 8.0;
    let (lo, hi) = match direction {
        Direction::East => (
            Vec3::new(max.x - DEPTH, min.y, min.z),
            Vec3::new(max.x, min.y + span, max.z),
        ),
        Direction::West => (
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(min.x + DEPTH, min.y + span, max.z),
        ),
        Direction::North => (
            Vec3::new(min.x, max.y - DEPTH, min.z),
            Vec3::new(min.x + span, max.y, max.z),
        ),
        Direction::South => (
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(min.x + span, min.y + DEPTH, max.z),
        ),
        Direction::Up => (
            Vec3::new(min.x, min.y, max.z - DEPTH),
            Vec3::new(min.x + span, max.y, max.z),
        ),
        Direction::Down => (
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(min.x + span, max.y, min.z + DEPTH),
        ),
    };
    box_solid(id, lo, hi, Some(direction))
}

pub fn entity(id: u64, classname: &str, origin: Vec3) -> Node {
    Node::new("entity")
        .with("id", id.to_string())
        .with("classname", classname)
        .with("origin", origin.to_string())
        .with_child(Node::new("editor").with("color", "220 30 220"))
}

/// A room from `min` to `max` (floor and ceiling slabs, ids 2 and 3) with the
/// given `(id, direction, span)` doors.
pub fn room_document(min: Vec3, max: Vec3, doors: &[(u64, Direction, f64)]) -> Document {
    let mut world = Node::new("world")
        .with("id", "1")
        .with("classname", "worldspawn")
        .with_child(box_solid(2, min, Vec3::new(max.x, max.y, min.z + 8.0), None))
        .with_child(box_solid(3, Vec3::new(min.x, min.y, max.z - 8.0), max, None));
    for &(id, direction, span) in doors {
        world.children.push(door_solid(id, min, max, direction, span));
    }
    let root = Node::default()
        .with_child(Node::new("versioninfo").with("editorversion", "400"))
        .with_child(world)
        .with_child(Node::new("cameras").with("activecamera", "-1"));
    Document::new(root)
}

pub fn room_tile(source: &str, min: Vec3, max: Vec3, doors: &[(u64, Direction, f64)]) -> Tile {
    Tile::from_document(room_document(min, max, doors), source).expect("fixture tile is valid")
}

/// Appends an entity after the world block.
pub fn add_entity(tile: &mut Tile, entity: Node) {
    tile.document_mut().root.children.insert(2, entity);
}

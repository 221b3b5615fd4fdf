// src/map/door.rs

use std::collections::HashMap;

use crate::error::{GenError, Result};
use crate::map::Direction;

/// Solid ids double as door ids.
pub type DoorId = u64;

/// An open portal: the solid carrying it and its span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Door {
    pub id: DoorId,
    pub direction: Direction,
    pub span: f64,
}

/// A candidate join between one of our doors and one of theirs.
/// `direction` is the direction our door faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub direction: Direction,
    pub own: DoorId,
    pub other: DoorId,
}

impl Connection {
    pub fn new(direction: Direction, own: DoorId, other: DoorId) -> Self {
        Connection {
            direction,
            own,
            other,
        }
    }
}

/// The open doors of one tile.
///
/// Each direction keeps its doors in discovery order; lookups by id go
/// through the `doors` map so a missing door is an explicit error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoorRegistry {
    order: [Vec<DoorId>; 6],
    doors: HashMap<DoorId, Door>,
}

impl DoorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a door. A door id already present is moved to the new entry.
    pub fn insert(&mut self, direction: Direction, id: DoorId, span: f64) {
        if let Some(previous) = self.doors.remove(&id) {
            self.order[previous.direction.index()].retain(|&d| d != id);
        }
        self.order[direction.index()].push(id);
        self.doors.insert(id, Door { id, direction, span });
    }

    pub fn get(&self, id: DoorId) -> Option<&Door> {
        self.doors.get(&id)
    }

    pub fn contains(&self, direction: Direction, id: DoorId) -> bool {
        self.get(id).is_some_and(|door| door.direction == direction)
    }

    /// Open doors facing `direction`, in discovery order.
    pub fn doors(&self, direction: Direction) -> impl Iterator<Item = &Door> + '_ {
        self.order[direction.index()]
            .iter()
            .filter_map(move |id| self.doors.get(id))
    }

    /// Every open door, direction by direction.
    pub fn iter(&self) -> impl Iterator<Item = &Door> + '_ {
        Direction::ALL.into_iter().flat_map(move |d| self.doors(d))
    }

    pub fn len(&self) -> usize {
        self.doors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }

    /// Removes a door that a merge just used up.
    pub fn consume(&mut self, direction: Direction, id: DoorId) -> Result<Door> {
        if !self.contains(direction, id) {
            return Err(GenError::MissingDoor { direction, id });
        }
        self.order[direction.index()].retain(|&d| d != id);
        self.doors
            .remove(&id)
            .ok_or(GenError::MissingDoor { direction, id })
    }

    /// Takes over every door of `other`, shifting their ids by `offset`.
    pub fn absorb(&mut self, other: DoorRegistry, offset: u64) {
        for direction in Direction::ALL {
            for door in other.doors(direction) {
                self.insert(direction, door.id + offset, door.span);
            }
        }
    }

    /// A copy holding only the `length` doors with the highest ids, newest
    /// first within each direction.
    pub fn restrict_to_tail(&self, length: usize) -> DoorRegistry {
        let mut newest: Vec<&Door> = self.doors.values().collect();
        newest.sort_unstable_by(|a, b| b.id.cmp(&a.id));

        let mut tail = DoorRegistry::new();
        for door in newest.into_iter().take(length) {
            tail.insert(door.direction, door.id, door.span);
        }
        tail
    }

    /// Drops every door, returning them in scan order.
    pub fn clear(&mut self) -> Vec<Door> {
        let drained: Vec<Door> = self.iter().copied().collect();
        self.order.iter_mut().for_each(Vec::clear);
        self.doors.clear();
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(entries: &[(Direction, DoorId, f64)]) -> DoorRegistry {
        let mut registry = DoorRegistry::new();
        for &(direction, id, span) in entries {
            registry.insert(direction, id, span);
        }
        registry
    }

    #[test]
    fn test_insert_and_lookup() {
        let doors = registry(&[(Direction::North, 7, 128.0), (Direction::North, 3, 64.0)]);
        let ids: Vec<DoorId> = doors.doors(Direction::North).map(|d| d.id).collect();
        assert_eq!(ids, vec![7, 3]);
        assert!(doors.contains(Direction::North, 3));
        assert!(!doors.contains(Direction::South, 3));
        assert_eq!(doors.get(7).map(|d| d.span), Some(128.0));
        assert_eq!(doors.len(), 2);
    }

    #[test]
    fn test_consume() {
        let mut doors = registry(&[(Direction::East, 5, 64.0), (Direction::West, 6, 64.0)]);
        let door = doors.consume(Direction::East, 5).unwrap();
        assert_eq!(door.id, 5);
        assert!(doors.get(5).is_none());
        assert_eq!(doors.doors(Direction::East).count(), 0);

        let err = doors.consume(Direction::East, 6).unwrap_err();
        assert!(matches!(err, GenError::MissingDoor { id: 6, direction: Direction::East }));
        assert!(doors.contains(Direction::West, 6));
    }

    #[test]
    fn test_absorb_offsets_ids() {
        let mut base = registry(&[(Direction::North, 2, 64.0)]);
        let other = registry(&[(Direction::South, 2, 64.0), (Direction::Up, 9, 32.0)]);
        base.absorb(other, 100);
        let all: Vec<(Direction, DoorId)> = base.iter().map(|d| (d.direction, d.id)).collect();
        assert_eq!(
            all,
            vec![(Direction::North, 2), (Direction::South, 102), (Direction::Up, 109)]
        );
    }

    #[test]
    fn test_restrict_to_tail() {
        let doors = registry(&[(Direction::North, 5, 4.0), (Direction::East, 9, 4.0)]);
        let tail = doors.restrict_to_tail(1);
        assert_eq!(tail.len(), 1);
        assert!(tail.contains(Direction::East, 9));
        assert!(!tail.contains(Direction::North, 5));
        assert_eq!(doors.restrict_to_tail(10), doors);
    }

    #[test]
    fn test_tail_lists_newest_doors_first() {
        let doors = registry(&[
            (Direction::East, 2, 4.0),
            (Direction::East, 7, 4.0),
            (Direction::North, 9, 4.0),
            (Direction::East, 5, 4.0),
        ]);
        let tail = doors.restrict_to_tail(3);
        let east: Vec<DoorId> = tail.doors(Direction::East).map(|d| d.id).collect();
        assert_eq!(east, vec![7, 5]);
        assert!(tail.contains(Direction::North, 9));
        assert!(tail.get(2).is_none());
    }

    #[test]
    fn test_clear() {
        let mut doors = registry(&[(Direction::Down, 1, 4.0), (Direction::North, 2, 4.0)]);
        let drained: Vec<DoorId> = doors.clear().iter().map(|d| d.id).collect();
        assert_eq!(drained, vec![2, 1]);
        assert!(doors.is_empty());
    }
}

// src/generator/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use rayon::prelude::*;

use crate::error::{GenError, Result};
use crate::map::Tile;

/// What a tile is used for, read off its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileRole {
    Start,
    Finale,
    /// A pool tile; `weight` is how many pool entries it gets.
    Regular { weight: usize, once: bool },
}

impl TileRole {
    /// `start*` and `finale*` name the two ends of the level, `once*` tiles
    /// are placed at most once, and a leading `N_` makes a tile N times as
    /// likely to be drawn.
    pub fn from_file_name(name: &str) -> TileRole {
        if name.starts_with("start") {
            return TileRole::Start;
        }
        if name.starts_with("finale") {
            return TileRole::Finale;
        }
        let weight = name
            .split('_')
            .next()
            .and_then(|prefix| prefix.parse::<usize>().ok())
            .map_or(1, |n| n.max(1));
        TileRole::Regular {
            weight,
            once: name.starts_with("once"),
        }
    }
}

/// The tiles of one style.
#[derive(Debug, Clone, Default)]
pub struct TileSet {
    pub starts: Vec<Tile>,
    pub tiles: Vec<Tile>,
    pub finales: Vec<Tile>,
    /// Indices into `tiles`; weighted tiles appear several times.
    pub pool: Vec<usize>,
}

impl TileSet {
    /// Adds a regular tile with `weight` pool entries.
    pub fn add_tile(&mut self, tile: Tile, weight: usize) {
        let index = self.tiles.len();
        self.tiles.push(tile);
        self.pool.extend(std::iter::repeat(index).take(weight.max(1)));
    }

    /// Takes every pool entry of tile `index` out of the draw.
    pub fn remove_from_pool(&mut self, index: usize) {
        self.pool.retain(|&i| i != index);
    }
}

fn vmf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| GenError::io(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| GenError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "vmf") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Loads every `*.vmf` in `dir`. Files are parsed in parallel but grouped in
/// file name order, so the same directory always yields the same set.
pub fn load_tile_set(dir: &Path) -> Result<TileSet> {
    info!("== LOADING MAP FILES from {} ==", dir.display());
    let paths = vmf_files(dir)?;
    let tiles = paths
        .par_iter()
        .map(|path| Tile::from_file(path))
        .collect::<Result<Vec<Tile>>>()?;

    let mut set = TileSet::default();
    for mut tile in tiles {
        info!("Loaded {} ({} open doors)", tile.source(), tile.doors().len());
        match TileRole::from_file_name(tile.source()) {
            TileRole::Start => set.starts.push(tile),
            TileRole::Finale => set.finales.push(tile),
            TileRole::Regular { weight, once } => {
                if weight > 1 {
                    info!("{} is {} times more likely to be chosen", tile.source(), weight);
                }
                tile.set_once(once);
                set.add_tile(tile, weight);
            }
        }
    }

    if set.finales.is_empty() {
        warn!("No finale tiles in {}", dir.display());
    }
    if set.pool.is_empty() {
        warn!("No regular tiles in {}", dir.display());
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::fixtures::room_document;
    use crate::map::Direction;
    use crate::utils::geometry::Vec3;

    fn write_room(dir: &Path, name: &str) {
        let doc = room_document(
            Vec3::ZERO,
            Vec3::new(256.0, 256.0, 128.0),
            &[(10, Direction::East, 128.0), (11, Direction::West, 128.0)],
        );
        doc.write_to(&dir.join(name)).unwrap();
    }

    #[test]
    fn test_role_from_file_name() {
        assert_eq!(TileRole::from_file_name("start.vmf"), TileRole::Start);
        assert_eq!(TileRole::from_file_name("start_cellar.vmf"), TileRole::Start);
        assert_eq!(TileRole::from_file_name("finale_roof.vmf"), TileRole::Finale);
        assert_eq!(
            TileRole::from_file_name("once_shrine.vmf"),
            TileRole::Regular { weight: 1, once: true }
        );
        assert_eq!(
            TileRole::from_file_name("3_hall.vmf"),
            TileRole::Regular { weight: 3, once: false }
        );
        assert_eq!(
            TileRole::from_file_name("0_hall.vmf"),
            TileRole::Regular { weight: 1, once: false }
        );
        assert_eq!(
            TileRole::from_file_name("12abc_hall.vmf"),
            TileRole::Regular { weight: 1, once: false }
        );
    }

    #[test]
    fn test_load_tile_set() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["start_a.vmf", "finale_b.vmf", "plain.vmf", "2_hall.vmf", "once_shrine.vmf"] {
            write_room(dir.path(), name);
        }
        fs::write(dir.path().join("notes.txt"), "not a map").unwrap();

        let set = load_tile_set(dir.path()).unwrap();
        assert_eq!(set.starts.len(), 1);
        assert_eq!(set.finales.len(), 1);
        let names: Vec<&str> = set.tiles.iter().map(|t| t.source()).collect();
        assert_eq!(names, vec!["2_hall.vmf", "once_shrine.vmf", "plain.vmf"]);
        assert_eq!(set.pool, vec![0, 0, 1, 2]);
        assert!(set.tiles[1].is_once());
        assert!(!set.tiles[0].is_once());
        assert_eq!(set.tiles[2].doors().len(), 2);
    }

    #[test]
    fn test_remove_from_pool_drops_all_copies() {
        let mut set = TileSet {
            pool: vec![0, 1, 1, 2, 1],
            ..Default::default()
        };
        set.remove_from_pool(1);
        assert_eq!(set.pool, vec![0, 2]);
    }

    #[test]
    fn test_parse_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        write_room(dir.path(), "start.vmf");
        fs::write(dir.path().join("broken.vmf"), "world\n{\n\"id\" \"1\"\n").unwrap();
        let err = load_tile_set(dir.path()).unwrap_err();
        assert!(matches!(err, GenError::Parse { .. }));

        let missing = load_tile_set(&dir.path().join("nowhere")).unwrap_err();
        assert!(matches!(missing, GenError::Io { .. }));
    }
}

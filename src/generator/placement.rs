// src/generator/placement.rs
// Growing a level out of a start tile by random, collision-checked placements.

use log::{debug, info, warn};
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::{GeneratorConfig, DEFAULT_SEAL_MATERIAL};
use crate::error::{GenError, Result};
use crate::generator::loader::TileSet;
use crate::map::{Connection, Tile};
use crate::utils::geometry::{collide, Bounds};

/// Boxes of everything placed so far, in placement order.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    boxes: Vec<Bounds>,
}

impl Occupancy {
    pub fn new(seed: Bounds) -> Self {
        Occupancy { boxes: vec![seed] }
    }

    pub fn collides(&self, bounds: &Bounds) -> bool {
        self.boxes.iter().any(|blocking| collide(blocking, bounds))
    }

    pub fn push(&mut self, bounds: Bounds) {
        self.boxes.push(bounds);
    }

    pub fn boxes(&self) -> &[Bounds] {
        &self.boxes
    }
}

/// Summary of one `generate` run, written out as JSON on request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationReport {
    pub seed: u64,
    pub start: String,
    pub finale: Option<String>,
    /// Pool tiles in the order they were placed.
    pub placed: Vec<String>,
    pub attempts: usize,
    pub finale_attached: bool,
    pub loops_closed: usize,
    pub doors_removed: usize,
    pub portals_sealed: usize,
    pub bounds_min: [f64; 3],
    pub bounds_max: [f64; 3],
}

impl GenerationReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Owns the random stream and the occupancy of one generation run.
///
/// Random draws always happen in the same order (start, finale, then one pool
/// entry and one connection per attempt), so a seed fully determines the
/// level for a given tile set.
pub struct LevelGenerator {
    seed: u64,
    rng: ChaCha8Rng,
    occupancy: Occupancy,
    tail_length: Option<usize>,
    seal_material: String,
    placed: Vec<String>,
}

impl LevelGenerator {
    pub fn new(seed: u64, tail_length: Option<usize>) -> Self {
        LevelGenerator {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            occupancy: Occupancy::default(),
            tail_length,
            seal_material: DEFAULT_SEAL_MATERIAL.to_string(),
            placed: Vec::new(),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        let mut generator = Self::new(config.seed, config.tail());
        generator.seal_material = config.seal_material.clone();
        generator
    }

    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    /// Makes a working copy of `start` and resets the occupancy to its box.
    pub fn begin(&mut self, start: &Tile) -> Tile {
        self.occupancy = Occupancy::new(start.bounds());
        self.placed.clear();
        start.clone()
    }

    pub fn choose_connection(&mut self, connections: &[Connection]) -> Option<Connection> {
        let connection = connections.choose(&mut self.rng).copied();
        if let Some(connection) = &connection {
            info!("Chose connection: {:?}", connection);
        }
        connection
    }

    /// Attaches `tile` through `connection` unless it would overlap something.
    fn place(&mut self, base: &mut Tile, tile: &Tile, connection: &Connection) -> Result<bool> {
        let alignment = base.portals_and_vector(tile, connection)?;
        let placed = tile.bounds().translate(alignment.vector);
        if self.occupancy.collides(&placed) {
            debug!("{} at {} collides", tile.source(), placed);
            return Ok(false);
        }
        self.occupancy.push(placed);
        base.append(tile, connection, &alignment)?;
        Ok(true)
    }

    /// One random connection, one collision test.
    pub fn try_add_tile(&mut self, base: &mut Tile, tile: &Tile) -> Result<bool> {
        let connections = base.find_connections(tile, self.tail_length);
        let Some(connection) = self.choose_connection(&connections) else {
            info!("No connection for {}", tile.source());
            return Ok(false);
        };
        let placed = self.place(base, tile, &connection)?;
        if !placed {
            info!("Tiles collide");
        }
        Ok(placed)
    }

    /// Tries every connection in discovery order and keeps the first one that fits.
    pub fn add_tile(&mut self, base: &mut Tile, tile: &Tile) -> Result<bool> {
        info!("Adding tile {}", tile.source());
        for connection in base.find_connections(tile, self.tail_length) {
            if self.place(base, tile, &connection)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Draws a pool entry and tries to place it. A single-use tile leaves the
    /// pool once it has been placed.
    pub fn select_and_try_to_add_tile(&mut self, base: &mut Tile, set: &mut TileSet) -> Result<bool> {
        let Some(&index) = set.pool.choose(&mut self.rng) else {
            warn!("Tile pool is empty");
            return Ok(false);
        };
        let tile = &set.tiles[index];
        info!("Chose tile: {}", tile.source());
        if !self.try_add_tile(base, tile)? {
            return Ok(false);
        }
        self.placed.push(tile.source().to_string());
        if tile.is_once() {
            set.remove_from_pool(index);
            info!("Removed tile from pool because it may only be added once");
        }
        Ok(true)
    }

    /// Builds a closed level of up to `tile_count` pool tiles between a start
    /// and a finale tile.
    pub fn generate(&mut self, set: &mut TileSet, tile_count: usize) -> Result<(Tile, GenerationReport)> {
        info!("== BEGIN MAP FILE CREATION ==");
        let start = set
            .starts
            .choose(&mut self.rng)
            .ok_or(GenError::EmptyTileSet("start"))?;
        info!("Chose starting tile {}", start.source());
        let mut base = self.begin(start);
        let mut report = GenerationReport {
            seed: self.seed,
            start: start.source().to_string(),
            ..Default::default()
        };

        let finale = set.finales.choose(&mut self.rng).cloned();
        match &finale {
            Some(finale) => info!("Chose ending tile {}", finale.source()),
            None => warn!("No finale tile to choose from"),
        }
        report.finale = finale.as_ref().map(|f| f.source().to_string());

        let budget = tile_count * set.pool.len();
        let mut added = 0;
        info!("-- TILE 1 --");
        while report.attempts < budget && added < tile_count {
            report.attempts += 1;
            if self.select_and_try_to_add_tile(&mut base, set)? {
                added += 1;
                info!("-- TILE {} --", added + 1);
            }
        }
        info!("Total tiles: {}", added);

        if let Some(finale) = &finale {
            report.finale_attached = self.add_tile(&mut base, finale)?;
            if !report.finale_attached {
                warn!("Failed to append finale tile {}", finale.source());
            }
        }

        let summary = base.close(&self.seal_material)?;
        report.loops_closed = summary.loops_closed;
        report.doors_removed = summary.doors_removed;
        report.portals_sealed = summary.portals_sealed;
        report.placed = std::mem::take(&mut self.placed);
        let bounds = base.bounds();
        report.bounds_min = [bounds.min.x, bounds.min.y, bounds.min.z];
        report.bounds_max = [bounds.max.x, bounds.max.y, bounds.max.z];
        Ok((base, report))
    }
}

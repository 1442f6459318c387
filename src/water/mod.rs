//! Queue-driven water spreading.
//!
//! Fluid state lives in the chunks themselves: a water voxel's metadata
//! byte is its fill level, 0 for a source and 1 through 7 for flow that
//! weakens with horizontal distance. The simulator only owns the pending
//! work queue and two caches (known sources, evaporation timers), so a
//! despawned chunk invalidates nothing; queue entries pointing into it
//! fail the registry lookup and fall away.

use std::collections::{HashMap, HashSet, VecDeque};

use glam::IVec3;
use log::debug;

use crate::voxel::block::Block;
use crate::voxel::chunk::ChunkCoord;
use crate::voxel::registry::ChunkRegistry;

/// Fill level at which water is too weak to exist.
const MAX_STRENGTH: u8 = 8;

/// Down first so falling water keeps its strength before spreading out.
const SPREAD_DIRS: [IVec3; 5] = [
    IVec3::new(0, 0, -1),
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
    IVec3::new(0, 1, 0),
    IVec3::new(0, -1, 0),
];

const HORIZONTAL_DIRS: [IVec3; 4] = [
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
    IVec3::new(0, 1, 0),
    IVec3::new(0, -1, 0),
];

/// Cellular-automaton water simulator over world-space block positions.
///
/// The per-tick drain cap bounds the work done per frame; a single source
/// otherwise floods an unbounded breadth-first frontier in one call.
pub struct WaterSimulator {
    queue: VecDeque<(IVec3, u8)>,
    sources: HashSet<IVec3>,
    flowing: HashMap<IVec3, f32>,
    infinite_sources: bool,
    evaporation: bool,
    evaporation_rate: f32,
    drain_per_tick: usize,
}

impl Default for WaterSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl WaterSimulator {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            sources: HashSet::new(),
            flowing: HashMap::new(),
            infinite_sources: true,
            evaporation: false,
            evaporation_rate: 5.0,
            drain_per_tick: 1,
        }
    }

    /// Queues a water position for spreading. Level 0 marks a source and is
    /// remembered for infinite-source promotion.
    pub fn enqueue(&mut self, position: IVec3, level: u8) {
        debug!("water enqueued at {position} with level {level}");
        self.queue.push_back((position, level));
        if level == 0 && self.infinite_sources {
            self.sources.insert(position);
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn set_infinite_sources_enabled(&mut self, enabled: bool) {
        self.infinite_sources = enabled;
        if !enabled {
            self.sources.clear();
        }
    }

    pub fn set_evaporation_enabled(&mut self, enabled: bool, rate: f32) {
        self.evaporation = enabled;
        self.evaporation_rate = rate.max(0.1);
        if !enabled {
            self.flowing.clear();
        }
    }

    /// How many queue entries one tick may drain.
    pub fn set_drain_per_tick(&mut self, count: usize) {
        self.drain_per_tick = count.max(1);
    }

    /// Advances the simulation by one step, draining up to the configured
    /// number of queue entries and then aging evaporation timers. Returns
    /// the chunks whose voxels changed and need a re-mesh.
    pub fn tick(&mut self, delta: f32, registry: &mut ChunkRegistry) -> Vec<ChunkCoord> {
        let mut dirty = Vec::new();

        for _ in 0..self.drain_per_tick {
            let Some((position, level)) = self.queue.pop_front() else {
                break;
            };
            if self.infinite_sources && level > 0 {
                self.check_infinite_source(position, registry);
            }
            self.try_spread(position, level, registry, &mut dirty);
        }

        if self.evaporation {
            self.process_evaporation(delta, registry, &mut dirty);
        }

        dirty.sort_unstable_by_key(|c| (c.x, c.y, c.z));
        dirty.dedup();
        dirty
    }

    /// Attempts one spread step from `position` at the given strength. Water
    /// keeps its strength falling down and weakens by one horizontally; it
    /// displaces air and strictly weaker water only. Positions in unloaded
    /// chunks are skipped.
    fn try_spread(
        &mut self,
        position: IVec3,
        strength: u8,
        registry: &mut ChunkRegistry,
        dirty: &mut Vec<ChunkCoord>,
    ) {
        if strength >= MAX_STRENGTH {
            return;
        }

        for dir in SPREAD_DIRS {
            let neighbor = position + dir;
            let coord = registry.coord_of(neighbor);
            if !registry.contains(coord) {
                continue;
            }

            let new_strength = if dir.z < 0 { strength } else { strength + 1 };
            // Level 8 is not a valid resting state; a horizontal step from
            // strength 7 places nothing.
            if new_strength >= MAX_STRENGTH {
                continue;
            }

            let block = registry.block_at(neighbor);
            let existing = registry.meta_at(neighbor);
            let can_flow = block == Block::Air
                || (block == Block::Water && existing > new_strength);
            if !can_flow {
                continue;
            }

            registry.set_block_at(neighbor, Block::Water);
            registry.set_meta_at(neighbor, new_strength);
            dirty.push(coord);
            self.queue.push_back((neighbor, new_strength));

            if self.evaporation && new_strength > 0 {
                self.flowing.insert(neighbor, 0.0);
            }
        }
    }

    fn is_source(&self, position: IVec3, registry: &ChunkRegistry) -> bool {
        registry.block_at(position) == Block::Water && registry.meta_at(position) == 0
    }

    /// Promotes flowing water bounded by two or more horizontal sources
    /// into a source itself, so still pools never drain.
    fn check_infinite_source(&mut self, position: IVec3, registry: &mut ChunkRegistry) {
        if self.is_source(position, registry) {
            return;
        }

        let mut adjacent = 0;
        for dir in HORIZONTAL_DIRS {
            if self.is_source(position + dir, registry) {
                adjacent += 1;
                if adjacent >= 2 {
                    break;
                }
            }
        }
        if adjacent < 2 {
            return;
        }

        if registry.block_at(position) == Block::Water {
            registry.set_meta_at(position, 0);
            self.sources.insert(position);
            self.queue.push_back((position, 0));
        }
    }

    /// Ages every tracked flowing-water block and weakens it once its timer
    /// passes the configured rate; level 8 means the block is gone.
    fn process_evaporation(
        &mut self,
        delta: f32,
        registry: &mut ChunkRegistry,
        dirty: &mut Vec<ChunkCoord>,
    ) {
        let mut remove = Vec::new();

        for (&position, timer) in &mut self.flowing {
            *timer += delta;
            if *timer < self.evaporation_rate {
                continue;
            }

            if registry.block_at(position) != Block::Water {
                remove.push(position);
                continue;
            }

            let level = registry.meta_at(position) + 1;
            if level >= MAX_STRENGTH {
                registry.set_block_at(position, Block::Air);
                registry.set_meta_at(position, 0);
                dirty.push(registry.coord_of(position));
                remove.push(position);
            } else {
                registry.set_meta_at(position, level);
                *timer = 0.0;
            }
        }

        for position in remove {
            self.flowing.remove(&position);
        }
    }
}

//! Procedural terrain synthesis: biome-blended heightmaps, hydrology,
//! and vegetation placement.

mod hydrology;
mod vegetation;
pub mod terrain_gen;

pub use terrain_gen::TerrainGenerator;

use glam::IVec3;

use crate::voxel::Biome;

/// Surface sample for one column, recorded during the base heightmap pass
/// and consumed by the hydrology and vegetation passes.
#[derive(Clone, Copy, Debug)]
pub struct ColumnSurface {
    pub local: IVec3,
    pub biome: Biome,
}

/// Per-column surface height cache. Rivers lower entries as they carve so
/// later passes see post-carving heights.
pub struct SurfaceMap {
    heights: Vec<i32>,
    size_y: i32,
}

impl SurfaceMap {
    pub fn new(size_x: i32, size_y: i32) -> Self {
        Self {
            heights: vec![-1; (size_x * size_y) as usize],
            size_y,
        }
    }

    pub fn get(&self, x: i32, y: i32) -> i32 {
        self.heights[(x * self.size_y + y) as usize]
    }

    pub fn set(&mut self, x: i32, y: i32, height: i32) {
        self.heights[(x * self.size_y + y) as usize] = height;
    }
}

/// Deterministic per-chunk seed so regeneration reproduces the same
/// vegetation and lake rolls.
pub fn chunk_seed(world_seed: i32, origin: IVec3) -> u64 {
    let mixed = world_seed.wrapping_abs()
        ^ origin.x.wrapping_mul(73856093)
        ^ origin.y.wrapping_mul(19349663);
    mixed as u32 as u64
}

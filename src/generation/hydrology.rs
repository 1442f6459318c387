//! Lake and river carving over the base heightmap.

use glam::IVec3;

use crate::voxel::{Block, Chunk};

use super::terrain_gen::TerrainGenerator;
use super::{ColumnSurface, SurfaceMap};

/// Lake field threshold; only strongly negative samples pool water.
const LAKE_THRESHOLD: f32 = -0.35;
/// Chance that a qualifying column is skipped anyway, so lakes stay rare.
const LAKE_SKIP_CHANCE: f32 = 0.85;
/// How far rivers sample the river field relative to world scale.
const RIVER_SAMPLE_SCALE: f32 = 0.3;
/// Ridge-mask half width; columns under it become channel.
const RIVER_WIDTH: f32 = 0.07;

/// Soft materials a lake is allowed to flood.
fn floodable(block: Block) -> bool {
    matches!(block, Block::Air | Block::Dirt | Block::Grass | Block::Sand)
}

/// Carve roughly circular water-filled depressions where the lake noise
/// field dips low enough. The radius is perturbed per angle by the same
/// field so shorelines stay irregular.
pub fn carve_lakes(
    chunk: &mut Chunk,
    generator: &TerrainGenerator,
    surfaces: &[ColumnSurface],
    surface_map: &SurfaceMap,
    seed: u64,
) {
    let dims = chunk.dims();
    let origin = chunk.origin_blocks();
    let mut rng = fastrand::Rng::with_seed(seed ^ 0x9e37_79b9_7f4a_7c15);

    for surface in surfaces {
        let wx = (surface.local.x + origin.x) as f32;
        let wy = (surface.local.y + origin.y) as f32;

        if generator.lake_noise(wx, wy) >= LAKE_THRESHOLD {
            continue;
        }
        if surface.local.z as f32 >= dims.z as f32 * 0.8 {
            continue;
        }
        if rng.f32() < LAKE_SKIP_CHANCE {
            continue;
        }

        let radius = rng.i32(8..=14);
        let center_level = surface.local.z;

        for angle in (0..360).step_by(3) {
            let rad = (angle as f32).to_radians();
            let radius_offset = generator.lake_noise(
                wx + rad.cos() * radius as f32,
                wy + rad.sin() * radius as f32,
            ) * 3.0;
            let final_radius = radius as f32 + radius_offset;

            let mut r = 0.0f32;
            while r < final_radius {
                let lx = surface.local.x + (rad.cos() * r).round() as i32;
                let ly = surface.local.y + (rad.sin() * r).round() as i32;
                r += 1.0;
                if lx < 0 || lx >= dims.x || ly < 0 || ly >= dims.y {
                    continue;
                }

                let surface_z = surface_map.get(lx, ly);
                if surface_z < 0 {
                    continue;
                }

                // Flat surface at the center level, but never floating
                // above the local terrain.
                let water_level = center_level.min(surface_z);

                for lz in (water_level - 2)..=water_level {
                    if lz < 0 || lz >= dims.z {
                        continue;
                    }
                    let p = IVec3::new(lx, ly, lz);
                    if floodable(chunk.block(p)) {
                        chunk.set_block(p, Block::Water);
                        chunk.set_meta(p, 0);
                    }
                }
            }
        }
    }
}

/// Carve river channels where the absolute river field falls under the
/// width threshold: two dirt layers and a source-water layer at the
/// surface, lowering the cached column height for later passes.
pub fn carve_rivers(chunk: &mut Chunk, generator: &TerrainGenerator, surface_map: &mut SurfaceMap) {
    let dims = chunk.dims();
    let origin = chunk.origin_blocks();

    for x in 0..dims.x {
        for y in 0..dims.y {
            let wx = (x + origin.x) as f32 * RIVER_SAMPLE_SCALE;
            let wy = (y + origin.y) as f32 * RIVER_SAMPLE_SCALE;
            if generator.river_noise(wx, wy).abs() >= RIVER_WIDTH {
                continue;
            }

            let z = surface_map.get(x, y);
            if z < 0 {
                continue;
            }

            let river_bed = (z - 2).max(0);
            for dz in 0..=2 {
                let zz = river_bed + dz;
                if zz >= dims.z {
                    continue;
                }
                let p = IVec3::new(x, y, zz);
                let block = if dz < 2 { Block::Dirt } else { Block::Water };
                chunk.set_block(p, block);
                chunk.set_meta(p, 0);
            }
            surface_map.set(x, y, river_bed + 2);
        }
    }
}

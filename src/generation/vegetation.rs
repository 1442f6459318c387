//! Tree and cactus placement over generated terrain.

use glam::IVec3;

use crate::voxel::{Biome, Block, Chunk};

use super::terrain_gen::TerrainGenerator;
use super::ColumnSurface;

/// One placement attempt per this many surface columns.
const COLUMNS_PER_ATTEMPT: i32 = 30;
/// Keep vegetation clear of chunk edges so canopies never spill out.
const EDGE_MARGIN: i32 = 5;
/// Vertical clearance required above the surface block.
const HEADROOM: i32 = 6;
/// Minimum Manhattan distance between placements in Forest and Plains.
const MIN_SPACING: i32 = 5;
/// Scalar applied on top of biome chance and noise factor.
const CHANCE_SCALE: f32 = 1.5;

const LEAF_HEIGHT: i32 = 3;

/// Run the vegetation pass: a fixed budget of random surface samples, each
/// accepted by biome chance, a noise factor, headroom, and spacing rules.
pub fn populate(
    chunk: &mut Chunk,
    generator: &TerrainGenerator,
    surfaces: &[ColumnSurface],
    seed: u64,
) {
    let dims = chunk.dims();
    let origin = chunk.origin_blocks();
    let mut rng = fastrand::Rng::with_seed(seed);

    let attempts = dims.x * dims.y / COLUMNS_PER_ATTEMPT;
    let mut placed: Vec<(i32, i32)> = Vec::new();

    for attempt in 0..attempts {
        if surfaces.is_empty() {
            break;
        }
        let surface = surfaces[rng.usize(0..surfaces.len())];
        let IVec3 { x, y, z } = surface.local;

        if x <= EDGE_MARGIN || x >= dims.x - EDGE_MARGIN - 1 {
            continue;
        }
        if y <= EDGE_MARGIN || y >= dims.y - EDGE_MARGIN - 1 {
            continue;
        }
        if z + HEADROOM >= dims.z {
            continue;
        }

        let noise_factor = generator
            .base_noise2((x + origin.x) as f32 * 0.1, (y + origin.y) as f32 * 0.1)
            .abs();
        let chance = surface.biome.vegetation_chance() * noise_factor * CHANCE_SCALE;
        if rng.f32() >= chance {
            continue;
        }

        let clear = (z + 1..=z + HEADROOM).all(|cz| chunk.block(IVec3::new(x, y, cz)) == Block::Air);
        if !clear {
            continue;
        }

        let spaced = match surface.biome {
            Biome::Forest | Biome::Plains => placed
                .iter()
                .all(|&(px, py)| (px - x).abs() + (py - y).abs() >= MIN_SPACING),
            _ => true,
        };
        if !spaced {
            continue;
        }

        let ground = chunk.block(IVec3::new(x, y, z));
        let tree_ground = matches!(ground, Block::Grass | Block::Dirt | Block::Sand);
        let cactus_ground = ground == Block::Sand;

        match surface.biome {
            Biome::Forest | Biome::Plains if tree_ground => {
                let mut tree_rng = fastrand::Rng::with_seed(seed.wrapping_add(attempt as u64));
                spawn_tree(chunk, x, y, z, &mut tree_rng);
                placed.push((x, y));
            }
            Biome::Desert if cactus_ground => {
                spawn_cactus(chunk, x, y, z + 1);
                placed.push((x, y));
            }
            _ => {}
        }
    }
}

/// Classic tree: 4-6 block trunk and three leaf layers (3x3, 5x5 with
/// trimmed corners, 3x3), with an optional single leaf on top.
fn spawn_tree(chunk: &mut Chunk, x: i32, y: i32, z: i32, rng: &mut fastrand::Rng) {
    let dims = chunk.dims();
    let trunk_height = 4 + rng.i32(0..=2);
    let leaf_start = trunk_height - LEAF_HEIGHT + 1;

    for i in 0..trunk_height {
        let tz = z + i;
        if tz >= dims.z {
            break;
        }
        let p = IVec3::new(x, y, tz);
        if chunk.block(p) == Block::Air {
            chunk.set_block(p, Block::Log);
        }
    }

    for layer in 0..LEAF_HEIGHT {
        let lz = z + leaf_start + layer;
        if lz >= dims.z {
            continue;
        }
        let radius = if layer == 0 || layer == LEAF_HEIGHT - 1 { 1 } else { 2 };

        for dx in -radius..=radius {
            for dy in -radius..=radius {
                let lx = x + dx;
                let ly = y + dy;
                if lx < 0 || ly < 0 || lx >= dims.x || ly >= dims.y {
                    continue;
                }
                // Leave the trunk column alone below the trunk top.
                if dx == 0 && dy == 0 && lz < z + trunk_height {
                    continue;
                }
                // Trim corners of the wide layers for a rounder canopy.
                if radius == 2 && dx.abs() == 2 && dy.abs() == 2 {
                    continue;
                }
                let p = IVec3::new(lx, ly, lz);
                if chunk.block(p) == Block::Air {
                    chunk.set_block(p, Block::Leaves);
                }
            }
        }
    }

    let top_z = z + leaf_start + LEAF_HEIGHT;
    if top_z < dims.z && rng.f32() < 0.5 {
        let p = IVec3::new(x, y, top_z);
        if chunk.block(p) == Block::Air {
            chunk.set_block(p, Block::Leaves);
        }
    }
}

/// Two-block cactus; the top block is recorded so the mesher can give it
/// the capped texture.
fn spawn_cactus(chunk: &mut Chunk, x: i32, y: i32, z: i32) {
    let dims = chunk.dims();
    if z + 1 >= dims.z {
        return;
    }
    chunk.set_block(IVec3::new(x, y, z), Block::Cactus);
    chunk.set_block(IVec3::new(x, y, z + 1), Block::Cactus);
    chunk.top_cactus.insert(IVec3::new(x, y, z + 1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::ChunkCoord;

    fn surfaced_chunk(
        coord: ChunkCoord,
        ground: Block,
        biome: Biome,
        height: i32,
    ) -> (Chunk, Vec<ColumnSurface>) {
        let dims = IVec3::new(16, 16, 256);
        let mut chunk = Chunk::new(coord, dims);
        let mut surfaces = Vec::new();
        for x in 0..dims.x {
            for y in 0..dims.y {
                for z in 0..=height {
                    let block = if z == height { ground } else { Block::Stone };
                    chunk.set_block(IVec3::new(x, y, z), block);
                }
                surfaces.push(ColumnSurface {
                    local: IVec3::new(x, y, height),
                    biome,
                });
            }
        }
        (chunk, surfaces)
    }

    fn count_blocks(chunk: &Chunk, wanted: Block) -> usize {
        let dims = chunk.dims();
        let mut count = 0;
        for z in 0..dims.z {
            for y in 0..dims.y {
                for x in 0..dims.x {
                    if chunk.block(IVec3::new(x, y, z)) == wanted {
                        count += 1;
                    }
                }
            }
        }
        count
    }

    #[test]
    fn test_spawn_tree_shape() {
        let dims = IVec3::new(16, 16, 256);
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0), dims);
        let surface = 60;
        chunk.set_block(IVec3::new(8, 8, surface), Block::Grass);
        let mut rng = fastrand::Rng::with_seed(7);

        spawn_tree(&mut chunk, 8, 8, surface, &mut rng);

        // Trunk fills the air above the surface block up to 4-6 cells.
        let mut trunk = 0;
        for z in surface + 1..surface + 7 {
            if chunk.block(IVec3::new(8, 8, z)) == Block::Log {
                trunk += 1;
            }
        }
        assert!((3..=5).contains(&trunk), "trunk height {trunk}");
        assert!(count_blocks(&chunk, Block::Leaves) > 0, "canopy missing");

        // Canopy stays within radius 2 of the trunk.
        for z in 0..dims.z {
            for y in 0..dims.y {
                for x in 0..dims.x {
                    if chunk.block(IVec3::new(x, y, z)) == Block::Leaves {
                        assert!((x - 8).abs() <= 2 && (y - 8).abs() <= 2);
                    }
                }
            }
        }
    }

    #[test]
    fn test_forest_grows_trees_somewhere() {
        let generator = TerrainGenerator::new(1337, 0.03);
        let mut total_logs = 0;
        // Sweep chunk positions so the placement noise is sampled across
        // several lattice cells rather than one near-zero neighborhood.
        for c in 0..32 {
            let (mut chunk, surfaces) =
                surfaced_chunk(ChunkCoord::new(c, c * 3, 0), Block::Grass, Biome::Forest, 60);
            for seed in 0..8u64 {
                populate(&mut chunk, &generator, &surfaces, seed);
            }
            total_logs += count_blocks(&chunk, Block::Log);
        }
        assert!(total_logs > 0, "no trees placed across any chunk");
    }

    #[test]
    fn test_desert_cactus_tracks_top_block() {
        let generator = TerrainGenerator::new(1337, 0.03);
        let mut any = false;
        for c in 0..32 {
            let (mut chunk, surfaces) =
                surfaced_chunk(ChunkCoord::new(-c, c * 5, 0), Block::Sand, Biome::Desert, 60);
            for seed in 0..8u64 {
                populate(&mut chunk, &generator, &surfaces, seed);
            }
            let cacti = count_blocks(&chunk, Block::Cactus);
            any |= cacti > 0;
            assert_eq!(cacti, chunk.top_cactus.len() * 2);
            for top in &chunk.top_cactus {
                assert_eq!(chunk.block(*top), Block::Cactus);
                assert_eq!(chunk.block(*top - IVec3::Z), Block::Cactus);
                assert_eq!(chunk.block(*top + IVec3::Z), Block::Air);
            }
        }
        assert!(any, "no cactus placed across any chunk");
    }

    #[test]
    fn test_mountain_stone_surface_gets_nothing() {
        let generator = TerrainGenerator::new(1337, 0.03);
        for c in 0..8 {
            let (mut chunk, surfaces) =
                surfaced_chunk(ChunkCoord::new(c, 0, 0), Block::Stone, Biome::Mountain, 60);
            for seed in 0..16u64 {
                populate(&mut chunk, &generator, &surfaces, seed);
            }
            assert_eq!(count_blocks(&chunk, Block::Log), 0);
            assert_eq!(count_blocks(&chunk, Block::Cactus), 0);
        }
    }
}

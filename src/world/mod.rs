//! World orchestration: chunk streaming, the fluid tick, and voxel edits.
//!
//! Everything runs on one logical thread. A streaming refresh spawns every
//! missing chunk before any re-mesh runs, so neighbor-aware meshing always
//! sees fully generated voxel grids for chunks from the same batch.

use std::collections::{HashMap, HashSet};

use glam::{IVec3, Vec3};
use log::{debug, info};

use crate::core::config::{GenerationMode, WorldConfig};
use crate::core::error::Result;
use crate::generation::terrain_gen::TerrainGenerator;
use crate::meshing::{mesh_chunk, ChunkMesh};
use crate::voxel::block::Block;
use crate::voxel::chunk::{Chunk, ChunkCoord};
use crate::voxel::registry::ChunkRegistry;
use crate::water::WaterSimulator;

/// Owns the chunk registry, terrain generator, water simulator, and the
/// per-chunk mesh cache handed to the host renderer.
pub struct ChunkWorld {
    config: WorldConfig,
    generator: TerrainGenerator,
    registry: ChunkRegistry,
    water: WaterSimulator,
    meshes: HashMap<ChunkCoord, ChunkMesh>,
}

impl ChunkWorld {
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let generator = TerrainGenerator::new(config.seed, config.frequency);
        let registry = ChunkRegistry::new(config.chunk_size);
        Ok(Self {
            config,
            generator,
            registry,
            water: WaterSimulator::new(),
            meshes: HashMap::new(),
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn registry(&self) -> &ChunkRegistry {
        &self.registry
    }

    pub fn water_mut(&mut self) -> &mut WaterSimulator {
        &mut self.water
    }

    pub fn chunk_count(&self) -> usize {
        self.registry.len()
    }

    /// Mesh buffers for a loaded chunk.
    pub fn mesh(&self, coord: ChunkCoord) -> Option<&ChunkMesh> {
        self.meshes.get(&coord)
    }

    /// Chunk coordinate under a world-space point. Heightmap worlds stream
    /// a single horizontal layer, so the vertical component pins to zero.
    pub fn world_to_chunk_coord(&self, position: Vec3) -> ChunkCoord {
        let mut coord =
            ChunkCoord::from_world_pos(position, self.config.chunk_size, self.config.block_scale);
        if self.config.generation == GenerationMode::Heightmap {
            coord.z = 0;
        }
        coord
    }

    /// Generates and meshes the full draw-distance box around the origin.
    /// All chunks are generated before any is meshed, so the first mesh of
    /// every chunk already sees its neighbors and no seam pass is needed.
    pub fn generate_initial(&mut self) {
        let coords: Vec<ChunkCoord> = self.desired_coords(ChunkCoord::new(0, 0, 0)).collect();
        for &coord in &coords {
            self.spawn_chunk(coord);
        }
        for &coord in &coords {
            self.remesh(coord);
        }
        info!("generated {} chunks", coords.len());
    }

    /// Diffs the loaded set against the draw-distance box around the
    /// player: missing chunks spawn, out-of-range chunks are destroyed,
    /// and every chunk bordering a change is re-meshed.
    pub fn update_streaming(&mut self, player_position: Vec3) {
        let center = self.world_to_chunk_coord(player_position);
        let desired: HashSet<ChunkCoord> = self.desired_coords(center).collect();

        let mut to_mesh = HashSet::new();

        for &coord in &desired {
            if self.registry.contains(coord) {
                continue;
            }
            self.spawn_chunk(coord);
            to_mesh.insert(coord);
            for neighbor in coord.horizontal_neighbors() {
                to_mesh.insert(neighbor);
            }
        }

        let to_remove: Vec<ChunkCoord> = self
            .registry
            .coords()
            .filter(|coord| !desired.contains(coord))
            .collect();
        for coord in to_remove {
            self.registry.remove(coord);
            self.meshes.remove(&coord);
            debug!("despawned chunk {coord:?}");
            // The surviving neighbors gain a newly exposed boundary.
            for neighbor in coord.horizontal_neighbors() {
                to_mesh.insert(neighbor);
            }
        }

        for coord in to_mesh {
            self.remesh(coord);
        }
    }

    /// Advances the water simulation and re-meshes the chunks it touched.
    pub fn tick(&mut self, delta: f32) {
        let dirty = self.water.tick(delta, &mut self.registry);
        for coord in dirty {
            self.remesh(coord);
        }
    }

    /// Applies one block edit at a chunk-local position. Out-of-bounds
    /// positions and unloaded chunks are ignored. Placing water seeds the
    /// fluid queue; clearing a cactus top untags it so a block later placed
    /// there does not inherit the flower tile.
    pub fn modify_voxel(&mut self, coord: ChunkCoord, local: IVec3, block: Block) {
        let dims = self.config.chunk_size;
        if local.cmplt(IVec3::ZERO).any() || local.cmpge(dims).any() {
            return;
        }
        let Some(chunk) = self.registry.get_mut(coord) else {
            debug!("edit dropped: chunk {coord:?} not loaded");
            return;
        };

        chunk.set_block(local, block);
        match block {
            Block::Water => {
                chunk.set_meta(local, 1);
                let world_pos = coord.origin_blocks(dims) + local;
                self.water.enqueue(world_pos, 1);
            }
            Block::Air => {
                chunk.top_cactus.remove(&local);
            }
            _ => {}
        }

        self.remesh(coord);
        for axis in 0..3 {
            if local[axis] == 0 {
                let mut offset = IVec3::ZERO;
                offset[axis] = -1;
                self.remesh(coord.offset(offset.x, offset.y, offset.z));
            } else if local[axis] == dims[axis] - 1 {
                let mut offset = IVec3::ZERO;
                offset[axis] = 1;
                self.remesh(coord.offset(offset.x, offset.y, offset.z));
            }
        }
    }

    /// Rebuilds the mesh for a loaded chunk; a no-op for absent ones.
    pub fn remesh(&mut self, coord: ChunkCoord) {
        let mesh = match self.registry.get(coord) {
            Some(chunk) => mesh_chunk(
                chunk,
                &self.registry,
                self.config.materials.len(),
                self.config.block_scale,
            ),
            None => return,
        };
        self.meshes.insert(coord, mesh);
    }

    fn spawn_chunk(&mut self, coord: ChunkCoord) {
        let mut chunk = Chunk::new(coord, self.config.chunk_size);
        self.generator.generate(&mut chunk, self.config.generation);
        self.registry.insert(chunk);
    }

    fn desired_coords(&self, center: ChunkCoord) -> impl Iterator<Item = ChunkCoord> + use<> {
        let dd = self.config.draw_distance;
        let vertical = match self.config.generation {
            GenerationMode::Volumetric => -dd..=dd,
            GenerationMode::Heightmap => 0..=0,
        };
        (-dd..=dd).flat_map(move |x| {
            let vertical = vertical.clone();
            (-dd..=dd).flat_map(move |y| {
                vertical
                    .clone()
                    .map(move |z| ChunkCoord::new(center.x + x, center.y + y, center.z + z))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> WorldConfig {
        WorldConfig {
            chunk_size: IVec3::new(8, 8, 256),
            draw_distance: 1,
            seed: 1337,
            frequency: 0.03,
            block_scale: 1.0,
            materials: vec!["opaque".into(), "translucent".into()],
            generation: GenerationMode::Heightmap,
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = test_config();
        config.chunk_size.x = 0;
        assert!(ChunkWorld::new(config).is_err());
    }

    #[test]
    fn test_generate_initial_fills_draw_distance_box() {
        let mut world = ChunkWorld::new(test_config()).unwrap();
        world.generate_initial();

        assert_eq!(world.chunk_count(), 9);
        for x in -1..=1 {
            for y in -1..=1 {
                let coord = ChunkCoord::new(x, y, 0);
                assert!(world.registry().contains(coord));
                let mesh = world.mesh(coord).expect("meshed");
                assert!(!mesh.is_empty(), "terrain chunk produced no quads");
            }
        }
    }

    #[test]
    fn test_streaming_diff_spawns_and_despawns() {
        let mut world = ChunkWorld::new(test_config()).unwrap();
        world.generate_initial();

        let dims = world.config().chunk_size;
        world.update_streaming(Vec3::new((3 * dims.x) as f32 + 0.5, 0.5, 0.0));

        assert_eq!(world.chunk_count(), 9);
        assert!(world.registry().contains(ChunkCoord::new(4, 0, 0)));
        assert!(!world.registry().contains(ChunkCoord::new(-1, 0, 0)));
        assert!(world.mesh(ChunkCoord::new(4, 1, 0)).is_some());
        assert!(world.mesh(ChunkCoord::new(-1, 0, 0)).is_none());
    }

    #[test]
    fn test_world_to_chunk_coord_pins_z_in_heightmap_mode() {
        let world = ChunkWorld::new(test_config()).unwrap();
        let coord = world.world_to_chunk_coord(Vec3::new(-0.5, 9.0, 4000.0));
        assert_eq!(coord, ChunkCoord::new(-1, 1, 0));
    }

    #[test]
    fn test_modify_voxel_rejects_out_of_bounds() {
        let mut world = ChunkWorld::new(test_config()).unwrap();
        world.generate_initial();

        let coord = ChunkCoord::new(0, 0, 0);
        let before = world.registry().get(coord).unwrap().block(IVec3::ZERO);
        world.modify_voxel(coord, IVec3::new(8, 0, 0), Block::Stone);
        world.modify_voxel(coord, IVec3::new(0, -1, 0), Block::Stone);
        assert_eq!(world.registry().get(coord).unwrap().block(IVec3::ZERO), before);
    }

    #[test]
    fn test_placing_water_enqueues_fluid_work() {
        let mut world = ChunkWorld::new(test_config()).unwrap();
        world.generate_initial();

        let coord = ChunkCoord::new(0, 0, 0);
        let local = IVec3::new(4, 4, 200);
        // Clear the cell below so the first spread step has room to fall.
        world.modify_voxel(coord, local - IVec3::Z, Block::Air);
        world.modify_voxel(coord, local, Block::Water);

        let chunk = world.registry().get(coord).unwrap();
        assert_eq!(chunk.block(local), Block::Water);
        assert_eq!(chunk.meta(local), 1);
        assert_eq!(world.water.pending(), 1);

        // Draining the tick spreads downward into what was air.
        world.tick(0.016);
        let chunk = world.registry().get(coord).unwrap();
        assert_eq!(chunk.block(IVec3::new(4, 4, 199)), Block::Water);
    }

    #[test]
    fn test_border_edit_remeshes_the_neighbor() {
        let mut world = ChunkWorld::new(test_config()).unwrap();
        world.generate_initial();

        let neighbor = ChunkCoord::new(1, 0, 0);
        let edit = IVec3::new(7, 4, 250);

        // Clear both sides of the boundary, then place a block touching it.
        // The neighbor's mesh gains the face looking back at the new block.
        world.modify_voxel(ChunkCoord::new(0, 0, 0), edit, Block::Air);
        world.modify_voxel(neighbor, IVec3::new(0, 4, 250), Block::Air);
        let before = world.mesh(neighbor).unwrap().quad_count();

        world.modify_voxel(ChunkCoord::new(0, 0, 0), edit, Block::Stone);
        let after = world.mesh(neighbor).unwrap().quad_count();
        assert!(after > before);
    }

    #[test]
    fn test_same_seed_generates_identical_meshes() {
        let mut a = ChunkWorld::new(test_config()).unwrap();
        let mut b = ChunkWorld::new(test_config()).unwrap();
        a.generate_initial();
        b.generate_initial();

        let coord = ChunkCoord::new(0, 0, 0);
        let ma = a.mesh(coord).unwrap();
        let mb = b.mesh(coord).unwrap();
        for (ba, bb) in ma.buffers.iter().zip(&mb.buffers) {
            assert_eq!(ba.positions, bb.positions);
            assert_eq!(ba.colors, bb.colors);
        }
    }
}

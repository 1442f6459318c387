//! Noise-driven chunk generation.
//!
//! The 2D heightmap path blends height contributions from every biome whose
//! range lies near the column's biome-noise value, layers materials by depth,
//! then runs the hydrology and vegetation passes. The 3D path is a plain
//! volumetric threshold.

use glam::IVec3;
use noise::{NoiseFn, OpenSimplex, Perlin};

use crate::core::GenerationMode;
use crate::voxel::block::BIOME_RANGES;
use crate::voxel::{Biome, Block, Chunk};

use super::{chunk_seed, hydrology, vegetation, ColumnSurface, SurfaceMap};

/// Fallback column height when no biome range reaches the influence floor.
const DEFAULT_COLUMN_HEIGHT: f32 = 30.0;
/// Terrain never generates below this, so there is always room to dig.
const MIN_DIGGABLE_HEIGHT: i32 = 50;
/// Octave count for the per-biome fractal height noise.
const HEIGHT_OCTAVES: u32 = 4;
const HEIGHT_PERSISTENCE: f32 = 0.5;
/// Biome noise runs at a fraction of the base frequency so biome patches
/// span many chunks.
const BIOME_FREQUENCY_SCALE: f32 = 0.2;
const BIOME_SAMPLE_SCALE: f32 = 0.05;
/// River and lake fields use a fixed low frequency independent of the
/// configured base frequency.
const HYDROLOGY_FREQUENCY: f64 = 0.01;

/// Owns every noise field for the lifetime of a world session. Chunks and
/// passes borrow it; nothing else constructs noise state.
pub struct TerrainGenerator {
    seed: i32,
    frequency: f32,
    base: Perlin,
    biome: OpenSimplex,
    river: OpenSimplex,
    lake: OpenSimplex,
}

impl TerrainGenerator {
    pub fn new(seed: i32, frequency: f32) -> Self {
        Self {
            seed,
            frequency,
            base: Perlin::new(seed as u32),
            biome: OpenSimplex::new(seed.wrapping_add(1) as u32),
            river: OpenSimplex::new(seed.wrapping_add(2) as u32),
            lake: OpenSimplex::new(seed.wrapping_add(3) as u32),
        }
    }

    /// Fill a chunk's voxel grid in place according to the generation mode.
    pub fn generate(&self, chunk: &mut Chunk, mode: GenerationMode) {
        match mode {
            GenerationMode::Volumetric => self.generate_volumetric(chunk),
            GenerationMode::Heightmap => self.generate_heightmap(chunk),
        }
    }

    /// Base terrain field at the configured frequency.
    pub(super) fn base_noise2(&self, x: f32, y: f32) -> f32 {
        let f = self.frequency as f64;
        self.base.get([x as f64 * f, y as f64 * f]) as f32
    }

    fn base_noise3(&self, x: f32, y: f32, z: f32) -> f32 {
        let f = self.frequency as f64;
        self.base.get([x as f64 * f, y as f64 * f, z as f64 * f]) as f32
    }

    /// 4-octave fractal sample of the base field at a biome's frequency,
    /// normalized by the summed octave amplitude.
    fn fractal2(&self, x: f32, y: f32, frequency: f32) -> f32 {
        let mut total = 0.0;
        let mut max_value = 0.0;
        let mut amplitude = 1.0f32;
        let mut freq = frequency;
        for _ in 0..HEIGHT_OCTAVES {
            total += self.base.get([(x * freq) as f64, (y * freq) as f64]) as f32 * amplitude;
            max_value += amplitude;
            amplitude *= HEIGHT_PERSISTENCE;
            freq *= 2.0;
        }
        total / max_value
    }

    fn biome_noise(&self, x: f32, y: f32) -> f32 {
        let f = (self.frequency * BIOME_FREQUENCY_SCALE * BIOME_SAMPLE_SCALE) as f64;
        self.biome.get([x as f64 * f, y as f64 * f]) as f32
    }

    pub(super) fn river_noise(&self, x: f32, y: f32) -> f32 {
        self.river
            .get([x as f64 * HYDROLOGY_FREQUENCY, y as f64 * HYDROLOGY_FREQUENCY]) as f32
    }

    pub(super) fn lake_noise(&self, x: f32, y: f32) -> f32 {
        self.lake
            .get([x as f64 * HYDROLOGY_FREQUENCY, y as f64 * HYDROLOGY_FREQUENCY]) as f32
    }

    /// Weighted multi-biome height blend for one column, from an already
    /// normalized biome-noise value. Returns the blended height (before the
    /// detail term and clamping) and the dominant biome.
    fn blend_from_normalized(
        &self,
        normalized: f32,
        wx: f32,
        wy: f32,
        chunk_height: i32,
    ) -> (f32, Biome) {
        let mut height_sum = 0.0f32;
        let mut weight_sum = 0.0f32;
        let mut dominant = Biome::Plains;
        let mut max_influence = 0.0f32;

        for (min, max, biome) in BIOME_RANGES {
            let mid = (min + max) * 0.5;
            let distance = (normalized - mid).abs();
            let influence = (1.0 - distance * 5.0).clamp(0.0, 1.0).powf(2.5);
            if influence <= 0.001 {
                continue;
            }
            if influence > max_influence {
                max_influence = influence;
                dominant = biome;
            }

            let settings = biome.noise_settings();
            let sample = self.fractal2(wx, wy, settings.frequency);
            let biome_height =
                (sample + 1.0) * 0.5 * settings.amplitude * chunk_height as f32 + settings.offset;
            height_sum += biome_height * influence;
            weight_sum += influence;
        }

        if weight_sum < 0.0001 {
            return (DEFAULT_COLUMN_HEIGHT, Biome::Plains);
        }
        (height_sum / weight_sum, dominant)
    }

    /// Surface height and dominant biome for the column at world-space
    /// block position (wx, wy).
    pub fn column_height(&self, wx: f32, wy: f32, chunk_height: i32) -> (i32, Biome) {
        let normalized = (self.biome_noise(wx, wy) + 1.0) * 0.5;
        let (blended, dominant) = self.blend_from_normalized(normalized, wx, wy, chunk_height);

        // Small-amplitude detail on top of the blend.
        let final_height = blended + self.base_noise2(wx * 0.1, wy * 0.1) * 1.5;

        let height = (final_height.round() as i32).clamp(MIN_DIGGABLE_HEIGHT, chunk_height - 1);
        (height, dominant)
    }

    fn generate_volumetric(&self, chunk: &mut Chunk) {
        let dims = chunk.dims();
        let origin = chunk.origin_blocks();
        for x in 0..dims.x {
            for y in 0..dims.y {
                for z in 0..dims.z {
                    let sample = self.base_noise3(
                        (x + origin.x) as f32,
                        (y + origin.y) as f32,
                        (z + origin.z) as f32,
                    );
                    let block = if sample >= 0.0 { Block::Air } else { Block::Stone };
                    chunk.set_block(IVec3::new(x, y, z), block);
                }
            }
        }
    }

    fn generate_heightmap(&self, chunk: &mut Chunk) {
        let dims = chunk.dims();
        let origin = chunk.origin_blocks();

        let mut surfaces = Vec::with_capacity((dims.x * dims.y) as usize);
        let mut surface_map = SurfaceMap::new(dims.x, dims.y);

        for x in 0..dims.x {
            for y in 0..dims.y {
                let wx = (x + origin.x) as f32;
                let wy = (y + origin.y) as f32;
                let (height, biome) = self.column_height(wx, wy, dims.z);

                surfaces.push(ColumnSurface {
                    local: IVec3::new(x, y, height),
                    biome,
                });
                surface_map.set(x, y, height);

                self.layer_column(chunk, x, y, height, biome);
            }
        }

        let seed = chunk_seed(self.seed, origin);
        hydrology::carve_lakes(chunk, self, &surfaces, &surface_map, seed);
        hydrology::carve_rivers(chunk, self, &mut surface_map);
        vegetation::populate(chunk, self, &surfaces, seed);
    }

    /// Assign materials for one column by biome and depth below the surface.
    fn layer_column(&self, chunk: &mut Chunk, x: i32, y: i32, height: i32, biome: Biome) {
        let size_z = chunk.dims().z;
        for z in 0..size_z {
            let block = if z > height {
                Block::Air
            } else if biome == Biome::Desert {
                // Stratified desert: sand over sandstone over stone.
                if z >= height - 2 {
                    Block::Sand
                } else if z >= height - 5 {
                    Block::Sandstone
                } else {
                    Block::Stone
                }
            } else if z < height - 3 {
                Block::Stone
            } else if z < height {
                Block::Dirt
            } else {
                biome.surface_block()
            };
            chunk.set_block(IVec3::new(x, y, z), block);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::ChunkCoord;

    fn standard_chunk() -> Chunk {
        Chunk::new(ChunkCoord::new(0, 0, 0), IVec3::new(16, 16, 256))
    }

    #[test]
    fn test_degenerate_weight_falls_back_to_plains() {
        let generator = TerrainGenerator::new(1337, 0.03);
        // A normalized value far outside [0,1] is beyond every range's
        // falloff, so no biome reaches the influence floor.
        let (height, biome) = generator.blend_from_normalized(5.0, 8.0, 8.0, 256);
        assert_eq!(height, 30.0);
        assert_eq!(biome, Biome::Plains);
    }

    #[test]
    fn test_dominant_biome_matches_argmax_influence() {
        let generator = TerrainGenerator::new(1337, 0.03);
        for x in 0..16 {
            for y in 0..16 {
                let normalized = (generator.biome_noise(x as f32, y as f32) + 1.0) * 0.5;
                let (_, dominant) = generator.column_height(x as f32, y as f32, 256);

                let mut best = Biome::Plains;
                let mut best_influence = 0.0f32;
                let mut any = false;
                for (min, max, biome) in BIOME_RANGES {
                    let mid = (min + max) * 0.5;
                    let influence =
                        (1.0 - (normalized - mid).abs() * 5.0).clamp(0.0, 1.0).powf(2.5);
                    if influence <= 0.001 {
                        continue;
                    }
                    any = true;
                    if influence > best_influence {
                        best_influence = influence;
                        best = biome;
                    }
                }
                if any {
                    assert_eq!(dominant, best, "column ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn test_heightmap_columns_solid_below_air_above() {
        let generator = TerrainGenerator::new(1337, 0.03);
        let mut chunk = standard_chunk();
        generator.generate(&mut chunk, GenerationMode::Heightmap);

        for x in 0..16 {
            for y in 0..16 {
                let (height, _) = generator.column_height(x as f32, y as f32, 256);
                assert!((50..256).contains(&height), "height {height} out of range");

                // Hydrology swaps materials below the surface but never
                // carves to air; vegetation reaches at most 7 blocks up.
                for z in 0..height {
                    assert_ne!(
                        chunk.block(IVec3::new(x, y, z)),
                        Block::Air,
                        "air below surface at ({x},{y},{z})"
                    );
                }
                for z in height + 8..256 {
                    assert_eq!(
                        chunk.block(IVec3::new(x, y, z)),
                        Block::Air,
                        "terrain above surface at ({x},{y},{z})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let generator = TerrainGenerator::new(424_242, 0.03);
        let mut a = standard_chunk();
        let mut b = standard_chunk();
        generator.generate(&mut a, GenerationMode::Heightmap);
        generator.generate(&mut b, GenerationMode::Heightmap);
        for z in 0..256 {
            for y in 0..16 {
                for x in 0..16 {
                    let p = IVec3::new(x, y, z);
                    assert_eq!(a.block(p), b.block(p));
                    assert_eq!(a.meta(p), b.meta(p));
                }
            }
        }
        assert_eq!(a.top_cactus, b.top_cactus);
    }

    #[test]
    fn test_volumetric_mode_is_stone_or_air() {
        let generator = TerrainGenerator::new(7, 0.03);
        let mut chunk = Chunk::new(ChunkCoord::new(1, -2, 0), IVec3::new(16, 16, 32));
        generator.generate(&mut chunk, GenerationMode::Volumetric);
        let mut stone = 0;
        for z in 0..32 {
            for y in 0..16 {
                for x in 0..16 {
                    match chunk.block(IVec3::new(x, y, z)) {
                        Block::Stone => stone += 1,
                        Block::Air => {}
                        other => panic!("unexpected block {other:?}"),
                    }
                }
            }
        }
        assert!(stone > 0, "volumetric terrain produced no stone");
    }
}

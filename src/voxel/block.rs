//! Block materials and biome classification.

use serde::{Deserialize, Serialize};

/// Material tag of a single voxel.
///
/// `Null` is not a world material: it only appears in mesher masks to mark
/// cells with no face. `Water` carries a fill level in the chunk metadata
/// byte (0 = source, 1-7 = flowing); metadata is meaningless for every
/// other material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Block {
    Null,
    #[default]
    Air,
    Stone,
    Dirt,
    Grass,
    Log,
    Leaves,
    Sand,
    Snow,
    Cactus,
    Sandstone,
    Water,
}

impl Block {
    /// Whether this block occludes neighboring faces. Air and water do not;
    /// neither does the mask sentinel.
    pub fn is_solid(self) -> bool {
        !matches!(self, Block::Air | Block::Water | Block::Null)
    }

    /// Render-material slot for this block. Opaque terrain all shares one
    /// atlas material; leaves and water render in a translucent slot.
    pub fn material_slot(self) -> usize {
        match self {
            Block::Leaves | Block::Water => 1,
            _ => 0,
        }
    }
}

/// Biome classification derived from the low-frequency biome noise field.
///
/// A column is influenced by every biome whose range is near its noise
/// value; the dominant biome only drives surface block choice and
/// vegetation rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    Desert,
    Plains,
    Forest,
    Mountain,
    Snowy,
}

/// Per-biome height noise parameters: sampling frequency, amplitude as a
/// fraction of chunk height, and a flat offset in blocks.
#[derive(Clone, Copy, Debug)]
pub struct BiomeNoiseSettings {
    pub frequency: f32,
    pub amplitude: f32,
    pub offset: f32,
}

/// Fixed ordered table mapping normalized biome noise `[0,1)` to biomes.
/// Influence falls off smoothly around each range's midpoint, so several
/// ranges can contribute to one column.
pub const BIOME_RANGES: [(f32, f32, Biome); 5] = [
    (0.0, 0.2, Biome::Desert),
    (0.2, 0.4, Biome::Plains),
    (0.4, 0.6, Biome::Forest),
    (0.6, 0.8, Biome::Mountain),
    (0.8, 1.0, Biome::Snowy),
];

impl Biome {
    pub fn noise_settings(self) -> BiomeNoiseSettings {
        match self {
            Biome::Desert => BiomeNoiseSettings { frequency: 0.01, amplitude: 0.2, offset: -5.0 },
            Biome::Plains => BiomeNoiseSettings { frequency: 0.02, amplitude: 0.4, offset: 0.0 },
            Biome::Forest => BiomeNoiseSettings { frequency: 0.02, amplitude: 0.5, offset: 2.0 },
            Biome::Mountain => BiomeNoiseSettings { frequency: 0.005, amplitude: 1.2, offset: 10.0 },
            Biome::Snowy => BiomeNoiseSettings { frequency: 0.007, amplitude: 1.0, offset: 12.0 },
        }
    }

    /// Surface block placed at the top of a column.
    pub fn surface_block(self) -> Block {
        match self {
            Biome::Mountain => Block::Stone,
            Biome::Snowy => Block::Snow,
            _ => Block::Grass,
        }
    }

    /// Base probability that a vegetation attempt in this biome spawns.
    pub fn vegetation_chance(self) -> f32 {
        match self {
            Biome::Forest => 0.7,
            Biome::Desert => 0.3,
            Biome::Plains => 0.2,
            Biome::Mountain => 0.08,
            Biome::Snowy => 0.05,
        }
    }
}

//! Voxel storage: block types, dense chunks, and the chunk registry

pub mod block;
pub mod chunk;
pub mod registry;

pub use block::{Biome, Block};
pub use chunk::{Chunk, ChunkCoord};
pub use registry::ChunkRegistry;

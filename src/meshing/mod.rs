//! Mesh extraction: converting dense voxel grids into per-material quad
//! buffers.

pub mod greedy;
pub mod mesh;

pub use greedy::mesh_chunk;
pub use mesh::{ChunkMesh, MeshData};
